use base64::{Engine, engine::general_purpose::STANDARD};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Not an image file: {0}")]
    NotAnImage(PathBuf),
}

/// Read a local image into a self-contained `data:` URI
pub fn load_image_data_url(path: &Path) -> Result<String, IoError> {
    if !path.exists() {
        return Err(IoError::NotFound(path.to_path_buf()));
    }

    let mime = mime_guess::from_path(path)
        .first()
        .filter(|m| m.type_() == mime_guess::mime::IMAGE)
        .ok_or_else(|| IoError::NotAnImage(path.to_path_buf()))?;

    let bytes = fs::read(path).map_err(IoError::Io)?;
    Ok(format!("data:{};base64,{}", mime.essence_str(), STANDARD.encode(bytes)))
}

/// Like [`load_image_data_url`], but every failure resolves to `None`.
///
/// The insert path treats `None` as "nothing to insert".
pub fn read_image_data_url(path: &Path) -> Option<String> {
    match load_image_data_url(path) {
        Ok(url) => Some(url),
        Err(e) => {
            log::warn!("Failed to read image {}: {e}", path.display());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn png_becomes_data_url() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dot.png");
        fs::write(&path, [0x89, b'P', b'N', b'G']).unwrap();

        let url = load_image_data_url(&path).unwrap();

        assert_eq!(url, "data:image/png;base64,iVBORw==");
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nope.jpg");

        assert!(matches!(load_image_data_url(&path), Err(IoError::NotFound(_))));
        assert_eq!(read_image_data_url(&path), None);
    }

    #[test]
    fn non_image_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.txt");
        fs::write(&path, "hello").unwrap();

        assert!(matches!(load_image_data_url(&path), Err(IoError::NotAnImage(_))));
        assert_eq!(read_image_data_url(&path), None);
    }

    #[test]
    fn extension_is_case_insensitive() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("photo.JPG");
        fs::write(&path, [0xff, 0xd8]).unwrap();

        let url = read_image_data_url(&path).unwrap();

        assert!(url.starts_with("data:image/jpeg;base64,"));
    }
}
