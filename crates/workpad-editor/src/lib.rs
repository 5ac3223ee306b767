pub mod editing;
pub mod io;
pub mod markup;
pub mod surface;

// Re-export key types for easier usage
pub use editing::*;
pub use io::{IoError, read_image_data_url};
pub use markup::normalize;
pub use surface::{Element, NodeId, NodeKind, Position, Surface, SurfaceRange};
pub use workpad_config::EditorConfig;
