use crate::surface::SurfaceRange;

/// Result of a command that changed the surface
#[derive(Debug, Clone, PartialEq)]
pub struct Patch {
    pub new_selection: SurfaceRange,
    pub version: u64,
}
