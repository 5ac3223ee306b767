use super::NodeId;

/// A boundary point in the surface.
///
/// Inside a text node `offset` is a byte offset; inside an element or the
/// root it is a child index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub node: NodeId,
    pub offset: usize,
}

impl Position {
    pub fn new(node: NodeId, offset: usize) -> Self {
        Self { node, offset }
    }
}

/// A selection range between two boundary points.
///
/// Not guaranteed to be ordered; use [`super::Surface::ordered`] before
/// relying on `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceRange {
    pub start: Position,
    pub end: Position,
}

impl SurfaceRange {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    pub fn collapsed(at: Position) -> Self {
        Self { start: at, end: at }
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }
}
