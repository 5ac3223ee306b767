use crate::surface::{Surface, SurfaceRange};

/// A captured range, stamped with the surface generation it belongs to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionSnapshot {
    pub range: SurfaceRange,
    pub generation: u64,
}

/// Remembers the last text selection inside the surface.
///
/// Toolbar interaction moves focus away and destroys the live selection, so
/// the range is captured on every key-up/pointer-up in the text and restored
/// right before a command runs. A snapshot is a weak reference: it dies with
/// a wholesale content replacement or when either endpoint is detached.
#[derive(Debug, Default)]
pub struct SelectionMemory {
    last: Option<SelectionSnapshot>,
}

impl SelectionMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the current range. Ranges that do not point into the live tree
    /// are ignored and the previous snapshot is kept.
    pub fn capture(&mut self, surface: &Surface, range: SurfaceRange) -> bool {
        if !surface.is_valid_position(range.start) || !surface.is_valid_position(range.end) {
            log::debug!("ignoring selection outside the live surface");
            return false;
        }
        self.last = Some(SelectionSnapshot {
            range,
            generation: surface.generation(),
        });
        true
    }

    /// The last snapshot, if it still applies to `surface`.
    ///
    /// A stale snapshot is dropped.
    pub fn restore(&mut self, surface: &Surface) -> Option<SurfaceRange> {
        let snapshot = self.last?;
        let valid = snapshot.generation == surface.generation()
            && surface.is_valid_position(snapshot.range.start)
            && surface.is_valid_position(snapshot.range.end);
        if !valid {
            log::debug!("dropping stale selection snapshot");
            self.last = None;
            return None;
        }
        Some(surface.ordered(snapshot.range))
    }

    pub fn snapshot(&self) -> Option<SelectionSnapshot> {
        self.last
    }

    pub fn invalidate(&mut self) {
        self.last = None;
    }
}
