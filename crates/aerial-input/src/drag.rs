//! Press-move-release drag tracking for mouse look.

use glam::Vec2;

/// Turns absolute pointer positions into per-move deltas while the primary
/// button is held.
#[derive(Debug, Clone, Copy, Default)]
pub struct DragTracker {
    last: Option<Vec2>,
}

impl DragTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a drag at `position`.
    pub fn press(&mut self, position: Vec2) {
        self.last = Some(position);
    }

    /// Pointer moved. Returns the delta since the previous position while a
    /// drag is in progress, `None` otherwise.
    pub fn motion(&mut self, position: Vec2) -> Option<Vec2> {
        let last = self.last.as_mut()?;
        let delta = position - *last;
        *last = position;
        Some(delta)
    }

    /// End the drag.
    pub fn release(&mut self) {
        self.last = None;
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.last.is_some()
    }
}
