//! Platform-independent input events and the per-frame queue that holds them.

use std::collections::VecDeque;

use glam::Vec2;
use winit::event::ElementState;
use winit::keyboard::KeyCode;

/// A single input event, recorded in arrival order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Primary pointer button went down at `position`.
    PointerPressed { position: Vec2 },
    /// Pointer moved to `position`.
    PointerMoved { position: Vec2 },
    /// Primary pointer button went up.
    PointerReleased,
    /// A physical key changed state. Repeats are dropped on push.
    Key { code: KeyCode, state: ElementState },
    /// Output surface changed size.
    Resized { width: u32, height: u32 },
}

impl InputEvent {
    pub fn key_pressed(code: KeyCode) -> Self {
        Self::Key {
            code,
            state: ElementState::Pressed,
        }
    }

    pub fn key_released(code: KeyCode) -> Self {
        Self::Key {
            code,
            state: ElementState::Released,
        }
    }
}

/// FIFO of events collected between two frames.
///
/// # Usage
///
/// 1. Event sources call [`push`](Self::push) as events arrive.
/// 2. The frame driver calls [`drain`](Self::drain) once per frame and
///    applies every event before reading simulation state.
#[derive(Debug, Clone, Default)]
pub struct InputQueue {
    events: VecDeque<InputEvent>,
}

impl InputQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event.
    pub fn push(&mut self, event: InputEvent) {
        self.events.push_back(event);
    }

    /// Append a key event, ignoring auto-repeat.
    pub fn push_key(&mut self, code: KeyCode, state: ElementState, repeat: bool) {
        if !repeat {
            self.push(InputEvent::Key { code, state });
        }
    }

    /// Remove and yield all pending events in arrival order.
    pub fn drain(&mut self) -> impl Iterator<Item = InputEvent> + '_ {
        self.events.drain(..)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_preserves_order_and_empties() {
        let mut queue = InputQueue::new();
        queue.push(InputEvent::PointerPressed {
            position: Vec2::new(1.0, 2.0),
        });
        queue.push(InputEvent::key_pressed(KeyCode::KeyW));
        queue.push(InputEvent::PointerReleased);

        let drained: Vec<_> = queue.drain().collect();
        assert_eq!(drained.len(), 3);
        assert_eq!(drained[1], InputEvent::key_pressed(KeyCode::KeyW));
        assert_eq!(drained[2], InputEvent::PointerReleased);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_repeat_keys_are_dropped() {
        let mut queue = InputQueue::new();
        queue.push_key(KeyCode::KeyW, ElementState::Pressed, false);
        queue.push_key(KeyCode::KeyW, ElementState::Pressed, true);
        queue.push_key(KeyCode::KeyW, ElementState::Pressed, true);
        assert_eq!(queue.len(), 1);
    }
}
