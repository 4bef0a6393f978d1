//! Input plumbing for the viewer: a frame-coherent event queue, key
//! bindings from physical keys to viewer actions, and pointer-drag tracking.
//!
//! Host event sources only push [`InputEvent`]s; all state mutation happens
//! when the frame driver drains the queue.

pub mod bindings;
pub mod drag;
pub mod event;

pub use bindings::{InputAction, KeyBinding, KeyBindings, ResolvedInput};
pub use drag::DragTracker;
pub use event::{InputEvent, InputQueue};
