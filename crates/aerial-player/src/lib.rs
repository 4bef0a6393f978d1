//! Free-fly viewer camera driven by drag look and held movement keys.

pub mod free_fly_camera;

pub use free_fly_camera::{CameraController, DEFAULT_PITCH_LIMIT, MoveIntents, look_direction};
