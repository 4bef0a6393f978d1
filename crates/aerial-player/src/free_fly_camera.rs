//! Free-fly camera: unconstrained movement along the view direction, yaw and
//! pitch look from pointer drags.

use aerial_input::InputAction;
use glam::{Mat4, Vec2, Vec3};
use tracing::trace;

/// Pitch is held inside +-1.5 rad so the view never flips over the pole.
pub const DEFAULT_PITCH_LIMIT: f32 = 1.5;

/// Unit look vector for the given yaw and pitch. Yaw 0, pitch 0 looks down +X.
#[inline]
pub fn look_direction(yaw: f32, pitch: f32) -> Vec3 {
    Vec3::new(yaw.cos() * pitch.cos(), pitch.sin(), yaw.sin() * pitch.cos())
}

/// Movement keys currently held.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MoveIntents {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
}

impl MoveIntents {
    pub fn any(&self) -> bool {
        self.forward || self.back || self.left || self.right
    }
}

/// Camera state plus its tuning constants.
#[derive(Clone, Debug)]
pub struct CameraController {
    /// World-space eye position.
    pub position: Vec3,
    yaw: f32,
    pitch: f32,
    direction: Vec3,
    pub intents: MoveIntents,
    /// World units per frame.
    pub movement_speed: f32,
    /// Radians per pixel of drag.
    pub look_sensitivity: f32,
    pitch_limit: f32,
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new(Vec3::new(-1.0, -0.05, 0.0), 0.0, 0.0)
    }
}

impl CameraController {
    /// Camera at `position` looking along `yaw`/`pitch`, default speeds.
    pub fn new(position: Vec3, yaw: f32, pitch: f32) -> Self {
        let pitch = pitch.clamp(-DEFAULT_PITCH_LIMIT, DEFAULT_PITCH_LIMIT);
        Self {
            position,
            yaw,
            pitch,
            direction: look_direction(yaw, pitch),
            intents: MoveIntents::default(),
            movement_speed: 0.01,
            look_sensitivity: 0.01,
            pitch_limit: DEFAULT_PITCH_LIMIT,
        }
    }

    pub fn with_speeds(mut self, movement_speed: f32, look_sensitivity: f32) -> Self {
        self.movement_speed = movement_speed;
        self.look_sensitivity = look_sensitivity;
        self
    }

    /// Tighten the pitch clamp. Non-finite or negative limits are ignored;
    /// limits above [`DEFAULT_PITCH_LIMIT`] are capped to it.
    pub fn with_pitch_limit(mut self, limit: f32) -> Self {
        if limit.is_finite() && limit >= 0.0 {
            let limit = limit.min(DEFAULT_PITCH_LIMIT);
            self.pitch_limit = limit;
            self.pitch = self.pitch.clamp(-limit, limit);
            self.direction = look_direction(self.yaw, self.pitch);
        }
        self
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn pitch_limit(&self) -> f32 {
        self.pitch_limit
    }

    /// Unit view direction.
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Strafe axis: `direction x up`. Shrinks toward zero near the pitch clamp.
    pub fn right(&self) -> Vec3 {
        self.direction.cross(Vec3::Y)
    }

    /// Point the view transform looks at.
    pub fn target(&self) -> Vec3 {
        self.position + self.direction
    }

    /// Right-handed view matrix with +Y up.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target(), Vec3::Y)
    }

    /// Apply a drag delta in pixels. Horizontal motion turns, vertical motion
    /// is inverted into pitch.
    pub fn look(&mut self, delta: Vec2) {
        if !delta.is_finite() {
            return;
        }
        self.yaw += self.look_sensitivity * delta.x;
        self.pitch = (self.pitch - self.look_sensitivity * delta.y)
            .clamp(-self.pitch_limit, self.pitch_limit);
        self.direction = look_direction(self.yaw, self.pitch);
        trace!(yaw = self.yaw, pitch = self.pitch, "camera look");
    }

    /// Update a movement intent from a held action. Returns `false` for
    /// actions that are not camera movement.
    pub fn handle_action(&mut self, action: InputAction, active: bool) -> bool {
        let slot = match action {
            InputAction::MoveForward => &mut self.intents.forward,
            InputAction::MoveBack => &mut self.intents.back,
            InputAction::MoveLeft => &mut self.intents.left,
            InputAction::MoveRight => &mut self.intents.right,
            _ => return false,
        };
        *slot = active;
        true
    }

    /// Displacement one frame of the current intents would apply.
    pub fn movement_delta(&self) -> Vec3 {
        let right = self.right();
        let mut delta = Vec3::ZERO;
        if self.intents.forward {
            delta += self.direction;
        }
        if self.intents.back {
            delta -= self.direction;
        }
        if self.intents.right {
            delta += right;
        }
        if self.intents.left {
            delta -= right;
        }
        delta * self.movement_speed
    }

    /// Per-frame update: move by the held intents.
    pub fn update(&mut self) {
        if self.intents.any() {
            self.position += self.movement_delta();
        }
    }
}
