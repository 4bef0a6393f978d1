//! Sun elevation state machine.
//!
//! The sun moves on a great circle in the XY plane: angle 0 is the eastern
//! horizon (+X), pi/2 is the zenith, pi the western horizon. The angle is
//! unbounded; trigonometry wraps it.

use glam::Vec3;
use tracing::debug;

/// Elevation presets selectable by index (near horizon, morning, zenith,
/// afternoon, dusk, just before set).
pub const DEFAULT_PRESETS: [f32; 6] = [0.1, 0.7, 1.57, 2.6, 3.0, 3.12];

/// Unit vector toward the sun for a given elevation angle.
#[inline]
pub fn sun_direction(angle: f32) -> Vec3 {
    Vec3::new(angle.cos(), angle.sin(), 0.0)
}

/// What the sun does on the next frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriveMode {
    /// Automatic cycle or forward scrub: angle increases.
    Forward,
    /// Backward scrub: angle decreases.
    Backward,
    /// Angle holds; only presets change it.
    Paused,
}

/// Sun animation state.
#[derive(Clone, Debug, PartialEq)]
pub struct SunState {
    /// Elevation angle in radians.
    pub angle: f32,
    /// Radians per millisecond while moving.
    pub angular_speed: f32,
    /// Automatic day cycle running.
    pub cycle_enabled: bool,
    /// Forward scrub key held.
    pub scrub_forward: bool,
    /// Backward scrub key held.
    pub scrub_backward: bool,
    /// Sun radiance (RGB).
    pub color: Vec3,
    presets: [f32; 6],
}

impl Default for SunState {
    fn default() -> Self {
        Self::new(1.57, std::f32::consts::PI / 4000.0)
    }
}

impl SunState {
    /// Paused sun at `angle` with the default presets and color.
    pub fn new(angle: f32, angular_speed: f32) -> Self {
        Self {
            angle,
            angular_speed,
            cycle_enabled: false,
            scrub_forward: false,
            scrub_backward: false,
            color: Vec3::splat(20.0),
            presets: DEFAULT_PRESETS,
        }
    }

    /// Replace the preset table.
    pub fn with_presets(mut self, presets: [f32; 6]) -> Self {
        self.presets = presets;
        self
    }

    /// Replace the sun color.
    pub fn with_color(mut self, color: Vec3) -> Self {
        self.color = color;
        self
    }

    pub fn presets(&self) -> &[f32; 6] {
        &self.presets
    }

    /// Current drive mode. The cycle and forward scrub take precedence over
    /// backward scrub.
    pub fn drive_mode(&self) -> DriveMode {
        if self.cycle_enabled || self.scrub_forward {
            DriveMode::Forward
        } else if self.scrub_backward {
            DriveMode::Backward
        } else {
            DriveMode::Paused
        }
    }

    /// Advance by a frame of `dt_ms` milliseconds.
    pub fn advance(&mut self, dt_ms: f32) {
        match self.drive_mode() {
            DriveMode::Forward => self.angle += dt_ms * self.angular_speed,
            DriveMode::Backward => self.angle -= dt_ms * self.angular_speed,
            DriveMode::Paused => {}
        }
    }

    /// Jump to preset `index`; scrub and cycle flags are left untouched.
    /// Returns `false` if no such preset exists.
    pub fn select_preset(&mut self, index: usize) -> bool {
        match self.presets.get(index) {
            Some(&angle) => {
                debug!(index, angle, "sun preset selected");
                self.angle = angle;
                true
            }
            None => false,
        }
    }

    /// Flip the automatic cycle.
    pub fn toggle_cycle(&mut self) {
        self.cycle_enabled = !self.cycle_enabled;
        debug!(enabled = self.cycle_enabled, "sun cycle toggled");
    }

    /// Unit vector toward the sun, recomputed from the current angle.
    #[inline]
    pub fn direction(&self) -> Vec3 {
        sun_direction(self.angle)
    }

    /// Sine of the elevation: the `y` component of [`direction`](Self::direction).
    #[inline]
    pub fn height(&self) -> f32 {
        self.angle.sin()
    }
}
