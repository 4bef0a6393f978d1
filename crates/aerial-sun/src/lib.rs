//! Sun animation: elevation angle state machine, sun direction, and the
//! exposure curves derived from sun height.

mod exposure;
mod sun;

pub use exposure::{Exposure, sky_exposure, terrain_exposure};
pub use sun::{DEFAULT_PRESETS, DriveMode, SunState, sun_direction};
