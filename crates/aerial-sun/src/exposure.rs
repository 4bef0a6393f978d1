//! Tone-mapping gain derived from sun height.
//!
//! The sky follows the sun linearly and goes dark after sunset. The terrain
//! never drops below unit exposure so it stays readable at night.

use crate::sun::SunState;

/// Gain applied by the sky dome tone map.
#[inline]
pub fn sky_exposure(sun_height: f32) -> f32 {
    sun_height * 4.0
}

/// Gain applied by the terrain tone map, floored at 1.
#[inline]
pub fn terrain_exposure(sun_height: f32) -> f32 {
    (sun_height * 4.0).max(1.0)
}

/// Per-variant exposure for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Exposure {
    pub sky: f32,
    pub terrain: f32,
}

impl Exposure {
    pub fn from_sun_height(sun_height: f32) -> Self {
        Self {
            sky: sky_exposure(sun_height),
            terrain: terrain_exposure(sun_height),
        }
    }
}

impl SunState {
    /// Exposure for the current sun angle.
    pub fn exposure(&self) -> Exposure {
        Exposure::from_sun_height(self.height())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zenith_exposure() {
        let sun = SunState::new(std::f32::consts::FRAC_PI_2, 0.0);
        let exposure = sun.exposure();
        assert!((exposure.sky - 4.0).abs() < 1e-6);
        assert!((exposure.terrain - 4.0).abs() < 1e-6);
    }

    #[test]
    fn test_near_horizon_exposure() {
        let sun = SunState::new(0.1, 0.0);
        let exposure = sun.exposure();
        assert!((exposure.sky - 0.399).abs() < 1e-3, "{exposure:?}");
        assert_eq!(exposure.terrain, 1.0);
    }

    #[test]
    fn test_night_sky_is_negative_terrain_is_floored() {
        let exposure = Exposure::from_sun_height(-0.5);
        assert!(exposure.sky < 0.0);
        assert_eq!(exposure.terrain, 1.0);
    }
}
