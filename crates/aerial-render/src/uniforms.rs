//! Typed per-variant shading parameters, laid out for direct GPU upload.

use aerial_atmosphere::{ScatterParams, ScatteringToggles};
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

/// Rejected parameter values.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParamError {
    #[error("sun direction {0:?} cannot be normalized")]
    SunDirection(Vec3),

    #[error("sun color {0:?} must be finite and non-negative")]
    SunColor(Vec3),

    #[error("{name} must be finite, got {value}")]
    NonFinite { name: &'static str, value: f32 },
}

fn unit_sun(direction: Vec3) -> Result<Vec3, ParamError> {
    direction
        .try_normalize()
        .ok_or(ParamError::SunDirection(direction))
}

fn sun_color(color: Vec3) -> Result<Vec3, ParamError> {
    if color.is_finite() && color.min_element() >= 0.0 {
        Ok(color)
    } else {
        Err(ParamError::SunColor(color))
    }
}

fn finite(name: &'static str, value: f32) -> Result<f32, ParamError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ParamError::NonFinite { name, value })
    }
}

/// Sky-dome parameters. 48 bytes.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct SkyParams {
    pub sun_direction: [f32; 3],
    pub exposure: f32,
    pub sun_color: [f32; 3],
    pub ambient_coefficient: f32,
    /// Camera altitude above the surface in meters.
    pub camera_altitude: f32,
    pub rayleigh: f32,
    pub mie: f32,
    _pad: f32,
}

impl SkyParams {
    pub fn new(
        sun_direction: Vec3,
        sun_color_rgb: Vec3,
        exposure: f32,
        ambient_coefficient: f32,
        camera_altitude: f32,
        toggles: ScatteringToggles,
    ) -> Result<Self, ParamError> {
        Ok(Self {
            sun_direction: unit_sun(sun_direction)?.to_array(),
            exposure: finite("exposure", exposure)?,
            sun_color: sun_color(sun_color_rgb)?.to_array(),
            ambient_coefficient: finite("ambient coefficient", ambient_coefficient)?,
            camera_altitude: finite("camera altitude", camera_altitude)?,
            rayleigh: toggles.rayleigh_factor(),
            mie: toggles.mie_factor(),
            _pad: 0.0,
        })
    }

    pub fn toggles(&self) -> ScatteringToggles {
        ScatteringToggles {
            rayleigh: self.rayleigh > 0.5,
            mie: self.mie > 0.5,
        }
    }

    pub fn scatter(&self) -> ScatterParams {
        ScatterParams {
            sun_direction: Vec3::from_array(self.sun_direction),
            sun_color: Vec3::from_array(self.sun_color),
            toggles: self.toggles(),
        }
    }
}

/// Terrain parameters. 64 bytes.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct TerrainParams {
    pub sun_direction: [f32; 3],
    pub exposure: f32,
    pub sun_color: [f32; 3],
    pub ambient_coefficient: f32,
    /// Camera position in scene units.
    pub camera_position: [f32; 3],
    pub rayleigh: f32,
    pub mie: f32,
    _pad: [f32; 3],
}

impl TerrainParams {
    pub fn new(
        sun_direction: Vec3,
        sun_color_rgb: Vec3,
        exposure: f32,
        ambient_coefficient: f32,
        camera_position: Vec3,
        toggles: ScatteringToggles,
    ) -> Result<Self, ParamError> {
        if !camera_position.is_finite() {
            return Err(ParamError::NonFinite {
                name: "camera position",
                value: camera_position.x + camera_position.y + camera_position.z,
            });
        }
        Ok(Self {
            sun_direction: unit_sun(sun_direction)?.to_array(),
            exposure: finite("exposure", exposure)?,
            sun_color: sun_color(sun_color_rgb)?.to_array(),
            ambient_coefficient: finite("ambient coefficient", ambient_coefficient)?,
            camera_position: camera_position.to_array(),
            rayleigh: toggles.rayleigh_factor(),
            mie: toggles.mie_factor(),
            _pad: [0.0; 3],
        })
    }

    pub fn toggles(&self) -> ScatteringToggles {
        ScatteringToggles {
            rayleigh: self.rayleigh > 0.5,
            mie: self.mie > 0.5,
        }
    }

    pub fn camera_position(&self) -> Vec3 {
        Vec3::from_array(self.camera_position)
    }

    pub fn scatter(&self) -> ScatterParams {
        ScatterParams {
            sun_direction: Vec3::from_array(self.sun_direction),
            sun_color: Vec3::from_array(self.sun_color),
            toggles: self.toggles(),
        }
    }
}

/// Everything a backend needs to draw one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameParams {
    pub view: Mat4,
    pub projection: Mat4,
    /// Camera position in scene units.
    pub camera_position: Vec3,
    pub sky: SkyParams,
    pub terrain: TerrainParams,
}

impl FrameParams {
    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_sizes() {
        assert_eq!(std::mem::size_of::<SkyParams>(), 48);
        assert_eq!(std::mem::size_of::<TerrainParams>(), 64);
        let sky = SkyParams::zeroed();
        assert_eq!(bytemuck::bytes_of(&sky).len(), 48);
    }

    #[test]
    fn test_sun_direction_is_normalized() {
        let sky = SkyParams::new(
            Vec3::new(0.0, 2.0, 0.0),
            Vec3::splat(20.0),
            4.0,
            0.2,
            -200.0,
            ScatteringToggles::ALL,
        )
        .unwrap();
        assert_eq!(sky.sun_direction, [0.0, 1.0, 0.0]);
        assert_eq!(sky.rayleigh, 1.0);
    }

    #[test]
    fn test_zero_sun_direction_is_rejected() {
        let err = TerrainParams::new(
            Vec3::ZERO,
            Vec3::splat(20.0),
            1.0,
            0.1,
            Vec3::ZERO,
            ScatteringToggles::ALL,
        )
        .unwrap_err();
        assert_eq!(err, ParamError::SunDirection(Vec3::ZERO));
    }

    #[test]
    fn test_negative_exposure_is_allowed() {
        // The sky exposure goes negative once the sun sets.
        assert!(
            SkyParams::new(
                Vec3::NEG_Y,
                Vec3::splat(20.0),
                -4.0,
                0.2,
                0.0,
                ScatteringToggles::ALL
            )
            .is_ok()
        );
    }

    #[test]
    fn test_non_finite_values_are_rejected() {
        assert!(matches!(
            SkyParams::new(
                Vec3::Y,
                Vec3::splat(20.0),
                f32::NAN,
                0.2,
                0.0,
                ScatteringToggles::ALL
            ),
            Err(ParamError::NonFinite {
                name: "exposure",
                ..
            })
        ));
        assert!(matches!(
            TerrainParams::new(
                Vec3::Y,
                Vec3::splat(-1.0),
                1.0,
                0.1,
                Vec3::ZERO,
                ScatteringToggles::ALL
            ),
            Err(ParamError::SunColor(_))
        ));
    }

    #[test]
    fn test_toggles_roundtrip_through_floats() {
        let toggles = ScatteringToggles {
            rayleigh: true,
            mie: false,
        };
        let terrain = TerrainParams::new(
            Vec3::Y,
            Vec3::splat(20.0),
            1.0,
            0.1,
            Vec3::new(-1.0, -0.05, 0.0),
            toggles,
        )
        .unwrap();
        assert_eq!(terrain.mie, 0.0);
        assert_eq!(terrain.toggles(), toggles);
        assert_eq!(terrain.scatter().toggles, toggles);
    }
}
