//! Physical and tunable constants of the atmosphere, plus phase functions.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

use crate::integrator::LightRayPolicy;

/// Errors raised when atmosphere parameters violate the model invariants.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AtmosphereError {
    /// Planet radius must be strictly positive.
    #[error("planet radius must be positive, got {0}")]
    InvalidPlanetRadius(f32),

    /// The atmosphere shell must enclose the planet.
    #[error("atmosphere radius {atmosphere} must exceed planet radius {planet}")]
    AtmosphereBelowSurface {
        /// Planet radius in meters.
        planet: f32,
        /// Atmosphere radius in meters.
        atmosphere: f32,
    },

    /// Scale heights must be strictly positive.
    #[error("scale heights must be positive (rayleigh {rayleigh}, mie {mie})")]
    InvalidScaleHeight {
        /// Rayleigh scale height in meters.
        rayleigh: f32,
        /// Mie scale height in meters.
        mie: f32,
    },

    /// Henyey-Greenstein style anisotropy must stay inside the open unit interval.
    #[error("mie anisotropy must lie in (-1, 1), got {0}")]
    InvalidAnisotropy(f32),

    /// Both quadrature passes need at least one sample.
    #[error("{variant} sample counts must be at least 1 (view {view}, light {light})")]
    ZeroSamples {
        /// Which shading variant carried the bad counts.
        variant: &'static str,
        /// View-ray samples.
        view: u32,
        /// Light-ray samples.
        light: u32,
    },
}

/// Quadrature resolution for one shading variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleCounts {
    /// Intervals along the view ray.
    pub view: u32,
    /// Intervals along each light ray.
    pub light: u32,
}

impl SampleCounts {
    /// Sample counts used by the sky dome.
    pub const SKY: Self = Self { view: 16, light: 8 };
    /// Sample counts used by the terrain aerial-perspective pass.
    pub const TERRAIN: Self = Self {
        view: 16,
        light: 16,
    };
}

/// Raw atmosphere parameters, validated into an [`AtmosphereModel`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AtmosphereParams {
    /// Inner radius: the planet's surface in meters.
    pub planet_radius: f32,
    /// Outer radius: top of the atmosphere in meters.
    pub atmosphere_radius: f32,
    /// Rayleigh scale height in meters.
    pub rayleigh_scale_height: f32,
    /// Mie scale height in meters.
    pub mie_scale_height: f32,
    /// Rayleigh scattering coefficients at sea level (per-wavelength, RGB).
    pub rayleigh_coefficients: Vec3,
    /// Mie scattering coefficient at sea level, broadcast to RGB.
    pub mie_coefficient: f32,
    /// Mie anisotropy `g`.
    pub mie_anisotropy: f32,
    /// Resolution of the sky-dome integration.
    pub sky_samples: SampleCounts,
    /// Resolution of the terrain integration.
    pub terrain_samples: SampleCounts,
    /// How light rays that dip below the surface are treated.
    pub light_ray_policy: LightRayPolicy,
}

impl Default for AtmosphereParams {
    fn default() -> Self {
        Self {
            planet_radius: 6_360_000.0,
            atmosphere_radius: 6_420_000.0,
            rayleigh_scale_height: 7994.0,
            mie_scale_height: 1200.0,
            rayleigh_coefficients: Vec3::new(5.8e-6, 13.5e-6, 33.1e-6),
            mie_coefficient: 21e-6,
            mie_anisotropy: 0.76,
            sky_samples: SampleCounts::SKY,
            terrain_samples: SampleCounts::TERRAIN,
            light_ray_policy: LightRayPolicy::default(),
        }
    }
}

/// Validated atmosphere constants. Immutable for the lifetime of a session.
#[derive(Clone, Debug, PartialEq)]
pub struct AtmosphereModel {
    params: AtmosphereParams,
}

impl AtmosphereModel {
    /// Validate `params` against the model invariants.
    pub fn new(params: AtmosphereParams) -> Result<Self, AtmosphereError> {
        if !(params.planet_radius > 0.0) {
            return Err(AtmosphereError::InvalidPlanetRadius(params.planet_radius));
        }
        if !(params.atmosphere_radius > params.planet_radius) {
            return Err(AtmosphereError::AtmosphereBelowSurface {
                planet: params.planet_radius,
                atmosphere: params.atmosphere_radius,
            });
        }
        if !(params.rayleigh_scale_height > 0.0 && params.mie_scale_height > 0.0) {
            return Err(AtmosphereError::InvalidScaleHeight {
                rayleigh: params.rayleigh_scale_height,
                mie: params.mie_scale_height,
            });
        }
        if !(params.mie_anisotropy > -1.0 && params.mie_anisotropy < 1.0) {
            return Err(AtmosphereError::InvalidAnisotropy(params.mie_anisotropy));
        }
        for (variant, counts) in [
            ("sky", params.sky_samples),
            ("terrain", params.terrain_samples),
        ] {
            if counts.view == 0 || counts.light == 0 {
                return Err(AtmosphereError::ZeroSamples {
                    variant,
                    view: counts.view,
                    light: counts.light,
                });
            }
        }
        Ok(Self { params })
    }

    /// The validated parameters.
    pub fn params(&self) -> &AtmosphereParams {
        &self.params
    }

    pub fn planet_radius(&self) -> f32 {
        self.params.planet_radius
    }

    pub fn atmosphere_radius(&self) -> f32 {
        self.params.atmosphere_radius
    }

    /// Relative Rayleigh and Mie densities at `height` meters above the surface.
    #[inline]
    pub fn densities(&self, height: f32) -> (f32, f32) {
        (
            (-height / self.params.rayleigh_scale_height).exp(),
            (-height / self.params.mie_scale_height).exp(),
        )
    }

    /// Rayleigh and Mie phase values for the cosine `mu` between view and sun.
    #[inline]
    pub fn phases(&self, mu: f32) -> (f32, f32) {
        (rayleigh_phase(mu), mie_phase(mu, self.params.mie_anisotropy))
    }
}

impl Default for AtmosphereModel {
    fn default() -> Self {
        Self {
            params: AtmosphereParams::default(),
        }
    }
}

/// Rayleigh phase function, `3/(16 pi) (1 + mu^2)`.
#[inline]
pub fn rayleigh_phase(mu: f32) -> f32 {
    3.0 / (16.0 * PI) * (1.0 + mu * mu)
}

/// Cornette-Shanks form of the Henyey-Greenstein phase function.
#[inline]
pub fn mie_phase(mu: f32, g: f32) -> f32 {
    let g2 = g * g;
    let num = 3.0 * (1.0 - g2) * (1.0 + mu * mu);
    let denom = 8.0 * PI * (2.0 + g2) * (1.0 + g2 - 2.0 * g * mu).powf(1.5);
    num / denom
}
