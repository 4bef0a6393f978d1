//! Nested numerical quadrature of single scattering along a view ray.
//!
//! For each midpoint sample on the view segment the integrator accumulates
//! view optical depth, marches a secondary ray toward the sun up to the
//! atmosphere boundary to get light optical depth, and weights the local
//! density by the combined transmittance. The same routine serves the sky
//! dome (segment ends at the atmosphere edge) and terrain aerial perspective
//! (segment ends at the shaded surface point).

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::intersect::{ray_sphere_hit, ray_sphere_intersect};
use crate::model::{AtmosphereModel, SampleCounts};

/// Extra weight applied to Mie optical depth in the extinction term.
pub const MIE_EXTINCTION_FACTOR: f32 = 1.1;

/// Treatment of light-ray samples that fall below the planet surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LightRayPolicy {
    /// Drop the whole contribution of the view sample whose light ray
    /// passes under the surface.
    #[default]
    DiscardBelowSurface,
    /// Integrate light rays straight through the planet.
    IgnoreSurface,
}

/// Independent 0/1 masks for the two scattering species.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScatteringToggles {
    pub rayleigh: bool,
    pub mie: bool,
}

impl ScatteringToggles {
    /// Both species enabled.
    pub const ALL: Self = Self {
        rayleigh: true,
        mie: true,
    };

    #[inline]
    pub fn rayleigh_factor(self) -> f32 {
        if self.rayleigh { 1.0 } else { 0.0 }
    }

    #[inline]
    pub fn mie_factor(self) -> f32 {
        if self.mie { 1.0 } else { 0.0 }
    }
}

impl Default for ScatteringToggles {
    fn default() -> Self {
        Self::ALL
    }
}

/// Per-frame lighting inputs shared by every evaluated ray.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScatterParams {
    /// Unit vector toward the sun.
    pub sun_direction: Vec3,
    /// Sun radiance (RGB).
    pub sun_color: Vec3,
    pub toggles: ScatteringToggles,
}

/// Evaluates in-scattered radiance over an [`AtmosphereModel`].
#[derive(Clone, Debug, Default)]
pub struct ScatteringIntegrator {
    model: AtmosphereModel,
}

impl ScatteringIntegrator {
    pub fn new(model: AtmosphereModel) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &AtmosphereModel {
        &self.model
    }

    /// Sky-dome color seen from `altitude` meters above the surface along
    /// the unit `direction`.
    ///
    /// The sky dome travels with the camera, so only altitude matters. When
    /// the observer is above ground (`altitude >= 0`) and the ray meets the
    /// planet, the segment stops at the ground. Below ground, including the
    /// default start at -200 m, the ray always runs to the atmosphere exit.
    pub fn sky_color(&self, altitude: f32, direction: Vec3, params: &ScatterParams) -> Vec3 {
        let origin = Vec3::new(0.0, self.model.planet_radius() + altitude, 0.0);
        let Some(direction) = direction.try_normalize() else {
            return Vec3::ZERO;
        };
        let Some(mut distance) =
            ray_sphere_hit(origin, direction, Vec3::ZERO, self.model.atmosphere_radius())
        else {
            return Vec3::ZERO;
        };
        if altitude >= 0.0
            && direction.dot(origin) < 0.0
            && let Some(ground) =
                ray_sphere_hit(origin, direction, Vec3::ZERO, self.model.planet_radius())
        {
            distance = distance.min(ground);
        }
        self.integrate(
            origin,
            direction,
            distance,
            self.model.params().sky_samples,
            params,
        )
    }

    /// Atmosphere radiance between the camera and a surface point, both in
    /// planet-centered meters.
    pub fn aerial_perspective(
        &self,
        camera: Vec3,
        surface_point: Vec3,
        params: &ScatterParams,
    ) -> Vec3 {
        let offset = surface_point - camera;
        let distance = offset.length();
        let Some(direction) = offset.try_normalize() else {
            return Vec3::ZERO;
        };
        self.integrate(
            camera,
            direction,
            distance,
            self.model.params().terrain_samples,
            params,
        )
    }

    /// Integrate single scattering along `origin + t * direction` for
    /// `t` in `[0, target_distance]`.
    ///
    /// Returns zero for an empty or non-finite segment and never returns a
    /// non-finite color.
    pub fn integrate(
        &self,
        origin: Vec3,
        direction: Vec3,
        target_distance: f32,
        samples: SampleCounts,
        params: &ScatterParams,
    ) -> Vec3 {
        if !target_distance.is_finite() || target_distance <= 0.0 || samples.view == 0 {
            return Vec3::ZERO;
        }
        let Some(sun_dir) = params.sun_direction.try_normalize() else {
            return Vec3::ZERO;
        };

        let atmo = self.model.params();
        let planet_radius = atmo.planet_radius;
        let beta_r = atmo.rayleigh_coefficients;
        let beta_m = Vec3::splat(atmo.mie_coefficient);
        let rayleigh = params.toggles.rayleigh_factor();
        let mie = params.toggles.mie_factor();

        let ds = target_distance / samples.view as f32;
        let (phase_r, phase_m) = self.model.phases(direction.dot(sun_dir));

        let mut view_depth_r = 0.0_f32;
        let mut view_depth_m = 0.0_f32;
        let mut sum_r = Vec3::ZERO;
        let mut sum_m = Vec3::ZERO;

        for i in 0..samples.view {
            let sample = origin + direction * ((i as f32 + 0.5) * ds);
            let height = sample.length() - planet_radius;
            let (density_r, density_m) = self.model.densities(height);
            let hr = density_r * ds;
            let hm = density_m * ds;

            view_depth_r += hr;
            view_depth_m += hm;

            let Some((light_depth_r, light_depth_m)) =
                self.light_optical_depth(sample, sun_dir, samples.light)
            else {
                continue;
            };

            let tau = beta_r * (view_depth_r + light_depth_r) * rayleigh
                + beta_m * MIE_EXTINCTION_FACTOR * (view_depth_m + light_depth_m) * mie;
            let attenuation = Vec3::new((-tau.x).exp(), (-tau.y).exp(), (-tau.z).exp());

            sum_r += attenuation * hr;
            sum_m += attenuation * hm;
        }

        let color = (sum_r * beta_r * phase_r * rayleigh + sum_m * beta_m * phase_m * mie)
            * params.sun_color;

        if color.is_finite() {
            color
        } else {
            trace!(?origin, ?direction, target_distance, "non-finite scattering clamped");
            Vec3::ZERO
        }
    }

    /// Rayleigh/Mie optical depth from `from` to the atmosphere edge along
    /// `sun_dir`, or `None` when the light policy discards the sample.
    fn light_optical_depth(&self, from: Vec3, sun_dir: Vec3, samples: u32) -> Option<(f32, f32)> {
        let exit = ray_sphere_intersect(from, sun_dir, Vec3::ZERO, self.model.atmosphere_radius());
        if exit <= 0.0 || samples == 0 {
            return Some((0.0, 0.0));
        }

        let planet_radius = self.model.planet_radius();
        let discard = self.model.params().light_ray_policy == LightRayPolicy::DiscardBelowSurface;
        let dsl = exit / samples as f32;
        let mut depth_r = 0.0_f32;
        let mut depth_m = 0.0_f32;

        for j in 0..samples {
            let pos = from + sun_dir * ((j as f32 + 0.5) * dsl);
            let height = pos.length() - planet_radius;
            if discard && height < 0.0 {
                return None;
            }
            let (density_r, density_m) = self.model.densities(height);
            depth_r += density_r * dsl;
            depth_m += density_m * dsl;
        }

        Some((depth_r, depth_m))
    }
}
