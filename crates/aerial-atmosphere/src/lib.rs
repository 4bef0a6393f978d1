//! Single-scattering atmosphere: ray/sphere bounds, the exponential-density
//! atmosphere model, and the nested view-ray x light-ray quadrature that
//! yields sky color and aerial perspective.
//!
//! All positions handed to the integrator are planet-centered meters; use
//! [`PlanetFrame`] to map scene units into that frame.

mod frame;
mod integrator;
mod intersect;
mod model;

pub use frame::PlanetFrame;
pub use integrator::{
    LightRayPolicy, MIE_EXTINCTION_FACTOR, ScatterParams, ScatteringIntegrator, ScatteringToggles,
};
pub use intersect::{NO_HIT, ray_sphere_hit, ray_sphere_intersect};
pub use model::{
    AtmosphereError, AtmosphereModel, AtmosphereParams, SampleCounts, mie_phase, rayleigh_phase,
};
