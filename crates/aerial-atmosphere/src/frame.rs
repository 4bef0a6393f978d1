//! Mapping between scene units and the planet-centered integration frame.

use glam::Vec3;

/// Scene space is a small patch near the planet's north pole: `+Y` is up,
/// one scene unit spans `world_scale` meters, and the scene origin sits on
/// the planet surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlanetFrame {
    /// Meters per scene unit.
    pub world_scale: f32,
    /// Planet radius in meters.
    pub planet_radius: f32,
}

impl PlanetFrame {
    pub fn new(world_scale: f32, planet_radius: f32) -> Self {
        Self {
            world_scale,
            planet_radius,
        }
    }

    /// Planet-centered position of a scene-space point.
    #[inline]
    pub fn to_planet(&self, scene: Vec3) -> Vec3 {
        Vec3::new(
            scene.x * self.world_scale,
            self.planet_radius + scene.y * self.world_scale,
            scene.z * self.world_scale,
        )
    }

    /// Altitude in meters of a scene-space point, measured along `+Y`.
    #[inline]
    pub fn altitude(&self, scene: Vec3) -> f32 {
        scene.y * self.world_scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scene_origin_is_on_surface() {
        let frame = PlanetFrame::new(4000.0, 6_360_000.0);
        let p = frame.to_planet(Vec3::ZERO);
        assert_eq!(p, Vec3::new(0.0, 6_360_000.0, 0.0));
    }

    #[test]
    fn test_scale_applies_to_every_axis() {
        let frame = PlanetFrame::new(4000.0, 6_360_000.0);
        let p = frame.to_planet(Vec3::new(-1.0, -0.05, 0.25));
        assert_eq!(p.x, -4000.0);
        assert!((p.y - (6_360_000.0 - 200.0)).abs() < 1.0);
        assert_eq!(p.z, 1000.0);
        assert!((frame.altitude(Vec3::new(0.0, -0.05, 0.0)) + 200.0).abs() < 1e-3);
    }
}
