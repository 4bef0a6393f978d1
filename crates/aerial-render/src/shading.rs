//! Surface compositing: base color lit by atmosphere-derived skylight, then
//! exposure tone mapping.

use glam::{Vec2, Vec3};

/// Fixed scale applied to the ambient term.
pub const AMBIENT_SCALE: f32 = 0.05;

/// `1 - exp(-color * exposure)` per channel.
#[inline]
pub fn tone_map(color: Vec3, exposure: f32) -> Vec3 {
    let scaled = -color * exposure;
    Vec3::ONE - Vec3::new(scaled.x.exp(), scaled.y.exp(), scaled.z.exp())
}

/// Ambient plus Lambert diffuse. Specular is reserved and contributes zero.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceShadingModel {
    pub ambient_coefficient: f32,
}

impl Default for SurfaceShadingModel {
    fn default() -> Self {
        Self {
            ambient_coefficient: 0.1,
        }
    }
}

impl SurfaceShadingModel {
    pub fn new(ambient_coefficient: f32) -> Self {
        Self {
            ambient_coefficient,
        }
    }

    /// Linear surface radiance before tone mapping. `normal` and
    /// `sun_direction` need not be normalized.
    pub fn composite(&self, base: Vec3, skylight: Vec3, normal: Vec3, sun_direction: Vec3) -> Vec3 {
        let n = normal.normalize_or_zero();
        let l = sun_direction.normalize_or_zero();
        let ambient = self.ambient_coefficient * base * skylight * AMBIENT_SCALE;
        let diffuse = n.dot(l).max(0.0) * base * skylight;
        let specular = Vec3::ZERO;
        ambient + diffuse + specular
    }

    /// Composite and tone map to display range.
    pub fn shade(
        &self,
        base: Vec3,
        skylight: Vec3,
        normal: Vec3,
        sun_direction: Vec3,
        exposure: f32,
    ) -> Vec3 {
        tone_map(self.composite(base, skylight, normal, sun_direction), exposure)
    }
}

/// Base color lookup for a surface point.
pub trait AlbedoSource {
    /// Linear RGB albedo at scene-space `position` with texture coordinate `uv`.
    fn albedo(&self, position: Vec3, uv: Vec2) -> Vec3;
}

/// Single color everywhere.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConstantAlbedo(pub Vec3);

impl AlbedoSource for ConstantAlbedo {
    fn albedo(&self, _position: Vec3, _uv: Vec2) -> Vec3 {
        self.0
    }
}

/// Height-banded volcanic palette: dark basalt in the lowlands, ash and rock
/// on the slopes, pale deposits near the peaks. A faint UV checker breaks up
/// large flat areas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProceduralAlbedo {
    /// Scene-space height mapped to the bottom of the palette.
    pub low: f32,
    /// Scene-space height mapped to the top of the palette.
    pub high: f32,
}

impl Default for ProceduralAlbedo {
    fn default() -> Self {
        Self {
            low: -0.1,
            high: 0.1,
        }
    }
}

impl ProceduralAlbedo {
    const BASALT: Vec3 = Vec3::new(0.08, 0.07, 0.06);
    const ASH: Vec3 = Vec3::new(0.32, 0.27, 0.22);
    const DEPOSIT: Vec3 = Vec3::new(0.62, 0.58, 0.52);
}

impl AlbedoSource for ProceduralAlbedo {
    fn albedo(&self, position: Vec3, uv: Vec2) -> Vec3 {
        let span = (self.high - self.low).max(f32::EPSILON);
        let t = ((position.y - self.low) / span).clamp(0.0, 1.0);
        let color = if t < 0.5 {
            Self::BASALT.lerp(Self::ASH, t * 2.0)
        } else {
            Self::ASH.lerp(Self::DEPOSIT, (t - 0.5) * 2.0)
        };
        let cell = (uv * 32.0).floor();
        let checker = if (cell.x + cell.y).rem_euclid(2.0) < 1.0 {
            1.0
        } else {
            0.94
        };
        color * checker
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tone_map_bounds() {
        assert_eq!(tone_map(Vec3::ZERO, 4.0), Vec3::ZERO);
        let bright = tone_map(Vec3::splat(1000.0), 4.0);
        assert!(bright.abs_diff_eq(Vec3::ONE, 1e-6));
        let mid = tone_map(Vec3::splat(0.25), 4.0);
        assert!((mid.x - (1.0 - (-1.0_f32).exp())).abs() < 1e-6);
    }

    #[test]
    fn test_back_facing_surface_gets_only_ambient() {
        let model = SurfaceShadingModel::default();
        let base = Vec3::splat(0.5);
        let sky = Vec3::splat(2.0);
        let lit = model.composite(base, sky, Vec3::NEG_Y, Vec3::Y);
        let expected = 0.1 * base * sky * AMBIENT_SCALE;
        assert!(lit.abs_diff_eq(expected, 1e-7));
    }

    #[test]
    fn test_diffuse_follows_cosine() {
        let model = SurfaceShadingModel::new(0.0);
        let base = Vec3::ONE;
        let sky = Vec3::ONE;
        let overhead = model.composite(base, sky, Vec3::Y, Vec3::Y);
        let oblique = model.composite(base, sky, Vec3::Y, Vec3::new(1.0, 1.0, 0.0));
        assert!(overhead.abs_diff_eq(Vec3::ONE, 1e-6));
        assert!((oblique.x - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-5);
    }

    #[test]
    fn test_black_skylight_is_black() {
        let model = SurfaceShadingModel::default();
        let out = model.shade(Vec3::ONE, Vec3::ZERO, Vec3::Y, Vec3::Y, 4.0);
        assert_eq!(out, Vec3::ZERO);
    }

    #[test]
    fn test_procedural_albedo_brightens_with_height() {
        let albedo = ProceduralAlbedo::default();
        let low = albedo.albedo(Vec3::new(0.0, -0.2, 0.0), Vec2::ZERO);
        let high = albedo.albedo(Vec3::new(0.0, 0.2, 0.0), Vec2::ZERO);
        assert!(high.x > low.x);
        assert!(low.min_element() >= 0.0 && high.max_element() <= 1.0);
    }
}
