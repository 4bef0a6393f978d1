//! Closed-form ray/sphere intersection used to bound integration domains.

use glam::Vec3;

/// Sentinel distance returned when a ray misses a sphere or the sphere lies
/// entirely behind the ray origin.
pub const NO_HIT: f32 = -1.0;

/// Directions shorter than this (squared length) are treated as degenerate.
const MIN_DIRECTION_LENGTH_SQ: f32 = 1e-12;

/// Distance along `dir` to the nearest non-negative intersection with the
/// sphere, or [`NO_HIT`].
///
/// Solves `|O - C + tD|^2 = r^2`. A tangent ray yields its single root when
/// that root is in front of the origin. When the origin is inside the sphere
/// exactly one root is non-negative and that exit distance is returned.
#[inline]
pub fn ray_sphere_intersect(origin: Vec3, dir: Vec3, center: Vec3, radius: f32) -> f32 {
    let oc = origin - center;
    let a = dir.dot(dir);
    if a <= MIN_DIRECTION_LENGTH_SQ {
        return NO_HIT;
    }
    let b = 2.0 * oc.dot(dir);
    let c = oc.dot(oc) - radius * radius;
    let delta = b * b - 4.0 * a * c;

    if delta < 0.0 {
        return NO_HIT;
    }
    if delta == 0.0 {
        let t = -b / (2.0 * a);
        return if t >= 0.0 { t } else { NO_HIT };
    }

    let sqrt_delta = delta.sqrt();
    let near = (-b - sqrt_delta) / (2.0 * a);
    let far = (-b + sqrt_delta) / (2.0 * a);

    if near >= 0.0 {
        near
    } else if far >= 0.0 {
        far
    } else {
        NO_HIT
    }
}

/// [`ray_sphere_intersect`] with the sentinel mapped to `None`.
#[inline]
pub fn ray_sphere_hit(origin: Vec3, dir: Vec3, center: Vec3, radius: f32) -> Option<f32> {
    let t = ray_sphere_intersect(origin, dir, center, radius);
    (t >= 0.0).then_some(t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outside_aimed_at_center_hits_near_surface() {
        let origin = Vec3::new(3.0, 4.0, 12.0);
        let center = Vec3::new(1.0, 1.0, 1.0);
        let radius = 2.5;
        let dir = (center - origin).normalize();
        let t = ray_sphere_intersect(origin, dir, center, radius);
        let expected = (origin - center).length() - radius;
        assert!((t - expected).abs() < 1e-4, "t={t}, expected={expected}");
    }

    #[test]
    fn test_outside_aimed_away_misses() {
        let origin = Vec3::new(0.0, 0.0, 10.0);
        let t = ray_sphere_intersect(origin, Vec3::Z, Vec3::ZERO, 2.0);
        assert_eq!(t, NO_HIT);
        assert!(ray_sphere_hit(origin, Vec3::Z, Vec3::ZERO, 2.0).is_none());
    }

    #[test]
    fn test_inside_returns_exit_root() {
        let origin = Vec3::new(0.0, 0.5, 0.0);
        let t = ray_sphere_intersect(origin, Vec3::Y, Vec3::ZERO, 2.0);
        assert!((t - 1.5).abs() < 1e-6, "t={t}");
        let t_down = ray_sphere_intersect(origin, Vec3::NEG_Y, Vec3::ZERO, 2.0);
        assert!((t_down - 2.5).abs() < 1e-6, "t_down={t_down}");
    }

    #[test]
    fn test_lateral_miss() {
        let t = ray_sphere_intersect(Vec3::new(0.0, 10.0, 0.0), Vec3::X, Vec3::ZERO, 1.0);
        assert_eq!(t, NO_HIT);
    }

    #[test]
    fn test_tangent_ray_returns_single_root() {
        // Grazes the unit sphere at (0, 1, 0).
        let origin = Vec3::new(-4.0, 1.0, 0.0);
        let t = ray_sphere_intersect(origin, Vec3::X, Vec3::ZERO, 1.0);
        assert!((t - 4.0).abs() < 1e-5, "t={t}");
    }

    #[test]
    fn test_tangent_ray_behind_origin_misses() {
        let origin = Vec3::new(4.0, 1.0, 0.0);
        let t = ray_sphere_intersect(origin, Vec3::X, Vec3::ZERO, 1.0);
        assert_eq!(t, NO_HIT);
    }

    #[test]
    fn test_degenerate_direction_misses() {
        let t = ray_sphere_intersect(Vec3::new(0.0, 5.0, 0.0), Vec3::ZERO, Vec3::ZERO, 1.0);
        assert_eq!(t, NO_HIT);
    }

    #[test]
    fn test_atmosphere_exit_from_surface_is_shell_thickness() {
        let planet = 6_360_000.0_f32;
        let atmosphere = 6_420_000.0_f32;
        let origin = Vec3::new(0.0, planet, 0.0);
        let t = ray_sphere_intersect(origin, Vec3::Y, Vec3::ZERO, atmosphere);
        let expected = atmosphere - planet;
        assert!(
            (t - expected).abs() / expected < 1e-3,
            "Path {t} should be ~{expected}"
        );
    }
}
