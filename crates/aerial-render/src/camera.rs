//! Perspective projection and the output viewport it is sized for.

use glam::{Mat4, Vec3};

/// Output surface size in pixels. Never zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    /// Viewport with both sides clamped to at least one pixel.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Right-handed perspective projection with `[0, 1]` depth.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projection {
    /// Vertical field of view in radians.
    pub fov_y: f32,
    /// Width / height.
    pub aspect_ratio: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Projection {
    fn default() -> Self {
        Self {
            fov_y: 45.0_f32.to_radians(),
            aspect_ratio: 16.0 / 9.0,
            near: 0.001,
            far: 1000.0,
        }
    }
}

impl Projection {
    pub fn new(fov_y_degrees: f32, viewport: Viewport, near: f32, far: f32) -> Self {
        Self {
            fov_y: fov_y_degrees.to_radians(),
            aspect_ratio: viewport.aspect_ratio(),
            near,
            far,
        }
    }

    /// Track a new output size.
    pub fn resize(&mut self, viewport: Viewport) {
        self.aspect_ratio = viewport.aspect_ratio();
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect_ratio, self.near, self.far)
    }

    /// World-space unit direction through normalized device coordinates
    /// `(ndc_x, ndc_y)`, given the inverse of the view matrix.
    pub fn view_ray(&self, inverse_view: &Mat4, ndc_x: f32, ndc_y: f32) -> Vec3 {
        view_ray(&self.matrix(), inverse_view, ndc_x, ndc_y)
    }
}

/// Unit world-space ray through `(ndc_x, ndc_y)` for a perspective
/// `projection` matrix. The focal scales come off the matrix diagonal.
pub fn view_ray(projection: &Mat4, inverse_view: &Mat4, ndc_x: f32, ndc_y: f32) -> Vec3 {
    let camera_space = Vec3::new(
        ndc_x / projection.x_axis.x,
        ndc_y / projection.y_axis.y,
        -1.0,
    );
    inverse_view
        .transform_vector3(camera_space)
        .normalize_or_zero()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewport_never_zero() {
        let vp = Viewport::new(0, 0);
        assert_eq!((vp.width, vp.height), (1, 1));
        assert_eq!(vp.aspect_ratio(), 1.0);
    }

    #[test]
    fn test_resize_updates_aspect() {
        let mut projection = Projection::new(45.0, Viewport::new(640, 360), 0.001, 1000.0);
        assert!((projection.aspect_ratio - 16.0 / 9.0).abs() < 1e-6);
        projection.resize(Viewport::new(300, 300));
        assert_eq!(projection.aspect_ratio, 1.0);
    }

    #[test]
    fn test_depth_range() {
        let projection = Projection::default();
        let m = projection.matrix();
        let near = m.project_point3(Vec3::new(0.0, 0.0, -projection.near));
        let far = m.project_point3(Vec3::new(0.0, 0.0, -projection.far));
        assert!(near.z.abs() < 1e-4, "{near:?}");
        assert!((far.z - 1.0).abs() < 1e-4, "{far:?}");
    }

    #[test]
    fn test_center_ray_follows_view() {
        let view = Mat4::look_at_rh(Vec3::ZERO, Vec3::X, Vec3::Y);
        let projection = Projection {
            near: 0.1,
            far: 100.0,
            ..Projection::default()
        };
        let inverse = view.inverse();
        let dir = projection.view_ray(&inverse, 0.0, 0.0);
        assert!(dir.abs_diff_eq(Vec3::X, 1e-5), "{dir:?}");
        let top = projection.view_ray(&inverse, 0.0, 1.0);
        assert!((top.y.atan2(top.x) - projection.fov_y * 0.5).abs() < 1e-5);
        // The ray through a corner lands on the same pixel after projection.
        let corner = projection.view_ray(&inverse, 1.0, -1.0);
        let ndc = (projection.matrix() * view).project_point3(corner * 10.0);
        assert!((ndc.x - 1.0).abs() < 1e-4 && (ndc.y + 1.0).abs() < 1e-4, "{ndc:?}");
    }
}
