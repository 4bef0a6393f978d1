//! CPU backend: z-buffered triangle rasterization into a surface buffer,
//! then one shading pass that runs the scattering integrator per pixel.
//!
//! Terrain pixels get aerial-perspective skylight; pixels no triangle
//! covers get the sky-dome color for their view ray.

use aerial_atmosphere::{PlanetFrame, ScatteringIntegrator};
use glam::{Mat4, Vec2, Vec3, Vec4};
use tracing::{debug, trace};

use crate::backend::{
    Framebuffer, MAX_SURFACE_DIMENSION, RenderBackend, RenderContextError, check_surface,
};
use crate::camera::{Viewport, view_ray};
use crate::mesh::{Vertex, VertexBuffer};
use crate::shading::{AlbedoSource, SurfaceShadingModel, tone_map};
use crate::uniforms::FrameParams;

/// Interpolated surface attributes stored per covered pixel.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Fragment {
    depth: f32,
    position: Vec3,
    normal: Vec3,
    uv: Vec2,
}

/// Vertex after the view-projection transform.
#[derive(Clone, Copy, Debug)]
struct ClipVertex {
    clip: Vec4,
    position: Vec3,
    normal: Vec3,
    uv: Vec2,
}

impl ClipVertex {
    fn from_vertex(vertex: &Vertex, view_proj: &Mat4) -> Self {
        let position = vertex.position();
        Self {
            clip: *view_proj * position.extend(1.0),
            position,
            normal: vertex.normal(),
            uv: vertex.uv(),
        }
    }

    fn lerp(&self, other: &Self, t: f32) -> Self {
        Self {
            clip: self.clip.lerp(other.clip, t),
            position: self.position.lerp(other.position, t),
            normal: self.normal.lerp(other.normal, t),
            uv: self.uv.lerp(other.uv, t),
        }
    }
}

/// Clip a triangle against the near plane (`z >= 0` in clip space).
/// Returns the resulting convex polygon, at most four vertices.
fn clip_near(tri: [ClipVertex; 3]) -> Vec<ClipVertex> {
    let mut out = Vec::with_capacity(4);
    for i in 0..3 {
        let a = tri[i];
        let b = tri[(i + 1) % 3];
        let a_in = a.clip.z >= 0.0;
        let b_in = b.clip.z >= 0.0;
        if a_in {
            out.push(a);
        }
        if a_in != b_in {
            let t = a.clip.z / (a.clip.z - b.clip.z);
            out.push(a.lerp(&b, t));
        }
    }
    out
}

/// True when all three vertices lie outside the same lateral or far plane.
fn trivially_outside(tri: &[ClipVertex; 3]) -> bool {
    let outside = |test: fn(Vec4) -> bool| tri.iter().all(|v| test(v.clip));
    outside(|c| c.x > c.w)
        || outside(|c| c.x < -c.w)
        || outside(|c| c.y > c.w)
        || outside(|c| c.y < -c.w)
        || outside(|c| c.z > c.w)
}

#[inline]
fn edge(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}

/// Software implementation of [`RenderBackend`].
pub struct SoftwareBackend {
    viewport: Viewport,
    color: Framebuffer,
    fragments: Vec<Option<Fragment>>,
    mesh: VertexBuffer,
    integrator: ScatteringIntegrator,
    frame: PlanetFrame,
    albedo: Box<dyn AlbedoSource + Send + Sync>,
}

impl SoftwareBackend {
    pub fn new(
        width: u32,
        height: u32,
        integrator: ScatteringIntegrator,
        frame: PlanetFrame,
        albedo: Box<dyn AlbedoSource + Send + Sync>,
    ) -> Result<Self, RenderContextError> {
        let viewport = check_surface(width, height)?;
        debug!(width, height, "software backend created");
        Ok(Self {
            viewport,
            color: Framebuffer::new(viewport),
            fragments: vec![None; viewport.pixel_count()],
            mesh: VertexBuffer::default(),
            integrator,
            frame,
            albedo,
        })
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.color
    }

    /// Whether terrain covered pixel `(x, y)` in the last frame.
    pub fn covered(&self, x: u32, y: u32) -> bool {
        if x >= self.viewport.width || y >= self.viewport.height {
            return false;
        }
        self.fragments[self.index(x, y)].is_some()
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.viewport.width as usize + x as usize
    }

    fn rasterize(&mut self, view_proj: &Mat4) {
        self.fragments.fill(None);
        let mesh = std::mem::take(&mut self.mesh);
        let mut drawn = 0usize;
        for tri in mesh.triangles() {
            let tri = [
                ClipVertex::from_vertex(&tri[0], view_proj),
                ClipVertex::from_vertex(&tri[1], view_proj),
                ClipVertex::from_vertex(&tri[2], view_proj),
            ];
            if trivially_outside(&tri) {
                continue;
            }
            let polygon = clip_near(tri);
            for i in 1..polygon.len().saturating_sub(1) {
                self.rasterize_triangle([polygon[0], polygon[i], polygon[i + 1]]);
            }
            drawn += 1;
        }
        self.mesh = mesh;
        trace!(drawn, "triangles rasterized");
    }

    fn rasterize_triangle(&mut self, tri: [ClipVertex; 3]) {
        let (w, h) = (self.viewport.width as f32, self.viewport.height as f32);
        if tri.iter().any(|v| v.clip.w <= f32::EPSILON) {
            return;
        }
        let inv_w = tri.map(|v| 1.0 / v.clip.w);
        let screen = [0, 1, 2].map(|i| {
            let ndc = tri[i].clip.truncate() * inv_w[i];
            Vec2::new((ndc.x + 1.0) * 0.5 * w, (1.0 - ndc.y) * 0.5 * h)
        });
        let depth = [0, 1, 2].map(|i| tri[i].clip.z * inv_w[i]);

        let area = edge(screen[0], screen[1], screen[2]);
        if area.abs() <= f32::EPSILON || !area.is_finite() {
            return;
        }

        let min = screen[0].min(screen[1]).min(screen[2]).floor().max(Vec2::ZERO);
        let max = screen[0]
            .max(screen[1])
            .max(screen[2])
            .ceil()
            .min(Vec2::new(w - 1.0, h - 1.0));
        if min.x > max.x || min.y > max.y {
            return;
        }

        for py in min.y as u32..=max.y as u32 {
            for px in min.x as u32..=max.x as u32 {
                let p = Vec2::new(px as f32 + 0.5, py as f32 + 0.5);
                let b = [
                    edge(screen[1], screen[2], p) / area,
                    edge(screen[2], screen[0], p) / area,
                    edge(screen[0], screen[1], p) / area,
                ];
                if b.iter().any(|&bi| bi < 0.0) {
                    continue;
                }
                let z = b[0] * depth[0] + b[1] * depth[1] + b[2] * depth[2];
                if !(0.0..=1.0).contains(&z) {
                    continue;
                }
                let index = self.index(px, py);
                if self.fragments[index].is_some_and(|f| f.depth <= z) {
                    continue;
                }

                // Perspective-correct weights.
                let pw = [b[0] * inv_w[0], b[1] * inv_w[1], b[2] * inv_w[2]];
                let sum = pw[0] + pw[1] + pw[2];
                if sum <= 0.0 {
                    continue;
                }
                let pw = pw.map(|x| x / sum);
                self.fragments[index] = Some(Fragment {
                    depth: z,
                    position: tri[0].position * pw[0]
                        + tri[1].position * pw[1]
                        + tri[2].position * pw[2],
                    normal: tri[0].normal * pw[0] + tri[1].normal * pw[1] + tri[2].normal * pw[2],
                    uv: tri[0].uv * pw[0] + tri[1].uv * pw[1] + tri[2].uv * pw[2],
                });
            }
        }
    }

    fn shade(&mut self, frame: &FrameParams) {
        let sky = frame.sky;
        let terrain = frame.terrain;
        let sky_scatter = sky.scatter();
        let terrain_scatter = terrain.scatter();
        let sun_direction = terrain_scatter.sun_direction;
        let shading = SurfaceShadingModel::new(terrain.ambient_coefficient);
        let camera = self.frame.to_planet(terrain.camera_position());
        let inverse_view = frame.view.inverse();

        let (w, h) = (self.viewport.width, self.viewport.height);
        for y in 0..h {
            for x in 0..w {
                let color = match self.fragments[self.index(x, y)] {
                    Some(fragment) => {
                        let base = self.albedo.albedo(fragment.position, fragment.uv);
                        let surface = self.frame.to_planet(fragment.position);
                        let skylight =
                            self.integrator
                                .aerial_perspective(camera, surface, &terrain_scatter);
                        shading.shade(
                            base,
                            skylight,
                            fragment.normal,
                            sun_direction,
                            terrain.exposure,
                        )
                    }
                    None => {
                        let ndc_x = (x as f32 + 0.5) / w as f32 * 2.0 - 1.0;
                        let ndc_y = 1.0 - (y as f32 + 0.5) / h as f32 * 2.0;
                        let direction = view_ray(&frame.projection, &inverse_view, ndc_x, ndc_y);
                        let radiance =
                            self.integrator
                                .sky_color(sky.camera_altitude, direction, &sky_scatter);
                        tone_map(radiance, sky.exposure)
                    }
                };
                self.color.set(x, y, color);
            }
        }
    }
}

impl RenderBackend for SoftwareBackend {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn resize(&mut self, viewport: Viewport) {
        let width = viewport.width.clamp(1, MAX_SURFACE_DIMENSION);
        let height = viewport.height.clamp(1, MAX_SURFACE_DIMENSION);
        let viewport = Viewport::new(width, height);
        if viewport == self.viewport {
            return;
        }
        debug!(width, height, "software surface resized");
        self.viewport = viewport;
        self.color = Framebuffer::new(viewport);
        self.fragments = vec![None; viewport.pixel_count()];
    }

    fn upload_mesh(&mut self, mesh: VertexBuffer) {
        debug!(triangles = mesh.triangle_count(), "terrain mesh uploaded");
        self.mesh = mesh;
    }

    fn render(&mut self, frame: &FrameParams) -> Result<(), RenderContextError> {
        self.rasterize(&frame.view_projection());
        self.shade(frame);
        Ok(())
    }

    fn capture(&self) -> Result<Framebuffer, RenderContextError> {
        Ok(self.color.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Projection;
    use crate::mesh::{NormalSource, RawMesh};
    use crate::shading::ConstantAlbedo;
    use crate::uniforms::{SkyParams, TerrainParams};
    use aerial_atmosphere::{AtmosphereModel, ScatteringToggles};

    const W: u32 = 32;
    const H: u32 = 18;

    fn backend() -> SoftwareBackend {
        let integrator = ScatteringIntegrator::new(AtmosphereModel::default());
        let frame = PlanetFrame::new(4000.0, integrator.model().planet_radius());
        SoftwareBackend::new(
            W,
            H,
            integrator,
            frame,
            Box::new(ConstantAlbedo(Vec3::splat(0.5))),
        )
        .unwrap()
    }

    /// Flat ground quad at `y = 0`, 20 units on a side, centered on the origin.
    fn ground() -> VertexBuffer {
        let mesh = RawMesh {
            vertices: vec![
                -10.0, 0.0, -10.0, //
                10.0, 0.0, -10.0, //
                10.0, 0.0, 10.0, //
                -10.0, 0.0, 10.0,
            ],
            normals: vec![0.0, 1.0, 0.0].repeat(4),
            faces: vec![[0, 2, 1], [0, 3, 2]],
            uvs: vec![0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0],
        };
        VertexBuffer::expand(&mesh, NormalSource::Loaded)
    }

    fn frame_params(eye: Vec3, target: Vec3, viewport: Viewport) -> FrameParams {
        let projection = Projection::new(45.0, viewport, 0.001, 1000.0);
        let sun = Vec3::Y;
        let color = Vec3::splat(20.0);
        FrameParams {
            view: Mat4::look_at_rh(eye, target, Vec3::Y),
            projection: projection.matrix(),
            camera_position: eye,
            sky: SkyParams::new(sun, color, 4.0, 0.2, eye.y * 4000.0, ScatteringToggles::ALL)
                .unwrap(),
            terrain: TerrainParams::new(sun, color, 4.0, 0.1, eye, ScatteringToggles::ALL)
                .unwrap(),
        }
    }

    #[test]
    fn test_ground_below_sky_above() {
        let mut backend = backend();
        backend.upload_mesh(ground());
        let eye = Vec3::new(0.0, 0.05, 0.0);
        let params = frame_params(eye, eye + Vec3::X, backend.viewport());
        backend.render(&params).unwrap();

        for x in 0..W {
            assert!(backend.covered(x, H - 1), "bottom row pixel {x} not covered");
            assert!(!backend.covered(x, 0), "top row pixel {x} covered");
        }

        let sky = backend.framebuffer().get(W / 2, 0).unwrap();
        assert!(sky[2] > sky[0], "sky should be blue: {sky:?}");
        let ground = backend.framebuffer().get(W / 2, H - 1).unwrap();
        assert!(ground[0] > 0 || ground[1] > 0 || ground[2] > 0);
    }

    #[test]
    fn test_geometry_behind_camera_is_not_drawn() {
        let mut backend = backend();
        backend.upload_mesh(ground());
        // Looking straight up from above the quad: nothing in view.
        let eye = Vec3::new(0.0, 0.05, 0.0);
        let params = frame_params(eye, eye + Vec3::new(0.0, 1.0, 0.001), backend.viewport());
        backend.render(&params).unwrap();
        for y in 0..H {
            for x in 0..W {
                assert!(!backend.covered(x, y));
            }
        }
    }

    #[test]
    fn test_nearer_surface_wins() {
        let mut backend = backend();
        let mut buffer = ground().vertices().to_vec();
        // Second, higher copy of the quad.
        buffer.extend(ground().vertices().iter().map(|v| {
            let mut v = *v;
            v.position[1] = 0.02;
            v
        }));
        let mesh = RawMesh {
            vertices: buffer.iter().flat_map(|v| v.position).collect(),
            normals: buffer.iter().flat_map(|v| v.normal).collect(),
            faces: (0..buffer.len() as u32 / 3)
                .map(|f| [f * 3, f * 3 + 1, f * 3 + 2])
                .collect(),
            uvs: buffer.iter().flat_map(|v| v.uv).collect(),
        };
        backend.upload_mesh(VertexBuffer::expand(&mesh, NormalSource::Loaded));
        let eye = Vec3::new(0.0, 0.05, 0.0);
        backend
            .render(&frame_params(eye, eye - Vec3::Y + Vec3::X * 0.001, backend.viewport()))
            .unwrap();
        let center = backend.fragments[backend.index(W / 2, H / 2)].unwrap();
        assert!((center.position.y - 0.02).abs() < 1e-4, "{center:?}");
    }

    #[test]
    fn test_resize_reallocates_surface() {
        let mut backend = backend();
        backend.resize(Viewport::new(8, 4));
        assert_eq!(backend.viewport(), Viewport::new(8, 4));
        assert_eq!(backend.capture().unwrap().pixels().len(), 8 * 4 * 4);
        backend.resize(Viewport { width: 0, height: 0 });
        assert_eq!(backend.viewport(), Viewport::new(1, 1));
    }

    #[test]
    fn test_invalid_surface_is_rejected() {
        let integrator = ScatteringIntegrator::default();
        let frame = PlanetFrame::new(4000.0, integrator.model().planet_radius());
        let result = SoftwareBackend::new(
            0,
            10,
            integrator,
            frame,
            Box::new(ConstantAlbedo(Vec3::ONE)),
        );
        assert!(matches!(
            result,
            Err(RenderContextError::InvalidSurface { .. })
        ));
    }

    #[test]
    fn test_near_clip_splits_straddling_triangle() {
        let v = |z: f32| ClipVertex {
            clip: Vec4::new(0.0, 0.0, z, 1.0),
            position: Vec3::ZERO,
            normal: Vec3::Y,
            uv: Vec2::ZERO,
        };
        assert_eq!(clip_near([v(0.5), v(0.5), v(-0.5)]).len(), 4);
        assert_eq!(clip_near([v(0.5), v(-0.5), v(-0.5)]).len(), 3);
        assert!(clip_near([v(-0.5), v(-0.5), v(-0.5)]).is_empty());
    }
}
