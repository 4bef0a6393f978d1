//! Procedural demo terrain: a volcanic cone on rolling fBm hills, emitted as
//! an indexed mesh with per-vertex normals and UVs.

use aerial_render::RawMesh;
use glam::Vec3;
use noise::{NoiseFn, Simplex};

/// Shape of the generated heightfield, in scene units.
#[derive(Clone, Debug)]
pub struct TerrainShape {
    pub seed: u32,
    /// Grid cells per side.
    pub resolution: u32,
    /// Half the side length of the square patch, centered on the origin.
    pub half_extent: f32,
    /// Height of the flat base.
    pub base_height: f32,
    /// Amplitude of the first fBm octave.
    pub hill_amplitude: f32,
    /// Frequency of the first fBm octave, cycles per unit.
    pub base_frequency: f32,
    pub octaves: u32,
    /// Center of the cone on the XZ plane.
    pub cone_center: [f32; 2],
    pub cone_radius: f32,
    pub cone_height: f32,
}

impl Default for TerrainShape {
    fn default() -> Self {
        Self {
            seed: 7,
            resolution: 48,
            half_extent: 2.0,
            base_height: -0.15,
            hill_amplitude: 0.03,
            base_frequency: 1.5,
            octaves: 5,
            cone_center: [0.6, 0.0],
            cone_radius: 0.9,
            cone_height: 0.2,
        }
    }
}

/// Heightfield sampler combining the fBm hills and the cone.
pub struct TerrainSampler {
    noise: Simplex,
    params: TerrainShape,
}

impl TerrainSampler {
    pub fn new(params: TerrainShape) -> Self {
        Self {
            noise: Simplex::new(params.seed),
            params,
        }
    }

    fn fbm(&self, x: f32, z: f32) -> f32 {
        let mut total = 0.0;
        let mut frequency = self.params.base_frequency as f64;
        let mut amplitude = self.params.hill_amplitude as f64;
        for _ in 0..self.params.octaves {
            total += self.noise.get([x as f64 * frequency, z as f64 * frequency]) * amplitude;
            frequency *= 2.0;
            amplitude *= 0.5;
        }
        total as f32
    }

    fn cone(&self, x: f32, z: f32) -> f32 {
        let [cx, cz] = self.params.cone_center;
        let r = ((x - cx).powi(2) + (z - cz).powi(2)).sqrt() / self.params.cone_radius;
        let rise = (1.0 - r).max(0.0).powi(2);
        // Shallow crater at the summit.
        let crater = (1.0 - r / 0.12).max(0.0) * 0.25;
        self.params.cone_height * (rise - crater * rise)
    }

    /// Surface height at `(x, z)`.
    pub fn height(&self, x: f32, z: f32) -> f32 {
        self.params.base_height + self.fbm(x, z) + self.cone(x, z)
    }

    /// Unit surface normal at `(x, z)` from central differences.
    pub fn normal(&self, x: f32, z: f32, step: f32) -> Vec3 {
        let dx = self.height(x + step, z) - self.height(x - step, z);
        let dz = self.height(x, z + step) - self.height(x, z - step);
        Vec3::new(-dx, 2.0 * step, -dz)
            .try_normalize()
            .unwrap_or(Vec3::Y)
    }

    /// Sample the heightfield on a regular grid.
    pub fn build_mesh(&self) -> RawMesh {
        let n = self.params.resolution.max(1);
        let side = n + 1;
        let extent = self.params.half_extent;
        let step = 2.0 * extent / n as f32;

        let count = (side * side) as usize;
        let mut vertices = Vec::with_capacity(count * 3);
        let mut normals = Vec::with_capacity(count * 3);
        let mut uvs = Vec::with_capacity(count * 2);
        for j in 0..side {
            for i in 0..side {
                let x = -extent + i as f32 * step;
                let z = -extent + j as f32 * step;
                vertices.extend([x, self.height(x, z), z]);
                normals.extend(self.normal(x, z, step * 0.5).to_array());
                uvs.extend([i as f32 / n as f32, j as f32 / n as f32]);
            }
        }

        let mut faces = Vec::with_capacity((n * n * 2) as usize);
        for j in 0..n {
            for i in 0..n {
                let a = j * side + i;
                let b = a + 1;
                let c = a + side;
                let d = c + 1;
                // Counter-clockwise seen from above.
                faces.push([a, c, b]);
                faces.push([b, c, d]);
            }
        }

        RawMesh {
            vertices,
            normals,
            faces,
            uvs,
        }
    }
}

/// Generate the demo terrain mesh.
pub fn generate_terrain(params: TerrainShape) -> RawMesh {
    TerrainSampler::new(params).build_mesh()
}
