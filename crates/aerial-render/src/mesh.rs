//! Indexed mesh input and its expansion into a flat, triangle-major vertex
//! buffer (three independent vertices per face).

use std::path::Path;

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Error type for mesh ingestion.
#[derive(Debug, thiserror::Error)]
pub enum MeshError {
    #[error("failed to read mesh file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed mesh JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The scene document contains no meshes.
    #[error("mesh document contains no meshes")]
    NoMesh,

    /// A flat attribute array is not a whole number of elements.
    #[error("{attribute} array length {len} is not a multiple of {stride}")]
    BadStride {
        attribute: &'static str,
        len: usize,
        stride: usize,
    },

    /// A face references a vertex that does not exist.
    #[error("face {face} references vertex {index}, but the mesh has {vertex_count} vertices")]
    IndexOutOfRange {
        face: usize,
        index: u32,
        vertex_count: usize,
    },
}

/// Indexed mesh as produced by a loader: flat position/normal/UV arrays
/// sharing one vertex index space, plus index triples.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawMesh {
    /// Positions, 3 floats per vertex.
    pub vertices: Vec<f32>,
    /// Normals, 3 floats per vertex. May be empty.
    #[serde(default)]
    pub normals: Vec<f32>,
    pub faces: Vec<[u32; 3]>,
    /// Texture coordinates, 2 floats per vertex. May be empty.
    #[serde(default)]
    pub uvs: Vec<f32>,
}

#[derive(Deserialize)]
struct AssimpScene {
    meshes: Vec<AssimpMesh>,
}

#[derive(Deserialize)]
struct AssimpMesh {
    vertices: Vec<f32>,
    #[serde(default)]
    normals: Vec<f32>,
    faces: Vec<[u32; 3]>,
    #[serde(default)]
    texturecoords: Vec<Vec<f32>>,
}

impl RawMesh {
    /// Parse the first mesh of an assimp JSON export
    /// (`meshes[0].{vertices, normals, faces, texturecoords[0]}`).
    pub fn from_assimp_json(text: &str) -> Result<Self, MeshError> {
        let scene: AssimpScene = serde_json::from_str(text)?;
        let mesh = scene.meshes.into_iter().next().ok_or(MeshError::NoMesh)?;
        let raw = Self {
            vertices: mesh.vertices,
            normals: mesh.normals,
            faces: mesh.faces,
            uvs: mesh.texturecoords.into_iter().next().unwrap_or_default(),
        };
        raw.validate()?;
        Ok(raw)
    }

    /// Read and parse an assimp JSON file.
    pub fn load_assimp_json(path: &Path) -> Result<Self, MeshError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_assimp_json(&text)
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 3
    }

    /// Check array strides and face index ranges.
    pub fn validate(&self) -> Result<(), MeshError> {
        for (attribute, len, stride) in [
            ("vertices", self.vertices.len(), 3),
            ("normals", self.normals.len(), 3),
            ("uvs", self.uvs.len(), 2),
        ] {
            if len % stride != 0 {
                return Err(MeshError::BadStride {
                    attribute,
                    len,
                    stride,
                });
            }
        }
        let vertex_count = self.vertex_count();
        for (face, indices) in self.faces.iter().enumerate() {
            if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertex_count) {
                return Err(MeshError::IndexOutOfRange {
                    face,
                    index,
                    vertex_count,
                });
            }
        }
        Ok(())
    }

    fn position(&self, index: u32) -> Vec3 {
        read3(&self.vertices, index).unwrap_or(Vec3::ZERO)
    }

    fn normal(&self, index: u32) -> Option<Vec3> {
        read3(&self.normals, index)
    }

    fn uv(&self, index: u32) -> Vec2 {
        let i = index as usize * 2;
        match self.uvs.get(i..i + 2) {
            Some(&[u, v]) => Vec2::new(u, v),
            _ => Vec2::ZERO,
        }
    }
}

fn read3(data: &[f32], index: u32) -> Option<Vec3> {
    let i = index as usize * 3;
    match data.get(i..i + 3) {
        Some(&[x, y, z]) => Some(Vec3::new(x, y, z)),
        _ => None,
    }
}

/// Where per-vertex normals come from during expansion.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum NormalSource {
    /// Loaded per-vertex normals. Vertices without one get the face normal.
    #[default]
    Loaded,
    /// Flat shading: every vertex of a face carries the face normal.
    Face,
}

/// Geometric normal of triangle `abc` (counter-clockwise front face).
pub fn face_normal(a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    let ab = (b - a).normalize_or_zero();
    let ac = (c - a).normalize_or_zero();
    ab.cross(ac).try_normalize().unwrap_or(Vec3::Y)
}

/// Interleaved vertex: position, normal, UV. 32 bytes.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    pub fn new(position: Vec3, normal: Vec3, uv: Vec2) -> Self {
        Self {
            position: position.to_array(),
            normal: normal.to_array(),
            uv: uv.to_array(),
        }
    }

    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }

    pub fn normal(&self) -> Vec3 {
        Vec3::from_array(self.normal)
    }

    pub fn uv(&self) -> Vec2 {
        Vec2::from_array(self.uv)
    }
}

/// Flat, non-indexed vertex buffer: `faces x 3` vertices in face order.
/// Immutable once built.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VertexBuffer {
    vertices: Vec<Vertex>,
}

impl VertexBuffer {
    /// Expand an indexed mesh. Face indices must be in range
    /// (see [`RawMesh::validate`]).
    pub fn expand(mesh: &RawMesh, normals: NormalSource) -> Self {
        debug_assert!(mesh.validate().is_ok(), "malformed mesh passed to expand");

        let mut vertices = Vec::with_capacity(mesh.faces.len() * 3);
        for &[a, b, c] in &mesh.faces {
            let corners = [a, b, c].map(|i| mesh.position(i));
            let flat = face_normal(corners[0], corners[1], corners[2]);
            for (index, position) in [a, b, c].into_iter().zip(corners) {
                let normal = match normals {
                    NormalSource::Loaded => mesh.normal(index).unwrap_or(flat),
                    NormalSource::Face => flat,
                };
                vertices.push(Vertex::new(position, normal, mesh.uv(index)));
            }
        }
        Self { vertices }
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn triangle_count(&self) -> usize {
        self.vertices.len() / 3
    }

    /// Triangles in buffer order.
    pub fn triangles(&self) -> impl Iterator<Item = &[Vertex]> + '_ {
        self.vertices.chunks_exact(3)
    }

    /// Raw bytes for upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Unit quad in the XZ plane, two faces sharing an edge.
    fn quad() -> RawMesh {
        RawMesh {
            vertices: vec![
                0.0, 0.0, 0.0, //
                1.0, 0.0, 0.0, //
                1.0, 0.0, 1.0, //
                0.0, 0.0, 1.0,
            ],
            normals: vec![
                0.0, 1.0, 0.0, //
                0.6, 0.8, 0.0, //
                0.0, 1.0, 0.0, //
                0.0, 0.8, 0.6,
            ],
            faces: vec![[0, 2, 1], [0, 3, 2]],
            uvs: vec![0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0],
        }
    }

    #[test]
    fn test_expand_is_triangle_major() {
        let buffer = VertexBuffer::expand(&quad(), NormalSource::Loaded);
        assert_eq!(buffer.len(), 6);
        assert_eq!(buffer.triangle_count(), 2);
        let v = buffer.vertices();
        assert_eq!(v[1].position, [1.0, 0.0, 1.0]);
        assert_eq!(v[2].uv, [1.0, 0.0]);
        // Shared vertex 0 is duplicated, not indexed.
        assert_eq!(v[0].position, v[3].position);
    }

    #[test]
    fn test_loaded_normals_are_authoritative() {
        let buffer = VertexBuffer::expand(&quad(), NormalSource::Loaded);
        assert_eq!(buffer.vertices()[2].normal, [0.6, 0.8, 0.0]);
    }

    #[test]
    fn test_face_normals_are_uniform() {
        let buffer = VertexBuffer::expand(&quad(), NormalSource::Face);
        for tri in buffer.triangles() {
            for v in tri {
                assert!(v.normal().abs_diff_eq(Vec3::Y, 1e-6), "{:?}", v.normal);
            }
        }
    }

    #[test]
    fn test_missing_normals_fall_back_to_face() {
        let mut mesh = quad();
        mesh.normals.clear();
        let buffer = VertexBuffer::expand(&mesh, NormalSource::Loaded);
        assert!(buffer.vertices()[1].normal().abs_diff_eq(Vec3::Y, 1e-6));
    }

    #[test]
    fn test_byte_view_matches_stride() {
        let buffer = VertexBuffer::expand(&quad(), NormalSource::Loaded);
        assert_eq!(std::mem::size_of::<Vertex>(), 32);
        assert_eq!(buffer.as_bytes().len(), 6 * 32);
    }

    #[test]
    fn test_degenerate_face_normal() {
        let n = face_normal(Vec3::ZERO, Vec3::ZERO, Vec3::X);
        assert_eq!(n, Vec3::Y);
    }

    #[test]
    fn test_assimp_json_first_mesh() {
        let text = r#"{
            "meshes": [{
                "vertices": [0, 0, 0, 1, 0, 0, 0, 0, 1],
                "normals": [0, 1, 0, 0, 1, 0, 0, 1, 0],
                "faces": [[0, 2, 1]],
                "texturecoords": [[0, 0, 1, 0, 0, 1]]
            }]
        }"#;
        let mesh = RawMesh::from_assimp_json(text).unwrap();
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.uvs.len(), 6);
        assert_eq!(mesh.faces, vec![[0, 2, 1]]);
    }

    #[test]
    fn test_assimp_json_without_meshes() {
        let err = RawMesh::from_assimp_json(r#"{"meshes": []}"#).unwrap_err();
        assert!(matches!(err, MeshError::NoMesh));
    }

    #[test]
    fn test_out_of_range_face_is_reported() {
        let text = r#"{"meshes": [{"vertices": [0, 0, 0], "faces": [[0, 0, 5]]}]}"#;
        let err = RawMesh::from_assimp_json(text).unwrap_err();
        assert!(matches!(
            err,
            MeshError::IndexOutOfRange {
                face: 0,
                index: 5,
                vertex_count: 1
            }
        ));
    }

    #[test]
    fn test_bad_stride_is_reported() {
        let mesh = RawMesh {
            vertices: vec![0.0; 4],
            ..Default::default()
        };
        assert!(matches!(
            mesh.validate(),
            Err(MeshError::BadStride {
                attribute: "vertices",
                ..
            })
        ));
    }
}
