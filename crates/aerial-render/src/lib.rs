//! Rendering side of the viewer: mesh expansion, surface shading, typed
//! per-frame parameters, the backend seam, and a CPU backend that writes PNG
//! snapshots.

pub mod backend;
pub mod camera;
pub mod mesh;
pub mod output;
pub mod shading;
pub mod software;
pub mod uniforms;

pub use backend::{
    Framebuffer, MAX_SURFACE_DIMENSION, RenderBackend, RenderContextError, check_surface,
};
pub use camera::{Projection, Viewport, view_ray};
pub use mesh::{MeshError, NormalSource, RawMesh, Vertex, VertexBuffer, face_normal};
pub use output::{OutputError, encode_png, snapshot_path, write_png};
pub use shading::{
    AMBIENT_SCALE, AlbedoSource, ConstantAlbedo, ProceduralAlbedo, SurfaceShadingModel, tone_map,
};
pub use software::SoftwareBackend;
pub use uniforms::{FrameParams, ParamError, SkyParams, TerrainParams};
