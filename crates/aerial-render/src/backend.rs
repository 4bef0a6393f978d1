//! Seam between the frame driver and whatever draws the frame.

use glam::Vec3;

use crate::camera::Viewport;
use crate::mesh::VertexBuffer;
use crate::uniforms::FrameParams;

/// Largest accepted surface side in pixels.
pub const MAX_SURFACE_DIMENSION: u32 = 16_384;

/// Error type for backend creation and surface management failures.
#[derive(Debug, thiserror::Error)]
pub enum RenderContextError {
    /// Requested surface size is unusable.
    #[error("invalid surface size {width}x{height}")]
    InvalidSurface { width: u32, height: u32 },

    /// No backend by this name is available in this build.
    #[error("unsupported render backend: {0}")]
    Unsupported(String),

    /// Surface lost and could not be recovered.
    #[error("surface lost and could not be recovered")]
    SurfaceLost,
}

/// Validate a requested surface size.
pub fn check_surface(width: u32, height: u32) -> Result<Viewport, RenderContextError> {
    if width == 0 || height == 0 || width > MAX_SURFACE_DIMENSION || height > MAX_SURFACE_DIMENSION {
        return Err(RenderContextError::InvalidSurface { width, height });
    }
    Ok(Viewport::new(width, height))
}

/// Something that can rasterize the terrain and sky for a frame.
pub trait RenderBackend {
    /// Current surface size.
    fn viewport(&self) -> Viewport;

    /// Resize the output surface. Sides are clamped to at least one pixel.
    fn resize(&mut self, viewport: Viewport);

    /// Replace the terrain geometry. Called once at load time.
    fn upload_mesh(&mut self, mesh: VertexBuffer);

    /// Draw one frame.
    fn render(&mut self, frame: &FrameParams) -> Result<(), RenderContextError>;

    /// Copy of the last rendered image.
    fn capture(&self) -> Result<Framebuffer, RenderContextError>;
}

/// Tightly packed RGBA8 image, rows top to bottom.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Framebuffer {
    /// Opaque black image.
    pub fn new(viewport: Viewport) -> Self {
        let mut pixels = vec![0; viewport.pixel_count() * 4];
        for alpha in pixels.iter_mut().skip(3).step_by(4) {
            *alpha = u8::MAX;
        }
        Self {
            width: viewport.width,
            height: viewport.height,
            pixels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Store a display-range color, clamped to `[0, 1]` and quantized.
    pub fn set(&mut self, x: u32, y: u32, color: Vec3) {
        if x >= self.width || y >= self.height {
            return;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let c = color.clamp(Vec3::ZERO, Vec3::ONE) * 255.0 + 0.5;
        // NaN clamps through to 0 on the float-to-int cast.
        self.pixels[i] = c.x as u8;
        self.pixels[i + 1] = c.y as u8;
        self.pixels[i + 2] = c.z as u8;
        self.pixels[i + 3] = u8::MAX;
    }

    /// RGBA at `(x, y)`, or `None` outside the image.
    pub fn get(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let mut px = [0; 4];
        px.copy_from_slice(&self.pixels[i..i + 4]);
        Some(px)
    }
}
