//! PNG snapshots of rendered frames.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::info;

use crate::backend::Framebuffer;

/// Error type for image output.
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("failed to write image: {0}")]
    Io(#[from] std::io::Error),

    #[error("PNG encoding failed: {0}")]
    Encoding(#[from] png::EncodingError),
}

/// File name for the snapshot of frame `index` inside `dir`.
pub fn snapshot_path(dir: &Path, index: u64) -> PathBuf {
    dir.join(format!("frame_{index:05}.png"))
}

/// Encode `image` as an 8-bit RGBA PNG into `writer`.
pub fn encode_png<W: Write>(image: &Framebuffer, writer: W) -> Result<(), OutputError> {
    let mut encoder = png::Encoder::new(writer, image.width(), image.height());
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(image.pixels())?;
    writer.finish()?;
    Ok(())
}

/// Write `image` to `path`, creating parent directories as needed.
pub fn write_png(image: &Framebuffer, path: &Path) -> Result<(), OutputError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    let file = BufWriter::new(File::create(path)?);
    encode_png(image, file)?;
    info!(path = %path.display(), width = image.width(), height = image.height(), "snapshot written");
    Ok(())
}
