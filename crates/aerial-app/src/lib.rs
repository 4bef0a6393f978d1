//! Aerial viewer application: the per-frame orchestrator, startup wiring,
//! demo terrain, and the headless frame loop used by the binary.

pub mod error;
pub mod orchestrator;
pub mod setup;
pub mod terrain;

use std::path::PathBuf;

use aerial_config::RenderConfig;
use aerial_render::{RenderBackend, snapshot_path, write_png};
use tracing::{info, trace};

pub use error::AppError;
pub use orchestrator::{Ambient, Orchestrator};
pub use terrain::{TerrainSampler, TerrainShape, generate_terrain};

/// What a headless run produced.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub frames: u64,
    /// Simulated time in milliseconds.
    pub sim_ms: f64,
    pub snapshots: Vec<PathBuf>,
}

/// Whether frame `index` of `total` is written to disk.
pub fn is_snapshot_frame(index: u64, total: u64, every: u32) -> bool {
    if every == 0 {
        index + 1 == total
    } else {
        (index + 1) % every as u64 == 0 || index + 1 == total
    }
}

/// Run `render.frames` frames and write PNG snapshots into
/// `render.output_dir`.
///
/// Every frame advances the simulation by exactly `render.frame_dt_ms`, then
/// renders. A zero frame time freezes the sun.
pub fn run_headless<B: RenderBackend>(
    orchestrator: &mut Orchestrator<B>,
    render: &RenderConfig,
) -> Result<RunSummary, AppError> {
    let frame_ms = render.frame_dt_ms;
    if !frame_ms.is_finite() || frame_ms < 0.0 {
        return Err(AppError::InvalidFrameTime(frame_ms));
    }
    let total = u64::from(render.frames);
    let mut summary = RunSummary::default();

    info!(frames = total, frame_ms, "headless run started");
    for index in 0..total {
        orchestrator.step(frame_ms);
        orchestrator.render()?;
        summary.frames += 1;
        summary.sim_ms += f64::from(frame_ms);
        trace!(index, "frame rendered");

        if is_snapshot_frame(index, total, render.snapshot_every) {
            let image = orchestrator.backend().capture()?;
            let path = snapshot_path(&render.output_dir, index);
            write_png(&image, &path)?;
            summary.snapshots.push(path);
        }
    }

    info!(
        frames = summary.frames,
        snapshots = summary.snapshots.len(),
        sim_ms = summary.sim_ms,
        "headless run finished"
    );
    Ok(summary)
}
