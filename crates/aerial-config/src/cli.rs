//! Command-line argument parsing for the Aerial viewer.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Aerial command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "aerial", about = "Atmospheric scattering terrain viewer")]
pub struct CliArgs {
    /// Output width in pixels.
    #[arg(long)]
    pub width: Option<u32>,

    /// Output height in pixels.
    #[arg(long)]
    pub height: Option<u32>,

    /// Number of frames to simulate.
    #[arg(long)]
    pub frames: Option<u32>,

    /// Initial sun elevation angle in radians.
    #[arg(long)]
    pub sun_angle: Option<f32>,

    /// Start with the sun cycle running.
    #[arg(long)]
    pub cycle: Option<bool>,

    /// Directory for PNG snapshots.
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Assimp-style JSON mesh to render instead of the generated terrain.
    #[arg(long)]
    pub mesh: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(w) = args.width {
            self.window.width = w;
        }
        if let Some(h) = args.height {
            self.window.height = h;
        }
        if let Some(frames) = args.frames {
            self.render.frames = frames;
        }
        if let Some(angle) = args.sun_angle {
            self.sun.initial_angle = angle;
        }
        if let Some(cycle) = args.cycle {
            self.sun.cycle_on_start = cycle;
        }
        if let Some(ref dir) = args.output {
            self.render.output_dir = dir.clone();
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = CliArgs {
            width: Some(1920),
            sun_angle: Some(0.1),
            output: Some(PathBuf::from("shots")),
            ..Default::default()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.window.width, 1920);
        assert!((config.sun.initial_angle - 0.1).abs() < f32::EPSILON);
        assert_eq!(config.render.output_dir, PathBuf::from("shots"));
        // Non-overridden fields retain defaults
        assert_eq!(config.window.height, 360);
        assert!(!config.sun.cycle_on_start);
    }

    #[test]
    fn test_cli_no_override() {
        let original = Config::default();
        let mut config = Config::default();
        config.apply_cli_overrides(&CliArgs::default());
        assert_eq!(config, original);
    }

    #[test]
    fn test_cli_parses_flags() {
        let args = CliArgs::parse_from([
            "aerial",
            "--frames",
            "30",
            "--cycle",
            "true",
            "--mesh",
            "volcano.json",
        ]);
        assert_eq!(args.frames, Some(30));
        assert_eq!(args.cycle, Some(true));
        assert_eq!(args.mesh, Some(PathBuf::from("volcano.json")));
    }
}
