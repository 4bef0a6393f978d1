//! The binary entry point for the Aerial viewer.

use std::process::ExitCode;

use aerial_app::{AppError, run_headless, setup};
use aerial_config::{CliArgs, Config, default_config_dir};
use clap::Parser;
use tracing::{error, info};

fn run(args: &CliArgs, config: &Config, config_dir: &std::path::Path) -> Result<(), AppError> {
    let bindings = setup::load_bindings(config_dir)?;
    let mut orchestrator =
        setup::build_orchestrator(config, args.mesh.as_deref())?.with_bindings(bindings);
    let summary = run_headless(&mut orchestrator, &config.render)?;
    for path in &summary.snapshots {
        info!("wrote {}", path.display());
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = CliArgs::parse();

    // Resolve config directory
    let config_dir = args.config.clone().unwrap_or_else(default_config_dir);

    // Load or create config, then apply CLI overrides
    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    aerial_log::init_logging(Some(&log_dir), config.debug.log_to_file, Some(&config));
    info!(
        title = %config.window.title,
        width = config.window.width,
        height = config.window.height,
        backend = %config.render.backend,
        "starting"
    );

    match run(&args, &config, &config_dir) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
