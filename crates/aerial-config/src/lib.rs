//! Configuration system for the Aerial terrain viewer.
//!
//! Settings persist to disk as `config.ron`, can be overridden from the
//! command line via clap, and are reloadable at runtime.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    AtmosphereConfig, CameraConfig, Config, DebugConfig, RenderConfig, SunConfig, WindowConfig,
    default_config_dir,
};
pub use error::ConfigError;
