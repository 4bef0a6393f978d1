use aerial_atmosphere::AtmosphereError;
use aerial_config::ConfigError;
use aerial_render::{MeshError, OutputError, ParamError, RenderContextError};

/// Top-level failure of a viewer run.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid atmosphere: {0}")]
    Atmosphere(#[from] AtmosphereError),

    #[error("failed to load mesh: {0}")]
    Mesh(#[from] MeshError),

    #[error("render backend failed: {0}")]
    Render(#[from] RenderContextError),

    #[error("invalid frame parameters: {0}")]
    Params(#[from] ParamError),

    #[error(transparent)]
    Output(#[from] OutputError),

    #[error("frame time must be finite and non-negative, got {0} ms")]
    InvalidFrameTime(f32),

    #[error("failed to read key bindings: {0}")]
    BindingsRead(std::io::Error),

    #[error("failed to parse key bindings: {0}")]
    BindingsParse(#[from] ron::error::SpannedError),
}
