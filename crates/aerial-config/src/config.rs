//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level viewer configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Output surface settings.
    pub window: WindowConfig,
    /// Atmosphere model and shading constants.
    pub atmosphere: AtmosphereConfig,
    /// Sun animation settings.
    pub sun: SunConfig,
    /// Free-fly camera settings.
    pub camera: CameraConfig,
    /// Headless frame loop and output settings.
    pub render: RenderConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Output surface configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    /// Surface width in pixels.
    pub width: u32,
    /// Surface height in pixels.
    pub height: u32,
    /// Title used in logs and image metadata.
    pub title: String,
}

/// Atmosphere model configuration.
///
/// Distances are meters in the planet-centered frame.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AtmosphereConfig {
    /// Planet surface radius.
    pub planet_radius_m: f32,
    /// Top of the atmosphere.
    pub atmosphere_radius_m: f32,
    /// Rayleigh scale height.
    pub rayleigh_scale_height_m: f32,
    /// Mie scale height.
    pub mie_scale_height_m: f32,
    /// Rayleigh scattering coefficients at sea level (RGB, per meter).
    pub rayleigh_coefficients: [f32; 3],
    /// Mie scattering coefficient at sea level (per meter).
    pub mie_coefficient: f32,
    /// Mie anisotropy `g`, must lie in `(-1, 1)`.
    pub mie_anisotropy: f32,
    /// Quadrature samples along the sky-dome view ray.
    pub sky_view_samples: u32,
    /// Quadrature samples along each sky-dome light ray.
    pub sky_light_samples: u32,
    /// Quadrature samples along the terrain view ray.
    pub terrain_view_samples: u32,
    /// Quadrature samples along each terrain light ray.
    pub terrain_light_samples: u32,
    /// Drop a view sample whose light ray dips below the planet surface.
    pub discard_light_below_surface: bool,
    /// Sun radiance (RGB).
    pub sun_color: [f32; 3],
    /// Ambient coefficient for the terrain surface.
    pub terrain_ambient: f32,
    /// Ambient coefficient carried on the sky parameters.
    pub sky_ambient: f32,
    /// Meters per scene unit.
    pub world_scale_m: f32,
}

/// Sun animation configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SunConfig {
    /// Elevation angle at startup, radians.
    pub initial_angle: f32,
    /// Angular speed in radians per millisecond.
    pub angular_speed: f32,
    /// Elevation presets selectable with the digit keys.
    pub presets: [f32; 6],
    /// Start with the automatic cycle running.
    pub cycle_on_start: bool,
}

/// Free-fly camera configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    /// Starting position in scene units.
    pub start_position: [f32; 3],
    /// Starting yaw in radians (0 looks along +X).
    pub start_yaw: f32,
    /// Starting pitch in radians.
    pub start_pitch: f32,
    /// Scene units moved per frame while a move key is held.
    pub movement_speed: f32,
    /// Radians of rotation per pixel of pointer drag.
    pub look_sensitivity: f32,
    /// Absolute pitch limit in radians.
    pub pitch_limit: f32,
    /// Vertical field of view in degrees.
    pub fov_y_degrees: f32,
    /// Near clip distance in scene units.
    pub near: f32,
    /// Far clip distance in scene units.
    pub far: f32,
}

/// Headless render loop configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderConfig {
    /// Render backend name. Only `"software"` is built in.
    pub backend: String,
    /// Directory receiving PNG snapshots.
    pub output_dir: PathBuf,
    /// Number of frames to simulate.
    pub frames: u32,
    /// Simulated frame length in milliseconds.
    pub frame_dt_ms: f32,
    /// Write a snapshot every N frames (0 = only the last frame).
    pub snapshot_every: u32,
    /// Use face normals instead of the loaded per-vertex normals.
    pub flat_shading: bool,
    /// Grid cells per side of the generated demo terrain.
    pub terrain_resolution: u32,
    /// Noise seed for the generated demo terrain.
    pub terrain_seed: u32,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
    /// Write JSON logs next to the snapshots.
    pub log_to_file: bool,
}

// --- Default implementations ---

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 360,
            title: "Aerial".to_string(),
        }
    }
}

impl Default for AtmosphereConfig {
    fn default() -> Self {
        Self {
            planet_radius_m: 6_360_000.0,
            atmosphere_radius_m: 6_420_000.0,
            rayleigh_scale_height_m: 7994.0,
            mie_scale_height_m: 1200.0,
            rayleigh_coefficients: [5.8e-6, 13.5e-6, 33.1e-6],
            mie_coefficient: 21e-6,
            mie_anisotropy: 0.76,
            sky_view_samples: 16,
            sky_light_samples: 8,
            terrain_view_samples: 16,
            terrain_light_samples: 16,
            discard_light_below_surface: true,
            sun_color: [20.0, 20.0, 20.0],
            terrain_ambient: 0.1,
            sky_ambient: 0.2,
            world_scale_m: 4000.0,
        }
    }
}

impl Default for SunConfig {
    fn default() -> Self {
        Self {
            initial_angle: 1.57,
            angular_speed: std::f32::consts::PI / 4000.0,
            presets: [0.1, 0.7, 1.57, 2.6, 3.0, 3.12],
            cycle_on_start: false,
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            start_position: [-1.0, -0.05, 0.0],
            start_yaw: 0.0,
            start_pitch: 0.0,
            movement_speed: 0.01,
            look_sensitivity: 0.01,
            pitch_limit: 1.50,
            fov_y_degrees: 45.0,
            near: 0.001,
            far: 1000.0,
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            backend: "software".into(),
            output_dir: PathBuf::from("frames"),
            frames: 1,
            frame_dt_ms: 1000.0 / 60.0,
            snapshot_every: 0,
            flat_shading: false,
            terrain_resolution: 48,
            terrain_seed: 7,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_to_file: false,
        }
    }
}

/// Platform config directory for the viewer (`<config>/aerial`).
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("aerial")
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join("config.ron");

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join("config.ron");
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join("config.ron");
        let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let ron_str =
            ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::new().depth_limit(3))
                .unwrap();
        assert!(ron_str.contains("width: 640"));
        assert!(ron_str.contains("mie_anisotropy: 0.76"));
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let ron_str = ron::to_string(&config).unwrap();
        let deserialized: Config = ron::from_str(&ron_str).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_missing_section_uses_default() {
        let ron_str = "(window: (), atmosphere: (), camera: ())";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config.sun, SunConfig::default());
        assert_eq!(config.render, RenderConfig::default());
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let ron_str = "(atmosphere: (mie_anisotropy: 0.5))";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert!((config.atmosphere.mie_anisotropy - 0.5).abs() < f32::EPSILON);
        assert!((config.atmosphere.planet_radius_m - 6_360_000.0).abs() < 1.0);
        assert_eq!(config.atmosphere.sky_light_samples, 8);
    }

    #[test]
    fn test_default_constants_match_reference_sky() {
        let atmo = AtmosphereConfig::default();
        assert!(atmo.atmosphere_radius_m > atmo.planet_radius_m);
        assert_eq!(atmo.rayleigh_coefficients, [5.8e-6, 13.5e-6, 33.1e-6]);
        let sun = SunConfig::default();
        assert!((sun.angular_speed - 3.14159 / 4000.0).abs() < 1e-8);
        assert_eq!(sun.presets.len(), 6);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.window.width = 1920;
        config.sun.cycle_on_start = true;
        config.render.output_dir = PathBuf::from("/tmp/aerial-out");

        config.save(dir.path()).unwrap();
        let loaded = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_load_or_create_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert!(dir.path().join("config.ron").exists());
    }

    #[test]
    fn test_reload_detects_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();

        let mut modified = config.clone();
        modified.camera.movement_speed = 0.05;
        modified.save(dir.path()).unwrap();

        let result = config.reload(dir.path()).unwrap();
        assert!(result.is_some());
        assert!((result.unwrap().camera.movement_speed - 0.05).abs() < f32::EPSILON);
    }

    #[test]
    fn test_reload_no_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();

        let result = config.reload(dir.path()).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_invalid_ron_produces_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.ron"), "{{not valid}}").unwrap();
        let result = Config::load_or_create(dir.path());
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }
}
