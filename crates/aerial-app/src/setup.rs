//! Builds the runtime pieces from a loaded [`Config`].

use std::path::Path;

use aerial_atmosphere::{
    AtmosphereModel, AtmosphereParams, LightRayPolicy, PlanetFrame, SampleCounts,
    ScatteringIntegrator,
};
use aerial_config::{AtmosphereConfig, CameraConfig, Config, SunConfig};
use aerial_input::KeyBindings;
use aerial_player::CameraController;
use aerial_render::{
    NormalSource, ProceduralAlbedo, Projection, RawMesh, RenderBackend, RenderContextError,
    SoftwareBackend, VertexBuffer, Viewport,
};
use aerial_sun::SunState;
use glam::Vec3;
use tracing::info;

use crate::error::AppError;
use crate::orchestrator::{Ambient, Orchestrator};
use crate::terrain::{TerrainShape, generate_terrain};

/// Optional key binding overrides, next to `config.ron`.
pub const BINDINGS_FILE_NAME: &str = "bindings.ron";

/// Atmosphere parameters described by `config`.
pub fn atmosphere_params(config: &AtmosphereConfig) -> AtmosphereParams {
    AtmosphereParams {
        planet_radius: config.planet_radius_m,
        atmosphere_radius: config.atmosphere_radius_m,
        rayleigh_scale_height: config.rayleigh_scale_height_m,
        mie_scale_height: config.mie_scale_height_m,
        rayleigh_coefficients: Vec3::from_array(config.rayleigh_coefficients),
        mie_coefficient: config.mie_coefficient,
        mie_anisotropy: config.mie_anisotropy,
        sky_samples: SampleCounts {
            view: config.sky_view_samples,
            light: config.sky_light_samples,
        },
        terrain_samples: SampleCounts {
            view: config.terrain_view_samples,
            light: config.terrain_light_samples,
        },
        light_ray_policy: if config.discard_light_below_surface {
            LightRayPolicy::DiscardBelowSurface
        } else {
            LightRayPolicy::IgnoreSurface
        },
    }
}

/// Validated integrator and the scene-to-planet mapping.
pub fn build_atmosphere(
    config: &AtmosphereConfig,
) -> Result<(ScatteringIntegrator, PlanetFrame), AppError> {
    let model = AtmosphereModel::new(atmosphere_params(config))?;
    let frame = PlanetFrame::new(config.world_scale_m, model.planet_radius());
    Ok((ScatteringIntegrator::new(model), frame))
}

pub fn build_sun(sun: &SunConfig, atmosphere: &AtmosphereConfig) -> SunState {
    let mut state = SunState::new(sun.initial_angle, sun.angular_speed)
        .with_presets(sun.presets)
        .with_color(Vec3::from_array(atmosphere.sun_color));
    state.cycle_enabled = sun.cycle_on_start;
    state
}

pub fn build_camera(camera: &CameraConfig) -> CameraController {
    CameraController::new(
        Vec3::from_array(camera.start_position),
        camera.start_yaw,
        camera.start_pitch,
    )
    .with_speeds(camera.movement_speed, camera.look_sensitivity)
    .with_pitch_limit(camera.pitch_limit)
}

pub fn build_projection(camera: &CameraConfig, viewport: Viewport) -> Projection {
    Projection::new(camera.fov_y_degrees, viewport, camera.near, camera.far)
}

/// Mesh from `mesh_path`, or the generated terrain when none is given.
pub fn load_mesh(config: &Config, mesh_path: Option<&Path>) -> Result<RawMesh, AppError> {
    match mesh_path {
        Some(path) => {
            let mesh = RawMesh::load_assimp_json(path)?;
            info!(path = %path.display(), vertices = mesh.vertex_count(), "mesh loaded");
            Ok(mesh)
        }
        None => {
            let mesh = generate_terrain(TerrainShape {
                seed: config.render.terrain_seed,
                resolution: config.render.terrain_resolution,
                ..Default::default()
            });
            info!(vertices = mesh.vertex_count(), "terrain generated");
            Ok(mesh)
        }
    }
}

/// Bindings from `config_dir/bindings.ron`, or the defaults when the file is
/// absent.
pub fn load_bindings(config_dir: &Path) -> Result<KeyBindings, AppError> {
    let path = config_dir.join(BINDINGS_FILE_NAME);
    if !path.exists() {
        return Ok(KeyBindings::default());
    }
    let text = std::fs::read_to_string(&path).map_err(AppError::BindingsRead)?;
    let bindings = KeyBindings::from_ron(&text)?;
    info!(path = %path.display(), count = bindings.bindings.len(), "key bindings loaded");
    Ok(bindings)
}

/// Construct the backend named by `render.backend`.
pub fn create_backend(
    config: &Config,
    integrator: ScatteringIntegrator,
    frame: PlanetFrame,
) -> Result<SoftwareBackend, AppError> {
    match config.render.backend.as_str() {
        "software" => Ok(SoftwareBackend::new(
            config.window.width,
            config.window.height,
            integrator,
            frame,
            Box::new(ProceduralAlbedo::default()),
        )?),
        other => Err(RenderContextError::Unsupported(other.to_string()).into()),
    }
}

/// Fully wired viewer: backend with the mesh uploaded, sun and camera in
/// their configured start state.
pub fn build_orchestrator(
    config: &Config,
    mesh_path: Option<&Path>,
) -> Result<Orchestrator<SoftwareBackend>, AppError> {
    let (integrator, frame) = build_atmosphere(&config.atmosphere)?;
    let mut backend = create_backend(config, integrator, frame)?;

    let raw = load_mesh(config, mesh_path)?;
    let normals = if config.render.flat_shading {
        NormalSource::Face
    } else {
        NormalSource::Loaded
    };
    let buffer = VertexBuffer::expand(&raw, normals);
    info!(triangles = buffer.triangle_count(), flat = config.render.flat_shading, "mesh expanded");
    backend.upload_mesh(buffer);

    let projection = build_projection(&config.camera, backend.viewport());
    Ok(Orchestrator::new(backend, frame)
        .with_sun(build_sun(&config.sun, &config.atmosphere))
        .with_camera(build_camera(&config.camera))
        .with_projection(projection)
        .with_ambient(Ambient {
            sky: config.atmosphere.sky_ambient,
            terrain: config.atmosphere.terrain_ambient,
        }))
}
