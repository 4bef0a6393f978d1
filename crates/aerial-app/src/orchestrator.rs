//! Per-frame driver: drains input, advances the sun and camera, derives the
//! typed frame parameters, and hands them to the render backend.

use aerial_atmosphere::{PlanetFrame, ScatteringToggles};
use aerial_input::{DragTracker, InputAction, InputEvent, InputQueue, KeyBindings, ResolvedInput};
use aerial_player::CameraController;
use aerial_render::{FrameParams, Projection, RenderBackend, SkyParams, TerrainParams, Viewport};
use aerial_sun::SunState;
use tracing::{debug, trace};

use crate::error::AppError;

/// Ambient coefficients carried on the two shading variants.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ambient {
    pub sky: f32,
    pub terrain: f32,
}

impl Default for Ambient {
    fn default() -> Self {
        Self {
            sky: 0.2,
            terrain: 0.1,
        }
    }
}

/// Owns all mutable viewer state. Input events are queued and only applied
/// inside [`step`](Self::step).
pub struct Orchestrator<B: RenderBackend> {
    sun: SunState,
    camera: CameraController,
    input: InputQueue,
    bindings: KeyBindings,
    drag: DragTracker,
    toggles: ScatteringToggles,
    projection: Projection,
    planet: PlanetFrame,
    ambient: Ambient,
    backend: B,
}

impl<B: RenderBackend> Orchestrator<B> {
    pub fn new(backend: B, planet: PlanetFrame) -> Self {
        let mut projection = Projection::default();
        projection.resize(backend.viewport());
        Self {
            sun: SunState::default(),
            camera: CameraController::default(),
            input: InputQueue::new(),
            bindings: KeyBindings::default(),
            drag: DragTracker::new(),
            toggles: ScatteringToggles::ALL,
            projection,
            planet,
            ambient: Ambient::default(),
            backend,
        }
    }

    pub fn with_sun(mut self, sun: SunState) -> Self {
        self.sun = sun;
        self
    }

    pub fn with_camera(mut self, camera: CameraController) -> Self {
        self.camera = camera;
        self
    }

    /// Use `projection`'s field of view and clip planes; the aspect ratio
    /// keeps following the backend surface.
    pub fn with_projection(mut self, projection: Projection) -> Self {
        self.projection = projection;
        self.projection.resize(self.backend.viewport());
        self
    }

    pub fn with_bindings(mut self, bindings: KeyBindings) -> Self {
        self.bindings = bindings;
        self
    }

    pub fn with_ambient(mut self, ambient: Ambient) -> Self {
        self.ambient = ambient;
        self
    }

    pub fn sun(&self) -> &SunState {
        &self.sun
    }

    pub fn camera(&self) -> &CameraController {
        &self.camera
    }

    pub fn toggles(&self) -> ScatteringToggles {
        self.toggles
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Queue an event for the next [`step`](Self::step).
    pub fn push_event(&mut self, event: InputEvent) {
        self.input.push(event);
    }

    pub fn input_mut(&mut self) -> &mut InputQueue {
        &mut self.input
    }

    /// Propagate a new surface size to the projection and the backend.
    pub fn resize(&mut self, width: u32, height: u32) {
        let viewport = Viewport::new(width, height);
        self.backend.resize(viewport);
        self.projection.resize(self.backend.viewport());
        debug!(width = viewport.width, height = viewport.height, "viewport resized");
    }

    /// Advance simulation state by one frame of `dt_ms` milliseconds.
    pub fn step(&mut self, dt_ms: f32) {
        let events: Vec<InputEvent> = self.input.drain().collect();
        for event in events {
            self.apply_event(event);
        }
        self.sun.advance(dt_ms);
        self.camera.update();
        trace!(sun_angle = self.sun.angle, position = ?self.camera.position, "frame advanced");
    }

    fn apply_event(&mut self, event: InputEvent) {
        match event {
            InputEvent::PointerPressed { position } => self.drag.press(position),
            InputEvent::PointerMoved { position } => {
                if let Some(delta) = self.drag.motion(position) {
                    self.camera.look(delta);
                }
            }
            InputEvent::PointerReleased => self.drag.release(),
            InputEvent::Key { code, state } => match self.bindings.resolve(code, state) {
                Some(ResolvedInput::Held { action, active }) => self.apply_held(action, active),
                Some(ResolvedInput::Triggered(action)) => self.apply_trigger(action),
                None => {}
            },
            InputEvent::Resized { width, height } => self.resize(width, height),
        }
    }

    fn apply_held(&mut self, action: InputAction, active: bool) {
        match action {
            InputAction::TimeForward => self.sun.scrub_forward = active,
            InputAction::TimeBackward => self.sun.scrub_backward = active,
            other => {
                self.camera.handle_action(other, active);
            }
        }
    }

    fn apply_trigger(&mut self, action: InputAction) {
        match action {
            InputAction::ToggleCycle => self.sun.toggle_cycle(),
            InputAction::SunPreset(index) => {
                self.sun.select_preset(index as usize);
            }
            InputAction::ToggleRayleigh => {
                self.toggles.rayleigh = !self.toggles.rayleigh;
                debug!(enabled = self.toggles.rayleigh, "rayleigh toggled");
            }
            InputAction::ToggleMie => {
                self.toggles.mie = !self.toggles.mie;
                debug!(enabled = self.toggles.mie, "mie toggled");
            }
            _ => {}
        }
    }

    /// Derive this frame's render parameters from the current state.
    pub fn frame_params(&self) -> Result<FrameParams, AppError> {
        let exposure = self.sun.exposure();
        let sun_direction = self.sun.direction();
        let position = self.camera.position;
        Ok(FrameParams {
            view: self.camera.view_matrix(),
            projection: self.projection.matrix(),
            camera_position: position,
            sky: SkyParams::new(
                sun_direction,
                self.sun.color,
                exposure.sky,
                self.ambient.sky,
                self.planet.altitude(position),
                self.toggles,
            )?,
            terrain: TerrainParams::new(
                sun_direction,
                self.sun.color,
                exposure.terrain,
                self.ambient.terrain,
                position,
                self.toggles,
            )?,
        })
    }

    /// Render the current state.
    pub fn render(&mut self) -> Result<FrameParams, AppError> {
        let params = self.frame_params()?;
        self.backend.render(&params)?;
        Ok(params)
    }
}
