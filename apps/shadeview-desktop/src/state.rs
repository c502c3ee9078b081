use glam::{Quat, Vec2, Vec3};
use shadeview_common::{AspectMode, Transform, intersect_plane};
use shadeview_input::{Action, FrameInput};
use shadeview_render_wgpu::{CameraController, CameraState, FrameParams};
use shadeview_shader::{
    BASE_VERTEX, ERROR_FRAGMENT, ReloadMonitor, ShaderCompiler, ShaderError, ShaderLoader,
    ShaderSlots, StagePair,
};
use shadeview_tools::{FrameStats, MessageKind, TransientMessage};
use std::f32::consts::FRAC_PI_2;
use std::time::Instant;

/// Longest frame delta fed into the clock; longer stalls are clamped.
const MAX_FRAME_DELTA: f32 = 0.1;

/// Placement of the effect quad: stood up to face +Z, stretched to `aspect`.
pub fn quad_transform(aspect: AspectMode) -> Transform {
    Transform {
        position: Vec3::ZERO,
        rotation: Quat::from_rotation_x(FRAC_PI_2),
        scale: Vec3::new(aspect.ratio(), 1.0, 1.0),
    }
}

/// Where the cursor ray meets the quad's plane, in the quad's [0, 1] texture space.
///
/// Points off the quad are clamped to its edge. `None` when the ray misses the plane.
pub fn cursor_on_quad(
    camera: &CameraState,
    cursor: Vec2,
    viewport: Vec2,
    quad: &Transform,
) -> Option<Vec2> {
    let model = quad.model_matrix();
    let ray = camera.screen_ray(cursor, viewport);
    let hit = intersect_plane(&ray, quad.position, model.transform_vector3(Vec3::Y))?;
    let local = model.inverse().transform_point3(hit.point);
    Some((Vec2::new(local.x, local.z) + Vec2::splat(0.5)).clamp(Vec2::ZERO, Vec2::ONE))
}

/// All state owned by the frame loop.
pub struct AppState<P> {
    pub camera: CameraState,
    controller: CameraController,
    pub aspect: AspectMode,
    pub input: FrameInput,
    loader: ShaderLoader,
    slots: ShaderSlots<P>,
    monitor: ReloadMonitor,
    pub message: Option<TransientMessage>,
    pub stats: FrameStats,
    /// Seconds since the effect was last (re)loaded; feeds `u_time`.
    pub elapsed: f32,
    mouse_uv: Vec2,
    cursor: Option<Vec2>,
    started: Instant,
    last_frame: Instant,
}

impl<P> AppState<P> {
    /// Load the error program and the effect under preview.
    ///
    /// A broken effect is survivable; a broken error program is not, since
    /// nothing could be bound in its place.
    pub fn new<C>(
        loader: ShaderLoader,
        fragment: &str,
        compiler: &mut C,
        now: Instant,
    ) -> Result<Self, ShaderError>
    where
        C: ShaderCompiler<Program = P>,
    {
        let fallback = loader
            .load(compiler, &StagePair::new(BASE_VERTEX, ERROR_FRAGMENT))
            .program?;
        let slots = ShaderSlots::new(StagePair::new(BASE_VERTEX, fragment), fallback);

        let mut state = Self {
            camera: CameraState::default(),
            controller: CameraController::default(),
            aspect: AspectMode::default(),
            input: FrameInput::new(),
            loader,
            slots,
            monitor: ReloadMonitor::default(),
            message: None,
            stats: FrameStats::new(),
            elapsed: 0.0,
            mouse_uv: Vec2::splat(0.5),
            cursor: None,
            started: now,
            last_frame: now,
        };
        state.camera.reset(state.aspect);

        let loaded = state.loader.load(compiler, state.slots.pair());
        if state.slots.install(loaded).is_err() {
            state.post("Failed to load shader", MessageKind::Error, now);
        }
        Ok(state)
    }

    /// Seconds since startup; the time base of overlay messages.
    pub fn clock(&self, now: Instant) -> f64 {
        now.duration_since(self.started).as_secs_f64()
    }

    pub fn post(&mut self, text: impl Into<String>, kind: MessageKind, now: Instant) {
        self.message = Some(TransientMessage::new(text, kind, self.clock(now)));
    }

    pub fn program(&self) -> &P {
        self.slots.bound()
    }

    pub fn is_fallback_bound(&self) -> bool {
        self.slots.is_fallback_bound()
    }

    /// Run the update half of one frame. Returns false once the app should exit.
    ///
    /// Order: hot-reload check, discrete actions and clock, then camera.
    pub fn frame<C>(&mut self, now: Instant, compiler: &mut C) -> bool
    where
        C: ShaderCompiler<Program = P>,
    {
        let dt = now
            .saturating_duration_since(self.last_frame)
            .as_secs_f32()
            .min(MAX_FRAME_DELTA);
        self.last_frame = now;
        self.stats.record(dt);

        self.check_reload(now, compiler);

        let snapshot = self.input.take();
        let mut running = true;
        for action in snapshot.actions {
            running &= self.apply(action, now);
        }
        self.elapsed += dt;

        self.controller.update(&mut self.camera, &snapshot.camera);
        self.cursor = snapshot.cursor;
        running
    }

    /// Apply one discrete action. Returns false for [`Action::Exit`].
    pub fn apply(&mut self, action: Action, now: Instant) -> bool {
        match action {
            Action::ResetCamera => {
                self.camera.reset(self.aspect);
                self.post("Camera reset", MessageKind::Info, now);
            }
            Action::SetAspect(mode) => {
                self.aspect = mode;
                self.camera.reset(mode);
                self.post(format!("Aspect {}", mode.label()), MessageKind::Info, now);
            }
            Action::Exit => return false,
        }
        true
    }

    pub fn check_reload<C>(&mut self, now: Instant, compiler: &mut C)
    where
        C: ShaderCompiler<Program = P>,
    {
        let loader = &self.loader;
        let pair = self.slots.pair();
        if self
            .monitor
            .poll(now, self.slots.stamps(), || loader.stamps(pair))
        {
            self.reload(now, compiler);
        }
    }

    /// Recompile the effect and install it, falling back to the error program on failure.
    pub fn reload<C>(&mut self, now: Instant, compiler: &mut C)
    where
        C: ShaderCompiler<Program = P>,
    {
        self.elapsed = 0.0;
        let loaded = self.loader.load(compiler, self.slots.pair());
        match self.slots.install(loaded) {
            Ok(()) => self.post("Shader reloaded", MessageKind::Success, now),
            Err(_) => self.post("Failed to load shader", MessageKind::Error, now),
        }
    }

    /// Uniforms and transforms for the render half of the frame.
    ///
    /// Re-projects the cursor onto the quad; when the cursor is outside the
    /// window or the ray misses, the previous position is kept.
    pub fn frame_params(&mut self, viewport: Vec2) -> FrameParams {
        let quad = quad_transform(self.aspect);
        if let Some(uv) = self
            .cursor
            .and_then(|cursor| cursor_on_quad(&self.camera, cursor, viewport, &quad))
        {
            self.mouse_uv = uv;
        }
        FrameParams {
            view_proj: self.camera.view_projection(),
            model: quad.model_matrix(),
            time: self.elapsed,
            aspect: self.aspect.ratio(),
            mouse_pos: self.mouse_uv,
        }
    }
}
