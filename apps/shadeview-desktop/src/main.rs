mod controls;
mod state;

use anyhow::{Context, Result};
use clap::Parser;
use egui::Context as EguiContext;
use glam::Vec2;
use shadeview_render_wgpu::{QuadProgram, QuadRenderer};
use shadeview_shader::ShaderLoader;
use state::AppState;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{DeviceEvent, ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::PhysicalKey;
use winit::window::{Window, WindowId};

const WINDOW_TITLE: &str = "effects";
const WINDOW_SIZE: u32 = 1024;
const MSAA_SAMPLES: u32 = 4;
const FRAME_INTERVAL: Duration = Duration::from_nanos(1_000_000_000 / 60);

#[derive(Parser)]
#[command(name = "shadeview-desktop", about = "Live preview for GLSL fragment effects")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Directory holding common.glsl, base.vert, error.frag and the effect
    #[arg(long, default_value = "resources/shaders")]
    shader_dir: PathBuf,

    /// Fragment stage to preview, relative to the shader directory
    #[arg(long, default_value = "effect.frag")]
    fragment: String,
}

/// Window, device and everything created from them.
struct Gpu {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: QuadRenderer,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

struct GpuApp {
    cli: Cli,
    gpu: Option<Gpu>,
    state: Option<AppState<QuadProgram>>,
    egui_ctx: EguiContext,
    next_frame: Instant,
    fatal: Option<anyhow::Error>,
}

impl GpuApp {
    fn new(cli: Cli) -> Self {
        Self {
            cli,
            gpu: None,
            state: None,
            egui_ctx: EguiContext::default(),
            next_frame: Instant::now(),
            fatal: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(WINDOW_TITLE)
            .with_inner_size(PhysicalSize::new(WINDOW_SIZE, WINDOW_SIZE));
        let window = Arc::new(event_loop.create_window(attrs)?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("no compatible GPU adapter")?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("shadeview_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .context("surface reports no formats")?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let sample_count = if adapter
            .get_texture_format_features(surface_format)
            .flags
            .sample_count_supported(MSAA_SAMPLES)
        {
            MSAA_SAMPLES
        } else {
            1
        };
        let renderer = QuadRenderer::new(
            &device,
            surface_format,
            sample_count,
            config.width,
            config.height,
        );

        let now = Instant::now();
        let mut compiler = renderer.compiler(&device);
        let mut state = AppState::new(
            ShaderLoader::new(&self.cli.shader_dir),
            &self.cli.fragment,
            &mut compiler,
            now,
        )
        .with_context(|| {
            format!(
                "error shader in {} does not compile",
                self.cli.shader_dir.display()
            )
        })?;
        state.camera.viewport_aspect = config.width as f32 / config.height as f32;

        let egui_winit = egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        tracing::info!(
            "GPU initialized with {} backend, {}x MSAA",
            adapter.get_info().backend.to_str(),
            renderer.sample_count()
        );

        self.state = Some(state);
        self.gpu = Some(Gpu {
            window,
            surface,
            device,
            queue,
            config,
            renderer,
            egui_winit,
            egui_renderer,
        });
        Ok(())
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(gpu), Some(state)) = (&mut self.gpu, &mut self.state) else {
            return;
        };

        let now = Instant::now();
        let running = {
            let mut compiler = gpu.renderer.compiler(&gpu.device);
            state.frame(now, &mut compiler)
        };
        if !running {
            event_loop.exit();
            return;
        }

        let viewport = Vec2::new(gpu.config.width as f32, gpu.config.height as f32);
        let params = state.frame_params(viewport);

        let output = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.surface.configure(&gpu.device, &gpu.config);
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        gpu.renderer
            .render(&gpu.device, &gpu.queue, &view, &params, state.program());

        let clock = state.clock(now);
        let raw_input = gpu.egui_winit.take_egui_input(&gpu.window);
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            draw_overlay(ctx, state, clock);
        });

        gpu.egui_winit
            .handle_platform_output(&gpu.window, full_output.platform_output);

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [gpu.config.width, gpu.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            gpu.egui_renderer
                .update_texture(&gpu.device, &gpu.queue, *id, image_delta);
        }
        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("overlay_encoder"),
            });
        gpu.egui_renderer.update_buffers(
            &gpu.device,
            &gpu.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("overlay_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            gpu.egui_renderer
                .render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        gpu.queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            gpu.egui_renderer.free_texture(id);
        }

        output.present();
    }
}

/// Status message, then frame rate, both top-left.
fn draw_overlay<P>(ctx: &EguiContext, state: &AppState<P>, clock: f64) {
    if let Some(message) = state.message.as_ref().filter(|m| m.is_visible(clock)) {
        let [r, g, b] = message.color();
        let alpha = (message.alpha(clock) * 255.0).round() as u8;
        egui::Area::new(egui::Id::new("message"))
            .anchor(egui::Align2::LEFT_TOP, [10.0, 40.0])
            .show(ctx, |ui| {
                ui.label(
                    egui::RichText::new(&message.text)
                        .size(20.0)
                        .color(egui::Color32::from_rgba_unmultiplied(r, g, b, alpha)),
                );
            });
    }

    egui::Area::new(egui::Id::new("fps"))
        .anchor(egui::Align2::LEFT_TOP, [10.0, 10.0])
        .show(ctx, |ui| {
            ui.label(
                egui::RichText::new(state.stats.to_string())
                    .size(20.0)
                    .color(egui::Color32::from_rgb(0, 228, 48)),
            );
        });
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }
        if let Err(e) = self.init(event_loop) {
            tracing::error!("startup failed: {e:#}");
            self.fatal = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let (Some(gpu), Some(state)) = (&mut self.gpu, &mut self.state) else {
            return;
        };

        let response = gpu.egui_winit.on_window_event(&gpu.window, &event);
        if response.consumed {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                gpu.config.width = new_size.width.max(1);
                gpu.config.height = new_size.height.max(1);
                gpu.surface.configure(&gpu.device, &gpu.config);
                gpu.renderer
                    .resize(&gpu.device, gpu.config.width, gpu.config.height);
                state.camera.viewport_aspect =
                    gpu.config.width as f32 / gpu.config.height as f32;
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: key_state,
                        repeat,
                        ..
                    },
                ..
            } => {
                let pressed = key_state == ElementState::Pressed;
                if key == controls::PAN_MODIFIER {
                    state.input.set_modifier(pressed);
                }
                if pressed && !repeat {
                    if let Some(action) = controls::action_for_key(key) {
                        state.input.push_action(action);
                    }
                }
            }
            WindowEvent::MouseInput {
                button,
                state: btn_state,
                ..
            } if button == controls::DRAG_BUTTON => {
                state.input.set_drag(btn_state == ElementState::Pressed);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                state.input.add_wheel(controls::wheel_lines(delta));
            }
            WindowEvent::CursorMoved { position, .. } => {
                state
                    .input
                    .set_cursor(Some(Vec2::new(position.x as f32, position.y as f32)));
            }
            WindowEvent::CursorLeft { .. } => {
                state.input.set_cursor(None);
            }
            WindowEvent::RedrawRequested => {
                self.redraw(event_loop);
            }
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: DeviceEvent,
    ) {
        if let (DeviceEvent::MouseMotion { delta }, Some(state)) = (event, &mut self.state) {
            state.input.add_motion(delta.0 as f32, delta.1 as f32);
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        if now >= self.next_frame {
            if let Some(gpu) = &self.gpu {
                gpu.window.request_redraw();
            }
            self.next_frame = now + FRAME_INTERVAL;
        }
        event_loop.set_control_flow(ControlFlow::WaitUntil(self.next_frame));
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    tracing::info!("shadeview-desktop starting");

    let event_loop = EventLoop::new()?;
    let mut app = GpuApp::new(cli);
    event_loop.run_app(&mut app)?;

    // Window, device and programs are released as `app` drops.
    match app.fatal.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
