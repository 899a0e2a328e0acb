use anyhow::{Context as _, Result, anyhow};
use clap::Parser;
use egui::Context as EguiContext;
use haunted_assets::{HouseTextures, TextureStore};
use haunted_input::{Action, PointerButton, PointerTracker, key_action};
use haunted_render::{
    CancelToken, FrameLoop, FrameScheduler, FrameStatus, OrbitControls, PerspectiveCamera,
    Viewport,
};
use haunted_render_wgpu::WgpuRenderer;
use haunted_scene::{
    HouseHandles, ScatterParams, Scene, SceneConfig, build_haunted_house, regenerate_graves,
};
use haunted_tools::{DebugPanel, SceneInspector};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::Key;
use winit::window::{Window, WindowId};

/// Pixels of trackpad scroll treated as one wheel line.
const PIXELS_PER_LINE: f32 = 50.0;

#[derive(Parser)]
#[command(name = "haunted-desktop", about = "Haunted house desktop viewer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Scene config (YAML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory containing textures/, overrides the config
    #[arg(long)]
    assets: Option<PathBuf>,

    /// Grave scatter seed, overrides the config
    #[arg(long)]
    seed: Option<u64>,

    /// Number of graves, overrides the config
    #[arg(long)]
    graves: Option<usize>,
}

/// Asks winit for the next redraw.
#[derive(Default)]
struct RedrawScheduler {
    window: Option<Arc<Window>>,
}

impl FrameScheduler for RedrawScheduler {
    fn request_frame(&mut self) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

/// Scene, camera and UI state. Lives independently of the GPU.
struct AppState {
    scene: Scene,
    store: TextureStore,
    handles: HouseHandles,
    scatter: ScatterParams,
    grave_count: usize,
    grave_seed: u64,
    camera: PerspectiveCamera,
    controls: OrbitControls,
    viewport: Viewport,
    pointer: PointerTracker,
    panel: DebugPanel,
    cancel: CancelToken,
}

impl AppState {
    fn new(cli: &Cli, cancel: CancelToken) -> Result<Self> {
        let mut config = match &cli.config {
            Some(path) => SceneConfig::load(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => SceneConfig::default(),
        };
        if let Some(assets) = &cli.assets {
            config.assets_root = assets.clone();
        }
        if let Some(count) = cli.graves {
            config.graves.count = count;
        }
        let grave_seed = cli
            .seed
            .or(config.graves.seed)
            .unwrap_or_else(rand::random);

        let mut store = TextureStore::new();
        let textures = HouseTextures::load(&mut store, &config.assets_root)?;
        let mut scene = Scene::new();
        let handles = build_haunted_house(
            &mut scene,
            &textures,
            &config,
            &mut StdRng::seed_from_u64(grave_seed),
        )?;
        tracing::info!("{} (seed {grave_seed})", SceneInspector::summary(&scene));

        let viewport = Viewport::new(1280, 720, 1.0);
        let camera = PerspectiveCamera::from_config(&config.camera, viewport.size().aspect());

        Ok(Self {
            scene,
            store,
            handles,
            scatter: ScatterParams::from(&config.graves),
            grave_count: config.graves.count,
            grave_seed,
            camera,
            controls: OrbitControls::new(config.camera.damping_factor),
            viewport,
            pointer: PointerTracker::new(),
            panel: DebugPanel::standard(),
            cancel,
        })
    }

    fn apply(&mut self, action: Action) {
        let height = self.viewport.size().height as f32;
        match action {
            Action::Orbit { dx, dy } => self.controls.drag_rotate(dx, dy, height),
            Action::Pan { dx, dy } => self.controls.pan(dx, dy, height, &self.camera),
            Action::Zoom(steps) => self.controls.zoom(steps),
            Action::TogglePanel => self.panel.toggle(),
            Action::Reseed => self.reseed_graves(),
            Action::Quit => self.cancel.cancel(),
            Action::Noop => {}
        }
    }

    fn reseed_graves(&mut self) {
        self.grave_seed = rand::random();
        let mut rng = StdRng::seed_from_u64(self.grave_seed);
        match regenerate_graves(
            &mut self.scene,
            &self.handles,
            &self.scatter,
            self.grave_count,
            &mut rng,
        ) {
            Ok(n) => tracing::info!("scattered {n} graves (seed {})", self.grave_seed),
            Err(e) => tracing::error!("failed to scatter graves: {e}"),
        }
    }
}

/// Everything that only exists once the window is up.
struct GpuContext {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: WgpuRenderer,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

impl GpuContext {
    fn new(event_loop: &ActiveEventLoop, state: &mut AppState, egui_ctx: &EguiContext) -> Result<Self> {
        let attrs = Window::default_attributes()
            .with_title("Haunted House")
            .with_inner_size(LogicalSize::new(1280u32, 720));
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
        .ok_or_else(|| anyhow!("no compatible GPU adapter"))?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("haunted_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))?;

        let scale = window.scale_factor();
        let logical = window.inner_size().to_logical::<u32>(scale);
        let outcome = state
            .viewport
            .resize(logical.width, logical.height, scale, &mut state.camera);
        let (width, height) = outcome.size.drawing_buffer();

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| anyhow!("surface reports no formats"))?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let renderer = WgpuRenderer::new(
            &device,
            &queue,
            surface_format,
            width,
            height,
            &state.scene,
            &state.store,
        );

        let egui_winit = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(scale as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        tracing::info!(
            "GPU initialized with {} backend, buffer {width}x{height}",
            adapter.get_info().backend.to_str()
        );

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            renderer,
            egui_winit,
            egui_renderer,
        })
    }

    fn resize(&mut self, physical: PhysicalSize<u32>, state: &mut AppState) {
        let scale = self.window.scale_factor();
        let logical = physical.to_logical::<u32>(scale);
        let outcome = state
            .viewport
            .resize(logical.width, logical.height, scale, &mut state.camera);
        let (width, height) = outcome.size.drawing_buffer();
        if (width, height) == (self.config.width, self.config.height) {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.renderer.resize(&self.device, width, height);
    }

    fn draw_frame(&mut self, state: &mut AppState, egui_ctx: &EguiContext) {
        state.controls.update(&mut state.camera);

        let output = match self.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
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

        self.renderer.render(
            &self.device,
            &self.queue,
            &view,
            &state.scene,
            &state.store,
            &state.camera,
        );

        let raw_input = self.egui_winit.take_egui_input(&self.window);
        let mut reseed = false;
        let full_output = egui_ctx.run(raw_input, |ctx| {
            reseed |= state.panel.ui(ctx, &mut state.scene, &state.handles);
        });
        if reseed {
            state.reseed_graves();
        }
        self.egui_winit
            .handle_platform_output(&self.window, full_output.platform_output);

        let paint_jobs = egui_ctx.tessellate(full_output.shapes, full_output.pixels_per_point);
        // Shapes are in points; the buffer holds `pixel_ratio` pixels per point.
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point: state.viewport.size().pixel_ratio as f32,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(&self.device, &self.queue, *id, image_delta);
        }
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui_encoder"),
            });
        self.egui_renderer.update_buffers(
            &self.device,
            &self.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
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
            self.egui_renderer
                .render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        self.queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        output.present();
    }
}

struct App {
    state: AppState,
    gpu: Option<GpuContext>,
    frame_loop: FrameLoop<RedrawScheduler>,
    egui_ctx: EguiContext,
}

impl App {
    fn new(cli: &Cli) -> Result<Self> {
        let cancel = CancelToken::new();
        Ok(Self {
            state: AppState::new(cli, cancel.clone())?,
            gpu: None,
            frame_loop: FrameLoop::new(RedrawScheduler::default(), cancel),
            egui_ctx: EguiContext::default(),
        })
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        if event_loop.exiting() {
            return;
        }
        self.frame_loop.cancel_token().cancel();
        tracing::info!("shutting down after {} frames", self.frame_loop.frames());
        event_loop.exit();
    }
}

fn pointer_button(button: MouseButton) -> Option<PointerButton> {
    match button {
        MouseButton::Left => Some(PointerButton::Left),
        MouseButton::Right => Some(PointerButton::Right),
        MouseButton::Middle => Some(PointerButton::Middle),
        _ => None,
    }
}

fn key_name(key: &Key) -> Option<String> {
    match key {
        Key::Named(named) => Some(format!("{named:?}")),
        Key::Character(c) => Some(c.to_string()),
        _ => None,
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }
        match GpuContext::new(event_loop, &mut self.state, &self.egui_ctx) {
            Ok(gpu) => {
                self.frame_loop.scheduler_mut().window = Some(gpu.window.clone());
                self.gpu = Some(gpu);
                self.frame_loop.start();
            }
            Err(e) => {
                tracing::error!("failed to initialize GPU: {e:#}");
                self.shutdown(event_loop);
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };
        let response = gpu.egui_winit.on_window_event(&gpu.window, &event);
        if response.consumed {
            return;
        }

        let state = &mut self.state;
        match event {
            WindowEvent::CloseRequested => {
                self.shutdown(event_loop);
            }
            WindowEvent::Resized(new_size) => {
                gpu.resize(new_size, state);
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Pressed && !event.repeat {
                    if let Some(name) = key_name(&event.logical_key) {
                        state.apply(key_action(&name));
                    }
                }
            }
            WindowEvent::MouseInput {
                button,
                state: button_state,
                ..
            } => {
                if let Some(button) = pointer_button(button) {
                    state
                        .pointer
                        .button(button, button_state == ElementState::Pressed);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                let p = position.to_logical::<f32>(gpu.window.scale_factor());
                let action = state.pointer.moved(p.x, p.y);
                state.apply(action);
            }
            WindowEvent::CursorLeft { .. } => {
                state.pointer.left_window();
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32 / PIXELS_PER_LINE,
                };
                let action = state.pointer.scroll(lines);
                state.apply(action);
            }
            WindowEvent::RedrawRequested => {
                let egui_ctx = &self.egui_ctx;
                let status = self.frame_loop.run_frame(|_| gpu.draw_frame(state, egui_ctx));
                if status == FrameStatus::Stopped {
                    self.shutdown(event_loop);
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.frame_loop.cancel_token().is_cancelled() {
            self.shutdown(event_loop);
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("haunted-desktop starting");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(&cli)?;
    event_loop.run_app(&mut app)?;

    Ok(())
}
