//! Window creation and event handling via winit.
//!
//! [`AppState`] implements winit's [`ApplicationHandler`]: window callbacks
//! are translated into [`InputEvent`](orrery_input::InputEvent)s and queued
//! on the [`Session`], and every redraw runs one frame (textures, input,
//! clock, composition, draw) before requesting the next.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use orrery_config::Config;
use orrery_input::WindowInputAdapter;
use orrery_render::{
    RenderContext, RenderContextError, RenderError, SceneRenderer, SurfaceError,
    TextureLoader, init_render_context_blocking,
};
use orrery_scene::{CatalogError, dispatch};
use tracing::{debug, error, info, warn};
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::PhysicalKey;
use winit::window::{Window, WindowAttributes, WindowId};

use crate::frame_clock::FrameClock;
use crate::session::Session;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("GPU initialization failed: {0}")]
    RenderContext(#[from] RenderContextError),

    #[error("renderer setup failed: {0}")]
    Render(#[from] RenderError),

    #[error("invalid scene catalog: {0}")]
    Catalog(#[from] CatalogError),
}

/// Returns [`WindowAttributes`] based on the given configuration.
pub fn window_attributes_from_config(config: &Config) -> WindowAttributes {
    WindowAttributes::default()
        .with_title(config.window.title.clone())
        .with_inner_size(winit::dpi::LogicalSize::new(
            config.window.width as f64,
            config.window.height as f64,
        ))
}

/// GPU-side state, created once the window exists.
struct Graphics {
    window: Arc<Window>,
    gpu: RenderContext,
    renderer: SceneRenderer,
}

pub struct AppState {
    config: Config,
    /// Where `config.ron` is re-read from when the window regains focus.
    config_dir: PathBuf,
    /// Last settings seen on disk, without CLI overrides once reloaded.
    on_disk: Config,
    session: Session,
    graphics: Option<Graphics>,
    loader: TextureLoader,
    input: WindowInputAdapter,
    clock: FrameClock,
    /// First fatal error; returned from [`run`] after the loop exits.
    fatal: Option<AppError>,
}

impl AppState {
    pub fn new(config: Config, config_dir: PathBuf) -> Result<Self, AppError> {
        let session = Session::new(&config)?;
        Ok(Self {
            on_disk: config.clone(),
            config,
            config_dir,
            session,
            graphics: None,
            loader: TextureLoader::new(),
            input: WindowInputAdapter::new(),
            clock: FrameClock::new(),
            fatal: None,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Re-read `config.ron` and hand camera, projection and zoom-gate
    /// settings to the session. Returns whether anything changed.
    pub fn reload_settings(&mut self) -> bool {
        match self.on_disk.reload(&self.config_dir) {
            Ok(Some(fresh)) => {
                self.session.apply_config(&fresh);
                self.config.camera = fresh.camera.clone();
                self.config.render = fresh.render.clone();
                self.config.simulation.lod_zoom_threshold = fresh.simulation.lod_zoom_threshold;
                self.on_disk = fresh;
                info!("Applied settings from {}", self.config_dir.display());
                true
            }
            Ok(None) => false,
            Err(e) => {
                warn!("Keeping current settings: {e}");
                false
            }
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: AppError) {
        error!("{err}");
        if self.fatal.is_none() {
            self.fatal = Some(err);
        }
        event_loop.exit();
    }

    fn init_graphics(&mut self, event_loop: &ActiveEventLoop) -> Result<(), AppError> {
        let window = Arc::new(event_loop.create_window(window_attributes_from_config(&self.config))?);
        let gpu = init_render_context_blocking(window.clone(), self.config.window.vsync)?;
        let renderer = SceneRenderer::for_context(
            &gpu,
            self.session.catalog(),
            self.config.render.clear_color,
        )?;

        let (width, height) = gpu.size();
        self.session.push(self.input.on_resize(width, height));
        info!(
            "Renderer ready: {}x{} {:?}",
            width, height, gpu.surface_format
        );

        self.request_textures();
        window.request_redraw();
        self.graphics = Some(Graphics {
            window,
            gpu,
            renderer,
        });
        Ok(())
    }

    fn request_textures(&self) {
        let texture_dir = resolve_texture_dir(&self.config);
        for (handle, path) in self.session.texture_requests(&texture_dir) {
            if let Err(e) = self.loader.request(handle, path) {
                warn!("{e}");
                return;
            }
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(graphics) = self.graphics.as_mut() else {
            return;
        };

        for loaded in self.loader.drain() {
            debug!("Texture ready for slot {}", loaded.handle.0);
            graphics
                .renderer
                .receive_texture(&graphics.gpu.device, &graphics.gpu.queue, loaded);
        }

        let delta_time = self.clock.tick();
        let draws = self.session.frame(Instant::now(), delta_time);
        if let Err(e) = dispatch(&mut graphics.renderer, draws) {
            error!("Frame dropped: {e}");
            graphics.renderer.discard_pending();
            graphics.window.request_redraw();
            return;
        }

        match graphics.renderer.render(&graphics.gpu) {
            Ok(()) => {}
            Err(RenderError::Surface(SurfaceError::Lost)) => {
                let (width, height) = graphics.gpu.size();
                graphics.gpu.resize(width, height);
            }
            Err(RenderError::Surface(SurfaceError::OutOfMemory)) => {
                error!("GPU out of memory");
                event_loop.exit();
            }
            Err(RenderError::Surface(SurfaceError::Timeout)) => {
                warn!("Surface timeout, skipping frame");
            }
            Err(e) => error!("Render error: {e}"),
        }

        graphics.window.request_redraw();
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.graphics.is_some() {
            return;
        }
        if let Err(e) = self.init_graphics(event_loop) {
            self.fail(event_loop, e);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested, exiting");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let Some(graphics) = self.graphics.as_mut() {
                    graphics.gpu.resize(size.width, size.height);
                    let (width, height) = graphics.gpu.size();
                    graphics
                        .renderer
                        .resize(&graphics.gpu.device, width, height);
                }
                self.session
                    .push(self.input.on_resize(size.width, size.height));
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.session
                    .push(self.input.on_cursor_moved(position.x, position.y));
            }
            WindowEvent::MouseInput { state, button, .. } => {
                self.session.push(self.input.on_mouse_button(button, state));
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.session.push(self.input.on_wheel(delta));
            }
            WindowEvent::Touch(touch) => {
                if let Some(event) = self.input.on_touch(
                    touch.id,
                    touch.phase,
                    touch.location.x,
                    touch.location.y,
                ) {
                    self.session.push(event);
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(code) = event.physical_key
                    && let Some(input) = self.input.on_key(code, event.state, event.repeat)
                {
                    self.session.push(input);
                }
            }
            WindowEvent::Focused(true) => {
                self.reload_settings();
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }
}

/// Relative texture directories resolve against the working directory.
fn resolve_texture_dir(config: &Config) -> PathBuf {
    let dir = &config.assets.texture_dir;
    if dir.is_absolute() {
        return dir.clone();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(dir))
        .unwrap_or_else(|_| dir.clone())
}

/// Open the window and run until it closes.
pub fn run(config: Config, config_dir: PathBuf) -> Result<(), AppError> {
    let event_loop = EventLoop::new()?;
    let mut app = AppState::new(config, config_dir)?;
    info!("Starting event loop");
    event_loop.run_app(&mut app)?;
    match app.fatal.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
