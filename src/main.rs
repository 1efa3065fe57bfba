use std::sync::Arc;

use glam::Vec2;
use log::{error, info, warn};
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::*,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use nucleus::config::PageConfig;
use nucleus::controls::ControlAction;
use nucleus::input::PointerSample;
use nucleus::page::Page;
use nucleus::renderer::Renderer;
use nucleus::scheduler::FrameClock;

const DEFAULT_WIDTH: u32 = 1280;
const DEFAULT_HEIGHT: u32 = 800;

struct App {
    config: PageConfig,
    initial_size: LogicalSize<u32>,
    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,
    page: Option<Page>,
    clock: FrameClock,
    /// Only the first finger down drives the pointer
    active_touch: Option<u64>,
}

impl App {
    fn new(config: PageConfig, initial_size: LogicalSize<u32>) -> Self {
        Self {
            config,
            initial_size,
            window: None,
            renderer: None,
            page: None,
            clock: FrameClock::new(),
            active_touch: None,
        }
    }

    fn request_redraw(&self) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(page) = &mut self.page {
            page.unmount();
        }
        event_loop.exit();
    }

    fn pointer(&mut self, sample: PointerSample) {
        if let Some(page) = &mut self.page {
            page.handle_pointer(&sample);
        }
    }

    fn touch(&mut self, touch: Touch) {
        let position = Vec2::new(touch.location.x as f32, touch.location.y as f32);
        let sample = match (touch.phase, self.active_touch) {
            (TouchPhase::Started, None) => {
                self.active_touch = Some(touch.id);
                PointerSample::touch_start(position)
            }
            (TouchPhase::Moved, Some(id)) if id == touch.id => PointerSample::touch_move(position),
            (TouchPhase::Ended | TouchPhase::Cancelled, Some(id)) if id == touch.id => {
                self.active_touch = None;
                PointerSample::touch_end(position)
            }
            _ => return,
        };
        self.pointer(sample);
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(renderer), Some(page)) = (&mut self.renderer, &mut self.page) else {
            return;
        };
        let dt = self.clock.tick();
        let canvas = page.frame(dt);

        match renderer.render(canvas) {
            Ok(_) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                renderer.reconfigure();
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                error!("GPU out of memory, exiting");
                page.unmount();
                event_loop.exit();
                return;
            }
            Err(e) => warn!("Render error: {:?}", e),
        }

        if page.is_active() {
            self.request_redraw();
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let window_attributes = Window::default_attributes()
            .with_title("Nucleus")
            .with_inner_size(self.initial_size);

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };
        self.window = Some(window.clone());

        let renderer = match pollster::block_on(Renderer::new(window.clone())) {
            Ok(renderer) => renderer,
            Err(e) => {
                error!("Failed to initialize renderer: {}", e);
                event_loop.exit();
                return;
            }
        };
        let size = renderer.size();
        self.renderer = Some(renderer);

        let viewport = Vec2::new(size.width as f32, size.height as f32);
        self.page = Some(Page::new(self.config.clone(), viewport));
        info!("Nucleus running at {}x{}", size.width, size.height);
        window.request_redraw();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => self.shutdown(event_loop),

            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                if code == KeyCode::Escape {
                    self.shutdown(event_loop);
                    return;
                }
                let applied = match (ControlAction::from_key(code), &mut self.page) {
                    (Some(action), Some(page)) => page.apply(action),
                    _ => false,
                };
                if applied {
                    self.request_redraw();
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                self.pointer(PointerSample::mouse_move(Vec2::new(
                    position.x as f32,
                    position.y as f32,
                )));
                self.request_redraw();
            }

            WindowEvent::CursorLeft { .. } => {
                self.pointer(PointerSample::mouse_leave());
                self.request_redraw();
            }

            WindowEvent::Touch(touch) => {
                self.touch(touch);
                self.request_redraw();
            }

            WindowEvent::Resized(physical_size) => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize(physical_size);
                }
                if physical_size.width > 0 && physical_size.height > 0 {
                    if let Some(page) = &mut self.page {
                        page.resize(Vec2::new(
                            physical_size.width as f32,
                            physical_size.height as f32,
                        ));
                    }
                }
                self.request_redraw();
            }

            WindowEvent::RedrawRequested => self.redraw(event_loop),

            _ => {}
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod cli {
    use std::path::PathBuf;

    use clap::{Parser, ValueEnum};

    use nucleus::config::{PageConfig, CONFIG_ENV};
    use nucleus::layout_engine::AutoplayMode;

    #[derive(Debug, Clone, Copy, ValueEnum)]
    pub enum Autoplay {
        All,
        Hover,
    }

    impl From<Autoplay> for AutoplayMode {
        fn from(value: Autoplay) -> Self {
            match value {
                Autoplay::All => AutoplayMode::All,
                Autoplay::Hover => AutoplayMode::Hover,
            }
        }
    }

    /// Nucleus landing surface: particle wordmark and hover grid
    #[derive(Debug, Parser)]
    #[command(name = "nucleus", version, about)]
    pub struct Cli {
        /// Page descriptor (JSON); the built-in page is used when absent or invalid
        #[arg(long, env = CONFIG_ENV)]
        pub config: Option<PathBuf>,

        /// Initial window width in logical pixels
        #[arg(long, default_value_t = super::DEFAULT_WIDTH)]
        pub width: u32,

        /// Initial window height in logical pixels
        #[arg(long, default_value_t = super::DEFAULT_HEIGHT)]
        pub height: u32,

        /// Grid units given to the hovered row and column
        #[arg(long)]
        pub hover_size: Option<f32>,

        /// Gap between panes in pixels
        #[arg(long)]
        pub gap: Option<f32>,

        /// Start with pane borders hidden
        #[arg(long)]
        pub no_borders: bool,

        /// Autoplay mode for embedded animations
        #[arg(long, value_enum)]
        pub autoplay: Option<Autoplay>,
    }

    impl Cli {
        /// The page descriptor with command line overrides applied.
        pub fn page_config(&self) -> PageConfig {
            let mut config = PageConfig::load_or_default(self.config.as_deref());
            let options = &mut config.grid.options;
            if let Some(hover_size) = self.hover_size {
                options.hover_size = hover_size;
            }
            if let Some(gap) = self.gap {
                options.gap_size = gap;
            }
            if self.no_borders {
                options.show_frame_visuals = false;
            }
            if let Some(autoplay) = self.autoplay {
                options.autoplay_mode = autoplay.into();
            }
            config
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use clap::Parser;

    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Set up logging
    env_logger::init();

    let cli = cli::Cli::parse();
    let config = cli.page_config();

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(e) => {
            error!("Failed to create event loop: {}", e);
            std::process::exit(1);
        }
    };
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new(config, LogicalSize::new(cli.width, cli.height));
    if let Err(e) = event_loop.run_app(&mut app) {
        error!("Event loop terminated: {}", e);
        std::process::exit(1);
    }
}

// WebAssembly entry point
#[cfg(target_arch = "wasm32")]
fn main() {
    std::panic::set_hook(Box::new(console_error_panic_hook::hook));
    if console_log::init_with_level(log::Level::Warn).is_err() {
        return;
    }

    wasm_bindgen_futures::spawn_local(run());
}

#[cfg(target_arch = "wasm32")]
async fn run() {
    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(e) => {
            error!("Failed to create event loop: {}", e);
            return;
        }
    };
    let mut app = App::new(
        PageConfig::default(),
        LogicalSize::new(DEFAULT_WIDTH, DEFAULT_HEIGHT),
    );

    if let Err(e) = event_loop.run_app(&mut app) {
        error!("Event loop terminated: {}", e);
    }
}
