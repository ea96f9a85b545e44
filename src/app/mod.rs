//! Winit application shell.
//!
//! [`ViewerApp`] creates the window on `resumed`, builds the [`Renderer`]
//! and the [`Viewer`], then drives one [`Viewer::frame`] per redraw.
//!
//! ```rust,ignore
//! let config = ViewerConfig::default().with_env_overrides();
//! ViewerApp::new(config).run()?;
//! ```

pub mod input;

use std::sync::Arc;
use std::time::Instant;

use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::config::ViewerConfig;
use crate::errors::Result;
use crate::render::Renderer;
use crate::viewer::{SurfaceSize, Viewer};

pub struct ViewerApp {
    config: ViewerConfig,
}

impl ViewerApp {
    #[must_use]
    pub fn new(config: ViewerConfig) -> Self {
        Self { config }
    }

    /// Runs the event loop until the window closes.
    pub fn run(self) -> Result<()> {
        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut runner = AppRunner::new(self.config);
        event_loop.run_app(&mut runner)?;
        Ok(())
    }
}

/// Live state once the window exists.
struct Running {
    window: Arc<Window>,
    renderer: Renderer,
    viewer: Viewer,
}

struct AppRunner {
    config: Option<ViewerConfig>,
    running: Option<Running>,
    start_time: Instant,
}

impl AppRunner {
    fn new(config: ViewerConfig) -> Self {
        Self {
            config: Some(config),
            running: None,
            start_time: Instant::now(),
        }
    }

    fn init(event_loop: &ActiveEventLoop, config: ViewerConfig) -> Result<Running> {
        let window_attributes = Window::default_attributes()
            .with_title(&config.window.title)
            .with_inner_size(winit::dpi::LogicalSize::new(
                config.window.width,
                config.window.height,
            ));
        let window = Arc::new(event_loop.create_window(window_attributes)?);

        log::info!("Initializing renderer...");
        let renderer = Renderer::new(Arc::clone(&window), &config.render)?;

        let size = window.inner_size();
        let viewer = Viewer::new(config, SurfaceSize::new(size.width, size.height))?;

        Ok(Running {
            window,
            renderer,
            viewer,
        })
    }
}

impl ApplicationHandler for AppRunner {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let Some(config) = self.config.take() else {
            return;
        };

        match Self::init(event_loop, config) {
            Ok(running) => {
                running.window.request_redraw();
                self.running = Some(running);
                self.start_time = Instant::now();
            }
            Err(e) => {
                log::error!("Fatal error during startup: {e}");
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        let Some(running) = &mut self.running else {
            return;
        };

        let consumed = running.renderer.handle_window_event(&event);
        if !consumed {
            running.viewer.input_mut().handle_window_event(&event);
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                running.viewer.resize(size.width, size.height);
            }
            WindowEvent::RedrawRequested => {
                let timestamp_ms = self.start_time.elapsed().as_secs_f64() * 1000.0;
                running.viewer.frame(timestamp_ms, &mut running.renderer);
                running.window.request_redraw();
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(running) = &self.running {
            running.window.request_redraw();
        }
    }
}
