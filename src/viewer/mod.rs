//! The viewer context: owns the scene, camera, controls, loaders and the
//! animation controller, and drives one frame at a time.

pub mod animation_controller;
pub mod commands;

pub use animation_controller::AnimationController;
pub use commands::{CommandQueue, ViewerCommand};

use glam::Vec3;

use crate::app::input::Input;
use crate::assets::{AssetEvent, AssetLoader, ModelAsset};
use crate::config::{ViewerConfig, color_from_hex};
use crate::errors::Result;
use crate::render::RenderTarget;
use crate::scene::{Camera, DirectionalLight, NodeHandle, Scene};
use crate::ui::ClipPanel;
use crate::utils::{FrameClock, OrbitControls};

/// Drawable size in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Application state for one viewer window.
///
/// Created once by the app and handed by `&mut` to whatever needs it. All
/// methods run on the event-loop thread.
pub struct Viewer {
    config: ViewerConfig,

    scene: Scene,
    camera: Camera,
    controls: OrbitControls,
    input: Input,

    animation: Option<AnimationController>,
    model_root: Option<NodeHandle>,

    clock: FrameClock,
    last_delta: f32,

    commands: CommandQueue,
    loader: AssetLoader,
    panel: ClipPanel,

    surface_size: SurfaceSize,
}

impl Viewer {
    /// Builds the scene, starts the background and model loads and sizes
    /// the camera for `surface_size`.
    pub fn new(config: ViewerConfig, surface_size: SurfaceSize) -> Result<Self> {
        let commands = CommandQueue::new();
        let panel = ClipPanel::new(commands.sender());
        let camera = Self::setup_camera(&config, surface_size);
        let controls = Self::setup_controls(&config);

        let mut viewer = Self {
            scene: Scene::new(),
            camera,
            controls,
            input: Input::new(),
            animation: None,
            model_root: None,
            clock: FrameClock::new(),
            last_delta: 0.0,
            commands,
            loader: AssetLoader::new()?,
            panel,
            surface_size: SurfaceSize::default(),
            config,
        };

        viewer.setup_light();
        viewer.setup_background();
        viewer.setup_model();
        viewer.resize(surface_size.width, surface_size.height);

        log::info!("Viewer ready ({}x{})", surface_size.width, surface_size.height);
        Ok(viewer)
    }

    fn setup_camera(config: &ViewerConfig, size: SurfaceSize) -> Camera {
        let cam = &config.camera;
        let aspect = if size.height > 0 {
            size.width as f32 / size.height as f32
        } else {
            1.0
        };
        let mut camera = Camera::new_perspective(cam.fov, aspect, cam.near, cam.far);
        camera.transform.position = cam.position;
        camera.look_at(cam.target);
        camera
    }

    fn setup_controls(config: &ViewerConfig) -> OrbitControls {
        let mut controls = OrbitControls::from_position(config.camera.position, config.camera.target);
        controls.max_distance = controls.max_distance.max(config.camera.far);
        controls
    }

    fn setup_light(&mut self) {
        let light = &self.config.light;
        self.scene.set_light(
            DirectionalLight::new(color_from_hex(light.color), light.intensity)
                .with_position(light.position)
                .with_target(Vec3::ZERO),
        );
    }

    fn setup_background(&mut self) {
        match &self.config.assets.background {
            Some(path) => self.loader.request_background(path.clone()),
            None => log::info!("No background configured"),
        }
    }

    fn setup_model(&mut self) {
        self.loader.request_model(self.config.assets.model.clone());
    }

    // ========================================================================
    // Events
    // ========================================================================

    /// Applies a new drawable size. Zero-area sizes are ignored.
    ///
    /// Returns whether the size was applied.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            log::warn!("Ignoring resize to {width}x{height}");
            return false;
        }

        self.camera.aspect = width as f32 / height as f32;
        self.camera.update_projection_matrix();
        self.surface_size = SurfaceSize::new(width, height);
        self.input.handle_resize(width, height);
        true
    }

    /// Handles finished loads and queued UI commands.
    pub fn pump(&mut self) {
        for event in self.loader.poll() {
            self.handle_asset_event(event);
        }
        for command in self.commands.drain() {
            self.handle_command(command);
        }
    }

    pub fn handle_asset_event(&mut self, event: AssetEvent) {
        match event {
            AssetEvent::Background { path, result } => match result {
                Ok(image) => {
                    log::info!("Background {} ({}x{})", path.display(), image.width, image.height);
                    self.scene.set_background(image);
                }
                Err(e) => {
                    log::error!("Failed to load background {}: {e}", path.display());
                    self.panel.set_status(format!("Background failed: {e}"));
                }
            },
            AssetEvent::Model { path, result } => match result {
                Ok(asset) => {
                    if let Err(e) = self.on_model_loaded(&asset) {
                        log::error!("Model {}: {e}", path.display());
                        self.panel.set_status(e.to_string());
                    }
                }
                Err(e) => {
                    log::error!("Failed to load model {}: {e}", path.display());
                    self.panel.set_status(format!("Model failed: {e}"));
                }
            },
        }
    }

    /// Adds `asset` to the scene and sets up its animations.
    ///
    /// Only the first model is accepted; later ones are logged and dropped.
    /// The model stays in the scene even if animation setup fails.
    pub fn on_model_loaded(&mut self, asset: &ModelAsset) -> Result<()> {
        if self.model_root.is_some() {
            log::warn!("Model {:?} ignored: a model is already loaded", asset.name);
            return Ok(());
        }

        let root = self.scene.instantiate(asset);
        self.model_root = Some(root);

        let controller = AnimationController::setup(
            root,
            &asset.animations,
            &self.scene,
            &mut self.panel,
            &self.config.animation,
        )?;
        self.panel.set_active(Some(controller.current_clip()));
        self.animation = Some(controller);
        Ok(())
    }

    pub fn handle_command(&mut self, command: ViewerCommand) {
        match command {
            ViewerCommand::ChangeAnimation(name) => {
                let Some(controller) = self.animation.as_mut() else {
                    if self.model_root.is_some() {
                        log::warn!("Cannot switch to {name:?}: animation setup failed");
                    } else {
                        log::warn!("Cannot switch to {name:?}: no model loaded");
                    }
                    return;
                };
                match controller.change_animation(&name) {
                    Ok(true) => self.panel.set_active(Some(&name)),
                    Ok(false) => log::debug!("{name:?} is already playing"),
                    Err(e) => log::warn!("{e}"),
                }
            }
        }
    }

    // ========================================================================
    // Frame
    // ========================================================================

    /// Runs one render-loop iteration for the frame at `timestamp_ms`:
    /// render, then advance the mixer by the time since the previous frame.
    ///
    /// Returns the elapsed seconds applied to the mixer.
    pub fn frame(&mut self, timestamp_ms: f64, target: &mut dyn RenderTarget) -> f32 {
        self.pump();

        let fov = self.camera.fov_degrees();
        self.controls
            .update(&mut self.camera.transform, &self.input, fov, self.last_delta);
        self.camera.update_view_matrix();
        self.input.end_frame();

        self.scene.update();

        let size = self.surface_size;
        if target.size() != size {
            target.resize(size);
        }
        if let Err(e) = target.render(&self.scene, &self.camera, &self.panel) {
            log::error!("Render failed: {e}");
        }

        let elapsed = self.clock.advance(timestamp_ms);
        if let Some(controller) = self.animation.as_mut() {
            controller.update(elapsed, &mut self.scene);
        }
        self.last_delta = elapsed;
        elapsed
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[must_use]
    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    #[must_use]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    #[must_use]
    pub fn controls(&self) -> &OrbitControls {
        &self.controls
    }

    pub fn input_mut(&mut self) -> &mut Input {
        &mut self.input
    }

    #[must_use]
    pub fn animation(&self) -> Option<&AnimationController> {
        self.animation.as_ref()
    }

    pub fn animation_mut(&mut self) -> Option<&mut AnimationController> {
        self.animation.as_mut()
    }

    #[must_use]
    pub fn model_root(&self) -> Option<NodeHandle> {
        self.model_root
    }

    #[must_use]
    pub fn panel(&self) -> &ClipPanel {
        &self.panel
    }

    #[must_use]
    pub fn commands(&self) -> &CommandQueue {
        &self.commands
    }

    pub fn loader_mut(&mut self) -> &mut AssetLoader {
        &mut self.loader
    }

    #[must_use]
    pub fn surface_size(&self) -> SurfaceSize {
        self.surface_size
    }

    #[must_use]
    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }
}
