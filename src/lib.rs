//! # anim-glass
//!
//! A small glTF viewer that plays the skeletal animation clips embedded in a
//! model and cross-fades between them.
//!
//! - [`viewer::Viewer`] owns the scene, camera, orbit controls and the
//!   [`viewer::AnimationController`], and runs one frame at a time against
//!   any [`render::RenderTarget`].
//! - [`app::ViewerApp`] hosts the viewer in a winit window with a wgpu
//!   [`render::Renderer`] and an egui clip panel.
//! - [`assets::AssetLoader`] reads and decodes the model and background
//!   off the event-loop thread.

pub mod animation;
pub mod app;
pub mod assets;
pub mod config;
pub mod errors;
pub mod render;
pub mod resources;
pub mod scene;
pub mod ui;
pub mod utils;
pub mod viewer;

pub use animation::{AnimationAction, AnimationClip, AnimationMixer, LoopMode};
pub use app::ViewerApp;
pub use assets::{AssetLoader, GltfLoader, ModelAsset};
pub use config::ViewerConfig;
pub use errors::{Result, ViewerError};
pub use render::{RenderTarget, Renderer};
pub use scene::{Camera, Node, Scene};
pub use ui::ClipPanel;
pub use utils::OrbitControls;
pub use viewer::{AnimationController, SurfaceSize, Viewer, ViewerCommand};
