//! GPU rendering.
//!
//! The viewer talks to the GPU through [`RenderTarget`], so frame logic can
//! run against [`Renderer`] in the app and against a recording fake in tests.

pub mod context;
pub mod gpu_resources;
pub mod pipelines;
pub mod renderer;

pub use context::WgpuContext;
pub use renderer::Renderer;

use crate::errors::Result;
use crate::scene::{Camera, Scene};
use crate::ui::ClipPanel;
use crate::viewer::SurfaceSize;

/// Something a frame can be drawn into.
pub trait RenderTarget {
    /// Current drawable size in physical pixels.
    fn size(&self) -> SurfaceSize;

    /// Reallocates size-dependent attachments. Never called with a zero
    /// dimension.
    fn resize(&mut self, size: SurfaceSize);

    /// Draws `scene` from `camera`, with `panel` on top.
    fn render(&mut self, scene: &Scene, camera: &Camera, panel: &ClipPanel) -> Result<()>;
}
