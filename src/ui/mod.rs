//! On-screen UI: the clip selection panel and the egui render pass that
//! draws it.

pub mod clip_panel;
pub mod egui_pass;

pub use clip_panel::{ClipPanel, PANEL_TITLE};
pub use egui_pass::EguiPass;
