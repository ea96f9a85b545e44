use crate::viewer::ViewerCommand;

pub const PANEL_TITLE: &str = "Animations";

/// The "Animations" window: one button per clip plus a status line.
///
/// Clicking a button does not touch animation state directly; it queues a
/// [`ViewerCommand::ChangeAnimation`] that the viewer handles on its next pump.
pub struct ClipPanel {
    buttons: Vec<String>,
    active: Option<String>,
    status: Option<String>,
    commands: flume::Sender<ViewerCommand>,
}

impl ClipPanel {
    #[must_use]
    pub fn new(commands: flume::Sender<ViewerCommand>) -> Self {
        Self {
            buttons: Vec::new(),
            active: None,
            status: None,
            commands,
        }
    }

    /// Appends a button. Labels may repeat; every call adds one.
    pub fn add_button(&mut self, label: &str) {
        self.buttons.push(label.to_string());
    }

    #[must_use]
    pub fn buttons(&self) -> &[String] {
        &self.buttons
    }

    /// Same effect as clicking the button labeled `label`. Returns false
    /// when no such button exists.
    pub fn click(&self, label: &str) -> bool {
        if !self.buttons.iter().any(|b| b == label) {
            return false;
        }
        let _ = self
            .commands
            .send(ViewerCommand::ChangeAnimation(label.to_string()));
        true
    }

    pub fn set_active(&mut self, label: Option<&str>) {
        self.active = label.map(str::to_string);
    }

    #[must_use]
    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some(message.into());
    }

    #[must_use]
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn show(&self, ctx: &egui::Context) {
        egui::Window::new(PANEL_TITLE)
            .default_pos([16.0, 16.0])
            .resizable(false)
            .show(ctx, |ui| {
                if let Some(status) = &self.status {
                    ui.colored_label(egui::Color32::LIGHT_RED, status);
                }
                if self.buttons.is_empty() && self.status.is_none() {
                    ui.label("Loading…");
                }
                for label in &self.buttons {
                    let selected = self.active.as_deref() == Some(label.as_str());
                    if ui.selectable_label(selected, label).clicked() {
                        self.click(label);
                    }
                }
            });
    }
}
