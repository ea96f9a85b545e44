use std::sync::Arc;

use glam::Vec4;

use crate::resources::image::Image;

/// Lambert-style material: base color factor times an optional texture.
#[derive(Debug, Clone)]
pub struct Material {
    pub name: String,
    pub base_color: Vec4,
    pub base_color_texture: Option<Arc<Image>>,
    pub double_sided: bool,
}

impl Material {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            base_color: Vec4::ONE,
            base_color_texture: None,
            double_sided: false,
        }
    }

    #[must_use]
    pub fn with_color(mut self, color: Vec4) -> Self {
        self.base_color = color;
        self
    }

    #[must_use]
    pub fn with_texture(mut self, texture: Arc<Image>) -> Self {
        self.base_color_texture = Some(texture);
        self
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::new("Default")
    }
}
