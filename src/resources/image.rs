use std::sync::atomic::{AtomicU64, Ordering};

use crate::errors::Result;

// Keys the renderer's texture cache.
static NEXT_IMAGE_ID: AtomicU64 = AtomicU64::new(1);

/// Decoded RGBA8 (sRGB) pixel data.
#[derive(Debug, Clone)]
pub struct Image {
    id: u64,
    pub label: String,
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl PartialEq for Image {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}
impl Eq for Image {}

impl Image {
    /// `pixels` must hold `width * height * 4` bytes.
    #[must_use]
    pub fn new(label: &str, width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(pixels.len(), (width * height * 4) as usize);
        Self {
            id: NEXT_IMAGE_ID.fetch_add(1, Ordering::Relaxed),
            label: label.to_string(),
            width,
            height,
            pixels,
        }
    }

    /// 1x1 image of a single color.
    #[must_use]
    pub fn solid(label: &str, rgba: [u8; 4]) -> Self {
        Self::new(label, 1, 1, rgba.to_vec())
    }

    #[must_use]
    pub fn from_dynamic(label: &str, img: image::DynamicImage) -> Self {
        let rgba = img.into_rgba8();
        let (width, height) = rgba.dimensions();
        Self::new(label, width, height, rgba.into_raw())
    }

    /// Decodes PNG or JPEG bytes, guessing the format from the content.
    pub fn decode(label: &str, bytes: &[u8]) -> Result<Self> {
        let img = image::load_from_memory(bytes)?;
        Ok(Self::from_dynamic(label, img))
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[inline]
    #[must_use]
    pub fn aspect(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}
