//! wgpu Context
//!
//! [`WgpuContext`] owns the device, queue and window surface, plus the
//! size-dependent attachments (depth and MSAA color) that are rebuilt on
//! resize.

use std::sync::Arc;

use winit::window::Window;

use crate::config::RenderSettings;
use crate::errors::{Result, ViewerError};

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

pub struct WgpuContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub surface: wgpu::Surface<'static>,
    pub config: wgpu::SurfaceConfiguration,

    /// Effective MSAA sample count after checking adapter support.
    pub sample_count: u32,
    pub depth_view: wgpu::TextureView,
    /// Multisampled color target, resolved into the swapchain frame.
    /// `None` when `sample_count == 1`.
    pub msaa_view: Option<wgpu::TextureView>,
    pub clear_color: wgpu::Color,
}

impl WgpuContext {
    pub async fn new(window: Arc<Window>, settings: &RenderSettings) -> Result<Self> {
        let size = window.inner_size();
        let (width, height) = (size.width.max(1), size.height.max(1));

        let instance = wgpu::Instance::default();
        let surface = instance
            .create_surface(window)
            .map_err(|e| ViewerError::AdapterRequestFailed(e.to_string()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: settings.power_preference,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| ViewerError::AdapterRequestFailed(e.to_string()))?;

        let info = adapter.get_info();
        log::info!("Adapter: {} ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("anim-glass device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::Performance,
                ..Default::default()
            })
            .await?;

        let mut config = surface
            .get_default_config(&adapter, width, height)
            .ok_or_else(|| {
                ViewerError::AdapterRequestFailed("Surface not supported by adapter".to_string())
            })?;

        // Shaders output linear color; let the swapchain do the sRGB encode.
        let caps = surface.get_capabilities(&adapter);
        if let Some(format) = caps.formats.iter().copied().find(wgpu::TextureFormat::is_srgb) {
            config.format = format;
        }
        config.present_mode = if settings.vsync {
            wgpu::PresentMode::AutoVsync
        } else {
            wgpu::PresentMode::AutoNoVsync
        };
        surface.configure(&device, &config);

        let sample_count = Self::supported_sample_count(&adapter, config.format, settings.msaa_samples);
        let depth_view = Self::create_depth_texture(&device, &config, sample_count);
        let msaa_view = Self::create_msaa_texture(&device, &config, sample_count);

        Ok(Self {
            device,
            queue,
            surface,
            config,
            sample_count,
            depth_view,
            msaa_view,
            clear_color: settings.clear_color(),
        })
    }

    /// Falls back to no MSAA when the adapter can't multisample `format`
    /// at the requested count.
    fn supported_sample_count(
        adapter: &wgpu::Adapter,
        format: wgpu::TextureFormat,
        requested: u32,
    ) -> u32 {
        if requested <= 1 {
            return 1;
        }
        let flags = adapter.get_texture_format_features(format).flags;
        if flags.sample_count_supported(requested) {
            requested
        } else {
            log::warn!("MSAA x{requested} not supported for {format:?}, disabling");
            1
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
            self.depth_view = Self::create_depth_texture(&self.device, &self.config, self.sample_count);
            self.msaa_view = Self::create_msaa_texture(&self.device, &self.config, self.sample_count);
        }
    }

    fn create_depth_texture(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
        sample_count: u32,
    ) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: wgpu::Extent3d {
                width: config.width,
                height: config.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&wgpu::TextureViewDescriptor::default())
    }

    fn create_msaa_texture(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
        sample_count: u32,
    ) -> Option<wgpu::TextureView> {
        if sample_count <= 1 {
            return None;
        }
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("MSAA Color Texture"),
            size: wgpu::Extent3d {
                width: config.width,
                height: config.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count,
            dimension: wgpu::TextureDimension::D2,
            format: config.format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        Some(texture.create_view(&wgpu::TextureViewDescriptor::default()))
    }

    #[inline]
    #[must_use]
    pub fn color_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    #[inline]
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }
}
