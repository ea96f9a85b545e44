//! egui overlay drawn on top of the resolved scene.
//!
//! The renderer calls [`EguiPass::run`] once per frame to build the panel,
//! then [`EguiPass::record`] to draw it into the frame's encoder.

use winit::event::{ElementState, WindowEvent};
use winit::window::Window;

/// Tessellated output of one egui pass, waiting to be drawn.
#[derive(Default)]
struct UiFrame {
    primitives: Vec<egui::ClippedPrimitive>,
    textures: egui::TexturesDelta,
}

pub struct EguiPass {
    ctx: egui::Context,
    winit_state: egui_winit::State,
    painter: egui_wgpu::Renderer,
    screen: egui_wgpu::ScreenDescriptor,
    frame: UiFrame,
}

impl EguiPass {
    pub fn new(device: &wgpu::Device, output_format: wgpu::TextureFormat, window: &Window) -> Self {
        let ctx = egui::Context::default();
        let winit_state =
            egui_winit::State::new(ctx.clone(), ctx.viewport_id(), window, None, None, None);
        let painter =
            egui_wgpu::Renderer::new(device, output_format, egui_wgpu::RendererOptions::default());

        let size = window.inner_size();
        Self {
            ctx,
            winit_state,
            painter,
            screen: egui_wgpu::ScreenDescriptor {
                size_in_pixels: [size.width, size.height],
                pixels_per_point: window.scale_factor() as f32,
            },
            frame: UiFrame::default(),
        }
    }

    /// Feeds a window event to egui. Returns true when egui consumed it.
    ///
    /// Releases are never reported as consumed, so a drag that ends over the
    /// panel still ends for the orbit controls.
    pub fn on_window_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        let consumed = self.winit_state.on_window_event(window, event).consumed;
        match event {
            WindowEvent::MouseInput {
                state: ElementState::Released,
                ..
            } => false,
            _ => consumed,
        }
    }

    /// Runs one egui pass with `build` and keeps its tessellated output.
    pub fn run(&mut self, window: &Window, build: impl FnOnce(&egui::Context)) {
        let input = self.winit_state.take_egui_input(window);
        self.ctx.begin_pass(input);
        build(&self.ctx);
        let output = self.ctx.end_pass();

        self.winit_state
            .handle_platform_output(window, output.platform_output);

        let mut textures = std::mem::take(&mut self.frame.textures);
        textures.append(output.textures_delta);
        self.frame = UiFrame {
            primitives: self.ctx.tessellate(output.shapes, output.pixels_per_point),
            textures,
        };
    }

    pub fn resize(&mut self, width: u32, height: u32, scale_factor: f32) {
        self.screen = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [width, height],
            pixels_per_point: scale_factor,
        };
    }

    /// Uploads the last pass and draws it over `view`.
    ///
    /// Returns command buffers produced by paint callbacks; they must be
    /// submitted before `encoder`.
    pub fn record(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
    ) -> Vec<wgpu::CommandBuffer> {
        let textures = std::mem::take(&mut self.frame.textures);
        for (id, delta) in &textures.set {
            self.painter.update_texture(device, queue, *id, delta);
        }

        let callback_buffers =
            self.painter
                .update_buffers(device, queue, encoder, &self.frame.primitives, &self.screen);

        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("UI Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                        depth_slice: None,
                    })],
                    depth_stencil_attachment: None,
                    timestamp_writes: None,
                    occlusion_query_set: None,
                    multiview_mask: None,
                })
                .forget_lifetime();
            self.painter
                .render(&mut pass, &self.frame.primitives, &self.screen);
        }

        for id in &textures.free {
            self.painter.free_texture(id);
        }
        callback_buffers
    }
}
