use std::sync::Arc;

use glam::Vec4;
use winit::event::WindowEvent;
use winit::window::Window;

use crate::config::RenderSettings;
use crate::errors::{Result, ViewerError};
use crate::render::RenderTarget;
use crate::render::context::WgpuContext;
use crate::render::gpu_resources::{GlobalUniforms, GpuResources};
use crate::render::pipelines::Pipelines;
use crate::scene::{Camera, Scene};
use crate::ui::{ClipPanel, EguiPass};
use crate::viewer::SurfaceSize;

/// Forward renderer for one window: background, lit meshes, then the egui
/// overlay.
pub struct Renderer {
    window: Arc<Window>,
    context: WgpuContext,
    resources: GpuResources,
    pipelines: Pipelines,

    globals: GlobalUniforms,
    ambient: Vec4,
    globals_buffer: wgpu::Buffer,
    globals_bind_group: wgpu::BindGroup,

    ui: EguiPass,
}

impl Renderer {
    /// Creates the GPU context for `window`. Blocks until the device is ready.
    pub fn new(window: Arc<Window>, settings: &RenderSettings) -> Result<Self> {
        let context = pollster::block_on(WgpuContext::new(Arc::clone(&window), settings))?;
        let device = &context.device;

        let resources = GpuResources::new(device, &context.queue);
        let pipelines = Pipelines::new(
            device,
            &resources.layouts,
            context.color_format(),
            context.sample_count,
        );

        let globals_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Global Uniforms"),
            size: std::mem::size_of::<GlobalUniforms>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Global BindGroup"),
            layout: &resources.layouts.globals,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });

        let ui = EguiPass::new(device, context.color_format(), &window);
        let [r, g, b] = settings.ambient;

        log::info!(
            "Renderer ready: {:?}, MSAA x{}",
            context.color_format(),
            context.sample_count
        );

        Ok(Self {
            window,
            context,
            resources,
            pipelines,
            globals: GlobalUniforms::default(),
            ambient: Vec4::new(r, g, b, 1.0),
            globals_buffer,
            globals_bind_group,
            ui,
        })
    }

    #[must_use]
    pub fn window(&self) -> &Arc<Window> {
        &self.window
    }

    /// Forwards a window event to the UI. Returns true if the UI consumed it.
    pub fn handle_window_event(&mut self, event: &WindowEvent) -> bool {
        self.ui.on_window_event(&self.window, event)
    }

    fn update_globals(&mut self, scene: &Scene, camera: &Camera) {
        self.globals.view_proj = *camera.view_projection_matrix();
        self.globals.ambient = self.ambient;
        if let Some(light) = &scene.light {
            self.globals.light_dir = (-light.direction()).extend(0.0);
            self.globals.light_color = (light.color * light.intensity).extend(1.0);
        } else {
            self.globals.light_color = Vec4::ZERO;
        }
        self.context
            .queue
            .write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(&self.globals));
    }

    fn prepare_scene(&mut self, scene: &Scene) {
        let device = &self.context.device;
        let queue = &self.context.queue;

        if let Some(background) = &scene.background {
            self.resources.prepare_background(device, queue, background);
        }

        for instance in scene.mesh_instances() {
            self.resources
                .prepare_mesh(device, queue, instance.key, instance.mesh);

            match instance.skeleton {
                Some(skeleton) => {
                    self.resources
                        .write_palette(device, queue, instance.node, skeleton.joint_matrices());
                }
                None => {
                    self.resources
                        .write_palette(device, queue, instance.node, &[instance.world]);
                }
            }
        }
    }

    fn draw_scene(&self, encoder: &mut wgpu::CommandEncoder, frame_view: &wgpu::TextureView, scene: &Scene) {
        let (view, resolve_target) = match &self.context.msaa_view {
            Some(msaa) => (msaa, Some(frame_view)),
            None => (frame_view, None),
        };

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Main Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.context.clear_color),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.context.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        if scene.background.is_some()
            && let Some(bind_group) = self.resources.background()
        {
            pass.set_pipeline(&self.pipelines.background);
            pass.set_bind_group(0, bind_group, &[]);
            pass.draw(0..3, 0..1);
        }

        pass.set_bind_group(0, &self.globals_bind_group, &[]);

        for instance in scene.mesh_instances() {
            let (Some(gpu_mesh), Some(palette)) = (
                self.resources.mesh(instance.key),
                self.resources.palette(instance.node),
            ) else {
                continue;
            };
            pass.set_bind_group(2, palette, &[]);

            for primitive in &gpu_mesh.primitives {
                let Some(material) = self.resources.material(&primitive.material) else {
                    continue;
                };
                let pipeline = if primitive.material.double_sided {
                    &self.pipelines.mesh_double_sided
                } else {
                    &self.pipelines.mesh
                };
                pass.set_pipeline(pipeline);
                pass.set_bind_group(1, material, &[]);
                pass.set_vertex_buffer(0, primitive.vertex_buffer.slice(..));
                pass.set_index_buffer(primitive.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..primitive.index_count, 0, 0..1);
            }
        }
    }
}

impl RenderTarget for Renderer {
    fn size(&self) -> SurfaceSize {
        let (width, height) = self.context.size();
        SurfaceSize::new(width, height)
    }

    fn resize(&mut self, size: SurfaceSize) {
        self.context.resize(size.width, size.height);
        self.ui
            .resize(size.width, size.height, self.window.scale_factor() as f32);
    }

    fn render(&mut self, scene: &Scene, camera: &Camera, panel: &ClipPanel) -> Result<()> {
        let (output, reconfigure) = match self.context.surface.get_current_texture() {
            wgpu::CurrentSurfaceTexture::Success(output) => (output, false),
            wgpu::CurrentSurfaceTexture::Suboptimal(output) => (output, true),
            wgpu::CurrentSurfaceTexture::Outdated => {
                let (width, height) = self.context.size();
                self.context.resize(width, height);
                return Ok(());
            }
            wgpu::CurrentSurfaceTexture::Timeout | wgpu::CurrentSurfaceTexture::Occluded => {
                return Ok(());
            }
            other => return Err(ViewerError::Surface(format!("{other:?}"))),
        };
        let frame_view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.update_globals(scene, camera);
        self.prepare_scene(scene);
        self.ui.run(&self.window, |ctx| panel.show(ctx));

        let mut encoder = self
            .context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });
        self.draw_scene(&mut encoder, &frame_view, scene);
        let ui_buffers =
            self.ui
                .record(&self.context.device, &self.context.queue, &mut encoder, &frame_view);

        self.context
            .queue
            .submit(ui_buffers.into_iter().chain(std::iter::once(encoder.finish())));
        self.window.pre_present_notify();
        output.present();

        if reconfigure {
            let (width, height) = self.context.size();
            self.context.resize(width, height);
        }
        Ok(())
    }
}

