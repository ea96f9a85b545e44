//! GPU-side mirrors of scene resources.
//!
//! Everything here is created lazily the first time the renderer sees a
//! resource and cached by a key that stays stable for that resource's
//! lifetime: image id, mesh key, material pointer, node handle.

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec4};
use rustc_hash::FxHashMap;
use wgpu::util::DeviceExt;

use crate::resources::{Image, Material, Mesh};
use crate::scene::{MeshKey, NodeHandle};

// ============================================================================
// Uniform layouts
// ============================================================================

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct GlobalUniforms {
    pub view_proj: Mat4,
    pub light_dir: Vec4,
    pub light_color: Vec4,
    pub ambient: Vec4,
}

impl Default for GlobalUniforms {
    fn default() -> Self {
        Self {
            view_proj: Mat4::IDENTITY,
            light_dir: Vec4::Y,
            light_color: Vec4::ZERO,
            ambient: Vec4::ZERO,
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct MaterialUniforms {
    base_color: Vec4,
}

// ============================================================================
// Bind group layouts
// ============================================================================

/// The three bind group layouts shared by the mesh pipelines plus the one
/// the background pass uses.
pub struct BindGroupLayouts {
    pub globals: wgpu::BindGroupLayout,
    pub material: wgpu::BindGroupLayout,
    pub palette: wgpu::BindGroupLayout,
    pub background: wgpu::BindGroupLayout,
}

impl BindGroupLayouts {
    pub fn new(device: &wgpu::Device) -> Self {
        let globals = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Globals Layout"),
            entries: &[uniform_entry(0, wgpu::ShaderStages::VERTEX_FRAGMENT)],
        });

        let material = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Material Layout"),
            entries: &[
                uniform_entry(0, wgpu::ShaderStages::FRAGMENT),
                texture_entry(1),
                sampler_entry(2),
            ],
        });

        let palette = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Palette Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Storage { read_only: true },
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let background = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Background Layout"),
            entries: &[texture_entry(0), sampler_entry(1)],
        });

        Self {
            globals,
            material,
            palette,
            background,
        }
    }
}

fn uniform_entry(binding: u32, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn texture_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

fn sampler_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    }
}

// ============================================================================
// Textures
// ============================================================================

pub struct GpuTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl GpuTexture {
    /// Uploads `image` as an sRGB RGBA8 texture.
    pub fn from_image(device: &wgpu::Device, queue: &wgpu::Queue, image: &Image) -> Self {
        let size = wgpu::Extent3d {
            width: image.width.max(1),
            height: image.height.max(1),
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(&image.label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        if !image.pixels.is_empty() {
            queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                &image.pixels,
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(4 * size.width),
                    rows_per_image: Some(size.height),
                },
                size,
            );
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }
}

// ============================================================================
// Meshes
// ============================================================================

pub struct GpuPrimitive {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
    pub material: Arc<Material>,
}

pub struct GpuMesh {
    pub primitives: Vec<GpuPrimitive>,
}

impl GpuMesh {
    pub fn new(device: &wgpu::Device, mesh: &Mesh) -> Self {
        let primitives = mesh
            .primitives
            .iter()
            .filter(|p| !p.indices.is_empty())
            .map(|p| GpuPrimitive {
                vertex_buffer: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&mesh.name),
                    contents: bytemuck::cast_slice(&p.vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                }),
                index_buffer: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&mesh.name),
                    contents: bytemuck::cast_slice(&p.indices),
                    usage: wgpu::BufferUsages::INDEX,
                }),
                index_count: p.indices.len() as u32,
                material: Arc::clone(&p.material),
            })
            .collect();
        Self { primitives }
    }
}

// ============================================================================
// Palettes
// ============================================================================

/// Per-node matrix palette: the joint matrices of a skinned mesh, or the
/// world matrix of a rigid one.
pub struct GpuPalette {
    buffer: wgpu::Buffer,
    capacity: usize,
    pub bind_group: wgpu::BindGroup,
}

impl GpuPalette {
    fn new(device: &wgpu::Device, layout: &wgpu::BindGroupLayout, capacity: usize) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Palette Buffer"),
            size: (capacity.max(1) * std::mem::size_of::<Mat4>()) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Palette BindGroup"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });
        Self {
            buffer,
            capacity: capacity.max(1),
            bind_group,
        }
    }
}

// ============================================================================
// Cache
// ============================================================================

/// Lazily populated GPU resource cache.
pub struct GpuResources {
    pub layouts: BindGroupLayouts,
    pub sampler: wgpu::Sampler,
    white: GpuTexture,

    textures: FxHashMap<u64, GpuTexture>,
    meshes: FxHashMap<MeshKey, GpuMesh>,
    materials: FxHashMap<usize, wgpu::BindGroup>,
    palettes: FxHashMap<NodeHandle, GpuPalette>,
    background: Option<(u64, wgpu::BindGroup)>,
}

impl GpuResources {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Linear Repeat Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        let white = GpuTexture::from_image(device, queue, &Image::solid("white", [255; 4]));

        Self {
            layouts: BindGroupLayouts::new(device),
            sampler,
            white,
            textures: FxHashMap::default(),
            meshes: FxHashMap::default(),
            materials: FxHashMap::default(),
            palettes: FxHashMap::default(),
            background: None,
        }
    }

    fn ensure_texture(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, image: &Image) {
        self.textures
            .entry(image.id())
            .or_insert_with(|| GpuTexture::from_image(device, queue, image));
    }

    pub fn prepare_mesh(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, key: MeshKey, mesh: &Mesh) {
        if !self.meshes.contains_key(&key) {
            log::debug!("Uploading mesh {:?}", mesh.name);
            self.meshes.insert(key, GpuMesh::new(device, mesh));
        }

        for primitive in &mesh.primitives {
            let material = &primitive.material;
            let material_id = Arc::as_ptr(material) as usize;
            if self.materials.contains_key(&material_id) {
                continue;
            }
            if let Some(image) = &material.base_color_texture {
                self.ensure_texture(device, queue, image);
            }
            let bind_group = self.create_material_bind_group(device, material);
            self.materials.insert(material_id, bind_group);
        }
    }

    fn create_material_bind_group(&self, device: &wgpu::Device, material: &Material) -> wgpu::BindGroup {
        let uniforms = MaterialUniforms {
            base_color: material.base_color,
        };
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&material.name),
            contents: bytemuck::bytes_of(&uniforms),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        let view = material
            .base_color_texture
            .as_ref()
            .and_then(|image| self.textures.get(&image.id()))
            .map_or(&self.white.view, |t| &t.view);

        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&material.name),
            layout: &self.layouts.material,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        })
    }

    /// Writes `matrices` into the palette of `node`, growing it if needed.
    pub fn write_palette(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        node: NodeHandle,
        matrices: &[Mat4],
    ) {
        let needed = matrices.len().max(1);
        let grow = self.palettes.get(&node).is_none_or(|p| p.capacity < needed);
        if grow {
            let palette = GpuPalette::new(device, &self.layouts.palette, needed);
            self.palettes.insert(node, palette);
        }
        if let Some(palette) = self.palettes.get(&node) {
            queue.write_buffer(&palette.buffer, 0, bytemuck::cast_slice(matrices));
        }
    }

    /// Binds the background image, re-creating the bind group when the
    /// image changes.
    pub fn prepare_background(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, image: &Image) {
        if self.background.as_ref().is_some_and(|(id, _)| *id == image.id()) {
            return;
        }
        self.ensure_texture(device, queue, image);
        let Some(texture) = self.textures.get(&image.id()) else {
            return;
        };
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Background BindGroup"),
            layout: &self.layouts.background,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });
        self.background = Some((image.id(), bind_group));
    }

    #[must_use]
    pub fn mesh(&self, key: MeshKey) -> Option<&GpuMesh> {
        self.meshes.get(&key)
    }

    #[must_use]
    pub fn material(&self, material: &Arc<Material>) -> Option<&wgpu::BindGroup> {
        self.materials.get(&(Arc::as_ptr(material) as usize))
    }

    #[must_use]
    pub fn palette(&self, node: NodeHandle) -> Option<&wgpu::BindGroup> {
        self.palettes.get(&node).map(|p| &p.bind_group)
    }

    #[must_use]
    pub fn background(&self) -> Option<&wgpu::BindGroup> {
        self.background.as_ref().map(|(_, bg)| bg)
    }
}
