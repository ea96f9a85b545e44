use std::sync::Arc;

use bytemuck::{Pod, Zeroable};

use crate::resources::material::Material;

/// Interleaved vertex layout shared by rigid and skinned meshes.
///
/// Rigid vertices use joint 0 with weight 1; the renderer binds a one-entry
/// palette holding the node's world matrix for them.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
    pub joints: [u32; 4],
    pub weights: [f32; 4],
}

impl MeshVertex {
    pub const ATTRIBUTES: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x3,
        2 => Float32x2,
        3 => Uint32x4,
        4 => Float32x4,
    ];

    #[must_use]
    pub fn rigid(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            uv,
            joints: [0; 4],
            weights: [1.0, 0.0, 0.0, 0.0],
        }
    }

    #[must_use]
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// One draw call: vertices, triangle-list indices and a material.
#[derive(Debug, Clone)]
pub struct Primitive {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
    pub material: Arc<Material>,
    pub skinned: bool,
}

#[derive(Debug, Clone)]
pub struct Mesh {
    pub name: String,
    pub primitives: Vec<Primitive>,
}

impl Mesh {
    #[must_use]
    pub fn new(name: &str, primitives: Vec<Primitive>) -> Self {
        Self {
            name: name.to_string(),
            primitives,
        }
    }

    #[must_use]
    pub fn is_skinned(&self) -> bool {
        self.primitives.iter().any(|p| p.skinned)
    }
}
