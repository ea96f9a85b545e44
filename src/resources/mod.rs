//! CPU-side resource data: meshes, materials and decoded images.
//!
//! Nothing here touches the GPU; the renderer uploads on first use.

pub mod image;
pub mod material;
pub mod mesh;

pub use image::Image;
pub use material::Material;
pub use mesh::{Mesh, MeshVertex, Primitive};
