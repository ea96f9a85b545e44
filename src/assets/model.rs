use std::sync::Arc;

use glam::{Affine3A, Quat, Vec3};

use crate::animation::AnimationClip;
use crate::resources::Mesh;

/// A node as declared in the source file. Indices refer to
/// [`ModelAsset::nodes`], [`ModelAsset::meshes`] and [`ModelAsset::skins`].
#[derive(Debug, Clone)]
pub struct NodeDesc {
    pub name: String,
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
    pub children: Vec<usize>,
    pub mesh: Option<usize>,
    pub skin: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct SkinDesc {
    pub name: String,
    /// Node indices, in joint order.
    pub joints: Vec<usize>,
    pub inverse_bind_matrices: Vec<Affine3A>,
}

/// A parsed model, independent of any scene.
///
/// Produced off the UI thread by the asset loader. The scene instantiates it
/// with [`Scene::instantiate`](crate::scene::Scene::instantiate) and the
/// animation controller reads its clips.
#[derive(Debug, Clone)]
pub struct ModelAsset {
    pub name: String,
    pub nodes: Vec<NodeDesc>,
    /// Top-level nodes of the default scene.
    pub roots: Vec<usize>,
    pub meshes: Vec<Arc<Mesh>>,
    pub skins: Vec<SkinDesc>,
    /// Clips in file order.
    pub animations: Vec<Arc<AnimationClip>>,
}

impl ModelAsset {
    pub fn clip_names(&self) -> impl Iterator<Item = &str> {
        self.animations.iter().map(|clip| clip.name.as_str())
    }
}
