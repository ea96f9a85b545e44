use std::sync::Arc;

use glam::Mat4;
use slotmap::SlotMap;

use crate::assets::ModelAsset;
use crate::resources::{Image, Mesh};
use crate::scene::light::DirectionalLight;
use crate::scene::node::Node;
use crate::scene::skeleton::Skeleton;
use crate::scene::transform::Transform;
use crate::scene::transform_system;
use crate::scene::{MeshKey, NodeHandle, SkeletonKey};

/// Scene graph container.
///
/// Pure data: nodes in a slotmap arena with a list of roots, pooled meshes
/// and skeletons, at most one directional light and an optional background
/// image. GPU resources live in the renderer.
pub struct Scene {
    pub nodes: SlotMap<NodeHandle, Node>,
    pub root_nodes: Vec<NodeHandle>,

    pub meshes: SlotMap<MeshKey, Arc<Mesh>>,
    pub skins: SlotMap<SkeletonKey, Skeleton>,

    pub light: Option<DirectionalLight>,
    pub background: Option<Arc<Image>>,
}

/// A mesh ready to draw: the mesh plus either its world matrix or a
/// skinning palette.
pub struct MeshInstance<'a> {
    pub node: NodeHandle,
    pub key: MeshKey,
    pub mesh: &'a Mesh,
    pub world: Mat4,
    pub skeleton: Option<&'a Skeleton>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            root_nodes: Vec::new(),
            meshes: SlotMap::with_key(),
            skins: SlotMap::with_key(),
            light: None,
            background: None,
        }
    }

    // ========================================================================
    // Hierarchy
    // ========================================================================

    /// Adds a node at the root level.
    pub fn add_node(&mut self, node: Node) -> NodeHandle {
        let handle = self.nodes.insert(node);
        self.root_nodes.push(handle);
        handle
    }

    pub fn add_to_parent(&mut self, mut child: Node, parent: NodeHandle) -> NodeHandle {
        if !self.nodes.contains_key(parent) {
            log::warn!("Parent node not found, adding {:?} at root level", child.name);
            return self.add_node(child);
        }
        child.parent = Some(parent);
        let handle = self.nodes.insert(child);
        self.nodes[parent].children.push(handle);
        handle
    }

    /// Re-parents `child` under `parent`, detaching it from its old parent
    /// or from the root list.
    pub fn attach(&mut self, child: NodeHandle, parent: NodeHandle) {
        if child == parent {
            log::warn!("Cannot attach node to itself");
            return;
        }
        if !self.nodes.contains_key(child) || !self.nodes.contains_key(parent) {
            log::error!("Attach failed: node not found");
            return;
        }

        match self.nodes[child].parent {
            Some(old) => {
                if let Some(old_parent) = self.nodes.get_mut(old) {
                    old_parent.children.retain(|&c| c != child);
                }
            }
            None => self.root_nodes.retain(|&r| r != child),
        }

        self.nodes[parent].children.push(child);
        let node = &mut self.nodes[child];
        node.parent = Some(parent);
        node.transform.mark_dirty();
    }

    #[must_use]
    pub fn get_node(&self, handle: NodeHandle) -> Option<&Node> {
        self.nodes.get(handle)
    }

    pub fn get_node_mut(&mut self, handle: NodeHandle) -> Option<&mut Node> {
        self.nodes.get_mut(handle)
    }

    /// First node named `name` in the subtree of `root`, depth-first.
    #[must_use]
    pub fn find_by_name(&self, root: NodeHandle, name: &str) -> Option<NodeHandle> {
        let mut stack = vec![root];
        while let Some(handle) = stack.pop() {
            let node = self.nodes.get(handle)?;
            if node.name == name {
                return Some(handle);
            }
            stack.extend(node.children.iter().rev().copied());
        }
        None
    }

    // ========================================================================
    // Environment
    // ========================================================================

    pub fn set_light(&mut self, light: DirectionalLight) {
        self.light = Some(light);
    }

    pub fn set_background(&mut self, image: Arc<Image>) {
        self.background = Some(image);
    }

    // ========================================================================
    // Per-frame update
    // ========================================================================

    pub fn update_matrix_world(&mut self) {
        transform_system::update_hierarchy(&mut self.nodes, &self.root_nodes);
    }

    pub fn update_skeletons(&mut self) {
        let nodes = &self.nodes;
        for skeleton in self.skins.values_mut() {
            skeleton.compute_joint_matrices(nodes);
        }
    }

    /// World matrices first, then skinning palettes.
    pub fn update(&mut self) {
        self.update_matrix_world();
        self.update_skeletons();
    }

    /// Visible nodes carrying a mesh.
    pub fn mesh_instances(&self) -> impl Iterator<Item = MeshInstance<'_>> {
        self.nodes.iter().filter(|(_, n)| n.visible).filter_map(|(handle, node)| {
            let key = node.mesh?;
            let mesh = self.meshes.get(key)?;
            Some(MeshInstance {
                node: handle,
                key,
                mesh,
                world: node.transform.world_matrix_as_mat4(),
                skeleton: node.skin.and_then(|s| self.skins.get(s)),
            })
        })
    }

    // ========================================================================
    // Model instantiation
    // ========================================================================

    /// Adds `asset` to the scene under a new root node named after it and
    /// returns that node.
    ///
    /// Meshes are shared with the asset; nodes and skeletons are created
    /// fresh, so calling this twice yields two independent copies.
    pub fn instantiate(&mut self, asset: &ModelAsset) -> NodeHandle {
        let root = self.add_node(Node::new(&asset.name));

        let mesh_keys: Vec<MeshKey> = asset
            .meshes
            .iter()
            .map(|mesh| self.meshes.insert(Arc::clone(mesh)))
            .collect();

        let handles: Vec<NodeHandle> = asset
            .nodes
            .iter()
            .map(|desc| {
                let mut node = Node::new(&desc.name).with_transform(Transform::from_trs(
                    desc.translation,
                    desc.rotation,
                    desc.scale,
                ));
                node.mesh = desc.mesh.and_then(|i| mesh_keys.get(i).copied());
                self.nodes.insert(node)
            })
            .collect();

        for (index, desc) in asset.nodes.iter().enumerate() {
            for &child in &desc.children {
                let Some(&child_handle) = handles.get(child) else {
                    log::warn!("Node {index} references missing child {child}");
                    continue;
                };
                self.nodes[handles[index]].children.push(child_handle);
                self.nodes[child_handle].parent = Some(handles[index]);
            }
        }

        for &scene_root in &asset.roots {
            if let Some(&handle) = handles.get(scene_root) {
                self.nodes[root].children.push(handle);
                self.nodes[handle].parent = Some(root);
            }
        }

        let skin_keys: Vec<SkeletonKey> = asset
            .skins
            .iter()
            .map(|skin| {
                let bones = skin
                    .joints
                    .iter()
                    .filter_map(|&j| handles.get(j).copied())
                    .collect();
                self.skins.insert(Skeleton::new(
                    &skin.name,
                    bones,
                    skin.inverse_bind_matrices.clone(),
                ))
            })
            .collect();

        for (desc, &handle) in asset.nodes.iter().zip(&handles) {
            if let Some(skin) = desc.skin {
                self.nodes[handle].skin = skin_keys.get(skin).copied();
            }
        }

        self.update();
        log::info!(
            "Instantiated model {:?}: {} nodes, {} meshes, {} skins",
            asset.name,
            handles.len(),
            mesh_keys.len(),
            skin_keys.len()
        );
        root
    }
}
