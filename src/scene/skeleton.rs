use glam::{Affine3A, Mat4};
use slotmap::SlotMap;

use crate::scene::{Node, NodeHandle};

/// A skin: ordered bones and their inverse bind matrices.
#[derive(Debug, Clone)]
pub struct Skeleton {
    pub name: String,

    /// `bones[i]` is joint `i` in the vertex data.
    pub bones: Vec<NodeHandle>,
    pub(crate) inverse_bind_matrices: Vec<Affine3A>,

    /// World-space joint palette, refreshed every frame.
    pub(crate) joint_matrices: Vec<Mat4>,
}

impl Skeleton {
    /// Missing inverse bind matrices default to identity.
    #[must_use]
    pub fn new(name: &str, bones: Vec<NodeHandle>, mut inverse_bind_matrices: Vec<Affine3A>) -> Self {
        let count = bones.len();
        inverse_bind_matrices.resize(count, Affine3A::IDENTITY);
        Self {
            name: name.to_string(),
            bones,
            inverse_bind_matrices,
            joint_matrices: vec![Mat4::IDENTITY; count],
        }
    }

    #[must_use]
    pub fn joint_matrices(&self) -> &[Mat4] {
        &self.joint_matrices
    }

    /// `joint[i] = world(bone[i]) * inverse_bind[i]`.
    ///
    /// Skinned vertices end up in world space, so the mesh node's own
    /// transform is not applied on top.
    pub fn compute_joint_matrices(&mut self, nodes: &SlotMap<NodeHandle, Node>) {
        for (i, &bone) in self.bones.iter().enumerate() {
            let Some(node) = nodes.get(bone) else {
                continue;
            };
            let ibm = self.inverse_bind_matrices[i];
            self.joint_matrices[i] = Mat4::from(node.transform.world_matrix * ibm);
        }
    }
}
