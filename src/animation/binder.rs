use rustc_hash::FxHashMap;

use crate::scene::{NodeHandle, Scene};

/// Resolves track node names to scene nodes inside one model's subtree.
///
/// The lookup table is built once per model. The first node found
/// depth-first wins when names repeat.
pub struct Binder {
    by_name: FxHashMap<String, NodeHandle>,
}

impl Binder {
    #[must_use]
    pub fn new(scene: &Scene, root: NodeHandle) -> Self {
        let mut by_name = FxHashMap::default();
        let mut stack = vec![root];

        while let Some(handle) = stack.pop() {
            let Some(node) = scene.get_node(handle) else {
                continue;
            };
            by_name.entry(node.name.clone()).or_insert(handle);
            // Reverse so children are visited in declaration order.
            stack.extend(node.children().iter().rev().copied());
        }

        Self { by_name }
    }

    #[must_use]
    pub fn resolve(&self, node_name: &str) -> Option<NodeHandle> {
        self.by_name.get(node_name).copied()
    }
}
