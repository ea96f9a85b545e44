use crate::scene::NodeHandle;

/// The node property a track writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetPath {
    /// `transform.position`
    Translation,
    /// `transform.rotation`
    Rotation,
    /// `transform.scale`
    Scale,
}

/// Resolved link from one track of an action's clip to a mixer property slot.
#[derive(Debug, Clone, Copy)]
pub struct PropertyBinding {
    pub track_index: usize,
    /// Index into the mixer's property table.
    pub property: usize,
}

/// Identity of a blended property: several actions animating the same node
/// property share one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PropertyKey {
    pub node: NodeHandle,
    pub target: TargetPath,
}
