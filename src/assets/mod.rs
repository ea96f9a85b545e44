//! Asset loading: async file I/O, glTF parsing and image decoding.

pub mod loader;
pub mod loaders;
pub mod model;

pub use loader::{AssetEvent, AssetLoader};
pub use loaders::GltfLoader;
pub use model::{ModelAsset, NodeDesc, SkinDesc};
