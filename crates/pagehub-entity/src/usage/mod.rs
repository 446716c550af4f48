//! Asset usage index entities.

pub mod model;
pub mod reference;

pub use model::{AssetUsage, NewAssetUsage};
pub use reference::ReferenceKind;
