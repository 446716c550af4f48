//! Repository implementations for PageHub entities.

pub mod content;
pub mod media;
pub mod usage;

pub use content::ContentRepository;
pub use media::MediaRepository;
pub use usage::AssetUsageRepository;
