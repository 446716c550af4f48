//! Media library entities.

pub mod model;

pub use model::MediaItem;
