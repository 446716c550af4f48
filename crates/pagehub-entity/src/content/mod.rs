//! Content entities: pages and articles.

pub mod kind;
pub mod model;

pub use kind::ContentKind;
pub use model::{Article, ContentPage, IndexableContent};
