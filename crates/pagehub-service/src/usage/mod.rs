//! Asset usage indexing: which content items reference which media assets.

pub mod memory;
pub mod postgres;
pub mod scanner;
pub mod service;
pub mod store;

pub use memory::MemoryUsageStore;
pub use postgres::PgUsageStore;
pub use scanner::ReferenceScanner;
pub use service::{AssetUsageService, RebuildSummary};
pub use store::UsageStore;
