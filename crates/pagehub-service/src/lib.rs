//! # pagehub-service
//!
//! Business logic on top of the repositories. Currently hosts the asset
//! usage indexer behind the [`usage::UsageStore`] seam.

pub mod usage;

pub use usage::{AssetUsageService, MemoryUsageStore, PgUsageStore, RebuildSummary, UsageStore};
