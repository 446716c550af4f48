//! # pagehub-database
//!
//! PostgreSQL database connection management and concrete repository
//! implementations for the PageHub entities the usage indexer reads and
//! writes.

pub mod connection;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
