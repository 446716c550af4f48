//! # pagehub-entity
//!
//! Domain entity models for PageHub. Every struct in this crate represents
//! a database table row or a domain value object. Database entities derive
//! `sqlx::FromRow`.

pub mod content;
pub mod media;
pub mod usage;
