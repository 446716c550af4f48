//! Addons compiled into the host binary.

pub mod activity_log;
pub mod watermark;

pub use activity_log::ActivityLogAddon;
pub use watermark::WatermarkAddon;
