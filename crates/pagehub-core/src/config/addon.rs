//! Addon runtime and installer configuration.

use serde::{Deserialize, Serialize};

/// Addon system configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddonConfig {
    /// Directory holding one subdirectory per installed addon.
    #[serde(default = "default_directory")]
    pub directory: String,
    /// Scratch directory for uploaded packages, extraction and update backups.
    #[serde(default = "default_scratch_directory")]
    pub scratch_directory: String,
    /// Maximum accepted package size in bytes (default 10 MiB).
    #[serde(default = "default_max_package_bytes")]
    pub max_package_bytes: u64,
    /// Whether to scan the addon directory on startup.
    #[serde(default = "default_true")]
    pub auto_load: bool,
    /// Whether on-disk enabled markers restore the runtime enabled flag on startup.
    #[serde(default = "default_true")]
    pub reconcile_enabled_markers: bool,
    /// Ids of compiled-in addons to enable on startup regardless of markers.
    #[serde(default = "default_builtin_enabled")]
    pub builtin_enabled: Vec<String>,
}

impl Default for AddonConfig {
    fn default() -> Self {
        Self {
            directory: default_directory(),
            scratch_directory: default_scratch_directory(),
            max_package_bytes: default_max_package_bytes(),
            auto_load: true,
            reconcile_enabled_markers: true,
            builtin_enabled: default_builtin_enabled(),
        }
    }
}

fn default_directory() -> String {
    "./data/addons".to_string()
}

fn default_scratch_directory() -> String {
    "./data/uploads/addons".to_string()
}

fn default_max_package_bytes() -> u64 {
    10 * 1024 * 1024
}

fn default_builtin_enabled() -> Vec<String> {
    vec![
        "com.pagehub.activitylog".to_string(),
        "com.pagehub.watermark".to_string(),
    ]
}

fn default_true() -> bool {
    true
}
