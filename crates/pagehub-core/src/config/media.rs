//! Media library configuration.

use serde::{Deserialize, Serialize};

/// Settings describing the public upload URL layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    /// URL prefix under which uploads are served.
    #[serde(default = "default_uploads_url_prefix")]
    pub uploads_url_prefix: String,
    /// Names of the generated WebP size variants.
    #[serde(default = "default_variant_sizes")]
    pub variant_sizes: Vec<String>,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            uploads_url_prefix: default_uploads_url_prefix(),
            variant_sizes: default_variant_sizes(),
        }
    }
}

fn default_uploads_url_prefix() -> String {
    "/uploads".to_string()
}

fn default_variant_sizes() -> Vec<String> {
    vec!["small".to_string(), "medium".to_string(), "large".to_string()]
}
