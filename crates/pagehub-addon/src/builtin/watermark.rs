//! Flags uploaded images for watermarking.

use std::path::Path;

use async_trait::async_trait;
use tracing::{debug, info};

use pagehub_core::result::AppResult;

use crate::addon::{Addon, AddonIdentity, HookListener};
use crate::hooks::{HookEvent, HookKind};

/// Addon id.
pub const WATERMARK_ADDON_ID: &str = "com.pagehub.watermark";

const DEFAULT_TEXT: &str = "© PageHub";
const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "gif", "webp"];
const HOOKS: [HookKind; 2] = [HookKind::BeforeMediaSave, HookKind::SystemInitialize];

/// On `BeforeMediaSave`, marks image uploads with `watermarked` and
/// `watermark_text` so the media pipeline stamps them.
#[derive(Debug)]
pub struct WatermarkAddon {
    identity: AddonIdentity,
    text: String,
}

impl WatermarkAddon {
    pub fn new() -> Self {
        Self::with_text(DEFAULT_TEXT)
    }

    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            identity: AddonIdentity::new(WATERMARK_ADDON_ID, "Watermark", "1.0.0", "PageHub Team")
                .with_description("Adds a watermark to every uploaded image"),
            text: text.into(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl Default for WatermarkAddon {
    fn default() -> Self {
        Self::new()
    }
}

fn is_image(filename: &str) -> bool {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.iter().any(|i| ext.eq_ignore_ascii_case(i)))
}

#[async_trait]
impl Addon for WatermarkAddon {
    fn identity(&self) -> &AddonIdentity {
        &self.identity
    }

    async fn initialize(&self) -> AppResult<()> {
        info!(addon_id = WATERMARK_ADDON_ID, text = %self.text, "Watermark addon active");
        Ok(())
    }

    fn hook_listener(&self) -> Option<&dyn HookListener> {
        Some(self)
    }
}

#[async_trait]
impl HookListener for WatermarkAddon {
    fn supported_hooks(&self) -> &[HookKind] {
        &HOOKS
    }

    async fn on_hook(&self, event: &mut HookEvent) -> AppResult<()> {
        match event.kind {
            HookKind::BeforeMediaSave => {
                let Some(filename) = event.get_nested_string("media", "filename") else {
                    return Ok(());
                };
                if !is_image(filename) {
                    debug!(filename, "Not an image, skipping watermark");
                    return Ok(());
                }
                debug!(filename, "Watermarking upload");
                event.set("watermarked", true);
                event.set("watermark_text", self.text.as_str());
            }
            HookKind::SystemInitialize => {
                info!(addon_id = WATERMARK_ADDON_ID, text = %self.text, "Watermark ready");
            }
            _ => {}
        }
        Ok(())
    }
}
