//! Finds media references in rich-text bodies.

use regex::Regex;

use pagehub_core::config::media::MediaConfig;
use pagehub_core::error::AppError;
use pagehub_core::result::AppResult;

/// Matches `<prefix>/originals/<token>` and `<prefix>/webp/<size>/<token>`
/// and captures the filename token.
#[derive(Debug, Clone)]
pub struct ReferenceScanner {
    pattern: Regex,
}

impl ReferenceScanner {
    /// Builds the pattern for an upload URL prefix and the WebP size variants.
    pub fn new<S: AsRef<str>>(uploads_url_prefix: &str, variant_sizes: &[S]) -> AppResult<Self> {
        let prefix = regex::escape(uploads_url_prefix.trim_end_matches('/'));
        let sizes: Vec<String> = variant_sizes
            .iter()
            .map(|s| s.as_ref().trim())
            .filter(|s| !s.is_empty())
            .map(regex::escape)
            .collect();

        let folders = if sizes.is_empty() {
            "originals".to_string()
        } else {
            format!("originals|webp/(?:{})", sizes.join("|"))
        };
        let source = format!(r#"{prefix}/(?:{folders})/([^"'\s?#<>)]+)"#);

        let pattern = Regex::new(&source).map_err(|e| {
            AppError::configuration(format!("Invalid asset reference pattern '{source}': {e}"))
        })?;
        Ok(Self { pattern })
    }

    pub fn from_config(config: &MediaConfig) -> AppResult<Self> {
        Self::new(&config.uploads_url_prefix, &config.variant_sizes)
    }

    /// Candidate filename tokens in `body`, deduplicated, in first-seen order.
    pub fn scan(&self, body: &str) -> Vec<String> {
        let mut candidates: Vec<String> = Vec::new();
        for captures in self.pattern.captures_iter(body) {
            let Some(token) = captures.get(1) else {
                continue;
            };
            let token = token.as_str();
            if !candidates.iter().any(|c| c == token) {
                candidates.push(token.to_string());
            }
        }
        candidates
    }
}

/// The filename without its last extension. Dot-files keep their name.
pub fn strip_extension(filename: &str) -> &str {
    match filename.rfind('.') {
        Some(pos) if pos > 0 => &filename[..pos],
        _ => filename,
    }
}
