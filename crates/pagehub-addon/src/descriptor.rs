//! The `addon.json` descriptor file.

use std::path::Path;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::addon::AddonIdentity;

/// File name of the descriptor inside an addon directory.
pub const DESCRIPTOR_FILE: &str = "addon.json";

/// Raw descriptor as written on disk. Every field is optional at parse
/// time so that runtime loading and installation can apply their own rules.
/// Numbers and booleans are read as their text (`"version": 2` is `"2"`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PackageDescriptor {
    #[serde(default, deserialize_with = "scalar_text")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "scalar_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "scalar_text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "scalar_text")]
    pub version: Option<String>,
    #[serde(default, deserialize_with = "scalar_text")]
    pub author: Option<String>,
}

fn scalar_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(other) => Err(D::Error::custom(format!(
            "expected text, found {}",
            if other.is_array() { "an array" } else { "an object" }
        ))),
    }
}

impl PackageDescriptor {
    /// Parses descriptor JSON.
    pub fn parse(raw: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(raw)
    }

    /// Reads and parses `<dir>/addon.json`. Returns `Ok(None)` when the file
    /// does not exist.
    pub async fn read_from_dir(dir: &Path) -> std::io::Result<Option<Self>> {
        let path = dir.join(DESCRIPTOR_FILE);
        match tokio::fs::read(&path).await {
            Ok(raw) => Self::parse(&raw)
                .map(Some)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Strict validation used by the installer: `id`, `name`, `version` and
    /// `author` must be present and non-blank.
    pub fn validate(&self) -> Result<AddonIdentity, String> {
        let missing: Vec<&str> = [
            ("id", &self.id),
            ("name", &self.name),
            ("version", &self.version),
            ("author", &self.author),
        ]
        .into_iter()
        .filter(|(_, value)| non_blank(value).is_none())
        .map(|(field, _)| field)
        .collect();

        if !missing.is_empty() {
            return Err(format!("missing required field(s): {}", missing.join(", ")));
        }

        let id = non_blank(&self.id).unwrap_or_default().to_string();
        if !is_safe_id(&id) {
            return Err(format!("id '{id}' is not a valid directory name"));
        }

        Ok(AddonIdentity {
            id,
            name: non_blank(&self.name).unwrap_or_default().to_string(),
            description: non_blank(&self.description)
                .unwrap_or_default()
                .to_string(),
            version: non_blank(&self.version).unwrap_or_default().to_string(),
            author: non_blank(&self.author).unwrap_or_default().to_string(),
        })
    }

    /// Lenient conversion used when loading from disk. Missing fields fall
    /// back to defaults; a missing id falls back to `dir_name`.
    pub fn into_identity(self, dir_name: &str) -> AddonIdentity {
        let id = non_blank(&self.id).unwrap_or(dir_name).to_string();
        AddonIdentity {
            name: non_blank(&self.name).unwrap_or(&id).to_string(),
            description: non_blank(&self.description)
                .unwrap_or("No description")
                .to_string(),
            version: non_blank(&self.version).unwrap_or("1.0.0").to_string(),
            author: non_blank(&self.author).unwrap_or("unknown").to_string(),
            id,
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// An id may become a directory name: no separators, no parent references.
pub(crate) fn is_safe_id(id: &str) -> bool {
    !id.is_empty()
        && id != "."
        && !id.contains("..")
        && !id.contains('/')
        && !id.contains('\\')
        && !id.contains('\0')
}
