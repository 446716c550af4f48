//! The value passed to every listener of one hook firing.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::definitions::HookKind;

/// One firing of a hook.
///
/// The dispatcher hands the same event to each listener in turn, so a
/// payload change made by one listener is visible to the next.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HookEvent {
    /// The hook kind being fired.
    pub kind: HookKind,
    /// Arbitrary data keyed by string.
    pub data: HashMap<String, Value>,
    /// The acting user, if any.
    pub user_id: Option<String>,
    /// When the event was created.
    pub fired_at: DateTime<Utc>,
}

impl HookEvent {
    /// Creates a new event with an empty payload.
    pub fn new(kind: HookKind) -> Self {
        Self {
            kind,
            data: HashMap::new(),
            user_id: None,
            fired_at: Utc::now(),
        }
    }

    /// Sets the acting user.
    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Inserts a payload value.
    pub fn with_value(mut self, key: &str, value: Value) -> Self {
        self.data.insert(key.to_string(), value);
        self
    }

    /// Inserts a string value.
    pub fn with_string(self, key: &str, value: &str) -> Self {
        self.with_value(key, Value::from(value))
    }

    /// Inserts an integer value.
    pub fn with_int(self, key: &str, value: i64) -> Self {
        self.with_value(key, Value::from(value))
    }

    /// Inserts a boolean value.
    pub fn with_bool(self, key: &str, value: bool) -> Self {
        self.with_value(key, Value::from(value))
    }

    /// Sets or replaces a payload value in place.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.data.insert(key.to_string(), value.into());
    }

    /// Returns whether the payload has `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Gets a raw payload value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Gets a string value.
    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(Value::as_str)
    }

    /// Gets an i64 value.
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.data.get(key).and_then(Value::as_i64)
    }

    /// Gets a bool value.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.data.get(key).and_then(Value::as_bool)
    }

    /// Gets a structured (object) value.
    pub fn get_object(&self, key: &str) -> Option<&serde_json::Map<String, Value>> {
        self.data.get(key).and_then(Value::as_object)
    }

    /// Gets a string field of a structured value, e.g. `media.filename`.
    pub fn get_nested_string(&self, key: &str, field: &str) -> Option<&str> {
        self.get_object(key)
            .and_then(|obj| obj.get(field))
            .and_then(Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_typed_getters() {
        let event = HookEvent::new(HookKind::BeforeMediaSave)
            .with_user("admin")
            .with_string("title", "Cat")
            .with_int("size", 2048)
            .with_bool("public", true)
            .with_value("media", json!({ "filename": "cat.jpg" }));

        assert_eq!(event.user_id.as_deref(), Some("admin"));
        assert_eq!(event.get_string("title"), Some("Cat"));
        assert_eq!(event.get_i64("size"), Some(2048));
        assert_eq!(event.get_bool("public"), Some(true));
        assert_eq!(event.get_nested_string("media", "filename"), Some("cat.jpg"));
    }

    #[test]
    fn test_missing_or_mistyped_values_are_none() {
        let event = HookEvent::new(HookKind::BeforePageSave).with_string("title", "About");

        assert!(event.get_string("missing").is_none());
        assert!(event.get_i64("title").is_none());
        assert!(event.get_object("title").is_none());
        assert!(event.get_nested_string("title", "x").is_none());
    }

    #[test]
    fn test_set_overwrites() {
        let mut event = HookEvent::new(HookKind::BeforeMediaSave);
        event.set("watermarked", false);
        event.set("watermarked", true);
        assert_eq!(event.get_bool("watermarked"), Some(true));
        assert!(event.contains("watermarked"));
    }
}
