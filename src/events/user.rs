//! # User identity store.
//!
//! [`User`] holds the optional identifiers attached to every record. Updates
//! are additive: a field is only overwritten by a present, non-empty value and
//! there is no way to clear a field once set.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::event::Data;

/// Optional user identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
}

impl User {
    /// Builds an update carrying only a user id.
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    /// Reads identifiers from a command payload.
    ///
    /// Only non-empty string values count; anything else is treated as absent.
    pub fn from_data(data: &Data) -> Self {
        let field = |key: &str| match data.get(key) {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            _ => None,
        };
        Self {
            id: field("id"),
            device: field("device"),
            hash: field("hash"),
        }
    }

    /// Merges `update` into `self`, field by field.
    ///
    /// Absent or empty fields in `update` leave the current value untouched.
    pub fn merge(&mut self, update: &User) {
        fn set(slot: &mut Option<String>, value: &Option<String>) {
            if let Some(v) = value.as_deref().filter(|v| !v.is_empty()) {
                *slot = Some(v.to_string());
            }
        }
        set(&mut self.id, &update.id);
        set(&mut self.device, &update.device);
        set(&mut self.hash, &update.hash);
    }

    /// True if no identifier is set.
    pub fn is_empty(&self) -> bool {
        self.id.is_none() && self.device.is_none() && self.hash.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn merge_is_additive() {
        let mut user = User::default();
        user.merge(&User::with_id("u1"));
        user.merge(&User {
            device: Some("d1".into()),
            ..User::default()
        });

        assert_eq!(user.id.as_deref(), Some("u1"));
        assert_eq!(user.device.as_deref(), Some("d1"));
        assert_eq!(user.hash, None);
    }

    #[test]
    fn merge_cannot_clear_fields() {
        let mut user = User::with_id("u1");
        user.merge(&User {
            id: Some(String::new()),
            ..User::default()
        });
        user.merge(&User::default());
        assert_eq!(user.id.as_deref(), Some("u1"));
    }

    #[test]
    fn from_data_ignores_non_strings_and_empty_values() {
        let data = json!({"id": "u2", "device": "", "hash": 5, "extra": "x"});
        let user = User::from_data(data.as_object().unwrap());
        assert_eq!(user, User::with_id("u2"));
    }
}
