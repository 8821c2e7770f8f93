//! Identity Key - Optional primary-key-like attribute for models
//!
//! A class declaring an identity key compares instances by that key alone.
//! Keys are generated when an instance is constructed without one.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Identity key declaration on a model class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityKey {
    /// Attribute holding the key
    pub attribute: String,
}

impl IdentityKey {
    pub fn new(attribute: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
        }
    }

    /// Generate a fresh key value
    pub fn generate(&self) -> Value {
        Value::String(Uuid::new_v4().to_string())
    }

    /// Check if a stored key value is usable (non-null, non-nil UUID)
    pub fn is_valid(value: &Value) -> bool {
        match value {
            Value::Null => false,
            Value::String(s) => match Uuid::parse_str(s) {
                Ok(uuid) => !uuid.is_nil(),
                Err(_) => !s.is_empty(),
            },
            _ => true,
        }
    }
}

impl Default for IdentityKey {
    fn default() -> Self {
        Self::new("id")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_generated_keys_are_unique() {
        let key = IdentityKey::default();
        assert_eq!(key.attribute, "id");

        let a = key.generate();
        let b = key.generate();
        assert_ne!(a, b);
        assert!(IdentityKey::is_valid(&a));
    }

    #[test]
    fn test_key_validity() {
        assert!(!IdentityKey::is_valid(&Value::Null));
        assert!(!IdentityKey::is_valid(&json!(Uuid::nil().to_string())));
        assert!(!IdentityKey::is_valid(&json!("")));
        assert!(IdentityKey::is_valid(&json!("user-1")));
        assert!(IdentityKey::is_valid(&json!(42)));
    }
}
