//! Attribute definitions and presence validation rules

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Raw attribute storage of a model instance
pub type AttributeMap = serde_json::Map<String, Value>;

/// A declared scalar attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeDefinition {
    pub name: String,
    pub default: Value,
}

impl AttributeDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: Value::Null,
        }
    }

    pub fn with_default(name: impl Into<String>, default: Value) -> Self {
        Self {
            name: name.into(),
            default,
        }
    }
}

/// Validation rule attached to a model class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Validation {
    /// Attribute must be non-null and, for strings and collections, non-empty
    Presence(String),
}

impl Validation {
    /// Check the rule against raw attributes, returning the failure if any
    pub fn check(&self, attributes: &AttributeMap) -> Option<ValidationFailure> {
        match self {
            Validation::Presence(field) => {
                let present = match attributes.get(field) {
                    None | Some(Value::Null) => false,
                    Some(Value::String(s)) => !s.trim().is_empty(),
                    Some(Value::Array(items)) => !items.is_empty(),
                    Some(Value::Object(map)) => !map.is_empty(),
                    Some(_) => true,
                };
                (!present).then(|| ValidationFailure::new(field.clone(), "can't be blank"))
            }
        }
    }
}

/// A single failed validation on a model instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationFailure {
    pub field: String,
    pub message: String,
}

impl ValidationFailure {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn attrs(value: Value) -> AttributeMap {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_presence() {
        let rule = Validation::Presence("title".to_string());

        assert!(rule.check(&attrs(json!({"title": "Project"}))).is_none());
        assert!(rule.check(&attrs(json!({"title": 0}))).is_none());
        assert!(rule.check(&attrs(json!({}))).is_some());
        assert!(rule.check(&attrs(json!({"title": null}))).is_some());
        assert!(rule.check(&attrs(json!({"title": "  "}))).is_some());
        assert!(rule.check(&attrs(json!({"title": []}))).is_some());
    }

    #[test]
    fn test_failure_display() {
        let failure = ValidationFailure::new("title", "can't be blank");
        assert_eq!(failure.to_string(), "title can't be blank");
    }
}
