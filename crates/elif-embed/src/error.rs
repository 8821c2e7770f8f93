//! Error types for the embedding layer
//!
//! Covers target class resolution, association saves, and the
//! configuration and serialization failures around them.

use thiserror::Error;

/// Result type alias for model and association operations
pub type ModelResult<T> = Result<T, ModelError>;

/// Error types for embedded model operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    /// No class is registered under the target name of an association
    #[error("Can not determine class for `{owner}#{association}` association")]
    AssociationClassUndetermined { owner: String, association: String },

    /// A nested association body has no named class to inherit from
    #[error("Can not determine superclass for `{owner}#{association}` association")]
    AssociationSuperclassUndetermined { owner: String, association: String },

    /// An embedded target failed validation during save
    #[error("Association `{owner}#{association}` was not saved: {reason}")]
    AssociationNotSaved {
        owner: String,
        association: String,
        reason: String,
    },

    /// The owner class declares no association with this name
    #[error("Unknown association `{owner}#{association}`")]
    UnknownAssociation { owner: String, association: String },

    /// An assigned object is not an instance of the association target class
    #[error("Association `{association}` expects `{expected}` but got `{actual}`")]
    IncorrectEntity {
        association: String,
        expected: String,
        actual: String,
    },

    /// A single/many operation was used on an association of the other kind
    #[error("Association `{association}` is not an {expected} association")]
    AssociationKindMismatch {
        association: String,
        expected: &'static str,
    },

    /// Model validation failed
    #[error("Validation error: {0}")]
    Validation(String),

    /// Invalid class or registry configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl ModelError {
    /// Returns true for the errors raised while resolving a target class
    pub fn is_resolution_error(&self) -> bool {
        matches!(
            self,
            Self::AssociationClassUndetermined { .. } | Self::AssociationSuperclassUndetermined { .. }
        )
    }
}

impl From<serde_json::Error> for ModelError {
    fn from(err: serde_json::Error) -> Self {
        ModelError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for ModelError {
    fn from(err: serde_yaml::Error) -> Self {
        ModelError::Configuration(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_messages() {
        let err = ModelError::AssociationClassUndetermined {
            owner: "User".to_string(),
            association: "author".to_string(),
        };
        assert_eq!(err.to_string(), "Can not determine class for `User#author` association");
        assert!(err.is_resolution_error());

        let err = ModelError::AssociationSuperclassUndetermined {
            owner: "User".to_string(),
            association: "projects".to_string(),
        };
        assert_eq!(err.to_string(), "Can not determine superclass for `User#projects` association");
    }

    #[test]
    fn test_not_saved_is_not_a_resolution_error() {
        let err = ModelError::AssociationNotSaved {
            owner: "User".to_string(),
            association: "projects".to_string(),
            reason: "title can't be blank".to_string(),
        };
        assert!(!err.is_resolution_error());
        assert!(err.to_string().contains("User#projects"));
    }
}
