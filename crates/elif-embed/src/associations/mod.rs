//! Associations Module - Embedded associations and their per-instance runtime

pub mod reflection;
pub mod embeds_one;
pub mod embeds_many;
pub mod manager;
pub mod cascade;

pub use reflection::{Cardinality, EmbedOptions, Reflection, ResolutionError};
pub use embeds_one::EmbedsOne;
pub use embeds_many::EmbedsMany;
pub use manager::{Association, AssociationManager};
pub use cascade::{save_associations, SaveSummary};

use serde_json::Value;

use crate::error::{ModelError, ModelResult};
use crate::model::Model;

/// Build a single target from raw owner storage
pub(crate) fn materialize_one(reflection: &Reflection, raw: Option<&Value>) -> ModelResult<Option<Model>> {
    match raw {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(attributes)) => {
            let class = reflection.target_class()?;
            Ok(Some(Model::from_attributes(&class, attributes.clone())))
        }
        Some(other) => Err(unexpected_raw(reflection, "an object", other)),
    }
}

/// Build a target collection from raw owner storage
pub(crate) fn materialize_many(reflection: &Reflection, raw: Option<&Value>) -> ModelResult<Vec<Model>> {
    let items = match raw {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(other) => return Err(unexpected_raw(reflection, "an array", other)),
    };
    if items.is_empty() {
        return Ok(Vec::new());
    }

    let class = reflection.target_class()?;
    items
        .iter()
        .map(|item| match item {
            Value::Object(attributes) => Ok(Model::from_attributes(&class, attributes.clone())),
            other => Err(unexpected_raw(reflection, "an array of objects", other)),
        })
        .collect()
}

/// Validate a target and flush its own associations, producing its storage hash
pub(crate) fn serialize_target(
    reflection: &Reflection,
    target: &mut Model,
    position: Option<usize>,
) -> ModelResult<Value> {
    let failures = target.validation_errors();
    if !failures.is_empty() {
        let messages: Vec<String> = failures.iter().map(|f| f.to_string()).collect();
        let reason = match position {
            Some(index) => format!("element {} is invalid: {}", index, messages.join(", ")),
            None => format!("target is invalid: {}", messages.join(", ")),
        };
        return Err(not_saved(reflection, reason));
    }

    target.save_associations().map_err(|err| {
        if err.is_resolution_error() {
            err
        } else {
            not_saved(reflection, err.to_string())
        }
    })?;

    Ok(Value::Object(target.to_storage_hash()))
}

/// Ensure an assigned object belongs to the association target class
pub(crate) fn check_kind(reflection: &Reflection, target: &Model) -> ModelResult<()> {
    let expected = reflection.target_class()?;
    if target.is_kind_of(&expected) {
        Ok(())
    } else {
        Err(ModelError::IncorrectEntity {
            association: format!("{}#{}", reflection.owner(), reflection.name()),
            expected: expected.to_string(),
            actual: target.class().to_string(),
        })
    }
}

fn not_saved(reflection: &Reflection, reason: String) -> ModelError {
    ModelError::AssociationNotSaved {
        owner: reflection.owner().to_string(),
        association: reflection.name().to_string(),
        reason,
    }
}

fn unexpected_raw(reflection: &Reflection, expected: &str, actual: &Value) -> ModelError {
    ModelError::Serialization(format!(
        "Raw data for `{}#{}` must be {}, got {}",
        reflection.owner(),
        reflection.name(),
        expected,
        actual
    ))
}
