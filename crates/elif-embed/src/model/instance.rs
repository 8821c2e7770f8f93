//! Model Instances - Attribute storage, validation and serialization
//!
//! A `Model` is one instance of a `ModelClass`. It keeps raw attribute
//! storage (embedded associations are stored there too, as plain JSON) and
//! the per-instance association runtimes that materialize that raw data.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::associations::manager::AssociationManager;
use crate::error::{ModelError, ModelResult};
use super::attributes::{AttributeMap, ValidationFailure};
use super::class::ModelClass;

/// An instance of a model class
#[derive(Clone)]
pub struct Model {
    pub(crate) class: Arc<ModelClass>,
    pub(crate) attributes: AttributeMap,
    pub(crate) associations: AssociationManager,
}

impl Model {
    /// Create an instance with default attribute values
    pub fn new(class: &Arc<ModelClass>) -> Self {
        let mut attributes = AttributeMap::new();
        for definition in class.attributes() {
            attributes.insert(definition.name.clone(), definition.default.clone());
        }
        for reflection in class.reflections() {
            attributes.insert(reflection.name().to_string(), Value::Null);
        }
        if let Some(key) = class.identity_key() {
            attributes.insert(key.attribute.clone(), key.generate());
        }

        Self {
            class: Arc::clone(class),
            attributes,
            associations: AssociationManager::new(class.reflections().len()),
        }
    }

    /// Create an instance from raw attributes
    ///
    /// Every key is written verbatim: declared attributes, raw association
    /// data, and keys the class does not declare. Undeclared keys stay on the
    /// instance but are never part of `to_storage_hash`.
    pub fn from_attributes(class: &Arc<ModelClass>, attributes: AttributeMap) -> Self {
        let mut model = Self::new(class);
        for (name, value) in attributes {
            model.attributes.insert(name, value);
        }
        model
    }

    /// Create an instance from a JSON object
    pub fn from_value(class: &Arc<ModelClass>, value: Value) -> ModelResult<Self> {
        match value {
            Value::Object(attributes) => Ok(Self::from_attributes(class, attributes)),
            Value::Null => Ok(Self::new(class)),
            other => Err(ModelError::Serialization(format!(
                "Cannot build {} from non-object value {}",
                class, other
            ))),
        }
    }

    pub fn class(&self) -> &Arc<ModelClass> {
        &self.class
    }

    pub fn is_kind_of(&self, class: &ModelClass) -> bool {
        self.class.is_kind_of(class)
    }

    pub fn read_attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Write raw attribute storage; does not touch loaded association targets
    pub fn write_attribute(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.attributes.insert(name.into(), value.into());
    }

    /// Raw attribute storage, including pass-through keys
    pub fn attributes(&self) -> &AttributeMap {
        &self.attributes
    }

    /// Identity key value, if the class declares one
    pub fn identity(&self) -> Option<&Value> {
        let key = self.class.identity_key()?;
        self.attributes.get(&key.attribute)
    }

    pub fn validation_errors(&self) -> Vec<ValidationFailure> {
        self.class
            .validations()
            .iter()
            .filter_map(|validation| validation.check(&self.attributes))
            .collect()
    }

    pub fn is_valid(&self) -> bool {
        self.validation_errors().is_empty()
    }

    /// Validate, returning a combined validation error on failure
    pub fn validate(&self) -> ModelResult<()> {
        let failures = self.validation_errors();
        if failures.is_empty() {
            return Ok(());
        }
        let messages: Vec<String> = failures.iter().map(|f| f.to_string()).collect();
        Err(ModelError::Validation(messages.join(", ")))
    }

    /// Declared attributes and raw association data, as written to an owner
    pub fn to_storage_hash(&self) -> AttributeMap {
        let mut hash = AttributeMap::new();
        for definition in self.class.attributes() {
            let value = self.attributes.get(&definition.name).cloned().unwrap_or(Value::Null);
            hash.insert(definition.name.clone(), value);
        }
        for reflection in self.class.reflections() {
            let value = self.attributes.get(reflection.name()).cloned().unwrap_or(Value::Null);
            hash.insert(reflection.name().to_string(), value);
        }
        hash
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("class", &self.class.to_string())
            .field("attributes", &self.attributes)
            .finish()
    }
}
