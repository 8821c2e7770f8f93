//! EmbedsOne - A single embedded object stored inline in the owner

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, trace};

use crate::error::ModelResult;
use crate::model::{AttributeMap, Model};

use super::reflection::Reflection;
use super::{check_kind, materialize_one, serialize_target};

/// Runtime of one `embeds_one` association on one owner instance
#[derive(Debug, Clone)]
pub struct EmbedsOne {
    reflection: Arc<Reflection>,
    target: Option<Model>,
    loaded: bool,
}

impl EmbedsOne {
    pub fn new(reflection: Arc<Reflection>) -> Self {
        Self {
            reflection,
            target: None,
            loaded: false,
        }
    }

    pub fn reflection(&self) -> &Arc<Reflection> {
        &self.reflection
    }

    /// Check if the target has been loaded or assigned
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Materialize the target from the owner's raw storage unless already loaded
    pub fn load(&mut self, attributes: &AttributeMap) -> ModelResult<()> {
        if self.loaded {
            return Ok(());
        }
        self.target = materialize_one(&self.reflection, attributes.get(self.reflection.name()))?;
        self.loaded = true;
        trace!(
            owner = %self.reflection.owner(),
            association = %self.reflection.name(),
            present = self.target.is_some(),
            "Loaded embedded object"
        );
        Ok(())
    }

    /// Load if needed and borrow the target
    pub fn reader(&mut self, attributes: &AttributeMap) -> ModelResult<Option<&Model>> {
        self.load(attributes)?;
        Ok(self.target.as_ref())
    }

    /// Load if needed and borrow the target mutably
    pub fn reader_mut(&mut self, attributes: &AttributeMap) -> ModelResult<Option<&mut Model>> {
        self.load(attributes)?;
        Ok(self.target.as_mut())
    }

    /// Current working copy, without loading
    pub fn target(&self) -> Option<&Model> {
        self.target.as_ref()
    }

    pub fn target_mut(&mut self) -> Option<&mut Model> {
        self.target.as_mut()
    }

    /// Assign the target directly; raw storage is untouched until save
    pub fn replace(&mut self, target: Option<Model>) -> ModelResult<()> {
        if let Some(model) = &target {
            check_kind(&self.reflection, model)?;
        }
        self.target = target;
        self.loaded = true;
        Ok(())
    }

    /// Build a fresh target from the given attributes, replacing any existing one
    pub fn build(&mut self, attributes: AttributeMap) -> ModelResult<&mut Model> {
        let class = self.reflection.target_class()?;
        let model = Model::from_attributes(&class, attributes);
        self.loaded = true;
        debug!(
            owner = %self.reflection.owner(),
            association = %self.reflection.name(),
            "Built embedded object"
        );
        Ok(self.target.insert(model))
    }

    /// Forget the working copy; the next read loads from raw storage again
    pub fn reset(&mut self) {
        self.target = None;
        self.loaded = false;
    }

    /// Validate the target and write its storage hash (or null) to the owner
    pub fn save(&mut self, attributes: &mut AttributeMap) -> ModelResult<()> {
        self.load(attributes)?;
        let value = match self.target.as_mut() {
            Some(target) => serialize_target(&self.reflection, target, None)?,
            None => Value::Null,
        };
        attributes.insert(self.reflection.name().to_string(), value);
        debug!(
            owner = %self.reflection.owner(),
            association = %self.reflection.name(),
            "Saved embedded object"
        );
        Ok(())
    }
}
