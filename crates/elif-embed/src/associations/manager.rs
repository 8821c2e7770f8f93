//! Association Manager - Per-instance association runtimes, created on demand
//!
//! One slot per reflection of the owner class, filled on first access and
//! kept for the lifetime of the instance.

use std::sync::Arc;

use serde_json::Value;
use tracing::trace;

use crate::error::{ModelError, ModelResult};
use crate::model::{AttributeMap, Model, ModelClass};

use super::embeds_many::EmbedsMany;
use super::embeds_one::EmbedsOne;
use super::reflection::{Cardinality, Reflection};

/// Runtime of one association on one owner instance
#[derive(Debug, Clone)]
pub enum Association {
    One(EmbedsOne),
    Many(EmbedsMany),
}

impl Association {
    pub fn new(reflection: Arc<Reflection>) -> Self {
        match reflection.cardinality() {
            Cardinality::Single => Association::One(EmbedsOne::new(reflection)),
            Cardinality::Many => Association::Many(EmbedsMany::new(reflection)),
        }
    }

    pub fn reflection(&self) -> &Arc<Reflection> {
        match self {
            Association::One(one) => one.reflection(),
            Association::Many(many) => many.reflection(),
        }
    }

    pub fn name(&self) -> &str {
        self.reflection().name()
    }

    pub fn cardinality(&self) -> Cardinality {
        self.reflection().cardinality()
    }

    pub fn is_loaded(&self) -> bool {
        match self {
            Association::One(one) => one.is_loaded(),
            Association::Many(many) => many.is_loaded(),
        }
    }

    pub fn load(&mut self, attributes: &AttributeMap) -> ModelResult<()> {
        match self {
            Association::One(one) => one.load(attributes),
            Association::Many(many) => many.load(attributes),
        }
    }

    pub fn reset(&mut self) {
        match self {
            Association::One(one) => one.reset(),
            Association::Many(many) => many.reset(),
        }
    }

    pub fn save(&mut self, attributes: &mut AttributeMap) -> ModelResult<()> {
        match self {
            Association::One(one) => one.save(attributes),
            Association::Many(many) => many.save(attributes),
        }
    }

    pub fn as_one(&self) -> ModelResult<&EmbedsOne> {
        match self {
            Association::One(one) => Ok(one),
            Association::Many(_) => Err(self.kind_mismatch("embeds_one")),
        }
    }

    pub fn as_one_mut(&mut self) -> ModelResult<&mut EmbedsOne> {
        match self {
            Association::One(one) => Ok(one),
            Association::Many(many) => Err(kind_mismatch(many.reflection(), "embeds_one")),
        }
    }

    pub fn as_many(&self) -> ModelResult<&EmbedsMany> {
        match self {
            Association::Many(many) => Ok(many),
            Association::One(_) => Err(self.kind_mismatch("embeds_many")),
        }
    }

    pub fn as_many_mut(&mut self) -> ModelResult<&mut EmbedsMany> {
        match self {
            Association::Many(many) => Ok(many),
            Association::One(one) => Err(kind_mismatch(one.reflection(), "embeds_many")),
        }
    }

    fn kind_mismatch(&self, expected: &'static str) -> ModelError {
        kind_mismatch(self.reflection(), expected)
    }
}

fn kind_mismatch(reflection: &Reflection, expected: &'static str) -> ModelError {
    ModelError::AssociationKindMismatch {
        association: format!("{}#{}", reflection.owner(), reflection.name()),
        expected,
    }
}

/// Lazily populated association runtimes of one owner instance
#[derive(Debug, Clone, Default)]
pub struct AssociationManager {
    slots: Vec<Option<Association>>,
}

impl AssociationManager {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: (0..capacity).map(|_| None).collect(),
        }
    }

    /// Runtime for a named association, created on first access
    pub fn fetch(&mut self, class: &ModelClass, name: &str) -> ModelResult<&mut Association> {
        let index = class
            .association_index(name)
            .ok_or_else(|| ModelError::UnknownAssociation {
                owner: class.to_string(),
                association: name.to_string(),
            })?;
        Ok(self.slot(index, &class.reflections()[index]))
    }

    /// Runtime at a reflection index, created on first access
    pub fn slot(&mut self, index: usize, reflection: &Arc<Reflection>) -> &mut Association {
        if self.slots.len() <= index {
            self.slots.resize_with(index + 1, || None);
        }
        self.slots[index].get_or_insert_with(|| {
            trace!(
                owner = %reflection.owner(),
                association = %reflection.name(),
                "Created association runtime"
            );
            Association::new(Arc::clone(reflection))
        })
    }

    /// Existing runtime at a reflection index, without creating one
    pub fn get(&self, index: usize) -> Option<&Association> {
        self.slots.get(index).and_then(|slot| slot.as_ref())
    }

    /// Number of runtimes created so far
    pub fn created(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }
}

impl Model {
    /// Association runtime for `name`, created on first access
    pub fn association(&mut self, name: &str) -> ModelResult<&mut Association> {
        self.associations.fetch(&self.class, name)
    }

    /// Declared association names in declaration order
    pub fn association_names(&self) -> Vec<&str> {
        self.class.association_names()
    }

    /// Load if needed and borrow an embedded object
    pub fn embedded_one(&mut self, name: &str) -> ModelResult<Option<&Model>> {
        let association = self.associations.fetch(&self.class, name)?;
        association.as_one_mut()?.reader(&self.attributes)
    }

    pub fn embedded_one_mut(&mut self, name: &str) -> ModelResult<Option<&mut Model>> {
        let association = self.associations.fetch(&self.class, name)?;
        association.as_one_mut()?.reader_mut(&self.attributes)
    }

    /// Load if needed and borrow an embedded collection
    pub fn embedded_many(&mut self, name: &str) -> ModelResult<&[Model]> {
        let association = self.associations.fetch(&self.class, name)?;
        association.as_many_mut()?.reader(&self.attributes)
    }

    pub fn embedded_many_mut(&mut self, name: &str) -> ModelResult<&mut [Model]> {
        let association = self.associations.fetch(&self.class, name)?;
        association.as_many_mut()?.reader_mut(&self.attributes)
    }

    /// Assign an embedded object (or none); raw storage changes on save
    pub fn assign_one(&mut self, name: &str, target: Option<Model>) -> ModelResult<()> {
        self.association(name)?.as_one_mut()?.replace(target)
    }

    /// Assign a whole embedded collection; raw storage changes on save
    pub fn assign_many(&mut self, name: &str, targets: Vec<Model>) -> ModelResult<()> {
        self.association(name)?.as_many_mut()?.replace(targets)
    }

    pub fn build_one(&mut self, name: &str, attributes: AttributeMap) -> ModelResult<&mut Model> {
        self.association(name)?.as_one_mut()?.build(attributes)
    }

    pub fn build_many(&mut self, name: &str, extra: AttributeMap) -> ModelResult<&mut Model> {
        let association = self.associations.fetch(&self.class, name)?;
        association.as_many_mut()?.build(&self.attributes, extra)
    }

    /// Append one object to an embedded collection
    pub fn push_embedded(&mut self, name: &str, target: Model) -> ModelResult<()> {
        let association = self.associations.fetch(&self.class, name)?;
        association.as_many_mut()?.push(&self.attributes, target)
    }

    /// Drop the working copy of an association so it reloads from raw storage
    pub fn reset_association(&mut self, name: &str) -> ModelResult<()> {
        self.association(name)?.reset();
        Ok(())
    }

    /// Materialize every declared association from raw storage
    pub fn load_associations(&mut self) -> ModelResult<()> {
        let class = Arc::clone(&self.class);
        for (index, reflection) in class.reflections().iter().enumerate() {
            self.associations.slot(index, reflection).load(&self.attributes)?;
        }
        Ok(())
    }

    /// Raw stored value of an association, as last saved or ingested
    pub fn raw_association(&self, name: &str) -> Option<&Value> {
        self.class.reflect_on_association(name)?;
        self.attributes.get(name)
    }
}
