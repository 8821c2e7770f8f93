//! Model Class Descriptors - Immutable runtime descriptions of model classes
//!
//! A class carries its declared attributes, validations, optional identity
//! key and association reflections. Classes are assembled once through a
//! `ClassBuilder` and never mutated afterwards; subclasses see everything
//! their ancestors declared.

use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::associations::reflection::{Cardinality, EmbedOptions, Reflection};
use crate::error::{ModelError, ModelResult};
use super::attributes::{AttributeDefinition, Validation};
use super::identity::IdentityKey;
use super::registry::{ClassRegistry, WeakRegistry};

static NEXT_CLASS_ID: AtomicU64 = AtomicU64::new(1);

fn next_class_id() -> u64 {
    NEXT_CLASS_ID.fetch_add(1, Ordering::Relaxed)
}

/// One `embeds_one`/`embeds_many` declaration inside a class body
#[derive(Debug, Clone)]
pub struct AssociationDeclaration {
    pub name: String,
    pub cardinality: Cardinality,
    pub options: EmbedOptions,
}

/// Declarations making up a class body
#[derive(Debug, Clone, Default)]
pub struct ClassBody {
    pub attributes: Vec<AttributeDefinition>,
    pub validations: Vec<Validation>,
    pub associations: Vec<AssociationDeclaration>,
}

impl ClassBody {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare an attribute defaulting to null
    pub fn attribute(mut self, name: impl Into<String>) -> Self {
        self.attributes.push(AttributeDefinition::new(name));
        self
    }

    /// Declare an attribute with a default value
    pub fn attribute_with_default(mut self, name: impl Into<String>, default: Value) -> Self {
        self.attributes.push(AttributeDefinition::with_default(name, default));
        self
    }

    /// Require an attribute to be present for the instance to be valid
    pub fn validates_presence_of(mut self, name: impl Into<String>) -> Self {
        self.validations.push(Validation::Presence(name.into()));
        self
    }

    /// Declare a single embedded object
    pub fn embeds_one(self, name: impl Into<String>, options: EmbedOptions) -> Self {
        self.embed(name.into(), Cardinality::Single, options)
    }

    /// Declare an ordered collection of embedded objects
    pub fn embeds_many(self, name: impl Into<String>, options: EmbedOptions) -> Self {
        self.embed(name.into(), Cardinality::Many, options)
    }

    fn embed(mut self, name: String, cardinality: Cardinality, options: EmbedOptions) -> Self {
        self.associations.push(AssociationDeclaration {
            name,
            cardinality,
            options,
        });
        self
    }

    /// Association names must be unique within one body, nested bodies included
    pub fn validate(&self, owner: &str) -> ModelResult<()> {
        let mut seen = HashSet::new();
        for declaration in &self.associations {
            if !seen.insert(declaration.name.as_str()) {
                return Err(ModelError::Configuration(format!(
                    "Association '{}' is declared twice in '{}'",
                    declaration.name, owner
                )));
            }
            if let Some(nested) = &declaration.options.nested {
                nested.validate(&format!("{}#{}", owner, declaration.name))?;
            }
        }
        Ok(())
    }
}

/// Immutable descriptor of a model class
pub struct ModelClass {
    id: u64,
    name: Option<String>,
    superclass: Option<Arc<ModelClass>>,
    attributes: Vec<AttributeDefinition>,
    validations: Vec<Validation>,
    identity_key: Option<IdentityKey>,
    reflections: Vec<Arc<Reflection>>,
}

impl ModelClass {
    fn assemble(
        id: u64,
        name: Option<String>,
        superclass: Option<Arc<ModelClass>>,
        identity_key: Option<IdentityKey>,
        body: &ClassBody,
        registry: &WeakRegistry,
    ) -> Self {
        let display = display_name(id, name.as_deref());

        let mut attributes = superclass
            .as_ref()
            .map(|parent| parent.attributes.clone())
            .unwrap_or_default();
        let mut validations = superclass
            .as_ref()
            .map(|parent| parent.validations.clone())
            .unwrap_or_default();
        let mut reflections = superclass
            .as_ref()
            .map(|parent| parent.reflections.clone())
            .unwrap_or_default();
        let identity_key = identity_key
            .or_else(|| superclass.as_ref().and_then(|parent| parent.identity_key.clone()));

        let mut own_attributes = body.attributes.clone();
        if let Some(key) = &identity_key {
            if !own_attributes.iter().any(|a| a.name == key.attribute)
                && !attributes.iter().any(|a| a.name == key.attribute)
            {
                own_attributes.insert(0, AttributeDefinition::new(key.attribute.clone()));
            }
        }
        for attribute in own_attributes {
            match attributes.iter_mut().find(|a| a.name == attribute.name) {
                Some(existing) => *existing = attribute,
                None => attributes.push(attribute),
            }
        }
        validations.extend(body.validations.iter().cloned());

        for declaration in &body.associations {
            let reflection = Arc::new(Reflection::new(
                declaration.name.clone(),
                declaration.cardinality,
                declaration.options.clone(),
                display.clone(),
                registry.clone(),
            ));
            // A redeclared name shadows the inherited one in place
            match reflections.iter_mut().find(|r| r.name() == declaration.name) {
                Some(existing) => *existing = reflection,
                None => reflections.push(reflection),
            }
        }

        Self {
            id,
            name,
            superclass,
            attributes,
            validations,
            identity_key,
            reflections,
        }
    }

    /// Build the anonymous class produced by a nested association body
    pub(crate) fn anonymous_from_body(
        superclass: Option<Arc<ModelClass>>,
        body: &ClassBody,
        registry: &WeakRegistry,
    ) -> Arc<ModelClass> {
        Arc::new(Self::assemble(next_class_id(), None, superclass, None, body, registry))
    }

    /// Unique id of this class within the process
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Stable name, `None` for anonymous classes
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn is_anonymous(&self) -> bool {
        self.name.is_none()
    }

    pub fn superclass(&self) -> Option<&Arc<ModelClass>> {
        self.superclass.as_ref()
    }

    /// This class followed by its superclass chain
    pub fn ancestors(&self) -> Ancestors<'_> {
        Ancestors { next: Some(self) }
    }

    /// First class in the ancestor chain (self included) with a stable name
    pub fn named_ancestor(self: &Arc<Self>) -> Option<Arc<ModelClass>> {
        if self.name.is_some() {
            return Some(Arc::clone(self));
        }
        let mut current = self.superclass.as_ref();
        while let Some(class) = current {
            if class.name.is_some() {
                return Some(Arc::clone(class));
            }
            current = class.superclass.as_ref();
        }
        None
    }

    /// Returns true if `other` is this class or one of its ancestors
    pub fn is_kind_of(&self, other: &ModelClass) -> bool {
        self.ancestors().any(|class| class.id == other.id)
    }

    /// Declared attributes, inherited first
    pub fn attributes(&self) -> &[AttributeDefinition] {
        &self.attributes
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.iter().any(|a| a.name == name)
    }

    pub fn validations(&self) -> &[Validation] {
        &self.validations
    }

    pub fn identity_key(&self) -> Option<&IdentityKey> {
        self.identity_key.as_ref()
    }

    /// All reflections in declaration order, inherited first
    pub fn reflections(&self) -> &[Arc<Reflection>] {
        &self.reflections
    }

    /// Reflection for an association name, `None` if undeclared
    pub fn reflect_on_association(&self, name: &str) -> Option<&Arc<Reflection>> {
        self.reflections.iter().find(|r| r.name() == name)
    }

    /// Position of an association in `reflections()`
    pub fn association_index(&self, name: &str) -> Option<usize> {
        self.reflections.iter().position(|r| r.name() == name)
    }

    pub fn association_names(&self) -> Vec<&str> {
        self.reflections.iter().map(|r| r.name()).collect()
    }
}

impl fmt::Display for ModelClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&display_name(self.id, self.name.as_deref()))
    }
}

impl fmt::Debug for ModelClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelClass")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("superclass", &self.superclass.as_ref().map(|s| s.to_string()))
            .field("associations", &self.association_names())
            .finish()
    }
}

fn display_name(id: u64, name: Option<&str>) -> String {
    match name {
        Some(name) => name.to_string(),
        None => format!("#<Class:{}>", id),
    }
}

/// Iterator over a class and its superclasses
pub struct Ancestors<'a> {
    next: Option<&'a ModelClass>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a ModelClass;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.superclass.as_deref();
        Some(current)
    }
}

/// Builder assembling a class body into an immutable `ModelClass`
pub struct ClassBuilder {
    registry: ClassRegistry,
    name: Option<String>,
    superclass: Option<Arc<ModelClass>>,
    identity_key: Option<IdentityKey>,
    body: ClassBody,
}

impl ClassBuilder {
    pub(crate) fn new(registry: ClassRegistry, name: Option<String>) -> Self {
        Self {
            registry,
            name,
            superclass: None,
            identity_key: None,
            body: ClassBody::new(),
        }
    }

    pub fn superclass(mut self, superclass: &Arc<ModelClass>) -> Self {
        self.superclass = Some(Arc::clone(superclass));
        self
    }

    pub fn attribute(mut self, name: impl Into<String>) -> Self {
        self.body = self.body.attribute(name);
        self
    }

    pub fn attribute_with_default(mut self, name: impl Into<String>, default: Value) -> Self {
        self.body = self.body.attribute_with_default(name, default);
        self
    }

    pub fn validates_presence_of(mut self, name: impl Into<String>) -> Self {
        self.body = self.body.validates_presence_of(name);
        self
    }

    /// Compare instances by this attribute alone; keys are generated on construction
    pub fn identity_key(mut self, attribute: impl Into<String>) -> Self {
        self.identity_key = Some(IdentityKey::new(attribute));
        self
    }

    pub fn embeds_one(mut self, name: impl Into<String>, options: EmbedOptions) -> Self {
        self.body = self.body.embeds_one(name, options);
        self
    }

    pub fn embeds_many(mut self, name: impl Into<String>, options: EmbedOptions) -> Self {
        self.body = self.body.embeds_many(name, options);
        self
    }

    /// Finish the class, registering it when it has a name
    pub fn build(self) -> ModelResult<Arc<ModelClass>> {
        let id = next_class_id();
        let display = display_name(id, self.name.as_deref());
        self.body.validate(&display)?;

        if let Some(name) = &self.name {
            if self.registry.contains(name) {
                return Err(ModelError::Configuration(format!(
                    "Model class '{}' is already defined",
                    name
                )));
            }
        }

        let class = Arc::new(ModelClass::assemble(
            id,
            self.name,
            self.superclass,
            self.identity_key,
            &self.body,
            &self.registry.downgrade(),
        ));

        if class.name.is_some() {
            self.registry.register(Arc::clone(&class))?;
        }

        debug!(
            class = %class,
            associations = ?class.association_names(),
            "Defined model class"
        );

        Ok(class)
    }
}
