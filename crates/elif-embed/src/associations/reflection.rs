//! Association Reflection - Immutable metadata for one declared association
//!
//! A reflection is created when its owner class is built and is shared by
//! every instance of that class and its subclasses. The target class is
//! resolved lazily on first use and memoized; failed resolutions are not
//! cached, so a class registered later can still be found.

use std::fmt;
use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ModelError;
use crate::model::class::{ClassBody, ModelClass};
use crate::model::registry::WeakRegistry;

/// Cardinality of an embedded association
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cardinality {
    /// One embedded object or nothing (embeds_one)
    Single,
    /// Ordered collection of embedded objects (embeds_many)
    Many,
}

impl Cardinality {
    /// Returns true if this association holds a collection
    pub fn is_collection(self) -> bool {
        matches!(self, Self::Many)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Single => "embeds_one",
            Self::Many => "embeds_many",
        }
    }
}

/// Options recognized when declaring an embedded association
#[derive(Debug, Clone, Default)]
pub struct EmbedOptions {
    /// Overrides the class name derived from the association name
    pub class_name: Option<String>,

    /// Explicit target class, which may be anonymous
    pub class: Option<Arc<ModelClass>>,

    /// Inline class body; the target becomes an anonymous subclass
    pub nested: Option<ClassBody>,
}

impl EmbedOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the target through the given class name
    pub fn class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    /// Use the given class as target
    pub fn class(mut self, class: &Arc<ModelClass>) -> Self {
        self.class = Some(Arc::clone(class));
        self
    }

    /// Define extra attributes inline
    pub fn nested(mut self, body: ClassBody) -> Self {
        self.nested = Some(body);
        self
    }
}

/// Why a target class could not be resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    ClassUndetermined { owner: String, association: String },
    SuperclassUndetermined { owner: String, association: String },
}

impl From<ResolutionError> for ModelError {
    fn from(err: ResolutionError) -> Self {
        match err {
            ResolutionError::ClassUndetermined { owner, association } => {
                ModelError::AssociationClassUndetermined { owner, association }
            }
            ResolutionError::SuperclassUndetermined { owner, association } => {
                ModelError::AssociationSuperclassUndetermined { owner, association }
            }
        }
    }
}

/// Metadata for one declared embedded association
pub struct Reflection {
    name: String,
    cardinality: Cardinality,
    options: EmbedOptions,
    owner: String,
    registry: WeakRegistry,
    target: OnceLock<Arc<ModelClass>>,
}

impl Reflection {
    pub(crate) fn new(
        name: String,
        cardinality: Cardinality,
        options: EmbedOptions,
        owner: String,
        registry: WeakRegistry,
    ) -> Self {
        Self {
            name,
            cardinality,
            options,
            owner,
            registry,
            target: OnceLock::new(),
        }
    }

    /// Association name, also the raw attribute it is stored under
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cardinality(&self) -> Cardinality {
        self.cardinality
    }

    pub fn options(&self) -> &EmbedOptions {
        &self.options
    }

    /// Display name of the declaring class
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Returns true once the target class has been resolved
    pub fn is_resolved(&self) -> bool {
        self.target.get().is_some()
    }

    /// Name the target class is looked up under
    pub fn class_name(&self) -> String {
        if let Some(class_name) = &self.options.class_name {
            return class_name.clone();
        }
        if let Some(class) = &self.options.class {
            return class.to_string();
        }
        let naming = self
            .registry
            .upgrade()
            .map(|registry| registry.config().naming.clone())
            .unwrap_or_default();
        naming.class_name_for(&self.name)
    }

    /// Resolved target class, converting failures into a `ModelError`
    pub fn target_class(&self) -> Result<Arc<ModelClass>, ModelError> {
        self.resolve().map_err(ModelError::from)
    }

    /// Resolve and memoize the target class
    pub fn resolve(&self) -> Result<Arc<ModelClass>, ResolutionError> {
        if let Some(class) = self.target.get() {
            return Ok(Arc::clone(class));
        }

        let resolved = match &self.options.nested {
            None => {
                let located = self.locate().ok_or_else(|| self.class_undetermined())?;
                // An anonymous target needs a named ancestor to be addressable
                if located.named_ancestor().is_none() {
                    return Err(self.superclass_undetermined());
                }
                located
            }
            Some(body) => {
                let superclass = self.nested_superclass()?;
                ModelClass::anonymous_from_body(superclass, body, &self.registry)
            }
        };

        debug!(
            owner = %self.owner,
            association = %self.name,
            target = %resolved,
            "Resolved embedded association target"
        );

        // Another thread may have won the race; keep the first stored class.
        Ok(Arc::clone(self.target.get_or_init(|| resolved)))
    }

    /// Find the class the options point at, without nested-body handling
    fn locate(&self) -> Option<Arc<ModelClass>> {
        if let Some(class) = &self.options.class {
            return Some(Arc::clone(class));
        }
        let registry = self.registry.upgrade()?;
        registry.lookup(&self.class_name())
    }

    fn nested_superclass(&self) -> Result<Option<Arc<ModelClass>>, ResolutionError> {
        let explicit = self.options.class_name.is_some() || self.options.class.is_some();
        match self.locate() {
            Some(located) => located
                .named_ancestor()
                .map(Some)
                .ok_or_else(|| self.superclass_undetermined()),
            None if explicit => Err(self.superclass_undetermined()),
            None => Ok(None),
        }
    }

    fn class_undetermined(&self) -> ResolutionError {
        ResolutionError::ClassUndetermined {
            owner: self.owner.clone(),
            association: self.name.clone(),
        }
    }

    fn superclass_undetermined(&self) -> ResolutionError {
        ResolutionError::SuperclassUndetermined {
            owner: self.owner.clone(),
            association: self.name.clone(),
        }
    }
}

impl fmt::Debug for Reflection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reflection")
            .field("name", &self.name)
            .field("cardinality", &self.cardinality)
            .field("owner", &self.owner)
            .field("class_name", &self.options.class_name)
            .field("resolved", &self.is_resolved())
            .finish()
    }
}
