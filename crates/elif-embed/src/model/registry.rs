//! Class Registry - Name to class lookup used to resolve association targets
//!
//! Registration is append-only: a name can be bound once and lookups are pure
//! reads afterwards. The process-wide registry lives for the whole program;
//! separate registries can be created to keep test fixtures isolated.

use std::fmt;
use std::sync::{Arc, OnceLock, Weak};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::{trace, warn};

use crate::config::EmbedConfig;
use crate::error::{ModelError, ModelResult};
use super::class::{ClassBuilder, ModelClass};

struct RegistryInner {
    classes: DashMap<String, Arc<ModelClass>>,
    config: EmbedConfig,
}

/// Thread-safe handle to a class namespace
#[derive(Clone)]
pub struct ClassRegistry {
    inner: Arc<RegistryInner>,
}

impl Default for ClassRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassRegistry {
    /// Create a new empty registry with the default naming convention
    pub fn new() -> Self {
        Self::with_config(EmbedConfig::default())
    }

    pub fn with_config(config: EmbedConfig) -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                classes: DashMap::new(),
                config,
            }),
        }
    }

    pub fn config(&self) -> &EmbedConfig {
        &self.inner.config
    }

    /// Start defining a named class
    pub fn model(&self, name: impl Into<String>) -> ClassBuilder {
        ClassBuilder::new(self.clone(), Some(name.into()))
    }

    /// Start defining an anonymous class, which is never registered
    pub fn anonymous(&self) -> ClassBuilder {
        ClassBuilder::new(self.clone(), None)
    }

    /// Bind a named class; a name can only be bound once
    pub fn register(&self, class: Arc<ModelClass>) -> ModelResult<()> {
        let name = class.name().ok_or_else(|| {
            ModelError::Configuration(format!("Anonymous class {} cannot be registered", class))
        })?;

        match self.inner.classes.entry(name.to_string()) {
            Entry::Occupied(_) => {
                warn!(class = name, "Rejected duplicate model class registration");
                Err(ModelError::Configuration(format!(
                    "Model class '{}' is already defined",
                    name
                )))
            }
            Entry::Vacant(entry) => {
                trace!(class = name, "Registered model class");
                entry.insert(class);
                Ok(())
            }
        }
    }

    pub fn lookup(&self, name: &str) -> Option<Arc<ModelClass>> {
        self.inner.classes.get(name).map(|entry| Arc::clone(entry.value()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner.classes.contains_key(name)
    }

    /// Registered class names, sorted
    pub fn class_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.inner.classes.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.inner.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.classes.is_empty()
    }

    pub(crate) fn downgrade(&self) -> WeakRegistry {
        WeakRegistry(Arc::downgrade(&self.inner))
    }
}

impl fmt::Debug for ClassRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassRegistry")
            .field("classes", &self.class_names())
            .field("config", &self.inner.config)
            .finish()
    }
}

/// Non-owning registry handle kept by reflections
#[derive(Clone)]
pub(crate) struct WeakRegistry(Weak<RegistryInner>);

impl WeakRegistry {
    pub(crate) fn upgrade(&self) -> Option<ClassRegistry> {
        self.0.upgrade().map(|inner| ClassRegistry { inner })
    }
}

/// Global registry instance for the application
static GLOBAL_REGISTRY: OnceLock<ClassRegistry> = OnceLock::new();

/// Get the global class registry, configured from the environment on first use
pub fn global_registry() -> &'static ClassRegistry {
    GLOBAL_REGISTRY.get_or_init(|| {
        let config = EmbedConfig::from_env().unwrap_or_else(|e| {
            warn!("Falling back to default embedding config: {}", e);
            EmbedConfig::default()
        });
        ClassRegistry::with_config(config)
    })
}
