//! # elif-embed: Embedded Document Associations for elif.rs
//!
//! Declares model classes with embedded `embeds_one` / `embeds_many`
//! associations whose targets live inline in the owner's raw attribute
//! storage as plain JSON.
//!
//! This crate provides the class registry and reflections (with lazy,
//! forward-referencing target resolution and nested anonymous classes),
//! per-instance association runtimes, the fail-fast save cascade, and
//! structural model equality.

pub mod error;
pub mod config;
pub mod naming;
pub mod model;
pub mod associations;
pub mod equality;

// Re-export core types
pub use error::{ModelError, ModelResult};
pub use config::EmbedConfig;
pub use naming::NamingConvention;
pub use model::{
    global_registry, AttributeDefinition, AttributeMap, ClassBody, ClassBuilder, ClassRegistry,
    IdentityKey, Model, ModelClass, Validation, ValidationFailure,
};
pub use associations::{
    save_associations, Association, Cardinality, EmbedOptions, EmbedsMany, EmbedsOne, Reflection,
    ResolutionError, SaveSummary,
};
pub use equality::models_equal;
