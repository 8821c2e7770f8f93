//! Model System - Class descriptors, class registry and model instances
//!
//! - `attributes`: attribute definitions and validation rules
//! - `identity`: optional identity key capability
//! - `class`: immutable class descriptors and the class builder
//! - `registry`: name to class namespace used for target resolution
//! - `instance`: model instances with raw attribute storage

pub mod attributes;
pub mod class;
pub mod identity;
pub mod instance;
pub mod registry;

pub use attributes::{AttributeDefinition, AttributeMap, Validation, ValidationFailure};
pub use class::{AssociationDeclaration, ClassBody, ClassBuilder, ModelClass};
pub use identity::IdentityKey;
pub use instance::Model;
pub use registry::{global_registry, ClassRegistry};
