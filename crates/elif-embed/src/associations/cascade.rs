//! Save Cascade - Saves every association of an owner in declaration order
//!
//! The cascade is fail-fast and best-effort: the first association that
//! fails to save aborts the walk, associations saved before it stay written,
//! and nothing is rolled back.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::ModelResult;
use crate::model::Model;

/// Associations written by a successful cascade, in the order they were saved
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveSummary {
    pub saved: Vec<String>,
}

impl SaveSummary {
    pub fn len(&self) -> usize {
        self.saved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.saved.is_empty()
    }
}

/// Validate and serialize every association of `owner` into its raw storage
pub fn save_associations(owner: &mut Model) -> ModelResult<SaveSummary> {
    let class = Arc::clone(&owner.class);
    let mut summary = SaveSummary::default();

    for (index, reflection) in class.reflections().iter().enumerate() {
        let association = owner.associations.slot(index, reflection);
        if let Err(err) = association.save(&mut owner.attributes) {
            warn!(
                owner = %class,
                association = %reflection.name(),
                saved = ?summary.saved,
                "Association save cascade aborted: {}",
                err
            );
            return Err(err);
        }
        summary.saved.push(reflection.name().to_string());
    }

    debug!(owner = %class, saved = summary.len(), "Saved associations");
    Ok(summary)
}

impl Model {
    /// Save every association into raw storage, stopping at the first failure
    pub fn save_associations(&mut self) -> ModelResult<SaveSummary> {
        save_associations(self)
    }
}
