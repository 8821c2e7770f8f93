//! Structural equality of models and their embedded graphs
//!
//! Models whose class declares an identity key compare by that key alone.
//! Otherwise two models are equal when they share a class, their declared
//! attributes match, and every association holds equal targets. An
//! association that has not been loaded yet is materialized from raw storage
//! for the comparison, so "unloaded" and "loaded from empty storage" compare
//! the same.

use std::borrow::Cow;

use serde_json::Value;

use crate::associations::manager::Association;
use crate::associations::reflection::{Cardinality, Reflection};
use crate::associations::{materialize_many, materialize_one};
use crate::model::{IdentityKey, Model};

/// Targets of one association as seen by the comparison
enum Targets<'a> {
    One(Option<Cow<'a, Model>>),
    Many(Cow<'a, [Model]>),
    /// Raw storage, when the target class cannot be resolved
    Raw(Option<&'a Value>),
}

/// Compare two models structurally, or by identity key when available
pub fn models_equal(a: &Model, b: &Model) -> bool {
    if let Some(key) = a.class().identity_key() {
        if let Some(identity) = a.read_attribute(&key.attribute) {
            if IdentityKey::is_valid(identity) {
                return a.class().id() == b.class().id()
                    && b.read_attribute(&key.attribute) == Some(identity);
            }
        }
    }

    if a.class().id() != b.class().id() {
        return false;
    }

    let class = a.class();
    let attributes_equal = class.attributes().iter().all(|definition| {
        attribute(a, &definition.name) == attribute(b, &definition.name)
    });
    if !attributes_equal {
        return false;
    }

    class
        .reflections()
        .iter()
        .enumerate()
        .all(|(index, reflection)| targets_equal(targets(a, index, reflection), targets(b, index, reflection)))
}

fn attribute<'a>(model: &'a Model, name: &str) -> &'a Value {
    model.read_attribute(name).unwrap_or(&Value::Null)
}

fn targets<'a>(owner: &'a Model, index: usize, reflection: &Reflection) -> Targets<'a> {
    match owner.associations.get(index) {
        Some(Association::One(one)) if one.is_loaded() => {
            return Targets::One(one.target().map(Cow::Borrowed));
        }
        Some(Association::Many(many)) if many.is_loaded() => {
            return Targets::Many(Cow::Borrowed(many.target()));
        }
        _ => {}
    }

    let raw = owner.read_attribute(reflection.name());
    let materialized = match reflection.cardinality() {
        Cardinality::Single => materialize_one(reflection, raw).map(|t| Targets::One(t.map(Cow::Owned))),
        Cardinality::Many => materialize_many(reflection, raw).map(|t| Targets::Many(Cow::Owned(t))),
    };
    materialized.unwrap_or(Targets::Raw(raw))
}

fn targets_equal(a: Targets<'_>, b: Targets<'_>) -> bool {
    match (a, b) {
        (Targets::One(None), Targets::One(None)) => true,
        (Targets::One(Some(a)), Targets::One(Some(b))) => models_equal(&a, &b),
        (Targets::Many(a), Targets::Many(b)) => {
            a.len() == b.len() && a.iter().zip(b.iter()).all(|(a, b)| models_equal(a, b))
        }
        (Targets::Raw(a), Targets::Raw(b)) => {
            a.unwrap_or(&Value::Null) == b.unwrap_or(&Value::Null)
        }
        _ => false,
    }
}

impl PartialEq for Model {
    fn eq(&self, other: &Self) -> bool {
        models_equal(self, other)
    }
}
