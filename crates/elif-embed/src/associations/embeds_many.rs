//! EmbedsMany - An ordered collection of embedded objects stored inline

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, trace};

use crate::error::ModelResult;
use crate::model::{AttributeMap, Model};

use super::reflection::Reflection;
use super::{check_kind, materialize_many, serialize_target};

/// Runtime of one `embeds_many` association on one owner instance
#[derive(Debug, Clone)]
pub struct EmbedsMany {
    reflection: Arc<Reflection>,
    target: Vec<Model>,
    loaded: bool,
}

impl EmbedsMany {
    pub fn new(reflection: Arc<Reflection>) -> Self {
        Self {
            reflection,
            target: Vec::new(),
            loaded: false,
        }
    }

    pub fn reflection(&self) -> &Arc<Reflection> {
        &self.reflection
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Materialize the collection from the owner's raw storage unless already loaded
    pub fn load(&mut self, attributes: &AttributeMap) -> ModelResult<()> {
        if self.loaded {
            return Ok(());
        }
        self.target = materialize_many(&self.reflection, attributes.get(self.reflection.name()))?;
        self.loaded = true;
        trace!(
            owner = %self.reflection.owner(),
            association = %self.reflection.name(),
            count = self.target.len(),
            "Loaded embedded collection"
        );
        Ok(())
    }

    /// Load if needed and borrow the collection
    pub fn reader(&mut self, attributes: &AttributeMap) -> ModelResult<&[Model]> {
        self.load(attributes)?;
        Ok(&self.target)
    }

    /// Load if needed and borrow the elements mutably
    pub fn reader_mut(&mut self, attributes: &AttributeMap) -> ModelResult<&mut [Model]> {
        self.load(attributes)?;
        Ok(&mut self.target)
    }

    /// Current working copy, without loading
    pub fn target(&self) -> &[Model] {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut [Model] {
        &mut self.target
    }

    pub fn len(&self) -> usize {
        self.target.len()
    }

    pub fn is_empty(&self) -> bool {
        self.target.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Model> {
        self.target.iter()
    }

    /// Append an object after loading the stored elements
    pub fn push(&mut self, attributes: &AttributeMap, model: Model) -> ModelResult<()> {
        check_kind(&self.reflection, &model)?;
        self.load(attributes)?;
        self.target.push(model);
        Ok(())
    }

    /// Remove the element at `index`, if any
    pub fn remove(&mut self, attributes: &AttributeMap, index: usize) -> ModelResult<Option<Model>> {
        self.load(attributes)?;
        if index < self.target.len() {
            Ok(Some(self.target.remove(index)))
        } else {
            Ok(None)
        }
    }

    /// Replace the whole collection; raw storage is untouched until save
    pub fn replace(&mut self, targets: Vec<Model>) -> ModelResult<()> {
        for model in &targets {
            check_kind(&self.reflection, model)?;
        }
        self.target = targets;
        self.loaded = true;
        Ok(())
    }

    pub fn clear(&mut self) {
        self.target.clear();
        self.loaded = true;
    }

    /// Append a freshly built object
    ///
    /// `extra` may carry keys the target class does not declare (a back
    /// reference, say); they are kept on the built object but not persisted.
    pub fn build(&mut self, attributes: &AttributeMap, extra: AttributeMap) -> ModelResult<&mut Model> {
        let class = self.reflection.target_class()?;
        self.load(attributes)?;
        self.target.push(Model::from_attributes(&class, extra));
        debug!(
            owner = %self.reflection.owner(),
            association = %self.reflection.name(),
            count = self.target.len(),
            "Built embedded collection element"
        );
        let last = self.target.len() - 1;
        Ok(&mut self.target[last])
    }

    pub fn reset(&mut self) {
        self.target.clear();
        self.loaded = false;
    }

    /// Validate every element in order and write the whole collection
    ///
    /// Stops at the first invalid element; nothing is written in that case.
    pub fn save(&mut self, attributes: &mut AttributeMap) -> ModelResult<()> {
        self.load(attributes)?;
        let mut serialized = Vec::with_capacity(self.target.len());
        for (index, target) in self.target.iter_mut().enumerate() {
            serialized.push(serialize_target(&self.reflection, target, Some(index))?);
        }
        let count = serialized.len();
        attributes.insert(self.reflection.name().to_string(), Value::Array(serialized));
        debug!(
            owner = %self.reflection.owner(),
            association = %self.reflection.name(),
            count,
            "Saved embedded collection"
        );
        Ok(())
    }
}

impl<'a> IntoIterator for &'a EmbedsMany {
    type Item = &'a Model;
    type IntoIter = std::slice::Iter<'a, Model>;

    fn into_iter(self) -> Self::IntoIter {
        self.target.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::associations::EmbedOptions;
    use crate::error::ModelError;
    use crate::model::{ClassRegistry, ModelClass};
    use serde_json::json;

    fn classes() -> (ClassRegistry, Arc<ModelClass>, Arc<ModelClass>) {
        let registry = ClassRegistry::new();
        let project = registry
            .model("Project")
            .attribute("title")
            .validates_presence_of("title")
            .build()
            .unwrap();
        let user = registry
            .model("User")
            .embeds_many("projects", EmbedOptions::new())
            .build()
            .unwrap();
        (registry, user, project)
    }

    fn runtime(user: &Arc<ModelClass>) -> EmbedsMany {
        EmbedsMany::new(Arc::clone(user.reflect_on_association("projects").unwrap()))
    }

    fn map(value: serde_json::Value) -> AttributeMap {
        value.as_object().cloned().unwrap()
    }

    fn project(class: &Arc<ModelClass>, title: &str) -> Model {
        Model::from_value(class, json!({"title": title})).unwrap()
    }

    #[test]
    fn test_unset_collection_is_empty() {
        let (_registry, user, _project) = classes();
        let mut many = runtime(&user);

        assert!(many.reader(&map(json!({"projects": null}))).unwrap().is_empty());
        assert!(many.is_loaded());
    }

    #[test]
    fn test_load_preserves_order() {
        let (_registry, user, _project) = classes();
        let mut many = runtime(&user);
        let attributes = map(json!({"projects": [{"title": "First"}, {"title": "Second"}]}));

        let titles: Vec<&serde_json::Value> = many
            .reader(&attributes)
            .unwrap()
            .iter()
            .map(|p| p.read_attribute("title").unwrap())
            .collect();
        assert_eq!(titles, vec![&json!("First"), &json!("Second")]);
    }

    #[test]
    fn test_load_rejects_scalar_elements() {
        let (_registry, user, _project) = classes();
        let mut many = runtime(&user);

        let result = many.load(&map(json!({"projects": [{"title": "First"}, 3]})));
        assert!(matches!(result, Err(ModelError::Serialization(_))));
    }

    #[test]
    fn test_push_loads_stored_elements_first() {
        let (_registry, user, project_class) = classes();
        let mut many = runtime(&user);
        let attributes = map(json!({"projects": [{"title": "Stored"}]}));

        many.push(&attributes, project(&project_class, "Pushed")).unwrap();
        assert_eq!(many.len(), 2);
        assert_eq!(many.target()[1].read_attribute("title"), Some(&json!("Pushed")));
    }

    #[test]
    fn test_push_checks_kind() {
        let (registry, user, _project) = classes();
        let mut many = runtime(&user);
        let other = registry.model("Other").build().unwrap();

        let result = many.push(&AttributeMap::new(), Model::new(&other));
        assert!(matches!(result, Err(ModelError::IncorrectEntity { .. })));
        assert!(many.is_empty());
    }

    #[test]
    fn test_remove_and_clear() {
        let (_registry, user, project_class) = classes();
        let mut many = runtime(&user);
        let attributes = AttributeMap::new();

        many.replace(vec![project(&project_class, "A"), project(&project_class, "B")]).unwrap();
        let removed = many.remove(&attributes, 0).unwrap().unwrap();
        assert_eq!(removed.read_attribute("title"), Some(&json!("A")));
        assert!(many.remove(&attributes, 5).unwrap().is_none());

        many.clear();
        assert!(many.is_empty());
        assert!(many.is_loaded());
    }

    #[test]
    fn test_build_keeps_pass_through_attributes_out_of_storage() {
        let (_registry, user, _project) = classes();
        let mut many = runtime(&user);
        let mut attributes = map(json!({"projects": null}));

        let built = many
            .build(&attributes, map(json!({"title": "Built", "author": "user-1"})))
            .unwrap();
        assert_eq!(built.read_attribute("author"), Some(&json!("user-1")));

        many.save(&mut attributes).unwrap();
        assert_eq!(attributes.get("projects"), Some(&json!([{"title": "Built"}])));
    }

    #[test]
    fn test_save_is_all_or_nothing() {
        let (_registry, user, project_class) = classes();
        let mut many = runtime(&user);
        let mut attributes = map(json!({"projects": [{"title": "Stored"}]}));

        many.replace(vec![project(&project_class, "Valid"), Model::new(&project_class)])
            .unwrap();
        let err = many.save(&mut attributes).unwrap_err();
        match err {
            ModelError::AssociationNotSaved { owner, association, reason } => {
                assert_eq!(owner, "User");
                assert_eq!(association, "projects");
                assert!(reason.starts_with("element 1 is invalid"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(attributes.get("projects"), Some(&json!([{"title": "Stored"}])));
    }

    #[test]
    fn test_save_empty_collection() {
        let (_registry, user, _project) = classes();
        let mut many = runtime(&user);
        let mut attributes = map(json!({"projects": null}));

        many.save(&mut attributes).unwrap();
        assert_eq!(attributes.get("projects"), Some(&json!([])));
    }
}
