//! Host-side model registry.

use crate::error::RegistryError;
use crate::model::Model;
use crate::plugin::ModelPlugin;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Registry of the models available to the host.
///
/// # For Hosts
///
/// Install each provider plugin once at startup with [`install()`](Self::install),
/// then look models up by ID with [`model()`](Self::model). Models keep the order in
/// which plugins registered them.
///
/// # For Provider Plugin Authors
///
/// Implement [`ModelPlugin`] and call the `register` callback once per model. The
/// registry stages everything a plugin registers and only keeps it if the plugin
/// returns `Ok` and every ID is new, so a failed discovery leaves the registry
/// untouched.
#[derive(Default)]
pub struct ModelRegistry {
    // Registration order.
    models: Vec<Arc<dyn Model>>,
    // Maps model IDs to positions in `models`.
    index: HashMap<String, usize>,
}

impl core::fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ModelRegistry")
            .field("models", &self.model_ids())
            .finish()
    }
}

impl ModelRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            models: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Runs a plugin's registration hook and keeps the models it registers.
    ///
    /// Returns the number of models registered. Either every model the plugin
    /// registers is kept or none is.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::Plugin`] if the plugin's hook fails.
    /// - [`RegistryError::DuplicateModel`] if the plugin registers an ID twice or
    ///   an ID that is already registered.
    pub async fn install<P: ModelPlugin + ?Sized>(
        &mut self,
        plugin: &P,
    ) -> Result<usize, RegistryError> {
        let mut staged: Vec<Arc<dyn Model>> = Vec::new();
        plugin
            .register_models(&mut |model| staged.push(model))
            .await
            .map_err(|source| RegistryError::Plugin {
                plugin: plugin.name().to_string(),
                source,
            })?;

        {
            let mut seen = HashSet::new();
            for model in &staged {
                let id = model.model_id();
                if self.index.contains_key(id) || !seen.insert(id) {
                    return Err(RegistryError::DuplicateModel(id.to_string()));
                }
            }
        }

        let count = staged.len();
        for model in staged {
            self.insert(model);
        }
        Ok(count)
    }

    /// Registers a model.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateModel`] if a model with the same ID is
    /// already registered.
    pub fn register(&mut self, model: Arc<dyn Model>) -> Result<(), RegistryError> {
        if self.index.contains_key(model.model_id()) {
            return Err(RegistryError::DuplicateModel(model.model_id().to_string()));
        }
        self.insert(model);
        Ok(())
    }

    fn insert(&mut self, model: Arc<dyn Model>) {
        self.index
            .insert(model.model_id().to_string(), self.models.len());
        self.models.push(model);
    }

    /// Returns a model by ID.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownModel`] if no model has this ID.
    pub fn model(&self, model_id: impl AsRef<str>) -> Result<Arc<dyn Model>, RegistryError> {
        let model_id = model_id.as_ref();
        self.index
            .get(model_id)
            .map(|&position| Arc::clone(&self.models[position]))
            .ok_or_else(|| RegistryError::UnknownModel(model_id.to_string()))
    }

    /// Checks if a model is registered.
    #[must_use]
    pub fn has_model(&self, model_id: impl AsRef<str>) -> bool {
        self.index.contains_key(model_id.as_ref())
    }

    /// Lists registered model IDs in registration order.
    #[must_use]
    pub fn model_ids(&self) -> Vec<String> {
        self.models
            .iter()
            .map(|model| model.model_id().to_string())
            .collect()
    }

    /// Iterates over registered models in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Model>> {
        self.models.iter()
    }

    /// Number of registered models.
    #[must_use]
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Returns `true` if no model is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ModelError;
    use crate::prompt::{Conversation, Prompt};
    use crate::stream::TextStream;
    use async_trait::async_trait;
    use serde_json::{Value, json};

    struct StubModel {
        id: String,
    }

    impl Model for StubModel {
        fn model_id(&self) -> &str {
            &self.id
        }

        fn options_schema(&self) -> Value {
            json!({})
        }

        fn execute(
            &self,
            _prompt: &Prompt,
            _stream: bool,
            _conversation: Option<&Conversation>,
            _key: Option<&str>,
        ) -> Result<TextStream, ModelError> {
            Ok(TextStream::empty())
        }
    }

    fn stub(id: &str) -> Arc<dyn Model> {
        Arc::new(StubModel { id: id.to_string() })
    }

    struct StubPlugin {
        ids: Vec<&'static str>,
        fail: bool,
    }

    #[async_trait]
    impl ModelPlugin for StubPlugin {
        fn name(&self) -> &str {
            "stub"
        }

        async fn register_models(
            &self,
            register: &mut (dyn FnMut(Arc<dyn Model>) + Send),
        ) -> Result<(), ModelError> {
            for id in &self.ids {
                register(stub(id));
            }
            if self.fail {
                return Err(ModelError::Http("catalog unavailable".to_string()));
            }
            Ok(())
        }
    }

    #[test]
    fn register_and_lookup() {
        let mut registry = ModelRegistry::new();
        registry.register(stub("alpha")).unwrap();

        assert!(registry.has_model("alpha"));
        assert_eq!(registry.model("alpha").unwrap().model_id(), "alpha");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn unknown_model_is_an_error() {
        let registry = ModelRegistry::new();
        let err = registry.model("missing").err().unwrap();
        assert!(matches!(err, RegistryError::UnknownModel(id) if id == "missing"));
        assert!(registry.is_empty());
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut registry = ModelRegistry::new();
        registry.register(stub("alpha")).unwrap();

        let err = registry.register(stub("alpha")).unwrap_err();

        assert!(matches!(err, RegistryError::DuplicateModel(id) if id == "alpha"));
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn duplicate_ids_in_one_plugin_register_nothing() {
        let mut registry = ModelRegistry::new();
        let plugin = StubPlugin {
            ids: vec!["a", "b", "a"],
            fail: false,
        };

        let err = registry.install(&plugin).await.unwrap_err();

        assert!(matches!(err, RegistryError::DuplicateModel(id) if id == "a"));
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn install_rejects_already_registered_ids() {
        let mut registry = ModelRegistry::new();
        registry.register(stub("b")).unwrap();
        let plugin = StubPlugin {
            ids: vec!["a", "b"],
            fail: false,
        };

        let err = registry.install(&plugin).await.unwrap_err();

        assert!(matches!(err, RegistryError::DuplicateModel(id) if id == "b"));
        assert_eq!(registry.model_ids(), ["b"]);
    }

    #[tokio::test]
    async fn install_keeps_registration_order() {
        let mut registry = ModelRegistry::new();
        let plugin = StubPlugin {
            ids: vec!["b", "a", "c"],
            fail: false,
        };

        let count = registry.install(&plugin).await.unwrap();

        assert_eq!(count, 3);
        assert_eq!(registry.model_ids(), ["b", "a", "c"]);
    }

    #[tokio::test]
    async fn failed_install_registers_nothing() {
        let mut registry = ModelRegistry::new();
        let plugin = StubPlugin {
            ids: vec!["a", "b"],
            fail: true,
        };

        let err = registry.install(&plugin).await.unwrap_err();

        assert!(matches!(
            err,
            RegistryError::Plugin { plugin, source: ModelError::Http(_) } if plugin == "stub"
        ));
        assert!(registry.is_empty());
    }
}
