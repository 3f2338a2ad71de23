//! Together provider plugin.

use crate::client::TogetherClient;
use crate::config::TogetherConfig;
use crate::model::TogetherModel;
use async_trait::async_trait;
use std::sync::Arc;
use together_models::{Model, ModelError, ModelPlugin};

/// Plugin registering every model in the Together catalog.
///
/// ```no_run
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// use together_models::ModelRegistry;
/// use together_provider::TogetherPlugin;
///
/// let mut registry = ModelRegistry::new();
/// registry.install(&TogetherPlugin::from_env("TOGETHER_API_KEY")?).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct TogetherPlugin {
    client: Arc<TogetherClient>,
}

impl TogetherPlugin {
    /// Creates a plugin from connection settings.
    #[must_use]
    pub fn new(config: TogetherConfig) -> Self {
        Self {
            client: Arc::new(TogetherClient::new(config)),
        }
    }

    /// Creates a plugin that reads the API key from the specified environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::MissingKey`] if the environment variable is unset or empty.
    pub fn from_env(env_var: &str) -> Result<Self, ModelError> {
        Ok(Self::new(TogetherConfig::from_env_var(env_var)?))
    }

    /// The client shared by every model this plugin creates.
    #[must_use]
    pub fn client(&self) -> &Arc<TogetherClient> {
        &self.client
    }

    /// Fetches the catalog and calls `register` once per model, ordered by ID.
    ///
    /// Returns the number of models registered.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be fetched. `register` is not
    /// called in that case.
    pub async fn discover_and_register<F>(&self, mut register: F) -> Result<usize, ModelError>
    where
        F: FnMut(TogetherModel),
    {
        let mut descriptors = self.client.list_models().await?;
        descriptors.sort_by(|a, b| a.id.cmp(&b.id));

        let count = descriptors.len();
        for descriptor in descriptors {
            tracing::debug!(model = %descriptor.id, "registering Together model");
            register(TogetherModel::new(descriptor, Arc::clone(&self.client)));
        }

        tracing::info!(count, "registered Together models");
        Ok(count)
    }
}

#[async_trait]
impl ModelPlugin for TogetherPlugin {
    fn name(&self) -> &str {
        "together"
    }

    async fn register_models(
        &self,
        register: &mut (dyn FnMut(Arc<dyn Model>) + Send),
    ) -> Result<(), ModelError> {
        self.discover_and_register(|model| register(Arc::new(model)))
            .await
            .map(|_| ())
    }
}
