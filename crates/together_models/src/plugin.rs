//! The [`ModelPlugin`] registration hook.

use crate::error::ModelError;
use crate::model::Model;
use async_trait::async_trait;
use std::sync::Arc;

/// A provider plugin that contributes models to the host.
///
/// The host calls [`register_models`](Self::register_models) once during
/// startup, usually through [`ModelRegistry::install`](crate::ModelRegistry::install).
///
/// ```
/// # use async_trait::async_trait;
/// # use std::sync::Arc;
/// # use together_models::{Conversation, Model, ModelError, ModelPlugin, ModelRegistry, Prompt, TextStream};
/// # use serde_json::{json, Value};
/// struct EchoModel;
///
/// impl Model for EchoModel {
///     fn model_id(&self) -> &str {
///         "echo"
///     }
///
///     fn options_schema(&self) -> Value {
///         json!({ "type": "object" })
///     }
///
///     fn execute(
///         &self,
///         prompt: &Prompt,
///         _stream: bool,
///         _conversation: Option<&Conversation>,
///         _key: Option<&str>,
///     ) -> Result<TextStream, ModelError> {
///         let text = prompt.prompt.clone();
///         Ok(TextStream::new(futures::stream::once(async move { Ok(text) })))
///     }
/// }
///
/// struct EchoPlugin;
///
/// #[async_trait]
/// impl ModelPlugin for EchoPlugin {
///     fn name(&self) -> &str {
///         "echo"
///     }
///
///     async fn register_models(
///         &self,
///         register: &mut (dyn FnMut(Arc<dyn Model>) + Send),
///     ) -> Result<(), ModelError> {
///         register(Arc::new(EchoModel));
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait ModelPlugin: Send + Sync {
    /// Short name of the plugin, used in logs.
    fn name(&self) -> &str;

    /// Registers every model this plugin provides by calling `register` once per model.
    ///
    /// # Errors
    ///
    /// Returns an error if the models cannot be discovered. Models passed to
    /// `register` before the error may be discarded by the host.
    async fn register_models(
        &self,
        register: &mut (dyn FnMut(Arc<dyn Model>) + Send),
    ) -> Result<(), ModelError>;
}
