//! The [`Model`] trait implemented by provider adapters.

use crate::error::ModelError;
use crate::prompt::{Conversation, Prompt};
use crate::stream::TextStream;
use serde_json::Value;

/// A remote model the host can execute prompts against.
///
/// Provider plugins create one implementation per remote model and hand it to
/// the host through [`ModelPlugin`](crate::ModelPlugin).
pub trait Model: Send + Sync + 'static {
    /// Identifier the host uses to select this model.
    fn model_id(&self) -> &str;

    /// Name of the key this model needs, if any (e.g. `"together"`).
    fn needs_key(&self) -> Option<&str> {
        None
    }

    /// Environment variable the key can be read from.
    fn key_env_var(&self) -> Option<&str> {
        None
    }

    /// Whether the model can stream its output.
    fn can_stream(&self) -> bool {
        false
    }

    /// JSON schema of the options the model accepts: names, bounds, defaults
    /// and descriptions. Hosts use this to surface options to users.
    fn options_schema(&self) -> Value;

    /// Executes a prompt.
    ///
    /// No request is made until the returned stream is polled.
    ///
    /// # Arguments
    ///
    /// * `prompt` - The current prompt, its optional system prefix and options
    /// * `stream` - Whether to stream fragments as they are generated
    /// * `conversation` - Prior exchanges, oldest first
    /// * `key` - An API key overriding the one the model was created with
    ///
    /// # Errors
    ///
    /// Returns an error if the options or the model's configuration cannot be
    /// applied. Remote failures are yielded by the stream.
    fn execute(
        &self,
        prompt: &Prompt,
        stream: bool,
        conversation: Option<&Conversation>,
        key: Option<&str>,
    ) -> Result<TextStream, ModelError>;
}
