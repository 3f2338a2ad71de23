//! Error types for models and the model registry.

use core::time::Duration;

/// Error registering or looking up models in the registry.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// No model with this ID has been registered.
    #[error("unknown model: {0}")]
    UnknownModel(String),

    /// A model with this ID is already registered.
    #[error("model '{0}' is already registered")]
    DuplicateModel(String),

    /// A plugin's registration hook failed.
    #[error("plugin '{plugin}' failed to register models: {source}")]
    Plugin {
        /// Name of the plugin.
        plugin: String,
        /// The plugin's error.
        #[source]
        source: ModelError,
    },
}

/// Errors raised while executing a model or discovering models.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// Http error (e.g.: connection error, timeout, etc.)
    #[error("http error: {0}")]
    Http(String),

    /// Authentication failed.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// No API key could be resolved.
    #[error("no API key found: set the {env_var} environment variable")]
    MissingKey {
        /// Environment variable the key is read from.
        env_var: String,
    },

    /// Rate limited by the provider.
    #[error("rate limited{}", .retry_after.map(|d| format!(", retry after {d:?}")).unwrap_or_default())]
    RateLimited {
        /// Suggested time to wait before retrying.
        retry_after: Option<Duration>,
    },

    /// Caller-supplied options were rejected.
    #[error("invalid options: {0}")]
    InvalidOptions(String),

    /// The model's configuration cannot be applied (bad template, bad stop value).
    #[error("invalid model config: {0}")]
    InvalidConfig(String),

    /// Error parsing the response.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Error returned by the model provider.
    #[error("provider error: {message}")]
    Provider {
        /// HTTP status code if available.
        status: Option<u16>,
        /// Error message.
        message: String,
        /// The underlying error source.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}
