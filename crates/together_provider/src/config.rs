//! Connection settings for the Together API.

use together_models::ModelError;

/// Environment variable holding the Together API key.
pub const KEY_ENV_VAR: &str = "TOGETHER_API_KEY";

/// Environment variable overriding the API base URL.
pub const BASE_URL_ENV_VAR: &str = "TOGETHER_BASE_URL";

/// Base URL of the hosted Together API.
pub const DEFAULT_BASE_URL: &str = "https://api.together.xyz/v1";

/// API key and endpoint used to reach Together.
#[derive(Clone, PartialEq, Eq)]
pub struct TogetherConfig {
    /// API key sent as a bearer token.
    pub api_key: String,
    /// Base URL without a trailing slash, e.g. `https://api.together.xyz/v1`.
    pub base_url: String,
}

impl TogetherConfig {
    /// Creates a config for the hosted API.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Reads the key from [`KEY_ENV_VAR`] and the base URL from [`BASE_URL_ENV_VAR`].
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::MissingKey`] if the key is unset or empty.
    pub fn from_env() -> Result<Self, ModelError> {
        Self::from_env_var(KEY_ENV_VAR)
    }

    /// Reads the key from `env_var` and the base URL from [`BASE_URL_ENV_VAR`].
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::MissingKey`] if the key is unset or empty.
    pub fn from_env_var(env_var: &str) -> Result<Self, ModelError> {
        let api_key = std::env::var(env_var)
            .ok()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| ModelError::MissingKey {
                env_var: env_var.to_string(),
            })?;

        let config = Self::new(api_key);
        Ok(match std::env::var(BASE_URL_ENV_VAR) {
            Ok(base_url) if !base_url.is_empty() => config.with_base_url(base_url),
            _ => config,
        })
    }

    /// Points the config at another endpoint (a proxy or a mock server).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }
}

impl core::fmt::Debug for TogetherConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TogetherConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}
