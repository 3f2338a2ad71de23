//! Together API types.
//!
//! These types match the Together completions and models endpoints.
//! See: <https://docs.together.ai/reference/completions-1>

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use together_models::ModelError;

// ─────────────────────────────────────────────────────────────────────────────
// Catalog Types
// ─────────────────────────────────────────────────────────────────────────────

/// One model from the Together catalog.
///
/// Only `id` is required. Informational fields of the wrong type decode as
/// unset, and a malformed `config` block is kept and reported on use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    /// Model identifier, e.g. `mistralai/Mixtral-8x7B-v0.1`.
    pub id: String,
    /// Prompt formatting settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<ConfigEntry<ModelConfig>>,
    /// Human-readable name.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Kind of model, e.g. `chat` or `language`.
    #[serde(
        rename = "type",
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub kind: Option<String>,
    /// Publishing organization.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    /// Context window in tokens.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub context_length: Option<u64>,
}

impl ModelDescriptor {
    /// Creates a descriptor with only an ID.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            config: None,
            display_name: None,
            kind: None,
            organization: None,
            context_length: None,
        }
    }

    /// Sets the prompt formatting settings.
    #[must_use]
    pub fn with_config(mut self, config: ModelConfig) -> Self {
        self.config = Some(ConfigEntry::Valid(config));
        self
    }

    /// Returns the prompt formatting settings, if any.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidConfig`] if `config` is not an object.
    pub fn config(&self) -> Result<Option<&ModelConfig>, ModelError> {
        self.config
            .as_ref()
            .map(|entry| entry.get("config"))
            .transpose()
    }
}

/// Per-model prompt formatting settings.
///
/// Entries of the wrong shape still decode, so one malformed model never
/// breaks the catalog; they are reported when the model is used.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Template wrapping each prompt, with a single `{prompt}` substitution point.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_format: Option<ConfigEntry<String>>,
    /// Stop sequences replacing the default. A present `null` is malformed.
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub stop: Option<ConfigEntry<StopSequences>>,
}

impl ModelConfig {
    /// Sets the prompt template.
    #[must_use]
    pub fn with_prompt_format(mut self, prompt_format: impl Into<String>) -> Self {
        self.prompt_format = Some(ConfigEntry::Valid(prompt_format.into()));
        self
    }

    /// Sets the stop sequences.
    #[must_use]
    pub fn with_stop(mut self, stop: impl Into<StopSequences>) -> Self {
        self.stop = Some(ConfigEntry::Valid(stop.into()));
        self
    }

    /// Returns the prompt template if one is set and non-empty.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidConfig`] if `prompt_format` is not a string.
    pub fn prompt_format(&self) -> Result<Option<&str>, ModelError> {
        match &self.prompt_format {
            Some(entry) => Ok(Some(entry.get("prompt_format")?.as_str()).filter(|f| !f.is_empty())),
            None => Ok(None),
        }
    }

    /// Returns the stop sequences if set, as a list.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidConfig`] if `stop` is neither a string nor a
    /// list of strings.
    pub fn stop(&self) -> Result<Option<Vec<String>>, ModelError> {
        match &self.stop {
            Some(entry) => Ok(Some(entry.get("stop")?.to_vec())),
            None => Ok(None),
        }
    }
}

/// A config value that either has the expected shape or is kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigEntry<T> {
    /// The value has the expected shape.
    Valid(T),
    /// The value has some other shape.
    Malformed(Value),
}

impl<T> ConfigEntry<T> {
    /// Returns the value, or an error naming the malformed `key`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidConfig`] for a malformed entry.
    pub fn get(&self, key: &str) -> Result<&T, ModelError> {
        match self {
            Self::Valid(value) => Ok(value),
            Self::Malformed(value) => Err(ModelError::InvalidConfig(format!(
                "unexpected value for '{key}': {value}"
            ))),
        }
    }
}

/// Stop sequences as the catalog spells them: one string or a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StopSequences {
    /// A single stop sequence.
    One(String),
    /// An ordered list of stop sequences.
    Many(Vec<String>),
}

impl StopSequences {
    /// Returns the sequences as a list, wrapping a single string.
    #[must_use]
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            Self::One(stop) => vec![stop.clone()],
            Self::Many(stops) => stops.clone(),
        }
    }
}

impl From<&str> for StopSequences {
    fn from(stop: &str) -> Self {
        Self::One(stop.to_string())
    }
}

impl From<String> for StopSequences {
    fn from(stop: String) -> Self {
        Self::One(stop)
    }
}

impl From<Vec<String>> for StopSequences {
    fn from(stops: Vec<String>) -> Self {
        Self::Many(stops)
    }
}

impl<const N: usize> From<[&str; N]> for StopSequences {
    fn from(stops: [&str; N]) -> Self {
        Self::Many(stops.iter().map(ToString::to_string).collect())
    }
}

/// Response body of the models endpoint.
///
/// The endpoint has answered both with a bare list and with an OpenAI-style
/// `{"data": [...]}` envelope. Entries are decoded one by one in
/// [`into_models()`](Self::into_models).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ModelList {
    /// A bare list of models.
    Bare(Vec<Value>),
    /// Models wrapped in a `data` field.
    Envelope {
        /// The models.
        data: Vec<Value>,
    },
}

impl ModelList {
    /// Decodes the models, skipping entries that have no string `id`.
    #[must_use]
    pub fn into_models(self) -> Vec<ModelDescriptor> {
        let entries = match self {
            Self::Bare(entries) | Self::Envelope { data: entries } => entries,
        };
        entries
            .into_iter()
            .enumerate()
            .filter_map(|(position, entry)| {
                let id = entry.get("id").cloned();
                match serde_json::from_value::<ModelDescriptor>(entry) {
                    Ok(descriptor) => Some(descriptor),
                    Err(err) => {
                        tracing::warn!(position, id = ?id, error = %err, "skipping catalog entry");
                        None
                    }
                }
            })
            .collect()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Completion Types
// ─────────────────────────────────────────────────────────────────────────────

/// Request body for the completions endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    /// The model to use.
    pub model: String,
    /// The full input text.
    pub prompt: String,
    /// Whether to stream the response. Omitted for blocking calls.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
    /// Stop sequences.
    pub stop: Vec<String>,
    /// Generation parameters set by the caller, merged into the body verbatim.
    #[serde(flatten)]
    pub params: Map<String, Value>,
}

/// One generated choice.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Choice {
    /// Generated text (a fragment when streaming).
    #[serde(default)]
    pub text: String,
    /// Why generation stopped, once it has.
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Error body reported by the API.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ApiError {
    /// Error message.
    #[serde(default)]
    pub message: String,
    /// Error kind, when reported.
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

/// Response body of a blocking completion.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CompletionResponse {
    /// Response ID.
    #[serde(default)]
    pub id: Option<String>,
    /// Generated choices.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub choices: Vec<Choice>,
}

impl CompletionResponse {
    /// Returns the first choice's text, if there is a choice.
    #[must_use]
    pub fn into_text(self) -> Option<String> {
        self.choices.into_iter().next().map(|choice| choice.text)
    }
}

/// One server-sent event of a streamed completion.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CompletionChunk {
    /// Response ID.
    #[serde(default)]
    pub id: Option<String>,
    /// Choices carried by this chunk; may be empty or `null`.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub choices: Vec<Choice>,
    /// Error reported mid-stream.
    #[serde(default)]
    pub error: Option<ApiError>,
}

impl CompletionChunk {
    /// Returns the first choice's text fragment, if there is a choice.
    #[must_use]
    pub fn into_text(self) -> Option<String> {
        self.choices.into_iter().next().map(|choice| choice.text)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Decoding Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Decodes an informational field, treating a value of the wrong type as unset.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Keeps any present value, `null` included, so it is checked on use.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
