//! Generation options accepted by Together models.

use schemars::{JsonSchema, schema_for};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use together_models::{ModelError, Options};

const DEFAULT_MAX_TOKENS: u32 = 8192;

fn default_max_tokens() -> Option<u32> {
    Some(DEFAULT_MAX_TOKENS)
}

/// Caller-supplied generation parameters.
///
/// Unset fields are left out of the request so the API applies its own
/// defaults. `max_tokens` is the exception: it defaults to 8192 unless the
/// caller explicitly sets it to `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct TogetherOptions {
    /// What sampling temperature to use, between 0 and 2. Higher values like 0.8
    /// will make the output more random, while lower values like 0.2 will make it
    /// more focused and deterministic.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(range(min = 0, max = 2))]
    pub temperature: Option<f64>,

    /// Maximum number of tokens to generate.
    #[serde(
        default = "default_max_tokens",
        skip_serializing_if = "Option::is_none"
    )]
    #[schemars(range(min = 1))]
    pub max_tokens: Option<u32>,

    /// An alternative to sampling with temperature, called nucleus sampling, where
    /// the model considers the results of the tokens with `top_p` probability mass.
    /// So 0.1 means only the tokens comprising the top 10% probability mass are
    /// considered. Recommended to use `top_p` or temperature but not both.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(range(min = 0, max = 1))]
    pub top_p: Option<f64>,

    /// A number that controls the diversity of generated text by reducing the
    /// likelihood of repeated sequences. Higher values decrease repetition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(range(min = -2, max = 2))]
    pub repetition_penalty: Option<f64>,
}

impl Default for TogetherOptions {
    fn default() -> Self {
        Self {
            temperature: None,
            max_tokens: default_max_tokens(),
            top_p: None,
            repetition_penalty: None,
        }
    }
}

impl TogetherOptions {
    /// Parses and validates the host's raw options.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidOptions`] for unknown option names, values of
    /// the wrong type and values out of range.
    pub fn from_options(options: &Options) -> Result<Self, ModelError> {
        let parsed: Self = serde_json::from_value(Value::Object(options.clone()))
            .map_err(|err| ModelError::InvalidOptions(err.to_string()))?;
        parsed.validate()?;
        Ok(parsed)
    }

    /// Checks every set field against its bounds.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidOptions`] naming the first field out of range.
    pub fn validate(&self) -> Result<(), ModelError> {
        check_range("temperature", self.temperature, 0.0, 2.0)?;
        check_range("top_p", self.top_p, 0.0, 1.0)?;
        check_range("repetition_penalty", self.repetition_penalty, -2.0, 2.0)?;
        if self.max_tokens == Some(0) {
            return Err(ModelError::InvalidOptions(
                "max_tokens must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns only the fields that are set, ready to merge into a request.
    #[must_use]
    pub fn normalized(&self) -> Map<String, Value> {
        let mut params = Map::new();
        if let Some(temperature) = self.temperature {
            params.insert("temperature".to_string(), Value::from(temperature));
        }
        if let Some(max_tokens) = self.max_tokens {
            params.insert("max_tokens".to_string(), Value::from(max_tokens));
        }
        if let Some(top_p) = self.top_p {
            params.insert("top_p".to_string(), Value::from(top_p));
        }
        if let Some(repetition_penalty) = self.repetition_penalty {
            params.insert(
                "repetition_penalty".to_string(),
                Value::from(repetition_penalty),
            );
        }
        params
    }

    /// JSON schema of the options: names, bounds, defaults and descriptions.
    #[must_use]
    pub fn schema() -> Value {
        schema_for!(TogetherOptions).to_value()
    }
}

fn check_range(name: &str, value: Option<f64>, min: f64, max: f64) -> Result<(), ModelError> {
    match value {
        Some(value) if !(min..=max).contains(&value) => Err(ModelError::InvalidOptions(format!(
            "{name} must be between {min} and {max}, got {value}"
        ))),
        _ => Ok(()),
    }
}
