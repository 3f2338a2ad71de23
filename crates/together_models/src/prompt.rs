//! Prompt and conversation types handed to a [`Model`](crate::Model).

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Raw generation options as supplied by the host.
///
/// Each model decodes and validates these against its own schema, see
/// [`Model::options_schema`](crate::Model::options_schema).
pub type Options = serde_json::Map<String, Value>;

/// The current request to a model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Prompt {
    /// The prompt text.
    pub prompt: String,
    /// Optional system prefix.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    /// Options set by the caller. Options the caller did not mention are absent.
    #[serde(default)]
    pub options: Options,
}

impl Prompt {
    /// Creates a prompt with no system prefix and no options.
    ///
    /// # Example
    ///
    /// ```rust
    /// use together_models::Prompt;
    ///
    /// let prompt = Prompt::new("Tell me a joke");
    /// assert!(prompt.system.is_none());
    /// ```
    #[must_use]
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            system: None,
            options: Options::new(),
        }
    }

    /// Sets the system prefix.
    #[must_use]
    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Sets a single option. A `null` value explicitly unsets an option
    /// that would otherwise take its default.
    #[must_use]
    pub fn option(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(name.into(), value.into());
        self
    }
}

/// One prior exchange: the prompt that was sent and the text that came back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    /// The prompt text of the exchange.
    pub prompt: String,
    /// The full response text of the exchange.
    pub response: String,
}

impl ConversationTurn {
    /// Creates a turn.
    #[must_use]
    pub fn new(prompt: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            response: response.into(),
        }
    }
}

/// Prior exchanges with a model, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    turns: Vec<ConversationTurn>,
}

impl Conversation {
    /// Creates an empty conversation.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a turn to the end of the conversation.
    #[must_use]
    pub fn turn(mut self, prompt: impl Into<String>, response: impl Into<String>) -> Self {
        self.turns.push(ConversationTurn::new(prompt, response));
        self
    }

    /// Returns the turns, oldest first.
    #[must_use]
    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    /// Returns `true` if there are no turns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

impl FromIterator<ConversationTurn> for Conversation {
    fn from_iter<I: IntoIterator<Item = ConversationTurn>>(iter: I) -> Self {
        Self {
            turns: iter.into_iter().collect(),
        }
    }
}
