//! Assembles the completion input from a prompt, its history and the model config.

use crate::template;
use crate::types::ModelConfig;
use together_models::{Conversation, ModelError};

/// Stop sequence used when the model config does not name one.
pub const DEFAULT_STOP: &str = "<human>";

/// The text and stop sequences sent to the completions endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledPrompt {
    /// Full input text.
    pub text: String,
    /// Stop sequences.
    pub stop: Vec<String>,
}

/// Joins the optional system prefix and the prompt with a blank line.
///
/// The blank line is kept without a system prefix.
#[must_use]
pub fn user_prompt(system: Option<&str>, prompt: &str) -> String {
    format!("{}\n\n{prompt}", system.unwrap_or_default())
}

/// Renders prior turns, oldest first, one block per turn.
///
/// # Errors
///
/// Returns [`ModelError::InvalidConfig`] if the template cannot be rendered.
pub fn render_history(
    prompt_format: Option<&str>,
    conversation: &Conversation,
) -> Result<String, ModelError> {
    let mut history = String::new();
    for turn in conversation.turns() {
        match prompt_format {
            Some(format) => {
                history.push_str(&template::render(format, &turn.prompt)?);
                history.push(' ');
            }
            None => {
                history.push_str(&turn.prompt);
                history.push_str("\n\n");
            }
        }
        history.push_str(&turn.response);
        history.push('\n');
    }
    Ok(history)
}

/// Builds the completion input for one call.
///
/// Without a config block the conversation is not replayed.
///
/// # Errors
///
/// Returns [`ModelError::InvalidConfig`] if the config is malformed.
pub fn assemble(
    config: Option<&ModelConfig>,
    system: Option<&str>,
    prompt: &str,
    conversation: Option<&Conversation>,
) -> Result<AssembledPrompt, ModelError> {
    let mut user_prompt = user_prompt(system, prompt);
    let mut history = String::new();
    let mut stop = vec![DEFAULT_STOP.to_string()];

    if let Some(config) = config {
        let prompt_format = config.prompt_format()?;
        if let Some(conversation) = conversation {
            history = render_history(prompt_format, conversation)?;
        }
        if let Some(format) = prompt_format {
            user_prompt = template::render(format, &user_prompt)?;
        }
        if let Some(config_stop) = config.stop()? {
            stop = config_stop;
        }
    }

    Ok(AssembledPrompt {
        text: format!("{history}\n{user_prompt}"),
        stop,
    })
}
