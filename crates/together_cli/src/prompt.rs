//! Prompt command

use anyhow::Context;
use clap::Args;
use futures::StreamExt;
use serde_json::Value;
use std::io::Write;
use together_models::{ModelRegistry, Prompt};
use together_provider::TogetherPlugin;

/// Prompt command arguments
#[derive(Debug, Args)]
pub struct PromptCmd {
    /// Model ID, e.g. `mistralai/Mixtral-8x7B-v0.1`
    #[arg(short, long)]
    pub model: String,

    /// System prefix placed before the prompt
    #[arg(short, long)]
    pub system: Option<String>,

    /// Wait for the full response instead of streaming it
    #[arg(long)]
    pub no_stream: bool,

    /// Generation option, e.g. `-o temperature 0.2` (repeatable)
    #[arg(short = 'o', long = "option", num_args = 2, value_names = ["NAME", "VALUE"])]
    pub options: Vec<String>,

    /// The prompt text
    pub text: String,
}

impl PromptCmd {
    /// Run the prompt command
    pub async fn run(&self, plugin: &TogetherPlugin, out: &mut impl Write) -> anyhow::Result<()> {
        let mut registry = ModelRegistry::new();
        registry
            .install(plugin)
            .await
            .context("failed to load the Together model catalog")?;
        let model = registry.model(&self.model)?;

        let mut stream = model.execute(&self.prompt(), !self.no_stream, None, None)?;
        while let Some(fragment) = stream.next().await {
            write!(out, "{}", fragment?)?;
            out.flush()?;
        }
        writeln!(out)?;
        Ok(())
    }

    /// Builds the prompt from the command-line arguments.
    fn prompt(&self) -> Prompt {
        let mut prompt = Prompt::new(self.text.as_str());
        if let Some(system) = &self.system {
            prompt = prompt.system(system.as_str());
        }
        for pair in self.options.chunks_exact(2) {
            prompt = prompt.option(pair[0].as_str(), parse_option_value(&pair[1]));
        }
        prompt
    }
}

/// Parses an option value as JSON, falling back to a plain string.
fn parse_option_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
