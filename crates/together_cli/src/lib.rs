//! `llm-together`: run prompts against Together completion models.
//!
//! ```bash
//! llm-together models
//! llm-together prompt -m mistralai/Mixtral-8x7B-v0.1 -o temperature 0.2 "Tell me a joke"
//! ```
//!
//! The API key is read from `--api-key` or `TOGETHER_API_KEY`; a `.env` file
//! in the working directory is loaded first.

use clap::{Parser, Subcommand};
use together_provider::{DEFAULT_BASE_URL, TogetherConfig, TogetherPlugin};
use tracing::Level;

pub use logging::{LogFormat, Logging};
pub use models::ModelsCmd;
pub use prompt::PromptCmd;

mod logging;
mod models;
mod prompt;

/// Command-line access to Together completion models.
#[derive(Debug, Parser)]
#[command(name = "llm-together", version, about)]
pub struct App {
    /// Together API key
    #[arg(long, global = true, env = "TOGETHER_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Base URL of the Together API
    #[arg(long, global = true, env = "TOGETHER_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Maximum log level (overridden by `RUST_LOG`)
    #[arg(long, global = true, default_value_t = Level::WARN)]
    pub log_level: Level,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,

    /// Filter directives, e.g. `together_provider=debug` (replaces `--log-level`)
    #[arg(long, global = true)]
    pub log_filter: Option<String>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the models in the Together catalog
    Models(ModelsCmd),

    /// Run a prompt against a model
    Prompt(PromptCmd),
}

impl App {
    /// Log settings from the flags.
    #[must_use]
    pub fn logging(&self) -> Logging {
        let logging = Logging::new()
            .with_level(self.log_level)
            .with_format(self.log_format);
        match &self.log_filter {
            Some(filter) => logging.with_env_filter(filter.as_str()),
            None => logging,
        }
    }

    /// Installs the log subscriber.
    pub fn init_logging(&self) {
        self.logging().init();
    }

    /// Connection settings from the flags and environment.
    ///
    /// # Errors
    ///
    /// Returns an error if no API key was given.
    pub fn config(&self) -> anyhow::Result<TogetherConfig> {
        let api_key = self
            .api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                anyhow::anyhow!("no API key: pass --api-key or set TOGETHER_API_KEY")
            })?;
        Ok(TogetherConfig::new(api_key).with_base_url(self.base_url.as_str()))
    }

    /// Runs the selected command, writing results to `out`.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn run(&self, out: &mut impl std::io::Write) -> anyhow::Result<()> {
        let plugin = TogetherPlugin::new(self.config()?);
        match &self.command {
            Command::Models(cmd) => cmd.run(&plugin, out).await,
            Command::Prompt(cmd) => cmd.run(&plugin, out).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> App {
        App::try_parse_from(std::iter::once("llm-together").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn flags_override_environment() {
        let app = parse(&[
            "--api-key",
            "sk-flag",
            "--base-url",
            "http://localhost:9999/v1/",
            "models",
        ]);

        let config = app.config().unwrap();
        assert_eq!(config.api_key, "sk-flag");
        assert_eq!(config.base_url, "http://localhost:9999/v1");
    }

    #[test]
    fn log_flags_parse() {
        let app = parse(&["--log-level", "debug", "--log-format", "json", "models"]);
        assert_eq!(app.log_level, Level::DEBUG);
        assert_eq!(app.log_format, LogFormat::Json);
    }

    #[test]
    fn log_filter_flag_sets_directives() {
        let app = parse(&["--log-filter", "together_provider=debug", "models"]);
        assert_eq!(app.log_filter.as_deref(), Some("together_provider=debug"));
        assert_eq!(
            app.logging().filter().max_level_hint(),
            Some(tracing::level_filters::LevelFilter::DEBUG)
        );
    }

    #[test]
    fn empty_key_is_rejected() {
        let app = parse(&["--api-key", "", "models"]);
        assert!(app.config().is_err());
    }
}
