//! Together completion models for hosts built on [`together_models`].
//!
//! [`TogetherPlugin`] fetches the Together model catalog and registers one
//! [`TogetherModel`] per entry, ordered by model ID. Each model turns a prompt,
//! an optional conversation and generation options into a call against the
//! Together completions endpoint, and returns the output as a [`TextStream`].
//!
//! # Usage
//!
//! ```no_run
//! use together_models::{Model, ModelRegistry, Prompt};
//! use together_provider::TogetherPlugin;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let mut registry = ModelRegistry::new();
//! registry.install(&TogetherPlugin::from_env("TOGETHER_API_KEY")?).await?;
//!
//! let model = registry.model("mistralai/Mixtral-8x7B-v0.1")?;
//! let prompt = Prompt::new("Tell me a joke").option("temperature", 0.7);
//! let text = model.execute(&prompt, true, None, None)?.text().await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Prompt Assembly
//!
//! Catalog entries may carry a `config` block with a `prompt_format` template
//! (e.g. `[INST] {prompt} [/INST]`) and `stop` sequences. When present, prior
//! turns are replayed through the template ahead of the current prompt. See
//! [`prompt::assemble`] for the exact layout.
//!
//! [`TextStream`]: together_models::TextStream

pub mod client;
pub mod config;
pub mod model;
pub mod options;
pub mod plugin;
pub mod prompt;
pub mod template;
pub mod types;

pub use client::TogetherClient;
pub use config::{BASE_URL_ENV_VAR, DEFAULT_BASE_URL, KEY_ENV_VAR, TogetherConfig};
pub use model::{Invocation, TogetherModel};
pub use options::TogetherOptions;
pub use plugin::TogetherPlugin;
pub use types::{ModelConfig, ModelDescriptor, StopSequences};
