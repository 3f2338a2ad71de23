//! Model contract and registry for hosts of remote completion models.
//!
//! Decouples a host application from the providers that back its models.
//!
//! # Overview
//!
//! - Provider-agnostic: Hosts depend only on this crate, not on a specific provider.
//!
//! - Plugin registration: Provider crates implement [`ModelPlugin`] and hand one
//!   [`Model`] per remote model to the host during startup.
//!
//! - Lazy output: [`Model::execute`] returns a [`TextStream`] that performs the
//!   remote call only when polled, and yields text fragments in arrival order.
//!
//! # Example
//!
//! ```ignore
//! use futures::StreamExt;
//! use together_models::{ModelRegistry, Prompt};
//!
//! let mut registry = ModelRegistry::new();
//! registry.install(&plugin).await?;
//!
//! let model = registry.model("mistralai/Mixtral-8x7B-v0.1")?;
//! let mut stream = model.execute(&Prompt::new("Hello!"), true, None, None)?;
//! while let Some(fragment) = stream.next().await {
//!     print!("{}", fragment?);
//! }
//! ```

mod error;
mod model;
mod plugin;
mod prompt;
mod registry;
mod stream;

pub use error::{ModelError, RegistryError};
pub use model::Model;
pub use plugin::ModelPlugin;
pub use prompt::{Conversation, ConversationTurn, Options, Prompt};
pub use registry::ModelRegistry;
pub use stream::TextStream;
