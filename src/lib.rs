//! Together completion models for Rust hosts.
//!
//! Re-exports the host contract ([`models`]) and the Together adapter
//! ([`provider`]).

/// Host contract: models, plugins, the registry and prompt types.
pub use together_models as models;

/// The Together catalog plugin and completion models.
pub use together_provider as provider;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use together_models::{
        Conversation, ConversationTurn, Model, ModelError, ModelPlugin, ModelRegistry, Options,
        Prompt, RegistryError, TextStream,
    };
    pub use together_provider::{
        Invocation, TogetherConfig, TogetherModel, TogetherOptions, TogetherPlugin,
    };
}
