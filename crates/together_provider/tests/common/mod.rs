//! Shared test helpers for Together integration tests.

use std::sync::Once;

use together_models::ModelRegistry;
use together_provider::{KEY_ENV_VAR, TogetherPlugin};

static INIT: Once = Once::new();

/// Initialize environment variables from `.env` file (once).
pub fn init_env() {
    INIT.call_once(|| {
        let _ = dotenvy::dotenv();
    });
}

/// Builds a registry holding the live Together catalog.
pub async fn live_registry() -> ModelRegistry {
    init_env();

    let plugin = TogetherPlugin::from_env(KEY_ENV_VAR).expect("TOGETHER_API_KEY should be set");
    let mut registry = ModelRegistry::new();
    registry
        .install(&plugin)
        .await
        .expect("catalog should be reachable");
    registry
}
