//! Generation provider backed by an OpenAI-compatible HTTP API.
//!
//! [`create_provider`] builds the boxed provider the engine consumes from
//! the `[generation]` config section and the API key found in the
//! environment.

pub mod http;
pub mod types;

pub use http::HttpGenerationProvider;

use neon_core::generation::box_provider::BoxGenerationProvider;
use neon_types::config::GenerationConfig;
use neon_types::generation::GenerationError;
use secrecy::SecretString;

/// Read the API key from the environment variable named in the config.
///
/// Empty values count as absent.
pub fn resolve_api_key(config: &GenerationConfig) -> Option<SecretString> {
    std::env::var(&config.api_key_env)
        .ok()
        .filter(|key| !key.trim().is_empty())
        .map(SecretString::from)
}

/// Build the configured provider, type-erased for the engine.
pub fn create_provider(config: &GenerationConfig) -> Result<BoxGenerationProvider, GenerationError> {
    let api_key = resolve_api_key(config);
    if api_key.is_none() {
        tracing::warn!(
            env = %config.api_key_env,
            base_url = %config.base_url,
            "No API key found, requests will be sent unauthenticated"
        );
    }
    let provider = HttpGenerationProvider::new(config, api_key)?;
    Ok(BoxGenerationProvider::new(provider))
}
