//! Global configuration types for Neon.
//!
//! `GlobalConfig` represents the top-level `config.toml` that controls the
//! generation service endpoint, the REST server bind address, and the event
//! bus capacity.

use serde::{Deserialize, Serialize};

/// Top-level configuration for Neon.
///
/// Loaded from `~/.neon/config.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub generation: GenerationConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub events: EventConfig,
}

/// Connection settings for the OpenAI-compatible generation service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Human-readable provider name used in logs and spans.
    #[serde(default = "default_provider_name")]
    pub provider_name: String,
    /// Base URL for the API (e.g., "https://api.openai.com/v1").
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Model for plain chat completions.
    #[serde(default = "default_text_model")]
    pub text_model: String,
    /// Model for internet-augmented completions.
    #[serde(default = "default_search_model")]
    pub search_model: String,
    /// Model for image synthesis.
    #[serde(default = "default_image_model")]
    pub image_model: String,
    /// Environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// HTTP client timeout for a single generation call.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_provider_name() -> String {
    "openai".to_string()
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_text_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_search_model() -> String {
    "gpt-4o-mini-search-preview".to_string()
}

fn default_image_model() -> String {
    "dall-e-3".to_string()
}

fn default_api_key_env() -> String {
    "NEON_API_KEY".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            provider_name: default_provider_name(),
            base_url: default_base_url(),
            text_model: default_text_model(),
            search_model: default_search_model(),
            image_model: default_image_model(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Bind address for `neon serve`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Conversation event bus settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventConfig {
    /// Broadcast channel capacity; slow subscribers beyond this lag.
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

fn default_capacity() -> usize {
    256
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
        }
    }
}
