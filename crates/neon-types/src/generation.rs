//! Generation request/response types for Neon.
//!
//! These model the contract with the external generation service: a text
//! capability (optionally augmented with internet search) and an image
//! synthesis capability.

use serde::{Deserialize, Serialize};

/// Request for a text completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRequest {
    pub prompt: String,
    /// Let the provider consult the internet before answering.
    #[serde(default)]
    pub augment_with_internet: bool,
}

/// Request for a single generated image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRequest {
    pub prompt: String,
}

/// Location of a generated image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageResult {
    pub url: String,
}

/// Errors from generation provider operations.
///
/// The engine treats every variant as an opaque generation failure; the
/// distinctions exist for logging and for HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("provider error: {message}")]
    Provider { message: String },

    #[error("rate limited (retry after {retry_after_ms:?}ms)")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("deserialization error: {0}")]
    Deserialization(String),

    #[error("provider returned no result")]
    EmptyResult,

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}
