//! GenerationProvider trait definition.
//!
//! This is the contract the engine expects from the external generation
//! service: one text capability and one image capability, each a single
//! request/response.

use neon_types::generation::{GenerationError, ImageRequest, ImageResult, TextRequest};

/// Trait for generation service backends.
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
/// Implementations live in neon-infra (e.g., `HttpGenerationProvider`).
pub trait GenerationProvider: Send + Sync {
    /// Human-readable provider name (e.g., "openai").
    fn name(&self) -> &str;

    /// Generate an assistant reply for a linearized prompt.
    fn generate_text(
        &self,
        request: &TextRequest,
    ) -> impl std::future::Future<Output = Result<String, GenerationError>> + Send;

    /// Synthesize one image and return where it can be fetched.
    fn generate_image(
        &self,
        request: &ImageRequest,
    ) -> impl std::future::Future<Output = Result<ImageResult, GenerationError>> + Send;
}
