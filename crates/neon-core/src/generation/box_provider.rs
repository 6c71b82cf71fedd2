//! BoxGenerationProvider -- object-safe dynamic dispatch wrapper for GenerationProvider.
//!
//! 1. Define an object-safe `GenerationProviderDyn` trait with boxed futures
//! 2. Blanket-impl `GenerationProviderDyn` for all `T: GenerationProvider`
//! 3. `BoxGenerationProvider` wraps `Box<dyn GenerationProviderDyn>` and delegates

use std::future::Future;
use std::pin::Pin;

use neon_types::generation::{GenerationError, ImageRequest, ImageResult, TextRequest};

use super::provider::GenerationProvider;

/// Object-safe version of [`GenerationProvider`] with boxed futures.
pub trait GenerationProviderDyn: Send + Sync {
    fn name(&self) -> &str;

    fn generate_text_boxed<'a>(
        &'a self,
        request: &'a TextRequest,
    ) -> Pin<Box<dyn Future<Output = Result<String, GenerationError>> + Send + 'a>>;

    fn generate_image_boxed<'a>(
        &'a self,
        request: &'a ImageRequest,
    ) -> Pin<Box<dyn Future<Output = Result<ImageResult, GenerationError>> + Send + 'a>>;
}

impl<T: GenerationProvider> GenerationProviderDyn for T {
    fn name(&self) -> &str {
        GenerationProvider::name(self)
    }

    fn generate_text_boxed<'a>(
        &'a self,
        request: &'a TextRequest,
    ) -> Pin<Box<dyn Future<Output = Result<String, GenerationError>> + Send + 'a>> {
        Box::pin(self.generate_text(request))
    }

    fn generate_image_boxed<'a>(
        &'a self,
        request: &'a ImageRequest,
    ) -> Pin<Box<dyn Future<Output = Result<ImageResult, GenerationError>> + Send + 'a>> {
        Box::pin(self.generate_image(request))
    }
}

/// Type-erased generation provider for runtime provider selection.
///
/// Since `GenerationProvider` uses RPITIT, it cannot be used as a trait
/// object directly. `BoxGenerationProvider` provides equivalent methods that
/// delegate to the inner `GenerationProviderDyn` trait object.
pub struct BoxGenerationProvider {
    inner: Box<dyn GenerationProviderDyn + Send + Sync>,
}

impl BoxGenerationProvider {
    /// Wrap a concrete `GenerationProvider` in a type-erased box.
    pub fn new<T: GenerationProvider + 'static>(provider: T) -> Self {
        Self {
            inner: Box::new(provider),
        }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub async fn generate_text(&self, request: &TextRequest) -> Result<String, GenerationError> {
        self.inner.generate_text_boxed(request).await
    }

    pub async fn generate_image(
        &self,
        request: &ImageRequest,
    ) -> Result<ImageResult, GenerationError> {
        self.inner.generate_image_boxed(request).await
    }
}

impl std::fmt::Debug for BoxGenerationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxGenerationProvider")
            .field("name", &self.inner.name())
            .finish()
    }
}
