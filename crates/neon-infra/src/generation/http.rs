//! HttpGenerationProvider -- concrete [`GenerationProvider`] over an
//! OpenAI-compatible API.
//!
//! Text goes to `POST {base_url}/chat/completions`. Internet-augmented text
//! uses the search model and sends `web_search_options`. Images go to
//! `POST {base_url}/images/generations` and the first returned URL is used.
//!
//! The API key is held as a [`SecretString`] and only exposed when building
//! the `Authorization` header.

use std::time::Duration;

use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};

use neon_core::generation::provider::GenerationProvider;
use neon_types::config::GenerationConfig;
use neon_types::generation::{GenerationError, ImageRequest, ImageResult, TextRequest};

use super::types::{
    ChatCompletionRequest, ChatCompletionResponse, ChatMessage, ImageGenerationRequest,
    ImageGenerationResponse,
};

/// Generation provider speaking the OpenAI-compatible REST dialect.
pub struct HttpGenerationProvider {
    client: reqwest::Client,
    api_key: Option<SecretString>,
    name: String,
    base_url: String,
    text_model: String,
    search_model: String,
    image_model: String,
}

impl HttpGenerationProvider {
    pub fn new(
        config: &GenerationConfig,
        api_key: Option<SecretString>,
    ) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GenerationError::Provider {
                message: format!("failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            api_key,
            name: config.provider_name.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            text_model: config.text_model.clone(),
            search_model: config.search_model.clone(),
            image_model: config.image_model.clone(),
        })
    }

    /// Override the base URL (useful for testing or proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn chat_request(&self, request: &TextRequest) -> ChatCompletionRequest {
        let (model, web_search_options) = if request.augment_with_internet {
            (self.search_model.clone(), Some(serde_json::json!({})))
        } else {
            (self.text_model.clone(), None)
        };

        ChatCompletionRequest {
            model,
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: request.prompt.clone(),
            }],
            web_search_options,
        }
    }

    fn image_request(&self, request: &ImageRequest) -> ImageGenerationRequest {
        ImageGenerationRequest {
            model: self.image_model.clone(),
            prompt: request.prompt.clone(),
            n: 1,
        }
    }

    async fn post_json<B: serde::Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<String, GenerationError> {
        let mut builder = self.client.post(self.url(path)).json(body);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key.expose_secret());
        }

        let response = builder.send().await.map_err(|e| GenerationError::Provider {
            message: format!("HTTP request failed: {e}"),
        })?;

        let status = response.status();
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_retry_after);
        let body = response.text().await.map_err(|e| GenerationError::Provider {
            message: format!("failed to read response body: {e}"),
        })?;

        if !status.is_success() {
            return Err(error_for_status(status, retry_after, body));
        }
        Ok(body)
    }
}

// HttpGenerationProvider does not derive Debug; the key stays out of output.

impl GenerationProvider for HttpGenerationProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate_text(&self, request: &TextRequest) -> Result<String, GenerationError> {
        let body = self.chat_request(request);
        tracing::debug!(
            gen_ai.request.model = %body.model,
            augment_with_internet = request.augment_with_internet,
            prompt_chars = request.prompt.chars().count(),
            "Sending text generation request"
        );
        let raw = self.post_json("/chat/completions", &body).await?;
        parse_chat_response(&raw)
    }

    async fn generate_image(&self, request: &ImageRequest) -> Result<ImageResult, GenerationError> {
        let body = self.image_request(request);
        tracing::debug!(gen_ai.request.model = %body.model, "Sending image generation request");
        let raw = self.post_json("/images/generations", &body).await?;
        parse_image_response(&raw)
    }
}

/// Map a non-success HTTP status to a [`GenerationError`].
fn error_for_status(status: StatusCode, retry_after_ms: Option<u64>, body: String) -> GenerationError {
    match status.as_u16() {
        401 | 403 => GenerationError::AuthenticationFailed,
        429 => GenerationError::RateLimited { retry_after_ms },
        400 | 422 => GenerationError::InvalidRequest(body),
        _ => GenerationError::Provider {
            message: format!("HTTP {status}: {body}"),
        },
    }
}

/// `Retry-After` in whole seconds, converted to milliseconds. Values that
/// do not fit in milliseconds are treated as absent.
fn parse_retry_after(value: &str) -> Option<u64> {
    value
        .trim()
        .parse::<u64>()
        .ok()
        .and_then(|secs| secs.checked_mul(1000))
}

fn parse_chat_response(raw: &str) -> Result<String, GenerationError> {
    let response: ChatCompletionResponse = serde_json::from_str(raw)
        .map_err(|e| GenerationError::Deserialization(format!("failed to parse response: {e}")))?;

    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or(GenerationError::EmptyResult)
}

fn parse_image_response(raw: &str) -> Result<ImageResult, GenerationError> {
    let response: ImageGenerationResponse = serde_json::from_str(raw)
        .map_err(|e| GenerationError::Deserialization(format!("failed to parse response: {e}")))?;

    response
        .data
        .into_iter()
        .next()
        .and_then(|datum| datum.url)
        .map(|url| ImageResult { url })
        .ok_or(GenerationError::EmptyResult)
}
