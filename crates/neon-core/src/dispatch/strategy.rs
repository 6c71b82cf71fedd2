//! Modality dispatcher.
//!
//! `GenerationStrategy` is the closed set of ways a user turn can be answered.
//! Each strategy decides how much history it reads, which capability it
//! calls, and how the result is shaped into an assistant turn.

use tracing::{Instrument, debug, info_span, warn};

use neon_types::conversation::{MediaRef, Modality, Turn};
use neon_types::generation::{GenerationError, ImageRequest, TextRequest};

use crate::generation::box_provider::BoxGenerationProvider;

use super::window::{CHAT_TEMPLATE, PromptTemplate, SEARCH_TEMPLATE};

/// History window for plain chat.
pub const CHAT_WINDOW: usize = 10;

/// History window for internet-augmented search.
pub const SEARCH_WINDOW: usize = 6;

/// Number of frames synthesized for a video turn.
pub const VIDEO_FRAMES: u32 = 4;

/// Assistant text attached to a generated image.
pub const IMAGE_CONFIRMATION: &str = "Image générée avec succès !";

/// Result of one successful dispatch, ready to become an assistant turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub content: String,
    pub media: Option<MediaRef>,
}

/// Errors from a dispatch. Callers treat both variants as a generation failure.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("generation failed: {0}")]
    Generation(#[from] GenerationError),

    /// A frame call failed; the frames already produced were discarded.
    #[error("frame {} of {total} failed after {completed} completed: {source}", .completed + 1)]
    PartialSequence {
        completed: u32,
        total: u32,
        #[source]
        source: GenerationError,
    },
}

/// Generation strategy selected by a conversation's modality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationStrategy {
    /// Text generation over the last 10 turns.
    Chat,
    /// Internet-augmented text generation over the last 6 turns.
    Search,
    /// One image from the raw utterance.
    Image,
    /// `frames` images requested one after another.
    Video { frames: u32 },
}

impl GenerationStrategy {
    pub fn for_modality(modality: Modality) -> Self {
        match modality {
            Modality::Assistant => GenerationStrategy::Chat,
            Modality::Search => GenerationStrategy::Search,
            Modality::Image => GenerationStrategy::Image,
            Modality::Video => GenerationStrategy::Video {
                frames: VIDEO_FRAMES,
            },
        }
    }

    /// How many prior turns this strategy feeds to the provider.
    pub fn history_window(&self) -> usize {
        match self {
            GenerationStrategy::Chat => CHAT_WINDOW,
            GenerationStrategy::Search => SEARCH_WINDOW,
            GenerationStrategy::Image | GenerationStrategy::Video { .. } => 0,
        }
    }

    /// Prompt template for text strategies; `None` for media strategies.
    pub fn template(&self) -> Option<&'static PromptTemplate> {
        match self {
            GenerationStrategy::Chat => Some(&CHAT_TEMPLATE),
            GenerationStrategy::Search => Some(&SEARCH_TEMPLATE),
            GenerationStrategy::Image | GenerationStrategy::Video { .. } => None,
        }
    }

    /// The exact prompt sent to the provider for a text strategy, or the raw
    /// utterance for media strategies.
    pub fn build_prompt(&self, history: &[Turn], utterance: &str) -> String {
        match self.template() {
            Some(template) => template.build(history, self.history_window(), utterance),
            None => utterance.to_string(),
        }
    }

    /// Invoke the provider for `utterance` and shape the result.
    ///
    /// `history` is the snapshot taken before the user turn was persisted.
    pub async fn dispatch(
        &self,
        provider: &BoxGenerationProvider,
        history: &[Turn],
        utterance: &str,
    ) -> Result<DispatchOutcome, DispatchError> {
        match *self {
            GenerationStrategy::Chat | GenerationStrategy::Search => {
                let request = TextRequest {
                    prompt: self.build_prompt(history, utterance),
                    augment_with_internet: matches!(self, GenerationStrategy::Search),
                };
                let span = info_span!(
                    "gen_ai.text",
                    gen_ai.operation.name = "chat",
                    gen_ai.provider.name = provider.name(),
                    neon.augment_with_internet = request.augment_with_internet,
                    neon.history_window = self.history_window(),
                );
                let content = provider.generate_text(&request).instrument(span).await?;
                Ok(DispatchOutcome {
                    content,
                    media: None,
                })
            }
            GenerationStrategy::Image => {
                let request = ImageRequest {
                    prompt: utterance.to_string(),
                };
                let span = info_span!(
                    "gen_ai.image",
                    gen_ai.operation.name = "generate_image",
                    gen_ai.provider.name = provider.name(),
                );
                let image = provider.generate_image(&request).instrument(span).await?;
                Ok(DispatchOutcome {
                    content: IMAGE_CONFIRMATION.to_string(),
                    media: Some(MediaRef::Single { url: image.url }),
                })
            }
            GenerationStrategy::Video { frames } => {
                let urls = generate_frames(provider, utterance, frames).await?;
                Ok(DispatchOutcome {
                    content: video_confirmation(frames),
                    media: Some(MediaRef::Sequence { urls }),
                })
            }
        }
    }
}

/// Prompt for frame `index` (1-based) of a `frames`-long sequence.
pub fn frame_prompt(utterance: &str, index: u32, frames: u32) -> String {
    format!("{utterance}, frame {index} of {frames}, cinematic sequence, high quality")
}

/// Assistant text attached to a generated frame sequence.
pub fn video_confirmation(frames: u32) -> String {
    format!("Vidéo générée avec {frames} images ! Voici la séquence :")
}

/// Request each frame in order, awaiting one before starting the next.
///
/// Stops at the first failure and drops every URL collected so far.
async fn generate_frames(
    provider: &BoxGenerationProvider,
    utterance: &str,
    frames: u32,
) -> Result<Vec<String>, DispatchError> {
    let mut urls = Vec::with_capacity(frames as usize);

    for index in 1..=frames {
        let request = ImageRequest {
            prompt: frame_prompt(utterance, index, frames),
        };
        let span = info_span!(
            "gen_ai.image",
            gen_ai.operation.name = "generate_image",
            gen_ai.provider.name = provider.name(),
            neon.frame = index,
            neon.frames = frames,
        );

        match provider.generate_image(&request).instrument(span).await {
            Ok(image) => {
                debug!(frame = index, total = frames, "Frame generated");
                urls.push(image.url);
            }
            Err(source) => {
                warn!(
                    frame = index,
                    total = frames,
                    discarded = urls.len(),
                    error = %source,
                    "Frame generation failed, discarding sequence"
                );
                return Err(DispatchError::PartialSequence {
                    completed: index - 1,
                    total: frames,
                    source,
                });
            }
        }
    }

    Ok(urls)
}
