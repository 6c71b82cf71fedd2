//! Conversation context & dispatch.
//!
//! - [`window`]: turns a history snapshot and a new utterance into one bounded prompt
//! - [`strategy`]: the closed set of generation strategies keyed by modality

pub mod strategy;
pub mod window;

pub use strategy::{DispatchError, DispatchOutcome, GenerationStrategy};
pub use window::PromptTemplate;
