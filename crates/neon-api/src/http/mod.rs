//! REST API over the conversation catalog and engine.

pub mod error;
pub mod handlers;
pub mod response;
pub mod router;
