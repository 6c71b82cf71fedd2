//! HTTP request handlers, one module per resource.

pub mod conversation;
pub mod events;
pub mod stats;
pub mod turn;

use uuid::Uuid;

use neon_types::conversation::Modality;

use crate::http::error::AppError;

/// Parse a UUID from a path or query parameter, returning 400 on bad input.
pub(crate) fn parse_uuid(s: &str) -> Result<Uuid, AppError> {
    s.parse::<Uuid>()
        .map_err(|_| AppError::Validation(format!("Invalid UUID: {s}")))
}

pub(crate) fn parse_modality(s: &str) -> Result<Modality, AppError> {
    s.parse::<Modality>().map_err(AppError::Validation)
}

pub(crate) fn conversation_href(id: &Uuid) -> String {
    format!("/api/v1/conversations/{id}")
}
