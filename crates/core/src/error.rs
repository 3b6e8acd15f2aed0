use std::collections::BTreeMap;

use crate::types::DbId;

/// Validation messages keyed by dotted field path (`pereval.coords.latitude`).
pub type FieldErrors = BTreeMap<String, Vec<String>>;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Validation failed for fields: {}", .0.keys().cloned().collect::<Vec<_>>().join(", "))]
    InvalidFields(FieldErrors),

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Image storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
