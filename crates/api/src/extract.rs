//! Custom extractors.

use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;
use pereval_core::types::DbId;

use crate::error::AppError;
use crate::response::StatusEnvelopeError;

pub const MSG_INVALID_ID: &str = "Некорректный идентификатор перевала";

/// The `{id}` path segment of a pereval route.
///
/// A segment that is not an integer is rejected in the `{status, message, id}`
/// envelope instead of axum's plain-text rejection. Handlers answering in the
/// `{state, message}` envelope take `Result<PerevalId, StatusEnvelopeError>`
/// and rewrap the error.
#[derive(Debug, Clone, Copy)]
pub struct PerevalId(pub DbId);

impl<S> FromRequestParts<S> for PerevalId
where
    S: Send + Sync,
{
    type Rejection = StatusEnvelopeError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<DbId>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                tracing::debug!(error = %rejection, "Rejected pereval id");
                StatusEnvelopeError(AppError::BadRequest(MSG_INVALID_ID.to_string()))
            })?;
        Ok(Self(id))
    }
}
