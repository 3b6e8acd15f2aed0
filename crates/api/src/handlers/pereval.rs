//! Handlers for the `/submitData` resource.
//!
//! Create and get-by-id answer in the `{status, message, id}` envelope;
//! update and list-by-email errors use `{state, message}`.

use axum::extract::{Multipart, Query, State};
use axum::Json;
use pereval_core::error::CoreError;
use pereval_core::submission::{check_submit_images, check_update_images, parse_submission};
use pereval_core::types::DbId;
use pereval_db::manager::PerevalDataManager;
use pereval_db::repositories::PerevalRepo;

use crate::error::{AppError, AppResult};
use crate::extract::PerevalId;
use crate::multipart::read_submission_form;
use crate::query::UserEmailParams;
use crate::response::{
    PerevalResponse, StateEnvelopeError, StateResponse, StatusEnvelopeError, StatusResponse,
};
use crate::state::AppState;

pub const MSG_EMAIL_REQUIRED: &str = "Email обязателен";

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /submitData
///
/// Multipart form: `data` (JSON `{user, area, pereval}`) and `images` files
/// paired positionally with `pereval.images`.
pub async fn create(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<StatusResponse>, StatusEnvelopeError> {
    let id = submit(&state, multipart).await.map_err(StatusEnvelopeError)?;
    Ok(Json(StatusResponse::created(id)))
}

/// GET /submitData/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    PerevalId(id): PerevalId,
) -> Result<Json<PerevalResponse>, StatusEnvelopeError> {
    let detail = PerevalRepo::find_detail(&state.pool, id)
        .await
        .map_err(|e| StatusEnvelopeError(e.into()))?
        .ok_or(StatusEnvelopeError(AppError::Core(CoreError::NotFound {
            entity: "Pereval",
            id,
        })))?;
    Ok(Json(PerevalResponse::from_detail(
        detail,
        &state.config.media_url,
    )))
}

/// GET /submitData/?user__email=<email>
///
/// All perevals submitted under the email, oldest first. An empty list is
/// returned for an unknown email.
pub async fn list_by_email(
    State(state): State<AppState>,
    Query(params): Query<UserEmailParams>,
) -> Result<Json<Vec<PerevalResponse>>, StateEnvelopeError> {
    let email = params
        .user_email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .ok_or_else(|| StateEnvelopeError(AppError::BadRequest(MSG_EMAIL_REQUIRED.into())))?;

    let details = PerevalRepo::list_details_by_email(&state.pool, email)
        .await
        .map_err(|e| StateEnvelopeError(e.into()))?;

    let media_url = &state.config.media_url;
    Ok(Json(
        details
            .into_iter()
            .map(|detail| PerevalResponse::from_detail(detail, media_url))
            .collect(),
    ))
}

/// PATCH /submitData/{id}
///
/// Same form as create. Replaces title, coordinates, level and area; when
/// files are attached the image set is replaced. The submitting user never
/// changes.
pub async fn update(
    State(state): State<AppState>,
    id: Result<PerevalId, StatusEnvelopeError>,
    multipart: Multipart,
) -> Result<Json<StateResponse>, StateEnvelopeError> {
    let PerevalId(id) = id.map_err(|StatusEnvelopeError(err)| StateEnvelopeError(err))?;
    patch(&state, id, multipart)
        .await
        .map_err(StateEnvelopeError)?;
    Ok(Json(StateResponse::ok()))
}

// ---------------------------------------------------------------------------
// Flows
// ---------------------------------------------------------------------------

async fn submit(state: &AppState, mut multipart: Multipart) -> AppResult<DbId> {
    let form = read_submission_form(&mut multipart).await?;
    let data = parse_submission(form.payload())?;
    check_submit_images(data.pereval.images.len(), form.images.len())?;

    let pereval =
        PerevalDataManager::submit_data(&state.pool, &state.image_store, &data, &form.images)
            .await?;
    Ok(pereval.id)
}

async fn patch(state: &AppState, id: DbId, mut multipart: Multipart) -> AppResult<()> {
    let form = read_submission_form(&mut multipart).await?;
    let data = parse_submission(form.payload())?;
    check_update_images(data.pereval.images.len(), form.images.len())?;

    PerevalDataManager::patch_pereval(&state.pool, &state.image_store, id, &data, &form.images)
        .await?;
    Ok(())
}
