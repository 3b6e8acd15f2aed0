//! Response envelopes and the nested pereval representation.
//!
//! Two envelope shapes are in use and kept for client compatibility:
//!
//! ```text
//! POST /submitData, GET /submitData/{id}   {"status": 200, "message": null, "id": 1}
//! PATCH /submitData/{id}, list by email    {"state": 1, "message": ""}
//! ```
//!
//! Errors are rendered in the same shape as the endpoint's success body by
//! wrapping [`AppError`] in [`StatusEnvelopeError`] or [`StateEnvelopeError`].

use axum::response::{IntoResponse, Response};
use axum::Json;
use pereval_core::types::{DbId, Timestamp};
use pereval_db::models::image::PerevalImage;
use pereval_db::models::pereval::PerevalDetail;
use serde::Serialize;
use serde_json::Value;

use crate::error::AppError;

// ---------------------------------------------------------------------------
// Envelopes
// ---------------------------------------------------------------------------

/// `{status, message, id}` envelope used by create and get-by-id.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: u16,
    pub message: Option<Value>,
    pub id: Option<DbId>,
}

impl StatusResponse {
    pub fn created(id: DbId) -> Self {
        Self {
            status: 200,
            message: None,
            id: Some(id),
        }
    }
}

/// `{state, message}` envelope used by update and list-by-email.
#[derive(Debug, Serialize)]
pub struct StateResponse {
    pub state: u8,
    pub message: Value,
}

impl StateResponse {
    pub fn ok() -> Self {
        Self {
            state: 1,
            message: Value::from(""),
        }
    }
}

/// Renders an [`AppError`] as `{status: <code>, message, id: null}`.
#[derive(Debug)]
pub struct StatusEnvelopeError(pub AppError);

impl IntoResponse for StatusEnvelopeError {
    fn into_response(self) -> Response {
        let (status, message) = self.0.classify();
        let body = StatusResponse {
            status: status.as_u16(),
            message: Some(message),
            id: None,
        };
        (status, Json(body)).into_response()
    }
}

/// Renders an [`AppError`] as `{state: 0, message}`.
#[derive(Debug)]
pub struct StateEnvelopeError(pub AppError);

impl IntoResponse for StateEnvelopeError {
    fn into_response(self) -> Response {
        let (status, message) = self.0.classify();
        (status, Json(StateResponse { state: 0, message })).into_response()
    }
}

// ---------------------------------------------------------------------------
// Pereval representation
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct PerevalResponse {
    pub id: DbId,
    pub beauty_title: Option<String>,
    pub title: String,
    pub other_titles: Option<String>,
    pub connect: Option<String>,
    pub add_time: Timestamp,
    pub status: String,
    pub user: UserView,
    pub coords: CoordsView,
    pub level: LevelView,
    pub area: AreaView,
    pub images: Vec<ImageView>,
}

#[derive(Debug, Serialize)]
pub struct UserView {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub patronymic: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CoordsView {
    pub latitude: f64,
    pub longitude: f64,
    pub height: i32,
}

#[derive(Debug, Serialize)]
pub struct LevelView {
    pub winter: String,
    pub summer: String,
    pub autumn: String,
    pub spring: String,
}

#[derive(Debug, Serialize)]
pub struct AreaView {
    pub id: DbId,
    pub title: String,
    pub parent_id: Option<DbId>,
}

#[derive(Debug, Serialize)]
pub struct ImageView {
    pub id: DbId,
    pub title: String,
    /// Public URL of the stored file.
    pub data: String,
    pub date_added: Timestamp,
}

impl PerevalResponse {
    /// Build the nested representation; image URLs are rooted at `media_url`.
    pub fn from_detail(detail: PerevalDetail, media_url: &str) -> Self {
        let PerevalDetail { row, images } = detail;
        Self {
            id: row.id,
            beauty_title: row.beauty_title,
            title: row.title,
            other_titles: row.other_titles,
            connect: row.connect,
            add_time: row.add_time,
            status: row.status,
            user: UserView {
                email: row.user_email,
                first_name: row.user_first_name,
                last_name: row.user_last_name,
                patronymic: row.user_patronymic,
                phone: row.user_phone,
            },
            coords: CoordsView {
                latitude: row.latitude,
                longitude: row.longitude,
                height: row.height,
            },
            level: LevelView {
                winter: row.level_winter,
                summer: row.level_summer,
                autumn: row.level_autumn,
                spring: row.level_spring,
            },
            area: AreaView {
                id: row.area_id,
                title: row.area_title,
                parent_id: row.area_parent_id,
            },
            images: images
                .into_iter()
                .map(|image| ImageView::new(image, media_url))
                .collect(),
        }
    }
}

impl ImageView {
    fn new(image: PerevalImage, media_url: &str) -> Self {
        Self {
            id: image.id,
            title: image.title,
            data: media_path(media_url, &image.file_path),
            date_added: image.date_added,
        }
    }
}

fn media_path(media_url: &str, file_path: &str) -> String {
    format!("{}/{}", media_url.trim_end_matches('/'), file_path)
}
