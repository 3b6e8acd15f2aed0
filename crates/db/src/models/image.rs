use pereval_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `pereval_images` table.
///
/// `file_path` is relative to the image store root; `position` preserves the
/// order in which files were submitted.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PerevalImage {
    pub id: DbId,
    pub pereval_id: DbId,
    pub title: String,
    pub file_path: String,
    pub position: i32,
    pub date_added: Timestamp,
}
