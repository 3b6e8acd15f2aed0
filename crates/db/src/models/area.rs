//! Geographic area. Areas form a tree through `parent_id`.

use pereval_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `areas` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Area {
    pub id: DbId,
    pub parent_id: Option<DbId>,
    pub title: String,
    pub created_at: Timestamp,
}
