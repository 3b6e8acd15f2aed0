use pereval_core::types::DbId;
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `levels` table. Owned by exactly one pereval.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Level {
    pub id: DbId,
    pub winter: String,
    pub summer: String,
    pub autumn: String,
    pub spring: String,
}
