//! Repository for the `areas` table.

use pereval_core::submission::AreaData;
use sqlx::PgConnection;

use crate::models::area::Area;

const COLUMNS: &str = "id, parent_id, title, created_at";

pub struct AreaRepo;

impl AreaRepo {
    /// Insert a new area. Titles are not deduplicated.
    pub async fn create(conn: &mut PgConnection, input: &AreaData) -> Result<Area, sqlx::Error> {
        let query = format!(
            "INSERT INTO areas (parent_id, title) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Area>(&query)
            .bind(input.parent_id)
            .bind(&input.title)
            .fetch_one(conn)
            .await
    }
}
