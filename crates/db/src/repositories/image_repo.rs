//! Repository for the `pereval_images` table.

use pereval_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::image::PerevalImage;

const COLUMNS: &str = "id, pereval_id, title, file_path, position, date_added";

pub struct ImageRepo;

impl ImageRepo {
    pub async fn create(
        conn: &mut PgConnection,
        pereval_id: DbId,
        title: &str,
        file_path: &str,
        position: i32,
    ) -> Result<PerevalImage, sqlx::Error> {
        let query = format!(
            "INSERT INTO pereval_images (pereval_id, title, file_path, position) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PerevalImage>(&query)
            .bind(pereval_id)
            .bind(title)
            .bind(file_path)
            .bind(position)
            .fetch_one(conn)
            .await
    }

    /// Images of one pereval in submission order.
    pub async fn list_by_pereval(
        pool: &PgPool,
        pereval_id: DbId,
    ) -> Result<Vec<PerevalImage>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM pereval_images WHERE pereval_id = $1 ORDER BY position, id"
        );
        sqlx::query_as::<_, PerevalImage>(&query)
            .bind(pereval_id)
            .fetch_all(pool)
            .await
    }

    /// Images of several perevals, ordered by pereval then position.
    pub async fn list_by_perevals(
        pool: &PgPool,
        pereval_ids: &[DbId],
    ) -> Result<Vec<PerevalImage>, sqlx::Error> {
        if pereval_ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = format!(
            "SELECT {COLUMNS} FROM pereval_images \
             WHERE pereval_id = ANY($1) \
             ORDER BY pereval_id, position, id"
        );
        sqlx::query_as::<_, PerevalImage>(&query)
            .bind(pereval_ids)
            .fetch_all(pool)
            .await
    }

    /// Delete every image row of a pereval, returning the stored file paths.
    pub async fn delete_by_pereval(
        conn: &mut PgConnection,
        pereval_id: DbId,
    ) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>(
            "DELETE FROM pereval_images WHERE pereval_id = $1 RETURNING file_path",
        )
        .bind(pereval_id)
        .fetch_all(conn)
        .await
    }
}
