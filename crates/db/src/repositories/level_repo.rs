//! Repository for the `levels` table.

use pereval_core::submission::LevelData;
use pereval_core::types::DbId;
use sqlx::PgConnection;

use crate::models::level::Level;

const COLUMNS: &str = "id, winter, summer, autumn, spring";

pub struct LevelRepo;

impl LevelRepo {
    pub async fn create(conn: &mut PgConnection, input: &LevelData) -> Result<Level, sqlx::Error> {
        let query = format!(
            "INSERT INTO levels (winter, summer, autumn, spring) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Level>(&query)
            .bind(&input.winter)
            .bind(&input.summer)
            .bind(&input.autumn)
            .bind(&input.spring)
            .fetch_one(conn)
            .await
    }

    /// Overwrite all four ratings of an existing level.
    pub async fn update(
        conn: &mut PgConnection,
        id: DbId,
        input: &LevelData,
    ) -> Result<Level, sqlx::Error> {
        let query = format!(
            "UPDATE levels SET winter = $2, summer = $3, autumn = $4, spring = $5 \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Level>(&query)
            .bind(id)
            .bind(&input.winter)
            .bind(&input.summer)
            .bind(&input.autumn)
            .bind(&input.spring)
            .fetch_one(conn)
            .await
    }
}
