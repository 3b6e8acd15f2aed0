//! Repository for the `perevals` table and its joined read model.

use std::collections::HashMap;

use pereval_core::submission::PerevalData;
use pereval_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::image::PerevalImage;
use crate::models::pereval::{Pereval, PerevalDetail, PerevalDetailRow};
use crate::repositories::ImageRepo;

const COLUMNS: &str = "id, beauty_title, title, other_titles, connect, latitude, longitude, \
    height, status, user_id, area_id, level_id, add_time, updated_at";

/// Select list and joins producing a [`PerevalDetailRow`].
const DETAIL_SELECT: &str = "SELECT p.id, p.beauty_title, p.title, p.other_titles, p.connect, \
        p.latitude, p.longitude, p.height, p.status, p.add_time, \
        u.email AS user_email, u.first_name AS user_first_name, \
        u.last_name AS user_last_name, u.patronymic AS user_patronymic, \
        u.phone AS user_phone, \
        a.id AS area_id, a.parent_id AS area_parent_id, a.title AS area_title, \
        l.winter AS level_winter, l.summer AS level_summer, \
        l.autumn AS level_autumn, l.spring AS level_spring \
    FROM perevals p \
    JOIN users u ON u.id = p.user_id \
    JOIN areas a ON a.id = p.area_id \
    JOIN levels l ON l.id = p.level_id";

pub struct PerevalRepo;

impl PerevalRepo {
    /// Insert a new pereval in status `new`.
    pub async fn create(
        conn: &mut PgConnection,
        input: &PerevalData,
        user_id: DbId,
        area_id: DbId,
        level_id: DbId,
    ) -> Result<Pereval, sqlx::Error> {
        let query = format!(
            "INSERT INTO perevals \
                (beauty_title, title, other_titles, connect, latitude, longitude, height, \
                 user_id, area_id, level_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Pereval>(&query)
            .bind(&input.beauty_title)
            .bind(&input.title)
            .bind(&input.other_titles)
            .bind(&input.connect)
            .bind(input.coords.latitude)
            .bind(input.coords.longitude)
            .bind(input.coords.height)
            .bind(user_id)
            .bind(area_id)
            .bind(level_id)
            .fetch_one(conn)
            .await
    }

    /// Load a pereval and hold a row lock on it until the transaction ends.
    pub async fn find_for_update(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<Pereval>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM perevals WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Pereval>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// Overwrite the editable fields and the area reference.
    pub async fn update(
        conn: &mut PgConnection,
        id: DbId,
        input: &PerevalData,
        area_id: DbId,
    ) -> Result<Pereval, sqlx::Error> {
        let query = format!(
            "UPDATE perevals SET \
                beauty_title = $2, \
                title = $3, \
                other_titles = $4, \
                connect = $5, \
                latitude = $6, \
                longitude = $7, \
                height = $8, \
                area_id = $9, \
                updated_at = now() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Pereval>(&query)
            .bind(id)
            .bind(&input.beauty_title)
            .bind(&input.title)
            .bind(&input.other_titles)
            .bind(&input.connect)
            .bind(input.coords.latitude)
            .bind(input.coords.longitude)
            .bind(input.coords.height)
            .bind(area_id)
            .fetch_one(conn)
            .await
    }

    /// Pereval with its user, area, level and images.
    pub async fn find_detail(pool: &PgPool, id: DbId) -> Result<Option<PerevalDetail>, sqlx::Error> {
        let query = format!("{DETAIL_SELECT} WHERE p.id = $1");
        let row = sqlx::query_as::<_, PerevalDetailRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        match row {
            Some(row) => {
                let images = ImageRepo::list_by_pereval(pool, row.id).await?;
                Ok(Some(PerevalDetail { row, images }))
            }
            None => Ok(None),
        }
    }

    /// All perevals submitted under `email`, oldest first.
    pub async fn list_details_by_email(
        pool: &PgPool,
        email: &str,
    ) -> Result<Vec<PerevalDetail>, sqlx::Error> {
        let query = format!("{DETAIL_SELECT} WHERE u.email = $1 ORDER BY p.id");
        let rows = sqlx::query_as::<_, PerevalDetailRow>(&query)
            .bind(email)
            .fetch_all(pool)
            .await?;

        let ids: Vec<DbId> = rows.iter().map(|r| r.id).collect();
        let mut images_by_pereval: HashMap<DbId, Vec<PerevalImage>> = HashMap::new();
        for image in ImageRepo::list_by_perevals(pool, &ids).await? {
            images_by_pereval
                .entry(image.pereval_id)
                .or_default()
                .push(image);
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let images = images_by_pereval.remove(&row.id).unwrap_or_default();
                PerevalDetail { row, images }
            })
            .collect())
    }
}
