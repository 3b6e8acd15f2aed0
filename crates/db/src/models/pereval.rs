//! Pereval (mountain pass) rows and the joined read model.

use pereval_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

use crate::models::image::PerevalImage;

/// A row from the `perevals` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Pereval {
    pub id: DbId,
    pub beauty_title: Option<String>,
    pub title: String,
    pub other_titles: Option<String>,
    pub connect: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub height: i32,
    pub status: String,
    pub user_id: DbId,
    pub area_id: DbId,
    pub level_id: DbId,
    pub add_time: Timestamp,
    pub updated_at: Timestamp,
}

/// One pereval joined with its user, area and level.
#[derive(Debug, Clone, FromRow)]
pub struct PerevalDetailRow {
    pub id: DbId,
    pub beauty_title: Option<String>,
    pub title: String,
    pub other_titles: Option<String>,
    pub connect: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub height: i32,
    pub status: String,
    pub add_time: Timestamp,
    pub user_email: String,
    pub user_first_name: String,
    pub user_last_name: String,
    pub user_patronymic: Option<String>,
    pub user_phone: Option<String>,
    pub area_id: DbId,
    pub area_parent_id: Option<DbId>,
    pub area_title: String,
    pub level_winter: String,
    pub level_summer: String,
    pub level_autumn: String,
    pub level_spring: String,
}

/// Full nested representation of a pereval.
#[derive(Debug, Clone)]
pub struct PerevalDetail {
    pub row: PerevalDetailRow,
    pub images: Vec<PerevalImage>,
}
