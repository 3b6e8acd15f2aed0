//! Transactional orchestration of a submission: user lookup-or-create, area,
//! level, pereval and image rows, written together or not at all.
//!
//! Image files are written to the [`LocalImageStore`] while the transaction
//! is open. If the transaction fails, the files written for that request are
//! removed again; files replaced by a successful update are removed after
//! commit.

use pereval_core::error::CoreError;
use pereval_core::image_store::{LocalImageStore, UploadedImage};
use pereval_core::status::PerevalStatus;
use pereval_core::submission::{AreaData, ImageMeta, PerevalData, SubmitData};
use pereval_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::area::Area;
use crate::models::pereval::Pereval;
use crate::repositories::{AreaRepo, ImageRepo, LevelRepo, PerevalRepo, UserRepo};

pub const MSG_NOT_EDITABLE: &str =
    "Редактирование доступно только для перевалов в статусе new";

#[derive(Debug, thiserror::Error)]
pub enum ManagerError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub struct PerevalDataManager;

impl PerevalDataManager {
    /// Insert a new area from validated data. Titles are not deduplicated.
    pub async fn create_area(conn: &mut PgConnection, area: &AreaData) -> Result<Area, sqlx::Error> {
        AreaRepo::create(conn, area).await
    }

    /// Persist a validated submission and return the new pereval.
    ///
    /// `image_files[i]` is paired with `data.pereval.images[i]`; the caller has
    /// already checked the counts.
    pub async fn submit_data(
        pool: &PgPool,
        store: &LocalImageStore,
        data: &SubmitData,
        image_files: &[UploadedImage],
    ) -> Result<Pereval, ManagerError> {
        let mut saved = Vec::new();
        let result = Self::submit_in_transaction(pool, store, data, image_files, &mut saved).await;
        if result.is_err() {
            discard_files(store, &saved).await;
        }
        result
    }

    async fn submit_in_transaction(
        pool: &PgPool,
        store: &LocalImageStore,
        data: &SubmitData,
        image_files: &[UploadedImage],
        saved: &mut Vec<String>,
    ) -> Result<Pereval, ManagerError> {
        let mut tx = pool.begin().await?;

        let user = UserRepo::upsert_by_email(&mut *tx, &data.user).await?;
        let area = Self::create_area(&mut *tx, &data.area).await?;
        let level = LevelRepo::create(&mut *tx, &data.pereval.level).await?;
        let pereval =
            PerevalRepo::create(&mut *tx, &data.pereval, user.id, area.id, level.id).await?;

        attach_images(
            &mut *tx,
            store,
            pereval.id,
            &data.pereval.images,
            image_files,
            saved,
        )
        .await?;

        tx.commit().await?;

        tracing::info!(
            pereval_id = pereval.id,
            user_id = user.id,
            area_id = area.id,
            images = image_files.len(),
            "Pereval submitted",
        );

        Ok(pereval)
    }

    /// Apply a validated update to an existing pereval inside the caller's transaction.
    ///
    /// Fails with `NotFound` when the pereval does not exist and with a
    /// validation error when it is no longer editable. When `image_files` is
    /// non-empty the existing images are replaced; the paths of the replaced
    /// files are returned so the caller can delete them once committed. The
    /// owning user is never changed.
    pub async fn update_pereval(
        conn: &mut PgConnection,
        store: &LocalImageStore,
        pereval_id: DbId,
        pereval_data: &PerevalData,
        area: &Area,
        image_files: &[UploadedImage],
        saved: &mut Vec<String>,
    ) -> Result<Vec<String>, ManagerError> {
        let current = PerevalRepo::find_for_update(&mut *conn, pereval_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Pereval",
                id: pereval_id,
            })?;

        let status: PerevalStatus = current.status.parse()?;
        if !status.is_editable() {
            return Err(CoreError::Validation(MSG_NOT_EDITABLE.to_string()).into());
        }

        LevelRepo::update(&mut *conn, current.level_id, &pereval_data.level).await?;
        PerevalRepo::update(&mut *conn, pereval_id, pereval_data, area.id).await?;

        let mut replaced = Vec::new();
        if !image_files.is_empty() {
            replaced = ImageRepo::delete_by_pereval(&mut *conn, pereval_id).await?;
            attach_images(
                &mut *conn,
                store,
                pereval_id,
                &pereval_data.images,
                image_files,
                saved,
            )
            .await?;
        }

        Ok(replaced)
    }

    /// PATCH flow: existence check, new area, field update, image replacement,
    /// all in one transaction. A missing pereval is reported before any area
    /// is written.
    pub async fn patch_pereval(
        pool: &PgPool,
        store: &LocalImageStore,
        pereval_id: DbId,
        data: &SubmitData,
        image_files: &[UploadedImage],
    ) -> Result<(), ManagerError> {
        let mut saved = Vec::new();
        let result =
            Self::patch_in_transaction(pool, store, pereval_id, data, image_files, &mut saved)
                .await;

        match result {
            Ok(replaced) => {
                discard_files(store, &replaced).await;
                Ok(())
            }
            Err(err) => {
                discard_files(store, &saved).await;
                Err(err)
            }
        }
    }

    async fn patch_in_transaction(
        pool: &PgPool,
        store: &LocalImageStore,
        pereval_id: DbId,
        data: &SubmitData,
        image_files: &[UploadedImage],
        saved: &mut Vec<String>,
    ) -> Result<Vec<String>, ManagerError> {
        let mut tx = pool.begin().await?;

        if PerevalRepo::find_for_update(&mut *tx, pereval_id)
            .await?
            .is_none()
        {
            return Err(CoreError::NotFound {
                entity: "Pereval",
                id: pereval_id,
            }
            .into());
        }

        let area = Self::create_area(&mut *tx, &data.area).await?;
        let replaced = Self::update_pereval(
            &mut *tx,
            store,
            pereval_id,
            &data.pereval,
            &area,
            image_files,
            saved,
        )
        .await?;

        tx.commit().await?;

        tracing::info!(
            pereval_id,
            area_id = area.id,
            images = image_files.len(),
            replaced_images = replaced.len(),
            "Pereval updated",
        );

        Ok(replaced)
    }
}

/// Store each file and insert its row; `files[i]` takes the title of `metas[i]`.
async fn attach_images(
    conn: &mut PgConnection,
    store: &LocalImageStore,
    pereval_id: DbId,
    metas: &[ImageMeta],
    files: &[UploadedImage],
    saved: &mut Vec<String>,
) -> Result<(), ManagerError> {
    for (position, file) in files.iter().enumerate() {
        let title = metas
            .get(position)
            .and_then(|meta| meta.title.as_deref())
            .unwrap_or_default();

        let path = store.save(file).await?;
        saved.push(path.clone());

        let position = i32::try_from(position)
            .map_err(|_| CoreError::Validation("Слишком много изображений".to_string()))?;
        ImageRepo::create(&mut *conn, pereval_id, title, &path, position).await?;
    }
    Ok(())
}

async fn discard_files(store: &LocalImageStore, paths: &[String]) {
    for path in paths {
        if let Err(e) = store.remove(path).await {
            tracing::warn!(path = %path, error = %e, "Failed to remove image file");
        }
    }
}
