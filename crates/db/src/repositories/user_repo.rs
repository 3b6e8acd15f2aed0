//! Repository for the `users` table.

use pereval_core::submission::UserData;
use sqlx::PgConnection;

use crate::models::user::User;

const COLUMNS: &str = "id, email, first_name, last_name, patronymic, phone, created_at";

pub struct UserRepo;

impl UserRepo {
    /// Return the user registered under `input.email`, inserting it first if absent.
    ///
    /// An existing row is returned untouched even when the submitted names or
    /// phone differ. The no-op `DO UPDATE` makes `RETURNING` yield the existing
    /// row, and `uq_users_email` serializes concurrent first submissions.
    pub async fn upsert_by_email(
        conn: &mut PgConnection,
        input: &UserData,
    ) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (email, first_name, last_name, patronymic, phone) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT ON CONSTRAINT uq_users_email DO UPDATE SET email = EXCLUDED.email \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.email)
            .bind(&input.first_name)
            .bind(&input.last_name)
            .bind(&input.patronymic)
            .bind(&input.phone)
            .fetch_one(conn)
            .await
    }
}
