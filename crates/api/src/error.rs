use axum::http::StatusCode;
use pereval_core::error::CoreError;
use pereval_db::manager::ManagerError;
use serde_json::Value;

pub const MSG_NOT_FOUND: &str = "Перевал не найден";
pub const MSG_DATABASE_UNAVAILABLE: &str = "Ошибка подключения к базе данных";
pub const MSG_RELATED_NOT_FOUND: &str = "Связанная запись не найдена";
pub const MSG_IMAGE_STORAGE: &str = "Ошибка сохранения изображения";

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Handlers render it through one of the envelopes in [`crate::response`],
/// which decide the JSON shape; [`AppError::classify`] decides status and message.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `pereval_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<ManagerError> for AppError {
    fn from(err: ManagerError) -> Self {
        match err {
            ManagerError::Core(core) => AppError::Core(core),
            ManagerError::Database(db) => AppError::Database(db),
        }
    }
}

impl AppError {
    /// HTTP status and the `message` value for the response envelope.
    ///
    /// The message is a string except for field validation failures, where it
    /// is an object mapping field path to its messages.
    pub fn classify(&self) -> (StatusCode, Value) {
        match self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => {
                    tracing::debug!(entity, id, "Entity not found");
                    (StatusCode::NOT_FOUND, Value::from(MSG_NOT_FOUND))
                }
                CoreError::Validation(msg) | CoreError::MalformedPayload(msg) => {
                    (StatusCode::BAD_REQUEST, Value::from(msg.as_str()))
                }
                CoreError::InvalidFields(fields) => (
                    StatusCode::BAD_REQUEST,
                    serde_json::to_value(fields).unwrap_or(Value::Null),
                ),
                CoreError::Storage(msg) => {
                    tracing::error!(error = %msg, "Image storage error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Value::from(MSG_IMAGE_STORAGE),
                    )
                }
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Value::from(format!("Ошибка сервера: {msg}")),
                    )
                }
            },

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(err),

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, Value::from(msg.as_str())),
        }
    }
}

/// Classify a sqlx error into an HTTP status and message.
///
/// - `RowNotFound` maps to 404.
/// - Foreign key (23503) and check (23514) violations map to 400: the payload
///   referenced something that does not exist or broke a column constraint.
/// - Everything else means the storage engine is unavailable and maps to 500.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, Value) {
    match err {
        sqlx::Error::RowNotFound => (StatusCode::NOT_FOUND, Value::from(MSG_NOT_FOUND)),
        sqlx::Error::Database(db_err) => {
            match db_err.code().as_deref() {
                Some("23503") => {
                    return (StatusCode::BAD_REQUEST, Value::from(MSG_RELATED_NOT_FOUND));
                }
                Some("23514") => {
                    let constraint = db_err.constraint().unwrap_or("unknown");
                    return (
                        StatusCode::BAD_REQUEST,
                        Value::from(format!("Нарушено ограничение {constraint}")),
                    );
                }
                _ => {}
            }
            tracing::error!(error = %db_err, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Value::from(MSG_DATABASE_UNAVAILABLE),
            )
        }
        other => {
            tracing::error!(error = %other, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Value::from(MSG_DATABASE_UNAVAILABLE),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn not_found_maps_to_404_with_russian_message() {
        let err = AppError::Core(CoreError::NotFound {
            entity: "Pereval",
            id: 7,
        });
        let (status, message) = err.classify();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(message, MSG_NOT_FOUND);
    }

    #[test]
    fn field_errors_become_an_object() {
        let mut fields = BTreeMap::new();
        fields.insert("user.email".to_string(), vec!["Обязательное поле.".to_string()]);
        let (status, message) = AppError::Core(CoreError::InvalidFields(fields)).classify();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(message["user.email"][0], "Обязательное поле.");
    }

    #[test]
    fn malformed_payload_is_bad_request() {
        let (status, message) =
            AppError::Core(CoreError::MalformedPayload("bad json".into())).classify();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(message, "bad json");
    }

    #[test]
    fn pool_failures_are_storage_unavailable() {
        let (status, message) = AppError::Database(sqlx::Error::PoolTimedOut).classify();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(message, MSG_DATABASE_UNAVAILABLE);
    }

    #[test]
    fn manager_errors_keep_their_kind() {
        let err: AppError = ManagerError::Core(CoreError::Validation("no".into())).into();
        assert_eq!(err.classify().0, StatusCode::BAD_REQUEST);

        let err: AppError = ManagerError::Database(sqlx::Error::RowNotFound).into();
        assert_eq!(err.classify().0, StatusCode::NOT_FOUND);
    }
}
