#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use pereval_core::image_store::LocalImageStore;
use pereval_core::status::PerevalStatus;
use sqlx::PgPool;
use tower::ServiceExt;

use pereval_api::config::ServerConfig;
use pereval_api::router::build_app_router;
use pereval_api::state::AppState;

const BOUNDARY: &str = "pereval-test-boundary";

/// Build a test `ServerConfig` with safe defaults, storing images under `media_root`.
pub fn test_config(media_root: &Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        media_root: media_root.to_path_buf(),
        media_url: "/media".to_string(),
        max_upload_bytes: 10 * 1024 * 1024,
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool.
pub fn build_test_app(pool: PgPool, media_root: &Path) -> Router {
    let config = test_config(media_root);
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        image_store: Arc::new(LocalImageStore::new(media_root)),
    };
    build_app_router(state, &config)
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body is JSON")
}

pub async fn get(app: Router, uri: &str) -> Response {
    app.oneshot(
        Request::builder()
            .method(Method::GET)
            .uri(uri)
            .body(Body::empty())
            .expect("request"),
    )
    .await
    .expect("infallible")
}

/// One file part of a multipart body.
pub struct FilePart<'a> {
    pub field: &'a str,
    pub file_name: &'a str,
    pub bytes: &'a [u8],
}

pub fn image(file_name: &str) -> FilePart<'_> {
    FilePart {
        field: "images",
        file_name,
        bytes: file_name.as_bytes(),
    }
}

/// Encode a `multipart/form-data` body with an optional `data` field and files.
pub fn multipart_body(data: Option<&str>, files: &[FilePart<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    if let Some(data) = data {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"data\"\r\n\r\n{data}\r\n"
            )
            .as_bytes(),
        );
    }
    for file in files {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                 Content-Type: image/jpeg\r\n\r\n",
                file.field, file.file_name
            )
            .as_bytes(),
        );
        body.extend_from_slice(file.bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub async fn send_multipart(
    app: Router,
    method: Method,
    uri: &str,
    data: Option<&str>,
    files: &[FilePart<'_>],
) -> Response {
    app.oneshot(
        Request::builder()
            .method(method)
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(multipart_body(data, files)))
            .expect("request"),
    )
    .await
    .expect("infallible")
}

pub async fn post_submission(
    app: Router,
    data: &serde_json::Value,
    files: &[FilePart<'_>],
) -> Response {
    send_multipart(app, Method::POST, "/submitData", Some(&data.to_string()), files).await
}

pub async fn patch_submission(
    app: Router,
    id: i64,
    data: &serde_json::Value,
    files: &[FilePart<'_>],
) -> Response {
    send_multipart(
        app,
        Method::PATCH,
        &format!("/submitData/{id}"),
        Some(&data.to_string()),
        files,
    )
    .await
}

/// A complete, valid submission payload.
pub fn valid_payload(email: &str) -> serde_json::Value {
    serde_json::json!({
        "user": {
            "email": email,
            "first_name": "Ivan",
            "last_name": "Petrov",
            "patronymic": "Sergeevich",
            "phone": "+79001234567"
        },
        "area": { "title": "Altai", "parent_id": null },
        "pereval": {
            "beauty_title": "per.",
            "title": "Katu-Yaryk",
            "other_titles": "Katu",
            "connect": "",
            "coords": { "latitude": 50.9, "longitude": 88.2, "height": 1200 },
            "level": { "winter": "2A", "summer": "1A", "autumn": "1B", "spring": "" }
        }
    })
}

/// Moderation happens outside the API; tests move records by hand.
pub async fn set_status(pool: &PgPool, id: i64, status: PerevalStatus) {
    sqlx::query("UPDATE perevals SET status = $2 WHERE id = $1")
        .bind(id)
        .bind(status.as_str())
        .execute(pool)
        .await
        .expect("set status");
}

pub async fn count_rows(pool: &PgPool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await
        .expect("count rows")
}
