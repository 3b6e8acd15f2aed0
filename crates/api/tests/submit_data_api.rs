//! HTTP-level integration tests for the `/submitData` endpoints.
//!
//! Uses Axum's `tower::ServiceExt` to send multipart requests directly to the
//! router without an actual TCP listener.

mod common;

use axum::http::{Method, StatusCode};
use common::{
    body_json, count_rows, get, image, patch_submission, post_submission, send_multipart,
    valid_payload,
};
use pereval_core::status::PerevalStatus;
use serde_json::json;
use sqlx::PgPool;

async fn create(pool: &PgPool, media: &std::path::Path, payload: &serde_json::Value) -> i64 {
    let app = common::build_test_app(pool.clone(), media);
    let response = post_submission(app, payload, &[]).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["id"].as_i64().expect("id")
}

// ---------------------------------------------------------------------------
// POST /submitData
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn submit_valid_payload_returns_id(pool: PgPool) {
    let media = tempfile::tempdir().expect("tempdir");
    let app = common::build_test_app(pool, media.path());

    let response = post_submission(app, &valid_payload("a@example.com"), &[]).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], 200);
    assert!(json["message"].is_null());
    assert!(json["id"].as_i64().unwrap() > 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn submit_twice_with_same_email_keeps_one_user(pool: PgPool) {
    let media = tempfile::tempdir().expect("tempdir");
    let first = create(&pool, media.path(), &valid_payload("same@example.com")).await;

    let mut second_payload = valid_payload("same@example.com");
    second_payload["user"]["first_name"] = json!("Someone else");
    let second = create(&pool, media.path(), &second_payload).await;
    assert_ne!(first, second);

    let users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = $1")
        .bind("same@example.com")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(users, 1);

    let app = common::build_test_app(pool, media.path());
    let json = body_json(get(app, &format!("/submitData/{second}")).await).await;
    assert_eq!(json["user"]["first_name"], "Ivan");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn submit_with_images_stores_them_in_order(pool: PgPool) {
    let media = tempfile::tempdir().expect("tempdir");
    let mut payload = valid_payload("img@example.com");
    payload["pereval"]["images"] = json!([{ "title": "Saddle" }, { "title": "Approach" }]);

    let app = common::build_test_app(pool.clone(), media.path());
    let response = post_submission(app, &payload, &[image("saddle.jpg"), image("approach.jpg")]).await;
    assert_eq!(response.status(), StatusCode::OK);
    let id = body_json(response).await["id"].as_i64().unwrap();

    let app = common::build_test_app(pool.clone(), media.path());
    let json = body_json(get(app, &format!("/submitData/{id}")).await).await;
    let images = json["images"].as_array().unwrap();
    assert_eq!(images.len(), 2);
    assert_eq!(images[0]["title"], "Saddle");
    assert_eq!(images[1]["title"], "Approach");

    // The stored file is served back under the media URL.
    let url = images[0]["data"].as_str().unwrap().to_string();
    assert!(url.starts_with("/media/perevals/"));
    let app = common::build_test_app(pool, media.path());
    let response = get(app, &url).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn submit_accepts_bracketed_images_field(pool: PgPool) {
    let media = tempfile::tempdir().expect("tempdir");
    let mut payload = valid_payload("br@example.com");
    payload["pereval"]["images"] = json!([{ "title": "One" }]);

    let app = common::build_test_app(pool, media.path());
    let file = common::FilePart {
        field: "images[]",
        file_name: "one.jpg",
        bytes: b"jpeg",
    };
    let response = post_submission(app, &payload, &[file]).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn submit_missing_required_fields_returns_400(pool: PgPool) {
    let media = tempfile::tempdir().expect("tempdir");

    for (section, field) in [
        ("pereval", "title"),
        ("user", "email"),
        ("user", "first_name"),
        ("user", "last_name"),
    ] {
        let mut payload = valid_payload("missing@example.com");
        payload[section].as_object_mut().unwrap().remove(field);

        let app = common::build_test_app(pool.clone(), media.path());
        let response = post_submission(app, &payload, &[]).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{section}.{field}");

        let json = body_json(response).await;
        assert_eq!(json["status"], 400);
        assert!(json["id"].is_null());
        assert!(
            json["message"].get(format!("{section}.{field}")).is_some(),
            "error should name {section}.{field}: {json}"
        );
    }
}

#[sqlx::test(migrations = "../db/migrations")]
async fn submit_out_of_range_coords_names_each_field(pool: PgPool) {
    let media = tempfile::tempdir().expect("tempdir");

    for (field, value) in [("latitude", json!(95)), ("longitude", json!(200)), ("height", json!(-1))] {
        let mut payload = valid_payload("coords@example.com");
        payload["pereval"]["coords"][field] = value;

        let app = common::build_test_app(pool.clone(), media.path());
        let response = post_submission(app, &payload, &[]).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let message = &body_json(response).await["message"];
        let key = format!("pereval.coords.{field}");
        assert!(message.get(&key).is_some(), "expected {key} in {message}");
        assert_eq!(message.as_object().unwrap().len(), 1);
    }
}

#[sqlx::test(migrations = "../db/migrations")]
async fn submit_whitespace_title_is_rejected(pool: PgPool) {
    let media = tempfile::tempdir().expect("tempdir");
    let mut payload = valid_payload("blank@example.com");
    payload["pereval"]["title"] = json!("   ");

    let app = common::build_test_app(pool.clone(), media.path());
    let response = post_submission(app, &payload, &[]).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["message"]["pereval.title"].is_array());
    assert_eq!(count_rows(&pool, "perevals").await, 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn submit_accepts_numbers_sent_as_strings(pool: PgPool) {
    let media = tempfile::tempdir().expect("tempdir");
    let mut payload = valid_payload("strings@example.com");
    payload["pereval"]["coords"] =
        json!({ "latitude": "50.9", "longitude": "88.2", "height": "1200" });
    payload["pereval"]["level"]["winter"] = json!(2);
    let id = create(&pool, media.path(), &payload).await;

    let app = common::build_test_app(pool, media.path());
    let json = body_json(get(app, &format!("/submitData/{id}")).await).await;
    assert_eq!(json["coords"]["latitude"], 50.9);
    assert_eq!(json["coords"]["longitude"], 88.2);
    assert_eq!(json["coords"]["height"], 1200);
    assert_eq!(json["level"]["winter"], "2");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn submit_reports_type_errors_with_other_violations(pool: PgPool) {
    let media = tempfile::tempdir().expect("tempdir");
    let mut payload = valid_payload("types@example.com");
    payload["pereval"]["coords"]["latitude"] = json!("north");
    payload["user"]["first_name"] = json!("   ");

    let app = common::build_test_app(pool.clone(), media.path());
    let response = post_submission(app, &payload, &[]).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let message = &body_json(response).await["message"];
    assert!(message["pereval.coords.latitude"].is_array(), "{message}");
    assert!(message["user.first_name"].is_array(), "{message}");
    assert!(message.get("non_field_errors").is_none());
    assert_eq!(count_rows(&pool, "users").await, 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn submit_stores_trimmed_names(pool: PgPool) {
    let media = tempfile::tempdir().expect("tempdir");
    let mut payload = valid_payload("trim@example.com");
    payload["user"]["first_name"] = json!("  Ivan ");
    payload["area"]["title"] = json!(" Altai  ");
    let id = create(&pool, media.path(), &payload).await;

    let app = common::build_test_app(pool, media.path());
    let json = body_json(get(app, &format!("/submitData/{id}")).await).await;
    assert_eq!(json["user"]["first_name"], "Ivan");
    assert_eq!(json["area"]["title"], "Altai");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn submit_image_count_mismatch_returns_400(pool: PgPool) {
    let media = tempfile::tempdir().expect("tempdir");
    let mut payload = valid_payload("count@example.com");
    payload["pereval"]["images"] = json!([{ "title": "One" }, { "title": "Two" }]);

    let app = common::build_test_app(pool.clone(), media.path());
    let response = post_submission(app, &payload, &[image("one.jpg")]).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(
        json["message"],
        "Количество загруженных файлов не совпадает с количеством заголовков"
    );
    assert!(json["id"].is_null());
    assert_eq!(count_rows(&pool, "perevals").await, 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn submit_malformed_json_returns_400(pool: PgPool) {
    let media = tempfile::tempdir().expect("tempdir");
    let app = common::build_test_app(pool, media.path());

    let response = send_multipart(app, Method::POST, "/submitData", Some("{not json"), &[]).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["status"], 400);
    assert_eq!(json["message"], "Некорректный формат JSON в поле data");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn submit_without_data_field_reports_required_fields(pool: PgPool) {
    let media = tempfile::tempdir().expect("tempdir");
    let app = common::build_test_app(pool, media.path());

    let response = send_multipart(app, Method::POST, "/submitData", None, &[]).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert!(json["message"]["user.email"].is_array());
    assert!(json["message"]["pereval.title"].is_array());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn submit_unknown_parent_area_returns_400(pool: PgPool) {
    let media = tempfile::tempdir().expect("tempdir");
    let mut payload = valid_payload("parent@example.com");
    payload["area"]["parent_id"] = json!(987_654);

    let app = common::build_test_app(pool.clone(), media.path());
    let response = post_submission(app, &payload, &[]).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(count_rows(&pool, "users").await, 0);
}

// ---------------------------------------------------------------------------
// GET /submitData/{id}
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn get_returns_nested_representation(pool: PgPool) {
    let media = tempfile::tempdir().expect("tempdir");
    let id = create(&pool, media.path(), &valid_payload("get@example.com")).await;

    let app = common::build_test_app(pool, media.path());
    let response = get(app, &format!("/submitData/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["id"], id);
    assert_eq!(json["title"], "Katu-Yaryk");
    assert_eq!(json["status"], "new");
    assert_eq!(json["user"]["email"], "get@example.com");
    assert_eq!(json["user"]["patronymic"], "Sergeevich");
    assert_eq!(json["area"]["title"], "Altai");
    assert!(json["area"]["parent_id"].is_null());
    assert_eq!(json["coords"]["latitude"], 50.9);
    assert_eq!(json["coords"]["height"], 1200);
    assert_eq!(json["level"]["winter"], "2A");
    assert_eq!(json["images"], json!([]));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn get_nonexistent_returns_404_with_null_id(pool: PgPool) {
    let media = tempfile::tempdir().expect("tempdir");
    let app = common::build_test_app(pool, media.path());

    let response = get(app, "/submitData/999999").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = body_json(response).await;
    assert_eq!(
        json,
        json!({"status": 404, "message": "Перевал не найден", "id": null})
    );
}

#[sqlx::test(migrations = "../db/migrations")]
async fn get_non_numeric_id_returns_json_400(pool: PgPool) {
    let media = tempfile::tempdir().expect("tempdir");
    let app = common::build_test_app(pool, media.path());

    let response = get(app, "/submitData/abc").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await,
        json!({"status": 400, "message": "Некорректный идентификатор перевала", "id": null})
    );
}

// ---------------------------------------------------------------------------
// GET /submitData/?user__email=
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn list_without_email_returns_400(pool: PgPool) {
    let media = tempfile::tempdir().expect("tempdir");

    for uri in ["/submitData/", "/submitData/?user__email=", "/submitData?user__email=%20"] {
        let app = common::build_test_app(pool.clone(), media.path());
        let response = get(app, uri).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");

        let json = body_json(response).await;
        assert_eq!(json, json!({"state": 0, "message": "Email обязателен"}));
    }
}

#[sqlx::test(migrations = "../db/migrations")]
async fn list_unknown_email_returns_empty_array(pool: PgPool) {
    let media = tempfile::tempdir().expect("tempdir");
    let app = common::build_test_app(pool, media.path());

    let response = get(app, "/submitData/?user__email=nobody@example.com").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!([]));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn list_returns_only_that_users_perevals(pool: PgPool) {
    let media = tempfile::tempdir().expect("tempdir");
    let first = create(&pool, media.path(), &valid_payload("mine@example.com")).await;
    let second = create(&pool, media.path(), &valid_payload("mine@example.com")).await;
    create(&pool, media.path(), &valid_payload("theirs@example.com")).await;

    let app = common::build_test_app(pool, media.path());
    let response = get(app, "/submitData/?user__email=mine@example.com").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let ids: Vec<i64> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![first, second]);
}

// ---------------------------------------------------------------------------
// PATCH /submitData/{id}
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn patch_updates_record(pool: PgPool) {
    let media = tempfile::tempdir().expect("tempdir");
    let id = create(&pool, media.path(), &valid_payload("patch@example.com")).await;

    let mut payload = valid_payload("patch@example.com");
    payload["pereval"]["title"] = json!("Renamed");
    payload["pereval"]["coords"]["height"] = json!(3100);
    payload["area"]["title"] = json!("Sayan");

    let app = common::build_test_app(pool.clone(), media.path());
    let response = patch_submission(app, id, &payload, &[]).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({"state": 1, "message": ""}));

    let app = common::build_test_app(pool, media.path());
    let json = body_json(get(app, &format!("/submitData/{id}")).await).await;
    assert_eq!(json["title"], "Renamed");
    assert_eq!(json["coords"]["height"], 3100);
    assert_eq!(json["area"]["title"], "Sayan");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn patch_nonexistent_returns_404_without_creating_area(pool: PgPool) {
    let media = tempfile::tempdir().expect("tempdir");
    let areas_before = count_rows(&pool, "areas").await;

    let app = common::build_test_app(pool.clone(), media.path());
    let response = patch_submission(app, 999_999, &valid_payload("x@example.com"), &[]).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_json(response).await,
        json!({"state": 0, "message": "Перевал не найден"})
    );
    assert_eq!(count_rows(&pool, "areas").await, areas_before);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn patch_image_count_rules(pool: PgPool) {
    let media = tempfile::tempdir().expect("tempdir");
    let id = create(&pool, media.path(), &valid_payload("imgpatch@example.com")).await;

    let mut payload = valid_payload("imgpatch@example.com");
    payload["pereval"]["images"] = json!([{ "title": "One" }, { "title": "Two" }]);

    let app = common::build_test_app(pool.clone(), media.path());
    let response = patch_submission(app, id, &payload, &[]).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["message"], "Файлы изображений не переданы");

    let app = common::build_test_app(pool.clone(), media.path());
    let response = patch_submission(app, id, &payload, &[image("one.jpg")]).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["state"], 0);
    assert_eq!(
        json["message"],
        "Количество загруженных файлов не совпадает с количеством заголовков"
    );

    let app = common::build_test_app(pool, media.path());
    let response = patch_submission(app, id, &payload, &[image("one.jpg"), image("two.jpg")]).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn patch_invalid_payload_returns_state_zero(pool: PgPool) {
    let media = tempfile::tempdir().expect("tempdir");
    let id = create(&pool, media.path(), &valid_payload("inv@example.com")).await;

    let mut payload = valid_payload("inv@example.com");
    payload["pereval"]["coords"]["latitude"] = json!(-91);

    let app = common::build_test_app(pool, media.path());
    let response = patch_submission(app, id, &payload, &[]).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["state"], 0);
    assert!(json["message"]["pereval.coords.latitude"].is_array());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn patch_moderated_pereval_is_refused(pool: PgPool) {
    let media = tempfile::tempdir().expect("tempdir");
    let id = create(&pool, media.path(), &valid_payload("mod@example.com")).await;
    common::set_status(&pool, id, PerevalStatus::Pending).await;

    let mut payload = valid_payload("mod@example.com");
    payload["pereval"]["title"] = json!("Changed");

    let app = common::build_test_app(pool.clone(), media.path());
    let response = patch_submission(app, id, &payload, &[]).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["state"], 0);

    let app = common::build_test_app(pool, media.path());
    let json = body_json(get(app, &format!("/submitData/{id}")).await).await;
    assert_eq!(json["title"], "Katu-Yaryk");
    assert_eq!(json["status"], "pending");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn patch_non_numeric_id_returns_state_zero(pool: PgPool) {
    let media = tempfile::tempdir().expect("tempdir");
    let app = common::build_test_app(pool, media.path());

    let response = send_multipart(
        app,
        Method::PATCH,
        "/submitData/abc",
        Some(&valid_payload("abc@example.com").to_string()),
        &[],
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await,
        json!({"state": 0, "message": "Некорректный идентификатор перевала"})
    );
}
