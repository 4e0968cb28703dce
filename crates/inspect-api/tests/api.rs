//! End-to-end tests driving the router in process over an in-memory database.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use inspect_api::{build_router, AppConfig, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn test_app() -> (Router, tempfile::TempDir) {
    // One pooled connection keeps the in-memory database alive for the test.
    let pool = inspect_api::db::connect("sqlite::memory:", 1).await.unwrap();
    inspect_api::db::migrate(&pool).await.unwrap();

    let upload_dir = tempfile::tempdir().unwrap();
    let config = AppConfig {
        database_url: "sqlite::memory:".to_string(),
        bind_addr: "127.0.0.1:0".to_string(),
        upload_dir: upload_dir.path().to_string_lossy().into_owned(),
        max_upload_size: 1024 * 1024,
    };
    let state = Arc::new(AppState { db: pool, config });
    (build_router(state), upload_dir)
}

async fn request(
    app: &Router,
    method: &str,
    path: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Token {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn register(app: &Router, username: &str) -> String {
    let (status, body) = request(
        app,
        "POST",
        "/api/register",
        None,
        Some(json!({
            "username": username,
            "email": format!("{username}@example.com"),
            "password": "hunter22",
            "confirm_password": "hunter22",
            "phone_number": "555-0100",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
    body["token"].as_str().unwrap().to_string()
}

async fn create_punchlist(app: &Router, token: &str) -> i64 {
    let (status, body) = request(
        app,
        "POST",
        "/api/punchlists",
        Some(token),
        Some(json!({ "title": "Spread 3 walkdown", "date": "2026-08-01" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].as_i64().unwrap()
}

#[tokio::test]
async fn register_login_and_logout_round_trip() {
    let (app, _dir) = test_app().await;
    let token = register(&app, "casey").await;

    let (status, body) = request(&app, "POST", "/api/token/verify", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Token is valid");
    assert_eq!(body["user"], "casey");

    let (status, body) = request(
        &app,
        "POST",
        "/api/login",
        None,
        Some(json!({ "username": "casey", "password": "hunter22" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token"].as_str().unwrap(), token);

    let (status, _) = request(&app, "POST", "/api/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    // Logged-out token no longer authenticates.
    let (status, _) = request(&app, "GET", "/api/reports", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_with_unknown_token_is_bad_request() {
    let (app, _dir) = test_app().await;
    register(&app, "casey").await;

    let (status, body) = request(
        &app,
        "POST",
        "/api/logout",
        Some("0000000000000000000000000000000000000000000000000000000000000000"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid token");

    let (status, body) = request(&app, "POST", "/api/logout", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No token provided");
}

#[tokio::test]
async fn login_rejects_bad_password() {
    let (app, _dir) = test_app().await;
    register(&app, "casey").await;

    let (status, body) = request(
        &app,
        "POST",
        "/api/login",
        None,
        Some(json!({ "username": "casey", "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid Credentials");
}

#[tokio::test]
async fn register_password_mismatch_creates_nothing() {
    let (app, _dir) = test_app().await;
    let (status, body) = request(
        &app,
        "POST",
        "/api/register",
        None,
        Some(json!({
            "username": "casey",
            "email": "casey@example.com",
            "password": "hunter22",
            "confirm_password": "different",
            "phone_number": "555-0100",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"]["confirm_password"], "Passwords do not match");

    // The username is still free afterwards.
    register(&app, "casey").await;
}

#[tokio::test]
async fn missing_token_is_unauthorized() {
    let (app, _dir) = test_app().await;
    let (status, body) = request(&app, "GET", "/api/reports", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "authentication credentials were not provided");
}

#[tokio::test]
async fn reports_are_scoped_to_their_owner() {
    let (app, _dir) = test_app().await;
    let alice = register(&app, "alice").await;
    let bob = register(&app, "bob").await;

    let (status, body) = request(
        &app,
        "POST",
        "/api/reports",
        Some(&alice),
        Some(json!({
            "date": "2026-08-10",
            "location": "MP 14.2",
            "weather_conditions": "clear",
            "daily_activities": "trench backfill",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let id = body["id"].as_i64().unwrap();

    let (status, _) = request(&app, "GET", &format!("/api/reports/{id}"), Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) =
        request(&app, "GET", &format!("/api/reports/{id}"), Some(&bob), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Not found");

    let (_, body) = request(&app, "GET", "/api/reports", Some(&bob), None).await;
    assert_eq!(body.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn report_search_filters_by_keyword_and_date() {
    let (app, _dir) = test_app().await;
    let token = register(&app, "casey").await;

    for (date, activities) in [
        ("2026-08-01", "coating touch-up at valve site"),
        ("2026-08-15", "hydrotest prep"),
    ] {
        let (status, _) = request(
            &app,
            "POST",
            "/api/reports",
            Some(&token),
            Some(json!({
                "date": date,
                "location": "MP 2.0",
                "weather_conditions": "overcast",
                "daily_activities": activities,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = request(
        &app,
        "GET",
        "/api/reports?keyword=hydrotest",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["daily_activities"], "hydrotest prep");

    let (_, body) = request(
        &app,
        "GET",
        "/api/reports?startDate=2026-08-10",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["date"], "2026-08-15");

    // Empty filter values are ignored rather than matched literally.
    let (_, body) = request(&app, "GET", "/api/reports?keyword=", Some(&token), None).await;
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn finalized_report_rejects_edits_until_unfinalized() {
    let (app, _dir) = test_app().await;
    let token = register(&app, "casey").await;

    let (status, body) = request(
        &app,
        "POST",
        "/api/coating/reports",
        Some(&token),
        Some(json!({
            "date": "2026-08-12",
            "location": "Station 12+50",
            "weather_conditions": "dry",
            "temperature": 71.5,
            "humidity": 40.0,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let id = body["id"].as_i64().unwrap();

    let (status, body) = request(
        &app,
        "POST",
        &format!("/api/coating/reports/{id}/finalize"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "report finalized");

    // Finalizing twice is a no-op, not an error.
    let (status, _) = request(
        &app,
        "POST",
        &format!("/api/coating/reports/{id}/finalize"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = request(
        &app,
        "PATCH",
        &format!("/api/coating/reports/{id}"),
        Some(&token),
        Some(json!({ "notes": "late edit" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = request(
        &app,
        "POST",
        &format!("/api/coating/reports/{id}/inspections"),
        Some(&token),
        Some(json!({
            "surface_type": "steel",
            "coating_type": "epoxy",
            "surface_area": 120.0,
            "surface_preparation": "SP-10",
            "coating_thickness": 12.5,
            "temperature": 70.0,
            "humidity": 45.0,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = request(
        &app,
        "POST",
        &format!("/api/coating/reports/{id}/unfinalize"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = request(
        &app,
        "PATCH",
        &format!("/api/coating/reports/{id}"),
        Some(&token),
        Some(json!({ "notes": "late edit" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn coating_inspection_rejects_unknown_enums() {
    let (app, _dir) = test_app().await;
    let token = register(&app, "casey").await;

    let (status, body) = request(
        &app,
        "POST",
        "/api/coating/reports",
        Some(&token),
        Some(json!({
            "date": "2026-08-12",
            "location": "Station 12+50",
            "weather_conditions": "dry",
            "temperature": 71.5,
            "humidity": 40.0,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let id = body["id"].as_i64().unwrap();

    let (status, body) = request(
        &app,
        "POST",
        &format!("/api/coating/reports/{id}/inspections"),
        Some(&token),
        Some(json!({
            "surface_type": "granite",
            "coating_type": "epoxy",
            "surface_area": 120.0,
            "surface_preparation": "SP-10",
            "coating_thickness": 12.5,
            "temperature": 70.0,
            "humidity": 45.0,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["surface_type"].is_string(), "{body}");
}

#[tokio::test]
async fn punchlist_batch_insert_reports_partial_failures() {
    let (app, _dir) = test_app().await;
    let token = register(&app, "casey").await;
    let id = create_punchlist(&app, &token).await;

    let (status, body) = request(
        &app,
        "POST",
        &format!("/api/punchlists/{id}/items/batch"),
        Some(&token),
        Some(json!({
            "items": [
                { "feature": "silt fence", "start_station": "100" },
                { "feature": "gate valve", "start_station": "20" },
                { "feature": "", "start_station": "30" },
                { "feature": "tie-in", "start_station": "5" },
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["created"].as_array().unwrap().len(), 3);
    let errors = body["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0]["index"], 2);
    assert!(errors[0]["errors"]["feature"].is_string());

    // Valid rows survived the partial failure.
    let (_, body) = request(
        &app,
        "GET",
        &format!("/api/punchlists/{id}/items"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(body.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn punchlist_batch_all_valid_returns_created() {
    let (app, _dir) = test_app().await;
    let token = register(&app, "casey").await;
    let id = create_punchlist(&app, &token).await;

    let (status, body) = request(
        &app,
        "POST",
        &format!("/api/punchlists/{id}/items/batch"),
        Some(&token),
        Some(json!({
            "items": [
                { "feature": "silt fence", "start_station": "100" },
                { "feature": "gate valve", "start_station": "20" },
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["created"].as_array().unwrap().len(), 2);
    assert_eq!(body["errors"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn resequence_orders_numeric_stations_before_text() {
    let (app, _dir) = test_app().await;
    let token = register(&app, "casey").await;
    let id = create_punchlist(&app, &token).await;

    for station in ["100", "20", "abc", "5"] {
        let (status, body) = request(
            &app,
            "POST",
            &format!("/api/punchlists/{id}/items"),
            Some(&token),
            Some(json!({ "feature": "marker", "start_station": station })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
    }

    let (status, body) = request(
        &app,
        "POST",
        &format!("/api/punchlists/{id}/items/resequence"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["count"], 4);

    let (_, body) = request(
        &app,
        "GET",
        &format!("/api/punchlists/{id}/items"),
        Some(&token),
        None,
    )
    .await;
    let stations: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["start_station"].as_str().unwrap())
        .collect();
    assert_eq!(stations, vec!["5", "20", "100", "abc"]);
    let numbers: Vec<i64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["item_number"].as_i64().unwrap())
        .collect();
    assert_eq!(numbers, vec![1, 2, 3, 4]);
}

#[tokio::test]
async fn completing_an_item_stamps_signoff_once() {
    let (app, _dir) = test_app().await;
    let token = register(&app, "casey").await;
    let id = create_punchlist(&app, &token).await;

    let (_, body) = request(
        &app,
        "POST",
        &format!("/api/punchlists/{id}/items"),
        Some(&token),
        Some(json!({ "feature": "low spot", "start_station": "42" })),
    )
    .await;
    let item_id = body["id"].as_i64().unwrap();
    assert!(body["completed_date"].is_null());
    assert!(body["inspector_signoff"].is_null());

    let (status, body) = request(
        &app,
        "PATCH",
        &format!("/api/punchlists/items/{item_id}"),
        Some(&token),
        Some(json!({ "completed": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["completed"], true);
    let first_stamp = body["completed_date"].as_str().unwrap().to_string();
    assert!(body["inspector_signoff"].as_i64().is_some());

    // A repeat completion keeps the original stamp.
    let (_, body) = request(
        &app,
        "PATCH",
        &format!("/api/punchlists/items/{item_id}"),
        Some(&token),
        Some(json!({ "completed": true, "issue": "regraded" })),
    )
    .await;
    assert_eq!(body["completed_date"].as_str().unwrap(), first_stamp);
}

#[tokio::test]
async fn deleting_a_report_cascades_to_children() {
    let (app, _dir) = test_app().await;
    let token = register(&app, "casey").await;
    let id = create_punchlist(&app, &token).await;

    let (_, body) = request(
        &app,
        "POST",
        &format!("/api/punchlists/{id}/items"),
        Some(&token),
        Some(json!({ "feature": "low spot", "start_station": "42" })),
    )
    .await;
    let item_id = body["id"].as_i64().unwrap();

    let (status, _) = request(
        &app,
        "DELETE",
        &format!("/api/punchlists/{id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = request(
        &app,
        "GET",
        &format!("/api/punchlists/items/{item_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn progress_chart_upsert_replaces_data() {
    let (app, _dir) = test_app().await;
    let token = register(&app, "casey").await;

    let (status, body) = request(
        &app,
        "PUT",
        "/api/progress-charts/grading",
        Some(&token),
        Some(json!({ "progress_data": [1, 2, 3] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["progress_data"], json!([1, 2, 3]));

    let (_, body) = request(
        &app,
        "PUT",
        "/api/progress-charts/grading",
        Some(&token),
        Some(json!({ "progress_data": [4, 5] })),
    )
    .await;
    assert_eq!(body["progress_data"], json!([4, 5]));

    let (status, body) = request(&app, "GET", "/api/progress-charts", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["activity"], "grading");
}

#[tokio::test]
async fn photo_upload_stores_file_and_row() {
    let (app, dir) = test_app().await;
    let token = register(&app, "casey").await;

    let (_, body) = request(
        &app,
        "POST",
        "/api/coating/reports",
        Some(&token),
        Some(json!({
            "date": "2026-08-12",
            "location": "Station 12+50",
            "weather_conditions": "dry",
            "temperature": 71.5,
            "humidity": 40.0,
        })),
    )
    .await;
    let report_id = body["id"].as_i64().unwrap();

    let (_, body) = request(
        &app,
        "POST",
        &format!("/api/coating/reports/{report_id}/inspections"),
        Some(&token),
        Some(json!({
            "surface_type": "steel",
            "coating_type": "epoxy",
            "surface_area": 120.0,
            "surface_preparation": "SP-10",
            "coating_thickness": 12.5,
            "temperature": 70.0,
            "humidity": 45.0,
        })),
    )
    .await;
    let inspection_id = body["id"].as_i64().unwrap();

    let boundary = "test-boundary";
    let multipart_body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"image\"; filename=\"holiday.jpg\"\r\n\
         Content-Type: image/jpeg\r\n\r\n\
         fake jpeg bytes\r\n\
         --{boundary}\r\n\
         Content-Disposition: form-data; name=\"description\"\r\n\r\n\
         holiday at weld seam\r\n\
         --{boundary}--\r\n"
    );
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/coating/inspections/{inspection_id}/photos"))
                .header(header::AUTHORIZATION, format!("Token {token}"))
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={boundary}"),
                )
                .body(Body::from(multipart_body))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let photo: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(photo["parent_id"], inspection_id);
    assert_eq!(photo["description"], "holiday at weld seam");

    let stored = std::path::Path::new(photo["image_path"].as_str().unwrap());
    assert!(stored.starts_with(dir.path()));
    assert_eq!(std::fs::read(stored).unwrap(), b"fake jpeg bytes");

    // Deleting the row also removes the file from disk.
    let (status, _) = request(
        &app,
        "DELETE",
        &format!("/api/coating/photos/{}", photo["id"].as_i64().unwrap()),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(!stored.exists());
}

#[tokio::test]
async fn contact_phone_upsert() {
    let (app, _dir) = test_app().await;
    let token = register(&app, "casey").await;

    let (status, body) = request(
        &app,
        "PUT",
        "/api/contacts",
        Some(&token),
        Some(json!({ "phone_number": "555-0199" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let (_, body) = request(&app, "GET", "/api/contacts", Some(&token), None).await;
    let contacts = body.as_array().unwrap();
    assert_eq!(contacts.len(), 1);
    assert_eq!(contacts[0]["phone_number"], "555-0199");
}
