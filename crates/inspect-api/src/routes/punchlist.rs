//! Punchlist routes: consolidation lists of outstanding field issues. Items
//! carry a dense `item_number` maintained by the resequencer, which orders
//! items by start station with numeric stations sorting before free text.
//! Completing an item stamps the sign-off user and completion time once.

use std::sync::Arc;

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{NaiveDate, Utc};
use inspect_core::{station, FieldErrors};
use serde::Deserialize;
use serde_json::json;

use crate::auth::AuthUser;
use crate::db::schema::{Photo, PunchlistItem, PunchlistReport};
use crate::error::{ApiError, ApiResult};
use crate::uploads;
use crate::AppState;

#[derive(Deserialize, Default)]
pub struct ReportPayload {
    pub title: Option<String>,
    pub date: Option<String>,
}

#[derive(Deserialize, Default)]
pub struct ItemPayload {
    pub spread: Option<String>,
    pub inspector: Option<String>,
    pub start_station: Option<String>,
    pub end_station: Option<String>,
    pub feature: Option<String>,
    pub issue: Option<String>,
    pub recommendations: Option<String>,
    pub completed: Option<bool>,
}

#[derive(Deserialize)]
pub struct BatchPayload {
    pub items: Vec<serde_json::Value>,
}

fn parse_date(errors: &mut FieldErrors, value: Option<&str>) -> Option<NaiveDate> {
    let raw = errors.require_str("date", value)?;
    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(_) => {
            errors.add("date", "expected a YYYY-MM-DD date");
            None
        }
    }
}

async fn owned_report(state: &AppState, user_id: i64, id: i64) -> ApiResult<PunchlistReport> {
    sqlx::query_as::<_, PunchlistReport>(
        "SELECT * FROM punchlist_reports WHERE id = ? AND created_by = ?",
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or(ApiError::NotFound)
}

async fn owned_item(state: &AppState, user_id: i64, id: i64) -> ApiResult<PunchlistItem> {
    sqlx::query_as::<_, PunchlistItem>(
        "SELECT i.* FROM punchlist_items i
         JOIN punchlist_reports r ON r.id = i.report_id
         WHERE i.id = ? AND r.created_by = ?",
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or(ApiError::NotFound)
}

fn ensure_unlocked(report: &PunchlistReport) -> ApiResult<()> {
    if report.finalized {
        return Err(ApiError::conflict("punchlist is finalized"));
    }
    Ok(())
}

pub async fn list_reports(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> ApiResult<Json<Vec<PunchlistReport>>> {
    let reports = sqlx::query_as::<_, PunchlistReport>(
        "SELECT * FROM punchlist_reports WHERE created_by = ?
         ORDER BY date DESC, created_at DESC",
    )
    .bind(user.id)
    .fetch_all(&state.db)
    .await?;
    Ok(Json(reports))
}

pub async fn create_report(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(payload): Json<ReportPayload>,
) -> ApiResult<(StatusCode, Json<PunchlistReport>)> {
    let mut errors = FieldErrors::new();
    let title = errors
        .require_str("title", payload.title.as_deref())
        .map(str::to_string);
    let date = parse_date(&mut errors, payload.date.as_deref());
    if !errors.is_empty() {
        return Err(errors.into());
    }

    let now = Utc::now();
    let id = sqlx::query(
        "INSERT INTO punchlist_reports (created_by, title, date, finalized, created_at, updated_at)
         VALUES (?, ?, ?, 0, ?, ?)",
    )
    .bind(user.id)
    .bind(title)
    .bind(date)
    .bind(now)
    .bind(now)
    .execute(&state.db)
    .await?
    .last_insert_rowid();

    let report = owned_report(&state, user.id, id).await?;
    Ok((StatusCode::CREATED, Json(report)))
}

pub async fn get_report(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<PunchlistReport>> {
    Ok(Json(owned_report(&state, user.id, id).await?))
}

pub async fn update_report(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<ReportPayload>,
) -> ApiResult<Json<PunchlistReport>> {
    let mut report = owned_report(&state, user.id, id).await?;
    ensure_unlocked(&report)?;

    let mut errors = FieldErrors::new();
    if payload.date.is_some() {
        if let Some(date) = parse_date(&mut errors, payload.date.as_deref()) {
            report.date = date;
        }
    }
    if !errors.is_empty() {
        return Err(errors.into());
    }
    if let Some(v) = payload.title {
        report.title = v;
    }

    sqlx::query("UPDATE punchlist_reports SET title = ?, date = ?, updated_at = ? WHERE id = ?")
        .bind(&report.title)
        .bind(report.date)
        .bind(Utc::now())
        .bind(id)
        .execute(&state.db)
        .await?;

    Ok(Json(owned_report(&state, user.id, id).await?))
}

pub async fn delete_report(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    owned_report(&state, user.id, id).await?;
    sqlx::query("DELETE FROM punchlist_reports WHERE id = ?")
        .bind(id)
        .execute(&state.db)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn finalize(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<serde_json::Value>> {
    owned_report(&state, user.id, id).await?;
    sqlx::query("UPDATE punchlist_reports SET finalized = 1, updated_at = ? WHERE id = ?")
        .bind(Utc::now())
        .bind(id)
        .execute(&state.db)
        .await?;
    Ok(Json(json!({ "status": "report finalized" })))
}

pub async fn unfinalize(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<serde_json::Value>> {
    owned_report(&state, user.id, id).await?;
    sqlx::query("UPDATE punchlist_reports SET finalized = 0, updated_at = ? WHERE id = ?")
        .bind(Utc::now())
        .bind(id)
        .execute(&state.db)
        .await?;
    Ok(Json(json!({ "status": "report unfinalized" })))
}

pub async fn list_items(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(report_id): Path<i64>,
) -> ApiResult<Json<Vec<PunchlistItem>>> {
    owned_report(&state, user.id, report_id).await?;
    let items = sqlx::query_as::<_, PunchlistItem>(
        "SELECT * FROM punchlist_items WHERE report_id = ? ORDER BY item_number, id",
    )
    .bind(report_id)
    .fetch_all(&state.db)
    .await?;
    Ok(Json(items))
}

fn validate_item(payload: &ItemPayload) -> Result<(String, String), FieldErrors> {
    let mut errors = FieldErrors::new();
    let feature = errors
        .require_str("feature", payload.feature.as_deref())
        .map(str::to_string);
    let start_station = errors
        .require_str("start_station", payload.start_station.as_deref())
        .map(str::to_string);
    match (feature, start_station) {
        (Some(feature), Some(start_station)) if errors.is_empty() => Ok((feature, start_station)),
        _ => Err(errors),
    }
}

async fn insert_item(
    state: &AppState,
    report_id: i64,
    payload: &ItemPayload,
    feature: &str,
    start_station: &str,
) -> ApiResult<i64> {
    let now = Utc::now();
    let id = sqlx::query(
        "INSERT INTO punchlist_items (report_id, item_number, spread, inspector, start_station,
                end_station, feature, issue, recommendations, completed, inspector_signoff,
                completed_date, created_at, updated_at)
         VALUES (?, NULL, ?, ?, ?, ?, ?, ?, ?, 0, NULL, NULL, ?, ?)",
    )
    .bind(report_id)
    .bind(payload.spread.clone().unwrap_or_default())
    .bind(payload.inspector.clone().unwrap_or_default())
    .bind(start_station)
    .bind(payload.end_station.clone().unwrap_or_default())
    .bind(feature)
    .bind(payload.issue.clone().unwrap_or_default())
    .bind(payload.recommendations.clone().unwrap_or_default())
    .bind(now)
    .bind(now)
    .execute(&state.db)
    .await?
    .last_insert_rowid();
    Ok(id)
}

pub async fn create_item(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(report_id): Path<i64>,
    Json(payload): Json<ItemPayload>,
) -> ApiResult<(StatusCode, Json<PunchlistItem>)> {
    let report = owned_report(&state, user.id, report_id).await?;
    ensure_unlocked(&report)?;

    let (feature, start_station) = validate_item(&payload)?;
    let id = insert_item(&state, report_id, &payload, &feature, &start_station).await?;
    let item = owned_item(&state, user.id, id).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// Creates many items in one request. Valid entries are inserted even when
/// others fail; any failure turns the response into a 400 that still lists
/// what was created.
pub async fn batch_create_items(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(report_id): Path<i64>,
    Json(payload): Json<BatchPayload>,
) -> ApiResult<(StatusCode, Json<serde_json::Value>)> {
    let report = owned_report(&state, user.id, report_id).await?;
    ensure_unlocked(&report)?;

    let mut created = Vec::new();
    let mut errors = Vec::new();
    for (index, raw) in payload.items.into_iter().enumerate() {
        let item: ItemPayload = match serde_json::from_value(raw) {
            Ok(item) => item,
            Err(err) => {
                errors.push(json!({ "index": index, "errors": { "item": err.to_string() } }));
                continue;
            }
        };
        match validate_item(&item) {
            Ok((feature, start_station)) => {
                let id = insert_item(&state, report_id, &item, &feature, &start_station).await?;
                created.push(owned_item(&state, user.id, id).await?);
            }
            Err(field_errors) => {
                errors.push(json!({ "index": index, "errors": field_errors }));
            }
        }
    }

    let status = if errors.is_empty() {
        StatusCode::CREATED
    } else {
        StatusCode::BAD_REQUEST
    };
    Ok((status, Json(json!({ "created": created, "errors": errors }))))
}

/// Rewrites every item's `item_number` to a dense 1-based sequence ordered by
/// start station. Numeric stations sort ascending ahead of text stations,
/// with the item id breaking ties.
pub async fn resequence_items(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(report_id): Path<i64>,
) -> ApiResult<Json<serde_json::Value>> {
    let report = owned_report(&state, user.id, report_id).await?;
    ensure_unlocked(&report)?;

    let rows: Vec<(i64, String)> =
        sqlx::query_as("SELECT id, start_station FROM punchlist_items WHERE report_id = ?")
            .bind(report_id)
            .fetch_all(&state.db)
            .await?;

    let ordered = station::resequence(&rows);
    let mut tx = state.db.begin().await?;
    for (position, item_id) in ordered.iter().enumerate() {
        sqlx::query("UPDATE punchlist_items SET item_number = ?, updated_at = ? WHERE id = ?")
            .bind(position as i64 + 1)
            .bind(Utc::now())
            .bind(item_id)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;

    Ok(Json(json!({ "status": "items resequenced", "count": ordered.len() })))
}

pub async fn get_item(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<PunchlistItem>> {
    Ok(Json(owned_item(&state, user.id, id).await?))
}

pub async fn update_item(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<ItemPayload>,
) -> ApiResult<Json<PunchlistItem>> {
    let mut item = owned_item(&state, user.id, id).await?;
    let report = owned_report(&state, user.id, item.report_id).await?;
    ensure_unlocked(&report)?;

    if let Some(v) = payload.spread {
        item.spread = v;
    }
    if let Some(v) = payload.inspector {
        item.inspector = v;
    }
    if let Some(v) = payload.start_station {
        item.start_station = v;
    }
    if let Some(v) = payload.end_station {
        item.end_station = v;
    }
    if let Some(v) = payload.feature {
        item.feature = v;
    }
    if let Some(v) = payload.issue {
        item.issue = v;
    }
    if let Some(v) = payload.recommendations {
        item.recommendations = v;
    }
    if let Some(completed) = payload.completed {
        // Sign-off and completion time are stamped on the first transition to
        // completed and kept afterwards, so the audit trail survives toggles.
        if completed && !item.completed {
            item.inspector_signoff = Some(user.id);
            item.completed_date = Some(Utc::now());
        }
        item.completed = completed;
    }

    sqlx::query(
        "UPDATE punchlist_items SET spread = ?, inspector = ?, start_station = ?,
                end_station = ?, feature = ?, issue = ?, recommendations = ?, completed = ?,
                inspector_signoff = ?, completed_date = ?, updated_at = ?
         WHERE id = ?",
    )
    .bind(&item.spread)
    .bind(&item.inspector)
    .bind(&item.start_station)
    .bind(&item.end_station)
    .bind(&item.feature)
    .bind(&item.issue)
    .bind(&item.recommendations)
    .bind(item.completed)
    .bind(item.inspector_signoff)
    .bind(item.completed_date)
    .bind(Utc::now())
    .bind(id)
    .execute(&state.db)
    .await?;

    Ok(Json(owned_item(&state, user.id, id).await?))
}

pub async fn delete_item(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    let item = owned_item(&state, user.id, id).await?;
    let report = owned_report(&state, user.id, item.report_id).await?;
    ensure_unlocked(&report)?;
    sqlx::query("DELETE FROM punchlist_items WHERE id = ?")
        .bind(id)
        .execute(&state.db)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_photos(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(item_id): Path<i64>,
) -> ApiResult<Json<Vec<Photo>>> {
    owned_item(&state, user.id, item_id).await?;
    let photos = sqlx::query_as::<_, Photo>(
        "SELECT id, item_id AS parent_id, image_path, description, uploaded_at
         FROM punchlist_photos WHERE item_id = ? ORDER BY uploaded_at DESC, id DESC",
    )
    .bind(item_id)
    .fetch_all(&state.db)
    .await?;
    Ok(Json(photos))
}

pub async fn upload_photo(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(item_id): Path<i64>,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<Photo>)> {
    let item = owned_item(&state, user.id, item_id).await?;
    let report = owned_report(&state, user.id, item.report_id).await?;
    ensure_unlocked(&report)?;

    let upload = uploads::read_photo(&mut multipart, state.config.max_upload_size).await?;
    let path = uploads::store_photo(&state.config.upload_dir, "punchlist_photos", &upload).await?;

    let id = sqlx::query(
        "INSERT INTO punchlist_photos (item_id, image_path, description, uploaded_at)
         VALUES (?, ?, ?, ?)",
    )
    .bind(item_id)
    .bind(&path)
    .bind(&upload.description)
    .bind(Utc::now())
    .execute(&state.db)
    .await?
    .last_insert_rowid();

    let photo = sqlx::query_as::<_, Photo>(
        "SELECT id, item_id AS parent_id, image_path, description, uploaded_at
         FROM punchlist_photos WHERE id = ?",
    )
    .bind(id)
    .fetch_one(&state.db)
    .await?;
    Ok((StatusCode::CREATED, Json(photo)))
}

pub async fn delete_photo(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    let photo = sqlx::query_as::<_, Photo>(
        "SELECT p.id, p.item_id AS parent_id, p.image_path, p.description, p.uploaded_at
         FROM punchlist_photos p
         JOIN punchlist_items i ON i.id = p.item_id
         JOIN punchlist_reports r ON r.id = i.report_id
         WHERE p.id = ? AND r.created_by = ?",
    )
    .bind(id)
    .bind(user.id)
    .fetch_optional(&state.db)
    .await?
    .ok_or(ApiError::NotFound)?;

    sqlx::query("DELETE FROM punchlist_photos WHERE id = ?")
        .bind(id)
        .execute(&state.db)
        .await?;
    uploads::remove_photo(&photo.image_path).await;
    Ok(StatusCode::NO_CONTENT)
}
