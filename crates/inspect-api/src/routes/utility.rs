//! Utility inspection report routes. Same shape as the coating family,
//! with per-inspection utility type validation.

use std::sync::Arc;

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{NaiveDate, Utc};
use inspect_core::{FieldErrors, UtilityType};
use serde::Deserialize;
use serde_json::json;

use crate::auth::AuthUser;
use crate::db::schema::{Photo, UtilityInspection, UtilityReport};
use crate::error::{ApiError, ApiResult};
use crate::uploads;
use crate::AppState;

#[derive(Deserialize, Default)]
pub struct ReportPayload {
    pub date: Option<String>,
    pub contractor: Option<String>,
    pub location: Option<String>,
    pub weather_conditions: Option<String>,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub notes: Option<String>,
}

#[derive(Deserialize)]
pub struct InspectionPayload {
    pub utility_type: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub issues_found: Option<bool>,
    pub issue_description: Option<String>,
    pub corrective_action: Option<String>,
    pub completed: Option<bool>,
    pub notes: Option<String>,
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

async fn owned_report(state: &AppState, user_id: i64, id: i64) -> ApiResult<UtilityReport> {
    sqlx::query_as::<_, UtilityReport>(
        "SELECT * FROM utility_reports WHERE id = ? AND inspector_id = ?",
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or(ApiError::NotFound)
}

async fn owned_inspection(state: &AppState, user_id: i64, id: i64) -> ApiResult<UtilityInspection> {
    sqlx::query_as::<_, UtilityInspection>(
        "SELECT i.* FROM utility_inspections i
         JOIN utility_reports r ON r.id = i.report_id
         WHERE i.id = ? AND r.inspector_id = ?",
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or(ApiError::NotFound)
}

fn ensure_unlocked(report: &UtilityReport) -> ApiResult<()> {
    if report.finalized {
        return Err(ApiError::conflict("report is finalized"));
    }
    Ok(())
}

pub async fn list_reports(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> ApiResult<Json<Vec<UtilityReport>>> {
    let reports = sqlx::query_as::<_, UtilityReport>(
        "SELECT * FROM utility_reports WHERE inspector_id = ? ORDER BY date DESC, created_at DESC",
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
) -> ApiResult<(StatusCode, Json<UtilityReport>)> {
    let mut errors = FieldErrors::new();
    let date = parse_date(&mut errors, payload.date.as_deref());
    let location = errors
        .require_str("location", payload.location.as_deref())
        .map(str::to_string);
    let weather = errors
        .require_str("weather_conditions", payload.weather_conditions.as_deref())
        .map(str::to_string);
    if payload.temperature.is_none() {
        errors.add("temperature", "this field is required");
    }
    if payload.humidity.is_none() {
        errors.add("humidity", "this field is required");
    }
    if !errors.is_empty() {
        return Err(errors.into());
    }

    let now = Utc::now();
    let id = sqlx::query(
        "INSERT INTO utility_reports (inspector_id, date, contractor, location,
                weather_conditions, temperature, humidity, notes, finalized,
                created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, 0, ?, ?)",
    )
    .bind(user.id)
    .bind(date)
    .bind(&payload.contractor)
    .bind(location)
    .bind(weather)
    .bind(payload.temperature)
    .bind(payload.humidity)
    .bind(payload.notes.unwrap_or_default())
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
) -> ApiResult<Json<UtilityReport>> {
    Ok(Json(owned_report(&state, user.id, id).await?))
}

pub async fn update_report(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<ReportPayload>,
) -> ApiResult<Json<UtilityReport>> {
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

    if payload.contractor.is_some() {
        report.contractor = payload.contractor;
    }
    if let Some(v) = payload.location {
        report.location = v;
    }
    if let Some(v) = payload.weather_conditions {
        report.weather_conditions = v;
    }
    if let Some(v) = payload.temperature {
        report.temperature = v;
    }
    if let Some(v) = payload.humidity {
        report.humidity = v;
    }
    if let Some(v) = payload.notes {
        report.notes = v;
    }

    sqlx::query(
        "UPDATE utility_reports SET date = ?, contractor = ?, location = ?,
                weather_conditions = ?, temperature = ?, humidity = ?, notes = ?, updated_at = ?
         WHERE id = ?",
    )
    .bind(report.date)
    .bind(&report.contractor)
    .bind(&report.location)
    .bind(&report.weather_conditions)
    .bind(report.temperature)
    .bind(report.humidity)
    .bind(&report.notes)
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
    sqlx::query("DELETE FROM utility_reports WHERE id = ?")
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
    sqlx::query("UPDATE utility_reports SET finalized = 1, updated_at = ? WHERE id = ?")
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
    sqlx::query("UPDATE utility_reports SET finalized = 0, updated_at = ? WHERE id = ?")
        .bind(Utc::now())
        .bind(id)
        .execute(&state.db)
        .await?;
    Ok(Json(json!({ "status": "report unfinalized" })))
}

pub async fn list_inspections(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(report_id): Path<i64>,
) -> ApiResult<Json<Vec<UtilityInspection>>> {
    owned_report(&state, user.id, report_id).await?;
    let inspections = sqlx::query_as::<_, UtilityInspection>(
        "SELECT * FROM utility_inspections WHERE report_id = ? ORDER BY id",
    )
    .bind(report_id)
    .fetch_all(&state.db)
    .await?;
    Ok(Json(inspections))
}

pub async fn create_inspection(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(report_id): Path<i64>,
    Json(payload): Json<InspectionPayload>,
) -> ApiResult<(StatusCode, Json<UtilityInspection>)> {
    let report = owned_report(&state, user.id, report_id).await?;
    ensure_unlocked(&report)?;

    let mut errors = FieldErrors::new();
    let utility_type = payload
        .utility_type
        .as_deref()
        .and_then(|v| errors.check("utility_type", UtilityType::parse(v)));
    if payload.utility_type.is_none() {
        errors.add("utility_type", "this field is required");
    }
    let location = errors
        .require_str("location", payload.location.as_deref())
        .map(str::to_string);
    let description = errors
        .require_str("description", payload.description.as_deref())
        .map(str::to_string);
    let status = errors
        .require_str("status", payload.status.as_deref())
        .map(str::to_string);
    if !errors.is_empty() {
        return Err(errors.into());
    }

    let now = Utc::now();
    let id = sqlx::query(
        "INSERT INTO utility_inspections (report_id, utility_type, location, description,
                status, issues_found, issue_description, corrective_action, completed, notes,
                created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(report_id)
    .bind(utility_type.map(|u| u.as_str()))
    .bind(location)
    .bind(description)
    .bind(status)
    .bind(payload.issues_found.unwrap_or(false))
    .bind(payload.issue_description.unwrap_or_default())
    .bind(payload.corrective_action.unwrap_or_default())
    .bind(payload.completed.unwrap_or(false))
    .bind(payload.notes.unwrap_or_default())
    .bind(now)
    .bind(now)
    .execute(&state.db)
    .await?
    .last_insert_rowid();

    let inspection = owned_inspection(&state, user.id, id).await?;
    Ok((StatusCode::CREATED, Json(inspection)))
}

pub async fn get_inspection(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<UtilityInspection>> {
    Ok(Json(owned_inspection(&state, user.id, id).await?))
}

pub async fn update_inspection(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<InspectionPayload>,
) -> ApiResult<Json<UtilityInspection>> {
    let mut inspection = owned_inspection(&state, user.id, id).await?;
    let report = owned_report(&state, user.id, inspection.report_id).await?;
    ensure_unlocked(&report)?;

    let mut errors = FieldErrors::new();
    if let Some(value) = payload.utility_type.as_deref() {
        if let Some(parsed) = errors.check("utility_type", UtilityType::parse(value)) {
            inspection.utility_type = parsed.as_str().to_string();
        }
    }
    if !errors.is_empty() {
        return Err(errors.into());
    }

    if let Some(v) = payload.location {
        inspection.location = v;
    }
    if let Some(v) = payload.description {
        inspection.description = v;
    }
    if let Some(v) = payload.status {
        inspection.status = v;
    }
    if let Some(v) = payload.issues_found {
        inspection.issues_found = v;
    }
    if let Some(v) = payload.issue_description {
        inspection.issue_description = v;
    }
    if let Some(v) = payload.corrective_action {
        inspection.corrective_action = v;
    }
    if let Some(v) = payload.completed {
        inspection.completed = v;
    }
    if let Some(v) = payload.notes {
        inspection.notes = v;
    }

    sqlx::query(
        "UPDATE utility_inspections SET utility_type = ?, location = ?, description = ?,
                status = ?, issues_found = ?, issue_description = ?, corrective_action = ?,
                completed = ?, notes = ?, updated_at = ?
         WHERE id = ?",
    )
    .bind(&inspection.utility_type)
    .bind(&inspection.location)
    .bind(&inspection.description)
    .bind(&inspection.status)
    .bind(inspection.issues_found)
    .bind(&inspection.issue_description)
    .bind(&inspection.corrective_action)
    .bind(inspection.completed)
    .bind(&inspection.notes)
    .bind(Utc::now())
    .bind(id)
    .execute(&state.db)
    .await?;

    Ok(Json(owned_inspection(&state, user.id, id).await?))
}

pub async fn delete_inspection(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    let inspection = owned_inspection(&state, user.id, id).await?;
    let report = owned_report(&state, user.id, inspection.report_id).await?;
    ensure_unlocked(&report)?;
    sqlx::query("DELETE FROM utility_inspections WHERE id = ?")
        .bind(id)
        .execute(&state.db)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_photos(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(inspection_id): Path<i64>,
) -> ApiResult<Json<Vec<Photo>>> {
    owned_inspection(&state, user.id, inspection_id).await?;
    let photos = sqlx::query_as::<_, Photo>(
        "SELECT id, inspection_id AS parent_id, image_path, description, uploaded_at
         FROM utility_photos WHERE inspection_id = ? ORDER BY uploaded_at DESC, id DESC",
    )
    .bind(inspection_id)
    .fetch_all(&state.db)
    .await?;
    Ok(Json(photos))
}

pub async fn upload_photo(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(inspection_id): Path<i64>,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<Photo>)> {
    let inspection = owned_inspection(&state, user.id, inspection_id).await?;
    let report = owned_report(&state, user.id, inspection.report_id).await?;
    ensure_unlocked(&report)?;

    let upload = uploads::read_photo(&mut multipart, state.config.max_upload_size).await?;
    let path = uploads::store_photo(&state.config.upload_dir, "utility_photos", &upload).await?;

    let id = sqlx::query(
        "INSERT INTO utility_photos (inspection_id, image_path, description, uploaded_at)
         VALUES (?, ?, ?, ?)",
    )
    .bind(inspection_id)
    .bind(&path)
    .bind(&upload.description)
    .bind(Utc::now())
    .execute(&state.db)
    .await?
    .last_insert_rowid();

    let photo = sqlx::query_as::<_, Photo>(
        "SELECT id, inspection_id AS parent_id, image_path, description, uploaded_at
         FROM utility_photos WHERE id = ?",
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
        "SELECT p.id, p.inspection_id AS parent_id, p.image_path, p.description, p.uploaded_at
         FROM utility_photos p
         JOIN utility_inspections i ON i.id = p.inspection_id
         JOIN utility_reports r ON r.id = i.report_id
         WHERE p.id = ? AND r.inspector_id = ?",
    )
    .bind(id)
    .bind(user.id)
    .fetch_optional(&state.db)
    .await?
    .ok_or(ApiError::NotFound)?;

    sqlx::query("DELETE FROM utility_photos WHERE id = ?")
        .bind(id)
        .execute(&state.db)
        .await?;
    uploads::remove_photo(&photo.image_path).await;
    Ok(StatusCode::NO_CONTENT)
}
