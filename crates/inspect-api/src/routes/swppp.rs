//! SWPPP (stormwater pollution prevention) inspection routes. Reports carry
//! precipitation and soil condition flags; checklist items track erosion
//! control devices; photos hang off the report rather than an inspection.

use std::sync::Arc;

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{NaiveDate, NaiveTime, Utc};
use inspect_core::{FieldErrors, SwpppInspectionType};
use serde::Deserialize;
use serde_json::json;

use crate::auth::AuthUser;
use crate::db::schema::{SwpppItem, SwpppPhoto, SwpppReport};
use crate::error::{ApiError, ApiResult};
use crate::uploads;
use crate::AppState;

#[derive(Deserialize, Default)]
pub struct ReportPayload {
    pub inspection_type: Option<String>,
    pub inspection_date: Option<String>,
    pub precipitation_date: Option<String>,
    pub inspector_name: Option<String>,
    pub precipitation_rain_gage: Option<bool>,
    pub precipitation_rain: Option<bool>,
    pub precipitation_snow: Option<bool>,
    pub soil_dry: Option<bool>,
    pub soil_wet: Option<bool>,
    pub soil_saturated: Option<bool>,
    pub soil_frozen: Option<bool>,
    pub notes: Option<String>,
    pub weather_conditions: Option<String>,
    pub additional_comments: Option<String>,
}

#[derive(Deserialize)]
pub struct ItemPayload {
    pub location: Option<String>,
    pub ll_number: Option<String>,
    pub feature_details: Option<String>,
    pub inspector_id: Option<String>,
    pub soil_presently_disturbed: Option<bool>,
    pub inspection_date: Option<String>,
    pub inspection_time: Option<String>,
    pub ecd_functional: Option<bool>,
    pub ecd_needs_maintenance: Option<bool>,
    pub date_corrected: Option<String>,
    pub comments: Option<String>,
}

fn parse_date(errors: &mut FieldErrors, field: &str, raw: &str) -> Option<NaiveDate> {
    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(_) => {
            errors.add(field, "expected a YYYY-MM-DD date");
            None
        }
    }
}

fn parse_time(errors: &mut FieldErrors, field: &str, raw: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .map_err(|_| errors.add(field, "expected an HH:MM time"))
        .ok()
}

async fn owned_report(state: &AppState, user_id: i64, id: i64) -> ApiResult<SwpppReport> {
    sqlx::query_as::<_, SwpppReport>("SELECT * FROM swppp_reports WHERE id = ? AND created_by = ?")
        .bind(id)
        .bind(user_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or(ApiError::NotFound)
}

async fn owned_item(state: &AppState, user_id: i64, id: i64) -> ApiResult<SwpppItem> {
    sqlx::query_as::<_, SwpppItem>(
        "SELECT i.* FROM swppp_items i
         JOIN swppp_reports r ON r.id = i.report_id
         WHERE i.id = ? AND r.created_by = ?",
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or(ApiError::NotFound)
}

fn ensure_unlocked(report: &SwpppReport) -> ApiResult<()> {
    if report.finalized {
        return Err(ApiError::conflict("report is finalized"));
    }
    Ok(())
}

pub async fn list_reports(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> ApiResult<Json<Vec<SwpppReport>>> {
    let reports = sqlx::query_as::<_, SwpppReport>(
        "SELECT * FROM swppp_reports WHERE created_by = ?
         ORDER BY inspection_date DESC, created_at DESC",
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
) -> ApiResult<(StatusCode, Json<SwpppReport>)> {
    let mut errors = FieldErrors::new();
    let inspection_type = payload
        .inspection_type
        .as_deref()
        .and_then(|v| errors.check("inspection_type", SwpppInspectionType::parse(v)));
    if payload.inspection_type.is_none() {
        errors.add("inspection_type", "this field is required");
    }
    let inspection_date = errors
        .require_str("inspection_date", payload.inspection_date.as_deref())
        .and_then(|raw| parse_date(&mut errors, "inspection_date", raw));
    let precipitation_date = payload
        .precipitation_date
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .and_then(|raw| parse_date(&mut errors, "precipitation_date", raw));
    let inspector_name = errors
        .require_str("inspector_name", payload.inspector_name.as_deref())
        .map(str::to_string);
    if !errors.is_empty() {
        return Err(errors.into());
    }

    let now = Utc::now();
    let id = sqlx::query(
        "INSERT INTO swppp_reports (created_by, inspection_type, inspection_date,
                precipitation_date, inspector_name, precipitation_rain_gage, precipitation_rain,
                precipitation_snow, soil_dry, soil_wet, soil_saturated, soil_frozen, notes,
                weather_conditions, additional_comments, finalized, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0, ?, ?)",
    )
    .bind(user.id)
    .bind(inspection_type.map(|t| t.as_str()))
    .bind(inspection_date)
    .bind(precipitation_date)
    .bind(inspector_name)
    .bind(payload.precipitation_rain_gage.unwrap_or(false))
    .bind(payload.precipitation_rain.unwrap_or(false))
    .bind(payload.precipitation_snow.unwrap_or(false))
    .bind(payload.soil_dry.unwrap_or(false))
    .bind(payload.soil_wet.unwrap_or(false))
    .bind(payload.soil_saturated.unwrap_or(false))
    .bind(payload.soil_frozen.unwrap_or(false))
    .bind(payload.notes.unwrap_or_default())
    .bind(payload.weather_conditions.unwrap_or_default())
    .bind(payload.additional_comments.unwrap_or_default())
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
) -> ApiResult<Json<SwpppReport>> {
    Ok(Json(owned_report(&state, user.id, id).await?))
}

pub async fn update_report(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<ReportPayload>,
) -> ApiResult<Json<SwpppReport>> {
    let mut report = owned_report(&state, user.id, id).await?;
    ensure_unlocked(&report)?;

    let mut errors = FieldErrors::new();
    if let Some(value) = payload.inspection_type.as_deref() {
        if let Some(parsed) = errors.check("inspection_type", SwpppInspectionType::parse(value)) {
            report.inspection_type = parsed.as_str().to_string();
        }
    }
    if let Some(raw) = payload.inspection_date.as_deref() {
        if let Some(date) = parse_date(&mut errors, "inspection_date", raw) {
            report.inspection_date = date;
        }
    }
    if let Some(raw) = payload.precipitation_date.as_deref() {
        if raw.trim().is_empty() {
            report.precipitation_date = None;
        } else if let Some(date) = parse_date(&mut errors, "precipitation_date", raw) {
            report.precipitation_date = Some(date);
        }
    }
    if !errors.is_empty() {
        return Err(errors.into());
    }

    if let Some(v) = payload.inspector_name {
        report.inspector_name = v;
    }
    if let Some(v) = payload.precipitation_rain_gage {
        report.precipitation_rain_gage = v;
    }
    if let Some(v) = payload.precipitation_rain {
        report.precipitation_rain = v;
    }
    if let Some(v) = payload.precipitation_snow {
        report.precipitation_snow = v;
    }
    if let Some(v) = payload.soil_dry {
        report.soil_dry = v;
    }
    if let Some(v) = payload.soil_wet {
        report.soil_wet = v;
    }
    if let Some(v) = payload.soil_saturated {
        report.soil_saturated = v;
    }
    if let Some(v) = payload.soil_frozen {
        report.soil_frozen = v;
    }
    if let Some(v) = payload.notes {
        report.notes = v;
    }
    if let Some(v) = payload.weather_conditions {
        report.weather_conditions = v;
    }
    if let Some(v) = payload.additional_comments {
        report.additional_comments = v;
    }

    sqlx::query(
        "UPDATE swppp_reports SET inspection_type = ?, inspection_date = ?,
                precipitation_date = ?, inspector_name = ?, precipitation_rain_gage = ?,
                precipitation_rain = ?, precipitation_snow = ?, soil_dry = ?, soil_wet = ?,
                soil_saturated = ?, soil_frozen = ?, notes = ?, weather_conditions = ?,
                additional_comments = ?, updated_at = ?
         WHERE id = ?",
    )
    .bind(&report.inspection_type)
    .bind(report.inspection_date)
    .bind(report.precipitation_date)
    .bind(&report.inspector_name)
    .bind(report.precipitation_rain_gage)
    .bind(report.precipitation_rain)
    .bind(report.precipitation_snow)
    .bind(report.soil_dry)
    .bind(report.soil_wet)
    .bind(report.soil_saturated)
    .bind(report.soil_frozen)
    .bind(&report.notes)
    .bind(&report.weather_conditions)
    .bind(&report.additional_comments)
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
    sqlx::query("DELETE FROM swppp_reports WHERE id = ?")
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
    sqlx::query("UPDATE swppp_reports SET finalized = 1, updated_at = ? WHERE id = ?")
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
    sqlx::query("UPDATE swppp_reports SET finalized = 0, updated_at = ? WHERE id = ?")
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
) -> ApiResult<Json<Vec<SwpppItem>>> {
    owned_report(&state, user.id, report_id).await?;
    let items = sqlx::query_as::<_, SwpppItem>(
        "SELECT * FROM swppp_items WHERE report_id = ? ORDER BY id",
    )
    .bind(report_id)
    .fetch_all(&state.db)
    .await?;
    Ok(Json(items))
}

pub async fn create_item(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(report_id): Path<i64>,
    Json(payload): Json<ItemPayload>,
) -> ApiResult<(StatusCode, Json<SwpppItem>)> {
    let report = owned_report(&state, user.id, report_id).await?;
    ensure_unlocked(&report)?;

    let mut errors = FieldErrors::new();
    let location = errors
        .require_str("location", payload.location.as_deref())
        .map(str::to_string);
    let inspection_date = payload
        .inspection_date
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .and_then(|raw| parse_date(&mut errors, "inspection_date", raw));
    let inspection_time = payload
        .inspection_time
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .and_then(|raw| parse_time(&mut errors, "inspection_time", raw));
    let date_corrected = payload
        .date_corrected
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .and_then(|raw| parse_date(&mut errors, "date_corrected", raw));
    if !errors.is_empty() {
        return Err(errors.into());
    }

    let now = Utc::now();
    let id = sqlx::query(
        "INSERT INTO swppp_items (report_id, location, ll_number, feature_details,
                inspector_id, soil_presently_disturbed, inspection_date, inspection_time,
                ecd_functional, ecd_needs_maintenance, date_corrected, comments,
                created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(report_id)
    .bind(location)
    .bind(payload.ll_number.unwrap_or_default())
    .bind(payload.feature_details.unwrap_or_default())
    .bind(payload.inspector_id.unwrap_or_default())
    .bind(payload.soil_presently_disturbed.unwrap_or(false))
    .bind(inspection_date)
    .bind(inspection_time)
    .bind(payload.ecd_functional.unwrap_or(false))
    .bind(payload.ecd_needs_maintenance.unwrap_or(false))
    .bind(date_corrected)
    .bind(payload.comments.unwrap_or_default())
    .bind(now)
    .bind(now)
    .execute(&state.db)
    .await?
    .last_insert_rowid();

    let item = owned_item(&state, user.id, id).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn get_item(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<SwpppItem>> {
    Ok(Json(owned_item(&state, user.id, id).await?))
}

pub async fn update_item(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<ItemPayload>,
) -> ApiResult<Json<SwpppItem>> {
    let mut item = owned_item(&state, user.id, id).await?;
    let report = owned_report(&state, user.id, item.report_id).await?;
    ensure_unlocked(&report)?;

    let mut errors = FieldErrors::new();
    if let Some(raw) = payload.inspection_date.as_deref() {
        if raw.trim().is_empty() {
            item.inspection_date = None;
        } else if let Some(date) = parse_date(&mut errors, "inspection_date", raw) {
            item.inspection_date = Some(date);
        }
    }
    if let Some(raw) = payload.inspection_time.as_deref() {
        if raw.trim().is_empty() {
            item.inspection_time = None;
        } else if let Some(time) = parse_time(&mut errors, "inspection_time", raw) {
            item.inspection_time = Some(time);
        }
    }
    if let Some(raw) = payload.date_corrected.as_deref() {
        if raw.trim().is_empty() {
            item.date_corrected = None;
        } else if let Some(date) = parse_date(&mut errors, "date_corrected", raw) {
            item.date_corrected = Some(date);
        }
    }
    if !errors.is_empty() {
        return Err(errors.into());
    }

    if let Some(v) = payload.location {
        item.location = v;
    }
    if let Some(v) = payload.ll_number {
        item.ll_number = v;
    }
    if let Some(v) = payload.feature_details {
        item.feature_details = v;
    }
    if let Some(v) = payload.inspector_id {
        item.inspector_id = v;
    }
    if let Some(v) = payload.soil_presently_disturbed {
        item.soil_presently_disturbed = v;
    }
    if let Some(v) = payload.ecd_functional {
        item.ecd_functional = v;
    }
    if let Some(v) = payload.ecd_needs_maintenance {
        item.ecd_needs_maintenance = v;
    }
    if let Some(v) = payload.comments {
        item.comments = v;
    }

    sqlx::query(
        "UPDATE swppp_items SET location = ?, ll_number = ?, feature_details = ?,
                inspector_id = ?, soil_presently_disturbed = ?, inspection_date = ?,
                inspection_time = ?, ecd_functional = ?, ecd_needs_maintenance = ?,
                date_corrected = ?, comments = ?, updated_at = ?
         WHERE id = ?",
    )
    .bind(&item.location)
    .bind(&item.ll_number)
    .bind(&item.feature_details)
    .bind(&item.inspector_id)
    .bind(item.soil_presently_disturbed)
    .bind(item.inspection_date)
    .bind(item.inspection_time)
    .bind(item.ecd_functional)
    .bind(item.ecd_needs_maintenance)
    .bind(item.date_corrected)
    .bind(&item.comments)
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
    sqlx::query("DELETE FROM swppp_items WHERE id = ?")
        .bind(id)
        .execute(&state.db)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_photos(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(report_id): Path<i64>,
) -> ApiResult<Json<Vec<SwpppPhoto>>> {
    owned_report(&state, user.id, report_id).await?;
    let photos = sqlx::query_as::<_, SwpppPhoto>(
        "SELECT * FROM swppp_photos WHERE report_id = ? ORDER BY uploaded_at DESC, id DESC",
    )
    .bind(report_id)
    .fetch_all(&state.db)
    .await?;
    Ok(Json(photos))
}

pub async fn upload_photo(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(report_id): Path<i64>,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<SwpppPhoto>)> {
    let report = owned_report(&state, user.id, report_id).await?;
    ensure_unlocked(&report)?;

    let upload = uploads::read_photo(&mut multipart, state.config.max_upload_size).await?;
    let path = uploads::store_photo(&state.config.upload_dir, "swppp_photos", &upload).await?;

    let id = sqlx::query(
        "INSERT INTO swppp_photos (report_id, image_path, location, description, uploaded_at)
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(report_id)
    .bind(&path)
    .bind(&upload.location)
    .bind(&upload.description)
    .bind(Utc::now())
    .execute(&state.db)
    .await?
    .last_insert_rowid();

    let photo = sqlx::query_as::<_, SwpppPhoto>("SELECT * FROM swppp_photos WHERE id = ?")
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
    let photo = sqlx::query_as::<_, SwpppPhoto>(
        "SELECT p.* FROM swppp_photos p
         JOIN swppp_reports r ON r.id = p.report_id
         WHERE p.id = ? AND r.created_by = ?",
    )
    .bind(id)
    .bind(user.id)
    .fetch_optional(&state.db)
    .await?
    .ok_or(ApiError::NotFound)?;

    sqlx::query("DELETE FROM swppp_photos WHERE id = ?")
        .bind(id)
        .execute(&state.db)
        .await?;
    uploads::remove_photo(&photo.image_path).await;
    Ok(StatusCode::NO_CONTENT)
}
