//! Daily coating report routes: report CRUD, finalize/unfinalize, nested
//! inspections, photos, and the oversight checklist.

use std::sync::Arc;

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{NaiveDate, Utc};
use inspect_core::{CoatingType, FieldErrors, OversightStatus, SurfaceType};
use serde::Deserialize;
use serde_json::json;

use crate::auth::AuthUser;
use crate::db::schema::{CoatingInspection, CoatingOversightItem, CoatingReport, Photo};
use crate::error::{ApiError, ApiResult};
use crate::uploads;
use crate::AppState;

#[derive(Deserialize)]
pub struct ReportPayload {
    pub date: Option<String>,
    pub contractor: Option<String>,
    pub report_number: Option<String>,
    pub oq_personnel: Option<String>,
    pub facility_id: Option<String>,
    pub purchase_order: Option<String>,
    pub location: Option<String>,
    pub qa_inspector: Option<String>,
    pub weather_conditions: Option<String>,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub notes: Option<String>,
}

#[derive(Deserialize)]
pub struct InspectionPayload {
    pub surface_type: Option<String>,
    pub coating_type: Option<String>,
    pub surface_area: Option<f64>,
    pub surface_preparation: Option<String>,
    pub coating_thickness: Option<f64>,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub visual_inspection: Option<bool>,
    pub adhesion_test: Option<bool>,
    pub adhesion_test_results: Option<String>,
    pub defects_found: Option<bool>,
    pub defect_description: Option<String>,
    pub corrective_action: Option<String>,
    pub passed: Option<bool>,
    pub notes: Option<String>,
    pub application_method: Option<String>,
    pub wft_mils: Option<f64>,
    pub mix_number: Option<String>,
    pub quantity_used: Option<f64>,
    pub witnessed: Option<bool>,
    pub backfill_used: Option<bool>,
    pub rock_shield_used: Option<bool>,
}

#[derive(Deserialize)]
pub struct OversightPayload {
    pub item_number: Option<i64>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub comments: Option<String>,
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

async fn owned_report(state: &AppState, user_id: i64, id: i64) -> ApiResult<CoatingReport> {
    sqlx::query_as::<_, CoatingReport>(
        "SELECT * FROM coating_reports WHERE id = ? AND inspector_id = ?",
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or(ApiError::NotFound)
}

/// Resolve an inspection through its report's owner; 404 outside the caller's
/// reports.
async fn owned_inspection(state: &AppState, user_id: i64, id: i64) -> ApiResult<CoatingInspection> {
    sqlx::query_as::<_, CoatingInspection>(
        "SELECT i.* FROM coating_inspections i
         JOIN coating_reports r ON r.id = i.report_id
         WHERE i.id = ? AND r.inspector_id = ?",
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or(ApiError::NotFound)
}

fn ensure_unlocked(report: &CoatingReport) -> ApiResult<()> {
    if report.finalized {
        return Err(ApiError::conflict("report is finalized"));
    }
    Ok(())
}

pub async fn list_reports(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> ApiResult<Json<Vec<CoatingReport>>> {
    let reports = sqlx::query_as::<_, CoatingReport>(
        "SELECT * FROM coating_reports WHERE inspector_id = ? ORDER BY date DESC, id DESC",
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
) -> ApiResult<(StatusCode, Json<CoatingReport>)> {
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
        "INSERT INTO coating_reports (inspector_id, date, contractor, report_number, oq_personnel,
                                      facility_id, purchase_order, location, qa_inspector,
                                      weather_conditions, temperature, humidity, notes,
                                      finalized, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0, ?, ?)",
    )
    .bind(user.id)
    .bind(date)
    .bind(&payload.contractor)
    .bind(&payload.report_number)
    .bind(&payload.oq_personnel)
    .bind(&payload.facility_id)
    .bind(&payload.purchase_order)
    .bind(location)
    .bind(&payload.qa_inspector)
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
) -> ApiResult<Json<CoatingReport>> {
    Ok(Json(owned_report(&state, user.id, id).await?))
}

pub async fn update_report(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<ReportPayload>,
) -> ApiResult<Json<CoatingReport>> {
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
    if payload.report_number.is_some() {
        report.report_number = payload.report_number;
    }
    if payload.oq_personnel.is_some() {
        report.oq_personnel = payload.oq_personnel;
    }
    if payload.facility_id.is_some() {
        report.facility_id = payload.facility_id;
    }
    if payload.purchase_order.is_some() {
        report.purchase_order = payload.purchase_order;
    }
    if let Some(location) = payload.location {
        report.location = location;
    }
    if payload.qa_inspector.is_some() {
        report.qa_inspector = payload.qa_inspector;
    }
    if let Some(weather) = payload.weather_conditions {
        report.weather_conditions = weather;
    }
    if let Some(temperature) = payload.temperature {
        report.temperature = temperature;
    }
    if let Some(humidity) = payload.humidity {
        report.humidity = humidity;
    }
    if let Some(notes) = payload.notes {
        report.notes = notes;
    }

    sqlx::query(
        "UPDATE coating_reports SET date = ?, contractor = ?, report_number = ?, oq_personnel = ?,
                                    facility_id = ?, purchase_order = ?, location = ?,
                                    qa_inspector = ?, weather_conditions = ?, temperature = ?,
                                    humidity = ?, notes = ?, updated_at = ?
         WHERE id = ?",
    )
    .bind(report.date)
    .bind(&report.contractor)
    .bind(&report.report_number)
    .bind(&report.oq_personnel)
    .bind(&report.facility_id)
    .bind(&report.purchase_order)
    .bind(&report.location)
    .bind(&report.qa_inspector)
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
    sqlx::query("DELETE FROM coating_reports WHERE id = ?")
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
    sqlx::query("UPDATE coating_reports SET finalized = 1, updated_at = ? WHERE id = ?")
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
    sqlx::query("UPDATE coating_reports SET finalized = 0, updated_at = ? WHERE id = ?")
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
) -> ApiResult<Json<Vec<CoatingInspection>>> {
    owned_report(&state, user.id, report_id).await?;
    let inspections = sqlx::query_as::<_, CoatingInspection>(
        "SELECT * FROM coating_inspections WHERE report_id = ? ORDER BY created_at DESC, id DESC",
    )
    .bind(report_id)
    .fetch_all(&state.db)
    .await?;
    Ok(Json(inspections))
}

/// The parent report comes from the path; any report id in the body is
/// ignored.
pub async fn create_inspection(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(report_id): Path<i64>,
    Json(payload): Json<InspectionPayload>,
) -> ApiResult<(StatusCode, Json<CoatingInspection>)> {
    let report = owned_report(&state, user.id, report_id).await?;
    ensure_unlocked(&report)?;

    let mut errors = FieldErrors::new();
    let surface_type = payload
        .surface_type
        .as_deref()
        .and_then(|v| errors.check("surface_type", SurfaceType::parse(v)));
    if payload.surface_type.is_none() {
        errors.add("surface_type", "this field is required");
    }
    let coating_type = payload
        .coating_type
        .as_deref()
        .and_then(|v| errors.check("coating_type", CoatingType::parse(v)));
    if payload.coating_type.is_none() {
        errors.add("coating_type", "this field is required");
    }
    if payload.surface_area.is_none() {
        errors.add("surface_area", "this field is required");
    }
    let preparation = errors
        .require_str("surface_preparation", payload.surface_preparation.as_deref())
        .map(str::to_string);
    if payload.coating_thickness.is_none() {
        errors.add("coating_thickness", "this field is required");
    }
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
        "INSERT INTO coating_inspections (report_id, surface_type, coating_type, surface_area,
                                          surface_preparation, coating_thickness, temperature,
                                          humidity, visual_inspection, adhesion_test,
                                          adhesion_test_results, defects_found, defect_description,
                                          corrective_action, passed, notes, application_method,
                                          wft_mils, mix_number, quantity_used, witnessed,
                                          backfill_used, rock_shield_used, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(report_id)
    .bind(surface_type.map(|s| s.as_str()))
    .bind(coating_type.map(|c| c.as_str()))
    .bind(payload.surface_area)
    .bind(preparation)
    .bind(payload.coating_thickness)
    .bind(payload.temperature)
    .bind(payload.humidity)
    .bind(payload.visual_inspection.unwrap_or(false))
    .bind(payload.adhesion_test.unwrap_or(false))
    .bind(payload.adhesion_test_results.unwrap_or_default())
    .bind(payload.defects_found.unwrap_or(false))
    .bind(payload.defect_description.unwrap_or_default())
    .bind(payload.corrective_action.unwrap_or_default())
    .bind(payload.passed.unwrap_or(false))
    .bind(payload.notes.unwrap_or_default())
    .bind(payload.application_method.unwrap_or_default())
    .bind(payload.wft_mils)
    .bind(payload.mix_number.unwrap_or_default())
    .bind(payload.quantity_used)
    .bind(payload.witnessed.unwrap_or(false))
    .bind(payload.backfill_used.unwrap_or(false))
    .bind(payload.rock_shield_used.unwrap_or(false))
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
) -> ApiResult<Json<CoatingInspection>> {
    Ok(Json(owned_inspection(&state, user.id, id).await?))
}

pub async fn update_inspection(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<InspectionPayload>,
) -> ApiResult<Json<CoatingInspection>> {
    let mut inspection = owned_inspection(&state, user.id, id).await?;
    let report = owned_report(&state, user.id, inspection.report_id).await?;
    ensure_unlocked(&report)?;

    let mut errors = FieldErrors::new();
    if let Some(value) = payload.surface_type.as_deref() {
        if let Some(parsed) = errors.check("surface_type", SurfaceType::parse(value)) {
            inspection.surface_type = parsed.as_str().to_string();
        }
    }
    if let Some(value) = payload.coating_type.as_deref() {
        if let Some(parsed) = errors.check("coating_type", CoatingType::parse(value)) {
            inspection.coating_type = parsed.as_str().to_string();
        }
    }
    if !errors.is_empty() {
        return Err(errors.into());
    }

    if let Some(v) = payload.surface_area {
        inspection.surface_area = v;
    }
    if let Some(v) = payload.surface_preparation {
        inspection.surface_preparation = v;
    }
    if let Some(v) = payload.coating_thickness {
        inspection.coating_thickness = v;
    }
    if let Some(v) = payload.temperature {
        inspection.temperature = v;
    }
    if let Some(v) = payload.humidity {
        inspection.humidity = v;
    }
    if let Some(v) = payload.visual_inspection {
        inspection.visual_inspection = v;
    }
    if let Some(v) = payload.adhesion_test {
        inspection.adhesion_test = v;
    }
    if let Some(v) = payload.adhesion_test_results {
        inspection.adhesion_test_results = v;
    }
    if let Some(v) = payload.defects_found {
        inspection.defects_found = v;
    }
    if let Some(v) = payload.defect_description {
        inspection.defect_description = v;
    }
    if let Some(v) = payload.corrective_action {
        inspection.corrective_action = v;
    }
    if let Some(v) = payload.passed {
        inspection.passed = v;
    }
    if let Some(v) = payload.notes {
        inspection.notes = v;
    }
    if let Some(v) = payload.application_method {
        inspection.application_method = v;
    }
    if payload.wft_mils.is_some() {
        inspection.wft_mils = payload.wft_mils;
    }
    if let Some(v) = payload.mix_number {
        inspection.mix_number = v;
    }
    if payload.quantity_used.is_some() {
        inspection.quantity_used = payload.quantity_used;
    }
    if let Some(v) = payload.witnessed {
        inspection.witnessed = v;
    }
    if let Some(v) = payload.backfill_used {
        inspection.backfill_used = v;
    }
    if let Some(v) = payload.rock_shield_used {
        inspection.rock_shield_used = v;
    }

    sqlx::query(
        "UPDATE coating_inspections SET surface_type = ?, coating_type = ?, surface_area = ?,
                surface_preparation = ?, coating_thickness = ?, temperature = ?, humidity = ?,
                visual_inspection = ?, adhesion_test = ?, adhesion_test_results = ?,
                defects_found = ?, defect_description = ?, corrective_action = ?, passed = ?,
                notes = ?, application_method = ?, wft_mils = ?, mix_number = ?,
                quantity_used = ?, witnessed = ?, backfill_used = ?, rock_shield_used = ?,
                updated_at = ?
         WHERE id = ?",
    )
    .bind(&inspection.surface_type)
    .bind(&inspection.coating_type)
    .bind(inspection.surface_area)
    .bind(&inspection.surface_preparation)
    .bind(inspection.coating_thickness)
    .bind(inspection.temperature)
    .bind(inspection.humidity)
    .bind(inspection.visual_inspection)
    .bind(inspection.adhesion_test)
    .bind(&inspection.adhesion_test_results)
    .bind(inspection.defects_found)
    .bind(&inspection.defect_description)
    .bind(&inspection.corrective_action)
    .bind(inspection.passed)
    .bind(&inspection.notes)
    .bind(&inspection.application_method)
    .bind(inspection.wft_mils)
    .bind(&inspection.mix_number)
    .bind(inspection.quantity_used)
    .bind(inspection.witnessed)
    .bind(inspection.backfill_used)
    .bind(inspection.rock_shield_used)
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
    sqlx::query("DELETE FROM coating_inspections WHERE id = ?")
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
         FROM coating_photos WHERE inspection_id = ? ORDER BY uploaded_at DESC, id DESC",
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
    let path = uploads::store_photo(&state.config.upload_dir, "coating_photos", &upload).await?;

    let id = sqlx::query(
        "INSERT INTO coating_photos (inspection_id, image_path, description, uploaded_at)
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
         FROM coating_photos WHERE id = ?",
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
         FROM coating_photos p
         JOIN coating_inspections i ON i.id = p.inspection_id
         JOIN coating_reports r ON r.id = i.report_id
         WHERE p.id = ? AND r.inspector_id = ?",
    )
    .bind(id)
    .bind(user.id)
    .fetch_optional(&state.db)
    .await?
    .ok_or(ApiError::NotFound)?;

    sqlx::query("DELETE FROM coating_photos WHERE id = ?")
        .bind(id)
        .execute(&state.db)
        .await?;
    uploads::remove_photo(&photo.image_path).await;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_oversight(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(report_id): Path<i64>,
) -> ApiResult<Json<Vec<CoatingOversightItem>>> {
    owned_report(&state, user.id, report_id).await?;
    let items = sqlx::query_as::<_, CoatingOversightItem>(
        "SELECT * FROM coating_oversight_items WHERE report_id = ? ORDER BY item_number",
    )
    .bind(report_id)
    .fetch_all(&state.db)
    .await?;
    Ok(Json(items))
}

pub async fn create_oversight(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(report_id): Path<i64>,
    Json(payload): Json<OversightPayload>,
) -> ApiResult<(StatusCode, Json<CoatingOversightItem>)> {
    let report = owned_report(&state, user.id, report_id).await?;
    ensure_unlocked(&report)?;

    let mut errors = FieldErrors::new();
    if payload.item_number.is_none() {
        errors.add("item_number", "this field is required");
    }
    let description = errors
        .require_str("description", payload.description.as_deref())
        .map(str::to_string);
    let status = payload
        .status
        .as_deref()
        .and_then(|v| errors.check("status", OversightStatus::parse(v)));
    if payload.status.is_none() {
        errors.add("status", "this field is required");
    }
    if !errors.is_empty() {
        return Err(errors.into());
    }

    let now = Utc::now();
    let id = sqlx::query(
        "INSERT INTO coating_oversight_items (report_id, item_number, description, status,
                                              comments, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(report_id)
    .bind(payload.item_number)
    .bind(description)
    .bind(status.map(|s| s.as_str()))
    .bind(payload.comments.unwrap_or_default())
    .bind(now)
    .bind(now)
    .execute(&state.db)
    .await?
    .last_insert_rowid();

    let item = sqlx::query_as::<_, CoatingOversightItem>(
        "SELECT * FROM coating_oversight_items WHERE id = ?",
    )
    .bind(id)
    .fetch_one(&state.db)
    .await?;
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn update_oversight(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<OversightPayload>,
) -> ApiResult<Json<CoatingOversightItem>> {
    let mut item = sqlx::query_as::<_, CoatingOversightItem>(
        "SELECT i.* FROM coating_oversight_items i
         JOIN coating_reports r ON r.id = i.report_id
         WHERE i.id = ? AND r.inspector_id = ?",
    )
    .bind(id)
    .bind(user.id)
    .fetch_optional(&state.db)
    .await?
    .ok_or(ApiError::NotFound)?;

    let report = owned_report(&state, user.id, item.report_id).await?;
    ensure_unlocked(&report)?;

    let mut errors = FieldErrors::new();
    if let Some(value) = payload.status.as_deref() {
        if let Some(parsed) = errors.check("status", OversightStatus::parse(value)) {
            item.status = parsed.as_str().to_string();
        }
    }
    if !errors.is_empty() {
        return Err(errors.into());
    }

    if let Some(v) = payload.item_number {
        item.item_number = v;
    }
    if let Some(v) = payload.description {
        item.description = v;
    }
    if let Some(v) = payload.comments {
        item.comments = v;
    }

    sqlx::query(
        "UPDATE coating_oversight_items SET item_number = ?, description = ?, status = ?,
                                            comments = ?, updated_at = ?
         WHERE id = ?",
    )
    .bind(item.item_number)
    .bind(&item.description)
    .bind(&item.status)
    .bind(&item.comments)
    .bind(Utc::now())
    .bind(id)
    .execute(&state.db)
    .await?;

    let item = sqlx::query_as::<_, CoatingOversightItem>(
        "SELECT * FROM coating_oversight_items WHERE id = ?",
    )
    .bind(id)
    .fetch_one(&state.db)
    .await?;
    Ok(Json(item))
}

pub async fn delete_oversight(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    let item = sqlx::query_as::<_, CoatingOversightItem>(
        "SELECT i.* FROM coating_oversight_items i
         JOIN coating_reports r ON r.id = i.report_id
         WHERE i.id = ? AND r.inspector_id = ?",
    )
    .bind(id)
    .bind(user.id)
    .fetch_optional(&state.db)
    .await?
    .ok_or(ApiError::NotFound)?;

    let report = owned_report(&state, user.id, item.report_id).await?;
    ensure_unlocked(&report)?;
    sqlx::query("DELETE FROM coating_oversight_items WHERE id = ?")
        .bind(id)
        .execute(&state.db)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
