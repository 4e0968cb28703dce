//! Daily weld report routes: report CRUD with weld/x-ray tracking counters,
//! finalize/unfinalize, nested weld inspections and photos.

use std::sync::Arc;

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{NaiveDate, Utc};
use inspect_core::{FieldErrors, WeldPosition, WeldType};
use serde::Deserialize;
use serde_json::json;

use crate::auth::AuthUser;
use crate::db::schema::{Photo, WeldInspection, WeldReport};
use crate::error::{ApiError, ApiResult};
use crate::uploads;
use crate::AppState;

#[derive(Deserialize, Default)]
pub struct ReportPayload {
    pub date: Option<String>,
    pub project: Option<String>,
    pub contractor: Option<String>,
    pub construction_wbs: Option<String>,
    pub retirement_wbs: Option<String>,
    pub activity: Option<String>,
    pub hours_worked: Option<f64>,
    pub welders_onsite: Option<i64>,
    pub location: Option<String>,
    pub weather_conditions: Option<String>,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub notes: Option<String>,
    pub welds_fab_to_date: Option<i64>,
    pub welds_fab_today: Option<i64>,
    pub welds_fab_total: Option<i64>,
    pub welds_onsite_to_date: Option<i64>,
    pub welds_onsite_today: Option<i64>,
    pub welds_onsite_total: Option<i64>,
    pub welds_tiein_to_date: Option<i64>,
    pub welds_tiein_today: Option<i64>,
    pub welds_tiein_total: Option<i64>,
    pub welds_test_to_date: Option<i64>,
    pub welds_test_today: Option<i64>,
    pub welds_test_total: Option<i64>,
    pub xray_fab_to_date: Option<i64>,
    pub xray_fab_today: Option<i64>,
    pub xray_fab_total: Option<i64>,
    pub xray_onsite_to_date: Option<i64>,
    pub xray_onsite_today: Option<i64>,
    pub xray_onsite_total: Option<i64>,
    pub xray_tiein_to_date: Option<i64>,
    pub xray_tiein_today: Option<i64>,
    pub xray_tiein_total: Option<i64>,
    pub xray_test_to_date: Option<i64>,
    pub xray_test_today: Option<i64>,
    pub xray_test_total: Option<i64>,
    pub welding_inspector_name: Option<String>,
    pub contractor_signature: Option<String>,
    pub supervisor_signature: Option<String>,
}

#[derive(Deserialize)]
pub struct InspectionPayload {
    pub weld_number: Option<String>,
    pub weld_type: Option<String>,
    pub position: Option<String>,
    pub joint_type: Option<String>,
    pub material_type: Option<String>,
    pub thickness: Option<f64>,
    pub length: Option<f64>,
    pub preheat_temp: Option<f64>,
    pub interpass_temp: Option<f64>,
    pub post_weld_temp: Option<f64>,
    pub visual_inspection: Option<bool>,
    pub ndt_performed: Option<bool>,
    pub ndt_method: Option<String>,
    pub ndt_results: Option<String>,
    pub defects_found: Option<bool>,
    pub defect_description: Option<String>,
    pub corrective_action: Option<String>,
    pub passed: Option<bool>,
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

async fn owned_report(state: &AppState, user_id: i64, id: i64) -> ApiResult<WeldReport> {
    sqlx::query_as::<_, WeldReport>("SELECT * FROM weld_reports WHERE id = ? AND inspector_id = ?")
        .bind(id)
        .bind(user_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or(ApiError::NotFound)
}

async fn owned_inspection(state: &AppState, user_id: i64, id: i64) -> ApiResult<WeldInspection> {
    sqlx::query_as::<_, WeldInspection>(
        "SELECT i.* FROM weld_inspections i
         JOIN weld_reports r ON r.id = i.report_id
         WHERE i.id = ? AND r.inspector_id = ?",
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or(ApiError::NotFound)
}

fn ensure_unlocked(report: &WeldReport) -> ApiResult<()> {
    if report.finalized {
        return Err(ApiError::conflict("report is finalized"));
    }
    Ok(())
}

pub async fn list_reports(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> ApiResult<Json<Vec<WeldReport>>> {
    let reports = sqlx::query_as::<_, WeldReport>(
        "SELECT * FROM weld_reports WHERE inspector_id = ? ORDER BY date DESC, created_at DESC",
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
) -> ApiResult<(StatusCode, Json<WeldReport>)> {
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
        "INSERT INTO weld_reports (inspector_id, date, project, contractor, construction_wbs,
                retirement_wbs, activity, hours_worked, welders_onsite, location,
                weather_conditions, temperature, humidity, notes, finalized,
                welds_fab_to_date, welds_fab_today, welds_fab_total,
                welds_onsite_to_date, welds_onsite_today, welds_onsite_total,
                welds_tiein_to_date, welds_tiein_today, welds_tiein_total,
                welds_test_to_date, welds_test_today, welds_test_total,
                xray_fab_to_date, xray_fab_today, xray_fab_total,
                xray_onsite_to_date, xray_onsite_today, xray_onsite_total,
                xray_tiein_to_date, xray_tiein_today, xray_tiein_total,
                xray_test_to_date, xray_test_today, xray_test_total,
                welding_inspector_name, contractor_signature, supervisor_signature,
                created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0,
                 ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?,
                 ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?,
                 ?, ?, ?, ?, ?)",
    )
    .bind(user.id)
    .bind(date)
    .bind(&payload.project)
    .bind(&payload.contractor)
    .bind(payload.construction_wbs.clone().unwrap_or_default())
    .bind(payload.retirement_wbs.clone().unwrap_or_default())
    .bind(payload.activity.clone().unwrap_or_default())
    .bind(payload.hours_worked)
    .bind(payload.welders_onsite)
    .bind(location)
    .bind(weather)
    .bind(payload.temperature)
    .bind(payload.humidity)
    .bind(payload.notes.clone().unwrap_or_default())
    .bind(payload.welds_fab_to_date.unwrap_or(0))
    .bind(payload.welds_fab_today.unwrap_or(0))
    .bind(payload.welds_fab_total.unwrap_or(0))
    .bind(payload.welds_onsite_to_date.unwrap_or(0))
    .bind(payload.welds_onsite_today.unwrap_or(0))
    .bind(payload.welds_onsite_total.unwrap_or(0))
    .bind(payload.welds_tiein_to_date.unwrap_or(0))
    .bind(payload.welds_tiein_today.unwrap_or(0))
    .bind(payload.welds_tiein_total.unwrap_or(0))
    .bind(payload.welds_test_to_date.unwrap_or(0))
    .bind(payload.welds_test_today.unwrap_or(0))
    .bind(payload.welds_test_total.unwrap_or(0))
    .bind(payload.xray_fab_to_date.unwrap_or(0))
    .bind(payload.xray_fab_today.unwrap_or(0))
    .bind(payload.xray_fab_total.unwrap_or(0))
    .bind(payload.xray_onsite_to_date.unwrap_or(0))
    .bind(payload.xray_onsite_today.unwrap_or(0))
    .bind(payload.xray_onsite_total.unwrap_or(0))
    .bind(payload.xray_tiein_to_date.unwrap_or(0))
    .bind(payload.xray_tiein_today.unwrap_or(0))
    .bind(payload.xray_tiein_total.unwrap_or(0))
    .bind(payload.xray_test_to_date.unwrap_or(0))
    .bind(payload.xray_test_today.unwrap_or(0))
    .bind(payload.xray_test_total.unwrap_or(0))
    .bind(&payload.welding_inspector_name)
    .bind(payload.contractor_signature.clone().unwrap_or_default())
    .bind(payload.supervisor_signature.clone().unwrap_or_default())
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
) -> ApiResult<Json<WeldReport>> {
    Ok(Json(owned_report(&state, user.id, id).await?))
}

pub async fn update_report(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<ReportPayload>,
) -> ApiResult<Json<WeldReport>> {
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

    if payload.project.is_some() {
        report.project = payload.project;
    }
    if payload.contractor.is_some() {
        report.contractor = payload.contractor;
    }
    if let Some(v) = payload.construction_wbs {
        report.construction_wbs = v;
    }
    if let Some(v) = payload.retirement_wbs {
        report.retirement_wbs = v;
    }
    if let Some(v) = payload.activity {
        report.activity = v;
    }
    if payload.hours_worked.is_some() {
        report.hours_worked = payload.hours_worked;
    }
    if payload.welders_onsite.is_some() {
        report.welders_onsite = payload.welders_onsite;
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
    for (field, value) in [
        (&mut report.welds_fab_to_date, payload.welds_fab_to_date),
        (&mut report.welds_fab_today, payload.welds_fab_today),
        (&mut report.welds_fab_total, payload.welds_fab_total),
        (&mut report.welds_onsite_to_date, payload.welds_onsite_to_date),
        (&mut report.welds_onsite_today, payload.welds_onsite_today),
        (&mut report.welds_onsite_total, payload.welds_onsite_total),
        (&mut report.welds_tiein_to_date, payload.welds_tiein_to_date),
        (&mut report.welds_tiein_today, payload.welds_tiein_today),
        (&mut report.welds_tiein_total, payload.welds_tiein_total),
        (&mut report.welds_test_to_date, payload.welds_test_to_date),
        (&mut report.welds_test_today, payload.welds_test_today),
        (&mut report.welds_test_total, payload.welds_test_total),
        (&mut report.xray_fab_to_date, payload.xray_fab_to_date),
        (&mut report.xray_fab_today, payload.xray_fab_today),
        (&mut report.xray_fab_total, payload.xray_fab_total),
        (&mut report.xray_onsite_to_date, payload.xray_onsite_to_date),
        (&mut report.xray_onsite_today, payload.xray_onsite_today),
        (&mut report.xray_onsite_total, payload.xray_onsite_total),
        (&mut report.xray_tiein_to_date, payload.xray_tiein_to_date),
        (&mut report.xray_tiein_today, payload.xray_tiein_today),
        (&mut report.xray_tiein_total, payload.xray_tiein_total),
        (&mut report.xray_test_to_date, payload.xray_test_to_date),
        (&mut report.xray_test_today, payload.xray_test_today),
        (&mut report.xray_test_total, payload.xray_test_total),
    ] {
        if let Some(v) = value {
            *field = v;
        }
    }
    if payload.welding_inspector_name.is_some() {
        report.welding_inspector_name = payload.welding_inspector_name;
    }
    if let Some(v) = payload.contractor_signature {
        report.contractor_signature = v;
    }
    if let Some(v) = payload.supervisor_signature {
        report.supervisor_signature = v;
    }

    sqlx::query(
        "UPDATE weld_reports SET date = ?, project = ?, contractor = ?, construction_wbs = ?,
                retirement_wbs = ?, activity = ?, hours_worked = ?, welders_onsite = ?,
                location = ?, weather_conditions = ?, temperature = ?, humidity = ?, notes = ?,
                welds_fab_to_date = ?, welds_fab_today = ?, welds_fab_total = ?,
                welds_onsite_to_date = ?, welds_onsite_today = ?, welds_onsite_total = ?,
                welds_tiein_to_date = ?, welds_tiein_today = ?, welds_tiein_total = ?,
                welds_test_to_date = ?, welds_test_today = ?, welds_test_total = ?,
                xray_fab_to_date = ?, xray_fab_today = ?, xray_fab_total = ?,
                xray_onsite_to_date = ?, xray_onsite_today = ?, xray_onsite_total = ?,
                xray_tiein_to_date = ?, xray_tiein_today = ?, xray_tiein_total = ?,
                xray_test_to_date = ?, xray_test_today = ?, xray_test_total = ?,
                welding_inspector_name = ?, contractor_signature = ?, supervisor_signature = ?,
                updated_at = ?
         WHERE id = ?",
    )
    .bind(report.date)
    .bind(&report.project)
    .bind(&report.contractor)
    .bind(&report.construction_wbs)
    .bind(&report.retirement_wbs)
    .bind(&report.activity)
    .bind(report.hours_worked)
    .bind(report.welders_onsite)
    .bind(&report.location)
    .bind(&report.weather_conditions)
    .bind(report.temperature)
    .bind(report.humidity)
    .bind(&report.notes)
    .bind(report.welds_fab_to_date)
    .bind(report.welds_fab_today)
    .bind(report.welds_fab_total)
    .bind(report.welds_onsite_to_date)
    .bind(report.welds_onsite_today)
    .bind(report.welds_onsite_total)
    .bind(report.welds_tiein_to_date)
    .bind(report.welds_tiein_today)
    .bind(report.welds_tiein_total)
    .bind(report.welds_test_to_date)
    .bind(report.welds_test_today)
    .bind(report.welds_test_total)
    .bind(report.xray_fab_to_date)
    .bind(report.xray_fab_today)
    .bind(report.xray_fab_total)
    .bind(report.xray_onsite_to_date)
    .bind(report.xray_onsite_today)
    .bind(report.xray_onsite_total)
    .bind(report.xray_tiein_to_date)
    .bind(report.xray_tiein_today)
    .bind(report.xray_tiein_total)
    .bind(report.xray_test_to_date)
    .bind(report.xray_test_today)
    .bind(report.xray_test_total)
    .bind(&report.welding_inspector_name)
    .bind(&report.contractor_signature)
    .bind(&report.supervisor_signature)
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
    sqlx::query("DELETE FROM weld_reports WHERE id = ?")
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
    sqlx::query("UPDATE weld_reports SET finalized = 1, updated_at = ? WHERE id = ?")
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
    sqlx::query("UPDATE weld_reports SET finalized = 0, updated_at = ? WHERE id = ?")
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
) -> ApiResult<Json<Vec<WeldInspection>>> {
    owned_report(&state, user.id, report_id).await?;
    let inspections = sqlx::query_as::<_, WeldInspection>(
        "SELECT * FROM weld_inspections WHERE report_id = ? ORDER BY weld_number",
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
) -> ApiResult<(StatusCode, Json<WeldInspection>)> {
    let report = owned_report(&state, user.id, report_id).await?;
    ensure_unlocked(&report)?;

    let mut errors = FieldErrors::new();
    let weld_number = errors
        .require_str("weld_number", payload.weld_number.as_deref())
        .map(str::to_string);
    let weld_type = payload
        .weld_type
        .as_deref()
        .and_then(|v| errors.check("weld_type", WeldType::parse(v)));
    if payload.weld_type.is_none() {
        errors.add("weld_type", "this field is required");
    }
    let position = payload
        .position
        .as_deref()
        .and_then(|v| errors.check("position", WeldPosition::parse(v)));
    if payload.position.is_none() {
        errors.add("position", "this field is required");
    }
    let joint_type = errors
        .require_str("joint_type", payload.joint_type.as_deref())
        .map(str::to_string);
    let material_type = errors
        .require_str("material_type", payload.material_type.as_deref())
        .map(str::to_string);
    if payload.thickness.is_none() {
        errors.add("thickness", "this field is required");
    }
    if payload.length.is_none() {
        errors.add("length", "this field is required");
    }
    if !errors.is_empty() {
        return Err(errors.into());
    }

    let now = Utc::now();
    let id = sqlx::query(
        "INSERT INTO weld_inspections (report_id, weld_number, weld_type, position, joint_type,
                material_type, thickness, length, preheat_temp, interpass_temp, post_weld_temp,
                visual_inspection, ndt_performed, ndt_method, ndt_results, defects_found,
                defect_description, corrective_action, passed, notes, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(report_id)
    .bind(weld_number)
    .bind(weld_type.map(|w| w.as_str()))
    .bind(position.map(|p| p.as_str()))
    .bind(joint_type)
    .bind(material_type)
    .bind(payload.thickness)
    .bind(payload.length)
    .bind(payload.preheat_temp)
    .bind(payload.interpass_temp)
    .bind(payload.post_weld_temp)
    .bind(payload.visual_inspection.unwrap_or(false))
    .bind(payload.ndt_performed.unwrap_or(false))
    .bind(payload.ndt_method.unwrap_or_default())
    .bind(payload.ndt_results.unwrap_or_default())
    .bind(payload.defects_found.unwrap_or(false))
    .bind(payload.defect_description.unwrap_or_default())
    .bind(payload.corrective_action.unwrap_or_default())
    .bind(payload.passed.unwrap_or(false))
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
) -> ApiResult<Json<WeldInspection>> {
    Ok(Json(owned_inspection(&state, user.id, id).await?))
}

pub async fn update_inspection(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<InspectionPayload>,
) -> ApiResult<Json<WeldInspection>> {
    let mut inspection = owned_inspection(&state, user.id, id).await?;
    let report = owned_report(&state, user.id, inspection.report_id).await?;
    ensure_unlocked(&report)?;

    let mut errors = FieldErrors::new();
    if let Some(value) = payload.weld_type.as_deref() {
        if let Some(parsed) = errors.check("weld_type", WeldType::parse(value)) {
            inspection.weld_type = parsed.as_str().to_string();
        }
    }
    if let Some(value) = payload.position.as_deref() {
        if let Some(parsed) = errors.check("position", WeldPosition::parse(value)) {
            inspection.position = parsed.as_str().to_string();
        }
    }
    if !errors.is_empty() {
        return Err(errors.into());
    }

    if let Some(v) = payload.weld_number {
        inspection.weld_number = v;
    }
    if let Some(v) = payload.joint_type {
        inspection.joint_type = v;
    }
    if let Some(v) = payload.material_type {
        inspection.material_type = v;
    }
    if let Some(v) = payload.thickness {
        inspection.thickness = v;
    }
    if let Some(v) = payload.length {
        inspection.length = v;
    }
    if payload.preheat_temp.is_some() {
        inspection.preheat_temp = payload.preheat_temp;
    }
    if payload.interpass_temp.is_some() {
        inspection.interpass_temp = payload.interpass_temp;
    }
    if payload.post_weld_temp.is_some() {
        inspection.post_weld_temp = payload.post_weld_temp;
    }
    if let Some(v) = payload.visual_inspection {
        inspection.visual_inspection = v;
    }
    if let Some(v) = payload.ndt_performed {
        inspection.ndt_performed = v;
    }
    if let Some(v) = payload.ndt_method {
        inspection.ndt_method = v;
    }
    if let Some(v) = payload.ndt_results {
        inspection.ndt_results = v;
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

    sqlx::query(
        "UPDATE weld_inspections SET weld_number = ?, weld_type = ?, position = ?, joint_type = ?,
                material_type = ?, thickness = ?, length = ?, preheat_temp = ?,
                interpass_temp = ?, post_weld_temp = ?, visual_inspection = ?, ndt_performed = ?,
                ndt_method = ?, ndt_results = ?, defects_found = ?, defect_description = ?,
                corrective_action = ?, passed = ?, notes = ?, updated_at = ?
         WHERE id = ?",
    )
    .bind(&inspection.weld_number)
    .bind(&inspection.weld_type)
    .bind(&inspection.position)
    .bind(&inspection.joint_type)
    .bind(&inspection.material_type)
    .bind(inspection.thickness)
    .bind(inspection.length)
    .bind(inspection.preheat_temp)
    .bind(inspection.interpass_temp)
    .bind(inspection.post_weld_temp)
    .bind(inspection.visual_inspection)
    .bind(inspection.ndt_performed)
    .bind(&inspection.ndt_method)
    .bind(&inspection.ndt_results)
    .bind(inspection.defects_found)
    .bind(&inspection.defect_description)
    .bind(&inspection.corrective_action)
    .bind(inspection.passed)
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
    sqlx::query("DELETE FROM weld_inspections WHERE id = ?")
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
         FROM weld_photos WHERE inspection_id = ? ORDER BY uploaded_at DESC, id DESC",
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
    let path = uploads::store_photo(&state.config.upload_dir, "weld_photos", &upload).await?;

    let id = sqlx::query(
        "INSERT INTO weld_photos (inspection_id, image_path, description, uploaded_at)
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
         FROM weld_photos WHERE id = ?",
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
         FROM weld_photos p
         JOIN weld_inspections i ON i.id = p.inspection_id
         JOIN weld_reports r ON r.id = i.report_id
         WHERE p.id = ? AND r.inspector_id = ?",
    )
    .bind(id)
    .bind(user.id)
    .fetch_optional(&state.db)
    .await?
    .ok_or(ApiError::NotFound)?;

    sqlx::query("DELETE FROM weld_photos WHERE id = ?")
        .bind(id)
        .execute(&state.db)
        .await?;
    uploads::remove_photo(&photo.image_path).await;
    Ok(StatusCode::NO_CONTENT)
}
