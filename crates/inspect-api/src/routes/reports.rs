//! Generic daily report CRUD and the query-parameter search layer.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{NaiveDate, Utc};
use inspect_core::FieldErrors;
use serde::Deserialize;
use sqlx::QueryBuilder;

use crate::auth::AuthUser;
use crate::db::schema::Report;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Deserialize)]
pub struct ReportSearchQuery {
    pub keyword: Option<String>,
    #[serde(rename = "startDate")]
    pub start_date: Option<String>,
    #[serde(rename = "endDate")]
    pub end_date: Option<String>,
    #[serde(rename = "reportType")]
    pub report_type: Option<String>,
    pub facility: Option<String>,
    pub route: Option<String>,
    pub spread: Option<String>,
    pub author: Option<String>,
    #[serde(rename = "complianceLevel")]
    pub compliance_level: Option<String>,
    pub category: Option<String>,
    #[serde(rename = "activityGroup")]
    pub activity_group: Option<String>,
    #[serde(rename = "activityType")]
    pub activity_type: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateReportRequest {
    pub date: Option<String>,
    pub location: Option<String>,
    pub weather_conditions: Option<String>,
    pub daily_activities: Option<String>,
    pub report_type: Option<String>,
    pub facility: Option<String>,
    pub route: Option<String>,
    pub spread: Option<String>,
    pub compliance_level: Option<String>,
    pub activity_category: Option<String>,
    pub activity_group: Option<String>,
    pub activity_type: Option<String>,
    pub milepost_start: Option<String>,
    pub milepost_end: Option<String>,
    pub station_start: Option<String>,
    pub station_end: Option<String>,
}

fn filled(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn parse_date(errors: &mut FieldErrors, field: &str, value: Option<&str>) -> Option<NaiveDate> {
    let raw = errors.require_str(field, value)?;
    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(_) => {
            errors.add(field, "expected a YYYY-MM-DD date");
            None
        }
    }
}

/// Malformed filter dates are skipped, never rejected.
fn parse_filter_date(value: Option<&str>) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value?, "%Y-%m-%d").ok()
}

async fn owned_report(state: &AppState, user_id: i64, id: i64) -> ApiResult<Report> {
    sqlx::query_as::<_, Report>("SELECT * FROM reports WHERE id = ? AND inspector_id = ?")
        .bind(id)
        .bind(user_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or(ApiError::NotFound)
}

/// List the caller's reports, narrowed by any present search parameters.
pub async fn list_reports(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Query(query): Query<ReportSearchQuery>,
) -> ApiResult<Json<Vec<Report>>> {
    let mut builder: QueryBuilder<sqlx::Sqlite> = QueryBuilder::new(
        "SELECT r.* FROM reports r JOIN users u ON u.id = r.inspector_id WHERE r.inspector_id = ",
    );
    builder.push_bind(user.id);

    if let Some(keyword) = filled(&query.keyword) {
        let pattern = format!("%{}%", keyword.to_lowercase());
        builder.push(
            " AND (lower(r.location) LIKE ",
        );
        builder.push_bind(pattern.clone());
        builder.push(" OR lower(r.weather_conditions) LIKE ");
        builder.push_bind(pattern.clone());
        builder.push(" OR lower(r.daily_activities) LIKE ");
        builder.push_bind(pattern);
        builder.push(")");
    }

    if let Some(start) = parse_filter_date(filled(&query.start_date)) {
        builder.push(" AND r.date >= ");
        builder.push_bind(start);
    }
    if let Some(end) = parse_filter_date(filled(&query.end_date)) {
        builder.push(" AND r.date <= ");
        builder.push_bind(end);
    }

    // Enumerated fields match exactly.
    for (column, value) in [
        ("r.report_type", filled(&query.report_type)),
        ("r.compliance_level", filled(&query.compliance_level)),
        ("r.activity_category", filled(&query.category)),
        ("r.activity_group", filled(&query.activity_group)),
        ("r.activity_type", filled(&query.activity_type)),
    ] {
        if let Some(value) = value {
            builder.push(format!(" AND {column} = "));
            builder.push_bind(value.to_string());
        }
    }

    // Free-text fields match by case-insensitive substring.
    for (column, value) in [
        ("r.facility", filled(&query.facility)),
        ("r.route", filled(&query.route)),
        ("r.spread", filled(&query.spread)),
        ("u.username", filled(&query.author)),
    ] {
        if let Some(value) = value {
            builder.push(format!(" AND lower({column}) LIKE "));
            builder.push_bind(format!("%{}%", value.to_lowercase()));
        }
    }

    builder.push(" ORDER BY r.date DESC, r.id DESC");

    let reports = builder
        .build_query_as::<Report>()
        .fetch_all(&state.db)
        .await?;
    Ok(Json(reports))
}

pub async fn create_report(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(payload): Json<CreateReportRequest>,
) -> ApiResult<(StatusCode, Json<Report>)> {
    let mut errors = FieldErrors::new();
    let date = parse_date(&mut errors, "date", payload.date.as_deref());
    let location = errors
        .require_str("location", payload.location.as_deref())
        .map(str::to_string);
    let weather = errors
        .require_str("weather_conditions", payload.weather_conditions.as_deref())
        .map(str::to_string);
    let activities = errors
        .require_str("daily_activities", payload.daily_activities.as_deref())
        .map(str::to_string);
    if !errors.is_empty() {
        return Err(errors.into());
    }

    let now = Utc::now();
    let id = sqlx::query(
        "INSERT INTO reports (inspector_id, date, location, weather_conditions, daily_activities,
                              report_type, facility, route, spread, compliance_level,
                              activity_category, activity_group, activity_type,
                              milepost_start, milepost_end, station_start, station_end,
                              finalized, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0, ?, ?)",
    )
    .bind(user.id)
    .bind(date)
    .bind(location)
    .bind(weather)
    .bind(activities)
    .bind(&payload.report_type)
    .bind(&payload.facility)
    .bind(&payload.route)
    .bind(&payload.spread)
    .bind(&payload.compliance_level)
    .bind(&payload.activity_category)
    .bind(&payload.activity_group)
    .bind(&payload.activity_type)
    .bind(&payload.milepost_start)
    .bind(&payload.milepost_end)
    .bind(&payload.station_start)
    .bind(&payload.station_end)
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
) -> ApiResult<Json<Report>> {
    Ok(Json(owned_report(&state, user.id, id).await?))
}

/// Partial update; absent fields keep their stored value.
pub async fn update_report(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<CreateReportRequest>,
) -> ApiResult<Json<Report>> {
    let mut report = owned_report(&state, user.id, id).await?;
    if report.finalized {
        return Err(ApiError::conflict("report is finalized"));
    }

    let mut errors = FieldErrors::new();
    if payload.date.is_some() {
        if let Some(date) = parse_date(&mut errors, "date", payload.date.as_deref()) {
            report.date = date;
        }
    }
    if !errors.is_empty() {
        return Err(errors.into());
    }

    if let Some(location) = filled(&payload.location) {
        report.location = location.to_string();
    }
    if let Some(weather) = filled(&payload.weather_conditions) {
        report.weather_conditions = weather.to_string();
    }
    if let Some(activities) = filled(&payload.daily_activities) {
        report.daily_activities = activities.to_string();
    }
    if payload.report_type.is_some() {
        report.report_type = payload.report_type;
    }
    if payload.facility.is_some() {
        report.facility = payload.facility;
    }
    if payload.route.is_some() {
        report.route = payload.route;
    }
    if payload.spread.is_some() {
        report.spread = payload.spread;
    }
    if payload.compliance_level.is_some() {
        report.compliance_level = payload.compliance_level;
    }
    if payload.activity_category.is_some() {
        report.activity_category = payload.activity_category;
    }
    if payload.activity_group.is_some() {
        report.activity_group = payload.activity_group;
    }
    if payload.activity_type.is_some() {
        report.activity_type = payload.activity_type;
    }
    if payload.milepost_start.is_some() {
        report.milepost_start = payload.milepost_start;
    }
    if payload.milepost_end.is_some() {
        report.milepost_end = payload.milepost_end;
    }
    if payload.station_start.is_some() {
        report.station_start = payload.station_start;
    }
    if payload.station_end.is_some() {
        report.station_end = payload.station_end;
    }

    let now = Utc::now();
    sqlx::query(
        "UPDATE reports SET date = ?, location = ?, weather_conditions = ?, daily_activities = ?,
                            report_type = ?, facility = ?, route = ?, spread = ?,
                            compliance_level = ?, activity_category = ?, activity_group = ?,
                            activity_type = ?, milepost_start = ?, milepost_end = ?,
                            station_start = ?, station_end = ?, updated_at = ?
         WHERE id = ?",
    )
    .bind(report.date)
    .bind(&report.location)
    .bind(&report.weather_conditions)
    .bind(&report.daily_activities)
    .bind(&report.report_type)
    .bind(&report.facility)
    .bind(&report.route)
    .bind(&report.spread)
    .bind(&report.compliance_level)
    .bind(&report.activity_category)
    .bind(&report.activity_group)
    .bind(&report.activity_type)
    .bind(&report.milepost_start)
    .bind(&report.milepost_end)
    .bind(&report.station_start)
    .bind(&report.station_end)
    .bind(now)
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
    sqlx::query("DELETE FROM reports WHERE id = ?")
        .bind(id)
        .execute(&state.db)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
