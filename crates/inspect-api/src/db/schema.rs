//! Row types for every table, mapped with `sqlx::FromRow`.
//!
//! Rows double as the JSON representation for report entities; credential
//! columns on `users` stay out of any `Serialize` derive.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub password_salt: String,
    pub first_name: String,
    pub last_name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, FromRow, Serialize)]
pub struct Contact {
    pub id: i64,
    pub user_id: i64,
    pub phone_number: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
pub struct AuthToken {
    pub key: String,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, FromRow, Serialize)]
pub struct Report {
    pub id: i64,
    pub inspector_id: i64,
    pub date: NaiveDate,
    pub location: String,
    pub weather_conditions: String,
    pub daily_activities: String,
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
    pub finalized: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, FromRow, Serialize)]
pub struct CoatingReport {
    pub id: i64,
    pub inspector_id: i64,
    pub date: NaiveDate,
    pub contractor: Option<String>,
    pub report_number: Option<String>,
    pub oq_personnel: Option<String>,
    pub facility_id: Option<String>,
    pub purchase_order: Option<String>,
    pub location: String,
    pub qa_inspector: Option<String>,
    pub weather_conditions: String,
    pub temperature: f64,
    pub humidity: f64,
    pub notes: String,
    pub finalized: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, FromRow, Serialize)]
pub struct CoatingInspection {
    pub id: i64,
    pub report_id: i64,
    pub surface_type: String,
    pub coating_type: String,
    pub surface_area: f64,
    pub surface_preparation: String,
    pub coating_thickness: f64,
    pub temperature: f64,
    pub humidity: f64,
    pub visual_inspection: bool,
    pub adhesion_test: bool,
    pub adhesion_test_results: String,
    pub defects_found: bool,
    pub defect_description: String,
    pub corrective_action: String,
    pub passed: bool,
    pub notes: String,
    pub application_method: String,
    pub wft_mils: Option<f64>,
    pub mix_number: String,
    pub quantity_used: Option<f64>,
    pub witnessed: bool,
    pub backfill_used: bool,
    pub rock_shield_used: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, FromRow, Serialize)]
pub struct CoatingOversightItem {
    pub id: i64,
    pub report_id: i64,
    pub item_number: i64,
    pub description: String,
    pub status: String,
    pub comments: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, FromRow, Serialize)]
pub struct WeldReport {
    pub id: i64,
    pub inspector_id: i64,
    pub date: NaiveDate,
    pub project: Option<String>,
    pub contractor: Option<String>,
    pub construction_wbs: String,
    pub retirement_wbs: String,
    pub activity: String,
    pub hours_worked: Option<f64>,
    pub welders_onsite: Option<i64>,
    pub location: String,
    pub weather_conditions: String,
    pub temperature: f64,
    pub humidity: f64,
    pub notes: String,
    pub finalized: bool,
    pub welds_fab_to_date: i64,
    pub welds_fab_today: i64,
    pub welds_fab_total: i64,
    pub welds_onsite_to_date: i64,
    pub welds_onsite_today: i64,
    pub welds_onsite_total: i64,
    pub welds_tiein_to_date: i64,
    pub welds_tiein_today: i64,
    pub welds_tiein_total: i64,
    pub welds_test_to_date: i64,
    pub welds_test_today: i64,
    pub welds_test_total: i64,
    pub xray_fab_to_date: i64,
    pub xray_fab_today: i64,
    pub xray_fab_total: i64,
    pub xray_onsite_to_date: i64,
    pub xray_onsite_today: i64,
    pub xray_onsite_total: i64,
    pub xray_tiein_to_date: i64,
    pub xray_tiein_today: i64,
    pub xray_tiein_total: i64,
    pub xray_test_to_date: i64,
    pub xray_test_today: i64,
    pub xray_test_total: i64,
    pub welding_inspector_name: Option<String>,
    pub contractor_signature: String,
    pub supervisor_signature: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, FromRow, Serialize)]
pub struct WeldInspection {
    pub id: i64,
    pub report_id: i64,
    pub weld_number: String,
    pub weld_type: String,
    pub position: String,
    pub joint_type: String,
    pub material_type: String,
    pub thickness: f64,
    pub length: f64,
    pub preheat_temp: Option<f64>,
    pub interpass_temp: Option<f64>,
    pub post_weld_temp: Option<f64>,
    pub visual_inspection: bool,
    pub ndt_performed: bool,
    pub ndt_method: String,
    pub ndt_results: String,
    pub defects_found: bool,
    pub defect_description: String,
    pub corrective_action: String,
    pub passed: bool,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, FromRow, Serialize)]
pub struct UtilityReport {
    pub id: i64,
    pub inspector_id: i64,
    pub date: NaiveDate,
    pub contractor: Option<String>,
    pub location: String,
    pub weather_conditions: String,
    pub temperature: f64,
    pub humidity: f64,
    pub notes: String,
    pub finalized: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, FromRow, Serialize)]
pub struct UtilityInspection {
    pub id: i64,
    pub report_id: i64,
    pub utility_type: String,
    pub location: String,
    pub description: String,
    pub status: String,
    pub issues_found: bool,
    pub issue_description: String,
    pub corrective_action: String,
    pub completed: bool,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, FromRow, Serialize)]
pub struct SwpppReport {
    pub id: i64,
    pub created_by: i64,
    pub inspection_type: String,
    pub inspection_date: NaiveDate,
    pub precipitation_date: Option<NaiveDate>,
    pub inspector_name: String,
    pub precipitation_rain_gage: bool,
    pub precipitation_rain: bool,
    pub precipitation_snow: bool,
    pub soil_dry: bool,
    pub soil_wet: bool,
    pub soil_saturated: bool,
    pub soil_frozen: bool,
    pub notes: String,
    pub weather_conditions: String,
    pub additional_comments: String,
    pub finalized: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, FromRow, Serialize)]
pub struct SwpppItem {
    pub id: i64,
    pub report_id: i64,
    pub location: String,
    pub ll_number: String,
    pub feature_details: String,
    pub inspector_id: String,
    pub soil_presently_disturbed: bool,
    pub inspection_date: Option<NaiveDate>,
    pub inspection_time: Option<NaiveTime>,
    pub ecd_functional: bool,
    pub ecd_needs_maintenance: bool,
    pub date_corrected: Option<NaiveDate>,
    pub comments: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, FromRow, Serialize)]
pub struct PunchlistReport {
    pub id: i64,
    pub created_by: i64,
    pub title: String,
    pub date: NaiveDate,
    pub finalized: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, FromRow, Serialize)]
pub struct PunchlistItem {
    pub id: i64,
    pub report_id: i64,
    pub item_number: Option<i64>,
    pub spread: String,
    pub inspector: String,
    pub start_station: String,
    pub end_station: String,
    pub feature: String,
    pub issue: String,
    pub recommendations: String,
    pub completed: bool,
    pub inspector_signoff: Option<i64>,
    pub completed_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Photo rows share one shape; `parent_id` aliases the owning FK column.
#[derive(Debug, FromRow, Serialize)]
pub struct Photo {
    pub id: i64,
    pub parent_id: i64,
    pub image_path: String,
    pub description: String,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, FromRow, Serialize)]
pub struct SwpppPhoto {
    pub id: i64,
    pub report_id: i64,
    pub image_path: String,
    pub location: String,
    pub description: String,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
pub struct ProgressChart {
    pub id: i64,
    pub activity: String,
    pub progress_data: String,
    pub updated_at: DateTime<Utc>,
}
