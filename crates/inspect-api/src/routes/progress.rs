//! Progress chart routes. Each activity keeps one row of cumulative counts,
//! stored as JSON text and replaced wholesale on upsert.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::auth::AuthUser;
use crate::db::schema::ProgressChart;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Serialize)]
pub struct ChartResponse {
    pub activity: String,
    pub progress_data: Vec<i64>,
}

#[derive(Deserialize)]
pub struct UpsertChartRequest {
    pub progress_data: Vec<i64>,
}

fn chart_response(chart: ProgressChart) -> ApiResult<ChartResponse> {
    let progress_data = serde_json::from_str(&chart.progress_data)
        .map_err(|_| ApiError::bad_request("stored progress data is not valid JSON"))?;
    Ok(ChartResponse {
        activity: chart.activity,
        progress_data,
    })
}

pub async fn list_charts(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
) -> ApiResult<Json<Vec<ChartResponse>>> {
    let charts =
        sqlx::query_as::<_, ProgressChart>("SELECT * FROM progress_charts ORDER BY activity")
            .fetch_all(&state.db)
            .await?;
    let charts = charts
        .into_iter()
        .map(chart_response)
        .collect::<ApiResult<Vec<_>>>()?;
    Ok(Json(charts))
}

pub async fn upsert_chart(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Path(activity): Path<String>,
    Json(payload): Json<UpsertChartRequest>,
) -> ApiResult<Json<ChartResponse>> {
    let activity = activity.trim().to_string();
    if activity.is_empty() {
        return Err(ApiError::bad_request("activity must not be empty"));
    }
    let data = serde_json::to_string(&payload.progress_data)
        .map_err(|_| ApiError::bad_request("progress data is not serializable"))?;

    sqlx::query(
        "INSERT INTO progress_charts (activity, progress_data, updated_at)
         VALUES (?, ?, ?)
         ON CONFLICT(activity) DO UPDATE SET progress_data = excluded.progress_data,
                updated_at = excluded.updated_at",
    )
    .bind(&activity)
    .bind(&data)
    .bind(Utc::now())
    .execute(&state.db)
    .await?;

    let chart = sqlx::query_as::<_, ProgressChart>(
        "SELECT * FROM progress_charts WHERE activity = ?",
    )
    .bind(&activity)
    .fetch_one(&state.db)
    .await?;
    Ok(Json(chart_response(chart)?))
}
