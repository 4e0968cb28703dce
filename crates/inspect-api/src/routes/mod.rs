//! API routes

pub mod auth;
pub mod coating;
pub mod contacts;
pub mod progress;
pub mod punchlist;
pub mod reports;
pub mod swppp;
pub mod utility;
pub mod welding;

use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
