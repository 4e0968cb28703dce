//! Field Inspection Reporting API Server
//!
//! Axum service exposing token-authenticated CRUD over the six report
//! families: generic daily reports, coating, welding, utility,
//! environmental/SWPPP, and punchlists.

pub mod auth;
pub mod db;
pub mod error;
pub mod routes;
pub mod uploads;

use std::sync::Arc;

use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers
pub struct AppState {
    pub db: sqlx::SqlitePool,
    pub config: AppConfig,
}

/// Application configuration
#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: String,
    pub upload_dir: String,
    pub max_upload_size: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://inspection.db".to_string()),
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            upload_dir: std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "./data/uploads".to_string()),
            max_upload_size: 25 * 1024 * 1024, // 25MB per photo
        }
    }
}

/// Build the full application router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check
        .route("/health", get(routes::health_check))
        // Authentication
        .route("/api/register", post(routes::auth::register))
        .route("/api/login", post(routes::auth::login))
        .route("/api/token/verify", post(routes::auth::verify_token))
        .route("/api/logout", post(routes::auth::logout))
        // Contact profiles
        .route(
            "/api/contacts",
            get(routes::contacts::list_contacts).put(routes::contacts::update_phone),
        )
        // Generic daily reports with search
        .route(
            "/api/reports",
            get(routes::reports::list_reports).post(routes::reports::create_report),
        )
        .route(
            "/api/reports/:id",
            get(routes::reports::get_report)
                .put(routes::reports::update_report)
                .patch(routes::reports::update_report)
                .delete(routes::reports::delete_report),
        )
        // Coating
        .route(
            "/api/coating/reports",
            get(routes::coating::list_reports).post(routes::coating::create_report),
        )
        .route(
            "/api/coating/reports/:id",
            get(routes::coating::get_report)
                .put(routes::coating::update_report)
                .patch(routes::coating::update_report)
                .delete(routes::coating::delete_report),
        )
        .route("/api/coating/reports/:id/finalize", post(routes::coating::finalize))
        .route(
            "/api/coating/reports/:id/unfinalize",
            post(routes::coating::unfinalize),
        )
        .route(
            "/api/coating/reports/:id/inspections",
            get(routes::coating::list_inspections).post(routes::coating::create_inspection),
        )
        .route(
            "/api/coating/inspections/:id",
            get(routes::coating::get_inspection)
                .put(routes::coating::update_inspection)
                .patch(routes::coating::update_inspection)
                .delete(routes::coating::delete_inspection),
        )
        .route(
            "/api/coating/inspections/:id/photos",
            get(routes::coating::list_photos).post(routes::coating::upload_photo),
        )
        .route("/api/coating/photos/:id", axum::routing::delete(routes::coating::delete_photo))
        .route(
            "/api/coating/reports/:id/oversight",
            get(routes::coating::list_oversight).post(routes::coating::create_oversight),
        )
        .route(
            "/api/coating/oversight/:id",
            put(routes::coating::update_oversight)
                .patch(routes::coating::update_oversight)
                .delete(routes::coating::delete_oversight),
        )
        // Welding
        .route(
            "/api/welding/reports",
            get(routes::welding::list_reports).post(routes::welding::create_report),
        )
        .route(
            "/api/welding/reports/:id",
            get(routes::welding::get_report)
                .put(routes::welding::update_report)
                .patch(routes::welding::update_report)
                .delete(routes::welding::delete_report),
        )
        .route("/api/welding/reports/:id/finalize", post(routes::welding::finalize))
        .route(
            "/api/welding/reports/:id/unfinalize",
            post(routes::welding::unfinalize),
        )
        .route(
            "/api/welding/reports/:id/inspections",
            get(routes::welding::list_inspections).post(routes::welding::create_inspection),
        )
        .route(
            "/api/welding/inspections/:id",
            get(routes::welding::get_inspection)
                .put(routes::welding::update_inspection)
                .patch(routes::welding::update_inspection)
                .delete(routes::welding::delete_inspection),
        )
        .route(
            "/api/welding/inspections/:id/photos",
            get(routes::welding::list_photos).post(routes::welding::upload_photo),
        )
        .route("/api/welding/photos/:id", axum::routing::delete(routes::welding::delete_photo))
        // Utility
        .route(
            "/api/utility/reports",
            get(routes::utility::list_reports).post(routes::utility::create_report),
        )
        .route(
            "/api/utility/reports/:id",
            get(routes::utility::get_report)
                .put(routes::utility::update_report)
                .patch(routes::utility::update_report)
                .delete(routes::utility::delete_report),
        )
        .route("/api/utility/reports/:id/finalize", post(routes::utility::finalize))
        .route(
            "/api/utility/reports/:id/unfinalize",
            post(routes::utility::unfinalize),
        )
        .route(
            "/api/utility/reports/:id/inspections",
            get(routes::utility::list_inspections).post(routes::utility::create_inspection),
        )
        .route(
            "/api/utility/inspections/:id",
            get(routes::utility::get_inspection)
                .put(routes::utility::update_inspection)
                .patch(routes::utility::update_inspection)
                .delete(routes::utility::delete_inspection),
        )
        .route(
            "/api/utility/inspections/:id/photos",
            get(routes::utility::list_photos).post(routes::utility::upload_photo),
        )
        .route("/api/utility/photos/:id", axum::routing::delete(routes::utility::delete_photo))
        // Environmental / SWPPP
        .route(
            "/api/swppp/reports",
            get(routes::swppp::list_reports).post(routes::swppp::create_report),
        )
        .route(
            "/api/swppp/reports/:id",
            get(routes::swppp::get_report)
                .put(routes::swppp::update_report)
                .patch(routes::swppp::update_report)
                .delete(routes::swppp::delete_report),
        )
        .route("/api/swppp/reports/:id/finalize", post(routes::swppp::finalize))
        .route("/api/swppp/reports/:id/unfinalize", post(routes::swppp::unfinalize))
        .route(
            "/api/swppp/reports/:id/items",
            get(routes::swppp::list_items).post(routes::swppp::create_item),
        )
        .route(
            "/api/swppp/items/:id",
            get(routes::swppp::get_item)
                .put(routes::swppp::update_item)
                .patch(routes::swppp::update_item)
                .delete(routes::swppp::delete_item),
        )
        .route(
            "/api/swppp/reports/:id/photos",
            get(routes::swppp::list_photos).post(routes::swppp::upload_photo),
        )
        .route("/api/swppp/photos/:id", axum::routing::delete(routes::swppp::delete_photo))
        // Punchlists
        .route(
            "/api/punchlists",
            get(routes::punchlist::list_reports).post(routes::punchlist::create_report),
        )
        .route(
            "/api/punchlists/:id",
            get(routes::punchlist::get_report)
                .put(routes::punchlist::update_report)
                .patch(routes::punchlist::update_report)
                .delete(routes::punchlist::delete_report),
        )
        .route("/api/punchlists/:id/finalize", post(routes::punchlist::finalize))
        .route("/api/punchlists/:id/unfinalize", post(routes::punchlist::unfinalize))
        .route(
            "/api/punchlists/:id/items",
            get(routes::punchlist::list_items).post(routes::punchlist::create_item),
        )
        .route(
            "/api/punchlists/:id/items/batch",
            post(routes::punchlist::batch_create_items),
        )
        .route(
            "/api/punchlists/:id/items/resequence",
            post(routes::punchlist::resequence_items),
        )
        .route(
            "/api/punchlists/items/:id",
            get(routes::punchlist::get_item)
                .put(routes::punchlist::update_item)
                .patch(routes::punchlist::update_item)
                .delete(routes::punchlist::delete_item),
        )
        .route(
            "/api/punchlists/items/:id/photos",
            get(routes::punchlist::list_photos).post(routes::punchlist::upload_photo),
        )
        .route(
            "/api/punchlists/photos/:id",
            axum::routing::delete(routes::punchlist::delete_photo),
        )
        // Progress charts
        .route("/api/progress-charts", get(routes::progress::list_charts))
        .route(
            "/api/progress-charts/:activity",
            put(routes::progress::upsert_chart),
        )
        // CORS
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        // Tracing
        .layer(TraceLayer::new_for_http())
        // State
        .with_state(state)
}
