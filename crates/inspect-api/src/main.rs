//! Field Inspection Reporting API Server

use std::sync::Arc;

use inspect_api::{build_router, AppConfig, AppState};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "inspect_api=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Field Inspection Reporting API Server");

    let config = AppConfig::default();

    // Create upload directory
    std::fs::create_dir_all(&config.upload_dir).expect("Failed to create upload directory");

    // Connect to database
    let db = inspect_api::db::connect(&config.database_url, 10)
        .await
        .expect("Failed to connect to database");

    info!("Connected to database");

    // Run migrations
    inspect_api::db::migrate(&db)
        .await
        .expect("Failed to run migrations");

    info!("Database migrations complete");

    let bind_addr = config.bind_addr.clone();
    let state = Arc::new(AppState { db, config });
    let app = build_router(state);

    info!("Listening on {}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .expect("Failed to bind listener");
    axum::serve(listener, app).await.expect("Server error");
}
