pub mod handlers;
pub mod params;

use crate::app::AppState;
use crate::config::AppConfig;
use crate::utils::error::{DashboardError, Result};
use axum::routing::get;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/transactions", get(handlers::transactions))
        .route("/api/statistics", get(handlers::statistics))
        .route("/api/bar-chart", get(handlers::bar_chart))
        .route("/api/pie-chart", get(handlers::pie_chart))
        .route("/api/combined-data", get(handlers::combined_data))
        .route("/api/initialize-db", get(handlers::initialize_db))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

pub async fn serve(config: &AppConfig, state: Arc<AppState>) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| DashboardError::InvalidConfigValueError {
            field: "server.host".to_string(),
            value: config.host.clone(),
            reason: format!("Invalid listen address: {}", e),
        })?;

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("🚀 Server is running on http://{}", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
