pub mod auto_backup;
pub mod backups;
pub mod ftp;
pub mod items;

use crate::error::AppError;
use crate::state::AppState;
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use pve_backup::service::Overview;
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/overview", get(overview))
        .nest("/api/ftp", ftp::router())
        .nest("/api/items", items::router())
        .nest("/api/backups", backups::router())
        .nest("/api/auto-backup", auto_backup::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "port": state.config.port,
    }))
}

async fn overview(State(state): State<Arc<AppState>>) -> Result<Json<Overview>, AppError> {
    let overview = state.blocking(|service| service.overview()).await?;
    Ok(Json(overview))
}
