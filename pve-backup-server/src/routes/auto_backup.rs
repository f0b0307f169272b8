//! Automatic backup preferences. Stored for the UI; no scheduler reads them.

use crate::error::AppError;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::routing::{post, put};
use axum::{Json, Router};
use serde_json::json;
use std::sync::Arc;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/toggle", post(toggle_auto_backup))
        .route("/frequency/{frequency}", put(set_frequency))
}

async fn toggle_auto_backup(State(state): State<Arc<AppState>>) -> Result<Json<serde_json::Value>, AppError> {
    let enabled = state.blocking(|service| service.toggle_auto_backup()).await?;
    Ok(Json(json!({ "enabled": enabled })))
}

async fn set_frequency(
    State(state): State<Arc<AppState>>,
    Path(frequency): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let frequency = state
        .blocking(move |service| service.set_frequency(&frequency))
        .await?;
    Ok(Json(json!({ "frequency": frequency.to_string() })))
}
