use crate::error::AppError;
use crate::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{post, put};
use axum::{Json, Router};
use pve_backup::models::FtpTarget;
use pve_backup::transfer::TransferOutcome;
use std::sync::Arc;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", put(save_target))
        .route("/test", post(test_target))
}

async fn save_target(
    State(state): State<Arc<AppState>>,
    Json(target): Json<FtpTarget>,
) -> Result<StatusCode, AppError> {
    state
        .blocking(move |service| service.save_ftp_target(target))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Always answers 200; the outcome carries success or failure.
async fn test_target(
    State(state): State<Arc<AppState>>,
    Json(target): Json<FtpTarget>,
) -> Result<Json<TransferOutcome>, AppError> {
    let outcome = state
        .blocking(move |service| Ok(service.test_connection(&target)))
        .await?;
    Ok(Json(outcome))
}
