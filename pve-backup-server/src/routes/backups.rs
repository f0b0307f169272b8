use crate::error::AppError;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get};
use axum::{Json, Router};
use pve_backup::models::BackupRecord;
use std::sync::Arc;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_backups).post(run_backup))
        .route("/{id}", delete(delete_backup))
}

async fn list_backups(State(state): State<Arc<AppState>>) -> Result<Json<Vec<BackupRecord>>, AppError> {
    let history = state.blocking(|service| service.history()).await?;
    Ok(Json(history))
}

/// Runs synchronously; the response arrives once the upload finished or failed.
async fn run_backup(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<BackupRecord>), AppError> {
    let record = state.blocking(|service| service.run_backup_now()).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn delete_backup(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id2 = id.clone();
    let deleted = state
        .blocking(move |service| service.delete_record(&id2))
        .await?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Backup {} not found", id)))
    }
}
