use crate::error::AppError;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::json;
use std::sync::Arc;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/{index}/toggle", post(toggle_item))
}

async fn toggle_item(
    State(state): State<Arc<AppState>>,
    Path(index): Path<usize>,
) -> Result<Json<serde_json::Value>, AppError> {
    let selected = state
        .blocking(move |service| service.toggle_item(index))
        .await?;
    match selected {
        Some(selected) => Ok(Json(json!({ "index": index, "selected": selected }))),
        None => Err(AppError::NotFound(format!("No item at position {}", index))),
    }
}
