//! Liveness endpoint.

use axum::extract::State;
use axum::Json;

use crate::error::ApiError;
use crate::state::AppState;

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Result<Json<serde_json::Value>, ApiError> {
    state.repository.check_health()?;
    Ok(Json(serde_json::json!({ "status": "ok" })))
}
