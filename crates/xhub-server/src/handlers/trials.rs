//! Trial handlers.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use xhub_core::{Resource, ResourcePath, Scope};

use crate::error::ApiError;
use crate::schema::CreateResourceRequest;
use crate::state::AppState;

/// `GET /studies/{study}/trials`
pub async fn list_trials(
    State(state): State<AppState>,
    Path(study): Path<String>,
) -> Result<Json<Vec<Resource>>, ApiError> {
    super::list_in(&state, Scope::trials(study))
}

/// `POST /studies/{study}/trials`
pub async fn create_trial(
    State(state): State<AppState>,
    Path(study): Path<String>,
    req: Result<Json<CreateResourceRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Resource>), ApiError> {
    super::create_in(&state, Scope::trials(study), req)
}

/// `GET /studies/{study}/trials/{trial}`
pub async fn get_trial(
    State(state): State<AppState>,
    Path((study, trial)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    super::fetch(&state, ResourcePath::trial(study, trial))
}

/// Deletes a trial and its files. Study files and sibling trials are kept.
///
/// `DELETE /studies/{study}/trials/{trial}`
pub async fn delete_trial(
    State(state): State<AppState>,
    Path((study, trial)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>, ApiError> {
    super::remove(&state, ResourcePath::trial(study, trial))
}
