//! Study handlers.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use xhub_core::{Resource, ResourcePath, Scope};

use crate::error::ApiError;
use crate::schema::CreateResourceRequest;
use crate::state::AppState;

/// Lists all studies with their creation timestamps.
///
/// `GET /studies`
pub async fn list_studies(
    State(state): State<AppState>,
) -> Result<Json<Vec<Resource>>, ApiError> {
    super::list_in(&state, Scope::Studies)
}

/// Creates or replaces a study.
///
/// `POST /studies`
pub async fn create_study(
    State(state): State<AppState>,
    req: Result<Json<CreateResourceRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Resource>), ApiError> {
    super::create_in(&state, Scope::Studies, req)
}

/// `GET /studies/{study}`
pub async fn get_study(
    State(state): State<AppState>,
    Path(study): Path<String>,
) -> Result<Response, ApiError> {
    super::fetch(&state, ResourcePath::study(study))
}

/// Deletes a study together with its trials and every file under it.
///
/// `DELETE /studies/{study}`
pub async fn delete_study(
    State(state): State<AppState>,
    Path(study): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    super::remove(&state, ResourcePath::study(study))
}
