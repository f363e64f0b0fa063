//! File handlers for both parents.
//!
//! Study files are nested under the study (`/studies/{study}/files`); trial
//! files live under the separate `/files/{study}/{trial}` root.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use xhub_core::{Resource, ResourcePath, Scope};

use crate::error::ApiError;
use crate::schema::CreateResourceRequest;
use crate::state::AppState;

/// `GET /studies/{study}/files`
pub async fn list_study_files(
    State(state): State<AppState>,
    Path(study): Path<String>,
) -> Result<Json<Vec<Resource>>, ApiError> {
    super::list_in(&state, Scope::study_files(study))
}

/// `POST /studies/{study}/files`
pub async fn create_study_file(
    State(state): State<AppState>,
    Path(study): Path<String>,
    req: Result<Json<CreateResourceRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Resource>), ApiError> {
    super::create_in(&state, Scope::study_files(study), req)
}

/// `GET /studies/{study}/files/{file}`
pub async fn get_study_file(
    State(state): State<AppState>,
    Path((study, file)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    super::fetch(&state, ResourcePath::study_file(study, file))
}

/// `DELETE /studies/{study}/files/{file}`
pub async fn delete_study_file(
    State(state): State<AppState>,
    Path((study, file)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>, ApiError> {
    super::remove(&state, ResourcePath::study_file(study, file))
}

/// `GET /files/{study}/{trial}`
pub async fn list_trial_files(
    State(state): State<AppState>,
    Path((study, trial)): Path<(String, String)>,
) -> Result<Json<Vec<Resource>>, ApiError> {
    super::list_in(&state, Scope::trial_files(study, trial))
}

/// `POST /files/{study}/{trial}`
pub async fn create_trial_file(
    State(state): State<AppState>,
    Path((study, trial)): Path<(String, String)>,
    req: Result<Json<CreateResourceRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Resource>), ApiError> {
    super::create_in(&state, Scope::trial_files(study, trial), req)
}

/// `GET /files/{study}/{trial}/{file}`
pub async fn get_trial_file(
    State(state): State<AppState>,
    Path((study, trial, file)): Path<(String, String, String)>,
) -> Result<Response, ApiError> {
    super::fetch(&state, ResourcePath::trial_file(study, trial, file))
}

/// `DELETE /files/{study}/{trial}/{file}`
pub async fn delete_trial_file(
    State(state): State<AppState>,
    Path((study, trial, file)): Path<(String, String, String)>,
) -> Result<Json<serde_json::Value>, ApiError> {
    super::remove(&state, ResourcePath::trial_file(study, trial, file))
}
