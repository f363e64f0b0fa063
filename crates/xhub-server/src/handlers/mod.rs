//! HTTP handler modules for the xhub API.
//!
//! Each sub-module implements thin handlers that turn route parameters into a
//! `Scope` or `ResourcePath`, delegate to the shared [`ResourceRepository`],
//! and return JSON responses. The four operations are identical for every
//! kind, so the bodies live here and the per-kind modules only pick the
//! scope.
//!
//! [`ResourceRepository`]: xhub_storage::ResourceRepository

pub mod files;
pub mod health;
pub mod studies;
pub mod trials;

use axum::extract::rejection::JsonRejection;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use xhub_core::{Resource, ResourcePath, Scope};

use crate::error::ApiError;
use crate::schema::CreateResourceRequest;
use crate::state::AppState;

fn create_in(
    state: &AppState,
    scope: Scope,
    req: Result<Json<CreateResourceRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Resource>), ApiError> {
    let Json(req) = req?;
    let path = scope.resolve(&req.id)?;
    let resource = state.repository.put(&path, req.payload())?;
    Ok((StatusCode::CREATED, Json(resource)))
}

/// Serves the stored payload as-is.
fn fetch(state: &AppState, path: ResourcePath) -> Result<Response, ApiError> {
    match state.repository.get(&path)? {
        Some(payload) => {
            Ok(([(header::CONTENT_TYPE, "application/json")], payload).into_response())
        }
        None => Err(ApiError::NotFound(format!("{path} does not exist"))),
    }
}

fn list_in(state: &AppState, scope: Scope) -> Result<Json<Vec<Resource>>, ApiError> {
    Ok(Json(state.repository.list(&scope)?))
}

fn remove(state: &AppState, path: ResourcePath) -> Result<Json<serde_json::Value>, ApiError> {
    state.repository.delete(&path)?;
    Ok(Json(serde_json::json!({ "success": true })))
}
