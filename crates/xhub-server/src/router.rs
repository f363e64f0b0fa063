//! Router assembly for the xhub HTTP API.
//!
//! [`build_router`] wires all handler functions to their routes with
//! CORS and tracing middleware layers.

use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Builds the complete axum router with all API routes.
///
/// Routes use axum 0.8 `/{param}` path syntax. TraceLayer provides
/// request-level logging via tracing.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health))
        // Studies
        .route(
            "/studies",
            get(handlers::studies::list_studies).post(handlers::studies::create_study),
        )
        .route(
            "/studies/{study}",
            get(handlers::studies::get_study).delete(handlers::studies::delete_study),
        )
        // Trials
        .route(
            "/studies/{study}/trials",
            get(handlers::trials::list_trials).post(handlers::trials::create_trial),
        )
        .route(
            "/studies/{study}/trials/{trial}",
            get(handlers::trials::get_trial).delete(handlers::trials::delete_trial),
        )
        // Study files
        .route(
            "/studies/{study}/files",
            get(handlers::files::list_study_files).post(handlers::files::create_study_file),
        )
        .route(
            "/studies/{study}/files/{file}",
            get(handlers::files::get_study_file).delete(handlers::files::delete_study_file),
        )
        // Trial files
        .route(
            "/files/{study}/{trial}",
            get(handlers::files::list_trial_files).post(handlers::files::create_trial_file),
        )
        .route(
            "/files/{study}/{trial}/{file}",
            get(handlers::files::get_trial_file).delete(handlers::files::delete_trial_file),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
