//! Route definitions for the Crop Advisory Platform

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Auth routes (public + /me)
        .nest("/auth", auth_routes(state.clone()))
        // Protected routes - onboarding pipeline
        .nest("/onboarding", onboarding_routes(state.clone()))
        // Protected routes - reports
        .nest("/reports", report_routes(state.clone()))
        // Protected routes - expert chat
        .nest("/chat", chat_routes(state))
}

/// Authentication routes
fn auth_routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/me", get(handlers::me))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        .merge(protected)
}

/// Onboarding routes (protected)
fn onboarding_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::submit))
        .route("/jobs", post(handlers::start_job))
        .route("/jobs/:job_id", get(handlers::job_status))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Report routes (protected)
fn report_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_reports))
        .route("/:report_id", get(handlers::get_report))
        .route("/:report_id/summary", get(handlers::get_report_summary))
        .route("/:report_id/status", put(handlers::update_report_status))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Expert chat routes (protected)
fn chat_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::ask_expert))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
