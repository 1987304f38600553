use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints with fixed paths. None of them renders a template.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health-check
        // JSON report of configuration, process and system facts.
        .route("/health-check", get(handlers::health_check))
        // GET /error
        // Always fails, to exercise the 500 path.
        .route("/error", get(handlers::simulate_error))
        // POST /api
        // Action dispatch (`{handler, ...}`), e.g. the login form.
        .route("/api", post(handlers::api_action))
        // GET /logout
        // Clears the session cookie and returns to the root page.
        .route("/logout", get(handlers::logout))
}
