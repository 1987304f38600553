use std::{any::Any, sync::Arc, time::Instant};

use axum::{
    Router,
    extract::FromRef,
    http::{HeaderName, StatusCode},
    response::{IntoResponse, Response},
};
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod actions;
pub mod auth;
pub mod config;
pub mod context;
pub mod error;
pub mod handlers;
pub mod health;
pub mod models;
pub mod renderer;
pub mod repository;
pub mod resolver;

pub mod routes;
use routes::{pages, public};

// --- Public Re-exports ---

pub use auth::TokenVerifier;
pub use config::AppConfig;
pub use context::{ContextBuilder, RenderContext};
pub use renderer::{HandlebarsRenderer, RendererState};
pub use repository::{RepositoryState, StaticRepository};
pub use resolver::TemplateResolver;

/// AppState
///
/// Everything a request may read. Built once at startup and never mutated,
/// so request tasks share it through `Arc`s without locking.
#[derive(Clone)]
pub struct AppState {
    /// Loaded, immutable process configuration.
    pub config: AppConfig,
    /// Read-only demo dataset and credential mapping.
    pub repo: RepositoryState,
    /// Template engine boundary.
    pub renderer: RendererState,
    /// Session token signing and verification.
    pub verifier: TokenVerifier,
    /// Path classification.
    pub resolver: Arc<TemplateResolver>,
    /// Render context assembly.
    pub contexts: ContextBuilder,
    /// Theme configuration, merged first into every render context.
    pub theme: Arc<RenderContext>,
    /// Process start, for the health check.
    pub started_at: Instant,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        repo: RepositoryState,
        renderer: RendererState,
        theme: RenderContext,
    ) -> Self {
        let theme = Arc::new(theme);
        Self {
            verifier: TokenVerifier::new(&config.jwt_secret),
            resolver: Arc::new(TemplateResolver::new(&config.theme_path, repo.clone())),
            contexts: ContextBuilder::new(theme.clone(), repo.clone()),
            config,
            repo,
            renderer,
            theme,
            started_at: Instant::now(),
        }
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for TokenVerifier {
    fn from_ref(app_state: &AppState) -> TokenVerifier {
        app_state.verifier.clone()
    }
}

/// create_router
///
/// Mounts the fixed routes, then the page pipeline as the fallback, then the
/// observability layers around all of it.
pub fn create_router(state: AppState) -> Router {
    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(public::public_routes())
        .merge(pages::page_routes())
        .with_state(state);

    base_router.layer(
        ServiceBuilder::new()
            // Request ID generation: one UUID per incoming request.
            .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(trace_span_logger)
                    .on_response(
                        DefaultOnResponse::new()
                            .level(Level::INFO)
                            .latency_unit(tower_http::LatencyUnit::Millis),
                    ),
            )
            .layer(PropagateRequestIdLayer::new(x_request_id))
            // Innermost, so a panicking handler still shows up as a traced 500.
            .layer(CatchPanicLayer::custom(handle_panic)),
    )
}

/// Turns a handler panic into the same opaque 500 as any other fault.
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(message) = err.downcast_ref::<String>() {
        message.as_str()
    } else if let Some(message) = err.downcast_ref::<&str>() {
        message
    } else {
        "unknown panic payload"
    };
    tracing::error!(detail, "handler panicked");
    (StatusCode::INTERNAL_SERVER_ERROR, error::SERVER_ERROR_BODY).into_response()
}

/// trace_span_logger
///
/// Span for `TraceLayer`: method, uri and the request id, so every log line of
/// a request can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
