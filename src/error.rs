use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::renderer::RenderError;

/// The only body a client ever sees for a server-side fault.
pub const SERVER_ERROR_BODY: &str = "Server Error";

/// AppError
///
/// Faults that escape a handler. Auth and routing failures never become an
/// `AppError`; they are answered locally with a redirect or a bare status.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The resolver picked a template the renderer could not produce.
    #[error("failed to render template `{template}`: {source}")]
    Render {
        template: String,
        #[source]
        source: RenderError,
    },

    /// Signing a fresh session token failed.
    #[error("failed to sign session token: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    /// A deliberate fault, raised by the diagnostic route.
    #[error("simulated fault: {0}")]
    Fault(&'static str),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("invalid JSON fixture: {0}")]
    Json(#[from] serde_json::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, SERVER_ERROR_BODY).into_response()
    }
}
