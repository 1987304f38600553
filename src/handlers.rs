use std::{convert::Infallible, path::Path};

use axum::{
    Form, Json,
    body::Body,
    extract::{FromRequest, Request, State},
    http::{HeaderValue, Method, StatusCode, header},
    response::{Html, IntoResponse, Response},
};
use serde_json::Value;
use tower::ServiceExt;
use tower_http::services::ServeFile;

use crate::{
    AppState,
    actions::{self, ActionOutcome, LOGIN_REQUIRED, found},
    auth::{SessionToken, TokenVerifier},
    context::RequestView,
    error::AppError,
    health,
    models::ApiRequest,
    renderer::RenderError,
    repository::RepositoryState,
    resolver::Route,
};

/// ApiPayload Extractor
///
/// Reads the `POST /api` body as JSON when the client says so, and as an
/// urlencoded form otherwise. A body that does not parse becomes an empty
/// payload, which the dispatcher answers with 400.
pub struct ApiPayload(pub ApiRequest);

impl<S> FromRequest<S> for ApiPayload
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("application/json"));

        let parsed = if is_json {
            Json::<ApiRequest>::from_request(req, state)
                .await
                .map(|Json(payload)| payload)
                .map_err(|rejection| rejection.body_text())
        } else {
            Form::<ApiRequest>::from_request(req, state)
                .await
                .map(|Form(payload)| payload)
                .map_err(|rejection| rejection.body_text())
        };

        Ok(ApiPayload(parsed.unwrap_or_else(|reason| {
            tracing::debug!(%reason, "unparsable api body");
            ApiRequest::default()
        })))
    }
}

// --- Handlers ---

/// api_action
///
/// `POST /api`. Dispatches to the named action; see `actions::dispatch`.
pub async fn api_action(
    State(repo): State<RepositoryState>,
    State(verifier): State<TokenVerifier>,
    ApiPayload(payload): ApiPayload,
) -> Result<ActionOutcome, AppError> {
    actions::dispatch(repo.as_ref(), &verifier, &payload)
}

/// `GET /logout`
pub async fn logout() -> ActionOutcome {
    actions::logout()
}

/// simulate_error
///
/// `GET /error`. Fails on purpose so the 500 path can be exercised end to end.
pub async fn simulate_error() -> Result<(), AppError> {
    Err(AppError::Fault("kaboom"))
}

/// health_check
///
/// `GET /health-check`. Reports configuration, process and host facts.
pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let report = health::report(&state);
    tracing::info!(health = %report, "health check");
    Json(report)
}

/// serve_page
///
/// The page pipeline, mounted as the router fallback. In order:
/// 1. classify the path;
/// 2. answer bare 404s and static files without rendering;
/// 3. verify the session token, redirecting to the login page when a protected
///    route gets no valid identity;
/// 4. check the template exists, build the context and render, applying the
///    route's status and content type.
pub async fn serve_page(
    State(state): State<AppState>,
    session: SessionToken,
    request: Request,
) -> Result<Response, AppError> {
    if !matches!(*request.method(), Method::GET | Method::HEAD) {
        return Ok(StatusCode::NOT_FOUND.into_response());
    }

    let path = request.uri().path().to_string();
    let route = state.resolver.resolve(&path);
    tracing::debug!(%path, route = route.kind(), "route resolved");

    if let Route::StaticAsset(file) = &route {
        return Ok(serve_static(file, request).await);
    }

    let Some(template) = route.template().map(str::to_string) else {
        return Ok(route.status().into_response());
    };

    // Nothing below runs until verification has settled.
    let user = match state.verifier.verify(session.as_deref()).await {
        Ok(user) => Some(user),
        Err(reason) if route.requires_auth() => {
            tracing::info!(%path, %reason, "login required");
            return Ok(found(LOGIN_REQUIRED));
        }
        Err(_) => None,
    };

    if !state.renderer.has_template(&template) {
        return Err(AppError::Render {
            source: RenderError::Missing(template.clone()),
            template,
        });
    }

    let profile = match &route {
        Route::Profile(handle) => Some(handle.as_str()),
        _ => None,
    };

    let view = RequestView::from(&request);
    let context = state
        .contexts
        .build(&view, &template, user.as_ref(), profile);

    let body = state
        .renderer
        .render(&template, &context)
        .await
        .map_err(|source| AppError::Render {
            template: template.clone(),
            source,
        })?;

    let mut response = (route.status(), Html(body)).into_response();
    if let Some(content_type) = route.content_type() {
        response
            .headers_mut()
            .insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    }
    Ok(response)
}

async fn serve_static(file: &Path, request: Request) -> Response {
    let Ok(response) = ServeFile::new(file).oneshot(request).await;
    response.map(Body::new)
}
