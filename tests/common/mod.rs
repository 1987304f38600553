//! Shared fixtures for the integration tests. The repository's `theme/`
//! directory is the fixture theme.
#![allow(dead_code)]

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use axum::{
    Router,
    body::Body,
    http::{Request, Response, header},
};
use nug_web::{
    AppConfig, AppState, HandlebarsRenderer, RenderContext, RendererState, RepositoryState,
    StaticRepository, create_router,
};
use tower::util::ServiceExt;

pub const TEST_SECRET: &str = "test-secret-value-1234567890";

pub fn theme_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("theme")
}

pub fn test_config() -> AppConfig {
    AppConfig {
        jwt_secret: TEST_SECRET.to_string(),
        theme_path: theme_root(),
        ..AppConfig::default()
    }
}

pub fn demo_repo() -> RepositoryState {
    Arc::new(StaticRepository::load(theme_root().join("config/demo.json")).unwrap())
}

pub fn theme_config() -> RenderContext {
    let bytes = std::fs::read(theme_root().join("config/theme.json")).unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn handlebars() -> RendererState {
    Arc::new(HandlebarsRenderer::load(theme_root()).unwrap())
}

pub fn state_with_renderer(renderer: RendererState) -> AppState {
    AppState::new(test_config(), demo_repo(), renderer, theme_config())
}

pub fn test_app() -> Router {
    create_router(state_with_renderer(handlebars()))
}

pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn get_with_cookie(uri: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap()
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub fn location<B>(response: &Response<B>) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
}

pub fn set_cookie<B>(response: &Response<B>) -> Option<&str> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|value| value.to_str().ok())
}
