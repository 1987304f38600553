use crate::{AppState, handlers};
use axum::Router;

/// Page Router Module
///
/// Every path without an explicit route goes through `handlers::serve_page`,
/// which owns the precedence between template sources, static files,
/// stylesheets, protected/public pages, profiles and the 404 fallbacks.
pub fn page_routes() -> Router<AppState> {
    Router::new().fallback(handlers::serve_page)
}
