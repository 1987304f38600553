use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Query, Request},
    http::Method,
};
use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::{auth::AuthUser, models::Profile, repository::RepositoryState};

/// The data handed to the renderer. Keys are template variable names.
pub type RenderContext = Map<String, Value>;

// Default slice sizes for the dataset helpers.
pub const DEFAULT_POST_LIMIT: usize = 15;
pub const DEFAULT_TOPIC_LIMIT: usize = 10;
pub const DEFAULT_USER_LIMIT: usize = 5;

/// RequestView
///
/// The parts of the inbound request templates may look at, mounted as `req`.
#[derive(Debug, Clone, Serialize)]
pub struct RequestView {
    pub method: String,
    pub path: String,
    pub url: String,
    pub query: BTreeMap<String, String>,
}

impl RequestView {
    pub fn new(method: &Method, path: &str, url: &str, query: BTreeMap<String, String>) -> Self {
        Self {
            method: method.to_string(),
            path: path.to_string(),
            url: url.to_string(),
            query,
        }
    }
}

impl From<&Request> for RequestView {
    fn from(request: &Request) -> Self {
        let uri = request.uri();
        let query = Query::<BTreeMap<String, String>>::try_from_uri(uri)
            .map(|Query(query)| query)
            .unwrap_or_default();
        let url = uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or_else(|| uri.path());
        Self::new(request.method(), uri.path(), url, query)
    }
}

/// ContextBuilder
///
/// Assembles render contexts. Pure: everything it reads was loaded at startup.
#[derive(Clone)]
pub struct ContextBuilder {
    theme: Arc<RenderContext>,
    repo: RepositoryState,
}

impl ContextBuilder {
    pub fn new(theme: Arc<RenderContext>, repo: RepositoryState) -> Self {
        Self { theme, repo }
    }

    /// build
    ///
    /// Merges, each layer overriding the ones before it:
    /// theme configuration, dataset helpers, `req` + `templateSlug`,
    /// `profile` (profile pages only), `user` (valid token only).
    pub fn build(
        &self,
        request: &RequestView,
        template: &str,
        user: Option<&AuthUser>,
        profile_handle: Option<&str>,
    ) -> RenderContext {
        let mut context = (*self.theme).clone();

        context.insert("posts".into(), json!(self.repo.get_posts(DEFAULT_POST_LIMIT)));
        context.insert("topics".into(), json!(self.repo.get_topics(DEFAULT_TOPIC_LIMIT)));
        context.insert("users".into(), json!(self.repo.get_users(DEFAULT_USER_LIMIT)));

        context.insert("req".into(), json!(request));
        context.insert("templateSlug".into(), json!(template));

        if let Some(handle) = profile_handle {
            context.insert("profile".into(), json!(self.profile_or_stub(handle)));
        }

        if let Some(user) = user {
            context.insert("user".into(), json!(self.profile_or_stub(&user.username)));
        }

        context
    }

    fn profile_or_stub(&self, handle: &str) -> Profile {
        self.repo
            .get_profile(handle)
            .unwrap_or_else(|| Profile::stub(handle))
    }
}
