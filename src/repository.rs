use std::{path::Path, sync::Arc};

use crate::{
    error::AppError,
    models::{DemoData, Post, Profile, Topic, UserSummary},
};

/// Repository Trait
///
/// Read-only access to the demo dataset. Handlers, the resolver and the
/// context builder only see this contract, so tests can swap in their own
/// fixture without touching the filesystem.
///
/// Implementations are loaded once at startup and never mutated, which is
/// what makes `Arc<dyn Repository>` safe to read from every request task.
pub trait Repository: Send + Sync {
    // --- Feed helpers ---
    // Each returns the first `limit` entries in fixture order (all of them when
    // the fixture is shorter).
    fn get_posts(&self, limit: usize) -> Vec<Post>;
    fn get_topics(&self, limit: usize) -> Vec<Topic>;
    fn get_users(&self, limit: usize) -> Vec<UserSummary>;

    // --- Profiles ---
    fn get_profile(&self, handle: &str) -> Option<Profile>;
    fn has_profile(&self, handle: &str) -> bool;

    // --- Credentials ---
    /// True only when `username` exists and its password matches exactly.
    fn verify_credentials(&self, username: &str, password: &str) -> bool;
}

/// RepositoryState
///
/// The concrete type used to share the dataset across the application state.
pub type RepositoryState = Arc<dyn Repository>;

/// StaticRepository
///
/// The in-memory implementation backed by a `DemoData` fixture.
pub struct StaticRepository {
    data: DemoData,
}

impl StaticRepository {
    pub fn new(data: DemoData) -> Self {
        Self { data }
    }

    /// Reads and parses a JSON fixture, typically `<theme>/config/demo.json`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let bytes = std::fs::read(path.as_ref())?;
        let data: DemoData = serde_json::from_slice(&bytes)?;
        tracing::debug!(
            posts = data.posts.len(),
            topics = data.topics.len(),
            profiles = data.profiles.len(),
            "demo dataset loaded"
        );
        Ok(Self::new(data))
    }
}

fn first<T: Clone>(items: &[T], limit: usize) -> Vec<T> {
    items.iter().take(limit).cloned().collect()
}

impl Repository for StaticRepository {
    fn get_posts(&self, limit: usize) -> Vec<Post> {
        first(&self.data.posts, limit)
    }

    fn get_topics(&self, limit: usize) -> Vec<Topic> {
        first(&self.data.topics, limit)
    }

    fn get_users(&self, limit: usize) -> Vec<UserSummary> {
        first(&self.data.users, limit)
    }

    fn get_profile(&self, handle: &str) -> Option<Profile> {
        self.data
            .profiles
            .iter()
            .find(|profile| profile.handle == handle)
            .cloned()
    }

    fn has_profile(&self, handle: &str) -> bool {
        self.data
            .profiles
            .iter()
            .any(|profile| profile.handle == handle)
    }

    fn verify_credentials(&self, username: &str, password: &str) -> bool {
        self.data
            .credentials
            .get(username)
            .is_some_and(|expected| expected == password)
    }
}
