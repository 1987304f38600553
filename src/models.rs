use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// --- Demo Dataset Schemas ---

/// Post
///
/// A single feed entry. Serialized camelCase because templates address the
/// fields as `authorHandle`, `authorName`, etc.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub author_handle: String,
    pub author_name: String,
    pub content: String,
    // Relative display time, e.g. "1min".
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// Topic
///
/// A trending topic with its mention count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Topic {
    pub name: String,
    pub count: u64,
    pub slug: String,
}

/// UserSummary
///
/// The short author card shown in "who to follow" lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub author_handle: String,
    pub author_name: String,
}

/// Profile
///
/// The full profile record rendered on `/<handle>` pages and mounted as
/// `user` for authenticated renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Profile {
    pub handle: String,
    pub name: String,
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub posts: u64,
    #[serde(default)]
    pub followers: u64,
    #[serde(default)]
    pub following: u64,
    #[serde(default)]
    pub mentions: u64,
}

impl Profile {
    /// Minimal profile for a handle the dataset does not describe.
    pub fn stub(handle: &str) -> Self {
        Self {
            handle: handle.to_string(),
            name: handle.to_string(),
            ..Self::default()
        }
    }
}

/// DemoData
///
/// The whole read-only fixture, as stored in `<theme>/config/demo.json`.
/// `credentials` maps usernames to passwords and is only consulted by login.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DemoData {
    #[serde(default)]
    pub posts: Vec<Post>,
    #[serde(default)]
    pub topics: Vec<Topic>,
    #[serde(default)]
    pub users: Vec<UserSummary>,
    #[serde(default)]
    pub profiles: Vec<Profile>,
    #[serde(default)]
    pub credentials: BTreeMap<String, String>,
}

// --- Request Payloads ---

/// ApiRequest
///
/// Body of `POST /api`, accepted as JSON or as an urlencoded form. Every field
/// is optional; the action handler decides what is required. Fields take any
/// JSON value and keep its text form, so `{"password": 1234}` is checked like
/// any other wrong password instead of failing the whole body.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ApiRequest {
    // Name of the action to run, e.g. "login".
    #[serde(default, deserialize_with = "lenient_string")]
    pub handler: Option<String>,
    // Fallback redirect target when no known handler is named.
    #[serde(default, deserialize_with = "lenient_string")]
    pub redirect: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub username: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub password: Option<String>,
}

/// Strings pass through, `null` is absent, anything else is rendered as JSON text.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) => Some(text),
        Some(other) => Some(other.to_string()),
    })
}
