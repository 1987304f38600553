//! Path classification.
//!
//! Every inbound GET path lands in exactly one [`Route`]. The checks in
//! [`TemplateResolver::resolve`] run in a fixed order and the first match wins,
//! so the precedence lives in one function instead of in router registration
//! order.

use std::{borrow::Cow, path::PathBuf};

use axum::http::StatusCode;
use percent_encoding::percent_decode_str;

use crate::{renderer::TEMPLATE_EXTENSION, repository::RepositoryState};

/// Pages that need a valid session token.
pub const PROTECTED_PAGES: [&str; 5] = ["home", "explore", "activity", "saved", "account"];

/// Pages anyone may see.
pub const PUBLIC_PAGES: [&str; 2] = ["login", "signup"];

/// Theme subdirectory holding the site configuration and dataset. Never served.
pub const CONFIG_DIR: &str = "config";

/// Route
///
/// The classification of a request path. Variants are listed in the order they
/// are tested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// A literal request for a template source file. Bare 404.
    TemplateSource,
    /// An existing file under the theme root, served as-is.
    StaticAsset(PathBuf),
    /// A dynamically rendered stylesheet; holds the template id (`css/<name>`).
    Stylesheet(String),
    /// An auth-gated page; holds its slug.
    Protected(String),
    /// A page open to everyone; holds its slug.
    Public(String),
    /// A profile page; holds the profile handle.
    Profile(String),
    /// `/`
    Root,
    /// A file-shaped path that matched nothing. Bare 404.
    UnresolvedFile,
    /// Anything else. Rendered 404 page.
    NotFound,
}

impl Route {
    pub fn requires_auth(&self) -> bool {
        matches!(self, Route::Protected(_))
    }

    /// The template to render, or `None` for routes that never render.
    pub fn template(&self) -> Option<&str> {
        match self {
            Route::Stylesheet(template) => Some(template),
            Route::Protected(slug) | Route::Public(slug) => Some(slug),
            Route::Profile(_) => Some("profile"),
            Route::Root => Some("index"),
            Route::NotFound => Some("404"),
            Route::TemplateSource | Route::StaticAsset(_) | Route::UnresolvedFile => None,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Route::TemplateSource | Route::UnresolvedFile | Route::NotFound => {
                StatusCode::NOT_FOUND
            }
            _ => StatusCode::OK,
        }
    }

    /// Content type override for rendered output.
    pub fn content_type(&self) -> Option<&'static str> {
        match self {
            Route::Stylesheet(_) => Some("text/css; charset=utf-8"),
            _ => None,
        }
    }

    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Route::TemplateSource => "template-source",
            Route::StaticAsset(_) => "static-asset",
            Route::Stylesheet(_) => "dynamic-asset",
            Route::Protected(_) => "protected",
            Route::Public(_) => "public",
            Route::Profile(_) => "profile",
            Route::Root => "root",
            Route::UnresolvedFile => "unresolved-file",
            Route::NotFound => "catch-all-404",
        }
    }
}

/// TemplateResolver
///
/// Classifies paths against the theme root (static files, stylesheet
/// templates) and the dataset (profile handles).
pub struct TemplateResolver {
    theme_root: PathBuf,
    repo: RepositoryState,
}

impl TemplateResolver {
    pub fn new(theme_root: impl Into<PathBuf>, repo: RepositoryState) -> Self {
        Self {
            theme_root: theme_root.into(),
            repo,
        }
    }

    /// Classifies `path` after percent-decoding it, so `/js/app%2Ejs` and
    /// `/js/app.js` are the same request and every check below sees the
    /// decoded form.
    pub fn resolve(&self, path: &str) -> Route {
        let decoded: Cow<'_, str> = percent_decode_str(path).decode_utf8_lossy();
        self.classify(&decoded)
    }

    fn classify(&self, path: &str) -> Route {
        // 1. Template sources are never served, rendered or statically.
        if path.ends_with(TEMPLATE_EXTENSION) {
            return Route::TemplateSource;
        }

        // 2. Files that exist under the theme root.
        if let Some(file) = self.static_asset(path) {
            return Route::StaticAsset(file);
        }

        // 3. /css/<name> backed by a css/<name>.hbs template.
        if let Some(name) = path.strip_prefix("/css/") {
            if is_safe_segment(name) && self.stylesheet_exists(name) {
                return Route::Stylesheet(format!("css/{name}"));
            }
        }

        let page = page_slug(path);

        // 4. Protected pages, before anything that could shadow them.
        if let Some(slug) = PROTECTED_PAGES.iter().find(|slug| **slug == page) {
            return Route::Protected(slug.to_string());
        }

        // 5. Public pages.
        if let Some(slug) = PUBLIC_PAGES.iter().find(|slug| **slug == page) {
            return Route::Public(slug.to_string());
        }

        // 6. Profile handles (single segment only).
        if !page.is_empty() && !page.contains('/') && self.repo.has_profile(page) {
            return Route::Profile(page.to_string());
        }

        // 7. Root.
        if path == "/" {
            return Route::Root;
        }

        // 8. File-shaped leftovers get a bare 404.
        if path.contains('.') {
            return Route::UnresolvedFile;
        }

        // 9. Everything else gets the rendered 404 page.
        Route::NotFound
    }

    fn static_asset(&self, path: &str) -> Option<PathBuf> {
        let relative = path.strip_prefix('/')?;
        if relative.is_empty() || !relative.split('/').all(is_safe_segment) {
            return None;
        }
        if relative.split('/').next() == Some(CONFIG_DIR) {
            return None;
        }
        let file = self.theme_root.join(relative);
        file.is_file().then_some(file)
    }

    fn stylesheet_exists(&self, name: &str) -> bool {
        self.theme_root
            .join("css")
            .join(format!("{name}{TEMPLATE_EXTENSION}"))
            .is_file()
    }
}

/// The path without its leading slash and one optional trailing slash.
fn page_slug(path: &str) -> &str {
    let slug = path.strip_prefix('/').unwrap_or(path);
    slug.strip_suffix('/').unwrap_or(slug)
}

/// A path segment that may be joined onto the theme root.
/// Rejects empty segments, dotfiles (which covers `.` and `..`) and anything
/// a platform could read as a separator or a drive prefix.
fn is_safe_segment(segment: &str) -> bool {
    !segment.is_empty()
        && !segment.starts_with('.')
        && !segment.contains(['/', '\\', ':', '\0'])
}
