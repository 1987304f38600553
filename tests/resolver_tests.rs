use std::sync::Arc;

use axum::http::StatusCode;
use nug_web::{
    models::{Post, Profile, Topic, UserSummary},
    repository::Repository,
    resolver::{PROTECTED_PAGES, PUBLIC_PAGES, Route, TemplateResolver},
};

mod common;

fn resolver() -> TemplateResolver {
    TemplateResolver::new(common::theme_root(), common::demo_repo())
}

/// Claims every handle is a known profile.
struct EveryoneRepository;

impl Repository for EveryoneRepository {
    fn get_posts(&self, _limit: usize) -> Vec<Post> {
        Vec::new()
    }

    fn get_topics(&self, _limit: usize) -> Vec<Topic> {
        Vec::new()
    }

    fn get_users(&self, _limit: usize) -> Vec<UserSummary> {
        Vec::new()
    }

    fn get_profile(&self, handle: &str) -> Option<Profile> {
        Some(Profile::stub(handle))
    }

    fn has_profile(&self, _handle: &str) -> bool {
        true
    }

    fn verify_credentials(&self, _username: &str, _password: &str) -> bool {
        false
    }
}

#[test]
fn test_root_resolves_to_index() {
    let route = resolver().resolve("/");
    assert_eq!(route, Route::Root);
    assert_eq!(route.template(), Some("index"));
    assert_eq!(route.status(), StatusCode::OK);
    assert!(!route.requires_auth());
}

#[test]
fn test_protected_pages_require_auth() {
    let resolver = resolver();
    for slug in PROTECTED_PAGES {
        let route = resolver.resolve(&format!("/{slug}"));
        assert_eq!(route, Route::Protected(slug.to_string()));
        assert_eq!(route.template(), Some(slug));
        assert!(route.requires_auth(), "/{slug} must be auth-gated");
    }
}

#[test]
fn test_public_pages_do_not_require_auth() {
    let resolver = resolver();
    for slug in PUBLIC_PAGES {
        let route = resolver.resolve(&format!("/{slug}"));
        assert_eq!(route, Route::Public(slug.to_string()));
        assert!(!route.requires_auth());
    }
}

#[test]
fn test_trailing_slash_is_ignored_for_pages() {
    let resolver = resolver();
    assert_eq!(resolver.resolve("/home/"), Route::Protected("home".into()));
    assert_eq!(resolver.resolve("/login/"), Route::Public("login".into()));
    assert_eq!(resolver.resolve("/foobar/"), Route::Profile("foobar".into()));
}

#[test]
fn test_page_names_win_over_colliding_profile_handles() {
    let resolver = TemplateResolver::new(common::theme_root(), Arc::new(EveryoneRepository));

    for slug in PROTECTED_PAGES {
        assert_eq!(
            resolver.resolve(&format!("/{slug}")),
            Route::Protected(slug.to_string())
        );
    }
    for slug in PUBLIC_PAGES {
        assert_eq!(
            resolver.resolve(&format!("/{slug}")),
            Route::Public(slug.to_string())
        );
    }
    // Any other single segment is a profile for this repository.
    assert_eq!(resolver.resolve("/anyone"), Route::Profile("anyone".into()));
}

#[test]
fn test_known_handle_renders_shared_profile_template() {
    let route = resolver().resolve("/foobar");
    assert_eq!(route, Route::Profile("foobar".into()));
    assert_eq!(route.template(), Some("profile"));
}

#[test]
fn test_profile_lookup_is_single_segment_only() {
    assert_eq!(resolver().resolve("/foobar/posts"), Route::NotFound);
}

#[test]
fn test_unknown_slug_renders_404_template() {
    let route = resolver().resolve("/unknownslug");
    assert_eq!(route, Route::NotFound);
    assert_eq!(route.template(), Some("404"));
    assert_eq!(route.status(), StatusCode::NOT_FOUND);
}

#[test]
fn test_dotted_path_without_match_is_bare_404() {
    let resolver = resolver();
    for path in ["/missing.png", "/js/missing.js", "/foobar.json", "/a/b/c.txt"] {
        let route = resolver.resolve(path);
        assert_eq!(route, Route::UnresolvedFile, "{path}");
        assert_eq!(route.template(), None);
        assert_eq!(route.status(), StatusCode::NOT_FOUND);
    }
}

#[test]
fn test_template_sources_are_rejected_first() {
    let resolver = resolver();
    // These files exist on disk; they must still never be served.
    for path in ["/index.hbs", "/partials/head.hbs", "/css/theme.css.hbs", "/nope.hbs"] {
        assert_eq!(resolver.resolve(path), Route::TemplateSource, "{path}");
    }
}

#[test]
fn test_existing_files_are_static_assets() {
    let resolver = resolver();
    assert_eq!(
        resolver.resolve("/js/app.js"),
        Route::StaticAsset(common::theme_root().join("js/app.js"))
    );
    // A real file wins over the stylesheet template lookup.
    assert_eq!(
        resolver.resolve("/css/base.css"),
        Route::StaticAsset(common::theme_root().join("css/base.css"))
    );
}

#[test]
fn test_stylesheet_template_is_dynamic_asset() {
    let route = resolver().resolve("/css/theme.css");
    assert_eq!(route, Route::Stylesheet("css/theme.css".into()));
    assert_eq!(route.template(), Some("css/theme.css"));
    assert_eq!(route.content_type(), Some("text/css; charset=utf-8"));
}

#[test]
fn test_missing_stylesheet_falls_through() {
    let resolver = resolver();
    // Has a dot: bare 404.
    assert_eq!(resolver.resolve("/css/missing.css"), Route::UnresolvedFile);
    // No dot, more than one segment: rendered 404.
    assert_eq!(resolver.resolve("/css/missing"), Route::NotFound);
}

#[test]
fn test_traversal_never_reaches_the_filesystem() {
    let resolver = resolver();
    for path in [
        "/../Cargo.toml",
        "/css/../../Cargo.toml",
        "/css/..%2F..%2FCargo.toml",
        "/./js/app.js",
        "//etc/passwd",
        "/js//app.js",
    ] {
        let route = resolver.resolve(path);
        assert!(
            !matches!(route, Route::StaticAsset(_) | Route::Stylesheet(_)),
            "{path} resolved to {route:?}"
        );
    }
}

#[test]
fn test_paths_are_percent_decoded_before_classification() {
    let resolver = resolver();
    assert_eq!(
        resolver.resolve("/js/app%2Ejs"),
        Route::StaticAsset(common::theme_root().join("js/app.js"))
    );
    // Encoding cannot sneak a template source or a protected page past its check.
    assert_eq!(resolver.resolve("/index%2Ehbs"), Route::TemplateSource);
    assert_eq!(resolver.resolve("/h%6Fme"), Route::Protected("home".into()));
    assert_eq!(resolver.resolve("/config%2Fdemo.json"), Route::UnresolvedFile);
}

#[test]
fn test_config_directory_is_never_served() {
    let resolver = resolver();
    // Both files exist on disk.
    assert_eq!(resolver.resolve("/config/demo.json"), Route::UnresolvedFile);
    assert_eq!(resolver.resolve("/config/theme.json"), Route::UnresolvedFile);
}

#[test]
fn test_resolution_does_not_depend_on_template_existence() {
    // Classification is by shape: `/saved` is protected whether or not a
    // renderer can produce it.
    let resolver = resolver();
    assert_eq!(resolver.resolve("/saved"), Route::Protected("saved".into()));
}
