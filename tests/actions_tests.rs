use axum::http::StatusCode;
use nug_web::{
    TokenVerifier,
    actions::{
        ActionOutcome, ApiAction, CookieChange, INVALID_LOGIN, LOGIN_LANDING, dispatch, login,
        logout,
    },
    models::ApiRequest,
};

mod common;

fn verifier() -> TokenVerifier {
    TokenVerifier::new(common::TEST_SECRET)
}

fn invalid_login() -> ActionOutcome {
    ActionOutcome::Redirect {
        to: INVALID_LOGIN.to_string(),
        cookie: None,
    }
}

#[test]
fn test_action_names() {
    assert_eq!(ApiAction::from_name("login"), Some(ApiAction::Login));
    assert_eq!(ApiAction::from_name("logout"), Some(ApiAction::Logout));
    assert_eq!(ApiAction::from_name("Login"), None);
    assert_eq!(ApiAction::from_name("getPosts"), None);
}

#[test]
fn test_login_success_sets_verifiable_cookie() {
    let repo = common::demo_repo();
    let verifier = verifier();

    let outcome = login(repo.as_ref(), &verifier, Some("dylanized"), Some("foobar")).unwrap();

    let (to, token) = match outcome {
        ActionOutcome::Redirect {
            to,
            cookie: Some(CookieChange::Set(token)),
        } => (to, token),
        other => panic!("expected a redirect that sets the cookie, got {other:?}"),
    };
    assert_eq!(to, LOGIN_LANDING);
    let user = verifier.verify_at(&token, chrono::Utc::now()).unwrap();
    assert_eq!(user.username, "dylanized");
}

#[test]
fn test_login_failures_redirect_back() {
    let repo = common::demo_repo();
    let verifier = verifier();

    let cases = [
        (None, None),
        (Some("dylanized"), None),
        (None, Some("foobar")),
        (Some(""), Some("foobar")),
        (Some("dylanized"), Some("")),
        (Some("dylanized"), Some("wrong")),
        (Some("stranger"), Some("foobar")),
    ];
    for (username, password) in cases {
        let outcome = login(repo.as_ref(), &verifier, username, password).unwrap();
        assert_eq!(outcome, invalid_login(), "{username:?}/{password:?}");
    }
}

#[test]
fn test_logout_is_unconditional() {
    assert_eq!(
        logout(),
        ActionOutcome::Redirect {
            to: "/".to_string(),
            cookie: Some(CookieChange::Clear),
        }
    );
    assert_eq!(logout(), logout());
}

#[test]
fn test_dispatch_routes_by_handler() {
    let repo = common::demo_repo();
    let verifier = verifier();

    let via_api = dispatch(
        repo.as_ref(),
        &verifier,
        &ApiRequest {
            handler: Some("login".into()),
            username: Some("dylanized".into()),
            password: Some("wrong".into()),
            ..ApiRequest::default()
        },
    )
    .unwrap();
    assert_eq!(via_api, invalid_login());

    let via_api = dispatch(
        repo.as_ref(),
        &verifier,
        &ApiRequest {
            handler: Some("logout".into()),
            ..ApiRequest::default()
        },
    )
    .unwrap();
    assert_eq!(via_api, logout());
}

#[test]
fn test_dispatch_unknown_handler() {
    let repo = common::demo_repo();
    let verifier = verifier();

    let bare = dispatch(
        repo.as_ref(),
        &verifier,
        &ApiRequest {
            handler: Some("nope".into()),
            ..ApiRequest::default()
        },
    )
    .unwrap();
    assert_eq!(bare, ActionOutcome::Status(StatusCode::BAD_REQUEST));

    let redirected = dispatch(
        repo.as_ref(),
        &verifier,
        &ApiRequest {
            handler: Some("nope".into()),
            redirect: Some("/signup".into()),
            ..ApiRequest::default()
        },
    )
    .unwrap();
    assert_eq!(
        redirected,
        ActionOutcome::Redirect {
            to: "/signup".to_string(),
            cookie: None,
        }
    );

    // A known handler ignores the redirect field.
    let known = dispatch(
        repo.as_ref(),
        &verifier,
        &ApiRequest {
            handler: Some("logout".into()),
            redirect: Some("/elsewhere".into()),
            ..ApiRequest::default()
        },
    )
    .unwrap();
    assert_eq!(known, logout());
}

#[test]
fn test_payload_fields_accept_any_json_value() {
    let payload: ApiRequest = serde_json::from_value(serde_json::json!({
        "handler": "login",
        "username": true,
        "password": 1234,
        "redirect": null,
    }))
    .unwrap();

    assert_eq!(payload.handler.as_deref(), Some("login"));
    assert_eq!(payload.username.as_deref(), Some("true"));
    assert_eq!(payload.password.as_deref(), Some("1234"));
    assert_eq!(payload.redirect, None);

    let repo = common::demo_repo();
    let outcome = dispatch(repo.as_ref(), &verifier(), &payload).unwrap();
    assert_eq!(outcome, invalid_login());
}
