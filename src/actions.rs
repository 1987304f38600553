use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

use crate::{
    auth::{SESSION_COOKIE, TokenVerifier},
    error::AppError,
    models::ApiRequest,
    repository::Repository,
};

/// Where a failed login sends the browser.
pub const INVALID_LOGIN: &str = "/login?error=invalid_login";
/// Where an unauthenticated visit to a protected page sends the browser.
pub const LOGIN_REQUIRED: &str = "/login?error=please_login";
/// Landing page after a successful login.
pub const LOGIN_LANDING: &str = "/home";
/// Landing page after logout.
pub const LOGOUT_LANDING: &str = "/";

/// ApiAction
///
/// The closed set of actions `POST /api` can run, named by the body's
/// `handler` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiAction {
    Login,
    Logout,
}

impl ApiAction {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "login" => Some(ApiAction::Login),
            "logout" => Some(ApiAction::Logout),
            _ => None,
        }
    }
}

/// What to do with the session cookie on the way out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CookieChange {
    Set(String),
    Clear,
}

impl CookieChange {
    fn header_value(&self) -> String {
        match self {
            CookieChange::Set(token) => format!("{SESSION_COOKIE}={token}; Path=/"),
            CookieChange::Clear => format!(
                "{SESSION_COOKIE}=; Path=/; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT"
            ),
        }
    }
}

/// ActionOutcome
///
/// The result of an action: a redirect (optionally touching the cookie) or a
/// bare status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Redirect {
        to: String,
        cookie: Option<CookieChange>,
    },
    Status(StatusCode),
}

impl ActionOutcome {
    fn redirect(to: &str) -> Self {
        ActionOutcome::Redirect {
            to: to.to_string(),
            cookie: None,
        }
    }
}

impl IntoResponse for ActionOutcome {
    fn into_response(self) -> Response {
        match self {
            ActionOutcome::Redirect { to, cookie: None } => found(&to),
            ActionOutcome::Redirect {
                to,
                cookie: Some(change),
            } => (
                StatusCode::FOUND,
                [
                    (header::SET_COOKIE, change.header_value()),
                    (header::LOCATION, to),
                ],
            )
                .into_response(),
            ActionOutcome::Status(status) => status.into_response(),
        }
    }
}

/// `302 Found` with `to` as the location. Browsers follow it with a GET.
pub fn found(to: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, to)]).into_response()
}

/// Treats empty strings like absent fields, the way an HTML form submits them.
fn present(field: Option<&str>) -> Option<&str> {
    field.filter(|value| !value.is_empty())
}

/// login
///
/// Both fields are required. A match issues a fresh token into the session
/// cookie and lands on `/home`; anything else goes back to the login page.
pub fn login(
    repo: &dyn Repository,
    verifier: &TokenVerifier,
    username: Option<&str>,
    password: Option<&str>,
) -> Result<ActionOutcome, AppError> {
    let (Some(username), Some(password)) = (present(username), present(password)) else {
        tracing::debug!("login rejected: missing fields");
        return Ok(ActionOutcome::redirect(INVALID_LOGIN));
    };

    if !repo.verify_credentials(username, password) {
        tracing::info!(username, "login rejected: bad credentials");
        return Ok(ActionOutcome::redirect(INVALID_LOGIN));
    }

    let token = verifier.issue(username)?;
    tracing::info!(username, "login succeeded");
    Ok(ActionOutcome::Redirect {
        to: LOGIN_LANDING.to_string(),
        cookie: Some(CookieChange::Set(token)),
    })
}

/// Clears the session cookie. Same outcome whether or not anyone was logged in.
pub fn logout() -> ActionOutcome {
    ActionOutcome::Redirect {
        to: LOGOUT_LANDING.to_string(),
        cookie: Some(CookieChange::Clear),
    }
}

/// dispatch
///
/// Runs the action named by `payload.handler`. An unknown or missing name falls
/// back to `payload.redirect`, and failing that to a bare 400.
pub fn dispatch(
    repo: &dyn Repository,
    verifier: &TokenVerifier,
    payload: &ApiRequest,
) -> Result<ActionOutcome, AppError> {
    match payload.handler.as_deref().and_then(ApiAction::from_name) {
        Some(ApiAction::Login) => login(
            repo,
            verifier,
            payload.username.as_deref(),
            payload.password.as_deref(),
        ),
        Some(ApiAction::Logout) => Ok(logout()),
        None => match present(payload.redirect.as_deref()) {
            Some(target) => Ok(ActionOutcome::redirect(target)),
            None => {
                tracing::debug!(handler = ?payload.handler, "unknown api action");
                Ok(ActionOutcome::Status(StatusCode::BAD_REQUEST))
            }
        },
    }
}
