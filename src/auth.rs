use std::{convert::Infallible, sync::Arc};

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "nug_auth";

/// Lifetime of a session token.
pub const TOKEN_TTL_HOURS: i64 = 24;

/// Claims
///
/// Payload of the session token. Signed with the server secret; the token is
/// the only session state there is.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// The username the token was issued to.
    pub username: String,
    /// Issued At (iat), seconds since the epoch.
    pub iat: i64,
    /// Expiration Time (exp), seconds since the epoch. `iat + 24h`.
    pub exp: i64,
}

/// AuthUser
///
/// The identity decoded from a valid token. Passed explicitly down the page
/// pipeline, never stashed on the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub username: String,
    pub issued_at: DateTime<Utc>,
}

/// TokenError
///
/// Why a presented token was not accepted. Every variant is handled the same
/// way by the router (treated as "not logged in"); they are kept apart for logs
/// and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("no session token presented")]
    Missing,
    #[error("session token is malformed or carries a bad signature")]
    Invalid,
    #[error("session token has expired")]
    Expired,
}

struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

/// TokenVerifier
///
/// Issues and verifies HS256 session tokens. Cheap to clone.
#[derive(Clone)]
pub struct TokenVerifier {
    keys: Arc<Keys>,
}

impl TokenVerifier {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against an explicit clock in `verify_at`, with no leeway.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            keys: Arc::new(Keys {
                encoding: EncodingKey::from_secret(secret.as_bytes()),
                decoding: DecodingKey::from_secret(secret.as_bytes()),
                validation,
            }),
        }
    }

    /// Signs a token for `username`, valid for 24 hours from now.
    pub fn issue(&self, username: &str) -> Result<String, jsonwebtoken::errors::Error> {
        self.issue_at(username, Utc::now())
    }

    pub fn issue_at(
        &self,
        username: &str,
        now: DateTime<Utc>,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let claims = Claims {
            username: username.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(TOKEN_TTL_HOURS)).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.keys.encoding)
    }

    /// verify
    ///
    /// Validates the presented token on the blocking pool and waits for the
    /// outcome. The caller does not move on until this settles, and every
    /// outcome settles: a failed join counts as an invalid token.
    pub async fn verify(&self, token: Option<&str>) -> Result<AuthUser, TokenError> {
        let Some(token) = token else {
            return Err(TokenError::Missing);
        };

        let verifier = self.clone();
        let token = token.to_owned();
        tokio::task::spawn_blocking(move || verifier.verify_at(&token, Utc::now()))
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "token verification task failed");
                Err(TokenError::Invalid)
            })
    }

    /// Synchronous core of `verify` with an injected clock.
    /// A token is expired from the instant `now` reaches its `exp`.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<AuthUser, TokenError> {
        let data = decode::<Claims>(token, &self.keys.decoding, &self.keys.validation)
            .map_err(|e| {
                tracing::debug!(error = %e, "session token rejected");
                TokenError::Invalid
            })?;

        let claims = data.claims;
        if now.timestamp() >= claims.exp {
            return Err(TokenError::Expired);
        }

        let issued_at = DateTime::from_timestamp(claims.iat, 0).ok_or(TokenError::Invalid)?;
        Ok(AuthUser {
            username: claims.username,
            issued_at,
        })
    }
}

/// Finds the session token in the request's `Cookie` headers.
pub fn session_cookie(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim_matches('"'))
        .filter(|value| !value.is_empty())
}

/// SessionToken Extractor
///
/// The raw, unverified session token (if any). Never rejects: a missing cookie
/// is a normal anonymous request, and verification happens later in the
/// pipeline, only once the route is known.
#[derive(Debug, Clone, Default)]
pub struct SessionToken(pub Option<String>);

impl SessionToken {
    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl<S> FromRequestParts<S> for SessionToken
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(SessionToken(session_cookie(&parts.headers).map(str::to_owned)))
    }
}
