//! Session credentials and the authenticated-user request extractor.
//!
//! Tokens are `base64url(payload) "." base64url(mac)` where the payload is
//! `user_id|expires_unix` and the MAC is a BLAKE3 keyed hash under a key
//! derived from the configured secret. Nothing is stored server-side.

use crate::config::SessionConfig;
use crate::error::ServerError;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::header::COOKIE;
use axum::http::request::Parts;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use std::fmt;
use std::sync::Arc;

const KEY_CONTEXT: &str = "mdr 2024 session token v1";
const FIELD_SEPARATOR: char = '|';

/// Errors raised while issuing or validating a session token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// No session cookie was sent.
    #[error("missing session token")]
    Missing,
    /// The token is not in the expected encoding.
    #[error("malformed session token")]
    Malformed,
    /// The MAC does not match the payload.
    #[error("invalid session signature")]
    BadSignature,
    /// The token's expiry has passed.
    #[error("session expired")]
    Expired,
    /// The user id cannot be carried in a token.
    #[error("invalid user id: {0}")]
    InvalidUser(String),
}

/// Identifier of an authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserId(String);

impl UserId {
    /// Wrap `id`, rejecting blank ids and ids containing the field separator
    /// or control characters.
    pub fn new(id: impl Into<String>) -> Result<Self, SessionError> {
        let id = id.into();
        if id.trim().is_empty()
            || id.contains(FIELD_SEPARATOR)
            || id.chars().any(char::is_control)
        {
            return Err(SessionError::InvalidUser(id));
        }
        Ok(Self(id))
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Issues and validates session credentials.
pub trait SessionService: Send + Sync {
    /// Issue a token for `user`. `remember` selects the long lifetime.
    fn issue(&self, user: &UserId, remember: bool) -> Result<String, SessionError>;

    /// Validate `token` and return the user it was issued for.
    fn validate(&self, token: &str) -> Result<UserId, SessionError>;
}

/// Stateless signed-token session service.
pub struct SignedSessionService {
    key: [u8; 32],
    ttl: Duration,
    remember_ttl: Duration,
}

impl fmt::Debug for SignedSessionService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignedSessionService")
            .field("key", &"<redacted>")
            .field("ttl", &self.ttl)
            .field("remember_ttl", &self.remember_ttl)
            .finish()
    }
}

impl SignedSessionService {
    /// Create a service keyed from `secret`.
    pub fn new(secret: &str, ttl_seconds: u64, remember_ttl_seconds: u64) -> Self {
        Self {
            key: blake3::derive_key(KEY_CONTEXT, secret.as_bytes()),
            ttl: seconds(ttl_seconds),
            remember_ttl: seconds(remember_ttl_seconds),
        }
    }

    /// Create a service from the `[session]` config section.
    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(
            &config.secret,
            config.ttl_seconds,
            config.remember_ttl_seconds,
        )
    }

    /// Issue a token as if the current time were `now`.
    pub fn issue_at(
        &self,
        user: &UserId,
        remember: bool,
        now: DateTime<Utc>,
    ) -> Result<String, SessionError> {
        let ttl = if remember { self.remember_ttl } else { self.ttl };
        let expires = now
            .checked_add_signed(ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        let payload = format!("{}{FIELD_SEPARATOR}{}", user.as_str(), expires.timestamp());
        let mac = blake3::keyed_hash(&self.key, payload.as_bytes());
        Ok(format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(payload.as_bytes()),
            URL_SAFE_NO_PAD.encode(mac.as_bytes())
        ))
    }

    /// Validate `token` as if the current time were `now`.
    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<UserId, SessionError> {
        let (payload_b64, mac_b64) = token.split_once('.').ok_or(SessionError::Malformed)?;
        let payload = URL_SAFE_NO_PAD
            .decode(payload_b64)
            .map_err(|_| SessionError::Malformed)?;
        let mac_bytes: [u8; 32] = URL_SAFE_NO_PAD
            .decode(mac_b64)
            .map_err(|_| SessionError::Malformed)?
            .try_into()
            .map_err(|_| SessionError::Malformed)?;

        // blake3::Hash equality is constant-time.
        let expected = blake3::keyed_hash(&self.key, &payload);
        if expected != blake3::Hash::from(mac_bytes) {
            return Err(SessionError::BadSignature);
        }

        let payload = String::from_utf8(payload).map_err(|_| SessionError::Malformed)?;
        let (user, expires) = payload
            .rsplit_once(FIELD_SEPARATOR)
            .ok_or(SessionError::Malformed)?;
        let expires: i64 = expires.parse().map_err(|_| SessionError::Malformed)?;
        if now.timestamp() >= expires {
            return Err(SessionError::Expired);
        }
        UserId::new(user)
    }
}

impl SessionService for SignedSessionService {
    fn issue(&self, user: &UserId, remember: bool) -> Result<String, SessionError> {
        self.issue_at(user, remember, Utc::now())
    }

    fn validate(&self, token: &str) -> Result<UserId, SessionError> {
        self.validate_at(token, Utc::now())
    }
}

fn seconds(value: u64) -> Duration {
    i64::try_from(value)
        .ok()
        .and_then(Duration::try_seconds)
        .unwrap_or(Duration::MAX)
}

/// Session service plus the cookie it reads tokens from.
#[derive(Clone)]
pub struct SessionContext {
    /// Token issuer and validator.
    pub service: Arc<dyn SessionService>,
    /// Name of the cookie carrying the token.
    pub cookie_name: Arc<str>,
}

impl SessionContext {
    /// Bundle `service` with the cookie name it is read from.
    pub fn new(service: Arc<dyn SessionService>, cookie_name: impl Into<Arc<str>>) -> Self {
        Self {
            service,
            cookie_name: cookie_name.into(),
        }
    }
}

/// Find cookie `name` across all `Cookie` headers of a request.
fn find_cookie<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts
        .headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|header| header.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim_matches('"'))
}

/// A request whose session cookie validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser(pub UserId);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    SessionContext: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let context = SessionContext::from_ref(state);
        let token = find_cookie(parts, &context.cookie_name).ok_or(SessionError::Missing)?;
        let user = context.service.validate(token)?;
        Ok(Self(user))
    }
}
