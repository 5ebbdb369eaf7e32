//! Session status and logout endpoints.
//!
//! Sign-in itself needs a user store and is not served here; these routes
//! only inspect or discard the session cookie.

use crate::error::ServerError;
use crate::session::{AuthenticatedUser, SessionContext, SessionError};
use axum::Json;
use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

/// Body of a successful `GET /api/auth/login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStatus {
    /// The signed-in user.
    #[serde(rename = "userId")]
    pub user_id: String,
}

/// Body of `DELETE /api/auth/logout`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogoutReply {
    /// Confirmation message.
    pub message: String,
}

/// `Set-Cookie` value that makes the browser drop cookie `name`.
pub fn expired_cookie(name: &str) -> String {
    format!("{name}=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax")
}

/// `GET /api/auth/login`: report who the session cookie belongs to.
///
/// A cookie that fails validation is cleared along with the 401.
pub async fn handle_check_login(
    State(sessions): State<SessionContext>,
    user: Result<AuthenticatedUser, ServerError>,
) -> Response {
    match user {
        Ok(AuthenticatedUser(user)) => Json(SessionStatus {
            user_id: user.as_str().to_owned(),
        })
        .into_response(),
        Err(err @ ServerError::Unauthorized(SessionError::Missing)) => err.into_response(),
        Err(err) => (
            [(SET_COOKIE, expired_cookie(&sessions.cookie_name))],
            err.into_response(),
        )
            .into_response(),
    }
}

/// `DELETE /api/auth/logout`: expire the session cookie.
pub async fn handle_logout(
    AuthenticatedUser(user): AuthenticatedUser,
    State(sessions): State<SessionContext>,
) -> Response {
    tracing::info!(user = %user, "user logged out");
    (
        [(SET_COOKIE, expired_cookie(&sessions.cookie_name))],
        Json(LogoutReply {
            message: "logged out".to_owned(),
        }),
    )
        .into_response()
}
