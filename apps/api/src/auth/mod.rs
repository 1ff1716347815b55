//! Single-admin authentication: password check at login, signed session
//! token afterwards.

pub mod handlers;
pub mod password;
pub mod session;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::request::Parts;
use axum::http::HeaderMap;

use crate::errors::AppError;
use crate::state::AppState;

pub use session::{SessionKeys, SESSION_COOKIE};

/// Proof that the request carries a valid admin session, either as the
/// `session` cookie or an `Authorization: Bearer` token.
#[derive(Debug, Clone)]
pub struct AdminSession {
    pub username: String,
}

#[async_trait]
impl FromRequestParts<AppState> for AdminSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = session_token(&parts.headers).ok_or(AppError::Unauthorized)?;
        let claims = state
            .auth
            .keys
            .validate(&token)
            .map_err(|_| AppError::Unauthorized)?;
        Ok(AdminSession {
            username: claims.sub,
        })
    }
}

fn session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(token) = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
    {
        return Some(token.trim().to_string());
    }
    cookie_value(headers, SESSION_COOKIE)
}

/// Looks up a cookie by name across all `Cookie` headers.
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}

/// Credentials and signing keys for the admin account.
#[derive(Clone)]
pub struct AuthSettings {
    pub admin_username: String,
    pub admin_password_hash: String,
    pub keys: SessionKeys,
}
