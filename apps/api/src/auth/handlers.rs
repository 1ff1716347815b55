use axum::{
    extract::State,
    http::header::SET_COOKIE,
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::password::verify_password;
use crate::auth::SessionKeys;
use crate::errors::AppError;
use crate::state::AppState;

const ADMIN_REDIRECT: &str = "/admin/";

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: &'static str,
    pub redirect_url: &'static str,
}

/// POST /api/secret-login/
pub async fn handle_secret_login(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, AppError> {
    let req: LoginRequest =
        serde_json::from_slice(&body).map_err(|_| AppError::bad_request("Invalid JSON"))?;

    if req.username.is_empty() || req.password.is_empty() {
        return Err(AppError::bad_request("Username and password required"));
    }

    let auth = &state.auth;
    let password_ok = verify_password(&req.password, &auth.admin_password_hash)
        .map_err(|e| anyhow::anyhow!("Stored admin password hash is unusable: {e}"))?;
    if req.username != auth.admin_username || !password_ok {
        warn!("Rejected login attempt for '{}'", req.username);
        return Err(AppError::InvalidCredentials);
    }

    let token = auth
        .keys
        .issue(&req.username)
        .map_err(|e| anyhow::anyhow!("Failed to sign session token: {e}"))?;
    info!("Admin '{}' logged in", req.username);

    let body = Json(LoginResponse {
        success: true,
        message: "Login successful",
        redirect_url: ADMIN_REDIRECT,
    });
    Ok(([(SET_COOKIE, SessionKeys::cookie(&token))], body).into_response())
}
