// ============================================================================
// Authentication Routes
// ============================================================================
//
// Endpoints:
// - POST /api/login  - Check the configured account, issue a credential
// - POST /api/logout - Drop the credential cookie
//
// Credentials are stateless: logout only clears the browser's cookie, a
// copied token stays valid until it expires.
//
// ============================================================================

use axum::{
    extract::State,
    http::{HeaderValue, StatusCode, header::SET_COOKIE},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use subtle::ConstantTimeEq;

use crate::context::AppContext;
use crate::error::AppError;
use crate::metrics;
use crate::routes::extractors::ApiJson;
use crate::utils::{build_token_cookie, clear_token_cookie};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    /// Lifetime in seconds
    pub expires_in: i64,
}

/// POST /api/login
pub async fn login(
    State(app_context): State<Arc<AppContext>>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let config = &app_context.config;

    if !credentials_match(
        &request.username,
        &request.password,
        &config.auth_username,
        &config.auth_password,
    ) {
        metrics::LOGINS_TOTAL.with_label_values(&["rejected"]).inc();
        return Err(AppError::auth("Invalid username or password"));
    }

    let issued = app_context.auth_manager.create_token(&request.username)?;

    let cookie = build_token_cookie(
        &config.security.cookie_name,
        &issued.token,
        issued.expires_in,
        config.security.cookie_secure,
    );
    let cookie = HeaderValue::from_str(&cookie)
        .map_err(|e| AppError::internal(format!("Invalid cookie header: {}", e)))?;

    metrics::LOGINS_TOTAL.with_label_values(&["accepted"]).inc();
    tracing::info!(jti = %issued.jti, expires_at = issued.expires_at, "Login succeeded");

    Ok((
        StatusCode::OK,
        [(SET_COOKIE, cookie)],
        Json(LoginResponse {
            token: issued.token,
            expires_in: issued.expires_in,
        }),
    ))
}

/// POST /api/logout
pub async fn logout(State(app_context): State<Arc<AppContext>>) -> Result<impl IntoResponse, AppError> {
    let security = &app_context.config.security;
    let cookie = HeaderValue::from_str(&clear_token_cookie(
        &security.cookie_name,
        security.cookie_secure,
    ))
    .map_err(|e| AppError::internal(format!("Invalid cookie header: {}", e)))?;

    Ok((StatusCode::NO_CONTENT, [(SET_COOKIE, cookie)]))
}

/// Compare both fields without short-circuiting on the first mismatch
fn credentials_match(username: &str, password: &str, expected_user: &str, expected_pass: &str) -> bool {
    let user_ok = username.as_bytes().ct_eq(expected_user.as_bytes());
    let pass_ok = password.as_bytes().ct_eq(expected_pass.as_bytes());
    bool::from(user_ok & pass_ok)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_match() {
        assert!(credentials_match("admin", "secret", "admin", "secret"));
        assert!(!credentials_match("admin", "wrong", "admin", "secret"));
        assert!(!credentials_match("root", "secret", "admin", "secret"));
        assert!(!credentials_match("", "", "admin", "secret"));
        assert!(!credentials_match("admin", "secret-but-longer", "admin", "secret"));
    }
}
