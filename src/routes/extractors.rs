// ============================================================================
// Axum Extractors
// ============================================================================
//
// AuthenticatedUser: validates the credential carried by an API request,
// taken from `Authorization: Bearer` or, failing that, the token cookie.
//
// ApiJson: JSON body whose rejections answer with the standard error body
// instead of axum's plain-text 400/415/422.
//
// ============================================================================

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Request, rejection::JsonRejection},
    http::request::Parts,
    Json,
};
use std::sync::Arc;

use crate::context::AppContext;
use crate::error::AppError;

/// Extractor for the authenticated username
///
/// Usage:
/// ```rust,ignore
/// async fn handler(user: AuthenticatedUser, ...) -> Result<...> {
///     let username = user.0;
///     // ...
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub String);

#[async_trait]
impl FromRequestParts<Arc<AppContext>> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppContext>,
    ) -> Result<Self, Self::Rejection> {
        let username = authenticate(state, parts).inspect_err(|_| {
            tracing::debug!(path = %parts.uri.path(), "API request without a valid credential");
        })?;

        Ok(AuthenticatedUser(username))
    }
}

/// `Json<T>` with rejections mapped into [`AppError::Json`]
///
/// Serde's message (field names, positions) goes to the log only.
#[derive(Debug, Clone)]
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(ApiJson(value))
    }
}

fn authenticate(ctx: &AppContext, parts: &Parts) -> Result<String, AppError> {
    let token = ctx
        .request_token(&parts.headers)
        .ok_or_else(|| AppError::auth("Missing credentials"))?;

    let claims = ctx
        .auth_manager
        .verify_token(&token)
        .map_err(|_| AppError::auth("Invalid or expired token"))?;

    Ok(claims.sub)
}
