// ============================================================================
// Axum Middleware
// ============================================================================
//
// - request_logging: log every request with status and latency
// - add_security_headers: security headers on every response
// - access_gate: redirect page requests according to the access gate
//
// ============================================================================

use axum::{
    extract::{Request, State},
    http::{HeaderValue, StatusCode, header::LOCATION},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use std::time::Instant;

use crate::context::AppContext;
use crate::gate;
use crate::metrics;
use crate::utils::{add_security_headers as utils_add_security_headers, extract_cookie, is_https};

/// Request logging middleware
pub async fn request_logging(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    tracing::debug!(
        method = %method,
        path = %path,
        "Incoming request"
    );

    let response = next.run(req).await;

    let duration = start.elapsed();
    let status = response.status();

    tracing::info!(
        method = %method,
        path = %path,
        status = %status.as_u16(),
        duration_ms = duration.as_millis(),
        "Request completed"
    );

    response
}

/// Add security headers to responses
pub async fn add_security_headers(req: Request, next: Next) -> Response {
    // Extract HTTPS status before moving req
    let https = is_https(req.headers());

    let mut response = next.run(req).await;
    utils_add_security_headers(response.headers_mut(), https);
    response
}

/// Access gate middleware
///
/// Only the gated page paths are affected; everything else passes through
/// untouched. Redirects use 303 so the browser always follows with a GET.
pub async fn access_gate(
    State(ctx): State<Arc<AppContext>>,
    req: Request,
    next: Next,
) -> Response {
    let token = extract_cookie(req.headers(), &ctx.config.security.cookie_name);

    let redirect_to = gate::evaluate(
        req.uri().path(),
        token.as_deref(),
        ctx.auth_manager.as_ref(),
    )
    .and_then(|decision| decision.location().map(|location| (decision, location)));
    let Some((decision, location)) = redirect_to else {
        return next.run(req).await;
    };

    metrics::GATE_REDIRECTS_TOTAL
        .with_label_values(&[decision.as_str()])
        .inc();
    tracing::debug!(
        path = %req.uri().path(),
        decision = %decision,
        "Access gate redirect"
    );

    redirect(location)
}

fn redirect(location: &'static str) -> Response {
    (
        StatusCode::SEE_OTHER,
        [(LOCATION, HeaderValue::from_static(location))],
    )
        .into_response()
}
