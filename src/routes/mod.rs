// ============================================================================
// Axum Routes Module
// ============================================================================
//
// Structure:
// - mod.rs: Main router assembly and middleware
// - pages.rs: Gated HTML pages (/, /login, /summary)
// - auth.rs: Login and logout
// - summary.rs: Provider catalog, fan-out submission, CSV export
// - health.rs: Health check and metrics endpoints
// - extractors.rs: Credential extractor for API routes
// - middleware.rs: Request logging, security headers, access gate
//
// ============================================================================

mod auth;
mod extractors;
mod health;
mod middleware;
mod pages;
mod summary;

pub use extractors::AuthenticatedUser;

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::{MAX_REQUEST_BODY_SIZE, SecurityConfig};
use crate::context::AppContext;
use crate::gate::{LOGIN_PATH, PROTECTED_PATH, ROOT_PATH};

/// Create the main application router with all routes
pub fn create_router(app_context: Arc<AppContext>) -> Router {
    let router = Router::new()
        // Gated pages
        .route(ROOT_PATH, get(pages::root))
        .route(LOGIN_PATH, get(pages::login_page))
        .route(PROTECTED_PATH, get(pages::summary_page))
        // Health and monitoring
        .route("/health", get(health::health_check))
        .route("/metrics", get(health::metrics))
        // Authentication
        .route("/api/login", post(auth::login))
        .route("/api/logout", post(auth::logout))
        // Summaries
        .route("/api/providers", get(summary::list_providers))
        .route("/api/summary", post(summary::submit_summary))
        .route("/api/summary/export", post(summary::submit_and_export))
        .route("/api/export", post(summary::export_results))
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_SIZE))
        // Access gate (needs state, applied separately; runs after logging)
        .layer(axum::middleware::from_fn_with_state(
            app_context.clone(),
            middleware::access_gate,
        ))
        // Apply middleware (order matters - last added runs first)
        .layer(
            ServiceBuilder::new()
                // Tracing layer (outermost - runs first)
                .layer(TraceLayer::new_for_http())
                // Request logging
                .layer(axum::middleware::from_fn(middleware::request_logging))
                // Security headers
                .layer(axum::middleware::from_fn(middleware::add_security_headers))
                .into_inner(),
        );

    let router = match cors_layer(&app_context.config.security) {
        Some(cors) => router.layer(cors),
        None => router,
    };

    router.with_state(app_context)
}

/// Credentialed CORS for the configured origins, `None` when there are none
fn cors_layer(security: &SecurityConfig) -> Option<CorsLayer> {
    let origins: Vec<HeaderValue> = security
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if origins.is_empty() {
        return None;
    }

    Some(
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([
                header::ORIGIN,
                header::CONTENT_TYPE,
                header::ACCEPT,
                header::AUTHORIZATION,
            ])
            .allow_credentials(true),
    )
}
