// ============================================================================
// Summary Routes
// ============================================================================
//
// Endpoints (all require a valid credential):
// - GET  /api/providers       - Provider/model catalog
// - POST /api/summary         - Fan the content out to the selected models
// - POST /api/summary/export  - Same, answered with the CSV export
// - POST /api/export          - CSV export of results the client already has
//
// ============================================================================

use axum::{
    extract::State,
    http::{
        HeaderValue, StatusCode,
        header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    },
    response::{IntoResponse, Response},
    Json,
};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::aggregator::{Provider, ProviderSelection, ResultSet};
use crate::context::AppContext;
use crate::error::{AppError, AppResult};
use crate::export::{self, CSV_CONTENT_TYPE, CsvExport};
use crate::routes::extractors::{ApiJson, AuthenticatedUser};
use crate::session::SummarySession;

#[derive(Debug, Serialize)]
pub struct ProvidersResponse<'a> {
    pub providers: &'a [Provider],
}

#[derive(Debug, Deserialize)]
pub struct SummaryRequestBody {
    pub content: String,
    /// `{"<provider>": ["<model>", ...]}`
    pub selection: ProviderSelection,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponseBody {
    pub results: ResultSet,
}

#[derive(Debug, Deserialize)]
pub struct ExportRequestBody {
    pub content: String,
    pub results: ResultSet,
}

/// GET /api/providers
pub async fn list_providers(
    State(app_context): State<Arc<AppContext>>,
    _user: AuthenticatedUser,
) -> impl IntoResponse {
    Json(ProvidersResponse {
        providers: &app_context.config.upstream.providers,
    })
    .into_response()
}

/// POST /api/summary
pub async fn submit_summary(
    State(app_context): State<Arc<AppContext>>,
    AuthenticatedUser(username): AuthenticatedUser,
    ApiJson(body): ApiJson<SummaryRequestBody>,
) -> AppResult<Json<SummaryResponseBody>> {
    let session = run_session(&app_context, &username, body).await?;
    Ok(Json(SummaryResponseBody {
        results: session.results().clone(),
    }))
}

/// POST /api/summary/export
pub async fn submit_and_export(
    State(app_context): State<Arc<AppContext>>,
    AuthenticatedUser(username): AuthenticatedUser,
    ApiJson(body): ApiJson<SummaryRequestBody>,
) -> AppResult<Response> {
    let session = run_session(&app_context, &username, body).await?;
    csv_response(session.export()?)
}

/// POST /api/export
pub async fn export_results(
    _user: AuthenticatedUser,
    ApiJson(body): ApiJson<ExportRequestBody>,
) -> AppResult<Response> {
    let export = export::export(&body.content, &body.results, &Local::now())?;
    csv_response(export)
}

async fn run_session(
    app_context: &AppContext,
    username: &str,
    body: SummaryRequestBody,
) -> AppResult<SummarySession> {
    let mut session = SummarySession::with_selection(body.selection);
    session.set_content(body.content);

    tracing::info!(
        user = %username,
        models = session.selection().request_count(),
        content_len = session.content().len(),
        "Summary submission"
    );

    session
        .submit(&app_context.aggregator, &app_context.config.upstream.providers)
        .await?;
    Ok(session)
}

fn csv_response(export: CsvExport) -> AppResult<Response> {
    let disposition = HeaderValue::from_str(&format!(
        "attachment; filename=\"{}\"",
        export.filename
    ))
    .map_err(|e| AppError::internal(format!("Invalid filename header: {}", e)))?;

    Ok((
        StatusCode::OK,
        [
            (CONTENT_TYPE, HeaderValue::from_static(CSV_CONTENT_TYPE)),
            (CONTENT_DISPOSITION, disposition),
        ],
        export.bytes,
    )
        .into_response())
}
