//! Research handlers

use super::types::{ErrorResponse, ResearchApiRequest, ResearchApiResponse};
use crate::{AppState, WebError};
use axum::{extract::State, response::Json};
use tracing::info;

/// Run the research pipeline for one query
#[utoipa::path(
    post,
    path = "/api/research",
    tag = "Research",
    summary = "Run a research query",
    description = "Discover sources for the query, summarize each provenance category and return the categorized report",
    request_body = ResearchApiRequest,
    responses(
        (status = 200, description = "Report generated", body = ResearchApiResponse),
        (status = 400, description = "Empty query", body = ErrorResponse),
        (status = 500, description = "Internal error", body = ErrorResponse)
    )
)]
pub async fn research(
    State(state): State<AppState>,
    Json(request): Json<ResearchApiRequest>,
) -> Result<Json<ResearchApiResponse>, WebError> {
    let request = request.into_request(state.settings.pipeline.max_sources);
    info!(query = %request.query, max_sources = request.max_sources, "Research request received");

    let report = state.pipeline.run(&request).await?;

    info!(
        sources_processed = report.sources_processed,
        urls_scraped = report.urls_scraped,
        "Research request completed"
    );
    Ok(Json(ResearchApiResponse::from(report)))
}
