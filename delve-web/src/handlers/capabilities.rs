//! Server capability handlers

use super::types::CapabilitiesResponse;
use crate::AppState;
use axum::{extract::State, response::Json};
use delve_research::SourceCategory;

/// Describe the backend and the effective pipeline settings
#[utoipa::path(
    get,
    path = "/api/capabilities",
    tag = "Research",
    summary = "Server capabilities",
    description = "Source categories, generation backend and pipeline budgets used by this server",
    responses(
        (status = 200, description = "Capabilities", body = CapabilitiesResponse)
    )
)]
pub async fn capabilities(State(state): State<AppState>) -> Json<CapabilitiesResponse> {
    let pipeline = &state.pipeline;
    let options = pipeline.options();

    let source_categories = std::iter::once(SourceCategory::RapidAi)
        .chain(SourceCategory::URL_RULES)
        .map(|category| category.label().to_string())
        .collect();

    Json(CapabilitiesResponse {
        source_categories,
        backend: pipeline.engine().backend().describe(),
        social_lookup_enabled: pipeline.has_social_lookup(),
        default_max_sources: state.settings.pipeline.max_sources,
        section_token_budget: options.budget.max_tokens_per_section,
        chunk_size: options.budget.chunk_size,
        section_timeout_seconds: options.budget.timeout.as_secs(),
        draft_first: options.draft_first,
    })
}
