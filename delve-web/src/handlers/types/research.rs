//! Research endpoint types

use delve_core::{ResearchReport, ResearchRequest};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Research request body
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ResearchApiRequest {
    /// Free-text query, or `user_id:post_id` pairs separated by commas
    #[serde(default)]
    #[schema(example = "rust async runtimes")]
    pub query: String,
    #[schema(example = "2024-01-01")]
    pub start_date: Option<String>,
    #[schema(example = "2024-01-31")]
    pub end_date: Option<String>,
    /// Number of URLs to fetch; the server default applies when omitted
    #[schema(example = 5)]
    pub max_sources: Option<usize>,
}

impl ResearchApiRequest {
    pub fn into_request(self, default_max_sources: usize) -> ResearchRequest {
        ResearchRequest::new(self.query)
            .with_dates(self.start_date, self.end_date)
            .with_max_sources(self.max_sources.unwrap_or(default_max_sources))
    }
}

/// Research response body
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ResearchApiResponse {
    #[schema(example = true)]
    pub success: bool,
    #[schema(example = "### Wikipedia Summary\n- Rust is a systems programming language.")]
    pub final_summary: String,
    #[schema(example = "rust async runtimes")]
    pub query: String,
    /// Number of summarized source categories
    #[schema(example = 2)]
    pub sources_processed: usize,
    /// Number of candidate URLs considered
    #[schema(example = 5)]
    pub urls_scraped: usize,
}

impl From<ResearchReport> for ResearchApiResponse {
    fn from(report: ResearchReport) -> Self {
        Self {
            success: true,
            final_summary: report.final_summary,
            query: report.query,
            sources_processed: report.sources_processed,
            urls_scraped: report.urls_scraped,
        }
    }
}

/// Capabilities of this server instance
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CapabilitiesResponse {
    /// Report section labels, in the order rules are applied
    pub source_categories: Vec<String>,
    #[schema(example = "llama-cli (llama-cli) with model models/model.gguf")]
    pub backend: String,
    pub social_lookup_enabled: bool,
    pub default_max_sources: usize,
    pub section_token_budget: i64,
    pub chunk_size: i64,
    pub section_timeout_seconds: u64,
    pub draft_first: bool,
}
