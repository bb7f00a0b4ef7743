//! Core data type definitions

use serde::{Deserialize, Serialize};

use crate::logging::LoggingConfig;

/// A research request as accepted at the pipeline boundary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchRequest {
    pub query: String,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default = "default_max_sources")]
    pub max_sources: usize,
}

fn default_max_sources() -> usize {
    5
}

impl ResearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            start_date: None,
            end_date: None,
            max_sources: default_max_sources(),
        }
    }

    pub fn with_dates(mut self, start: Option<String>, end: Option<String>) -> Self {
        self.start_date = start;
        self.end_date = end;
        self
    }

    pub fn with_max_sources(mut self, max_sources: usize) -> Self {
        self.max_sources = max_sources;
        self
    }
}

/// Normalized date range taken from a request.
///
/// Accepted and echoed back, but never consulted when selecting or
/// filtering sources.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateFilter {
    /// `YYYY-MM-DDT00:00:00Z`
    pub start: Option<String>,
    /// `YYYY-MM-DDT23:59:59Z`
    pub end: Option<String>,
}

impl DateFilter {
    pub fn is_empty(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}

/// One summarized provenance category of the final report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSection {
    pub label: String,
    pub summary: String,
}

impl ReportSection {
    /// Render the section as it appears in the final report
    pub fn render(&self) -> String {
        format!("### {} Summary\n{}", self.label, self.summary)
    }
}

/// Final output of a research run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchReport {
    pub query: String,
    /// Sections joined by blank lines; empty when no source produced text
    pub final_summary: String,
    pub sections: Vec<ReportSection>,
    /// Number of provenance buckets that were summarized
    pub sources_processed: usize,
    /// Number of candidate URLs known to the run
    pub urls_scraped: usize,
    pub date_filter: DateFilter,
}

/// Result of the social-data lookup collaborator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialLookupResult {
    pub urls: Vec<String>,
    pub content: String,
}

impl SocialLookupResult {
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DelveConfig {
    pub generation: GenerationConfig,
    pub pipeline: PipelineConfig,
    pub sources: SourcesConfig,
    pub logging: LoggingConfig,
}

/// Local text-generation backend (llama.cpp `llama-cli`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Path to the `llama-cli` executable
    pub llama_cli_path: String,
    /// Path to the GGUF model file
    pub model_path: String,
    pub threads: u32,
    pub temperature: f32,
    /// Output tokens for a single, unchunked generation call
    pub max_tokens: u32,
    /// Wall-clock limit for one backend invocation
    pub timeout_seconds: u64,
    /// Extra arguments appended to every invocation
    pub extra_args: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Default number of URLs fetched per request
    pub max_sources: usize,
    /// Total token budget for each report section
    pub section_token_budget: u32,
    /// Tokens requested per backend call
    pub chunk_size: u32,
    /// Timeout applied to each chunk of a section
    pub section_timeout_seconds: u64,
    /// Generate a free-form draft answer before summarizing sources
    pub draft_first: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub user_agent: String,
    pub fetch_timeout_seconds: u64,
    /// Maximum characters kept per fetched page
    pub max_chars: usize,
    pub retry_attempts: usize,
    pub retry_backoff_ms: u64,
    /// Route page fetches through ScraperAPI when set
    pub scraper_api_key: Option<String>,
    /// RapidAPI key for the social-data lookup; lookup is disabled when unset
    pub rapidapi_key: Option<String>,
    pub rapidapi_host: String,
}
