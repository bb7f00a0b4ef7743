//! Delve Research - from a query to a categorized, fact-grounded report
//!
//! This crate sits on top of `delve-generation` and turns raw source text
//! into the final multi-section report:
//!
//! - **Categorizer**: assigns every fetched URL to a provenance bucket
//! - **Aggregator**: one grounded summary per bucket, rendered as sections
//! - **Pipeline**: query validation, lookup, URL discovery fallback, page
//!   fetching and aggregation in one call
//! - **Sources**: concrete collaborators (search URL generator, HTTP page
//!   fetcher, RapidAPI social lookup)

pub mod aggregator;
pub mod categorizer;
pub mod pipeline;
pub mod sources;

pub use aggregator::{section_instruction, AggregatedReport, ReportAggregator, SectionBudget};
pub use categorizer::{classify_url, group_sources, SourceBucket, SourceCategory};
pub use pipeline::{build_date_filter, PipelineOptions, ResearchPipeline};
pub use sources::{HttpPageFetcher, RapidApiSocialLookup, SearchUrlGenerator};

/// Research-level error type
#[derive(Debug, thiserror::Error)]
pub enum ResearchError {
    #[error("Query cannot be empty")]
    EmptyQuery,

    #[error("Core error: {0}")]
    Core(#[from] delve_core::DelveError),
}

pub type ResearchResult<T> = Result<T, ResearchError>;

impl ResearchError {
    /// Whether the caller sent a bad request, as opposed to a server-side failure
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::EmptyQuery)
    }
}
