//! End-to-end research pipeline
//!
//! query → social lookup (or URL discovery) → page text per URL →
//! provenance buckets → one grounded summary per bucket → report.
//!
//! Every stage runs sequentially. Collaborator failures never abort a run:
//! they are logged and replaced by empty results.

use crate::aggregator::{ReportAggregator, SectionBudget};
use crate::sources::{HttpPageFetcher, RapidApiSocialLookup, SearchUrlGenerator};
use crate::{ResearchError, ResearchResult};
use chrono::NaiveDate;
use delve_core::{
    log_operation_start, log_operation_success, performance::measure_async, DateFilter,
    DelveConfig, PageFetcher, ResearchReport, ResearchRequest, SocialLookup, SocialLookupResult,
    UrlDiscovery,
};
use delve_generation::{ChunkController, FactGroundedSummarizer, GenerationEngine};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Tunables of a pipeline instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineOptions {
    pub budget: SectionBudget,
    /// Generate a free-form draft answer first and pass it along as prior context
    pub draft_first: bool,
    pub draft_max_tokens: u32,
    pub draft_timeout: Duration,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            budget: SectionBudget::default(),
            draft_first: false,
            draft_max_tokens: 256,
            draft_timeout: Duration::from_secs(600),
        }
    }
}

impl PipelineOptions {
    pub fn from_config(config: &DelveConfig) -> Self {
        Self {
            budget: SectionBudget::from(&config.pipeline),
            draft_first: config.pipeline.draft_first,
            draft_max_tokens: config.generation.max_tokens,
            draft_timeout: Duration::from_secs(config.generation.timeout_seconds),
        }
    }
}

/// Single entry point from a research request to the final report
pub struct ResearchPipeline {
    engine: GenerationEngine,
    aggregator: ReportAggregator,
    social: Option<Arc<dyn SocialLookup>>,
    discovery: Arc<dyn UrlDiscovery>,
    fetcher: Arc<dyn PageFetcher>,
    options: PipelineOptions,
}

impl ResearchPipeline {
    pub fn new(
        engine: GenerationEngine,
        discovery: Arc<dyn UrlDiscovery>,
        fetcher: Arc<dyn PageFetcher>,
    ) -> Self {
        let summarizer = FactGroundedSummarizer::new(ChunkController::new(engine.clone()));
        Self {
            engine,
            aggregator: ReportAggregator::new(summarizer),
            social: None,
            discovery,
            fetcher,
            options: PipelineOptions::default(),
        }
    }

    pub fn with_social_lookup(mut self, social: Arc<dyn SocialLookup>) -> Self {
        self.social = Some(social);
        self
    }

    pub fn with_options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    /// Pipeline wired to the llama-cli backend and the HTTP collaborators
    pub fn from_config(config: &DelveConfig) -> ResearchResult<Self> {
        let engine = GenerationEngine::from_config(&config.generation)?;
        let fetcher = HttpPageFetcher::new(&config.sources)?;

        let mut pipeline = Self::new(
            engine,
            Arc::new(SearchUrlGenerator::new()),
            Arc::new(fetcher),
        )
        .with_options(PipelineOptions::from_config(config));

        match RapidApiSocialLookup::from_config(&config.sources)? {
            Some(lookup) => pipeline = pipeline.with_social_lookup(Arc::new(lookup)),
            None => info!("No RapidAPI key configured, social lookup disabled"),
        }

        Ok(pipeline)
    }

    pub fn engine(&self) -> &GenerationEngine {
        &self.engine
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    pub fn has_social_lookup(&self) -> bool {
        self.social.is_some()
    }

    /// Run one research request.
    ///
    /// Only an empty query is rejected; unreadable dates are dropped and every
    /// other problem degrades into less source text. No usable text at all yields
    /// an empty summary, which is still a success.
    pub async fn run(&self, request: &ResearchRequest) -> ResearchResult<ResearchReport> {
        let query = request.query.trim();
        if query.is_empty() {
            return Err(ResearchError::EmptyQuery);
        }
        let date_filter =
            build_date_filter(request.start_date.as_deref(), request.end_date.as_deref());

        Ok(measure_async("research", self.execute(query, request.max_sources, date_filter)).await)
    }

    async fn execute(
        &self,
        query: &str,
        max_sources: usize,
        date_filter: DateFilter,
    ) -> ResearchReport {
        log_operation_start!("research", query = %query, max_sources = max_sources);
        if !date_filter.is_empty() {
            debug!(?date_filter, "Date filter accepted; it does not restrict sources");
        }

        let prior_context = self.draft(query).await;

        let lookup = self.lookup(query, max_sources).await;
        let urls = if lookup.urls.is_empty() {
            info!("No URLs from social lookup, generating search URLs");
            self.discovery.discover(query).await
        } else {
            lookup.urls
        };

        let texts = self.fetch_all(&urls, max_sources).await;

        let aggregated = self
            .aggregator
            .build_report(
                &urls,
                &texts,
                &lookup.content,
                query,
                &prior_context,
                self.options.budget,
            )
            .await;

        log_operation_success!(
            "research",
            sections = aggregated.sections.len(),
            urls = urls.len()
        );

        ResearchReport {
            query: query.to_string(),
            final_summary: aggregated.text,
            sources_processed: aggregated.sections.len(),
            sections: aggregated.sections,
            urls_scraped: urls.len(),
            date_filter,
        }
    }

    async fn draft(&self, query: &str) -> String {
        if !self.options.draft_first {
            return String::new();
        }

        let result = self
            .engine
            .generate(query, self.options.draft_max_tokens, self.options.draft_timeout)
            .await;
        debug!(chars = result.text.len(), "Draft answer generated");
        result.text
    }

    async fn lookup(&self, query: &str, max_results: usize) -> SocialLookupResult {
        let Some(social) = &self.social else {
            return SocialLookupResult::empty();
        };

        match social.lookup(query, max_results).await {
            Ok(result) => {
                info!(urls = result.urls.len(), "Social lookup returned");
                result
            }
            Err(e) => {
                warn!(error = %e, "Social lookup failed, continuing without it");
                SocialLookupResult::empty()
            }
        }
    }

    /// Text for the first `max_sources` URLs, one entry per URL, in order
    async fn fetch_all(&self, urls: &[String], max_sources: usize) -> Vec<String> {
        let mut texts = Vec::with_capacity(urls.len().min(max_sources));

        for url in urls.iter().take(max_sources) {
            let text = match self.fetcher.fetch_text(url).await {
                Ok(text) if !text.trim().is_empty() => {
                    format!("--- Content from {} ---\n{}", url, text.trim())
                }
                Ok(_) => String::new(),
                Err(e) => {
                    warn!(url = %url, error = %e, "Page fetch failed, using empty text");
                    String::new()
                }
            };
            texts.push(text);
        }

        texts
    }
}

impl std::fmt::Debug for ResearchPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResearchPipeline")
            .field("engine", &self.engine)
            .field("social_lookup", &self.social.is_some())
            .field("options", &self.options)
            .finish()
    }
}

/// Normalize optional `YYYY-MM-DD` dates into a full-day UTC range.
///
/// Blank values count as absent. A value that is not a calendar date is
/// logged and dropped; dates never fail a request.
pub fn build_date_filter(start: Option<&str>, end: Option<&str>) -> DateFilter {
    DateFilter {
        start: normalize_date(start, "start_date").map(|date| format!("{date}T00:00:00Z")),
        end: normalize_date(end, "end_date").map(|date| format!("{date}T23:59:59Z")),
    }
}

fn normalize_date(value: Option<&str>, field: &str) -> Option<String> {
    let value = value.map(str::trim).filter(|v| !v.is_empty())?;

    match NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        Ok(date) => Some(date.format("%Y-%m-%d").to_string()),
        Err(_) => {
            warn!(field, value, "Ignoring date that is not YYYY-MM-DD");
            None
        }
    }
}
