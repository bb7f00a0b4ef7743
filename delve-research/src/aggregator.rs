//! Per-bucket summarization and report assembly

use crate::categorizer::{group_sources, SourceBucket};
use delve_core::{PipelineConfig, ReportSection};
use delve_generation::{FactGroundedSummarizer, FALLBACK_SENTENCE};
use std::time::Duration;
use tracing::{debug, info};

/// Generation budget applied to every report section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionBudget {
    pub max_tokens_per_section: i64,
    pub chunk_size: i64,
    pub timeout: Duration,
}

impl Default for SectionBudget {
    fn default() -> Self {
        Self {
            max_tokens_per_section: 400,
            chunk_size: 200,
            timeout: Duration::from_secs(600),
        }
    }
}

impl From<&PipelineConfig> for SectionBudget {
    fn from(config: &PipelineConfig) -> Self {
        Self {
            max_tokens_per_section: i64::from(config.section_token_budget),
            chunk_size: i64::from(config.chunk_size),
            timeout: Duration::from_secs(config.section_timeout_seconds),
        }
    }
}

/// Rendered report plus the sections it was built from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregatedReport {
    pub text: String,
    pub sections: Vec<ReportSection>,
}

/// Builds the multi-section report, one grounded summary per bucket
#[derive(Debug, Clone)]
pub struct ReportAggregator {
    summarizer: FactGroundedSummarizer,
}

impl ReportAggregator {
    pub fn new(summarizer: FactGroundedSummarizer) -> Self {
        Self { summarizer }
    }

    /// Group the sources and summarize each bucket in order.
    ///
    /// Buckets are processed sequentially. With no usable text the report is
    /// empty and no generation happens.
    pub async fn build_report<U, T>(
        &self,
        urls: &[U],
        texts: &[T],
        preaggregated: &str,
        topic: &str,
        prior_context: &str,
        budget: SectionBudget,
    ) -> AggregatedReport
    where
        U: AsRef<str>,
        T: AsRef<str>,
    {
        let buckets = group_sources(urls, texts, preaggregated);
        info!(buckets = buckets.len(), "Summarizing source buckets");

        let mut sections = Vec::with_capacity(buckets.len());
        for bucket in &buckets {
            sections.push(self.summarize_bucket(bucket, topic, prior_context, budget).await);
        }

        AggregatedReport {
            text: render_report(&sections),
            sections,
        }
    }

    async fn summarize_bucket(
        &self,
        bucket: &SourceBucket,
        topic: &str,
        prior_context: &str,
        budget: SectionBudget,
    ) -> ReportSection {
        let combined = bucket.combined_text();
        debug!(
            label = %bucket.label,
            texts = bucket.texts.len(),
            chars = combined.len(),
            "Summarizing bucket"
        );

        let summary = self
            .summarizer
            .summarize(
                &section_instruction(&bucket.label, topic),
                prior_context,
                &combined,
                budget.max_tokens_per_section,
                budget.chunk_size,
                budget.timeout,
            )
            .await;

        ReportSection {
            label: bucket.label.clone(),
            summary,
        }
    }
}

/// Topic prompt handed to the summarizer for one bucket
pub fn section_instruction(label: &str, topic: &str) -> String {
    format!(
        "Summarize ONLY facts present in the following text from {label} for the query: {topic}. \
         Do not invent or hallucinate. \
         Return only structured headlines or facts that exactly appear in the input text. \
         If there is not enough relevant information, say \"{FALLBACK_SENTENCE}\""
    )
}

/// Sections rendered and separated by blank lines
pub fn render_report(sections: &[ReportSection]) -> String {
    sections
        .iter()
        .map(ReportSection::render)
        .collect::<Vec<_>>()
        .join("\n\n")
}
