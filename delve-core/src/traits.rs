//! Core trait definitions
//!
//! The research pipeline consumes its sources through these traits. Failures
//! are returned as errors here and converted into empty results by the
//! pipeline, so a single broken source never aborts a request.

use crate::error::DelveResult;
use crate::types::SocialLookupResult;
use async_trait::async_trait;

/// Produces candidate URLs for a query when no other source supplied any
#[async_trait]
pub trait UrlDiscovery: Send + Sync {
    async fn discover(&self, query: &str) -> Vec<String>;
}

/// Social-data lookup service returning URLs plus pre-aggregated text
#[async_trait]
pub trait SocialLookup: Send + Sync {
    async fn lookup(&self, query: &str, max_results: usize) -> DelveResult<SocialLookupResult>;
}

/// Converts a URL into cleaned page text (possibly empty)
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_text(&self, url: &str) -> DelveResult<String>;
}
