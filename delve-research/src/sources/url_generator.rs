//! Fallback search URLs synthesized from the query

use async_trait::async_trait;
use delve_core::UrlDiscovery;
use tracing::debug;

const SEARCH_TEMPLATES: [&str; 5] = [
    "https://www.google.com/search?q=",
    "https://news.google.com/search?q=",
    "https://www.reddit.com/search/?q=",
    "https://medium.com/search?q=",
    "https://hn.algolia.com/?q=",
];

/// Search-engine result pages for `query`, form-encoded (`+` for spaces)
pub fn search_urls(query: &str) -> Vec<String> {
    let encoded = urlencoding::encode(query).replace("%20", "+");
    SEARCH_TEMPLATES
        .iter()
        .map(|template| format!("{template}{encoded}"))
        .collect()
}

/// [`UrlDiscovery`] backed by fixed search-engine URL templates
#[derive(Debug, Clone, Default)]
pub struct SearchUrlGenerator;

impl SearchUrlGenerator {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl UrlDiscovery for SearchUrlGenerator {
    async fn discover(&self, query: &str) -> Vec<String> {
        let urls = search_urls(query);
        for (index, url) in urls.iter().enumerate() {
            debug!(index = index + 1, url = %url, "Generated search URL");
        }
        urls
    }
}
