//! HTTP page fetching and HTML-to-text extraction

use async_trait::async_trait;
use delve_core::{
    retry_async, DelveError, DelveResult, ErrorContext, PageFetcher, RetryConfig, SourcesConfig,
};
use futures::FutureExt;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{debug, info};

const SCRAPER_API_ENDPOINT: &str = "https://api.scraperapi.com";

fn selector(css: &'static str) -> Selector {
    Selector::parse(css).expect("valid static selector")
}

static NOISE: LazyLock<Selector> =
    LazyLock::new(|| selector("script, style, header, footer, nav, aside, button, form"));
static BODY: LazyLock<Selector> = LazyLock::new(|| selector("body"));
static WIKIPEDIA_PARAGRAPHS: LazyLock<Selector> =
    LazyLock::new(|| selector("#mw-content-text p"));
static HEADLINES: LazyLock<Selector> = LazyLock::new(|| selector("h3"));
static PARAGRAPHS: LazyLock<Selector> = LazyLock::new(|| selector("p"));
static TWEETS: LazyLock<Selector> = LazyLock::new(|| selector(r#"div[data-testid="tweetText"]"#));

/// [`PageFetcher`] that downloads pages over HTTP and extracts readable text
#[derive(Debug, Clone)]
pub struct HttpPageFetcher {
    client: reqwest::Client,
    scraper_api_key: Option<String>,
    max_chars: usize,
    retry: RetryConfig,
}

impl HttpPageFetcher {
    pub fn new(config: &SourcesConfig) -> DelveResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.fetch_timeout_seconds))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| DelveError::Network {
                message: format!("Failed to create HTTP client: {}", e),
                source: Some(Box::new(e)),
                context: ErrorContext::new("page_fetcher").with_operation("create_client"),
            })?;

        Ok(Self {
            client,
            scraper_api_key: config
                .scraper_api_key
                .clone()
                .filter(|key| !key.trim().is_empty()),
            max_chars: config.max_chars,
            retry: RetryConfig::fixed(config.retry_attempts, config.retry_backoff_ms),
        })
    }

    /// Address actually requested for `url`, routed through ScraperAPI when a key is set
    pub fn request_url(&self, url: &str) -> DelveResult<String> {
        let Some(key) = &self.scraper_api_key else {
            return Ok(url.to_string());
        };

        url::Url::parse_with_params(
            SCRAPER_API_ENDPOINT,
            &[("api_key", key.as_str()), ("url", url), ("render", "true")],
        )
        .map(String::from)
        .map_err(|e| DelveError::Internal {
            message: format!("Failed to build proxy URL: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("page_fetcher").with_operation("request_url"),
        })
    }

    async fn fetch_html(&self, target: &str, url: &str) -> DelveResult<String> {
        let response = self
            .client
            .get(target)
            .send()
            .await
            .map_err(|e| network_error(url, "send", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DelveError::Network {
                message: format!(
                    "HTTP {} for {}: {}",
                    status.as_u16(),
                    url,
                    status.canonical_reason().unwrap_or("Unknown error")
                ),
                source: None,
                context: ErrorContext::new("page_fetcher")
                    .with_operation("fetch_html")
                    .with_metadata("url", url),
            });
        }

        response
            .text()
            .await
            .map_err(|e| network_error(url, "read_body", e))
    }
}

fn network_error(url: &str, operation: &str, error: reqwest::Error) -> DelveError {
    DelveError::Network {
        message: format!("Request to {} failed: {}", url, error.without_url()),
        source: None,
        context: ErrorContext::new("page_fetcher")
            .with_operation(operation)
            .with_metadata("url", url),
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch_text(&self, url: &str) -> DelveResult<String> {
        let target = self.request_url(url)?;

        let html = retry_async(
            || self.fetch_html(&target, url).boxed(),
            self.retry.clone(),
            "fetch_page",
        )
        .await?;

        let text = extract_page_text(url, &html, self.max_chars);
        info!(url = %url, chars = text.chars().count(), "Fetched page text");
        Ok(text)
    }
}

/// Readable text of `html`, at most `max_chars` characters.
///
/// Layout elements are removed first. Known sites get targeted extraction;
/// everything else, or a site rule that finds nothing, falls back to the
/// whole body text.
pub fn extract_page_text(url: &str, html: &str, max_chars: usize) -> String {
    let mut document = Html::parse_document(html);
    remove_noise(&mut document);

    let text = match site_text(url, &document) {
        Some(text) if !text.trim().is_empty() => text,
        _ => body_text(&document),
    };

    text.trim().chars().take(max_chars).collect()
}

fn remove_noise(document: &mut Html) {
    let noise: Vec<_> = document.select(&NOISE).map(|element| element.id()).collect();
    for id in noise {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }
}

fn site_text(url: &str, document: &Html) -> Option<String> {
    if url.contains("wikipedia.org") {
        return Some(first_texts(document, &WIKIPEDIA_PARAGRAPHS, 10));
    }
    if url.contains("news.google.com") {
        return Some(first_texts(document, &HEADLINES, 10));
    }
    if url.contains("reddit.com") {
        let headlines = first_texts(document, &HEADLINES, 15);
        return Some(if headlines.is_empty() {
            first_texts(document, &PARAGRAPHS, 15)
        } else {
            headlines
        });
    }
    if url.contains("bbc.com") || url.contains("cnn.com") {
        return Some(first_texts(document, &PARAGRAPHS, 15));
    }
    if is_twitter(url) {
        return Some(first_texts(document, &TWEETS, 10));
    }

    debug!(url = %url, "No site rule, using body text");
    None
}

fn is_twitter(url: &str) -> bool {
    let Ok(parsed) = url::Url::parse(url) else {
        return false;
    };
    parsed.host_str().is_some_and(|host| {
        ["twitter.com", "x.com"]
            .iter()
            .any(|domain| host == *domain || host.ends_with(&format!(".{domain}")))
    })
}

fn first_texts(document: &Html, selector: &Selector, limit: usize) -> String {
    document
        .select(selector)
        .take(limit)
        .map(|element| element_text(element, " "))
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn body_text(document: &Html) -> String {
    document
        .select(&BODY)
        .next()
        .map(|body| element_text(body, "\n"))
        .unwrap_or_default()
}

fn element_text(element: ElementRef<'_>, separator: &str) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .collect::<Vec<_>>()
        .join(separator)
}
