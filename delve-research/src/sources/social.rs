//! Social post lookup through the RapidAPI "social media master" service
//!
//! The service has no search endpoint, so only queries made of explicit
//! `user_id:post_id` pairs return anything.

use async_trait::async_trait;
use delve_core::{
    collaborator_error, DelveError, DelveResult, ErrorContext, SocialLookup, SocialLookupResult,
    SourcesConfig,
};
use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

/// One `user_id:post_id` reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostPair {
    pub user_id: String,
    pub post_id: String,
}

/// Parse a comma-separated list of `user_id:post_id` pairs.
///
/// Returns `None` unless every entry is a pair of non-empty ids without
/// whitespace, so ordinary search queries are never sent to the service.
pub fn parse_post_pairs(query: &str) -> Option<Vec<PostPair>> {
    let pairs = query
        .split(',')
        .map(|entry| {
            let (user_id, post_id) = entry.trim().split_once(':')?;
            let valid = |id: &str| !id.is_empty() && !id.contains(char::is_whitespace);
            (valid(user_id) && valid(post_id)).then(|| PostPair {
                user_id: user_id.to_string(),
                post_id: post_id.to_string(),
            })
        })
        .collect::<Option<Vec<_>>>()?;

    (!pairs.is_empty()).then_some(pairs)
}

/// `(postUrl, text)` of the first post in a `universal-post-details` response
pub fn extract_post(response: &Value) -> (Option<String>, Option<String>) {
    let details = &response["post"][0]["postDetails"];
    let field = |name: &str| {
        details[name]
            .as_str()
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    };
    (field("postUrl"), field("text"))
}

/// [`SocialLookup`] backed by the RapidAPI post-details endpoint
#[derive(Debug, Clone)]
pub struct RapidApiSocialLookup {
    client: reqwest::Client,
    base_url: String,
}

impl RapidApiSocialLookup {
    pub fn new(api_key: &str, host: &str, timeout: Duration) -> DelveResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert("x-rapidapi-host", header_value(host, "x-rapidapi-host")?);
        headers.insert("x-rapidapi-key", header_value(api_key, "x-rapidapi-key")?);

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| DelveError::Network {
                message: format!("Failed to create HTTP client: {}", e),
                source: Some(Box::new(e)),
                context: ErrorContext::new("social_lookup").with_operation("create_client"),
            })?;

        Ok(Self {
            client,
            base_url: format!("https://{}", host),
        })
    }

    /// Lookup configured from `sources`, or `None` when no RapidAPI key is set
    pub fn from_config(sources: &SourcesConfig) -> DelveResult<Option<Self>> {
        match sources.rapidapi_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => Self::new(
                key,
                &sources.rapidapi_host,
                Duration::from_secs(sources.fetch_timeout_seconds),
            )
            .map(Some),
            _ => Ok(None),
        }
    }

    async fn post_details(&self, pair: &PostPair) -> DelveResult<Value> {
        let response = self
            .client
            .get(format!("{}/universal-post-details", self.base_url))
            .query(&[
                ("id", pair.user_id.as_str()),
                ("postID", pair.post_id.as_str()),
                ("includeProfile", "false"),
            ])
            .send()
            .await
            .map_err(|e| collaborator_error!(e.to_string(), "social_lookup", e))?
            .error_for_status()
            .map_err(|e| collaborator_error!(e.to_string(), "social_lookup", e))?;

        response
            .json::<Value>()
            .await
            .map_err(|e| collaborator_error!(e.to_string(), "social_lookup", e))
    }
}

fn header_value(value: &str, name: &str) -> DelveResult<HeaderValue> {
    HeaderValue::from_str(value).map_err(|e| DelveError::Config {
        message: format!("Invalid header value for '{}': {}", name, e),
        source: Some(Box::new(e)),
        context: ErrorContext::new("social_lookup").with_operation("create_client"),
    })
}

#[async_trait]
impl SocialLookup for RapidApiSocialLookup {
    async fn lookup(&self, query: &str, max_results: usize) -> DelveResult<SocialLookupResult> {
        let Some(pairs) = parse_post_pairs(query) else {
            warn!(
                query = %query,
                "No search endpoint for free-text queries; use user_id:post_id[,user_id:post_id...]"
            );
            return Ok(SocialLookupResult::empty());
        };

        let mut result = SocialLookupResult::empty();
        let mut texts = Vec::new();

        for pair in pairs.iter().take(max_results) {
            match self.post_details(pair).await {
                Ok(response) => {
                    let (url, text) = extract_post(&response);
                    debug!(
                        user_id = %pair.user_id,
                        post_id = %pair.post_id,
                        has_url = url.is_some(),
                        has_text = text.is_some(),
                        "Fetched post details"
                    );
                    result.urls.extend(url);
                    texts.extend(text);
                }
                Err(e) => {
                    warn!(
                        user_id = %pair.user_id,
                        post_id = %pair.post_id,
                        error = %e,
                        "Failed fetching post"
                    );
                }
            }
        }

        result.content = texts.join("\n\n");
        info!(urls = result.urls.len(), "Social lookup finished");
        Ok(result)
    }
}
