//! Provenance categorization of fetched sources

use serde::{Deserialize, Serialize};
use std::fmt;

/// Provenance bucket of a piece of source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceCategory {
    /// Pre-aggregated social lookup content; never derived from a URL
    RapidAi,
    GoogleSearch,
    GoogleNews,
    Wikipedia,
    Reddit,
    Medium,
    NewsSite,
    Other,
}

impl SourceCategory {
    /// URL-derived categories in rule order
    pub const URL_RULES: [SourceCategory; 7] = [
        SourceCategory::GoogleSearch,
        SourceCategory::GoogleNews,
        SourceCategory::Wikipedia,
        SourceCategory::Reddit,
        SourceCategory::Medium,
        SourceCategory::NewsSite,
        SourceCategory::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SourceCategory::RapidAi => "RapidAI",
            SourceCategory::GoogleSearch => "Google Search",
            SourceCategory::GoogleNews => "Google News",
            SourceCategory::Wikipedia => "Wikipedia",
            SourceCategory::Reddit => "Reddit",
            SourceCategory::Medium => "Medium",
            SourceCategory::NewsSite => "News Site",
            SourceCategory::Other => "Other",
        }
    }

    /// Substrings that select this category; empty for catch-all buckets
    pub fn patterns(&self) -> &'static [&'static str] {
        match self {
            SourceCategory::GoogleSearch => &["google.com/search"],
            SourceCategory::GoogleNews => &["news.google.com"],
            SourceCategory::Wikipedia => &["wikipedia.org"],
            SourceCategory::Reddit => &["reddit.com"],
            SourceCategory::Medium => &["medium.com"],
            SourceCategory::NewsSite => &["bbc.com", "cnn.com"],
            SourceCategory::RapidAi | SourceCategory::Other => &[],
        }
    }
}

impl fmt::Display for SourceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classify a URL by case-sensitive substring rules; the first match wins.
pub fn classify_url(url: &str) -> SourceCategory {
    SourceCategory::URL_RULES
        .into_iter()
        .find(|category| category.patterns().iter().any(|p| url.contains(p)))
        .unwrap_or(SourceCategory::Other)
}

/// Texts that share a provenance label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceBucket {
    pub label: String,
    pub texts: Vec<String>,
}

impl SourceBucket {
    fn new(category: SourceCategory) -> Self {
        Self {
            label: category.label().to_string(),
            texts: Vec::new(),
        }
    }

    /// Texts joined as they are handed to the summarizer
    pub fn combined_text(&self) -> String {
        self.texts.join("\n\n")
    }
}

/// Group `(url, text)` pairs into buckets in first-seen order.
///
/// Pairs are zipped, so surplus URLs or texts are ignored. Whitespace-only
/// texts are dropped. Non-blank `preaggregated` text always becomes the
/// first bucket, labelled `RapidAI`.
pub fn group_sources<U, T>(urls: &[U], texts: &[T], preaggregated: &str) -> Vec<SourceBucket>
where
    U: AsRef<str>,
    T: AsRef<str>,
{
    let mut buckets: Vec<SourceBucket> = Vec::new();

    if !preaggregated.trim().is_empty() {
        let mut bucket = SourceBucket::new(SourceCategory::RapidAi);
        bucket.texts.push(preaggregated.to_string());
        buckets.push(bucket);
    }

    for (url, text) in urls.iter().zip(texts) {
        let text = text.as_ref();
        if text.trim().is_empty() {
            continue;
        }

        let category = classify_url(url.as_ref());
        match buckets.iter_mut().find(|b| b.label == category.label()) {
            Some(bucket) => bucket.texts.push(text.to_string()),
            None => {
                let mut bucket = SourceBucket::new(category);
                bucket.texts.push(text.to_string());
                buckets.push(bucket);
            }
        }
    }

    buckets
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_order_on_adversarial_urls() {
        let cases = [
            // Google Search outranks the Reddit substring in the query
            ("https://www.google.com/search?q=reddit.com", SourceCategory::GoogleSearch),
            // The news search path also contains "google.com/search"
            ("https://news.google.com/search?q=wikipedia.org", SourceCategory::GoogleSearch),
            ("https://news.google.com/stories/wikipedia.org", SourceCategory::GoogleNews),
            ("https://en.wikipedia.org/wiki/Reddit.com", SourceCategory::Wikipedia),
            ("https://www.reddit.com/r/medium.com", SourceCategory::Reddit),
            ("https://medium.com/@x/cnn.com-story", SourceCategory::Medium),
            ("https://www.bbc.com/news", SourceCategory::NewsSite),
            ("https://edition.cnn.com/world", SourceCategory::NewsSite),
            ("https://hn.algolia.com/?q=rust", SourceCategory::Other),
            ("", SourceCategory::Other),
        ];

        for (url, expected) in cases {
            assert_eq!(classify_url(url), expected, "url: {url}");
        }
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        assert_eq!(classify_url("https://EN.WIKIPEDIA.ORG/wiki/Cat"), SourceCategory::Other);
    }

    #[test]
    fn test_news_google_without_search_path() {
        // "news.google.com" does not contain "google.com/search" unless the path says so
        assert_eq!(
            classify_url("https://news.google.com/topstories"),
            SourceCategory::GoogleNews
        );
    }

    #[test]
    fn test_preaggregated_text_comes_first() {
        let buckets = group_sources(
            &["https://en.wikipedia.org/wiki/Cat"],
            &["Cats are mammals."],
            "Social post text",
        );

        let labels: Vec<&str> = buckets.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["RapidAI", "Wikipedia"]);
        assert_eq!(buckets[0].texts, vec!["Social post text"]);
    }

    #[test]
    fn test_blank_inputs_produce_no_buckets() {
        let buckets = group_sources(&["https://www.reddit.com/r/cats"], &["  \n "], "   ");
        assert!(buckets.is_empty());
    }

    #[test]
    fn test_zip_ignores_surplus_urls_and_texts() {
        let urls = ["https://www.reddit.com/a", "https://medium.com/b", "https://www.bbc.com/c"];
        let texts = ["reddit text"];
        let buckets = group_sources(&urls, &texts, "");
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].label, "Reddit");

        let urls = ["https://www.reddit.com/a"];
        let texts = ["reddit text", "orphan text"];
        let buckets = group_sources(&urls, &texts, "");
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].texts, vec!["reddit text"]);
    }

    #[test]
    fn test_same_bucket_keeps_insertion_order() {
        let urls = [
            "https://www.reddit.com/1",
            "https://en.wikipedia.org/wiki/A",
            "https://old.reddit.com/2",
        ];
        let texts = ["first", "wiki", "second"];
        let buckets = group_sources(&urls, &texts, "");

        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].label, "Reddit");
        assert_eq!(buckets[0].texts, vec!["first", "second"]);
        assert_eq!(buckets[0].combined_text(), "first\n\nsecond");
        assert_eq!(buckets[1].label, "Wikipedia");
    }
}
