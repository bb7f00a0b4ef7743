//! Concrete source collaborators
//!
//! Each type implements one of the collaborator traits from `delve-core`.
//! The pipeline only sees the traits, so any of them can be swapped for a
//! different provider or an in-process mock.

pub mod page_fetcher;
pub mod social;
pub mod url_generator;

pub use page_fetcher::{extract_page_text, HttpPageFetcher};
pub use social::{parse_post_pairs, PostPair, RapidApiSocialLookup};
pub use url_generator::{search_urls, SearchUrlGenerator};
