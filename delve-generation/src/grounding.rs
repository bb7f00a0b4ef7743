//! Fact-grounded summarization
//!
//! Wraps source text between fixed markers, instructs the backend to use only
//! facts that appear verbatim inside them, and removes any marker block the
//! backend echoes back.

use crate::chunking::ChunkController;
use regex::Regex;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::debug;

pub const SOURCE_START_MARKER: &str = "=== Source Text Start ===";
pub const SOURCE_END_MARKER: &str = "=== Source Text End ===";

/// Sentence the backend is told to emit when the source text is insufficient
pub const FALLBACK_SENTENCE: &str = "Not enough explicit information found.";

static MARKER_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?s){}.*?{}",
        regex::escape(SOURCE_START_MARKER),
        regex::escape(SOURCE_END_MARKER)
    ))
    .expect("valid marker block pattern")
});

#[derive(Debug, Clone)]
pub struct FactGroundedSummarizer {
    controller: ChunkController,
}

impl FactGroundedSummarizer {
    pub fn new(controller: ChunkController) -> Self {
        Self { controller }
    }

    pub fn controller(&self) -> &ChunkController {
        &self.controller
    }

    /// Summarize `source_text` for `topic_prompt` using only facts found in it.
    ///
    /// `prior_context` is an earlier free-form answer for the same query. It
    /// is not placed in the prompt: only the source block may supply facts.
    pub async fn summarize(
        &self,
        topic_prompt: &str,
        prior_context: &str,
        source_text: &str,
        max_total_tokens: i64,
        chunk_size: i64,
        timeout: Duration,
    ) -> String {
        debug!(
            source_chars = source_text.len(),
            prior_context_chars = prior_context.len(),
            "Building grounded prompt"
        );

        let prompt = build_grounded_prompt(topic_prompt, source_text);
        let merged = self
            .controller
            .iterate(&prompt, max_total_tokens, chunk_size, timeout)
            .await;

        strip_source_markers(&merged)
    }
}

/// Prompt with the source text fenced between the start and end markers
pub fn build_grounded_prompt(topic_prompt: &str, source_text: &str) -> String {
    format!(
        "{topic_prompt}\n\n\
         {SOURCE_START_MARKER}\n{source_text}\n{SOURCE_END_MARKER}\n\n\
         Write a concise, structured summary **using ONLY facts that appear verbatim in the Source Text**. \
         Do NOT invent, guess, or paraphrase unseen information. \
         If the Source Text lacks enough information, output exactly: \"{FALLBACK_SENTENCE}\""
    )
}

/// Remove echoed marker blocks, then any orphan marker, and trim
pub fn strip_source_markers(text: &str) -> String {
    let mut cleaned = MARKER_BLOCK.replace_all(text, "").into_owned();

    // Removing one marker can splice a new one together, so repeat until none is left
    while cleaned.contains(SOURCE_START_MARKER) || cleaned.contains(SOURCE_END_MARKER) {
        cleaned = cleaned
            .replace(SOURCE_START_MARKER, "")
            .replace(SOURCE_END_MARKER, "");
    }

    cleaned.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_layout() {
        let prompt = build_grounded_prompt("Summarize cats.", "Cats are mammals.");

        assert!(prompt.starts_with(
            "Summarize cats.\n\n=== Source Text Start ===\nCats are mammals.\n=== Source Text End ===\n\n"
        ));
        assert!(prompt.ends_with("output exactly: \"Not enough explicit information found.\""));
    }

    #[test]
    fn test_strips_multiline_block_non_greedy() {
        let text = format!(
            "A {s}\nx\ny\n{e} B {s} z {e} C",
            s = SOURCE_START_MARKER,
            e = SOURCE_END_MARKER
        );
        assert_eq!(strip_source_markers(&text), "A  B  C");
    }

    #[test]
    fn test_strips_orphan_markers() {
        let text = format!("{} facts only", SOURCE_START_MARKER);
        assert_eq!(strip_source_markers(&text), "facts only");

        let text = format!("facts {}", SOURCE_END_MARKER);
        assert_eq!(strip_source_markers(&text), "facts");
    }

    #[test]
    fn test_spliced_marker_is_removed() {
        let (head, tail) = SOURCE_END_MARKER.split_at(8);
        let text = format!("{}{}{}", head, SOURCE_START_MARKER, tail);
        let cleaned = strip_source_markers(&text);

        assert!(!cleaned.contains(SOURCE_START_MARKER));
        assert!(!cleaned.contains(SOURCE_END_MARKER));
    }
}
