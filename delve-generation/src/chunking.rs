//! Chunked iterative generation
//!
//! Builds a long answer out of bounded backend calls. Each chunk is appended
//! to the running prompt so the backend continues from its own output.
//!
//! Budget accounting is conservative: every call consumes the number of
//! tokens it *requested*, whatever it actually produced. An empty chunk is a
//! stall and ends the session at once; it is never retried, so a transient
//! backend failure looks the same as a model with nothing more to say.

use crate::engine::GenerationEngine;
use std::time::Duration;
use tracing::{debug, info};

/// Mutable state of one `iterate` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkSession {
    pub remaining_tokens: i64,
    pub accumulated_text: String,
    pub running_prompt: String,
    /// Number of non-empty chunks appended
    pub chunks: usize,
    /// Whether the session ended on an empty chunk rather than an exhausted budget
    pub stalled: bool,
}

impl ChunkSession {
    fn new(prompt: &str, max_total_tokens: i64) -> Self {
        Self {
            remaining_tokens: max_total_tokens,
            accumulated_text: String::new(),
            running_prompt: prompt.to_string(),
            chunks: 0,
            stalled: false,
        }
    }

    /// Final merged text, trimmed
    pub fn into_text(self) -> String {
        self.accumulated_text.trim().to_string()
    }
}

/// Drives repeated generation calls under a total token budget
#[derive(Debug, Clone)]
pub struct ChunkController {
    engine: GenerationEngine,
}

impl ChunkController {
    pub fn new(engine: GenerationEngine) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &GenerationEngine {
        &self.engine
    }

    /// Generate up to `max_total_tokens` tokens in chunks of `chunk_size`.
    ///
    /// A non-positive budget or chunk size makes no backend calls and yields
    /// an empty string.
    pub async fn iterate(
        &self,
        prompt: &str,
        max_total_tokens: i64,
        chunk_size: i64,
        timeout: Duration,
    ) -> String {
        self.run_session(prompt, max_total_tokens, chunk_size, timeout)
            .await
            .into_text()
    }

    /// Same as [`iterate`](Self::iterate) but returns the whole session
    pub async fn run_session(
        &self,
        prompt: &str,
        max_total_tokens: i64,
        chunk_size: i64,
        timeout: Duration,
    ) -> ChunkSession {
        let mut session = ChunkSession::new(prompt, max_total_tokens);

        if chunk_size <= 0 {
            debug!(chunk_size, "Non-positive chunk size, skipping generation");
            return session;
        }

        while session.remaining_tokens > 0 {
            let requested = chunk_size.min(session.remaining_tokens);
            let max_output_tokens = u32::try_from(requested).unwrap_or(u32::MAX);

            let result = self
                .engine
                .generate(&session.running_prompt, max_output_tokens, timeout)
                .await;

            if result.text.trim().is_empty() {
                debug!(
                    chunks = session.chunks,
                    remaining_tokens = session.remaining_tokens,
                    "Backend stalled, stopping"
                );
                session.stalled = true;
                break;
            }

            session.accumulated_text.push_str(&result.text);
            session.running_prompt.push_str(&result.text);
            session.remaining_tokens -= requested;
            session.chunks += 1;

            debug!(
                chunk = session.chunks,
                requested,
                remaining_tokens = session.remaining_tokens,
                "Chunk appended"
            );
        }

        info!(
            chunks = session.chunks,
            stalled = session.stalled,
            output_chars = session.accumulated_text.len(),
            "Chunked generation finished"
        );

        session
    }
}
