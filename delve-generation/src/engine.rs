//! Generation engine
//!
//! Builds a fresh request for every call and sanitizes what the backend returns.

use crate::backend::GenerationBackend;
use crate::llama_cli::LlamaCliBackend;
use crate::sanitize::sanitize_output;
use crate::types::{GenerationRequest, GenerationResult};
use delve_core::{DelveResult, GenerationConfig};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Entry point for single generation calls
#[derive(Clone)]
pub struct GenerationEngine {
    backend: Arc<dyn GenerationBackend>,
    thread_count: u32,
    temperature: f32,
}

impl GenerationEngine {
    pub fn new(backend: Arc<dyn GenerationBackend>, thread_count: u32, temperature: f32) -> Self {
        Self {
            backend,
            thread_count: thread_count.max(1),
            temperature: temperature.max(0.0),
        }
    }

    /// Engine backed by a `llama-cli` subprocess
    pub fn from_config(config: &GenerationConfig) -> DelveResult<Self> {
        let backend = LlamaCliBackend::from_config(config)?;
        Ok(Self::new(
            Arc::new(backend),
            config.threads,
            config.temperature,
        ))
    }

    /// Generate at most `max_output_tokens` tokens for `prompt`.
    ///
    /// Never fails: backend problems come back as an unsuccessful result with
    /// empty text.
    pub async fn generate(
        &self,
        prompt: &str,
        max_output_tokens: u32,
        timeout: Duration,
    ) -> GenerationResult {
        let request = GenerationRequest {
            prompt: prompt.to_string(),
            max_output_tokens: max_output_tokens.max(1),
            thread_count: self.thread_count,
            temperature: self.temperature,
            timeout_seconds: timeout.as_secs().max(1),
        };

        debug!(
            max_output_tokens = request.max_output_tokens,
            timeout_seconds = request.timeout_seconds,
            prompt_chars = request.prompt.len(),
            "Requesting generation"
        );

        let result = self.backend.generate(&request).await;

        if !result.succeeded {
            warn!(
                failure = ?result.failure,
                backend = %self.backend.describe(),
                "Generation produced no text"
            );
            return GenerationResult {
                text: String::new(),
                ..result
            };
        }

        GenerationResult::success(sanitize_output(&result.text, &request.prompt))
    }

    pub fn backend(&self) -> &Arc<dyn GenerationBackend> {
        &self.backend
    }

    pub fn thread_count(&self) -> u32 {
        self.thread_count
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }
}

impl std::fmt::Debug for GenerationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationEngine")
            .field("backend", &self.backend.describe())
            .field("thread_count", &self.thread_count)
            .field("temperature", &self.temperature)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct RecordingBackend {
        reply: GenerationResult,
        seen: Mutex<Vec<GenerationRequest>>,
    }

    #[async_trait]
    impl GenerationBackend for RecordingBackend {
        async fn generate(&self, request: &GenerationRequest) -> GenerationResult {
            self.seen.lock().unwrap().push(request.clone());
            self.reply.clone()
        }
    }

    fn engine_with(reply: GenerationResult) -> (GenerationEngine, Arc<RecordingBackend>) {
        let backend = Arc::new(RecordingBackend {
            reply,
            seen: Mutex::new(Vec::new()),
        });
        (GenerationEngine::new(backend.clone(), 6, 0.7), backend)
    }

    #[tokio::test]
    async fn test_builds_request_from_engine_settings() {
        let (engine, backend) = engine_with(GenerationResult::success("ok"));

        engine.generate("prompt", 128, Duration::from_secs(30)).await;

        let seen = backend.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(
            seen[0],
            GenerationRequest {
                prompt: "prompt".to_string(),
                max_output_tokens: 128,
                thread_count: 6,
                temperature: 0.7,
                timeout_seconds: 30,
            }
        );
    }

    #[tokio::test]
    async fn test_sanitizes_successful_output() {
        let (engine, _) = engine_with(GenerationResult::success("[INST]Tell me[/INST] <b>Cats</b> purr."));

        let result = engine.generate("Tell me", 16, Duration::from_secs(5)).await;

        assert!(result.succeeded);
        assert_eq!(result.text, "Cats purr.");
    }

    #[tokio::test]
    async fn test_failure_is_represented_not_raised() {
        let (engine, _) = engine_with(GenerationResult::timed_out());

        let result = engine.generate("prompt", 16, Duration::from_secs(5)).await;

        assert!(!result.succeeded);
        assert!(result.text.is_empty());
        assert_eq!(result.failure, Some(crate::GenerationFailure::BackendTimeout));
    }
}
