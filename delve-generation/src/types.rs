//! Type definitions for backend calls

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Parameters of a single backend invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub prompt: String,
    /// Upper bound on generated tokens (at least 1)
    pub max_output_tokens: u32,
    /// CPU threads given to the backend (at least 1)
    pub thread_count: u32,
    pub temperature: f32,
    /// Wall-clock limit for the call (at least 1)
    pub timeout_seconds: u64,
}

impl GenerationRequest {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Why a backend call produced no text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum GenerationFailure {
    /// The process could not be started or exited with a non-zero status
    #[error("backend unavailable")]
    BackendUnavailable,
    /// The call exceeded its timeout and was terminated
    #[error("backend timed out")]
    BackendTimeout,
}

/// Outcome of a backend invocation.
///
/// Failures are represented here, never raised: a failed call has
/// `succeeded == false` and empty `text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub text: String,
    pub succeeded: bool,
    pub failure: Option<GenerationFailure>,
}

impl GenerationResult {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            succeeded: true,
            failure: None,
        }
    }

    pub fn failed(failure: GenerationFailure) -> Self {
        Self {
            text: String::new(),
            succeeded: false,
            failure: Some(failure),
        }
    }

    pub fn unavailable() -> Self {
        Self::failed(GenerationFailure::BackendUnavailable)
    }

    pub fn timed_out() -> Self {
        Self::failed(GenerationFailure::BackendTimeout)
    }
}
