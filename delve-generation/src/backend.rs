//! Backend abstraction
//!
//! Anything that can turn one [`GenerationRequest`] into text: a local
//! subprocess, an in-process model or a remote inference service.

use crate::types::{GenerationRequest, GenerationResult};
use async_trait::async_trait;

#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Run one bounded generation call.
    ///
    /// Implementations must honor `request.timeout_seconds` and report every
    /// failure through [`GenerationResult`] instead of returning an error.
    async fn generate(&self, request: &GenerationRequest) -> GenerationResult;

    /// Short human-readable description used in logs and capability listings
    fn describe(&self) -> String {
        "generation backend".to_string()
    }
}
