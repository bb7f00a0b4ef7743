//! Delve Generation - local text generation for the research pipeline
//!
//! Layers, leaves first:
//!
//! - [`GenerationBackend`]: one bounded generation call. [`LlamaCliBackend`]
//!   runs llama.cpp's `llama-cli` as a short-lived subprocess per call.
//! - [`GenerationEngine`]: builds a fresh [`GenerationRequest`] per call and
//!   sanitizes successful output.
//! - [`ChunkController`]: assembles a long answer from bounded chunks under a
//!   total token budget.
//! - [`FactGroundedSummarizer`]: wraps source text in delimiters and asks for
//!   a summary made only of facts that appear in it.

pub mod backend;
pub mod chunking;
pub mod engine;
pub mod grounding;
pub mod llama_cli;
pub mod sanitize;
pub mod types;

pub use backend::GenerationBackend;
pub use chunking::{ChunkController, ChunkSession};
pub use engine::GenerationEngine;
pub use grounding::{
    build_grounded_prompt, strip_source_markers, FactGroundedSummarizer, FALLBACK_SENTENCE,
    SOURCE_END_MARKER, SOURCE_START_MARKER,
};
pub use llama_cli::LlamaCliBackend;
pub use sanitize::sanitize_output;
pub use types::{GenerationFailure, GenerationRequest, GenerationResult};
