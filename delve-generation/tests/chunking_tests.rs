//! Chunked generation and grounded summarization against scripted backends

use async_trait::async_trait;
use delve_generation::{
    ChunkController, FactGroundedSummarizer, GenerationBackend, GenerationEngine,
    GenerationRequest, GenerationResult, SOURCE_END_MARKER, SOURCE_START_MARKER,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Replays queued replies, then repeats `fallback` forever
struct ScriptedBackend {
    replies: Mutex<VecDeque<GenerationResult>>,
    fallback: GenerationResult,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedBackend {
    fn new(replies: Vec<GenerationResult>, fallback: GenerationResult) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            fallback,
            requests: Mutex::new(Vec::new()),
        })
    }

    fn always(reply: &str) -> Arc<Self> {
        Self::new(Vec::new(), GenerationResult::success(reply))
    }

    fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerationBackend for ScriptedBackend {
    async fn generate(&self, request: &GenerationRequest) -> GenerationResult {
        self.requests.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone())
    }
}

fn controller(backend: Arc<ScriptedBackend>) -> ChunkController {
    ChunkController::new(GenerationEngine::new(backend, 4, 0.7))
}

const TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::test]
async fn test_zero_budget_makes_no_calls() {
    let backend = ScriptedBackend::always("text");
    let output = controller(backend.clone())
        .iterate("prompt", 0, 200, TIMEOUT)
        .await;

    assert_eq!(output, "");
    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn test_non_positive_chunk_size_makes_no_calls() {
    let backend = ScriptedBackend::always("text");
    let output = controller(backend.clone())
        .iterate("prompt", 400, 0, TIMEOUT)
        .await;

    assert_eq!(output, "");
    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn test_fixed_chunks_use_ceil_of_budget_over_chunk_size() {
    let backend = ScriptedBackend::always("x");
    let output = controller(backend.clone())
        .iterate("prompt", 1000, 200, TIMEOUT)
        .await;

    assert_eq!(output, "xxxxx");
    let requests = backend.requests();
    assert_eq!(requests.len(), 5);
    assert!(requests.iter().all(|r| r.max_output_tokens == 200));
}

#[tokio::test]
async fn test_last_chunk_requests_only_the_remainder() {
    let backend = ScriptedBackend::always("x");
    controller(backend.clone())
        .iterate("prompt", 450, 200, TIMEOUT)
        .await;

    let sizes: Vec<u32> = backend
        .requests()
        .iter()
        .map(|r| r.max_output_tokens)
        .collect();
    assert_eq!(sizes, vec![200, 200, 50]);
}

#[tokio::test]
async fn test_budget_is_charged_by_request_not_output() {
    // One-word chunks still consume the whole requested chunk
    let backend = ScriptedBackend::always("word");
    let session = controller(backend.clone())
        .run_session("prompt", 400, 200, TIMEOUT)
        .await;

    assert_eq!(session.chunks, 2);
    assert_eq!(session.remaining_tokens, 0);
    assert!(!session.stalled);
    assert_eq!(backend.requests().len(), 2);
}

#[tokio::test]
async fn test_stall_on_first_chunk_returns_empty() {
    let backend = ScriptedBackend::always("   ");
    let session = controller(backend.clone())
        .run_session("prompt", 1000, 200, TIMEOUT)
        .await;

    assert!(session.stalled);
    assert_eq!(session.chunks, 0);
    assert_eq!(session.into_text(), "");
    assert_eq!(backend.requests().len(), 1);
}

#[tokio::test]
async fn test_stall_keeps_earlier_chunks_and_is_not_retried() {
    let backend = ScriptedBackend::new(
        vec![
            GenerationResult::success("First part."),
            GenerationResult::success(" Second part."),
        ],
        GenerationResult::success(""),
    );
    let output = controller(backend.clone())
        .iterate("prompt", 1000, 200, TIMEOUT)
        .await;

    assert_eq!(output, "First part.Second part.");
    assert_eq!(backend.requests().len(), 3);
}

#[tokio::test]
async fn test_backend_failure_counts_as_stall() {
    let backend = ScriptedBackend::new(
        vec![GenerationResult::success("Only chunk.")],
        GenerationResult::timed_out(),
    );
    let session = controller(backend.clone())
        .run_session("prompt", 1000, 200, TIMEOUT)
        .await;

    assert!(session.stalled);
    assert_eq!(session.chunks, 1);
    assert_eq!(session.into_text(), "Only chunk.");
}

#[tokio::test]
async fn test_running_prompt_grows_with_each_chunk() {
    let backend = ScriptedBackend::new(
        vec![
            GenerationResult::success("alpha"),
            GenerationResult::success("beta"),
        ],
        GenerationResult::success(""),
    );
    controller(backend.clone())
        .iterate("Start:", 1000, 100, TIMEOUT)
        .await;

    let prompts: Vec<String> = backend.requests().into_iter().map(|r| r.prompt).collect();
    assert_eq!(prompts, vec!["Start:", "Start:alpha", "Start:alphabeta"]);
}

#[tokio::test]
async fn test_summarizer_strips_echoed_markers() {
    let echoed = format!(
        "{}\nCats are mammals.\n{}\nCats are mammals.",
        SOURCE_START_MARKER, SOURCE_END_MARKER
    );
    let backend = ScriptedBackend::new(
        vec![GenerationResult::success(echoed)],
        GenerationResult::success(""),
    );
    let summarizer = FactGroundedSummarizer::new(controller(backend));

    let summary = summarizer
        .summarize("Summarize cats.", "", "Cats are mammals.", 400, 200, TIMEOUT)
        .await;

    assert_eq!(summary, "Cats are mammals.");
    assert!(!summary.contains(SOURCE_START_MARKER));
    assert!(!summary.contains(SOURCE_END_MARKER));
}

#[tokio::test]
async fn test_summarizer_fences_source_and_leaves_out_prior_context() {
    let backend = ScriptedBackend::new(
        vec![GenerationResult::success("Fact.")],
        GenerationResult::success(""),
    );
    let summarizer = FactGroundedSummarizer::new(controller(backend.clone()));

    summarizer
        .summarize(
            "Summarize cats.",
            "An earlier unverified draft.",
            "Cats are mammals.",
            400,
            200,
            TIMEOUT,
        )
        .await;

    let first = &backend.requests()[0];
    let fenced = format!(
        "{}\nCats are mammals.\n{}",
        SOURCE_START_MARKER, SOURCE_END_MARKER
    );
    assert!(first.prompt.starts_with("Summarize cats."));
    assert!(first.prompt.contains(&fenced));
    assert!(!first.prompt.contains("An earlier unverified draft."));
}

#[tokio::test]
async fn test_summarizer_stall_yields_empty_summary() {
    let backend = ScriptedBackend::always("");
    let summarizer = FactGroundedSummarizer::new(controller(backend));

    let summary = summarizer
        .summarize("Summarize.", "", "text", 400, 200, TIMEOUT)
        .await;

    assert_eq!(summary, "");
}
