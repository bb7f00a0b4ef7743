//! llama.cpp `llama-cli` subprocess backend
//!
//! Every call spawns its own process; nothing is pooled or shared between calls.

use crate::backend::GenerationBackend;
use crate::types::{GenerationRequest, GenerationResult};
use async_trait::async_trait;
use delve_core::{DelveError, DelveResult, ErrorContext, GenerationConfig};
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Instant;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Runs `llama-cli` once per generation call
#[derive(Debug, Clone)]
pub struct LlamaCliBackend {
    binary: PathBuf,
    model: PathBuf,
    extra_args: Vec<String>,
}

impl LlamaCliBackend {
    pub fn new(binary: impl Into<PathBuf>, model: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            model: model.into(),
            extra_args: Vec::new(),
        }
    }

    pub fn with_extra_args(mut self, extra_args: Vec<String>) -> Self {
        self.extra_args = extra_args;
        self
    }

    pub fn from_config(config: &GenerationConfig) -> DelveResult<Self> {
        if config.llama_cli_path.trim().is_empty() {
            return Err(DelveError::Backend {
                message: "llama_cli_path is empty".to_string(),
                backend: Some("llama-cli".to_string()),
                context: ErrorContext::new("llama_cli")
                    .with_operation("from_config")
                    .with_suggestion("Set generation.llama_cli_path or DELVE_LLAMA_CLI"),
            });
        }

        if config.model_path.trim().is_empty() {
            return Err(DelveError::Backend {
                message: "model_path is empty".to_string(),
                backend: Some("llama-cli".to_string()),
                context: ErrorContext::new("llama_cli")
                    .with_operation("from_config")
                    .with_suggestion("Set generation.model_path or DELVE_MODEL_PATH"),
            });
        }

        Ok(Self::new(&config.llama_cli_path, &config.model_path)
            .with_extra_args(config.extra_args.clone()))
    }

    /// Argument vector passed to the binary for `request`
    pub fn command_args(&self, request: &GenerationRequest) -> Vec<String> {
        let mut args = vec![
            "-m".to_string(),
            self.model.to_string_lossy().into_owned(),
            "-no-cnv".to_string(),
            "-p".to_string(),
            request.prompt.clone(),
            "-n".to_string(),
            request.max_output_tokens.to_string(),
            "-t".to_string(),
            request.thread_count.to_string(),
            "--temp".to_string(),
            request.temperature.to_string(),
            "--simple-io".to_string(),
            "--no-mmap".to_string(),
        ];
        args.extend(self.extra_args.iter().cloned());
        args
    }
}

#[async_trait]
impl GenerationBackend for LlamaCliBackend {
    async fn generate(&self, request: &GenerationRequest) -> GenerationResult {
        let started = Instant::now();

        let mut command = Command::new(&self.binary);
        command
            .args(self.command_args(request))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        debug!(
            binary = %self.binary.display(),
            max_output_tokens = request.max_output_tokens,
            threads = request.thread_count,
            "Spawning llama-cli"
        );

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(e) => {
                warn!(binary = %self.binary.display(), error = %e, "Failed to start llama-cli");
                return GenerationResult::unavailable();
            }
        };

        // Drain both pipes concurrently so a chatty backend cannot block on a full pipe
        let stdout_task = tokio::spawn(drain(child.stdout.take()));
        let stderr_task = tokio::spawn(drain(child.stderr.take()));

        let status = match tokio::time::timeout(request.timeout(), child.wait()).await {
            Ok(Ok(status)) => status,
            Ok(Err(e)) => {
                warn!(error = %e, "Failed to wait for llama-cli");
                stdout_task.abort();
                stderr_task.abort();
                return GenerationResult::unavailable();
            }
            Err(_) => {
                if let Err(e) = child.kill().await {
                    warn!(error = %e, "Failed to kill timed-out llama-cli");
                }
                stdout_task.abort();
                stderr_task.abort();
                warn!(
                    timeout_seconds = request.timeout_seconds,
                    "Generation timed out"
                );
                return GenerationResult::timed_out();
            }
        };

        let stdout = stdout_task.await.unwrap_or_default();
        let stderr = stderr_task.await.unwrap_or_default();

        if !status.success() {
            warn!(
                status = %status,
                stderr = %stderr.trim(),
                "llama-cli exited with an error"
            );
            return GenerationResult::unavailable();
        }

        info!(
            elapsed_ms = started.elapsed().as_millis(),
            output_chars = stdout.len(),
            "llama-cli generation finished"
        );

        GenerationResult::success(stdout)
    }

    fn describe(&self) -> String {
        format!(
            "llama-cli ({}) with model {}",
            self.binary.display(),
            self.model.display()
        )
    }
}

async fn drain<R>(pipe: Option<R>) -> String
where
    R: AsyncRead + Unpin,
{
    let mut buffer = Vec::new();
    if let Some(mut pipe) = pipe {
        if let Err(e) = pipe.read_to_end(&mut buffer).await {
            debug!(error = %e, "Failed to read llama-cli output");
        }
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(prompt: &str) -> GenerationRequest {
        GenerationRequest {
            prompt: prompt.to_string(),
            max_output_tokens: 200,
            thread_count: 6,
            temperature: 0.7,
            timeout_seconds: 600,
        }
    }

    #[test]
    fn test_command_args_layout() {
        let backend = LlamaCliBackend::new("llama-cli", "model.gguf");
        let args = backend.command_args(&request("What is Rust?"));

        assert_eq!(
            args,
            vec![
                "-m",
                "model.gguf",
                "-no-cnv",
                "-p",
                "What is Rust?",
                "-n",
                "200",
                "-t",
                "6",
                "--temp",
                "0.7",
                "--simple-io",
                "--no-mmap",
            ]
        );
    }

    #[test]
    fn test_extra_args_are_appended() {
        let backend = LlamaCliBackend::new("llama-cli", "model.gguf")
            .with_extra_args(vec!["--ctx-size".to_string(), "4096".to_string()]);
        let args = backend.command_args(&request("p"));

        assert_eq!(&args[args.len() - 2..], ["--ctx-size", "4096"]);
    }

    #[test]
    fn test_from_config_rejects_empty_paths() {
        let config = GenerationConfig {
            model_path: "  ".to_string(),
            ..GenerationConfig::default()
        };

        assert!(matches!(
            LlamaCliBackend::from_config(&config),
            Err(DelveError::Backend { .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_binary_is_unavailable() {
        let backend = LlamaCliBackend::new("/nonexistent/delve/llama-cli", "model.gguf");
        let result = backend.generate(&request("p")).await;

        assert!(!result.succeeded);
        assert_eq!(
            result.failure,
            Some(crate::GenerationFailure::BackendUnavailable)
        );
    }
}
