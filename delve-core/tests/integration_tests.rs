//! Integration tests for delve-core infrastructure

use delve_core::{
    collaborator_error, config_error, init_logging, retry_async, validation_error, DelveConfig,
    DelveError, ErrorContext, LoggingConfig, RetryConfig,
};
use futures::FutureExt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[tokio::test]
async fn test_error_handling() {
    let error = collaborator_error!("Lookup service unreachable", "social_lookup");

    match &error {
        DelveError::Collaborator {
            collaborator,
            message,
            context,
            ..
        } => {
            assert_eq!(collaborator, "social_lookup");
            assert_eq!(message, "Lookup service unreachable");
            assert_eq!(context.component, "social_lookup");
            assert!(!context.error_id.is_empty());
        }
        _ => panic!("Expected Collaborator error"),
    }

    // Should not panic
    error.log();
    assert!(error.is_recoverable());

    let network_error = DelveError::Network {
        message: "Connection failed".to_string(),
        source: None,
        context: ErrorContext::new("test"),
    };
    assert!(network_error.is_recoverable());
    assert!(network_error.retry_delay_ms().is_some());

    let config_error = config_error!("Invalid config", "test");
    assert!(!config_error.is_recoverable());
    assert!(config_error.retry_delay_ms().is_none());
}

#[tokio::test]
async fn test_logging_initialization() {
    let config = LoggingConfig {
        filter_directives: vec!["delve_core=debug".to_string()],
        ..LoggingConfig::default()
    };

    // The global subscriber can only be installed once per process, so a
    // second call must report an error instead of panicking.
    let _ = init_logging(&config);
    assert!(init_logging(&config).is_err());
}

#[test]
fn test_verbose_logging_raises_delve_targets() {
    let config = LoggingConfig {
        filter_directives: vec![
            "delve_research=info".to_string(),
            "hyper=warn".to_string(),
        ],
        ..LoggingConfig::default()
    }
    .verbose();

    assert_eq!(config.level, "debug");
    assert_eq!(
        config.filter_directives,
        vec!["delve_research=debug".to_string(), "hyper=warn".to_string()]
    );
}

#[tokio::test]
async fn test_retry_mechanism() {
    let attempt_count = Arc::new(AtomicUsize::new(0));

    let operation = {
        let attempt_count = Arc::clone(&attempt_count);
        move || {
            let count = attempt_count.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if count < 3 {
                    Err(std::io::Error::new(
                        std::io::ErrorKind::Other,
                        "Temporary failure",
                    ))
                } else {
                    Ok("Success")
                }
            }
            .boxed()
        }
    };

    let config = RetryConfig {
        max_attempts: 5,
        initial_delay_ms: 10,
        max_delay_ms: 100,
        backoff_multiplier: 2.0,
        jitter: false,
    };

    let result = retry_async(operation, config, "test_operation").await;
    assert_eq!(result.unwrap(), "Success");
    assert_eq!(attempt_count.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_retry_gives_up_after_max_attempts() {
    let attempt_count = Arc::new(AtomicUsize::new(0));

    let operation = {
        let attempt_count = Arc::clone(&attempt_count);
        move || {
            attempt_count.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(std::io::Error::new(std::io::ErrorKind::Other, "down")) }.boxed()
        }
    };

    let result = retry_async(operation, RetryConfig::fixed(3, 1), "always_fails").await;
    assert!(result.is_err());
    assert_eq!(attempt_count.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_config_validation() {
    let mut config = DelveConfig::default();
    assert!(config.validate().is_ok());

    config.generation.threads = 0;
    match config.validate().unwrap_err() {
        DelveError::Config { message, .. } => {
            assert!(message.contains("threads"));
        }
        _ => panic!("Expected Config error"),
    }
}

#[test]
fn test_config_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let mut config = DelveConfig::default();
    config.generation.llama_cli_path = "/opt/llama/bin/llama-cli".to_string();
    config.pipeline.draft_first = true;
    config.save_to_file(&path).unwrap();

    let loaded = DelveConfig::from_file(&path).unwrap();
    assert_eq!(loaded.generation.llama_cli_path, "/opt/llama/bin/llama-cli");
    assert!(loaded.pipeline.draft_first);
    assert_eq!(loaded.sources.rapidapi_host, config.sources.rapidapi_host);
}

#[test]
fn test_invalid_toml_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[generation\nthreads = ").unwrap();

    match DelveConfig::from_file(&path) {
        Err(DelveError::Config { context, .. }) => {
            assert_eq!(context.operation.as_deref(), Some("parse_toml"));
        }
        other => panic!("Expected Config error, got {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn test_error_macros() {
    let validation_err = validation_error!("Invalid date", "start_date", "pipeline");
    match validation_err {
        DelveError::Validation {
            message,
            field,
            context,
        } => {
            assert_eq!(message, "Invalid date");
            assert_eq!(field, Some("start_date".to_string()));
            assert_eq!(context.component, "pipeline");
            assert!(!context.recovery_suggestions.is_empty());
        }
        _ => panic!("Expected Validation error"),
    }

    let config_err = config_error!("Missing model", "config_loader");
    match config_err {
        DelveError::Config { context, .. } => {
            assert_eq!(context.component, "config_loader");
            assert_eq!(context.recovery_suggestions.len(), 2);
        }
        _ => panic!("Expected Config error"),
    }
}

#[tokio::test]
async fn test_measure_async_returns_inner_output() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = attempts.clone();

    let value = delve_core::performance::measure_async("measured", async move {
        counter.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        "done"
    })
    .await;

    assert_eq!(value, "done");
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
}
