//! Configuration loading, environment overrides and validation

use crate::error::{DelveError, DelveResult};
use crate::logging::LoggingConfig;
use crate::types::{DelveConfig, GenerationConfig, PipelineConfig, SourcesConfig};

use std::path::{Path, PathBuf};
use tracing::debug;

impl Default for DelveConfig {
    fn default() -> Self {
        Self {
            generation: GenerationConfig::default(),
            pipeline: PipelineConfig::default(),
            sources: SourcesConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            llama_cli_path: "llama-cli".to_string(),
            model_path: "models/mistral-7b-instruct-v0.2.Q4_K_S.gguf".to_string(),
            threads: 6,
            temperature: 0.7,
            max_tokens: 256,
            timeout_seconds: 600,
            extra_args: Vec::new(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_sources: 5,
            section_token_budget: 400,
            chunk_size: 200,
            section_timeout_seconds: 600,
            draft_first: false,
        }
    }
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            user_agent: "delve/0.1".to_string(),
            fetch_timeout_seconds: 60,
            max_chars: 2000,
            retry_attempts: 3,
            retry_backoff_ms: 5000,
            scraper_api_key: None,
            rapidapi_key: None,
            rapidapi_host: "social-media-master.p.rapidapi.com".to_string(),
        }
    }
}

impl DelveConfig {
    /// Default location of the configuration file (`~/.delve/config.toml`)
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".delve").join("config.toml"))
    }

    /// Load configuration from an explicit path, the default path, or defaults,
    /// then apply environment overrides
    pub fn load(path: Option<&Path>) -> DelveResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path() {
                Some(default_path) if default_path.exists() => Self::from_file(&default_path)?,
                _ => {
                    debug!("No configuration file found, using defaults");
                    Self::default()
                }
            },
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> DelveResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| DelveError::Config {
            message: format!("Failed to read config file: {}", e),
            source: Some(Box::new(e)),
            context: crate::ErrorContext::new("config")
                .with_operation("read_file")
                .with_suggestion("Check if the config file exists and is readable"),
        })?;

        let config: DelveConfig = toml::from_str(&content).map_err(|e| DelveError::Config {
            message: format!("Failed to parse config: {}", e),
            source: Some(Box::new(e)),
            context: crate::ErrorContext::new("config")
                .with_operation("parse_toml")
                .with_suggestion("Check TOML syntax in config file"),
        })?;

        Ok(config)
    }

    /// Save configuration to a TOML file, creating parent directories
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> DelveResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| DelveError::Config {
            message: format!("Failed to serialize config: {}", e),
            source: Some(Box::new(e)),
            context: crate::ErrorContext::new("config").with_operation("serialize_toml"),
        })?;

        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        std::fs::write(path, content).map_err(|e| DelveError::Config {
            message: format!("Failed to write config file: {}", e),
            source: Some(Box::new(e)),
            context: crate::ErrorContext::new("config")
                .with_operation("write_file")
                .with_suggestion("Check if the directory exists and is writable"),
        })?;

        Ok(())
    }

    /// Override secrets and paths from the environment
    pub fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var("DELVE_LLAMA_CLI") {
            self.generation.llama_cli_path = path;
        }
        if let Ok(path) = std::env::var("DELVE_MODEL_PATH") {
            self.generation.model_path = path;
        }
        if let Ok(key) = std::env::var("RAPIDAPI_KEY") {
            self.sources.rapidapi_key = Some(key);
        }
        if let Ok(key) = std::env::var("SCRAPERAPI_KEY") {
            self.sources.scraper_api_key = Some(key);
        }
    }

    /// Check value ranges that serde cannot express
    pub fn validate(&self) -> DelveResult<()> {
        if self.generation.threads == 0 {
            return Err(invalid("generation.threads must be greater than 0"));
        }

        if self.generation.temperature < 0.0 {
            return Err(invalid("generation.temperature must not be negative"));
        }

        if self.generation.max_tokens == 0 {
            return Err(invalid("generation.max_tokens must be greater than 0"));
        }

        if self.generation.timeout_seconds == 0 || self.pipeline.section_timeout_seconds == 0 {
            return Err(invalid("Timeouts must be at least one second"));
        }

        if self.pipeline.chunk_size == 0 {
            return Err(invalid("pipeline.chunk_size must be greater than 0"));
        }

        if self.pipeline.max_sources == 0 {
            return Err(invalid("pipeline.max_sources must be greater than 0"));
        }

        if self.sources.max_chars == 0 {
            return Err(invalid("sources.max_chars must be greater than 0"));
        }

        Ok(())
    }
}

fn invalid(message: &str) -> DelveError {
    DelveError::Config {
        message: message.to_string(),
        source: None,
        context: crate::ErrorContext::new("config")
            .with_operation("validate")
            .with_suggestion("Fix the value in your configuration file"),
    }
}
