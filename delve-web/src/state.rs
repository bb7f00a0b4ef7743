//! Application state shared by all handlers

use crate::{WebConfig, WebResult};
use delve_core::DelveConfig;
use delve_research::ResearchPipeline;
use std::sync::Arc;
use tracing::info;

/// Immutable per-process state; each request builds its own pipeline session
#[derive(Clone)]
pub struct AppState {
    /// Web configuration
    pub config: WebConfig,
    /// Pipeline and collaborator settings
    pub settings: Arc<DelveConfig>,
    /// Research pipeline shared across requests
    pub pipeline: Arc<ResearchPipeline>,
}

impl AppState {
    /// Build the state with the llama-cli backend and HTTP collaborators
    pub fn new(config: WebConfig, settings: DelveConfig) -> WebResult<Self> {
        settings.validate()?;
        let pipeline = ResearchPipeline::from_config(&settings)?;

        info!(
            backend = %pipeline.engine().backend().describe(),
            social_lookup = pipeline.has_social_lookup(),
            "Research pipeline initialized"
        );

        Ok(Self::with_pipeline(config, settings, pipeline))
    }

    /// State around an already assembled pipeline
    pub fn with_pipeline(config: WebConfig, settings: DelveConfig, pipeline: ResearchPipeline) -> Self {
        Self {
            config,
            settings: Arc::new(settings),
            pipeline: Arc::new(pipeline),
        }
    }
}
