//! Application state shared across all handlers
//!
//! Nothing here is per-request: conversions own their ids and paths, and the
//! only shared resource is the output directory on disk.

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::limits::{create_job_limiter, JobLimiter};
use crate::pipeline::Pipeline;

pub struct AppState {
    /// Server configuration
    pub config: ServerConfig,

    /// Conversion pipeline
    pub pipeline: Arc<Pipeline>,

    /// Caps conversions in flight
    pub jobs: JobLimiter,
}

impl AppState {
    /// Create state wired to the configured external tools
    pub fn new(config: ServerConfig) -> Self {
        let pipeline = Pipeline::from_config(&config);
        Self::with_pipeline(config, pipeline)
    }

    /// Create state around an already-built pipeline
    pub fn with_pipeline(config: ServerConfig, pipeline: Pipeline) -> Self {
        Self {
            jobs: create_job_limiter(&config),
            pipeline: Arc::new(pipeline),
            config,
        }
    }
}
