//! Worker-slot limiting
//!
//! Every conversion blocks a thread for as long as the external tools run,
//! so the number of conversions in flight is capped. Requests over the cap
//! wait for a slot instead of being rejected.

use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::error::{Result, ServerError};

/// Counting limiter over pipeline runs
#[derive(Debug, Clone)]
pub struct JobLimiter {
    slots: Arc<Semaphore>,
    max_jobs: usize,
}

impl JobLimiter {
    pub fn new(max_jobs: usize) -> Self {
        let max_jobs = max_jobs.max(1);
        Self {
            slots: Arc::new(Semaphore::new(max_jobs)),
            max_jobs,
        }
    }

    /// Wait for a free slot. The slot is released when the permit drops.
    pub async fn acquire(&self) -> Result<OwnedSemaphorePermit> {
        self.slots
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| ServerError::Internal(format!("job limiter closed: {}", e)))
    }

    /// Take a slot only if one is free right now
    #[cfg(test)]
    pub fn try_acquire(&self) -> Option<OwnedSemaphorePermit> {
        self.slots.clone().try_acquire_owned().ok()
    }

    /// Conversions currently running
    pub fn in_use(&self) -> usize {
        self.max_jobs - self.slots.available_permits()
    }

    pub fn max_jobs(&self) -> usize {
        self.max_jobs
    }
}

/// Create the job limiter from config
pub fn create_job_limiter(config: &crate::config::ServerConfig) -> JobLimiter {
    JobLimiter::new(config.max_concurrent_jobs)
}
