//! Job executor context handle.

use serde::{Deserialize, Serialize};

/// State a job-executor worker exposes while it runs jobs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobExecutorContext {
    /// The job currently being executed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_job: Option<String>,
    /// Jobs acquired by this worker and not yet executed.
    #[serde(default)]
    pub acquired_jobs: Vec<String>,
    /// Whether the worker is draining exclusive jobs of one process instance.
    #[serde(default)]
    pub executing_exclusive: bool,
}

impl JobExecutorContext {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the acquired jobs.
    #[must_use]
    pub fn with_acquired_jobs(mut self, jobs: Vec<String>) -> Self {
        self.acquired_jobs = jobs;
        self
    }

    /// Sets the current job.
    #[must_use]
    pub fn with_current_job(mut self, job_id: impl Into<String>) -> Self {
        self.current_job = Some(job_id.into());
        self
    }

    /// Marks the context as running exclusive jobs.
    #[must_use]
    pub fn exclusive(mut self) -> Self {
        self.executing_exclusive = true;
        self
    }

    /// Returns true if `job_id` was acquired by this worker.
    #[must_use]
    pub fn has_acquired(&self, job_id: &str) -> bool {
        self.acquired_jobs.iter().any(|id| id == job_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquired_jobs() {
        let ctx = JobExecutorContext::new()
            .with_acquired_jobs(vec!["j1".to_string(), "j2".to_string()])
            .with_current_job("j1");

        assert!(ctx.has_acquired("j2"));
        assert!(!ctx.has_acquired("j3"));
        assert_eq!(ctx.current_job.as_deref(), Some("j1"));
    }
}
