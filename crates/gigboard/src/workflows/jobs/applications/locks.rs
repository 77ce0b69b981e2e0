use std::sync::{Arc, Mutex, PoisonError};

use dashmap::DashMap;

use crate::workflows::jobs::catalog::JobId;

/// Mutual-exclusion sections keyed by job.
///
/// Work for the same job runs one closure at a time; different jobs never contend beyond the
/// brief shard lock taken to look up the section.
#[derive(Debug, Default)]
pub struct JobLocks {
    sections: DashMap<JobId, Arc<Mutex<()>>>,
}

impl JobLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `critical` while holding the section for `job_id`.
    pub fn run<T>(&self, job_id: &JobId, critical: impl FnOnce() -> T) -> T {
        // Clone the handle out so the map shard is released before blocking.
        let section = Arc::clone(self.sections.entry(job_id.clone()).or_default().value());
        // The guarded value is `()`, so a panic elsewhere leaves nothing to repair.
        let _guard = section.lock().unwrap_or_else(PoisonError::into_inner);
        critical()
    }

    pub fn tracked_jobs(&self) -> usize {
        self.sections.len()
    }
}
