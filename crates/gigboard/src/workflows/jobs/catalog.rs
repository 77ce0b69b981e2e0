//! Read-only view over the marketplace's job postings.
//!
//! The engine only ever reads job capacity, deadline, and status from here. The in-memory
//! catalog backs the API binary and tests; a real deployment would wire the job store of the
//! surrounding marketplace instead.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::config::MarketplaceConfig;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub String);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Open,
    Closed,
}

impl JobStatus {
    pub const fn label(self) -> &'static str {
        match self {
            JobStatus::Open => "open",
            JobStatus::Closed => "closed",
        }
    }
}

/// Admission-relevant fields of a job, read at call time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSnapshot {
    pub id: JobId,
    pub max_applications: u32,
    pub application_deadline_hours: u32,
    pub created_at: DateTime<Utc>,
    pub status: JobStatus,
}

impl JobSnapshot {
    /// Open job using the marketplace defaults for capacity and deadline.
    pub fn open(id: JobId, created_at: DateTime<Utc>, config: &MarketplaceConfig) -> Self {
        Self {
            id,
            max_applications: config.default_max_applications,
            application_deadline_hours: config.default_deadline_hours,
            created_at,
            status: JobStatus::Open,
        }
    }

    /// End of the bidding window. A window past chrono's range never closes.
    pub fn deadline(&self) -> DateTime<Utc> {
        Duration::try_hours(i64::from(self.application_deadline_hours))
            .and_then(|window| self.created_at.checked_add_signed(window))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.deadline()
    }

    /// Status and deadline check only; capacity needs the application set.
    pub fn accepts_at(&self, now: DateTime<Utc>) -> bool {
        self.status == JobStatus::Open && !self.is_expired_at(now)
    }
}

/// Source of job snapshots for the admission controller.
pub trait JobCatalog: Send + Sync {
    fn job(&self, id: &JobId) -> Result<Option<JobSnapshot>, CatalogError>;
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("job {0} is already registered")]
    AlreadyRegistered(JobId),
    #[error("job catalog unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Default)]
pub struct InMemoryJobCatalog {
    jobs: RwLock<HashMap<JobId, JobSnapshot>>,
}

impl InMemoryJobCatalog {
    /// Add a job posting. Existing postings are never replaced, so a closed job stays closed.
    pub fn register(&self, job: JobSnapshot) -> Result<(), CatalogError> {
        let mut guard = self
            .jobs
            .write()
            .map_err(|_| CatalogError::Unavailable("catalog lock poisoned".to_string()))?;
        match guard.entry(job.id.clone()) {
            Entry::Occupied(_) => Err(CatalogError::AlreadyRegistered(job.id)),
            Entry::Vacant(slot) => {
                slot.insert(job);
                Ok(())
            }
        }
    }

    /// Mark a job closed. Returns `false` when the job is unknown.
    pub fn close(&self, id: &JobId) -> Result<bool, CatalogError> {
        let mut guard = self
            .jobs
            .write()
            .map_err(|_| CatalogError::Unavailable("catalog lock poisoned".to_string()))?;
        match guard.get_mut(id) {
            Some(job) => {
                job.status = JobStatus::Closed;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

impl JobCatalog for InMemoryJobCatalog {
    fn job(&self, id: &JobId) -> Result<Option<JobSnapshot>, CatalogError> {
        let guard = self
            .jobs
            .read()
            .map_err(|_| CatalogError::Unavailable("catalog lock poisoned".to_string()))?;
        Ok(guard.get(id).cloned())
    }
}
