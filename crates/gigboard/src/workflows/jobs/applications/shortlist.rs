use std::sync::Arc;

use tracing::info;

use super::domain::{Application, ApplicationId, ApplicationStatus};
use super::locks::JobLocks;
use super::repository::{ApplicationRepository, RepositoryError};
use crate::workflows::jobs::catalog::JobId;

/// Drives creator-side status transitions and enforces the per-job shortlist cap.
pub struct ShortlistManager<R> {
    repository: Arc<R>,
    locks: Arc<JobLocks>,
    limit: usize,
}

impl<R> ShortlistManager<R>
where
    R: ApplicationRepository,
{
    pub fn new(repository: Arc<R>, locks: Arc<JobLocks>, limit: usize) -> Self {
        Self {
            repository,
            locks,
            limit,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Move a `submitted` application onto the shortlist if a slot is free.
    pub fn shortlist(&self, id: &ApplicationId) -> Result<Application, ShortlistError> {
        let job_id = self.job_of(id)?;
        self.locks.run(&job_id, || {
            let current = self.current(id)?;
            ensure_transition(current.status, ApplicationStatus::Shortlisted)?;

            let shortlisted = self.count_shortlisted(&job_id)?;
            if shortlisted >= self.limit {
                return Err(ShortlistError::ShortlistFull { limit: self.limit });
            }

            let updated = self
                .repository
                .update_status(id, ApplicationStatus::Shortlisted)
                .map_err(not_found_or_storage)?;
            info!(
                job_id = %job_id,
                application_id = %id,
                shortlisted = shortlisted + 1,
                "application shortlisted"
            );
            Ok(updated)
        })
    }

    /// Reject a `submitted` or `shortlisted` application. Rejection frees a shortlist slot.
    pub fn reject(&self, id: &ApplicationId) -> Result<Application, ShortlistError> {
        let job_id = self.job_of(id)?;
        self.locks.run(&job_id, || {
            let current = self.current(id)?;
            ensure_transition(current.status, ApplicationStatus::Rejected)?;

            let updated = self
                .repository
                .update_status(id, ApplicationStatus::Rejected)
                .map_err(not_found_or_storage)?;
            info!(
                job_id = %job_id,
                application_id = %id,
                previous = current.status.label(),
                "application rejected"
            );
            Ok(updated)
        })
    }

    /// Live count of shortlisted applications for `job_id`.
    pub fn shortlisted_count(&self, job_id: &JobId) -> Result<usize, RepositoryError> {
        self.count_shortlisted(job_id)
    }

    fn count_shortlisted(&self, job_id: &JobId) -> Result<usize, RepositoryError> {
        Ok(self
            .repository
            .for_job(job_id)?
            .iter()
            .filter(|application| application.status == ApplicationStatus::Shortlisted)
            .count())
    }

    fn job_of(&self, id: &ApplicationId) -> Result<JobId, ShortlistError> {
        Ok(self.current(id)?.job_id)
    }

    fn current(&self, id: &ApplicationId) -> Result<Application, ShortlistError> {
        self.repository
            .fetch(id)?
            .ok_or(ShortlistError::NotFound)
    }
}

fn ensure_transition(from: ApplicationStatus, to: ApplicationStatus) -> Result<(), ShortlistError> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(ShortlistError::InvalidTransition { from, to })
    }
}

fn not_found_or_storage(err: RepositoryError) -> ShortlistError {
    match err {
        RepositoryError::NotFound => ShortlistError::NotFound,
        other => ShortlistError::Repository(other),
    }
}

/// Reasons a shortlist or reject action can fail.
#[derive(Debug, thiserror::Error)]
pub enum ShortlistError {
    #[error("application not found")]
    NotFound,
    #[error("cannot move application from {} to {}", .from.label(), .to.label())]
    InvalidTransition {
        from: ApplicationStatus,
        to: ApplicationStatus,
    },
    #[error("shortlist is full ({limit} applications already shortlisted)")]
    ShortlistFull { limit: usize },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl ShortlistError {
    /// Stable code for business-rule refusals; `None` for storage failures.
    pub const fn policy_code(&self) -> Option<&'static str> {
        match self {
            ShortlistError::NotFound => Some("not_found"),
            ShortlistError::InvalidTransition { .. } => Some("invalid_transition"),
            ShortlistError::ShortlistFull { .. } => Some("shortlist_full"),
            ShortlistError::Repository(_) => None,
        }
    }
}
