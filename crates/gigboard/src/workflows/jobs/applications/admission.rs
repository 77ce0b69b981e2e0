use std::sync::Arc;

use tracing::{info, warn};

use super::clock::Clock;
use super::domain::{ApplicantId, Application, ApplicationId, ApplicationStatus, Bid};
use super::locks::JobLocks;
use super::repository::{ApplicationRepository, RepositoryError};
use crate::workflows::jobs::catalog::{JobSnapshot, JobStatus};

/// Gatekeeper for new applications: duplicate, status, deadline, and capacity checks followed
/// by the append, all inside the job's section.
pub struct AdmissionController<R> {
    repository: Arc<R>,
    locks: Arc<JobLocks>,
    clock: Arc<dyn Clock>,
}

impl<R> AdmissionController<R>
where
    R: ApplicationRepository,
{
    pub fn new(repository: Arc<R>, locks: Arc<JobLocks>, clock: Arc<dyn Clock>) -> Self {
        Self {
            repository,
            locks,
            clock,
        }
    }

    /// Admit `applicant_id` to `job`, returning the stored application with its position.
    pub fn submit(
        &self,
        job: &JobSnapshot,
        applicant_id: ApplicantId,
        bid: Bid,
    ) -> Result<Application, AdmissionError> {
        let outcome = self
            .locks
            .run(&job.id, || self.admit(job, applicant_id.clone(), bid));

        if let Err(err) = &outcome {
            if let Some(code) = err.policy_code() {
                warn!(
                    job_id = %job.id,
                    applicant_id = %applicant_id,
                    reason = code,
                    "application refused"
                );
            }
        }
        outcome
    }

    fn admit(
        &self,
        job: &JobSnapshot,
        applicant_id: ApplicantId,
        bid: Bid,
    ) -> Result<Application, AdmissionError> {
        if self
            .repository
            .for_applicant_on_job(&job.id, &applicant_id)?
            .is_some()
        {
            return Err(AdmissionError::AlreadyApplied);
        }

        if job.status != JobStatus::Open {
            return Err(AdmissionError::JobClosed);
        }

        let now = self.clock.now();
        if job.is_expired_at(now) {
            return Err(AdmissionError::DeadlineExpired);
        }

        let admitted = self.repository.for_job(&job.id)?.len();
        if admitted >= job.max_applications as usize {
            return Err(AdmissionError::CapacityExceeded);
        }

        let position = admitted as u32 + 1;
        let application = Application {
            id: application_id(job, position),
            job_id: job.id.clone(),
            applicant_id,
            position,
            bid,
            status: ApplicationStatus::Submitted,
            created_at: now,
        };

        let stored = self
            .repository
            .insert(application)
            .map_err(|err| match err {
                RepositoryError::DuplicateApplicant => AdmissionError::AlreadyApplied,
                other => AdmissionError::Repository(other),
            })?;

        info!(
            job_id = %stored.job_id,
            applicant_id = %stored.applicant_id,
            application_id = %stored.id,
            position = stored.position,
            capacity = job.max_applications,
            "application admitted"
        );
        Ok(stored)
    }

}

/// Ids derive from the job and position, which the job's section keeps unique.
fn application_id(job: &JobSnapshot, position: u32) -> ApplicationId {
    ApplicationId(format!("{}-{position:04}", job.id))
}

/// Reasons an admission can fail.
#[derive(Debug, thiserror::Error)]
pub enum AdmissionError {
    #[error("applicant has already applied to this job")]
    AlreadyApplied,
    #[error("job is closed to new applications")]
    JobClosed,
    #[error("application deadline has passed")]
    DeadlineExpired,
    #[error("job has reached its application capacity")]
    CapacityExceeded,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl AdmissionError {
    /// Stable code for business-rule refusals; `None` for storage failures.
    pub const fn policy_code(&self) -> Option<&'static str> {
        match self {
            AdmissionError::AlreadyApplied => Some("already_applied"),
            AdmissionError::JobClosed => Some("job_closed"),
            AdmissionError::DeadlineExpired => Some("deadline_expired"),
            AdmissionError::CapacityExceeded => Some("capacity_exceeded"),
            AdmissionError::Repository(_) => None,
        }
    }
}
