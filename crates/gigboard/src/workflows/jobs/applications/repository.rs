use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use super::domain::{ApplicantId, Application, ApplicationId, ApplicationStatus};
use crate::workflows::jobs::catalog::JobId;

/// Storage abstraction for admitted applications.
///
/// Implementations hold no admission logic. Callers that need check-then-act semantics
/// (capacity, duplicates, shortlist slots) wrap these calls in the per-job section owned by
/// [`JobLocks`](super::locks::JobLocks).
pub trait ApplicationRepository: Send + Sync {
    fn insert(&self, application: Application) -> Result<Application, RepositoryError>;
    fn update_status(
        &self,
        id: &ApplicationId,
        status: ApplicationStatus,
    ) -> Result<Application, RepositoryError>;
    fn fetch(&self, id: &ApplicationId) -> Result<Option<Application>, RepositoryError>;
    /// All applications for a job, ordered by position.
    fn for_job(&self, job_id: &JobId) -> Result<Vec<Application>, RepositoryError>;
    fn for_applicant_on_job(
        &self,
        job_id: &JobId,
        applicant_id: &ApplicantId,
    ) -> Result<Option<Application>, RepositoryError>;
    fn for_applicant(&self, applicant_id: &ApplicantId)
        -> Result<Vec<Application>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("application id {0} is already taken")]
    DuplicateId(ApplicationId),
    #[error("applicant already holds an application for this job")]
    DuplicateApplicant,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Default)]
struct Records {
    by_id: HashMap<ApplicationId, Application>,
    by_job: HashMap<JobId, Vec<ApplicationId>>,
}

/// Process-local store used by the API binary and tests.
#[derive(Debug, Default)]
pub struct InMemoryApplicationRepository {
    records: Mutex<Records>,
}

impl InMemoryApplicationRepository {
    fn lock(&self) -> Result<MutexGuard<'_, Records>, RepositoryError> {
        self.records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("repository mutex poisoned".to_string()))
    }
}

impl ApplicationRepository for InMemoryApplicationRepository {
    fn insert(&self, application: Application) -> Result<Application, RepositoryError> {
        let mut guard = self.lock()?;
        if guard.by_id.contains_key(&application.id) {
            return Err(RepositoryError::DuplicateId(application.id));
        }
        let duplicate_pair = guard
            .by_job
            .get(&application.job_id)
            .into_iter()
            .flatten()
            .filter_map(|id| guard.by_id.get(id))
            .any(|existing| existing.applicant_id == application.applicant_id);
        if duplicate_pair {
            return Err(RepositoryError::DuplicateApplicant);
        }

        guard
            .by_job
            .entry(application.job_id.clone())
            .or_default()
            .push(application.id.clone());
        guard
            .by_id
            .insert(application.id.clone(), application.clone());
        Ok(application)
    }

    fn update_status(
        &self,
        id: &ApplicationId,
        status: ApplicationStatus,
    ) -> Result<Application, RepositoryError> {
        let mut guard = self.lock()?;
        let record = guard.by_id.get_mut(id).ok_or(RepositoryError::NotFound)?;
        record.status = status;
        Ok(record.clone())
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<Application>, RepositoryError> {
        let guard = self.lock()?;
        Ok(guard.by_id.get(id).cloned())
    }

    fn for_job(&self, job_id: &JobId) -> Result<Vec<Application>, RepositoryError> {
        let guard = self.lock()?;
        let mut applications: Vec<Application> = guard
            .by_job
            .get(job_id)
            .into_iter()
            .flatten()
            .filter_map(|id| guard.by_id.get(id).cloned())
            .collect();
        applications.sort_by_key(|application| application.position);
        Ok(applications)
    }

    fn for_applicant_on_job(
        &self,
        job_id: &JobId,
        applicant_id: &ApplicantId,
    ) -> Result<Option<Application>, RepositoryError> {
        let guard = self.lock()?;
        Ok(guard
            .by_job
            .get(job_id)
            .into_iter()
            .flatten()
            .filter_map(|id| guard.by_id.get(id))
            .find(|application| &application.applicant_id == applicant_id)
            .cloned())
    }

    fn for_applicant(
        &self,
        applicant_id: &ApplicantId,
    ) -> Result<Vec<Application>, RepositoryError> {
        let guard = self.lock()?;
        let mut applications: Vec<Application> = guard
            .by_id
            .values()
            .filter(|application| &application.applicant_id == applicant_id)
            .cloned()
            .collect();
        applications.sort_by(|left, right| {
            left.created_at
                .cmp(&right.created_at)
                .then_with(|| left.id.cmp(&right.id))
        });
        Ok(applications)
    }
}
