use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use super::admission::{AdmissionController, AdmissionError};
use super::clock::{Clock, SystemClock};
use super::domain::{ApplicantId, Application, ApplicationId, ApplicationStatus, Bid};
use super::locks::JobLocks;
use super::repository::{ApplicationRepository, RepositoryError};
use super::shortlist::{ShortlistError, ShortlistManager};
use crate::config::MarketplaceConfig;
use crate::workflows::jobs::catalog::{CatalogError, JobCatalog, JobId, JobSnapshot};

/// Facade composing the job catalog, application store, admission controller, and shortlist
/// manager behind the operations dashboards and the apply flow call.
pub struct JobApplicationService<R, C> {
    catalog: Arc<C>,
    repository: Arc<R>,
    admission: AdmissionController<R>,
    shortlist: ShortlistManager<R>,
    clock: Arc<dyn Clock>,
}

impl<R, C> JobApplicationService<R, C>
where
    R: ApplicationRepository + 'static,
    C: JobCatalog + 'static,
{
    pub fn new(repository: Arc<R>, catalog: Arc<C>, config: &MarketplaceConfig) -> Self {
        Self::with_clock(repository, catalog, config, Arc::new(SystemClock))
    }

    pub fn with_clock(
        repository: Arc<R>,
        catalog: Arc<C>,
        config: &MarketplaceConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self::with_locks(repository, catalog, config, clock, Arc::new(JobLocks::new()))
    }

    /// Services writing to the same repository must share one `JobLocks`, otherwise their
    /// capacity and shortlist checks do not exclude each other.
    pub fn with_locks(
        repository: Arc<R>,
        catalog: Arc<C>,
        config: &MarketplaceConfig,
        clock: Arc<dyn Clock>,
        locks: Arc<JobLocks>,
    ) -> Self {
        let admission =
            AdmissionController::new(repository.clone(), locks.clone(), clock.clone());
        let shortlist = ShortlistManager::new(repository.clone(), locks, config.shortlist_limit);

        Self {
            catalog,
            repository,
            admission,
            shortlist,
            clock,
        }
    }

    /// Place a bid on `job_id`. The job snapshot is read from the catalog at call time.
    pub fn submit_application(
        &self,
        job_id: &JobId,
        applicant_id: ApplicantId,
        bid: Bid,
    ) -> Result<Application, ApplicationServiceError> {
        let job = self.job(job_id)?;
        let application = self.admission.submit(&job, applicant_id, bid)?;
        Ok(application)
    }

    pub fn has_applied(
        &self,
        job_id: &JobId,
        applicant_id: &ApplicantId,
    ) -> Result<bool, ApplicationServiceError> {
        Ok(self
            .repository
            .for_applicant_on_job(job_id, applicant_id)?
            .is_some())
    }

    /// Applications for a job in position order, rejected ones included.
    pub fn applications_for_job(
        &self,
        job_id: &JobId,
    ) -> Result<Vec<Application>, ApplicationServiceError> {
        Ok(self.repository.for_job(job_id)?)
    }

    pub fn applications_for_applicant(
        &self,
        applicant_id: &ApplicantId,
    ) -> Result<Vec<Application>, ApplicationServiceError> {
        Ok(self.repository.for_applicant(applicant_id)?)
    }

    pub fn application(
        &self,
        application_id: &ApplicationId,
    ) -> Result<Application, ApplicationServiceError> {
        self.repository
            .fetch(application_id)?
            .ok_or_else(|| ApplicationServiceError::ApplicationNotFound(application_id.clone()))
    }

    pub fn shortlist_application(
        &self,
        application_id: &ApplicationId,
    ) -> Result<Application, ApplicationServiceError> {
        Ok(self.shortlist.shortlist(application_id)?)
    }

    pub fn reject_application(
        &self,
        application_id: &ApplicationId,
    ) -> Result<Application, ApplicationServiceError> {
        Ok(self.shortlist.reject(application_id)?)
    }

    pub fn shortlisted_count(&self, job_id: &JobId) -> Result<usize, ApplicationServiceError> {
        Ok(self.shortlist.shortlisted_count(job_id)?)
    }

    pub fn shortlist_limit(&self) -> usize {
        self.shortlist.limit()
    }

    /// Derived admission and shortlist state for the job's dashboard header.
    pub fn application_window(
        &self,
        job_id: &JobId,
    ) -> Result<ApplicationWindow, ApplicationServiceError> {
        let job = self.job(job_id)?;
        let applications = self.repository.for_job(job_id)?;
        Ok(ApplicationWindow::derive(
            &job,
            &applications,
            self.shortlist.limit(),
            self.clock.now(),
        ))
    }

    fn job(&self, job_id: &JobId) -> Result<JobSnapshot, ApplicationServiceError> {
        match self.catalog.job(job_id)? {
            Some(job) => Ok(job),
            None => {
                debug!(job_id = %job_id, "job not present in catalog");
                Err(ApplicationServiceError::UnknownJob(job_id.clone()))
            }
        }
    }
}

/// Counts and deadline a caller needs to decide whether to offer "Apply" or "Shortlist".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplicationWindow {
    pub job_id: JobId,
    pub job_status: &'static str,
    pub current_applications: usize,
    pub max_applications: u32,
    pub remaining_slots: usize,
    pub deadline: DateTime<Utc>,
    pub accepting: bool,
    pub shortlisted: usize,
    pub shortlist_limit: usize,
    pub shortlist_remaining: usize,
}

impl ApplicationWindow {
    pub fn derive(
        job: &JobSnapshot,
        applications: &[Application],
        shortlist_limit: usize,
        now: DateTime<Utc>,
    ) -> Self {
        let current_applications = applications.len();
        let remaining_slots = (job.max_applications as usize).saturating_sub(current_applications);
        let shortlisted = applications
            .iter()
            .filter(|application| application.status == ApplicationStatus::Shortlisted)
            .count();

        Self {
            job_id: job.id.clone(),
            job_status: job.status.label(),
            current_applications,
            max_applications: job.max_applications,
            remaining_slots,
            deadline: job.deadline(),
            accepting: job.accepts_at(now) && remaining_slots > 0,
            shortlisted,
            shortlist_limit,
            shortlist_remaining: shortlist_limit.saturating_sub(shortlisted),
        }
    }
}

/// Error raised by the application service.
#[derive(Debug, thiserror::Error)]
pub enum ApplicationServiceError {
    #[error("job {0} not found")]
    UnknownJob(JobId),
    #[error("application {0} not found")]
    ApplicationNotFound(ApplicationId),
    #[error(transparent)]
    Admission(#[from] AdmissionError),
    #[error(transparent)]
    Shortlist(#[from] ShortlistError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl ApplicationServiceError {
    /// Machine-readable code surfaced in API error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            ApplicationServiceError::UnknownJob(_) => "job_not_found",
            ApplicationServiceError::ApplicationNotFound(_) => "not_found",
            ApplicationServiceError::Admission(err) => {
                err.policy_code().unwrap_or("storage_unavailable")
            }
            ApplicationServiceError::Shortlist(err) => {
                err.policy_code().unwrap_or("storage_unavailable")
            }
            ApplicationServiceError::Catalog(CatalogError::AlreadyRegistered(_)) => "job_exists",
            ApplicationServiceError::Catalog(CatalogError::Unavailable(_)) => "catalog_unavailable",
            ApplicationServiceError::Repository(_) => "storage_unavailable",
        }
    }

    /// Storage or catalog failures, which a caller may retry.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ApplicationServiceError::Catalog(CatalogError::Unavailable(_))
                | ApplicationServiceError::Repository(_)
                | ApplicationServiceError::Admission(AdmissionError::Repository(_))
                | ApplicationServiceError::Shortlist(ShortlistError::Repository(_))
        )
    }
}
