use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::Value;

use crate::config::MarketplaceConfig;
use crate::workflows::jobs::applications::clock::Clock;
use crate::workflows::jobs::applications::domain::{
    ApplicantId, Application, ApplicationId, ApplicationStatus, Bid,
};
use crate::workflows::jobs::applications::repository::{
    ApplicationRepository, InMemoryApplicationRepository, RepositoryError,
};
use crate::workflows::jobs::applications::{application_router, JobApplicationService};
use crate::workflows::jobs::catalog::{InMemoryJobCatalog, JobId, JobSnapshot, JobStatus};

pub(super) fn posted_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 2, 14, 0, 0)
        .single()
        .expect("valid timestamp")
}

/// Clock pinned to a settable instant.
#[derive(Debug)]
pub(super) struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub(super) fn at(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub(super) fn advance(&self, by: Duration) {
        let mut guard = self.now.lock().expect("clock mutex poisoned");
        *guard += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().expect("clock mutex poisoned")
    }
}

pub(super) fn bid() -> Bid {
    Bid {
        proposed_price: 450.0,
        delivery_days: 5,
        pitch: "Two years editing long-form gaming videos with fast turnaround.".to_string(),
        portfolio_sample_url: Some("https://portfolio.example/reel".to_string()),
        question_for_creator: Some("Do you provide raw footage or a rough cut?".to_string()),
    }
}

pub(super) fn job(id: &str, max_applications: u32, deadline_hours: u32) -> JobSnapshot {
    JobSnapshot {
        id: JobId::from(id),
        max_applications,
        application_deadline_hours: deadline_hours,
        created_at: posted_at(),
        status: JobStatus::Open,
    }
}

pub(super) fn applicant(name: &str) -> ApplicantId {
    ApplicantId::from(name)
}

pub(super) type MemoryService = JobApplicationService<InMemoryApplicationRepository, InMemoryJobCatalog>;

pub(super) struct Harness {
    pub(super) service: MemoryService,
    pub(super) repository: Arc<InMemoryApplicationRepository>,
    pub(super) catalog: Arc<InMemoryJobCatalog>,
    pub(super) clock: Arc<ManualClock>,
}

/// Service with one open job `job-1` of the given capacity and a 48 hour window.
pub(super) fn harness(max_applications: u32) -> Harness {
    let repository = Arc::new(InMemoryApplicationRepository::default());
    let catalog = Arc::new(InMemoryJobCatalog::default());
    catalog
        .register(job("job-1", max_applications, 48))
        .expect("register job");
    let clock = Arc::new(ManualClock::at(posted_at() + Duration::hours(1)));
    let service = JobApplicationService::with_clock(
        repository.clone(),
        catalog.clone(),
        &MarketplaceConfig::default(),
        clock.clone(),
    );

    Harness {
        service,
        repository,
        catalog,
        clock,
    }
}

pub(super) fn job_one() -> JobId {
    JobId::from("job-1")
}

/// Repository whose every call fails as if the backing store were offline.
pub(super) struct UnavailableRepository;

impl ApplicationRepository for UnavailableRepository {
    fn insert(&self, _application: Application) -> Result<Application, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update_status(
        &self,
        _id: &ApplicationId,
        _status: ApplicationStatus,
    ) -> Result<Application, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &ApplicationId) -> Result<Option<Application>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn for_job(&self, _job_id: &JobId) -> Result<Vec<Application>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn for_applicant_on_job(
        &self,
        _job_id: &JobId,
        _applicant_id: &ApplicantId,
    ) -> Result<Option<Application>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn for_applicant(
        &self,
        _applicant_id: &ApplicantId,
    ) -> Result<Vec<Application>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) fn unavailable_service() -> JobApplicationService<UnavailableRepository, InMemoryJobCatalog>
{
    let catalog = Arc::new(InMemoryJobCatalog::default());
    catalog
        .register(job("job-1", 15, 48))
        .expect("register job");
    JobApplicationService::with_clock(
        Arc::new(UnavailableRepository),
        catalog,
        &MarketplaceConfig::default(),
        Arc::new(ManualClock::at(posted_at())),
    )
}

pub(super) fn router_for(service: MemoryService) -> axum::Router {
    application_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
