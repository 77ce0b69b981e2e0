use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::admission::AdmissionError;
use super::domain::{ApplicantId, Application, ApplicationId, ApplicationView, Bid};
use super::intake::BidGuard;
use super::repository::ApplicationRepository;
use super::service::{ApplicationServiceError, JobApplicationService};
use super::shortlist::ShortlistError;
use crate::workflows::jobs::catalog::{CatalogError, JobCatalog, JobId};

/// Shared handler state: the service plus the caller-side bid guard.
pub struct ApplicationRoutes<R, C> {
    pub service: Arc<JobApplicationService<R, C>>,
    pub guard: BidGuard,
}

impl<R, C> Clone for ApplicationRoutes<R, C> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            guard: self.guard.clone(),
        }
    }
}

/// Inbound bid for a job; bid fields sit at the top level of the body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitApplicationRequest {
    pub applicant_id: ApplicantId,
    #[serde(flatten)]
    pub bid: Bid,
}

/// Router builder exposing HTTP endpoints for admission and the shortlist workflow.
pub fn application_router<R, C>(service: Arc<JobApplicationService<R, C>>) -> Router
where
    R: ApplicationRepository + 'static,
    C: JobCatalog + 'static,
{
    application_router_with_guard(service, BidGuard::default())
}

/// Same routes as [`application_router`], validating bids with `guard`.
pub fn application_router_with_guard<R, C>(
    service: Arc<JobApplicationService<R, C>>,
    guard: BidGuard,
) -> Router
where
    R: ApplicationRepository + 'static,
    C: JobCatalog + 'static,
{
    let state = ApplicationRoutes { service, guard };

    Router::new()
        .route(
            "/api/v1/jobs/:job_id/applications",
            post(submit_handler::<R, C>).get(list_handler::<R, C>),
        )
        .route(
            "/api/v1/jobs/:job_id/applicants/:applicant_id",
            get(has_applied_handler::<R, C>),
        )
        .route("/api/v1/jobs/:job_id/window", get(window_handler::<R, C>))
        .route(
            "/api/v1/jobs/:job_id/shortlist",
            get(shortlist_count_handler::<R, C>),
        )
        .route(
            "/api/v1/applications/:application_id",
            get(status_handler::<R, C>),
        )
        .route(
            "/api/v1/applications/:application_id/shortlist",
            post(shortlist_handler::<R, C>),
        )
        .route(
            "/api/v1/applications/:application_id/reject",
            post(reject_handler::<R, C>),
        )
        .route(
            "/api/v1/applicants/:applicant_id/applications",
            get(applicant_handler::<R, C>),
        )
        .with_state(state)
}

pub(crate) async fn submit_handler<R, C>(
    State(state): State<ApplicationRoutes<R, C>>,
    Path(job_id): Path<String>,
    Json(request): Json<SubmitApplicationRequest>,
) -> Response
where
    R: ApplicationRepository + 'static,
    C: JobCatalog + 'static,
{
    let bid = match state.guard.sanitize(request.bid) {
        Ok(bid) => bid,
        Err(violation) => {
            let payload = json!({
                "error": violation.to_string(),
                "code": "invalid_bid",
            });
            return (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response();
        }
    };

    match state
        .service
        .submit_application(&JobId(job_id), request.applicant_id, bid)
    {
        Ok(application) => (StatusCode::CREATED, Json(application.view())).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn list_handler<R, C>(
    State(state): State<ApplicationRoutes<R, C>>,
    Path(job_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    C: JobCatalog + 'static,
{
    let job_id = JobId(job_id);
    match state.service.applications_for_job(&job_id) {
        Ok(applications) => {
            let views = views(&applications);
            let payload = json!({
                "job_id": job_id,
                "count": views.len(),
                "applications": views,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn has_applied_handler<R, C>(
    State(state): State<ApplicationRoutes<R, C>>,
    Path((job_id, applicant_id)): Path<(String, String)>,
) -> Response
where
    R: ApplicationRepository + 'static,
    C: JobCatalog + 'static,
{
    let job_id = JobId(job_id);
    let applicant_id = ApplicantId(applicant_id);
    match state.service.has_applied(&job_id, &applicant_id) {
        Ok(has_applied) => {
            let payload = json!({
                "job_id": job_id,
                "applicant_id": applicant_id,
                "has_applied": has_applied,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn window_handler<R, C>(
    State(state): State<ApplicationRoutes<R, C>>,
    Path(job_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    C: JobCatalog + 'static,
{
    match state.service.application_window(&JobId(job_id)) {
        Ok(window) => (StatusCode::OK, Json(window)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn shortlist_count_handler<R, C>(
    State(state): State<ApplicationRoutes<R, C>>,
    Path(job_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    C: JobCatalog + 'static,
{
    let job_id = JobId(job_id);
    match state.service.shortlisted_count(&job_id) {
        Ok(shortlisted) => {
            let payload = json!({
                "job_id": job_id,
                "shortlisted": shortlisted,
                "limit": state.service.shortlist_limit(),
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn status_handler<R, C>(
    State(state): State<ApplicationRoutes<R, C>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    C: JobCatalog + 'static,
{
    match state
        .service
        .application(&ApplicationId(application_id))
    {
        Ok(application) => (StatusCode::OK, Json(application.view())).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn shortlist_handler<R, C>(
    State(state): State<ApplicationRoutes<R, C>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    C: JobCatalog + 'static,
{
    match state
        .service
        .shortlist_application(&ApplicationId(application_id))
    {
        Ok(application) => (StatusCode::OK, Json(application.view())).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn reject_handler<R, C>(
    State(state): State<ApplicationRoutes<R, C>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    C: JobCatalog + 'static,
{
    match state
        .service
        .reject_application(&ApplicationId(application_id))
    {
        Ok(application) => (StatusCode::OK, Json(application.view())).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn applicant_handler<R, C>(
    State(state): State<ApplicationRoutes<R, C>>,
    Path(applicant_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    C: JobCatalog + 'static,
{
    let applicant_id = ApplicantId(applicant_id);
    match state.service.applications_for_applicant(&applicant_id) {
        Ok(applications) => {
            let payload = json!({
                "applicant_id": applicant_id,
                "applications": views(&applications),
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(err) => error_response(err),
    }
}

fn views(applications: &[Application]) -> Vec<ApplicationView> {
    applications.iter().map(Application::view).collect()
}

/// HTTP status for a service error: 404 for missing records, 409 for conflicts with current
/// state, 410 for jobs no longer taking bids, 503 for storage and catalog outages.
pub fn status_for(err: &ApplicationServiceError) -> StatusCode {
    match err {
        ApplicationServiceError::UnknownJob(_)
        | ApplicationServiceError::ApplicationNotFound(_)
        | ApplicationServiceError::Shortlist(ShortlistError::NotFound) => StatusCode::NOT_FOUND,
        ApplicationServiceError::Admission(
            AdmissionError::AlreadyApplied | AdmissionError::CapacityExceeded,
        )
        | ApplicationServiceError::Shortlist(
            ShortlistError::InvalidTransition { .. } | ShortlistError::ShortlistFull { .. },
        )
        | ApplicationServiceError::Catalog(CatalogError::AlreadyRegistered(_)) => {
            StatusCode::CONFLICT
        }
        ApplicationServiceError::Admission(
            AdmissionError::JobClosed | AdmissionError::DeadlineExpired,
        ) => StatusCode::GONE,
        ApplicationServiceError::Admission(AdmissionError::Repository(_))
        | ApplicationServiceError::Shortlist(ShortlistError::Repository(_))
        | ApplicationServiceError::Catalog(CatalogError::Unavailable(_))
        | ApplicationServiceError::Repository(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

fn error_response(err: ApplicationServiceError) -> Response {
    let payload = json!({
        "error": err.to_string(),
        "code": err.code(),
    });
    (status_for(&err), Json(payload)).into_response()
}
