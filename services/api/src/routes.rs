use crate::infra::{AppState, CatalogState};
use axum::extract::Path;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Extension;
use axum::Json;
use chrono::Utc;
use gigboard::error::AppError;
use gigboard::workflows::jobs::applications::{
    application_router, ApplicationRepository, JobApplicationService,
};
use gigboard::workflows::jobs::{JobCatalog, JobId, JobSnapshot, JobStatus};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

/// Body for registering a job posting; omitted limits fall back to the marketplace defaults.
#[derive(Debug, Deserialize)]
pub(crate) struct RegisterJobRequest {
    pub(crate) job_id: String,
    #[serde(default)]
    pub(crate) max_applications: Option<u32>,
    #[serde(default)]
    pub(crate) application_deadline_hours: Option<u32>,
}

pub(crate) fn with_application_routes<R, C>(
    service: Arc<JobApplicationService<R, C>>,
) -> axum::Router
where
    R: ApplicationRepository + 'static,
    C: JobCatalog + 'static,
{
    application_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route("/api/v1/jobs", axum::routing::post(register_job_endpoint))
        .route("/api/v1/jobs/:job_id", axum::routing::get(job_endpoint))
        .route(
            "/api/v1/jobs/:job_id/close",
            axum::routing::post(close_job_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn register_job_endpoint(
    Extension(state): Extension<CatalogState>,
    Json(request): Json<RegisterJobRequest>,
) -> Result<Response, AppError> {
    let job_id = request.job_id.trim();
    if job_id.is_empty()
        || request.max_applications == Some(0)
        || request.application_deadline_hours == Some(0)
    {
        let payload = json!({
            "error": "job_id must be non-empty and limits must be positive",
        });
        return Ok((StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response());
    }

    let mut job = JobSnapshot::open(JobId::from(job_id), Utc::now(), &state.defaults);
    if let Some(max) = request.max_applications {
        job.max_applications = max;
    }
    if let Some(hours) = request.application_deadline_hours {
        job.application_deadline_hours = hours;
    }

    state.catalog.register(job.clone())?;
    info!(
        job_id = %job.id,
        max_applications = job.max_applications,
        deadline = %job.deadline(),
        "job registered"
    );
    Ok((StatusCode::CREATED, Json(job)).into_response())
}

pub(crate) async fn job_endpoint(
    Extension(state): Extension<CatalogState>,
    Path(job_id): Path<String>,
) -> Result<Response, AppError> {
    match state.catalog.job(&JobId(job_id))? {
        Some(job) => Ok((StatusCode::OK, Json(job)).into_response()),
        None => Ok(job_not_found()),
    }
}

pub(crate) async fn close_job_endpoint(
    Extension(state): Extension<CatalogState>,
    Path(job_id): Path<String>,
) -> Result<Response, AppError> {
    let job_id = JobId(job_id);
    if !state.catalog.close(&job_id)? {
        return Ok(job_not_found());
    }
    info!(job_id = %job_id, "job closed");
    let payload = json!({
        "job_id": job_id,
        "status": JobStatus::Closed.label(),
    });
    Ok((StatusCode::OK, Json(payload)).into_response())
}

fn job_not_found() -> Response {
    let payload = json!({ "error": "job not found", "code": "job_not_found" });
    (StatusCode::NOT_FOUND, Json(payload)).into_response()
}
