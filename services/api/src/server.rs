use crate::cli::ServeArgs;
use crate::infra::{AppState, CatalogState};
use crate::routes::with_application_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use gigboard::config::AppConfig;
use gigboard::error::AppError;
use gigboard::telemetry;
use gigboard::workflows::jobs::applications::{
    InMemoryApplicationRepository, JobApplicationService,
};
use gigboard::workflows::jobs::InMemoryJobCatalog;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let repository = Arc::new(InMemoryApplicationRepository::default());
    let catalog = Arc::new(InMemoryJobCatalog::default());
    let catalog_state = CatalogState {
        catalog: catalog.clone(),
        defaults: config.marketplace,
    };
    let application_service = Arc::new(JobApplicationService::new(
        repository,
        catalog,
        &config.marketplace,
    ));

    let app = with_application_routes(application_service)
        .layer(Extension(catalog_state))
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        shortlist_limit = config.marketplace.shortlist_limit,
        "job application service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
