use gigboard::config::MarketplaceConfig;
use gigboard::workflows::jobs::InMemoryJobCatalog;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Job postings hosted by this process and the defaults applied to new ones.
#[derive(Clone)]
pub(crate) struct CatalogState {
    pub(crate) catalog: Arc<InMemoryJobCatalog>,
    pub(crate) defaults: MarketplaceConfig,
}

pub(crate) fn parse_positive(raw: &str) -> Result<u32, String> {
    match raw.trim().parse::<u32>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(format!("'{raw}' must be a positive integer")),
    }
}
