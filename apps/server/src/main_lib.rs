use std::sync::Arc;

use crate::config::Config;
use showroom_core::vehicles::{
    CsvFileSource, VehicleService, VehicleServiceTrait, VehicleSourceTrait, VehicleStore,
};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

pub struct AppState {
    pub vehicle_service: Arc<dyn VehicleServiceTrait>,
    pub vehicle_store: Arc<VehicleStore>,
}

pub fn init_tracing() {
    let log_format = std::env::var("SHOWROOM_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let source: Arc<dyn VehicleSourceTrait> = Arc::new(CsvFileSource::new(&config.data_path));
    tracing::info!("Inventory source: {}", source.describe());

    let vehicle_store = Arc::new(VehicleStore::with_config(source, config.store_config()?));
    let vehicle_service: Arc<dyn VehicleServiceTrait> =
        Arc::new(VehicleService::new(vehicle_store.clone()));

    // Warm the cache; a bad dataset must not keep the server from starting.
    match vehicle_service.refresh().await {
        Ok(count) => tracing::info!("Inventory warmed with {} vehicles", count),
        Err(e) => tracing::warn!("Inventory warm-up failed: {}", e),
    }

    Ok(Arc::new(AppState {
        vehicle_service,
        vehicle_store,
    }))
}
