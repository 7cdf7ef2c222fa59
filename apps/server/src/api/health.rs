use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Router};

use crate::main_lib::AppState;

#[utoipa::path(get, path = "/api/healthz", responses((status = 200, description = "OK")))]
pub async fn healthz() -> &'static str {
    "ok"
}

/// Ready once an inventory snapshot can be served.
#[utoipa::path(
    get,
    path = "/api/readyz",
    responses(
        (status = 200, description = "Ready"),
        (status = 503, description = "Inventory unavailable")
    )
)]
pub async fn readyz(State(state): State<Arc<AppState>>) -> (StatusCode, &'static str) {
    match state.vehicle_store.snapshot().await {
        Ok(_) => (StatusCode::OK, "ok"),
        Err(e) => {
            match state.vehicle_store.cached_at().await {
                Some(loaded_at) => tracing::warn!(
                    "Readiness check failed, last good load at {}: {}",
                    loaded_at,
                    e
                ),
                None => tracing::warn!("Readiness check failed, inventory never loaded: {}", e),
            }
            (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
        }
    }
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
}
