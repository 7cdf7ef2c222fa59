use std::sync::Arc;

use axum::{
    extract::{Path, RawQuery, State},
    routing::get,
    Json, Router,
};
use showroom_core::vehicles::{FilterSpec, VehicleRecord};

use crate::{
    error::{ApiError, ApiResult},
    main_lib::AppState,
    models::{SimilarVehiclesResponse, VehicleListResponse},
};

/// Decodes a raw query string into its key/value pairs, keeping repeats.
fn query_pairs(raw: Option<String>) -> ApiResult<Vec<(String, String)>> {
    match raw {
        Some(qs) => serde_urlencoded::from_str::<Vec<(String, String)>>(&qs)
            .map_err(|e| ApiError::BadRequest(format!("Malformed query string: {}", e))),
        None => Ok(Vec::new()),
    }
}

/// The value of a parameter that may appear at most once.
fn single<'a>(pairs: &'a [(String, String)], key: &str) -> ApiResult<Option<&'a str>> {
    let mut values = pairs.iter().filter(|(k, _)| k == key).map(|(_, v)| v.as_str());
    let first = values.next();
    if values.next().is_some() {
        return Err(ApiError::BadRequest(format!(
            "Parameter '{}' may only be given once",
            key
        )));
    }
    Ok(first)
}

/// Splits the comma-separated `fields` parameters into column names.
fn projection(pairs: &[(String, String)]) -> Option<Vec<String>> {
    let fields: Vec<String> = pairs
        .iter()
        .filter(|(k, _)| k == "fields")
        .flat_map(|(_, v)| v.split(','))
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(str::to_string)
        .collect();
    (!fields.is_empty()).then_some(fields)
}

#[utoipa::path(
    get,
    path = "/api/cars",
    responses(
        (status = 200, body = VehicleListResponse),
        (status = 400, description = "Invalid filter or paging parameter")
    )
)]
pub async fn list_vehicles(
    State(state): State<Arc<AppState>>,
    RawQuery(raw): RawQuery,
) -> ApiResult<Json<VehicleListResponse>> {
    let pairs = query_pairs(raw)?;
    let filters = FilterSpec::from_pairs(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())))?;
    let fields = projection(&pairs);

    let result = state.vehicle_service.search_vehicles(&filters).await?;
    let response = VehicleListResponse::from_result(result, fields.as_deref())?;
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/api/cars/similar",
    params(
        ("year" = String, Query, description = "Model year to match"),
        ("vin" = String, Query, description = "Reference vehicle, excluded from the result")
    ),
    responses(
        (status = 200, body = SimilarVehiclesResponse),
        (status = 400, description = "Missing required parameters")
    )
)]
pub async fn similar_vehicles(
    State(state): State<Arc<AppState>>,
    RawQuery(raw): RawQuery,
) -> ApiResult<Json<SimilarVehiclesResponse>> {
    let pairs = query_pairs(raw)?;
    let year = single(&pairs, "year")?.unwrap_or_default();
    let vin = single(&pairs, "vin")?.unwrap_or_default();

    let vins = state.vehicle_service.get_similar_vins(year, vin).await?;
    Ok(Json(SimilarVehiclesResponse { vins }))
}

#[utoipa::path(
    get,
    path = "/api/cars/{vin}",
    params(("vin" = String, Path, description = "Vehicle identification number")),
    responses(
        (status = 200, description = "Vehicle record keyed by column name"),
        (status = 404, description = "Car not found")
    )
)]
pub async fn get_vehicle(
    State(state): State<Arc<AppState>>,
    Path(vin): Path<String>,
) -> ApiResult<Json<VehicleRecord>> {
    let record = state.vehicle_service.get_vehicle(&vin).await?;
    Ok(Json(record))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/cars", get(list_vehicles))
        .route("/cars/similar", get(similar_vehicles))
        .route("/cars/{vin}", get(get_vehicle))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(k: &str, v: &str) -> (String, String) {
        (k.to_string(), v.to_string())
    }

    #[test]
    fn test_projection_splits_and_merges() {
        let pairs = vec![
            pair("fields", "VIN, Year"),
            pair("make", "Honda"),
            pair("fields", "Price,"),
        ];
        assert_eq!(
            projection(&pairs),
            Some(vec!["VIN".to_string(), "Year".to_string(), "Price".to_string()])
        );
    }

    #[test]
    fn test_single_rejects_repeats() {
        let pairs = vec![pair("year", "2024"), pair("vin", "A"), pair("year", "2023")];
        assert_eq!(single(&pairs, "vin").unwrap(), Some("A"));
        assert_eq!(single(&pairs, "make").unwrap(), None);
        assert!(matches!(single(&pairs, "year"), Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn test_projection_absent() {
        assert_eq!(projection(&[pair("fields", " , ")]), None);
        assert_eq!(projection(&[]), None);
    }
}
