use async_trait::async_trait;
use log::debug;
use std::sync::Arc;

use super::query_engine::run_query;
use super::query_model::{FilterSpec, QueryResult};
use super::vehicles_model::VehicleRecord;
use super::vehicles_store::VehicleStore;
use super::vehicles_traits::VehicleServiceTrait;
use crate::constants::SIMILAR_VEHICLES_LIMIT;
use crate::errors::{Error, Result, ValidationError};

/// Service answering inventory queries from the store's current snapshot.
pub struct VehicleService {
    store: Arc<VehicleStore>,
}

impl VehicleService {
    pub fn new(store: Arc<VehicleStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<VehicleStore> {
        &self.store
    }
}

fn required<'a>(field: &str, value: &'a str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::missing(field).into());
    }
    Ok(trimmed)
}

#[async_trait]
impl VehicleServiceTrait for VehicleService {
    async fn search_vehicles(&self, filters: &FilterSpec) -> Result<QueryResult> {
        filters.validate()?;
        let snapshot = self.store.snapshot().await?;
        let result = run_query(snapshot.records(), snapshot.filter_counts(), filters);
        debug!(
            "Vehicle search matched {} of {} (page {}/{})",
            result.total,
            snapshot.len(),
            result.page,
            result.total_pages
        );
        Ok(result)
    }

    async fn get_vehicle(&self, vin: &str) -> Result<VehicleRecord> {
        let vin = required("vin", vin)?;
        let snapshot = self.store.snapshot().await?;
        snapshot
            .records()
            .iter()
            .find(|record| record.vin == vin)
            .cloned()
            .ok_or_else(|| Error::NotFound(vin.to_string()))
    }

    async fn get_similar_vins(&self, year: &str, vin: &str) -> Result<Vec<String>> {
        let year = required("year", year)?;
        let vin = required("vin", vin)?;
        let snapshot = self.store.snapshot().await?;

        let similar: Vec<String> = snapshot
            .records()
            .iter()
            .filter(|record| record.year == year && record.vin != vin)
            .take(SIMILAR_VEHICLES_LIMIT)
            .map(|record| record.vin.clone())
            .collect();
        debug!("Found {} vehicles similar to {}", similar.len(), vin);
        Ok(similar)
    }

    async fn refresh(&self) -> Result<usize> {
        let snapshot = self.store.refresh().await?;
        Ok(snapshot.len())
    }

    async fn invalidate(&self) {
        self.store.invalidate().await;
    }
}
