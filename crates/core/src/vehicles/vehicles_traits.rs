use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::errors::Result;
use crate::vehicles::query_model::{FilterSpec, QueryResult};
use crate::vehicles::vehicles_model::VehicleRecord;

/// Trait for the backing dataset the store loads from
#[async_trait]
pub trait VehicleSourceTrait: Send + Sync {
    /// Reads and parses the whole dataset.
    async fn load(&self) -> Result<Vec<VehicleRecord>>;

    /// Human readable location, used in logs.
    fn describe(&self) -> String;
}

/// Source of the current time, injectable so cache expiry can be tested
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Trait for vehicle query operations
#[async_trait]
pub trait VehicleServiceTrait: Send + Sync {
    /// Filters, facets and paginates the current inventory.
    async fn search_vehicles(&self, filters: &FilterSpec) -> Result<QueryResult>;

    /// Fetches exactly one vehicle by VIN.
    async fn get_vehicle(&self, vin: &str) -> Result<VehicleRecord>;

    /// Up to eight other VINs sharing the reference vehicle's year.
    async fn get_similar_vins(&self, year: &str, vin: &str) -> Result<Vec<String>>;

    /// Forces a reload of the dataset, returning the new record count.
    async fn refresh(&self) -> Result<usize>;

    /// Drops the cached snapshot so the next query reloads.
    async fn invalidate(&self);
}
