//! Vehicles module - inventory models, store, query engine and service.
//!
//! - **Model** (`vehicles_model.rs`) - `VehicleRecord` and its derived views
//! - **CSV parser** (`csv_parser.rs`) - tolerant parsing of the dataset file
//! - **Source** (`vehicles_source.rs`) - file-backed `VehicleSourceTrait`
//! - **Store** (`vehicles_store.rs`) - freshness-window cache with single-flight reloads
//! - **Query engine** (`query_engine.rs`) - filters, facets and pagination
//! - **Service** (`vehicles_service.rs`) - search, lookup and similarity operations

pub mod csv_parser;
pub mod query_engine;
mod query_model;
mod vehicles_model;
mod vehicles_service;
mod vehicles_source;
mod vehicles_store;
mod vehicles_traits;

#[cfg(test)]
mod vehicles_store_tests;

pub use csv_parser::{parse_inventory, ParseWarning, ParsedInventory, WarningKind};
pub use query_model::{ConditionCounts, Facet, FilterCounts, FilterSpec, QueryResult};
pub use vehicles_model::{columns, parse_amount, ColumnIndex, Condition, VehicleRecord};
pub use vehicles_service::VehicleService;
pub use vehicles_source::CsvFileSource;
pub use vehicles_store::{InventorySnapshot, ReloadFailurePolicy, StoreConfig, VehicleStore};
pub use vehicles_traits::{Clock, SystemClock, VehicleServiceTrait, VehicleSourceTrait};
