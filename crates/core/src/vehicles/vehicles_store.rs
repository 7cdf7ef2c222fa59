//! Time-bounded in-memory cache of the inventory dataset.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use log::{debug, info, warn};
use tokio::sync::{Mutex, RwLock};

use super::query_engine::compute_filter_counts;
use super::query_model::FilterCounts;
use super::vehicles_model::VehicleRecord;
use super::vehicles_traits::{Clock, SystemClock, VehicleSourceTrait};
use crate::constants::DEFAULT_FRESHNESS_WINDOW_SECS;
use crate::errors::Result;

/// An immutable, fully loaded copy of the dataset.
///
/// Facet counts over the whole inventory are computed once at load time.
#[derive(Debug)]
pub struct InventorySnapshot {
    records: Vec<VehicleRecord>,
    filter_counts: FilterCounts,
    loaded_at: DateTime<Utc>,
}

impl InventorySnapshot {
    pub fn new(records: Vec<VehicleRecord>, loaded_at: DateTime<Utc>) -> Self {
        let filter_counts = compute_filter_counts(&records);
        Self {
            records,
            filter_counts,
            loaded_at,
        }
    }

    pub fn records(&self) -> &[VehicleRecord] {
        &self.records
    }

    pub fn filter_counts(&self) -> &FilterCounts {
        &self.filter_counts
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// What to do when a reload of an expired snapshot fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReloadFailurePolicy {
    /// Return the load error to the caller.
    #[default]
    Surface,
    /// Keep answering from the last good snapshot, if there is one.
    ServeStale,
}

#[derive(Debug, Clone, Copy)]
pub struct StoreConfig {
    pub freshness_window: Duration,
    pub failure_policy: ReloadFailurePolicy,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            freshness_window: Duration::seconds(DEFAULT_FRESHNESS_WINDOW_SECS),
            failure_policy: ReloadFailurePolicy::default(),
        }
    }
}

/// Owns the cached snapshot and its lifecycle.
///
/// Within the freshness window every caller gets the same `Arc`. Once the
/// window has passed the next caller reloads; concurrent callers wait for
/// that single reload instead of parsing the file again. A failed reload
/// never discards the previous snapshot.
pub struct VehicleStore {
    source: Arc<dyn VehicleSourceTrait>,
    clock: Arc<dyn Clock>,
    config: StoreConfig,
    cached: RwLock<Option<Arc<InventorySnapshot>>>,
    reload_lock: Mutex<()>,
}

impl VehicleStore {
    pub fn new(source: Arc<dyn VehicleSourceTrait>) -> Self {
        Self::with_config(source, StoreConfig::default())
    }

    pub fn with_config(source: Arc<dyn VehicleSourceTrait>, config: StoreConfig) -> Self {
        Self::with_clock(source, config, Arc::new(SystemClock))
    }

    pub fn with_clock(
        source: Arc<dyn VehicleSourceTrait>,
        config: StoreConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            source,
            clock,
            config,
            cached: RwLock::new(None),
            reload_lock: Mutex::new(()),
        }
    }

    /// Returns the current snapshot, loading it first if there is none or the
    /// cached one has expired.
    pub async fn snapshot(&self) -> Result<Arc<InventorySnapshot>> {
        if let Some(snapshot) = self.fresh_snapshot().await {
            return Ok(snapshot);
        }

        let _guard = self.reload_lock.lock().await;
        // Another caller may have reloaded while we waited
        if let Some(snapshot) = self.fresh_snapshot().await {
            debug!("Inventory reloaded by a concurrent request");
            return Ok(snapshot);
        }

        match self.load().await {
            Ok(snapshot) => Ok(snapshot),
            Err(err) => self.recover(err).await,
        }
    }

    /// Reloads unconditionally and replaces the cached snapshot.
    pub async fn refresh(&self) -> Result<Arc<InventorySnapshot>> {
        let _guard = self.reload_lock.lock().await;
        self.load().await
    }

    /// Drops the cached snapshot so the next access reloads.
    pub async fn invalidate(&self) {
        *self.cached.write().await = None;
        debug!("Inventory cache invalidated");
    }

    /// When the cached snapshot was loaded, if there is one.
    pub async fn cached_at(&self) -> Option<DateTime<Utc>> {
        self.cached.read().await.as_ref().map(|s| s.loaded_at())
    }

    fn is_fresh(&self, snapshot: &InventorySnapshot) -> bool {
        self.clock.now() - snapshot.loaded_at() <= self.config.freshness_window
    }

    async fn fresh_snapshot(&self) -> Option<Arc<InventorySnapshot>> {
        let cache = self.cached.read().await;
        cache
            .as_ref()
            .filter(|snapshot| self.is_fresh(snapshot))
            .cloned()
    }

    async fn load(&self) -> Result<Arc<InventorySnapshot>> {
        let records = self.source.load().await?;
        let snapshot = Arc::new(InventorySnapshot::new(records, self.clock.now()));
        *self.cached.write().await = Some(snapshot.clone());
        info!(
            "Loaded {} vehicles from {}",
            snapshot.len(),
            self.source.describe()
        );
        Ok(snapshot)
    }

    async fn recover(&self, err: crate::Error) -> Result<Arc<InventorySnapshot>> {
        if self.config.failure_policy == ReloadFailurePolicy::ServeStale {
            if let Some(stale) = self.cached.read().await.clone() {
                warn!(
                    "Reloading {} failed, serving snapshot from {}: {}",
                    self.source.describe(),
                    stale.loaded_at(),
                    err
                );
                return Ok(stale);
            }
        }
        warn!("Reloading {} failed: {}", self.source.describe(), err);
        Err(err)
    }
}
