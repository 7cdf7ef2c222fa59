//! Unit tests for the inventory store cache lifecycle.

use super::*;
use crate::errors::{DataSourceError, Error, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// ============================================================================
// Mock Implementations
// ============================================================================

struct MockSource {
    records: Mutex<Vec<VehicleRecord>>,
    loads: AtomicUsize,
    failing: AtomicBool,
    delay_ms: u64,
}

impl MockSource {
    fn new(records: Vec<VehicleRecord>) -> Self {
        Self {
            records: Mutex::new(records),
            loads: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
            delay_ms: 0,
        }
    }

    fn with_delay(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn set_records(&self, records: Vec<VehicleRecord>) {
        *self.records.lock().unwrap() = records;
    }
}

#[async_trait]
impl VehicleSourceTrait for MockSource {
    async fn load(&self) -> Result<Vec<VehicleRecord>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if self.delay_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(self.delay_ms)).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(DataSourceError::Missing(PathBuf::from("mock.csv")).into());
        }
        Ok(self.records.lock().unwrap().clone())
    }

    fn describe(&self) -> String {
        "mock".to_string()
    }
}

struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    fn new() -> Self {
        Self {
            now: Mutex::new(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()),
        }
    }

    fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn vehicle(vin: &str, year: &str) -> VehicleRecord {
    VehicleRecord {
        vin: vin.into(),
        year: year.into(),
        ..Default::default()
    }
}

fn build_store(
    source: Arc<MockSource>,
    policy: ReloadFailurePolicy,
) -> (VehicleStore, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new());
    let config = StoreConfig {
        freshness_window: Duration::minutes(5),
        failure_policy: policy,
    };
    let store = VehicleStore::with_clock(source, config, clock.clone());
    (store, clock)
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_first_access_loads_once() {
    let source = Arc::new(MockSource::new(vec![vehicle("A", "2024")]));
    let (store, _clock) = build_store(source.clone(), ReloadFailurePolicy::Surface);

    assert!(store.cached_at().await.is_none());
    let snapshot = store.snapshot().await.unwrap();

    assert_eq!(snapshot.len(), 1);
    assert_eq!(source.loads(), 1);
    assert_eq!(store.cached_at().await, Some(snapshot.loaded_at()));
}

#[tokio::test]
async fn test_same_instance_within_freshness_window() {
    let source = Arc::new(MockSource::new(vec![vehicle("A", "2024")]));
    let (store, clock) = build_store(source.clone(), ReloadFailurePolicy::Surface);

    let first = store.snapshot().await.unwrap();
    clock.advance(Duration::minutes(4));
    let second = store.snapshot().await.unwrap();
    // The boundary itself is still fresh
    clock.advance(Duration::minutes(1));
    let third = store.snapshot().await.unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert!(Arc::ptr_eq(&first, &third));
    assert_eq!(source.loads(), 1);
}

#[tokio::test]
async fn test_expiry_produces_new_snapshot() {
    let source = Arc::new(MockSource::new(vec![vehicle("A", "2024")]));
    let (store, clock) = build_store(source.clone(), ReloadFailurePolicy::Surface);

    let first = store.snapshot().await.unwrap();
    clock.advance(Duration::minutes(5) + Duration::seconds(1));
    let second = store.snapshot().await.unwrap();

    // Same data, distinct snapshot
    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(first.records(), second.records());
    assert!(second.loaded_at() > first.loaded_at());
    assert_eq!(source.loads(), 2);
}

#[tokio::test]
async fn test_reload_reflects_new_data() {
    let source = Arc::new(MockSource::new(vec![vehicle("A", "2024")]));
    let (store, clock) = build_store(source.clone(), ReloadFailurePolicy::Surface);

    store.snapshot().await.unwrap();
    source.set_records(vec![vehicle("A", "2024"), vehicle("B", "2023")]);

    // Still cached
    assert_eq!(store.snapshot().await.unwrap().len(), 1);

    clock.advance(Duration::minutes(6));
    let snapshot = store.snapshot().await.unwrap();
    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot.filter_counts().year.get("2023"), Some(1));
}

#[tokio::test]
async fn test_invalidate_and_refresh() {
    let source = Arc::new(MockSource::new(vec![vehicle("A", "2024")]));
    let (store, _clock) = build_store(source.clone(), ReloadFailurePolicy::Surface);

    let first = store.snapshot().await.unwrap();
    store.invalidate().await;
    assert!(store.cached_at().await.is_none());

    let second = store.snapshot().await.unwrap();
    assert!(!Arc::ptr_eq(&first, &second));

    let refreshed = store.refresh().await.unwrap();
    assert!(!Arc::ptr_eq(&second, &refreshed));
    let cached = store.snapshot().await.unwrap();
    assert!(Arc::ptr_eq(&refreshed, &cached));
    assert_eq!(source.loads(), 3);
}

#[tokio::test]
async fn test_initial_load_failure_surfaces() {
    let source = Arc::new(MockSource::new(vec![]));
    source.set_failing(true);
    let (store, _clock) = build_store(source.clone(), ReloadFailurePolicy::ServeStale);

    let err = store.snapshot().await.unwrap_err();
    assert!(matches!(err, Error::DataSource(_)));
    assert!(store.cached_at().await.is_none());
}

#[tokio::test]
async fn test_failed_reload_surfaces_but_keeps_previous_snapshot() {
    let source = Arc::new(MockSource::new(vec![vehicle("A", "2024")]));
    let (store, clock) = build_store(source.clone(), ReloadFailurePolicy::Surface);

    let first = store.snapshot().await.unwrap();
    clock.advance(Duration::minutes(10));
    source.set_failing(true);

    let err = store.snapshot().await.unwrap_err();
    assert!(matches!(err, Error::DataSource(_)));
    assert_eq!(store.cached_at().await, Some(first.loaded_at()));

    // Recovers on the next access once the source is readable again
    source.set_failing(false);
    let second = store.snapshot().await.unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
}

#[tokio::test]
async fn test_failed_reload_serves_stale_when_configured() {
    let source = Arc::new(MockSource::new(vec![vehicle("A", "2024")]));
    let (store, clock) = build_store(source.clone(), ReloadFailurePolicy::ServeStale);

    let first = store.snapshot().await.unwrap();
    clock.advance(Duration::minutes(10));
    source.set_failing(true);

    let stale = store.snapshot().await.unwrap();
    assert!(Arc::ptr_eq(&first, &stale));
    assert_eq!(source.loads(), 2);
}

#[tokio::test]
async fn test_refresh_failure_keeps_cached_snapshot() {
    let source = Arc::new(MockSource::new(vec![vehicle("A", "2024")]));
    let (store, _clock) = build_store(source.clone(), ReloadFailurePolicy::Surface);

    let first = store.snapshot().await.unwrap();
    source.set_failing(true);
    assert!(store.refresh().await.is_err());

    let cached = store.snapshot().await.unwrap();
    assert!(Arc::ptr_eq(&first, &cached));
}

#[tokio::test]
async fn test_concurrent_callers_share_one_reload() {
    let source = Arc::new(MockSource::new(vec![vehicle("A", "2024")]).with_delay(20));
    let (store, _clock) = build_store(source.clone(), ReloadFailurePolicy::Surface);
    let store = Arc::new(store);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let store = store.clone();
            tokio::spawn(async move { store.snapshot().await })
        })
        .collect();

    let mut snapshots = Vec::new();
    for handle in handles {
        snapshots.push(handle.await.unwrap().unwrap());
    }

    assert_eq!(source.loads(), 1);
    assert!(snapshots.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
}
