//! Dataset storage across a key/value REST tier, local disk and memory.
//!
//! Reads try the key/value tier, then disk, then the memory cache; the first
//! durable hit refreshes the cache. Writes replace the cache first and then
//! try every durable tier. Tier failures are logged and never fail the call.

mod cache;
mod disk;
mod kv;

pub use cache::MemoryCache;
pub use disk::DiskTier;
pub use kv::KvTier;

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::models::config::StorageConfig;
use crate::models::records::{DatasetRecord, SalesRecord, StockRecord};

/// Which durable tiers accepted a write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WriteReport {
    pub kv: bool,
    pub disk: bool,
}

impl WriteReport {
    /// Whether at least one durable tier stored the snapshot.
    pub fn is_durable(&self) -> bool {
        self.kv || self.disk
    }
}

/// Full-snapshot reader and writer for the stock and sales datasets.
#[derive(Debug)]
pub struct DatasetStore {
    cache: Arc<MemoryCache>,
    kv: Option<KvTier>,
    disk: Option<DiskTier>,
}

impl DatasetStore {
    /// A store backed only by `cache`.
    pub fn new(cache: Arc<MemoryCache>) -> Self {
        Self {
            cache,
            kv: None,
            disk: None,
        }
    }

    /// Build a store from configuration.
    pub fn from_config(config: &StorageConfig, cache: Arc<MemoryCache>) -> Self {
        let mut store = Self::new(cache);
        if let Some(kv) = KvTier::from_config(config) {
            store = store.with_kv(kv);
        }
        if config.enable_disk {
            store = store.with_disk(DiskTier::new(&config.data_dir));
        }
        debug!(
            "Dataset store: kv={}, disk={}",
            store.kv.is_some(),
            store.disk.is_some()
        );
        store
    }

    pub fn with_kv(mut self, kv: KvTier) -> Self {
        self.kv = Some(kv);
        self
    }

    pub fn with_disk(mut self, disk: DiskTier) -> Self {
        self.disk = Some(disk);
        self
    }

    /// The shared memory cache.
    pub fn cache(&self) -> &Arc<MemoryCache> {
        &self.cache
    }

    /// Read the current snapshot of `T`'s dataset.
    ///
    /// Falls back to the cached snapshot, and to an empty dataset when
    /// nothing has ever been stored.
    pub async fn load<T: DatasetRecord>(&self) -> Vec<T> {
        if let Some(kv) = &self.kv {
            match kv.get::<T>().await {
                Ok(Some(rows)) => {
                    self.cache.put(rows.clone()).await;
                    return rows;
                }
                Ok(None) => debug!("No {} in key/value store", T::DATASET),
                Err(e) => warn!("Key/value read of {} failed: {}", T::DATASET, e),
            }
        }

        if let Some(disk) = &self.disk {
            match disk.read::<T>().await {
                Ok(Some(rows)) => {
                    self.cache.put(rows.clone()).await;
                    return rows;
                }
                Ok(None) => debug!("No {} on disk", T::DATASET),
                Err(e) => warn!("Disk read of {} failed: {}", T::DATASET, e),
            }
        }

        self.cache.get::<T>().await.unwrap_or_default()
    }

    /// Replace `T`'s dataset with `rows` (last writer wins).
    pub async fn replace<T: DatasetRecord>(&self, rows: Vec<T>) -> WriteReport {
        let count = rows.len();
        self.cache.put(rows.clone()).await;

        let mut report = WriteReport::default();

        if let Some(kv) = &self.kv {
            match kv.set(&rows).await {
                Ok(()) => report.kv = true,
                Err(e) => warn!("Key/value write of {} failed: {}", T::DATASET, e),
            }
        }

        if let Some(disk) = &self.disk {
            match disk.write(&rows).await {
                Ok(()) => report.disk = true,
                Err(e) => warn!("Disk write of {} failed: {}", T::DATASET, e),
            }
        }

        if report.is_durable() {
            info!("Stored {} {} records ({:?})", count, T::DATASET, report);
        } else {
            warn!(
                "{} records for {} kept in memory only; no durable tier accepted the write",
                count,
                T::DATASET
            );
        }

        report
    }

    pub async fn stock(&self) -> Vec<StockRecord> {
        self.load().await
    }

    pub async fn sales(&self) -> Vec<SalesRecord> {
        self.load().await
    }

    /// Read both datasets concurrently.
    pub async fn snapshot(&self) -> (Vec<StockRecord>, Vec<SalesRecord>) {
        tokio::join!(self.stock(), self.sales())
    }
}
