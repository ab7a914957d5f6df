//! Process-scoped last-known snapshot of each dataset.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::models::records::{Dataset, DatasetRecord};

type Snapshot = Arc<dyn Any + Send + Sync>;

/// In-memory copy of the most recent successfully read or written snapshot.
///
/// Shared between stores through an `Arc`. Snapshots are handed out as
/// clones, so callers never alias cached rows.
#[derive(Default)]
pub struct MemoryCache {
    snapshots: RwLock<HashMap<Dataset, Snapshot>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached rows of `T`'s dataset, if any were stored.
    pub async fn get<T: DatasetRecord>(&self) -> Option<Vec<T>> {
        let snapshots = self.snapshots.read().await;
        snapshots
            .get(&T::DATASET)
            .and_then(|snapshot| snapshot.downcast_ref::<Vec<T>>())
            .cloned()
    }

    /// Replace the cached rows of `T`'s dataset.
    pub async fn put<T: DatasetRecord>(&self, rows: Vec<T>) {
        self.snapshots
            .write()
            .await
            .insert(T::DATASET, Arc::new(rows));
    }

    /// Whether a snapshot is cached for `dataset`.
    pub async fn contains(&self, dataset: Dataset) -> bool {
        self.snapshots.read().await.contains_key(&dataset)
    }

    /// Drop every cached snapshot.
    pub async fn clear(&self) {
        self.snapshots.write().await.clear();
    }
}

impl std::fmt::Debug for MemoryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCache").finish_non_exhaustive()
    }
}
