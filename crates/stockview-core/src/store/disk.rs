//! JSON files on local disk, one per dataset.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, warn};

use crate::error::StoreError;
use crate::models::records::DatasetRecord;

/// Disk tier. The first failed read or write switches it off for good.
#[derive(Debug)]
pub struct DiskTier {
    dir: PathBuf,
    usable: AtomicBool,
}

impl DiskTier {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            usable: AtomicBool::new(true),
        }
    }

    /// Directory holding the dataset files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of `T`'s dataset file.
    pub fn path_for<T: DatasetRecord>(&self) -> PathBuf {
        self.dir.join(format!("{}.json", T::DATASET.key()))
    }

    /// Whether the tier is still in use.
    pub fn is_usable(&self) -> bool {
        self.usable.load(Ordering::Relaxed)
    }

    /// Read `T`'s dataset. A missing file is `Ok(None)`.
    pub async fn read<T: DatasetRecord>(&self) -> Result<Option<Vec<T>>, StoreError> {
        if !self.is_usable() {
            return Ok(None);
        }

        let path = self.path_for::<T>();
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.disable(StoreError::Disk(e))),
        };

        let rows = serde_json::from_str(&raw).map_err(|e| {
            self.disable(StoreError::Decode {
                dataset: T::DATASET,
                message: e.to_string(),
            })
        })?;

        debug!("Read {} from {}", T::DATASET, path.display());
        Ok(Some(rows))
    }

    /// Write `T`'s dataset as pretty JSON, creating the directory on demand.
    pub async fn write<T: DatasetRecord>(&self, rows: &[T]) -> Result<(), StoreError> {
        if !self.is_usable() {
            return Err(StoreError::Disk(io::Error::other("disk tier disabled")));
        }

        let path = self.path_for::<T>();
        let json = serde_json::to_string_pretty(rows).map_err(|e| StoreError::Decode {
            dataset: T::DATASET,
            message: e.to_string(),
        })?;

        let result = match tokio::fs::create_dir_all(&self.dir).await {
            Ok(()) => tokio::fs::write(&path, json).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => {
                debug!("Wrote {} to {}", T::DATASET, path.display());
                Ok(())
            }
            Err(e) => Err(self.disable(StoreError::Disk(e))),
        }
    }

    fn disable(&self, error: StoreError) -> StoreError {
        warn!("Disabling disk tier at {}: {}", self.dir.display(), error);
        self.usable.store(false, Ordering::Relaxed);
        error
    }
}
