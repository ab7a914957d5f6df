//! Subcommands and the helpers they share.

pub mod ask;
pub mod batch;
pub mod config;
pub mod convert;
pub mod import;
pub mod summary;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use stockview_core::models::config::StockviewConfig;
use stockview_core::store::{DatasetStore, MemoryCache};

/// Location of the user configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("stockview")
        .join("config.json")
}

/// Resolve the configuration file a command should read.
pub fn config_file(config_path: Option<&str>) -> PathBuf {
    config_path.map(PathBuf::from).unwrap_or_else(default_config_path)
}

/// Load configuration and overlay environment variables.
///
/// An explicit path must exist; the default location falls back to defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<StockviewConfig> {
    let config = match config_path {
        Some(path) => StockviewConfig::from_file(Path::new(path))
            .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path, e))?,
        None => {
            let path = default_config_path();
            if path.exists() {
                debug!("Loading config from {}", path.display());
                StockviewConfig::from_file(&path)?
            } else {
                StockviewConfig::default()
            }
        }
    };
    Ok(config.apply_env())
}

/// Open the dataset store described by `config`.
pub fn open_store(config: &StockviewConfig) -> DatasetStore {
    DatasetStore::from_config(&config.storage, Arc::new(MemoryCache::new()))
}

/// Lower-cased file extension, or an empty string.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}
