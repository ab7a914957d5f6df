//! Configuration structures for the conversion and reconciliation pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for stockview.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StockviewConfig {
    /// Dataset storage configuration.
    pub storage: StorageConfig,

    /// PDF table extraction configuration.
    pub extraction: ExtractionConfig,

    /// Dashboard reconciliation configuration.
    pub reconciliation: ReconciliationConfig,

    /// Assistant configuration.
    pub assistant: AssistantConfig,
}

/// Storage tiers for the stock and sales datasets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding `stock.json` and `sales.json`.
    pub data_dir: PathBuf,

    /// Write datasets to `data_dir`.
    pub enable_disk: bool,

    /// Base URL of the key/value REST store. The tier is off when unset.
    pub kv_url: Option<String>,

    /// Bearer token for the key/value REST store.
    pub kv_token: Option<String>,

    /// Optional namespace prepended to every key.
    pub kv_namespace: String,

    /// Key prefix.
    pub kv_prefix: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".sv-data"),
            enable_disk: true,
            kv_url: None,
            kv_token: None,
            kv_namespace: String::new(),
            kv_prefix: "sv".to_string(),
        }
    }
}

impl StorageConfig {
    /// Whether both the key/value URL and token are present.
    pub fn kv_enabled(&self) -> bool {
        self.kv_url.as_deref().is_some_and(|u| !u.is_empty())
            && self.kv_token.as_deref().is_some_and(|t| !t.is_empty())
    }
}

/// Table extraction thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Characters scanned by the document classifier.
    pub classifier_scan_chars: usize,

    /// Minimum length of a sales data line.
    pub min_sales_line_len: usize,

    /// Minimum length of a stock data line.
    pub min_stock_line_len: usize,

    /// Minimum column count of a sales row.
    pub min_sales_columns: usize,

    /// Minimum column count of a stock row.
    pub min_stock_columns: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            classifier_scan_chars: 15_000,
            min_sales_line_len: 5,
            min_stock_line_len: 4,
            min_sales_columns: 7,
            min_stock_columns: 4,
        }
    }
}

/// Ranking limits for the dashboard summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconciliationConfig {
    /// Number of best sellers reported.
    pub best_seller_limit: usize,

    /// A product is low on stock when qty or remaining falls below this.
    pub low_stock_threshold: i64,

    /// Number of low-stock products reported.
    pub low_stock_limit: usize,
}

impl Default for ReconciliationConfig {
    fn default() -> Self {
        Self {
            best_seller_limit: 5,
            low_stock_threshold: 10,
            low_stock_limit: 10,
        }
    }
}

/// Text-generation collaborator settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    /// Model name.
    pub model: String,

    /// API key. Usually supplied through `GEMINI_API_KEY`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// API base URL.
    pub base_url: String,

    /// Stock and sales rows included in the prompt.
    pub context_rows: usize,

    /// Conversation turns included in the prompt.
    pub history_turns: usize,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            model: "gemini-1.5-flash".to_string(),
            api_key: None,
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            context_rows: 50,
            history_turns: 8,
        }
    }
}

impl StockviewConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }

    /// Overlay settings from the process environment.
    pub fn apply_env(self) -> Self {
        self.apply_vars(|name| std::env::var(name).ok())
    }

    /// Overlay settings from an arbitrary variable lookup.
    pub fn apply_vars(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(dir) = lookup("SV_DATA_DIR") {
            self.storage.data_dir = PathBuf::from(dir);
        }
        if let Some(url) = lookup("KV_REST_API_URL") {
            self.storage.kv_url = Some(url);
        }
        if let Some(token) = lookup("KV_REST_API_TOKEN") {
            self.storage.kv_token = Some(token);
        }
        if let Some(namespace) = lookup("KV_REST_API_NAMESPACE") {
            self.storage.kv_namespace = namespace;
        }
        if let Some(prefix) = lookup("SV_KV_PREFIX") {
            self.storage.kv_prefix = prefix;
        }
        if let Some(key) = lookup("GEMINI_API_KEY") {
            self.assistant.api_key = Some(key);
        }
        if let Some(model) = lookup("GEMINI_MODEL") {
            self.assistant.model = model;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: StockviewConfig =
            serde_json::from_str(r#"{ "reconciliation": { "low_stock_limit": 3 } }"#).unwrap();
        assert_eq!(config.reconciliation.low_stock_limit, 3);
        assert_eq!(config.reconciliation.low_stock_threshold, 10);
        assert_eq!(config.extraction.classifier_scan_chars, 15_000);
        assert_eq!(config.storage.kv_prefix, "sv");
    }

    #[test]
    fn test_env_overrides() {
        let config = StockviewConfig::default().apply_vars(|name| match name {
            "KV_REST_API_URL" => Some("https://kv.example".to_string()),
            "KV_REST_API_TOKEN" => Some("secret".to_string()),
            "SV_DATA_DIR" => Some("/tmp/sv".to_string()),
            _ => None,
        });
        assert!(config.storage.kv_enabled());
        assert_eq!(config.storage.data_dir, PathBuf::from("/tmp/sv"));
        assert!(config.assistant.api_key.is_none());
    }

    #[test]
    fn test_kv_requires_url_and_token() {
        let mut storage = StorageConfig::default();
        storage.kv_url = Some("https://kv.example".to_string());
        assert!(!storage.kv_enabled());
    }
}
