//! Key/value REST tier (`GET <url>/get/<key>`, `POST <url>/set/<key>`).

use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::debug;

use crate::error::StoreError;
use crate::models::config::StorageConfig;
use crate::models::records::{Dataset, DatasetRecord};

/// Body of a `get` response. The stored value comes back as a JSON string.
#[derive(Debug, Deserialize)]
struct GetResponse {
    result: Option<String>,
}

/// Client for a REST key/value store with bearer-token auth.
#[derive(Debug, Clone)]
pub struct KvTier {
    client: Client,
    url: String,
    token: String,
    namespace: String,
    prefix: String,
}

impl KvTier {
    pub fn new(url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
            token: token.into(),
            namespace: String::new(),
            prefix: "sv".to_string(),
        }
    }

    /// Build the tier from configuration; `None` unless both URL and token are set.
    pub fn from_config(config: &StorageConfig) -> Option<Self> {
        if !config.kv_enabled() {
            return None;
        }
        let url = config.kv_url.clone()?;
        let token = config.kv_token.clone()?;
        Some(
            Self::new(url, token)
                .with_namespace(config.kv_namespace.clone())
                .with_prefix(config.kv_prefix.clone()),
        )
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Storage key: `<namespace>:<prefix>:<dataset>`, or `<prefix>:<dataset>`
    /// without a namespace.
    pub fn key_for(&self, dataset: Dataset) -> String {
        if self.namespace.is_empty() {
            format!("{}:{}", self.prefix, dataset.key())
        } else {
            format!("{}:{}:{}", self.namespace, self.prefix, dataset.key())
        }
    }

    fn endpoint(&self, operation: &str, dataset: Dataset) -> Result<Url, StoreError> {
        let mut url = Url::parse(&self.url).map_err(|e| StoreError::Kv(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| StoreError::Kv(format!("invalid base URL: {}", self.url)))?
            .pop_if_empty()
            .push(operation)
            .push(&self.key_for(dataset));
        Ok(url)
    }

    /// Fetch `T`'s dataset. An absent key is `Ok(None)`.
    pub async fn get<T: DatasetRecord>(&self) -> Result<Option<Vec<T>>, StoreError> {
        let url = self.endpoint("get", T::DATASET)?;
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| StoreError::Kv(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::Kv(format!("get returned status {}", status)));
        }

        let body: GetResponse = response
            .json()
            .await
            .map_err(|e| StoreError::Kv(e.to_string()))?;

        let Some(raw) = body.result else {
            return Ok(None);
        };

        let rows = serde_json::from_str(&raw).map_err(|e| StoreError::Decode {
            dataset: T::DATASET,
            message: e.to_string(),
        })?;
        debug!("Read {} from key/value store", T::DATASET);
        Ok(Some(rows))
    }

    /// Store `T`'s dataset under its key.
    pub async fn set<T: DatasetRecord>(&self, rows: &[T]) -> Result<(), StoreError> {
        let url = self.endpoint("set", T::DATASET)?;
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.token)
            .json(rows)
            .send()
            .await
            .map_err(|e| StoreError::Kv(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::Kv(format!("set returned status {}", status)));
        }

        debug!("Wrote {} to key/value store", T::DATASET);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::records::StockRecord;

    #[test]
    fn test_keys() {
        let tier = KvTier::new("https://kv.example.com", "token");
        assert_eq!(tier.key_for(Dataset::Stock), "sv:stock");

        let tier = tier.with_namespace("toko").with_prefix("dash");
        assert_eq!(tier.key_for(Dataset::Sales), "toko:dash:sales");
    }

    #[test]
    fn test_endpoint() {
        let tier = KvTier::new("https://kv.example.com/", "token");
        assert_eq!(
            tier.endpoint("get", Dataset::Stock).unwrap().as_str(),
            "https://kv.example.com/get/sv:stock"
        );
    }

    #[test]
    fn test_endpoint_rejects_bad_url() {
        let tier = KvTier::new("not a url", "token");
        assert!(matches!(
            tier.endpoint("get", Dataset::Stock),
            Err(StoreError::Kv(_))
        ));
    }

    #[test]
    fn test_from_config_requires_url_and_token() {
        let mut config = StorageConfig {
            kv_url: Some("https://kv.example.com".to_string()),
            ..StorageConfig::default()
        };
        assert!(KvTier::from_config(&config).is_none());

        config.kv_token = Some("secret".to_string());
        config.kv_namespace = "toko".to_string();
        let tier = KvTier::from_config(&config).unwrap();
        assert_eq!(tier.key_for(Dataset::Stock), "toko:sv:stock");
    }

    #[tokio::test]
    async fn test_unreachable_store_is_an_error() {
        let tier = KvTier::new("http://127.0.0.1:1", "token");
        assert!(matches!(
            tier.get::<StockRecord>().await,
            Err(StoreError::Kv(_))
        ));
        assert!(tier.set::<StockRecord>(&[]).await.is_err());
    }
}
