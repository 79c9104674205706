//! History Provider REST Client
//!
//! HTTP client for the external state-history API. Fetched windows are
//! cached in a shared [`HistoryCache`]; transport and HTTP failures are
//! logged and degrade to an empty result.

use super::cache::{HistoryCache, HistoryKey};
use super::error::{HistoryError, HistoryResult};
use super::types::{normalize_response, StateChangeRecord};
use super::HistorySource;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

/// History provider REST client
pub struct HistoryClient {
    client: Client,
    config: HistoryConfig,
    cache: Arc<HistoryCache>,
}

/// Configuration for the history client
#[derive(Debug, Clone)]
pub struct HistoryConfig {
    /// Base URL of the provider API (e.g., "http://homeassistant.local:8123/api")
    pub base_url: String,
    /// Bearer token; empty disables the Authorization header
    pub token: String,
    /// Request timeout in milliseconds
    pub request_timeout_ms: u64,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8123/api".to_string(),
            token: String::new(),
            request_timeout_ms: 10_000,
        }
    }
}

impl HistoryClient {
    /// Create a new client sharing the given cache
    pub fn new(config: HistoryConfig, cache: Arc<HistoryCache>) -> HistoryResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()?;

        Ok(Self {
            client,
            config,
            cache,
        })
    }

    /// Get the current configuration
    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    /// The cache this client reads through
    pub fn cache(&self) -> &Arc<HistoryCache> {
        &self.cache
    }

    fn history_url(&self, entity_id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> String {
        format!(
            "{}/history/period/{}?filter_entity_id={}&end_time={}",
            self.config.base_url.trim_end_matches('/'),
            urlencoding::encode(&start.to_rfc3339()),
            urlencoding::encode(entity_id),
            urlencoding::encode(&end.to_rfc3339()),
        )
    }

    /// Fetch history for one entity without touching the cache
    ///
    /// Unlike [`HistorySource::fetch_history`] this surfaces the failure.
    pub async fn try_fetch_history(
        &self,
        entity_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> HistoryResult<Vec<StateChangeRecord>> {
        let url = self.history_url(entity_id, start, end);

        let mut request = self.client.get(&url);
        if !self.config.token.is_empty() {
            request = request.bearer_auth(&self.config.token);
        }

        let response = request.send().await.map_err(HistoryError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(HistoryError::ApiError {
                status: status.as_u16(),
                message: text,
            });
        }

        let body = response.text().await.map_err(HistoryError::from_transport)?;
        if body.trim().is_empty() {
            return Ok(Vec::new());
        }

        let payload: serde_json::Value =
            serde_json::from_str(&body).map_err(|e| HistoryError::Decode(e.to_string()))?;

        Ok(normalize_response(&payload, entity_id))
    }
}

#[async_trait]
impl HistorySource for HistoryClient {
    async fn fetch_history(
        &self,
        entity_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Vec<StateChangeRecord> {
        let key = HistoryKey::new(entity_id, start, end);

        if let Some(cached) = self.cache.get(&key).await {
            tracing::debug!(entity_id = %entity_id, records = cached.len(), "History cache hit");
            return cached.as_ref().clone();
        }

        match self.try_fetch_history(entity_id, start, end).await {
            Ok(records) => {
                tracing::debug!(
                    entity_id = %entity_id,
                    records = records.len(),
                    "Fetched state history"
                );
                self.cache.insert(key, records.clone()).await;
                records
            }
            Err(e) => {
                tracing::warn!(entity_id = %entity_id, error = %e, "History fetch failed");
                Vec::new()
            }
        }
    }
}
