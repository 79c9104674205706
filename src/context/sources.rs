//! Enrichment Sources
//!
//! Weather, electricity pricing and carbon intensity lookups are injected
//! into the enhancer as trait objects. Any of them may fail, hang or return
//! nothing; the enhancer tolerates all three.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeatherReading {
    pub condition: String,
    /// Degrees Celsius
    pub temperature: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PricingReading {
    pub current_rate: Option<f64>,
    #[serde(default)]
    pub is_peak_hour: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CarbonReading {
    /// gCO2/kWh
    pub intensity: Option<f64>,
}

/// Errors from a single enrichment attempt
#[derive(Error, Debug)]
pub enum EnrichmentError {
    #[error("Enrichment timed out")]
    Timeout,

    #[error("Enrichment cancelled")]
    Cancelled,

    #[error("HTTP {0}")]
    Http(u16),

    #[error("Enrichment failed: {0}")]
    Failed(String),
}

impl From<reqwest::Error> for EnrichmentError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            EnrichmentError::Timeout
        } else {
            EnrichmentError::Failed(e.to_string())
        }
    }
}

#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn current_weather(&self) -> Result<Option<WeatherReading>, EnrichmentError>;
}

#[async_trait]
pub trait PricingSource: Send + Sync {
    async fn electricity_pricing(&self) -> Result<Option<PricingReading>, EnrichmentError>;
}

#[async_trait]
pub trait CarbonSource: Send + Sync {
    async fn carbon_intensity(&self) -> Result<Option<CarbonReading>, EnrichmentError>;
}

/// The set of configured enrichment sources
#[derive(Clone, Default)]
pub struct EnrichmentSources {
    pub weather: Option<Arc<dyn WeatherSource>>,
    pub pricing: Option<Arc<dyn PricingSource>>,
    pub carbon: Option<Arc<dyn CarbonSource>>,
}

impl EnrichmentSources {
    /// No enrichment; snapshots carry temporal fields only
    pub fn none() -> Self {
        Self::default()
    }

    /// Use one client for all three lookups
    pub fn from_client<C>(client: Arc<C>) -> Self
    where
        C: WeatherSource + PricingSource + CarbonSource + 'static,
    {
        Self {
            weather: Some(client.clone()),
            pricing: Some(client.clone()),
            carbon: Some(client),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.weather.is_some() || self.pricing.is_some() || self.carbon.is_some()
    }
}

/// HTTP enrichment client
///
/// Reads `{base_url}/weather`, `{base_url}/pricing` and `{base_url}/carbon`,
/// each returning the matching reading as JSON (or `null`).
pub struct JsonEnrichmentClient {
    client: Client,
    base_url: String,
}

impl JsonEnrichmentClient {
    /// `request_timeout` is a transport ceiling; the enhancer applies its
    /// own per-attempt timeout on top.
    pub fn new(base_url: impl Into<String>, request_timeout: Duration) -> Result<Self, EnrichmentError> {
        let client = Client::builder().timeout(request_timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, EnrichmentError> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), path);
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if status.as_u16() == 404 {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(EnrichmentError::Http(status.as_u16()));
        }

        let reading: Option<T> = response.json().await?;
        Ok(reading)
    }
}

#[async_trait]
impl WeatherSource for JsonEnrichmentClient {
    async fn current_weather(&self) -> Result<Option<WeatherReading>, EnrichmentError> {
        self.get_json("weather").await
    }
}

#[async_trait]
impl PricingSource for JsonEnrichmentClient {
    async fn electricity_pricing(&self) -> Result<Option<PricingReading>, EnrichmentError> {
        self.get_json("pricing").await
    }
}

#[async_trait]
impl CarbonSource for JsonEnrichmentClient {
    async fn carbon_intensity(&self) -> Result<Option<CarbonReading>, EnrichmentError> {
        self.get_json("carbon").await
    }
}
