//! Context Enhancer
//!
//! Scores a synergy opportunity by blending its base impact with temporal,
//! weather, energy and behavioral boosts. Context comes from the caller or
//! from [`ContextEnhancer::fetch_context`], which caches snapshots for a
//! short TTL and degrades field by field when enrichment fails.

use super::boosts::ContextBreakdown;
use super::cache::ContextCache;
use super::retry::{fetch_with_retry, RetryPolicy};
use super::snapshot::{ContextMetadata, ContextSnapshot};
use super::sources::EnrichmentSources;
use crate::synergy::SynergyOpportunity;
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Impact assumed for opportunities that arrive without one
pub const DEFAULT_IMPACT: f64 = 0.5;

/// Result of scoring one opportunity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnhancedScoreResult {
    /// Final score in [0, 1], rounded to 4 decimals
    pub enhanced_score: f64,
    pub context_breakdown: ContextBreakdown,
    pub context_metadata: ContextMetadata,
}

pub struct ContextEnhancer {
    sources: EnrichmentSources,
    cache: Arc<ContextCache>,
    retry: RetryPolicy,
}

impl ContextEnhancer {
    pub fn new(sources: EnrichmentSources, cache: Arc<ContextCache>, retry: RetryPolicy) -> Self {
        Self {
            sources,
            cache,
            retry,
        }
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Score `opportunity` under `context`, fetching context if not given
    ///
    /// Missing or out-of-range impact scores are corrected and logged, never
    /// rejected.
    pub async fn enhance_synergy_score(
        &self,
        opportunity: &SynergyOpportunity,
        context: Option<&ContextSnapshot>,
    ) -> EnhancedScoreResult {
        match context {
            Some(snapshot) => score_opportunity(opportunity, snapshot),
            None => {
                let snapshot = self.fetch_context().await;
                score_opportunity(opportunity, &snapshot)
            }
        }
    }

    /// Current context, served from cache while fresh
    pub async fn fetch_context(&self) -> ContextSnapshot {
        self.fetch_context_with_cancel(&CancellationToken::new()).await
    }

    /// Like [`fetch_context`](Self::fetch_context), abandoning enrichment
    /// as soon as `cancel` fires
    ///
    /// Snapshots built after cancellation are returned but not cached.
    pub async fn fetch_context_with_cancel(&self, cancel: &CancellationToken) -> ContextSnapshot {
        if let Some(snapshot) = self.cache.get().await {
            tracing::debug!("Context cache hit");
            return snapshot;
        }

        let mut snapshot = ContextSnapshot::temporal(&Local::now());

        if self.sources.is_configured() {
            self.enrich(&mut snapshot, cancel).await;
        }

        if cancel.is_cancelled() {
            tracing::debug!("Context build cancelled, not caching snapshot");
        } else {
            self.cache.insert(snapshot.clone()).await;
        }

        snapshot
    }

    /// Drop the cached snapshot so the next fetch rebuilds it
    pub async fn clear_context_cache(&self) {
        self.cache.clear().await;
    }

    async fn enrich(&self, snapshot: &mut ContextSnapshot, cancel: &CancellationToken) {
        let weather = async {
            match &self.sources.weather {
                Some(source) => {
                    fetch_with_retry("weather", &self.retry, cancel, move || source.current_weather()).await
                }
                None => None,
            }
        };
        let pricing = async {
            match &self.sources.pricing {
                Some(source) => {
                    fetch_with_retry("pricing", &self.retry, cancel, move || source.electricity_pricing())
                        .await
                }
                None => None,
            }
        };
        let carbon = async {
            match &self.sources.carbon {
                Some(source) => {
                    fetch_with_retry("carbon", &self.retry, cancel, move || source.carbon_intensity()).await
                }
                None => None,
            }
        };

        let (weather, pricing, carbon) = tokio::join!(weather, pricing, carbon);

        if let Some(reading) = weather {
            snapshot.weather = Some(reading.condition);
            snapshot.temperature = reading.temperature;
        }
        if let Some(reading) = pricing {
            snapshot.energy_cost = reading.current_rate;
            snapshot.peak_hours = reading.is_peak_hour;
        }
        if let Some(reading) = carbon {
            snapshot.carbon_intensity = reading.intensity;
        }

        tracing::debug!(
            weather = snapshot.weather.is_some(),
            energy = snapshot.energy_cost.is_some(),
            carbon = snapshot.carbon_intensity.is_some(),
            "Built context snapshot"
        );
    }
}

/// Validated base impact of an opportunity
fn base_impact(opportunity: &SynergyOpportunity) -> f64 {
    match opportunity.impact_score {
        Some(score) if score.is_finite() => {
            if !(0.0..=1.0).contains(&score) {
                tracing::warn!(
                    synergy_id = %opportunity.synergy_id,
                    impact_score = score,
                    "Impact score out of range, clamping to [0, 1]"
                );
            }
            score.clamp(0.0, 1.0)
        }
        _ => {
            tracing::warn!(
                synergy_id = %opportunity.synergy_id,
                "Missing impact score, defaulting to {}",
                DEFAULT_IMPACT
            );
            DEFAULT_IMPACT
        }
    }
}

/// Score an opportunity against a fixed snapshot; deterministic
pub fn score_opportunity(
    opportunity: &SynergyOpportunity,
    snapshot: &ContextSnapshot,
) -> EnhancedScoreResult {
    let breakdown = ContextBreakdown::compute(
        base_impact(opportunity),
        &opportunity.relationship_type,
        snapshot,
    );

    EnhancedScoreResult {
        enhanced_score: breakdown.enhanced_score(),
        context_breakdown: breakdown,
        context_metadata: snapshot.metadata(),
    }
}
