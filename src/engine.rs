//! Synergy Engine
//!
//! Wires the history client, pattern detector, context enhancer and
//! synergy generator from a [`Config`], sharing one set of caches.

use crate::config::Config;
use crate::context::{
    ContextCache, ContextEnhancer, ContextSnapshot, EnhancedScoreResult, EnrichmentError,
    EnrichmentSources, JsonEnrichmentClient,
};
use crate::history::{HistoryCache, HistoryClient, HistoryError, HistorySource};
use crate::patterns::{CorrelationPattern, PatternCache, PatternDetector};
use crate::synergy::{EntityInfo, SynergyGenerator, SynergyOpportunity};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while building the engine
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("History client error: {0}")]
    History(#[from] HistoryError),

    #[error("Enrichment client error: {0}")]
    Enrichment(#[from] EnrichmentError),
}

/// An opportunity with its context-aware score
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredSynergy {
    pub opportunity: SynergyOpportunity,
    pub score: EnhancedScoreResult,
}

/// Facade over the scoring pipeline
pub struct SynergyEngine {
    detector: PatternDetector,
    enhancer: ContextEnhancer,
    generator: SynergyGenerator,
}

impl SynergyEngine {
    /// Build every component from configuration
    pub fn from_config(config: &Config) -> Result<Self, EngineError> {
        let history_cache = Arc::new(HistoryCache::new(config.history.cache_ttl()));
        let client = HistoryClient::new(config.history.client_config(), history_cache)?;

        let sources = match &config.context.enrichment_url {
            Some(url) => {
                tracing::info!(url = %url, "Context enrichment enabled");
                let client = JsonEnrichmentClient::new(
                    url.clone(),
                    Duration::from_millis(config.context.enrichment_timeout_ms),
                )?;
                EnrichmentSources::from_client(Arc::new(client))
            }
            None => {
                tracing::info!("No enrichment URL configured, using temporal context only");
                EnrichmentSources::none()
            }
        };

        Ok(Self::with_components(Arc::new(client), sources, config))
    }

    /// Build with a custom history source and enrichment sources
    pub fn with_components(
        source: Arc<dyn HistorySource>,
        sources: EnrichmentSources,
        config: &Config,
    ) -> Self {
        let detector = PatternDetector::new(
            source,
            Arc::new(PatternCache::new()),
            config.patterns.detector_config(),
        );
        let enhancer = ContextEnhancer::new(
            sources,
            Arc::new(ContextCache::new(config.context.cache_ttl())),
            config.context.retry_policy(),
        );
        let generator = SynergyGenerator::new(config.synergy.generator_config());

        Self {
            detector,
            enhancer,
            generator,
        }
    }

    pub fn detector(&self) -> &PatternDetector {
        &self.detector
    }

    pub fn enhancer(&self) -> &ContextEnhancer {
        &self.enhancer
    }

    pub fn generator(&self) -> &SynergyGenerator {
        &self.generator
    }

    pub async fn analyze_correlation_pattern(
        &self,
        entity1_id: &str,
        entity2_id: &str,
        days: Option<u32>,
    ) -> Option<CorrelationPattern> {
        self.detector
            .analyze_correlation_pattern(entity1_id, entity2_id, days)
            .await
    }

    pub async fn enhance_synergy_score(
        &self,
        opportunity: &SynergyOpportunity,
        context: Option<&ContextSnapshot>,
    ) -> EnhancedScoreResult {
        self.enhancer.enhance_synergy_score(opportunity, context).await
    }

    pub async fn fetch_context(&self) -> ContextSnapshot {
        self.enhancer.fetch_context().await
    }

    /// Generate opportunities for `entities` and score them under the
    /// current context, best first
    pub async fn score_context_aware_synergies(&self, entities: &[EntityInfo]) -> Vec<ScoredSynergy> {
        let snapshot = self.enhancer.fetch_context().await;
        self.score_context_aware_synergies_with(entities, &snapshot)
    }

    /// Same as [`score_context_aware_synergies`](Self::score_context_aware_synergies)
    /// under a fixed snapshot
    pub fn score_context_aware_synergies_with(
        &self,
        entities: &[EntityInfo],
        snapshot: &ContextSnapshot,
    ) -> Vec<ScoredSynergy> {
        let mut scored: Vec<ScoredSynergy> = self
            .generator
            .generate_context_aware_synergies(entities)
            .into_iter()
            .map(|opportunity| {
                let score = crate::context::score_opportunity(&opportunity, snapshot);
                ScoredSynergy { opportunity, score }
            })
            .collect();

        // Stable: ties keep generation order
        scored.sort_by(|a, b| b.score.enhanced_score.total_cmp(&a.score.enhanced_score));
        scored
    }
}
