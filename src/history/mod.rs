//! State History Retrieval
//!
//! Fetches per-entity state-change history from the external history
//! provider and caches it.
//!
//! ## Architecture
//!
//! - **HistorySource**: the retrieval seam consumed by the pattern detector
//! - **HistoryClient**: REST implementation with TTL caching
//! - **HistoryCache**: shared (entity, start, end) cache with lazy sweep
//!
//! The provider has no batch endpoint, so multi-entity fetches issue one
//! request per entity.

mod cache;
mod client;
mod error;
mod types;

pub use cache::{HistoryCache, HistoryKey};
pub use client::{HistoryClient, HistoryConfig};
pub use error::{HistoryError, HistoryResult};
pub use types::{normalize_response, StateChangeRecord, TimeSeries};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use std::collections::HashMap;

/// History of an entity pair over the same window
#[derive(Debug, Clone, Default)]
pub struct CorrelationHistory {
    pub entity1: Vec<StateChangeRecord>,
    pub entity2: Vec<StateChangeRecord>,
}

/// Source of per-entity state history
///
/// Implementations fail open: an unavailable provider yields an empty
/// sequence, which callers must read as "no data".
#[async_trait]
pub trait HistorySource: Send + Sync {
    /// Fetch state changes for one entity within `[start, end]`
    async fn fetch_history(
        &self,
        entity_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Vec<StateChangeRecord>;

    /// Fetch several entities, one request each
    async fn fetch_many(
        &self,
        entity_ids: &[String],
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> HashMap<String, Vec<StateChangeRecord>> {
        let fetches = entity_ids
            .iter()
            .map(|id| async move { (id.clone(), self.fetch_history(id, start, end).await) });

        join_all(fetches).await.into_iter().collect()
    }

    /// Fetch both entities of a candidate pair over the same window
    async fn fetch_correlation_history(
        &self,
        entity1: &str,
        entity2: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> CorrelationHistory {
        let (entity1, entity2) = tokio::join!(
            self.fetch_history(entity1, start, end),
            self.fetch_history(entity2, start, end)
        );

        CorrelationHistory { entity1, entity2 }
    }
}
