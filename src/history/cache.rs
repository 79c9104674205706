//! History Cache
//!
//! TTL cache for fetched history keyed by (entity, start, end).
//! Expired entries are swept lazily on every insert; there is no timer and
//! no entry-count bound, so callers must keep lookback windows bounded.

use super::types::StateChangeRecord;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Cache key: entity id plus ISO-8601 window bounds
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HistoryKey {
    pub entity_id: String,
    pub start: String,
    pub end: String,
}

impl HistoryKey {
    pub fn new(entity_id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            entity_id: entity_id.to_string(),
            start: start.to_rfc3339(),
            end: end.to_rfc3339(),
        }
    }
}

struct CachedHistory {
    fetched_at: Instant,
    records: Arc<Vec<StateChangeRecord>>,
}

/// Shared history cache, one per process
pub struct HistoryCache {
    ttl: Duration,
    entries: RwLock<HashMap<HistoryKey, CachedHistory>>,
}

impl HistoryCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the cached records if the entry is younger than the TTL
    pub async fn get(&self, key: &HistoryKey) -> Option<Arc<Vec<StateChangeRecord>>> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| entry.fetched_at.elapsed() < self.ttl)
            .map(|entry| Arc::clone(&entry.records))
    }

    /// Insert records, sweeping expired entries first
    pub async fn insert(&self, key: HistoryKey, records: Vec<StateChangeRecord>) {
        let mut entries = self.entries.write().await;

        let before = entries.len();
        entries.retain(|_, entry| entry.fetched_at.elapsed() < self.ttl);
        let evicted = before - entries.len();
        if evicted > 0 {
            tracing::debug!(evicted, "Swept expired history cache entries");
        }

        entries.insert(
            key,
            CachedHistory {
                fetched_at: Instant::now(),
                records: Arc::new(records),
            },
        );
    }

    /// Number of entries currently held, including not-yet-swept expired ones
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn key(entity: &str) -> HistoryKey {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap();
        HistoryKey::new(entity, start, end)
    }

    fn record(entity: &str) -> StateChangeRecord {
        StateChangeRecord::new(entity, "on", Utc.with_ymd_and_hms(2024, 1, 2, 8, 0, 0).unwrap())
    }

    #[tokio::test]
    async fn test_get_within_ttl() {
        let cache = HistoryCache::new(Duration::from_secs(60));
        cache.insert(key("light.a"), vec![record("light.a")]).await;

        let hit = cache.get(&key("light.a")).await.unwrap();
        assert_eq!(hit.len(), 1);
        assert!(cache.get(&key("light.b")).await.is_none());
    }

    #[tokio::test]
    async fn test_expired_entry_is_miss_and_swept_on_insert() {
        let cache = HistoryCache::new(Duration::from_millis(20));
        cache.insert(key("light.a"), vec![record("light.a")]).await;

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert!(cache.get(&key("light.a")).await.is_none());
        assert_eq!(cache.len().await, 1);

        cache.insert(key("light.b"), vec![]).await;
        assert_eq!(cache.len().await, 1);
        assert!(cache.get(&key("light.b")).await.is_some());
    }

    #[test]
    fn test_key_uses_iso_bounds() {
        let k = key("light.a");
        assert_eq!(k.start, "2024-01-01T00:00:00+00:00");
        assert_eq!(k.end, "2024-01-31T00:00:00+00:00");
    }

    #[tokio::test]
    async fn test_clear() {
        let cache = HistoryCache::new(Duration::from_secs(60));
        cache.insert(key("light.a"), vec![]).await;
        cache.clear().await;
        assert!(cache.is_empty().await);
    }
}
