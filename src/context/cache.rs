//! Context Cache
//!
//! Holds the most recent snapshot for a short TTL so that scoring a batch
//! of opportunities does not repeat enrichment lookups.

use super::snapshot::ContextSnapshot;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

pub struct ContextCache {
    ttl: Duration,
    entry: RwLock<Option<(Instant, ContextSnapshot)>>,
}

impl ContextCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entry: RwLock::new(None),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The cached snapshot, if younger than the TTL
    pub async fn get(&self) -> Option<ContextSnapshot> {
        let entry = self.entry.read().await;
        entry
            .as_ref()
            .filter(|(stored_at, _)| stored_at.elapsed() < self.ttl)
            .map(|(_, snapshot)| snapshot.clone())
    }

    pub async fn insert(&self, snapshot: ContextSnapshot) {
        *self.entry.write().await = Some((Instant::now(), snapshot));
    }

    pub async fn clear(&self) {
        *self.entry.write().await = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn snapshot() -> ContextSnapshot {
        ContextSnapshot::temporal(&Utc.with_ymd_and_hms(2024, 7, 1, 9, 0, 0).unwrap())
    }

    #[tokio::test]
    async fn test_hit_then_expire() {
        let cache = ContextCache::new(Duration::from_millis(30));
        assert!(cache.get().await.is_none());

        cache.insert(snapshot()).await;
        assert_eq!(cache.get().await, Some(snapshot()));

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(cache.get().await.is_none());
    }

    #[tokio::test]
    async fn test_clear() {
        let cache = ContextCache::new(Duration::from_secs(300));
        cache.insert(snapshot()).await;
        cache.clear().await;
        assert!(cache.get().await.is_none());
    }
}
