//! Long-Term Pattern Detector
//!
//! Turns two entities' state history into correlation, seasonal, weekly and
//! trend statistics. Results are cached per (entity pair, lookback days)
//! until [`PatternDetector::clear_cache`] is called.

use super::stats;
use super::types::CorrelationPattern;
use crate::history::{HistorySource, TimeSeries};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

/// Configuration for the pattern detector
#[derive(Debug, Clone)]
pub struct PatternConfig {
    /// Lookbacks shorter than this are analyzed but flagged as short-term
    pub min_history_days: u32,
    /// Default and maximum lookback
    pub max_history_days: u32,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            min_history_days: 30,
            max_history_days: 90,
        }
    }
}

/// Errors raised while computing a pattern; never returned to callers
#[derive(Error, Debug)]
pub enum PatternError {
    #[error("Invalid analysis window: {0} days")]
    InvalidWindow(u32),
}

type PatternKey = (String, String, u32);

/// Shared cache of computed patterns, without expiry
#[derive(Default)]
pub struct PatternCache {
    entries: RwLock<HashMap<PatternKey, CorrelationPattern>>,
}

impl PatternCache {
    pub fn new() -> Self {
        Self::default()
    }

    async fn get(&self, key: &PatternKey) -> Option<CorrelationPattern> {
        self.entries.read().await.get(key).cloned()
    }

    async fn insert(&self, key: PatternKey, pattern: CorrelationPattern) {
        self.entries.write().await.insert(key, pattern);
    }

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

/// Detect long-term correlation patterns between entity pairs
pub struct PatternDetector {
    source: Arc<dyn HistorySource>,
    cache: Arc<PatternCache>,
    config: PatternConfig,
}

impl PatternDetector {
    /// Create a new pattern detector
    pub fn new(source: Arc<dyn HistorySource>, cache: Arc<PatternCache>, config: PatternConfig) -> Self {
        Self {
            source,
            cache,
            config,
        }
    }

    pub fn config(&self) -> &PatternConfig {
        &self.config
    }

    /// Analyze the pair over the last `days` (default: `max_history_days`)
    ///
    /// Returns `None` when either entity has no history in the window or
    /// the analysis fails; `None` means insufficient data, not zero
    /// correlation.
    pub async fn analyze_correlation_pattern(
        &self,
        entity1_id: &str,
        entity2_id: &str,
        days: Option<u32>,
    ) -> Option<CorrelationPattern> {
        self.analyze_correlation_pattern_at(entity1_id, entity2_id, days, Utc::now())
            .await
    }

    /// Same as [`analyze_correlation_pattern`](Self::analyze_correlation_pattern)
    /// with an explicit window end
    pub async fn analyze_correlation_pattern_at(
        &self,
        entity1_id: &str,
        entity2_id: &str,
        days: Option<u32>,
        end: DateTime<Utc>,
    ) -> Option<CorrelationPattern> {
        let days = self.effective_days(days);
        let key = (entity1_id.to_string(), entity2_id.to_string(), days);

        if let Some(pattern) = self.cache.get(&key).await {
            tracing::debug!(
                entity1 = %entity1_id,
                entity2 = %entity2_id,
                days,
                "Pattern cache hit"
            );
            return Some(pattern);
        }

        match self.compute(entity1_id, entity2_id, days, end).await {
            Ok(Some(pattern)) => {
                tracing::debug!(
                    entity1 = %entity1_id,
                    entity2 = %entity2_id,
                    correlation = pattern.historical_correlation,
                    confidence = pattern.confidence,
                    "Computed correlation pattern"
                );
                self.cache.insert(key, pattern.clone()).await;
                Some(pattern)
            }
            Ok(None) => {
                tracing::debug!(
                    entity1 = %entity1_id,
                    entity2 = %entity2_id,
                    days,
                    "Insufficient history for pattern analysis"
                );
                None
            }
            Err(e) => {
                tracing::warn!(
                    entity1 = %entity1_id,
                    entity2 = %entity2_id,
                    error = %e,
                    "Pattern analysis failed"
                );
                None
            }
        }
    }

    /// Drop every cached pattern
    pub async fn clear_cache(&self) {
        self.cache.clear().await;
        tracing::info!("Pattern cache cleared");
    }

    pub async fn cache_len(&self) -> usize {
        self.cache.len().await
    }

    fn effective_days(&self, days: Option<u32>) -> u32 {
        let requested = days.unwrap_or(self.config.max_history_days);
        if requested > self.config.max_history_days {
            tracing::debug!(
                requested,
                max = self.config.max_history_days,
                "Capping lookback to maximum history"
            );
            return self.config.max_history_days;
        }
        if requested < self.config.min_history_days {
            tracing::debug!(
                requested,
                min = self.config.min_history_days,
                "Lookback shorter than long-term minimum"
            );
        }
        requested
    }

    async fn compute(
        &self,
        entity1_id: &str,
        entity2_id: &str,
        days: u32,
        end: DateTime<Utc>,
    ) -> Result<Option<CorrelationPattern>, PatternError> {
        if days == 0 {
            return Err(PatternError::InvalidWindow(days));
        }
        let start = Duration::try_days(i64::from(days))
            .and_then(|window| end.checked_sub_signed(window))
            .ok_or(PatternError::InvalidWindow(days))?;

        let history = self
            .source
            .fetch_correlation_history(entity1_id, entity2_id, start, end)
            .await;

        if history.entity1.is_empty() || history.entity2.is_empty() {
            return Ok(None);
        }

        let series1 = TimeSeries::from_records(&history.entity1);
        let series2 = TimeSeries::from_records(&history.entity2);
        let ts1 = series1.timestamps();
        let ts2 = series2.timestamps();

        let historical_correlation = stats::historical_correlation(&series1, &series2);
        let seasonal_pattern = stats::seasonal_pattern(&ts1, &ts2);
        let weekly_pattern = stats::weekly_pattern(&ts1, &ts2);
        let trend = stats::trend(&ts1, &ts2, start, end);
        let confidence =
            stats::confidence(historical_correlation, &seasonal_pattern, &weekly_pattern, &trend);

        Ok(Some(CorrelationPattern {
            entity1_id: entity1_id.to_string(),
            entity2_id: entity2_id.to_string(),
            historical_correlation,
            seasonal_pattern,
            weekly_pattern,
            trend,
            confidence,
            analysis_period_days: days,
            entity1_state_changes: series1.len(),
            entity2_state_changes: series2.len(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::StateChangeRecord;
    use async_trait::async_trait;
    use chrono::{Datelike, TimeZone};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// History double that counts fetches
    struct CountingSource {
        records: HashMap<String, Vec<StateChangeRecord>>,
        calls: AtomicUsize,
    }

    impl CountingSource {
        fn new(records: Vec<StateChangeRecord>) -> Self {
            let mut by_entity: HashMap<String, Vec<StateChangeRecord>> = HashMap::new();
            for record in records {
                by_entity.entry(record.entity_id.clone()).or_default().push(record);
            }
            Self {
                records: by_entity,
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl HistorySource for CountingSource {
        async fn fetch_history(
            &self,
            entity_id: &str,
            _start: DateTime<Utc>,
            _end: DateTime<Utc>,
        ) -> Vec<StateChangeRecord> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.records.get(entity_id).cloned().unwrap_or_default()
        }
    }

    fn end() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 31, 0, 0, 0).unwrap()
    }

    /// Motion and light change together on every weekday evening in March
    fn paired_records() -> Vec<StateChangeRecord> {
        let mut records = Vec::new();
        for day in 4..=29 {
            let motion = Utc.with_ymd_and_hms(2024, 3, day, 19, 0, 0).unwrap();
            if motion.weekday().num_days_from_monday() >= 5 {
                continue;
            }
            records.push(StateChangeRecord::new("binary_sensor.hall_motion", "on", motion));
            records.push(StateChangeRecord::new(
                "light.hall",
                "on",
                motion + Duration::minutes(1),
            ));
        }
        records
    }

    fn detector(source: Arc<CountingSource>) -> PatternDetector {
        PatternDetector::new(source, Arc::new(PatternCache::new()), PatternConfig::default())
    }

    #[tokio::test]
    async fn test_analyze_correlated_pair() {
        let source = Arc::new(CountingSource::new(paired_records()));
        let detector = detector(Arc::clone(&source));

        let pattern = detector
            .analyze_correlation_pattern_at("binary_sensor.hall_motion", "light.hall", Some(30), end())
            .await
            .unwrap();

        assert_eq!(pattern.historical_correlation, 1.0);
        assert_eq!(pattern.weekly_pattern.weekday_ratio, 1.0);
        assert_eq!(pattern.weekly_pattern.weekend_ratio, 0.0);
        assert!(pattern.weekly_pattern.prefers_weekday);
        assert_eq!(pattern.confidence, 1.0);
        assert_eq!(pattern.analysis_period_days, 30);
        assert_eq!(pattern.entity1_state_changes, pattern.entity2_state_changes);
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_second_call_served_from_cache() {
        let source = Arc::new(CountingSource::new(paired_records()));
        let detector = detector(Arc::clone(&source));

        let first = detector
            .analyze_correlation_pattern_at("binary_sensor.hall_motion", "light.hall", Some(30), end())
            .await;
        let second = detector
            .analyze_correlation_pattern_at("binary_sensor.hall_motion", "light.hall", Some(30), end())
            .await;

        assert_eq!(first, second);
        assert_eq!(source.calls(), 2);
        assert_eq!(detector.cache_len().await, 1);

        detector.clear_cache().await;
        detector
            .analyze_correlation_pattern_at("binary_sensor.hall_motion", "light.hall", Some(30), end())
            .await;
        assert_eq!(source.calls(), 4);
    }

    #[tokio::test]
    async fn test_missing_history_is_none() {
        let source = Arc::new(CountingSource::new(paired_records()));
        let detector = detector(Arc::clone(&source));

        let pattern = detector
            .analyze_correlation_pattern_at("binary_sensor.hall_motion", "light.unknown", Some(30), end())
            .await;

        assert!(pattern.is_none());
        assert_eq!(detector.cache_len().await, 0);
    }

    #[tokio::test]
    async fn test_zero_day_window_is_none() {
        let source = Arc::new(CountingSource::new(paired_records()));
        let detector = detector(Arc::clone(&source));

        let pattern = detector
            .analyze_correlation_pattern_at("binary_sensor.hall_motion", "light.hall", Some(0), end())
            .await;

        assert!(pattern.is_none());
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn test_unrepresentable_window_is_none() {
        let source = Arc::new(CountingSource::new(paired_records()));
        let detector = PatternDetector::new(
            Arc::clone(&source) as Arc<dyn HistorySource>,
            Arc::new(PatternCache::new()),
            PatternConfig {
                min_history_days: 30,
                max_history_days: u32::MAX,
            },
        );

        let pattern = detector
            .analyze_correlation_pattern_at("binary_sensor.hall_motion", "light.hall", None, end())
            .await;

        assert!(pattern.is_none());
        assert_eq!(source.calls(), 0);
        assert_eq!(detector.cache_len().await, 0);
    }

    #[tokio::test]
    async fn test_lookback_capped_to_max() {
        let source = Arc::new(CountingSource::new(paired_records()));
        let detector = detector(Arc::clone(&source));

        let pattern = detector
            .analyze_correlation_pattern_at("binary_sensor.hall_motion", "light.hall", Some(365), end())
            .await
            .unwrap();
        assert_eq!(pattern.analysis_period_days, 90);

        let default_days = detector
            .analyze_correlation_pattern_at("binary_sensor.hall_motion", "light.hall", None, end())
            .await
            .unwrap();
        assert_eq!(default_days, pattern);
        assert_eq!(source.calls(), 2);
    }
}
