//! Pattern result types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Season buckets used by the long-term seasonal analysis
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum PatternSeason {
    /// June through August
    Summer,
    /// December through February
    Winter,
    /// Every other month
    Other,
}

impl PatternSeason {
    /// Bucket a calendar month (1-12)
    pub fn from_month(month: u32) -> Self {
        match month {
            6..=8 => PatternSeason::Summer,
            12 | 1 | 2 => PatternSeason::Winter,
            _ => PatternSeason::Other,
        }
    }

    pub fn all() -> &'static [PatternSeason] {
        &[PatternSeason::Summer, PatternSeason::Winter, PatternSeason::Other]
    }
}

impl std::fmt::Display for PatternSeason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PatternSeason::Summer => write!(f, "summer"),
            PatternSeason::Winter => write!(f, "winter"),
            PatternSeason::Other => write!(f, "other"),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SeasonalPattern {
    /// Jaccard overlap of the pair's timestamps per season
    pub seasonal_strength: BTreeMap<PatternSeason, f64>,
    pub strongest_season: Option<PatternSeason>,
}

impl SeasonalPattern {
    /// Strength of the strongest season, if any season qualified
    pub fn max_strength(&self) -> Option<f64> {
        self.strongest_season
            .and_then(|season| self.seasonal_strength.get(&season).copied())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeeklyPattern {
    pub weekday_ratio: f64,
    pub weekend_ratio: f64,
    pub prefers_weekday: bool,
}

impl Default for WeeklyPattern {
    fn default() -> Self {
        Self {
            weekday_ratio: 0.5,
            weekend_ratio: 0.5,
            prefers_weekday: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Trend {
    pub direction: TrendDirection,
    /// Absolute change between early and late correlation
    pub strength: f64,
    pub early_correlation: f64,
    pub late_correlation: f64,
}

/// Long-term behavioral relationship between two entities
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CorrelationPattern {
    pub entity1_id: String,
    pub entity2_id: String,
    /// Co-occurrence correlation in [-1, 1]
    pub historical_correlation: f64,
    pub seasonal_pattern: SeasonalPattern,
    pub weekly_pattern: WeeklyPattern,
    pub trend: Trend,
    /// Combined confidence in [0, 1]
    pub confidence: f64,
    pub analysis_period_days: u32,
    pub entity1_state_changes: usize,
    pub entity2_state_changes: usize,
}
