//! Pattern Statistics
//!
//! Pure functions over entity timestamps. Nothing here does I/O and every
//! function is total: empty inputs produce neutral values.

use super::types::{PatternSeason, SeasonalPattern, Trend, TrendDirection, WeeklyPattern};
use crate::history::TimeSeries;
use chrono::{DateTime, Datelike, Utc};
use std::collections::{BTreeMap, HashSet};

/// Width of a co-occurrence window
pub const WINDOW_SECS: i64 = 15 * 60;

/// A season needs more than this many pooled timestamps to be scored
pub const MIN_SEASON_SAMPLES: usize = 10;

/// Ratio above which a weekday or weekend bias counts toward confidence
const WEEKLY_BIAS_THRESHOLD: f64 = 0.7;

/// Trend strength above which a trend counts toward confidence
const TREND_STRENGTH_THRESHOLD: f64 = 0.2;

/// Start of the 15-minute window containing `ts`, as a Unix timestamp
pub fn window_start(ts: DateTime<Utc>) -> i64 {
    ts.timestamp().div_euclid(WINDOW_SECS) * WINDOW_SECS
}

fn windows(timestamps: &[DateTime<Utc>]) -> HashSet<i64> {
    timestamps.iter().map(|ts| window_start(*ts)).collect()
}

/// Co-occurrence correlation of two timestamp sets
///
/// `co / total * 2 - 1` where `co` counts windows holding changes from both
/// entities and `total` counts windows holding changes from either.
/// Returns 0.0 when either side is empty.
pub fn co_occurrence_correlation(a: &[DateTime<Utc>], b: &[DateTime<Utc>]) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let windows_a = windows(a);
    let windows_b = windows(b);

    let co_occurrence = windows_a.intersection(&windows_b).count();
    let total = windows_a.union(&windows_b).count();
    if total == 0 {
        return 0.0;
    }

    (co_occurrence as f64 / total as f64 * 2.0 - 1.0).clamp(-1.0, 1.0)
}

/// Historical correlation of two state series
pub fn historical_correlation(series1: &TimeSeries, series2: &TimeSeries) -> f64 {
    co_occurrence_correlation(&series1.timestamps(), &series2.timestamps())
}

/// Per-season overlap of the pair's exact timestamps
pub fn seasonal_pattern(ts1: &[DateTime<Utc>], ts2: &[DateTime<Utc>]) -> SeasonalPattern {
    let mut seasonal_strength = BTreeMap::new();

    for &season in PatternSeason::all() {
        let in_season = |ts: &&DateTime<Utc>| PatternSeason::from_month(ts.month()) == season;
        let set1: HashSet<DateTime<Utc>> = ts1.iter().filter(in_season).copied().collect();
        let set2: HashSet<DateTime<Utc>> = ts2.iter().filter(in_season).copied().collect();

        let pooled = ts1.iter().filter(in_season).count() + ts2.iter().filter(in_season).count();
        if pooled <= MIN_SEASON_SAMPLES {
            continue;
        }

        let union = set1.union(&set2).count();
        if union == 0 {
            continue;
        }
        let intersection = set1.intersection(&set2).count();
        seasonal_strength.insert(season, intersection as f64 / union as f64);
    }

    let mut strongest_season: Option<(PatternSeason, f64)> = None;
    for (&season, &strength) in &seasonal_strength {
        match strongest_season {
            Some((_, best)) if best >= strength => {}
            _ => strongest_season = Some((season, strength)),
        }
    }

    SeasonalPattern {
        seasonal_strength,
        strongest_season: strongest_season.map(|(season, _)| season),
    }
}

/// Weekday/weekend split of the pooled timestamps
pub fn weekly_pattern(ts1: &[DateTime<Utc>], ts2: &[DateTime<Utc>]) -> WeeklyPattern {
    let total = ts1.len() + ts2.len();
    if total == 0 {
        return WeeklyPattern::default();
    }

    let weekday_count = ts1
        .iter()
        .chain(ts2.iter())
        .filter(|ts| ts.weekday().num_days_from_monday() < 5)
        .count();
    let weekend_count = total - weekday_count;

    let weekday_ratio = weekday_count as f64 / total as f64;

    WeeklyPattern {
        weekday_ratio,
        weekend_ratio: 1.0 - weekday_ratio,
        prefers_weekday: weekday_count > weekend_count,
    }
}

/// Compare co-occurrence in the early and late halves of `[start, end]`
///
/// Only timestamps take part; states are ignored here.
pub fn trend(
    ts1: &[DateTime<Utc>],
    ts2: &[DateTime<Utc>],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Trend {
    let midpoint = start + (end - start) / 2;

    let split = |ts: &[DateTime<Utc>]| -> (Vec<DateTime<Utc>>, Vec<DateTime<Utc>>) {
        ts.iter().partition(|t| **t < midpoint)
    };
    let (early1, late1) = split(ts1);
    let (early2, late2) = split(ts2);

    let early_correlation = co_occurrence_correlation(&early1, &early2);
    let late_correlation = co_occurrence_correlation(&late1, &late2);

    let direction = if late_correlation > early_correlation {
        TrendDirection::Increasing
    } else if late_correlation < early_correlation {
        TrendDirection::Decreasing
    } else {
        TrendDirection::Stable
    };

    Trend {
        direction,
        strength: (late_correlation - early_correlation).abs(),
        early_correlation,
        late_correlation,
    }
}

/// Combine the individual statistics into a confidence in [0, 1]
pub fn confidence(
    historical_correlation: f64,
    seasonal: &SeasonalPattern,
    weekly: &WeeklyPattern,
    trend: &Trend,
) -> f64 {
    let mut confidence = historical_correlation.abs();

    if let Some(max_strength) = seasonal.max_strength() {
        confidence += 0.1 * max_strength;
    }

    if weekly.weekday_ratio > WEEKLY_BIAS_THRESHOLD || weekly.weekend_ratio > WEEKLY_BIAS_THRESHOLD {
        confidence += 0.1;
    }

    if trend.strength > TREND_STRENGTH_THRESHOLD {
        confidence += 0.1;
    }

    confidence.clamp(0.0, 1.0)
}
