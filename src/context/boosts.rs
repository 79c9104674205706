//! Context Boosts
//!
//! Pure multipliers derived from a snapshot and a relationship type.
//! Relationship types are matched by substring, so "motion_to_light_hall"
//! is treated as "motion_to_light". Unmatched relationships get 1.0.

use super::snapshot::{ContextSnapshot, TimeOfDay};
use serde::{Deserialize, Serialize};

/// Weight of the base impact score in the final score
pub const BASE_WEIGHT: f64 = 0.40;
pub const TEMPORAL_WEIGHT: f64 = 0.20;
pub const WEATHER_WEIGHT: f64 = 0.15;
pub const ENERGY_WEIGHT: f64 = 0.15;
pub const BEHAVIOR_WEIGHT: f64 = 0.10;

/// Relationships whose automations draw significant power
const ENERGY_INTENSIVE: &[&str] = &[
    "temp_to_climate",
    "motion_to_climate",
    "presence_to_climate",
    "temp_to_fan",
    "humidity_to_fan",
];

const EXPENSIVE_RATE: f64 = 0.15;
const HIGH_CARBON: f64 = 400.0;
const LOW_CARBON: f64 = 200.0;

/// The four boosts and the base they were applied to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ContextBreakdown {
    pub base_score: f64,
    pub temporal_boost: f64,
    pub weather_boost: f64,
    pub energy_boost: f64,
    pub behavior_boost: f64,
}

impl ContextBreakdown {
    /// Compute every boost for `relationship_type` under `snapshot`
    pub fn compute(base_score: f64, relationship_type: &str, snapshot: &ContextSnapshot) -> Self {
        Self {
            base_score,
            temporal_boost: temporal_boost(relationship_type, snapshot),
            weather_boost: weather_boost(relationship_type, snapshot),
            energy_boost: energy_boost(relationship_type, snapshot),
            behavior_boost: behavior_boost(relationship_type, snapshot),
        }
    }

    /// Weighted blend, clamped to [0, 1] and rounded to 4 decimals
    pub fn enhanced_score(&self) -> f64 {
        let blended = self.base_score * BASE_WEIGHT
            + self.temporal_boost * TEMPORAL_WEIGHT
            + self.weather_boost * WEATHER_WEIGHT
            + self.energy_boost * ENERGY_WEIGHT
            + self.behavior_boost * BEHAVIOR_WEIGHT;

        (blended.clamp(0.0, 1.0) * 10_000.0).round() / 10_000.0
    }
}

fn matches_any(relationship_type: &str, patterns: &[&str]) -> bool {
    patterns.iter().any(|p| relationship_type.contains(p))
}

fn is_lighting_trigger(relationship_type: &str) -> bool {
    matches_any(relationship_type, &["motion_to_light", "occupancy_to_light"])
}

pub fn temporal_boost(relationship_type: &str, snapshot: &ContextSnapshot) -> f64 {
    let tod = snapshot.time_of_day;

    if is_lighting_trigger(relationship_type) {
        if tod.is_dark() {
            1.2
        } else if tod == TimeOfDay::Morning {
            1.1
        } else {
            1.0
        }
    } else if matches_any(relationship_type, &["temp_to_climate", "motion_to_climate"]) {
        if snapshot.season.is_extreme() {
            1.15
        } else {
            1.0
        }
    } else if relationship_type.contains("door_to_lock") {
        if tod.is_dark() {
            1.2
        } else {
            1.0
        }
    } else {
        1.0
    }
}

pub fn weather_boost(relationship_type: &str, snapshot: &ContextSnapshot) -> f64 {
    let condition = snapshot
        .weather
        .as_deref()
        .map(str::to_lowercase)
        .unwrap_or_default();
    let sunny = condition.contains("sunny");
    let cloudy = matches_any(&condition, &["cloudy", "overcast"]);
    let wet = matches_any(&condition, &["rain", "storm"]);
    let temperature = snapshot.temperature;

    if is_lighting_trigger(relationship_type) {
        let mild = temperature.map_or(false, |t| (8.0..=18.0).contains(&t));
        if sunny && mild {
            0.7
        } else if cloudy {
            1.1
        } else if wet {
            1.2
        } else {
            1.0
        }
    } else if relationship_type.contains("temp_to_climate") {
        match temperature {
            Some(t) if !(5.0..=25.0).contains(&t) => 1.2,
            Some(t) if (15.0..=22.0).contains(&t) => 0.9,
            _ => 1.0,
        }
    } else if relationship_type.contains("window_to_climate") {
        if wet || condition.contains("wind") {
            1.3
        } else if sunny && temperature.map_or(false, |t| t > 20.0) {
            1.1
        } else {
            1.0
        }
    } else {
        1.0
    }
}

pub fn energy_boost(relationship_type: &str, snapshot: &ContextSnapshot) -> f64 {
    if !matches_any(relationship_type, ENERGY_INTENSIVE) {
        return 1.0;
    }

    let mut boost = if snapshot.peak_hours {
        0.85
    } else if snapshot.energy_cost.map_or(false, |c| c > EXPENSIVE_RATE) {
        0.9
    } else {
        1.1
    };

    match snapshot.carbon_intensity {
        Some(c) if c > HIGH_CARBON => boost *= 0.95,
        Some(c) if c < LOW_CARBON => boost *= 1.05,
        _ => {}
    }

    boost
}

pub fn behavior_boost(relationship_type: &str, snapshot: &ContextSnapshot) -> f64 {
    let presence = snapshot.user_presence;

    let mut boost = if matches_any(relationship_type, &["presence_to_light", "presence_to_climate"]) {
        match presence {
            Some(true) => 1.2,
            Some(false) => 0.7,
            None => 1.0,
        }
    } else if matches_any(relationship_type, &["door_to_lock", "door_to_notify"]) {
        if presence == Some(false) {
            1.3
        } else {
            1.0
        }
    } else {
        1.0
    };

    match snapshot.activity_pattern.as_deref() {
        Some("sleeping") if matches_any(relationship_type, &["light", "media"]) => boost *= 0.6,
        Some("active") if relationship_type.contains("motion_to_light") => boost *= 1.1,
        _ => {}
    }

    boost
}
