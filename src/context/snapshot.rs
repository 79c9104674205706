//! Context snapshot types
//!
//! Temporal fields are always derived locally from a clock reading.
//! Enrichment fields stay `None` (or `false` for `peak_hours`) when their
//! source is unavailable.

use chrono::{DateTime, Datelike, TimeZone, Timelike, Weekday};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    /// 05:00 - 11:59
    Morning,
    /// 12:00 - 16:59
    Afternoon,
    /// 17:00 - 20:59
    Evening,
    /// 21:00 - 04:59
    Night,
}

impl TimeOfDay {
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            5..=11 => TimeOfDay::Morning,
            12..=16 => TimeOfDay::Afternoon,
            17..=20 => TimeOfDay::Evening,
            _ => TimeOfDay::Night,
        }
    }

    /// Evening or night
    pub fn is_dark(&self) -> bool {
        matches!(self, TimeOfDay::Evening | TimeOfDay::Night)
    }
}

impl std::fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimeOfDay::Morning => write!(f, "morning"),
            TimeOfDay::Afternoon => write!(f, "afternoon"),
            TimeOfDay::Evening => write!(f, "evening"),
            TimeOfDay::Night => write!(f, "night"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Fall,
}

impl Season {
    pub fn from_month(month: u32) -> Self {
        match month {
            12 | 1 | 2 => Season::Winter,
            3..=5 => Season::Spring,
            6..=8 => Season::Summer,
            _ => Season::Fall,
        }
    }

    /// Winter or summer, when heating and cooling dominate
    pub fn is_extreme(&self) -> bool {
        matches!(self, Season::Winter | Season::Summer)
    }
}

impl std::fmt::Display for Season {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Season::Winter => write!(f, "winter"),
            Season::Spring => write!(f, "spring"),
            Season::Summer => write!(f, "summer"),
            Season::Fall => write!(f, "fall"),
        }
    }
}

/// Point-in-time view of the home's surroundings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContextSnapshot {
    pub time_of_day: TimeOfDay,
    pub day_of_week: String,
    pub season: Season,
    pub weather: Option<String>,
    /// Degrees Celsius
    pub temperature: Option<f64>,
    pub energy_cost: Option<f64>,
    #[serde(default)]
    pub peak_hours: bool,
    /// gCO2/kWh
    pub carbon_intensity: Option<f64>,
    pub user_presence: Option<bool>,
    pub activity_pattern: Option<String>,
}

impl ContextSnapshot {
    /// Snapshot with only the temporal fields filled in
    pub fn temporal<Tz: TimeZone>(now: &DateTime<Tz>) -> Self {
        Self {
            time_of_day: TimeOfDay::from_hour(now.hour()),
            day_of_week: weekday_name(now.weekday()).to_string(),
            season: Season::from_month(now.month()),
            weather: None,
            temperature: None,
            energy_cost: None,
            peak_hours: false,
            carbon_intensity: None,
            user_presence: None,
            activity_pattern: None,
        }
    }

    /// Builder method: set weather condition and temperature
    pub fn weather(mut self, condition: impl Into<String>, temperature: Option<f64>) -> Self {
        self.weather = Some(condition.into());
        self.temperature = temperature;
        self
    }

    /// Builder method: set energy price and peak flag
    pub fn energy(mut self, cost: Option<f64>, peak_hours: bool) -> Self {
        self.energy_cost = cost;
        self.peak_hours = peak_hours;
        self
    }

    /// Builder method: set grid carbon intensity
    pub fn carbon(mut self, intensity: f64) -> Self {
        self.carbon_intensity = Some(intensity);
        self
    }

    /// Builder method: set occupancy
    pub fn presence(mut self, present: bool) -> Self {
        self.user_presence = Some(present);
        self
    }

    /// Builder method: set activity pattern ("sleeping", "active", ...)
    pub fn activity(mut self, pattern: impl Into<String>) -> Self {
        self.activity_pattern = Some(pattern.into());
        self
    }

    /// Excerpt returned alongside enhanced scores
    pub fn metadata(&self) -> ContextMetadata {
        ContextMetadata {
            time_of_day: self.time_of_day,
            day_of_week: self.day_of_week.clone(),
            season: self.season,
            weather: self.weather.clone(),
            temperature: self.temperature,
            peak_hours: self.peak_hours,
            carbon_intensity: self.carbon_intensity,
        }
    }
}

/// Subset of the snapshot echoed in score results
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContextMetadata {
    pub time_of_day: TimeOfDay,
    pub day_of_week: String,
    pub season: Season,
    pub weather: Option<String>,
    pub temperature: Option<f64>,
    pub peak_hours: bool,
    pub carbon_intensity: Option<f64>,
}

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_time_of_day_boundaries() {
        assert_eq!(TimeOfDay::from_hour(4), TimeOfDay::Night);
        assert_eq!(TimeOfDay::from_hour(5), TimeOfDay::Morning);
        assert_eq!(TimeOfDay::from_hour(12), TimeOfDay::Afternoon);
        assert_eq!(TimeOfDay::from_hour(17), TimeOfDay::Evening);
        assert_eq!(TimeOfDay::from_hour(21), TimeOfDay::Night);
        assert!(TimeOfDay::Night.is_dark());
        assert!(!TimeOfDay::Morning.is_dark());
    }

    #[test]
    fn test_season_from_month() {
        assert_eq!(Season::from_month(1), Season::Winter);
        assert_eq!(Season::from_month(4), Season::Spring);
        assert_eq!(Season::from_month(8), Season::Summer);
        assert_eq!(Season::from_month(11), Season::Fall);
    }

    #[test]
    fn test_temporal_snapshot() {
        // Saturday evening in July
        let now = Utc.with_ymd_and_hms(2024, 7, 13, 19, 30, 0).unwrap();
        let snapshot = ContextSnapshot::temporal(&now);

        assert_eq!(snapshot.time_of_day, TimeOfDay::Evening);
        assert_eq!(snapshot.day_of_week, "Saturday");
        assert_eq!(snapshot.season, Season::Summer);
        assert!(snapshot.weather.is_none());
        assert!(snapshot.energy_cost.is_none());
        assert!(!snapshot.peak_hours);
        assert!(snapshot.carbon_intensity.is_none());
    }

    #[test]
    fn test_snapshot_serializes_lowercase_enums() {
        let now = Utc.with_ymd_and_hms(2024, 1, 8, 8, 0, 0).unwrap();
        let snapshot = ContextSnapshot::temporal(&now).weather("sunny", Some(12.0));

        let json = serde_json::to_string(&snapshot.metadata()).unwrap();
        assert!(json.contains("\"time_of_day\":\"morning\""));
        assert!(json.contains("\"season\":\"winter\""));
        assert!(json.contains("\"weather\":\"sunny\""));
    }
}
