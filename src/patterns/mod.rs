//! Long-Term Pattern Detection
//!
//! Statistical summaries of how two entities change state together:
//!
//! - **Historical correlation**: co-occurrence in 15-minute windows
//! - **Seasonal pattern**: per-season timestamp overlap
//! - **Weekly pattern**: weekday vs weekend bias
//! - **Trend**: early vs late half of the analysis window
//! - **Confidence**: the above combined into [0, 1]

mod detector;
pub mod stats;
mod types;

pub use detector::{PatternCache, PatternConfig, PatternDetector, PatternError};
pub use types::{
    CorrelationPattern, PatternSeason, SeasonalPattern, Trend, TrendDirection, WeeklyPattern,
};
