//! # Synergy Engine
//!
//! Correlation analysis and context-aware scoring for home-automation
//! synergies: device pairings where one device's activity should drive
//! another's.
//!
//! ## Features
//!
//! - **History retrieval**: cached REST client for per-entity state history
//! - **Pattern detection**: co-occurrence, seasonal, weekly and trend
//!   statistics over a lookback window
//! - **Context scoring**: time, weather, energy and occupancy boosts blended
//!   into a final score
//! - **Synergy generation**: context-driven device pairings from a registry
//!   snapshot
//!
//! ## Modules
//!
//! - [`history`]: state-history client and cache
//! - [`patterns`]: correlation pattern detector
//! - [`context`]: context snapshot and score enhancer
//! - [`synergy`]: opportunity types and candidate generator
//! - [`engine`]: facade wiring everything from [`Config`]
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use synergy_engine::{Config, EntityInfo, SynergyEngine};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load_default();
//!     synergy_engine::logging::init(&config.logging)?;
//!
//!     let engine = SynergyEngine::from_config(&config)?;
//!
//!     // How strongly does the hallway light follow motion?
//!     if let Some(pattern) = engine
//!         .analyze_correlation_pattern("binary_sensor.hall_motion", "light.hall", None)
//!         .await
//!     {
//!         println!("correlation {:.2}", pattern.historical_correlation);
//!     }
//!
//!     // Score weather- and energy-driven pairings for this home
//!     let entities = vec![
//!         EntityInfo::new("weather.home"),
//!         EntityInfo::new("climate.living_room"),
//!         EntityInfo::new("sensor.electricity_price"),
//!         EntityInfo::new("switch.ev_charger"),
//!     ];
//!     for scored in engine.score_context_aware_synergies(&entities).await {
//!         println!("{} {:.4}", scored.opportunity.synergy_id, scored.score.enhanced_score);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod context;
pub mod engine;
pub mod history;
pub mod logging;
pub mod patterns;
pub mod synergy;

// Re-export top-level types for convenience
pub use config::{generate_default_config, Config, ConfigError, LoggingConfig};

pub use engine::{EngineError, ScoredSynergy, SynergyEngine};

pub use history::{
    HistoryCache, HistoryClient, HistoryConfig, HistoryError, HistoryResult, HistorySource,
    StateChangeRecord,
};

pub use patterns::{CorrelationPattern, PatternCache, PatternConfig, PatternDetector};

pub use context::{
    ContextCache, ContextEnhancer, ContextSnapshot, EnhancedScoreResult, EnrichmentSources,
    RetryPolicy,
};

pub use synergy::{ContextType, EntityInfo, GeneratorConfig, SynergyGenerator, SynergyOpportunity};
