//! Context-Aware Scoring
//!
//! Converts a base synergy score into a final score using the home's
//! current context.
//!
//! ## Architecture
//!
//! - **ContextSnapshot**: time of day, season, weather, energy, occupancy
//! - **Enrichment sources**: injected weather/pricing/carbon lookups
//! - **fetch_with_retry**: timeout + backoff + cancellation around a lookup
//! - **ContextCache**: short-TTL snapshot cache
//! - **ContextEnhancer**: boosts and the weighted final score
//!
//! ## Final score
//!
//! `base*0.40 + temporal*0.20 + weather*0.15 + energy*0.15 + behavior*0.10`,
//! clamped to [0, 1] and rounded to 4 decimals.

pub mod boosts;
mod cache;
mod enhancer;
mod retry;
mod snapshot;
mod sources;

pub use boosts::ContextBreakdown;
pub use cache::ContextCache;
pub use enhancer::{score_opportunity, ContextEnhancer, EnhancedScoreResult, DEFAULT_IMPACT};
pub use retry::{fetch_with_retry, RetryPolicy};
pub use snapshot::{ContextMetadata, ContextSnapshot, Season, TimeOfDay};
pub use sources::{
    CarbonReading, CarbonSource, EnrichmentError, EnrichmentSources, JsonEnrichmentClient,
    PricingReading, PricingSource, WeatherReading, WeatherSource,
};
