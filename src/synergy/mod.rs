//! Synergy opportunities
//!
//! A synergy is a trigger → action pairing between devices. Opportunities
//! come from callers (pattern mining, device pairing) or from the
//! context-aware generator in this module, and are scored by
//! [`crate::context::ContextEnhancer`].

mod generator;
mod types;

pub use generator::{GeneratorConfig, SynergyGenerator};
pub use types::{ContextType, EntityInfo, SynergyOpportunity};
