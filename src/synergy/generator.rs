//! Synergy Candidate Generator
//!
//! Enumerates context-driven device pairings (weather, energy price,
//! carbon intensity, sports scores, calendars) from a registry snapshot.
//! Pure and deterministic: the same entity list always yields the same
//! opportunities in the same order.

use super::types::{ContextType, EntityInfo, SynergyOpportunity};

/// Limits for one generation pass
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Maximum opportunities returned in total
    pub max_synergies: usize,
    /// Maximum devices considered, and opportunities emitted, per archetype
    pub max_per_type: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            max_synergies: 30,
            max_per_type: 5,
        }
    }
}

/// What an entity can contribute to a synergy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Weather,
    EnergyPrice,
    Carbon,
    Sports,
    Calendar,
    Climate,
    Cover,
    Light,
    Media,
    HighPower,
}

const PRICE_KEYWORDS: &[&str] = &["electricity_price", "energy_price", "tariff", "nordpool", "spot_price"];
const CARBON_KEYWORDS: &[&str] = &["carbon_intensity", "co2_intensity", "co2_signal", "grid_intensity"];
const SPORTS_KEYWORDS: &[&str] = &["team_tracker", "sports", "nfl", "nba", "nhl", "mlb", "premier_league"];
const HIGH_POWER_KEYWORDS: &[&str] = &[
    "ev_charger",
    "charger",
    "dryer",
    "washer",
    "dishwasher",
    "pool_pump",
    "heat_pump",
    "water_heater",
];

fn has_keyword(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| text.contains(k))
}

impl Role {
    fn matches(&self, entity: &EntityInfo) -> bool {
        let domain = entity.domain();
        let text = entity.search_text();

        match self {
            Role::Weather => domain == "weather",
            Role::EnergyPrice => domain == "sensor" && has_keyword(&text, PRICE_KEYWORDS),
            Role::Carbon => domain == "sensor" && has_keyword(&text, CARBON_KEYWORDS),
            Role::Sports => domain == "sensor" && has_keyword(&text, SPORTS_KEYWORDS),
            Role::Calendar => domain == "calendar",
            Role::Climate => domain == "climate",
            Role::Cover => domain == "cover",
            Role::Light => domain == "light",
            Role::Media => domain == "media_player",
            Role::HighPower => {
                domain == "water_heater"
                    || (matches!(domain, "switch" | "climate") && has_keyword(&text, HIGH_POWER_KEYWORDS))
            }
        }
    }
}

/// A known context → device pairing
struct Archetype {
    relationship_type: &'static str,
    context_type: ContextType,
    trigger: Role,
    action: Role,
    impact: f64,
    confidence: f64,
    rationale: &'static str,
}

const ARCHETYPES: &[Archetype] = &[
    Archetype {
        relationship_type: "weather_to_climate",
        context_type: ContextType::Weather,
        trigger: Role::Weather,
        action: Role::Climate,
        impact: 0.80,
        confidence: 0.85,
        rationale: "Pre-heat or pre-cool ahead of forecast temperature changes",
    },
    Archetype {
        relationship_type: "weather_to_cover",
        context_type: ContextType::Weather,
        trigger: Role::Weather,
        action: Role::Cover,
        impact: 0.70,
        confidence: 0.80,
        rationale: "Close covers on hot sunny days to cut heat gain",
    },
    Archetype {
        relationship_type: "weather_to_light",
        context_type: ContextType::Weather,
        trigger: Role::Weather,
        action: Role::Light,
        impact: 0.60,
        confidence: 0.70,
        rationale: "Raise lighting on dark, overcast days",
    },
    Archetype {
        relationship_type: "energy_price_to_scheduling",
        context_type: ContextType::Energy,
        trigger: Role::EnergyPrice,
        action: Role::HighPower,
        impact: 0.85,
        confidence: 0.80,
        rationale: "Run heavy loads when electricity is cheapest",
    },
    Archetype {
        relationship_type: "carbon_to_scheduling",
        context_type: ContextType::Carbon,
        trigger: Role::Carbon,
        action: Role::HighPower,
        impact: 0.75,
        confidence: 0.75,
        rationale: "Shift heavy loads to low-carbon grid periods",
    },
    Archetype {
        relationship_type: "sports_to_light",
        context_type: ContextType::Sports,
        trigger: Role::Sports,
        action: Role::Light,
        impact: 0.65,
        confidence: 0.70,
        rationale: "Flash team colors when your team scores",
    },
    Archetype {
        relationship_type: "sports_to_media",
        context_type: ContextType::Sports,
        trigger: Role::Sports,
        action: Role::Media,
        impact: 0.60,
        confidence: 0.65,
        rationale: "Turn on the game when kickoff approaches",
    },
    Archetype {
        relationship_type: "calendar_to_light",
        context_type: ContextType::Calendar,
        trigger: Role::Calendar,
        action: Role::Light,
        impact: 0.60,
        confidence: 0.70,
        rationale: "Prepare lighting ahead of scheduled events",
    },
];

const TRIPLE_RELATIONSHIP: &str = "energy_carbon_to_scheduling";
const TRIPLE_RATIONALE: &str = "Run heavy loads when power is both cheap and clean";

/// Generates context-aware synergy candidates
pub struct SynergyGenerator {
    config: GeneratorConfig,
}

impl SynergyGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Enumerate every archetype over `entities`, within the configured caps
    pub fn generate_context_aware_synergies(&self, entities: &[EntityInfo]) -> Vec<SynergyOpportunity> {
        let limit = self.config.max_per_type;
        let mut opportunities = Vec::new();

        for archetype in ARCHETYPES {
            if opportunities.len() >= self.config.max_synergies {
                break;
            }

            let triggers = self.candidates(entities, archetype.trigger);
            let actions = self.candidates(entities, archetype.action);

            let pairs = triggers
                .iter()
                .flat_map(|t| actions.iter().map(move |a| (*t, *a)))
                .filter(|(t, a)| t.entity_id != a.entity_id)
                .take(limit);

            for (trigger, action) in pairs {
                if opportunities.len() >= self.config.max_synergies {
                    break;
                }
                opportunities.push(build(
                    archetype.relationship_type,
                    archetype.context_type,
                    vec![trigger.entity_id.clone(), action.entity_id.clone()],
                    archetype.impact,
                    archetype.confidence,
                    archetype.rationale,
                ));
            }
        }

        self.push_triples(entities, &mut opportunities);

        tracing::info!(
            entities = entities.len(),
            synergies = opportunities.len(),
            "Generated context-aware synergies"
        );

        opportunities
    }

    /// Price + carbon + device, when both signals are available
    fn push_triples(&self, entities: &[EntityInfo], opportunities: &mut Vec<SynergyOpportunity>) {
        let price = self.candidates(entities, Role::EnergyPrice).into_iter().next();
        let carbon = self.candidates(entities, Role::Carbon).into_iter().next();
        let (price, carbon) = match (price, carbon) {
            (Some(p), Some(c)) if p.entity_id != c.entity_id => (p, c),
            _ => return,
        };

        for device in self.candidates(entities, Role::HighPower) {
            if opportunities.len() >= self.config.max_synergies {
                break;
            }
            opportunities.push(build(
                TRIPLE_RELATIONSHIP,
                ContextType::Energy,
                vec![
                    price.entity_id.clone(),
                    carbon.entity_id.clone(),
                    device.entity_id.clone(),
                ],
                0.90,
                0.80,
                TRIPLE_RATIONALE,
            ));
        }
    }

    fn candidates<'a>(&self, entities: &'a [EntityInfo], role: Role) -> Vec<&'a EntityInfo> {
        entities
            .iter()
            .filter(|e| role.matches(e))
            .take(self.config.max_per_type)
            .collect()
    }
}

impl Default for SynergyGenerator {
    fn default() -> Self {
        Self::new(GeneratorConfig::default())
    }
}

fn build(
    relationship_type: &str,
    context_type: ContextType,
    devices: Vec<String>,
    impact: f64,
    confidence: f64,
    rationale: &str,
) -> SynergyOpportunity {
    SynergyOpportunity {
        synergy_id: format!("{}:{}", relationship_type, devices.join("+")),
        relationship_type: relationship_type.to_string(),
        devices,
        impact_score: Some(impact),
        confidence,
        rationale: rationale.to_string(),
        context_type: Some(context_type),
    }
}
