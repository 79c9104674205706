//! Synergy data types

use serde::{Deserialize, Serialize};

/// A device known to the registry, as seen by the generator
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EntityInfo {
    pub entity_id: String,
    #[serde(default)]
    pub friendly_name: Option<String>,
    #[serde(default)]
    pub device_class: Option<String>,
}

impl EntityInfo {
    pub fn new(entity_id: impl Into<String>) -> Self {
        Self {
            entity_id: entity_id.into(),
            friendly_name: None,
            device_class: None,
        }
    }

    /// Builder method: set the friendly name
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.friendly_name = Some(name.into());
        self
    }

    /// Builder method: set the device class
    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.device_class = Some(class.into());
        self
    }

    /// Domain prefix of the entity id ("light" for "light.kitchen")
    pub fn domain(&self) -> &str {
        self.entity_id
            .split_once('.')
            .map(|(domain, _)| domain)
            .unwrap_or("")
    }

    /// Lowercased id, name and class, for keyword matching
    pub(crate) fn search_text(&self) -> String {
        let mut text = self.entity_id.to_lowercase();
        for extra in [&self.friendly_name, &self.device_class].into_iter().flatten() {
            text.push(' ');
            text.push_str(&extra.to_lowercase());
        }
        text
    }
}

/// The kind of external context a generated synergy reacts to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ContextType {
    Weather,
    Energy,
    Carbon,
    Sports,
    Calendar,
}

impl std::fmt::Display for ContextType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContextType::Weather => write!(f, "weather"),
            ContextType::Energy => write!(f, "energy"),
            ContextType::Carbon => write!(f, "carbon"),
            ContextType::Sports => write!(f, "sports"),
            ContextType::Calendar => write!(f, "calendar"),
        }
    }
}

/// A candidate trigger → action automation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SynergyOpportunity {
    pub synergy_id: String,
    pub relationship_type: String,
    /// Trigger first, action devices after
    pub devices: Vec<String>,
    /// Base impact in [0, 1]; absent scores are treated as 0.5 when enhanced
    #[serde(default)]
    pub impact_score: Option<f64>,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub rationale: String,
    #[serde(default)]
    pub context_type: Option<ContextType>,
}

impl SynergyOpportunity {
    pub fn new(
        synergy_id: impl Into<String>,
        relationship_type: impl Into<String>,
        devices: Vec<String>,
        impact_score: f64,
    ) -> Self {
        Self {
            synergy_id: synergy_id.into(),
            relationship_type: relationship_type.into(),
            devices,
            impact_score: Some(impact_score),
            confidence: 0.0,
            rationale: String::new(),
            context_type: None,
        }
    }

    pub fn trigger_entity(&self) -> Option<&str> {
        self.devices.first().map(String::as_str)
    }

    pub fn action_entity(&self) -> Option<&str> {
        self.devices.last().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_domain_and_search_text() {
        let entity = EntityInfo::new("sensor.electricity_price")
            .name("Nord Pool Price")
            .class("monetary");

        assert_eq!(entity.domain(), "sensor");
        assert_eq!(
            entity.search_text(),
            "sensor.electricity_price nord pool price monetary"
        );
        assert_eq!(EntityInfo::new("nodomain").domain(), "");
    }

    #[test]
    fn test_opportunity_deserializes_without_score() {
        let json = r#"{"synergy_id": "s1", "relationship_type": "motion_to_light",
                       "devices": ["binary_sensor.hall", "light.hall"]}"#;
        let opp: SynergyOpportunity = serde_json::from_str(json).unwrap();

        assert_eq!(opp.impact_score, None);
        assert_eq!(opp.trigger_entity(), Some("binary_sensor.hall"));
        assert_eq!(opp.action_entity(), Some("light.hall"));
    }
}
