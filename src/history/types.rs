//! History data types
//!
//! - `StateChangeRecord`: one normalized state change from the provider
//! - `TimeSeries`: time-ascending (timestamp, state) pairs for one entity
//! - Response normalization for the provider's heterogeneous payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// A single state change reported by the history provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StateChangeRecord {
    pub entity_id: String,
    pub state: String,
    pub last_changed: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    #[serde(default)]
    pub attributes: HashMap<String, Value>,
}

impl StateChangeRecord {
    /// Create a record where `last_updated` equals `last_changed`
    pub fn new(entity_id: impl Into<String>, state: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            entity_id: entity_id.into(),
            state: state.into(),
            last_changed: at,
            last_updated: at,
            attributes: HashMap::new(),
        }
    }

    /// Builder method: add an attribute
    pub fn attribute(mut self, key: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }
}

/// Time-ascending state series for one entity
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeSeries {
    points: Vec<(DateTime<Utc>, String)>,
}

impl TimeSeries {
    /// Build a series from records in any order
    ///
    /// The provider does not guarantee ordering, so records are sorted by
    /// `last_changed` here.
    pub fn from_records(records: &[StateChangeRecord]) -> Self {
        let mut points: Vec<(DateTime<Utc>, String)> = records
            .iter()
            .map(|r| (r.last_changed, r.state.clone()))
            .collect();
        points.sort_by_key(|(ts, _)| *ts);
        Self { points }
    }

    pub fn points(&self) -> &[(DateTime<Utc>, String)] {
        &self.points
    }

    pub fn timestamps(&self) -> Vec<DateTime<Utc>> {
        self.points.iter().map(|(ts, _)| *ts).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Normalize a raw provider payload into records
///
/// Accepted shapes:
/// - `[[{state}, ...], ...]` (one inner list per entity)
/// - `[{state}, ...]`
/// - `{"entity_id": [{state}, ...], ...}`
/// - `null` or any other scalar (no data)
///
/// `fallback_entity` fills in records that omit `entity_id`.
pub fn normalize_response(payload: &Value, fallback_entity: &str) -> Vec<StateChangeRecord> {
    let mut records = Vec::new();

    match payload {
        Value::Array(items) => {
            for item in items {
                match item {
                    Value::Array(inner) => {
                        records.extend(inner.iter().filter_map(|v| parse_state(v, fallback_entity)));
                    }
                    Value::Object(_) => records.extend(parse_state(item, fallback_entity)),
                    _ => {}
                }
            }
        }
        Value::Object(map) => {
            for (key, states) in map {
                if let Value::Array(inner) = states {
                    records.extend(inner.iter().filter_map(|v| parse_state(v, key)));
                }
            }
        }
        _ => {}
    }

    records
}

/// Parse one state object; `None` when no timestamp can be recovered
fn parse_state(value: &Value, fallback_entity: &str) -> Option<StateChangeRecord> {
    let obj = value.as_object()?;

    let last_changed = obj.get("last_changed").and_then(parse_timestamp);
    let last_updated = obj.get("last_updated").and_then(parse_timestamp);
    let (last_changed, last_updated) = match (last_changed, last_updated) {
        (Some(c), Some(u)) => (c, u),
        (Some(c), None) => (c, c),
        (None, Some(u)) => (u, u),
        (None, None) => {
            tracing::debug!(entity_id = %fallback_entity, "Dropping state without timestamp");
            return None;
        }
    };

    let entity_id = obj
        .get("entity_id")
        .and_then(Value::as_str)
        .unwrap_or(fallback_entity)
        .to_string();

    let state = match obj.get("state") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => "unknown".to_string(),
        Some(other) => other.to_string(),
    };

    let attributes = obj
        .get("attributes")
        .and_then(Value::as_object)
        .map(|m| m.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
        .unwrap_or_default();

    Some(StateChangeRecord {
        entity_id,
        state,
        last_changed,
        last_updated,
        attributes,
    })
}

fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    let raw = value.as_str()?;
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}
