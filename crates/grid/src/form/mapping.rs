use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::record::{Fields, value_text};

/// Lookup that fills sibling fields when a trigger field changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingRule {
    /// Field of each `data` row compared against the trigger's new value.
    pub key_field: String,
    pub data: Vec<Fields>,
    pub mapped_fields: Vec<String>,
}

impl MappingRule {
    fn find(&self, value: &str) -> Option<&Fields> {
        self.data.iter().find(|row| {
            row.get(&self.key_field)
                .map(|v| value_text(v) == value)
                .unwrap_or(false)
        })
    }
}

/// Trigger field name to its mapping rule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MappingConfig(IndexMap<String, MappingRule>);

impl MappingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, trigger: impl Into<String>, rule: MappingRule) -> Self {
        self.0.insert(trigger.into(), rule);
        self
    }

    pub fn rule(&self, trigger: &str) -> Option<&MappingRule> {
        self.0.get(trigger)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Cross-populate `target` after `trigger` took `new_value`. On a hit
    /// every mapped field is copied from the matching data row (fields the
    /// row lacks become `""`); on a miss every mapped field is cleared.
    /// Returns false when `trigger` has no rule.
    pub fn apply(&self, trigger: &str, new_value: &Value, target: &mut Fields) -> bool {
        let Some(rule) = self.0.get(trigger) else {
            return false;
        };
        let key = value_text(new_value);
        match rule.find(&key) {
            Some(source) => {
                debug!(trigger, key = %key, "mapping hit");
                for field in &rule.mapped_fields {
                    let value = source
                        .get(field)
                        .cloned()
                        .unwrap_or_else(|| Value::String(String::new()));
                    target.insert(field.clone(), value);
                }
            }
            None => {
                debug!(trigger, key = %key, "mapping miss");
                for field in &rule.mapped_fields {
                    target.insert(field.clone(), Value::String(String::new()));
                }
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn vas() -> MappingConfig {
        serde_json::from_value(json!({
            "vasId": {
                "keyField": "vasId",
                "data": [
                    { "vasId": "VAS001", "vasName": "Insurance", "rate": 150 },
                    { "vasId": "VAS002", "vasName": "Fumigation", "rate": 80 }
                ],
                "mappedFields": ["vasName", "rate"]
            }
        }))
        .unwrap()
    }

    #[test]
    fn hit_copies_and_miss_clears() {
        let mapping = vas();
        let mut row = Fields::new();

        assert!(mapping.apply("vasId", &json!("VAS001"), &mut row));
        assert_eq!(row["vasName"], json!("Insurance"));
        assert_eq!(row["rate"], json!(150));

        assert!(mapping.apply("vasId", &json!("VAS999"), &mut row));
        assert_eq!(row["vasName"], json!(""));
        assert_eq!(row["rate"], json!(""));

        assert!(!mapping.apply("qty", &json!(3), &mut row));
    }
}
