use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Open field map of a record: field name to scalar/string JSON value.
pub type Fields = Map<String, Value>;

/// One row of a list or table section.
///
/// `id` is assigned once at ingestion (see [`crate::identity`]) and never
/// changes afterwards. All other fields are kept as an open map so any
/// fixture shape can be rendered against a column schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowRecord {
    pub id: String,
    #[serde(flatten)]
    pub fields: Fields,
}

impl RowRecord {
    pub fn new(id: impl Into<String>, fields: Fields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Raw value of a field. `"id"` resolves to the row id.
    pub fn get(&self, key: &str) -> Option<Value> {
        if key == "id" {
            return Some(Value::String(self.id.clone()));
        }
        self.fields.get(key).cloned()
    }

    /// Display text of a cell; absent keys render as an empty string.
    pub fn cell_text(&self, key: &str) -> String {
        if key == "id" {
            return self.id.clone();
        }
        self.fields.get(key).map(value_text).unwrap_or_default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(key.into(), value.into());
    }
}

/// Render a JSON value the way a table cell shows it.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record() -> RowRecord {
        let fields = json!({ "customer": "Acme", "weight": 12.5, "hazardous": false, "eta": null });
        match fields {
            Value::Object(map) => RowRecord::new("B-1", map),
            _ => unreachable!(),
        }
    }

    #[test]
    fn cells_render_scalars_and_blank_for_missing() {
        let row = record();
        assert_eq!(row.cell_text("customer"), "Acme");
        assert_eq!(row.cell_text("weight"), "12.5");
        assert_eq!(row.cell_text("hazardous"), "false");
        assert_eq!(row.cell_text("eta"), "");
        assert_eq!(row.cell_text("nope"), "");
        assert_eq!(row.cell_text("id"), "B-1");
    }

    #[test]
    fn serializes_flat() {
        let row = record();
        let value = serde_json::to_value(&row).unwrap();
        assert_eq!(value["id"], "B-1");
        assert_eq!(value["customer"], "Acme");
        let back: RowRecord = serde_json::from_value(value).unwrap();
        assert_eq!(back, row);
    }
}
