//! Row identity: every fetched record gets a non-empty id before it reaches
//! a table, so rows can be keyed and deleted by id.
//!
//! Fallback chain per record at position `i`:
//! 1. the record's own `id` (non-empty string or number)
//! 2. a fresh token from the [`IdGenerator`]
//! 3. `row-<i>` when the generator is unavailable
//!
//! Ids are not stable across calls unless the source supplies them.
//! Positional ids can collide once arrays from separate calls are merged.
use serde_json::Value;
use uuid::Uuid;

use crate::record::{Fields, RowRecord};

/// Source of fresh row tokens. Returning `None` means "unavailable" and
/// falls through to positional ids.
pub trait IdGenerator {
    fn generate(&mut self) -> Option<String>;
}

/// Random v4 UUIDs.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn generate(&mut self) -> Option<String> {
        Some(Uuid::new_v4().to_string())
    }
}

impl<F> IdGenerator for F
where
    F: FnMut() -> Option<String>,
{
    fn generate(&mut self) -> Option<String> {
        self()
    }
}

/// Assign ids to raw records. Output length always equals input length.
pub fn assign_ids<G>(raw: Vec<Fields>, generator: &mut G) -> Vec<RowRecord>
where
    G: IdGenerator + ?Sized,
{
    raw.into_iter()
        .enumerate()
        .map(|(i, mut fields)| {
            let id = fields
                .remove("id")
                .and_then(|v| existing_id(&v))
                .or_else(|| generator.generate().filter(|t| !t.is_empty()))
                .unwrap_or_else(|| format!("row-{i}"));
            RowRecord::new(id, fields)
        })
        .collect()
}

/// [`assign_ids`] with random UUIDs.
pub fn with_ids(raw: Vec<Fields>) -> Vec<RowRecord> {
    assign_ids(raw, &mut UuidGenerator)
}

fn existing_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashSet;

    fn raw(values: Value) -> Vec<Fields> {
        values
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_object().unwrap().clone())
            .collect()
    }

    #[test]
    fn keeps_existing_ids_and_generates_missing() {
        let rows = with_ids(raw(json!([
            { "id": "B-1", "customer": "Acme" },
            { "customer": "Globex" },
            { "id": "", "customer": "Initech" },
            { "id": 42, "customer": "Umbrella" },
        ])));

        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].id, "B-1");
        assert_eq!(rows[3].id, "42");
        assert!(Uuid::parse_str(&rows[1].id).is_ok());
        assert!(Uuid::parse_str(&rows[2].id).is_ok());
        assert!(!rows[0].fields.contains_key("id"));
    }

    #[test]
    fn ids_are_pairwise_distinct() {
        let input = raw(json!([{}, {}, {}, { "id": "x" }, {}]));
        let rows = with_ids(input);
        let ids: HashSet<_> = rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids.len(), rows.len());
        assert!(rows.iter().all(|r| !r.id.is_empty()));
    }

    #[test]
    fn positional_fallback_when_generator_unavailable() {
        let mut unavailable = || -> Option<String> { None };
        let rows = assign_ids(raw(json!([{ "a": 1 }, { "id": "keep" }, {}])), &mut unavailable);
        let ids: Vec<_> = rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["row-0", "keep", "row-2"]);
    }
}
