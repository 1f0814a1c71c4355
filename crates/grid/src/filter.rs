//! Filter bar shown above a table.
//!
//! Each [`FilterFieldSpec`] contributes one key to the [`FilterValues`]
//! handed to the search handler. The bar never filters rows itself; the
//! page that owns the rows decides what a search means.
use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::SchemaError;
use crate::options::{self, SelectOption};

/// Current filter values keyed by field name, in schema order. Unset fields
/// are present with an empty string.
pub type FilterValues = IndexMap<String, String>;

pub type SearchHandler = Box<dyn FnMut(&FilterValues) + Send>;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FilterKind {
    Text,
    Date,
    Select {
        #[serde(default)]
        options: Vec<SelectOption>,
    },
    /// Select with type-ahead narrowing of the option list.
    FilterSelect {
        #[serde(default)]
        options: Vec<SelectOption>,
    },
}

impl FilterKind {
    pub fn options(&self) -> Option<&[SelectOption]> {
        match self {
            FilterKind::Select { options } | FilterKind::FilterSelect { options } => Some(options),
            FilterKind::Text | FilterKind::Date => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterFieldSpec {
    pub name: String,
    pub label: String,
    #[serde(flatten)]
    pub kind: FilterKind,
}

impl FilterFieldSpec {
    pub fn text(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::with_kind(name, label, FilterKind::Text)
    }

    pub fn date(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::with_kind(name, label, FilterKind::Date)
    }

    pub fn select<O: Into<SelectOption>>(
        name: impl Into<String>,
        label: impl Into<String>,
        options: impl IntoIterator<Item = O>,
    ) -> Self {
        Self::with_kind(
            name,
            label,
            FilterKind::Select {
                options: options::options(options),
            },
        )
    }

    pub fn filter_select<O: Into<SelectOption>>(
        name: impl Into<String>,
        label: impl Into<String>,
        options: impl IntoIterator<Item = O>,
    ) -> Self {
        Self::with_kind(
            name,
            label,
            FilterKind::FilterSelect {
                options: options::options(options),
            },
        )
    }

    fn with_kind(name: impl Into<String>, label: impl Into<String>, kind: FilterKind) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            kind,
        }
    }

    /// Options narrowed by a type-ahead query (only meaningful for filterSelect).
    pub fn matching_options(&self, query: &str) -> Vec<&SelectOption> {
        let needle = query.to_lowercase();
        self.kind
            .options()
            .unwrap_or(&[])
            .iter()
            .filter(|o| needle.is_empty() || o.label.to_lowercase().contains(&needle))
            .collect()
    }
}

/// Filter bar state: one value slot per field plus the search handler.
pub struct FilterBar {
    fields: Vec<FilterFieldSpec>,
    values: FilterValues,
    on_search: Option<SearchHandler>,
}

impl FilterBar {
    pub fn new(fields: Vec<FilterFieldSpec>) -> Self {
        let values = fields
            .iter()
            .map(|f| (f.name.clone(), String::new()))
            .collect();
        Self {
            fields,
            values,
            on_search: None,
        }
    }

    pub fn on_search(mut self, handler: impl FnMut(&FilterValues) + Send + 'static) -> Self {
        self.on_search = Some(Box::new(handler));
        self
    }

    pub fn fields(&self) -> &[FilterFieldSpec] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FilterFieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn values(&self) -> &FilterValues {
        &self.values
    }

    pub fn value(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Set a field's value. Select-like fields only take one of their option
    /// values; date fields take `YYYY-MM-DD`. An empty value always clears.
    pub fn set_value(&mut self, name: &str, value: impl Into<String>) -> Result<(), SchemaError> {
        let value = value.into();
        let field = self
            .field(name)
            .ok_or_else(|| SchemaError::UnknownField(name.to_string()))?;

        if !value.is_empty() {
            match &field.kind {
                FilterKind::Text => {}
                FilterKind::Date => {
                    NaiveDate::parse_from_str(&value, DATE_FORMAT).map_err(|_| {
                        SchemaError::InvalidDate {
                            field: name.to_string(),
                            value: value.clone(),
                        }
                    })?;
                }
                FilterKind::Select { options } | FilterKind::FilterSelect { options } => {
                    if !options.iter().any(|o| o.value == value) {
                        return Err(SchemaError::InvalidOption {
                            field: name.to_string(),
                            value,
                        });
                    }
                }
            }
        }

        self.values.insert(name.to_string(), value);
        Ok(())
    }

    /// Step a select-like field through its options (empty is a stop too).
    pub fn cycle_option(&mut self, name: &str, dir: i32) -> Result<(), SchemaError> {
        let field = self
            .field(name)
            .ok_or_else(|| SchemaError::UnknownField(name.to_string()))?;
        let Some(opts) = field.kind.options() else {
            return Ok(());
        };
        let current = self.value(name).unwrap_or("");
        let next = options::cycle(opts, current, dir).to_string();
        self.values.insert(name.to_string(), next);
        Ok(())
    }

    pub fn clear(&mut self) {
        for value in self.values.values_mut() {
            value.clear();
        }
    }

    /// The Search button: hands the current values to the handler exactly
    /// once and returns them.
    pub fn search(&mut self) -> FilterValues {
        let values = self.values.clone();
        debug!(?values, "filter search");
        if let Some(handler) = self.on_search.as_mut() {
            handler(&values);
        }
        values
    }
}

impl std::fmt::Debug for FilterBar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterBar")
            .field("fields", &self.fields)
            .field("values", &self.values)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::{Arc, Mutex};

    fn bar() -> FilterBar {
        FilterBar::new(vec![
            FilterFieldSpec::text("bookingNo", "Booking No"),
            FilterFieldSpec::select("status", "Status", ["A", "B"]),
            FilterFieldSpec::date("bookingDate", "Booking Date"),
        ])
    }

    #[test]
    fn select_then_search_reports_every_field_once() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let sink = calls.clone();
        let mut bar = bar().on_search(move |v| sink.lock().unwrap().push(v.clone()));

        bar.set_value("status", "B").unwrap();
        bar.set_value("bookingNo", "BK-7").unwrap();
        bar.search();

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        let expected: FilterValues = [
            ("bookingNo".to_string(), "BK-7".to_string()),
            ("status".to_string(), "B".to_string()),
            ("bookingDate".to_string(), String::new()),
        ]
        .into_iter()
        .collect();
        assert_eq!(calls[0], expected);
    }

    #[test]
    fn rejects_values_the_control_cannot_hold() {
        let mut bar = bar();
        assert_eq!(
            bar.set_value("status", "C"),
            Err(SchemaError::InvalidOption {
                field: "status".into(),
                value: "C".into()
            })
        );
        assert!(matches!(
            bar.set_value("bookingDate", "31/12/2024"),
            Err(SchemaError::InvalidDate { .. })
        ));
        assert!(bar.set_value("bookingDate", "2024-12-31").is_ok());
        assert!(matches!(
            bar.set_value("missing", "x"),
            Err(SchemaError::UnknownField(_))
        ));
    }

    #[test]
    fn unknown_filter_type_fails_to_parse() {
        let err = serde_json::from_str::<FilterFieldSpec>(
            r#"{"name":"x","label":"X","type":"slider"}"#,
        );
        assert!(err.is_err());
        let ok: FilterFieldSpec = serde_json::from_str(
            r#"{"name":"mode","label":"Mode","type":"filterSelect","options":["Road",{"value":"SEA","label":"Sea"}]}"#,
        )
        .unwrap();
        assert_eq!(ok.matching_options("se").len(), 1);
    }

    #[test]
    fn cycle_and_clear() {
        let mut bar = bar();
        bar.cycle_option("status", 1).unwrap();
        assert_eq!(bar.value("status"), Some("A"));
        bar.clear();
        assert_eq!(bar.value("status"), Some(""));
    }
}
