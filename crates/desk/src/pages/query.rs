//! Row filtering done by list pages when the filter bar searches.
use grid::{FilterFieldSpec, FilterKind, FilterValues, RowRecord};

/// One filter term per non-empty filter value, matched against the field
/// of the same name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    /// Case-insensitive substring.
    Contains(String, String),
    Equals(String, String),
    /// Cell text starts with the `YYYY-MM-DD` day, so timestamps match too.
    SameDay(String, String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowQuery {
    terms: Vec<Term>,
}

impl RowQuery {
    pub fn new(fields: &[FilterFieldSpec], values: &FilterValues) -> Self {
        let terms = fields
            .iter()
            .filter_map(|field| {
                let value = values.get(&field.name)?.trim();
                if value.is_empty() {
                    return None;
                }
                let name = field.name.clone();
                Some(match field.kind {
                    FilterKind::Text => Term::Contains(name, value.to_lowercase()),
                    FilterKind::Date => Term::SameDay(name, value.to_string()),
                    FilterKind::Select { .. } | FilterKind::FilterSelect { .. } => {
                        Term::Equals(name, value.to_string())
                    }
                })
            })
            .collect();
        Self { terms }
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn matches(&self, row: &RowRecord) -> bool {
        self.terms.iter().all(|term| match term {
            Term::Contains(name, needle) => row.cell_text(name).to_lowercase().contains(needle),
            Term::Equals(name, value) => row.cell_text(name) == *value,
            Term::SameDay(name, day) => row.cell_text(name).starts_with(day.as_str()),
        })
    }

    pub fn apply(&self, rows: &[RowRecord]) -> Vec<RowRecord> {
        rows.iter().filter(|r| self.matches(r)).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn row(id: &str, no: &str, status: &str, date: &str) -> RowRecord {
        let fields = json!({ "bookingNo": no, "status": status, "bookingDate": date });
        match fields {
            serde_json::Value::Object(map) => RowRecord::new(id, map),
            _ => unreachable!(),
        }
    }

    fn fields() -> Vec<FilterFieldSpec> {
        vec![
            FilterFieldSpec::text("bookingNo", "Booking No"),
            FilterFieldSpec::select("status", "Status", ["Open", "Closed"]),
            FilterFieldSpec::date("bookingDate", "Booking Date"),
        ]
    }

    fn values(pairs: &[(&str, &str)]) -> FilterValues {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn empty_values_match_everything() {
        let query = RowQuery::new(&fields(), &values(&[("bookingNo", ""), ("status", " ")]));
        assert!(query.is_empty());
        assert!(query.matches(&row("1", "BK-1", "Open", "2024-03-01")));
    }

    #[test]
    fn terms_combine() {
        let rows = vec![
            row("1", "BK-1001", "Open", "2024-03-01T08:00:00Z"),
            row("2", "bk-1002", "Closed", "2024-03-01"),
            row("3", "BK-2001", "Open", "2024-03-02"),
        ];
        let query = RowQuery::new(
            &fields(),
            &values(&[("bookingNo", "BK-10"), ("bookingDate", "2024-03-01")]),
        );
        let ids: Vec<_> = query.apply(&rows).into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["1", "2"]);

        let query = RowQuery::new(&fields(), &values(&[("status", "open")]));
        assert!(query.apply(&rows).is_empty());
        let query = RowQuery::new(&fields(), &values(&[("status", "Open")]));
        assert_eq!(query.apply(&rows).len(), 2);
    }
}
