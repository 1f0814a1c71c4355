use std::cmp::Ordering;

use crate::record::RowRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn indicator(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "▲",
            SortDirection::Descending => "▼",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortState {
    pub key: String,
    pub direction: SortDirection,
}

/// Next state when a column header is activated:
/// ascending, then descending, then unsorted.
pub(crate) fn next(current: Option<&SortState>, key: &str) -> Option<SortState> {
    match current {
        Some(s) if s.key == key => match s.direction {
            SortDirection::Ascending => Some(SortState {
                key: key.to_string(),
                direction: SortDirection::Descending,
            }),
            SortDirection::Descending => None,
        },
        _ => Some(SortState {
            key: key.to_string(),
            direction: SortDirection::Ascending,
        }),
    }
}

/// Indices of `rows` in display order. Stable, so equal cells keep their
/// dataset order.
pub(crate) fn order(rows: &[RowRecord], sort: Option<&SortState>) -> Vec<usize> {
    let mut idx: Vec<usize> = (0..rows.len()).collect();
    if let Some(sort) = sort {
        idx.sort_by(|&a, &b| {
            let ord = compare_cells(
                &rows[a].cell_text(&sort.key),
                &rows[b].cell_text(&sort.key),
            );
            match sort.direction {
                SortDirection::Ascending => ord,
                SortDirection::Descending => ord.reverse(),
            }
        });
    }
    idx
}

/// Numbers compare numerically, everything else case-insensitively.
pub(crate) fn compare_cells(a: &str, b: &str) -> Ordering {
    match (a.trim().parse::<f64>(), b.trim().parse::<f64>()) {
        (Ok(x), Ok(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => a.to_lowercase().cmp(&b.to_lowercase()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_cells_sort_by_value() {
        assert_eq!(compare_cells("9", "10"), Ordering::Less);
        assert_eq!(compare_cells("beta", "Alpha"), Ordering::Greater);
    }

    #[test]
    fn header_cycles_three_states() {
        let asc = next(None, "weight");
        assert_eq!(asc.as_ref().map(|s| s.direction), Some(SortDirection::Ascending));
        let desc = next(asc.as_ref(), "weight");
        assert_eq!(desc.as_ref().map(|s| s.direction), Some(SortDirection::Descending));
        assert_eq!(next(desc.as_ref(), "weight"), None);
        let other = next(desc.as_ref(), "customer").unwrap();
        assert_eq!(other.key, "customer");
    }
}
