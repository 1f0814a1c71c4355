use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::column::ColumnSpec;
use crate::record::RowRecord;

/// A `{headers, rows}` dataset, as delivered by list fixtures.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableData {
    pub headers: Vec<ColumnSpec>,
    pub rows: Vec<RowRecord>,
}

impl TableData {
    pub fn new(headers: Vec<ColumnSpec>, rows: Vec<RowRecord>) -> Self {
        Self { headers, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty() || self.rows.is_empty()
    }
}

/// Tab strip above a table. Each tab key is bound to its own dataset; the
/// list view shows a copy of the active one. Only deletes write back, and
/// only to the active tab.
#[derive(Debug, Clone, PartialEq)]
pub struct TabSet {
    data: IndexMap<String, TableData>,
    labels: IndexMap<String, String>,
    active: String,
}

impl TabSet {
    /// Tabs appear in `labels` order. The first label is active.
    pub fn new(data: IndexMap<String, TableData>, labels: IndexMap<String, String>) -> Self {
        let active = labels.keys().next().cloned().unwrap_or_default();
        Self {
            data,
            labels,
            active,
        }
    }

    pub fn active(&self) -> &str {
        &self.active
    }

    pub fn active_index(&self) -> usize {
        self.labels.get_index_of(&self.active).unwrap_or(0)
    }

    pub fn labels(&self) -> impl Iterator<Item = (&str, &str)> {
        self.labels.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn data(&self, key: &str) -> Option<&TableData> {
        self.data.get(key)
    }

    /// Key of the tab `step` positions away from the active one (wrapping).
    pub fn neighbour(&self, step: i32) -> Option<&str> {
        if self.labels.is_empty() {
            return None;
        }
        let len = self.labels.len() as i32;
        let next = (self.active_index() as i32 + step).rem_euclid(len) as usize;
        self.labels.get_index(next).map(|(k, _)| k.as_str())
    }

    pub(crate) fn remove_from_active(&mut self, id: &str) {
        if let Some(data) = self.data.get_mut(&self.active) {
            data.rows.retain(|r| r.id != id);
        }
    }

    pub(crate) fn activate(&mut self, key: &str) -> Option<TableData> {
        let data = self.data.get(key)?.clone();
        self.active = key.to_string();
        Some(data)
    }
}
