use serde::{Deserialize, Serialize};

/// One table column. `accessor_key` indexes into each row's fields and must
/// be unique within a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSpec {
    pub accessor_key: String,
    pub header: String,
    #[serde(default)]
    pub sortable: bool,
}

impl ColumnSpec {
    pub fn new(accessor_key: impl Into<String>, header: impl Into<String>) -> Self {
        Self {
            accessor_key: accessor_key.into(),
            header: header.into(),
            sortable: false,
        }
    }

    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }
}
