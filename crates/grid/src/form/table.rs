use serde_json::Value;
use tracing::debug;

use super::field::FieldSpec;
use super::mapping::MappingConfig;
use crate::column::ColumnSpec;
use crate::error::SchemaError;
use crate::identity::{IdGenerator, UuidGenerator};
use crate::record::{Fields, RowRecord};

pub type SaveHandler = Box<dyn FnMut(&[RowRecord]) + Send>;

/// Editable grid inside a form, e.g. the charge lines of a booking. Owns its
/// own rows; nothing is persisted until [`TableSection::save`].
pub struct TableSection {
    pub title: String,
    columns: Vec<ColumnSpec>,
    rows: Vec<RowRecord>,
    dynamic_rows: bool,
    default_row: Fields,
    /// Editor per column; columns without one are read-only.
    table_schema: Vec<FieldSpec>,
    mapping: MappingConfig,
    on_save: Option<SaveHandler>,
    ids: Box<dyn IdGenerator + Send>,
    added: usize,
}

impl TableSection {
    pub fn new(title: impl Into<String>, columns: Vec<ColumnSpec>) -> Self {
        Self {
            title: title.into(),
            columns,
            rows: Vec::new(),
            dynamic_rows: false,
            default_row: Fields::new(),
            table_schema: Vec::new(),
            mapping: MappingConfig::default(),
            on_save: None,
            ids: Box::new(UuidGenerator),
            added: 0,
        }
    }

    pub fn with_rows(mut self, rows: Vec<RowRecord>) -> Self {
        self.rows = rows;
        self
    }

    /// Allow `add_row`, seeding new rows from `default_row`.
    pub fn dynamic_rows(mut self, default_row: Fields) -> Self {
        self.dynamic_rows = true;
        self.default_row = default_row;
        self
    }

    pub fn with_table_schema(mut self, schema: Vec<FieldSpec>) -> Self {
        self.table_schema = schema;
        self
    }

    pub fn with_mapping(mut self, mapping: MappingConfig) -> Self {
        self.mapping = mapping;
        self
    }

    pub fn with_id_generator(mut self, ids: impl IdGenerator + Send + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    pub fn on_save(mut self, handler: impl FnMut(&[RowRecord]) + Send + 'static) -> Self {
        self.on_save = Some(Box::new(handler));
        self
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn rows(&self) -> &[RowRecord] {
        &self.rows
    }

    pub fn has_dynamic_rows(&self) -> bool {
        self.dynamic_rows
    }

    pub fn mapping(&self) -> &MappingConfig {
        &self.mapping
    }

    pub fn editor_for(&self, accessor_key: &str) -> Option<&FieldSpec> {
        self.table_schema.iter().find(|f| f.name == accessor_key)
    }

    /// Append a copy of the default row under a fresh id.
    pub fn add_row(&mut self) -> Result<&RowRecord, SchemaError> {
        if !self.dynamic_rows {
            return Err(SchemaError::StaticRows);
        }
        let id = self
            .ids
            .generate()
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| format!("new-{}", self.added));
        self.added += 1;
        debug!(section = %self.title, id = %id, "row added");
        self.rows.push(RowRecord::new(id, self.default_row.clone()));
        self.rows.last().ok_or(SchemaError::StaticRows)
    }

    /// Write one cell, then run the mapping for that field. Lookups finish
    /// before this returns.
    pub fn set_cell(
        &mut self,
        row_id: &str,
        field: &str,
        value: impl Into<Value>,
    ) -> Result<(), SchemaError> {
        let known = self.columns.iter().any(|c| c.accessor_key == field)
            || self.table_schema.iter().any(|f| f.name == field);
        if !known {
            return Err(SchemaError::UnknownField(field.to_string()));
        }
        let row = self
            .rows
            .iter_mut()
            .find(|r| r.id == row_id)
            .ok_or_else(|| SchemaError::RowNotFound(row_id.to_string()))?;

        let value = value.into();
        row.fields.insert(field.to_string(), value.clone());
        self.mapping.apply(field, &value, &mut row.fields);
        Ok(())
    }

    pub fn delete_row(&mut self, row_id: &str) -> Result<RowRecord, SchemaError> {
        let pos = self
            .rows
            .iter()
            .position(|r| r.id == row_id)
            .ok_or_else(|| SchemaError::RowNotFound(row_id.to_string()))?;
        debug!(section = %self.title, row_id, "row deleted");
        Ok(self.rows.remove(pos))
    }

    /// Hand the current rows to the save handler.
    pub fn save(&mut self) {
        debug!(section = %self.title, rows = self.rows.len(), "table saved");
        if let Some(handler) = self.on_save.as_mut() {
            handler(&self.rows);
        }
    }
}

impl std::fmt::Debug for TableSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableSection")
            .field("title", &self.title)
            .field("columns", &self.columns)
            .field("rows", &self.rows)
            .field("dynamic_rows", &self.dynamic_rows)
            .field("mapping", &self.mapping)
            .finish_non_exhaustive()
    }
}
