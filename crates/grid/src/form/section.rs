use tracing::debug;

use super::field::FieldSpec;
use super::handle::{FormHandle, FormValues, SchemaForm, ValidationResult};
use crate::column::ColumnSpec;
use crate::error::SchemaError;
use crate::options::SelectOption;
use crate::record::{Fields, value_text};

pub type SubmitHandler = Box<dyn FnMut(&FormValues) + Send>;
pub type PlusHandler = Box<dyn FnMut(&str) + Send>;
pub type EditHandler = Box<dyn FnMut(&Fields, usize) + Send>;
pub type DeleteHandler = Box<dyn FnMut(&Fields) + Send>;

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Values were valid and handed to the submit handler.
    Submitted(FormValues),
    /// Nothing was submitted.
    Invalid(ValidationResult),
}

/// Read-only table of entries shown under a form section. The owner of the
/// section appends and removes entries; the table only reports edit and
/// delete intent.
pub struct CustomTable {
    pub columns: Vec<ColumnSpec>,
    entries: Vec<Fields>,
    on_edit: Option<EditHandler>,
    on_delete: Option<DeleteHandler>,
}

impl CustomTable {
    pub fn new(columns: Vec<ColumnSpec>) -> Self {
        Self {
            columns,
            entries: Vec::new(),
            on_edit: None,
            on_delete: None,
        }
    }

    pub fn on_edit(mut self, handler: impl FnMut(&Fields, usize) + Send + 'static) -> Self {
        self.on_edit = Some(Box::new(handler));
        self
    }

    pub fn on_delete(mut self, handler: impl FnMut(&Fields) + Send + 'static) -> Self {
        self.on_delete = Some(Box::new(handler));
        self
    }

    pub fn entries(&self) -> &[Fields] {
        &self.entries
    }

    pub fn set_entries(&mut self, entries: Vec<Fields>) {
        self.entries = entries;
    }

    pub fn push_entry(&mut self, entry: Fields) {
        self.entries.push(entry);
    }

    pub fn remove_entry(&mut self, index: usize) -> Option<Fields> {
        (index < self.entries.len()).then(|| self.entries.remove(index))
    }

    pub fn cell_text(&self, index: usize, accessor_key: &str) -> String {
        self.entries
            .get(index)
            .and_then(|e| e.get(accessor_key))
            .map(value_text)
            .unwrap_or_default()
    }
}

impl std::fmt::Debug for CustomTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustomTable")
            .field("columns", &self.columns)
            .field("entries", &self.entries)
            .finish_non_exhaustive()
    }
}

/// A titled group of fields backed by one [`FormHandle`].
pub struct FormSection {
    pub title: String,
    fields: Vec<FieldSpec>,
    form: Box<dyn FormHandle>,
    on_submit: Option<SubmitHandler>,
    on_plus: Option<PlusHandler>,
    custom_table: Option<CustomTable>,
}

impl FormSection {
    pub fn new(title: impl Into<String>, fields: Vec<FieldSpec>) -> Result<Self, SchemaError> {
        let form = SchemaForm::from_fields(&fields)?;
        Ok(Self::with_form(title, fields, Box::new(form)))
    }

    /// Section backed by a caller-provided form implementation.
    pub fn with_form(
        title: impl Into<String>,
        fields: Vec<FieldSpec>,
        form: Box<dyn FormHandle>,
    ) -> Self {
        Self {
            title: title.into(),
            fields,
            form,
            on_submit: None,
            on_plus: None,
            custom_table: None,
        }
    }

    pub fn on_submit(mut self, handler: impl FnMut(&FormValues) + Send + 'static) -> Self {
        self.on_submit = Some(Box::new(handler));
        self
    }

    pub fn on_plus(mut self, handler: impl FnMut(&str) + Send + 'static) -> Self {
        self.on_plus = Some(Box::new(handler));
        self
    }

    pub fn with_custom_table(mut self, table: CustomTable) -> Self {
        self.custom_table = Some(table);
        self
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn form(&self) -> &dyn FormHandle {
        self.form.as_ref()
    }

    pub fn form_mut(&mut self) -> &mut dyn FormHandle {
        self.form.as_mut()
    }

    pub fn value(&self, name: &str) -> Option<&str> {
        self.form.value(name)
    }

    pub fn set_value(&mut self, name: &str, value: impl Into<String>) -> Result<(), SchemaError> {
        self.form.set_value(name, value.into())
    }

    /// Validate and, only when valid, hand the values to the submit handler.
    pub fn submit(&mut self) -> SubmitOutcome {
        let result = self.form.validate();
        if !result.is_valid() {
            debug!(section = %self.title, errors = result.errors.len(), "submit blocked");
            return SubmitOutcome::Invalid(result);
        }
        let values = self.form.values();
        debug!(section = %self.title, "submit");
        if let Some(handler) = self.on_submit.as_mut() {
            handler(&values);
        }
        SubmitOutcome::Submitted(values)
    }

    /// Typed JSON record of the current values.
    pub fn to_fields(&self) -> Fields {
        self.fields
            .iter()
            .map(|f| {
                let raw = self.form.value(&f.name).unwrap_or("");
                (f.name.clone(), f.to_json(raw))
            })
            .collect()
    }

    /// The inline "+" next to a select. Only fires for fields that declare it.
    pub fn press_plus(&mut self, name: &str) -> Result<(), SchemaError> {
        let field = self
            .field(name)
            .ok_or_else(|| SchemaError::UnknownField(name.to_string()))?;
        if !field.kind.has_plus_action() {
            return Err(SchemaError::NoPlusAction(name.to_string()));
        }
        debug!(field = name, "plus action");
        if let Some(handler) = self.on_plus.as_mut() {
            handler(name);
        }
        Ok(())
    }

    /// Add an option to a select or radio field. Existing values are kept.
    pub fn push_option(&mut self, name: &str, option: SelectOption) -> Result<(), SchemaError> {
        let options = self
            .fields
            .iter_mut()
            .find(|f| f.name == name)
            .and_then(|f| f.kind.options_mut())
            .ok_or_else(|| SchemaError::UnknownField(name.to_string()))?;
        if !options.iter().any(|o| o.value == option.value) {
            options.push(option);
        }
        Ok(())
    }

    pub fn custom_table(&self) -> Option<&CustomTable> {
        self.custom_table.as_ref()
    }

    pub fn custom_table_mut(&mut self) -> Option<&mut CustomTable> {
        self.custom_table.as_mut()
    }

    /// Load an entry back into the form, then notify the edit handler.
    /// Fields the entry does not name go back to their initial values.
    pub fn edit_entry(&mut self, index: usize) -> Result<(), SchemaError> {
        let table = self
            .custom_table
            .as_mut()
            .ok_or(SchemaError::EntryOutOfRange(index))?;
        let entry = table
            .entries
            .get(index)
            .ok_or(SchemaError::EntryOutOfRange(index))?;

        let values: FormValues = self
            .fields
            .iter()
            .filter_map(|f| entry.get(&f.name).map(|v| (f.name.clone(), value_text(v))))
            .collect();
        self.form.reset(&values);

        debug!(section = %self.title, index, "edit entry");
        if let Some(handler) = table.on_edit.as_mut() {
            handler(entry, index);
        }
        Ok(())
    }

    /// Report delete intent for an entry. The entry stays until the owner
    /// removes it.
    pub fn delete_entry(&mut self, index: usize) -> Result<(), SchemaError> {
        let table = self
            .custom_table
            .as_mut()
            .ok_or(SchemaError::EntryOutOfRange(index))?;
        let entry = table
            .entries
            .get(index)
            .ok_or(SchemaError::EntryOutOfRange(index))?;
        debug!(section = %self.title, index, "delete entry");
        if let Some(handler) = table.on_delete.as_mut() {
            handler(entry);
        }
        Ok(())
    }
}

impl std::fmt::Debug for FormSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormSection")
            .field("title", &self.title)
            .field("fields", &self.fields)
            .field("values", &self.form.values())
            .field("custom_table", &self.custom_table)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::field::FieldKind;
    use pretty_assertions::assert_eq;
    use std::sync::{Arc, Mutex};

    fn section() -> FormSection {
        FormSection::new(
            "Booking Details",
            vec![
                FieldSpec::new("customer", "Customer", FieldKind::Text).required(),
                FieldSpec::new(
                    "mode",
                    "Mode",
                    FieldKind::Select {
                        options: crate::options::options(["Road", "Sea"]),
                        plus_action: true,
                    },
                ),
                FieldSpec::new("weight", "Weight", FieldKind::Number),
                FieldSpec::new("hazardous", "Hazardous", FieldKind::Checkbox),
            ],
        )
        .unwrap()
    }

    #[test]
    fn submit_only_reaches_handler_when_valid() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let sink = calls.clone();
        let mut s = section().on_submit(move |v| sink.lock().unwrap().push(v.clone()));

        assert!(matches!(s.submit(), SubmitOutcome::Invalid(r) if r.error("customer").is_some()));
        assert!(calls.lock().unwrap().is_empty());

        s.set_value("customer", "Acme").unwrap();
        assert!(matches!(s.submit(), SubmitOutcome::Submitted(_)));
        assert_eq!(calls.lock().unwrap().len(), 1);
        assert_eq!(calls.lock().unwrap()[0]["customer"], "Acme");
    }

    #[test]
    fn edit_entry_round_trips_shared_fields() {
        let edits = Arc::new(Mutex::new(Vec::new()));
        let sink = edits.clone();
        let mut s = section().with_custom_table(
            CustomTable::new(vec![ColumnSpec::new("customer", "Customer")])
                .on_edit(move |_, i| sink.lock().unwrap().push(i)),
        );
        s.set_value("customer", "Acme").unwrap();
        s.set_value("weight", "12.5").unwrap();
        s.set_value("hazardous", "true").unwrap();
        let entry = s.to_fields();
        s.custom_table_mut().unwrap().push_entry(entry.clone());

        s.set_value("customer", "Other").unwrap();
        s.set_value("mode", "Sea").unwrap();
        s.edit_entry(0).unwrap();

        assert_eq!(s.to_fields(), entry);
        assert_eq!(s.value("mode"), Some(""));
        assert_eq!(*edits.lock().unwrap(), vec![0]);
        assert_eq!(s.edit_entry(4), Err(SchemaError::EntryOutOfRange(4)));
    }

    #[test]
    fn delete_entry_only_notifies() {
        let deleted = Arc::new(Mutex::new(0));
        let sink = deleted.clone();
        let mut s = section().with_custom_table(
            CustomTable::new(vec![]).on_delete(move |_| *sink.lock().unwrap() += 1),
        );
        s.custom_table_mut().unwrap().push_entry(Fields::new());
        s.delete_entry(0).unwrap();
        assert_eq!(*deleted.lock().unwrap(), 1);
        assert_eq!(s.custom_table().unwrap().entries().len(), 1);
    }

    #[test]
    fn plus_action_and_options() {
        let pressed = Arc::new(Mutex::new(Vec::new()));
        let sink = pressed.clone();
        let mut s = section().on_plus(move |name| sink.lock().unwrap().push(name.to_string()));
        s.press_plus("mode").unwrap();
        assert_eq!(
            s.press_plus("weight"),
            Err(SchemaError::NoPlusAction("weight".into()))
        );
        s.push_option("mode", SelectOption::from("Air")).unwrap();
        assert_eq!(s.field("mode").unwrap().kind.options().unwrap().len(), 3);
        assert_eq!(*pressed.lock().unwrap(), vec!["mode".to_string()]);
    }
}
