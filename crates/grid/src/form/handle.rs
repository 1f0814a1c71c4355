//! Form state behind a narrow interface.
//!
//! Sections talk to their inputs only through [`FormHandle`]. [`SchemaForm`]
//! is the implementation built from field specs; anything else that can
//! read, write and validate named values can stand in for it.
use chrono::NaiveDate;
use indexmap::IndexMap;
use regex::Regex;
use tracing::debug;

use super::field::{FieldKind, FieldSpec, Rule, Validator};
use crate::error::SchemaError;
use crate::filter::DATE_FORMAT;

/// Raw form values keyed by field name, in schema order. Checkboxes hold
/// `"true"`/`"false"`.
pub type FormValues = IndexMap<String, String>;

/// Per-field messages from the last validation. Empty means valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    pub errors: IndexMap<String, String>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn error(&self, name: &str) -> Option<&str> {
        self.errors.get(name).map(String::as_str)
    }
}

pub trait FormHandle: Send {
    /// Snapshot of every field's value.
    fn values(&self) -> FormValues;

    fn value(&self, name: &str) -> Option<&str>;

    fn set_value(&mut self, name: &str, value: String) -> Result<(), SchemaError>;

    /// Apply a partial update. Stops at the first unknown field.
    fn set_values(&mut self, partial: &FormValues) -> Result<(), SchemaError> {
        for (name, value) in partial {
            self.set_value(name, value.clone())?;
        }
        Ok(())
    }

    /// Every field back to its initial value, then `values` applied on top.
    /// Names the form does not know are ignored. Clears errors.
    fn reset(&mut self, values: &FormValues);

    fn validate(&mut self) -> ValidationResult;

    /// Error recorded for a field by the last `validate`.
    fn field_error(&self, name: &str) -> Option<&str>;
}

enum Check {
    Required,
    MinLength(usize),
    MaxLength(usize),
    Numeric,
    Pattern(Regex, String),
}

struct FieldChecks {
    name: String,
    label: String,
    kind: FieldKind,
    initial: String,
    checks: Vec<Check>,
    validator: Option<Validator>,
}

impl FieldChecks {
    fn compile(spec: &FieldSpec) -> Result<Self, SchemaError> {
        let checks = spec
            .rules
            .iter()
            .map(|rule| {
                Ok(match rule {
                    Rule::Required => Check::Required,
                    Rule::MinLength(n) => Check::MinLength(*n),
                    Rule::MaxLength(n) => Check::MaxLength(*n),
                    Rule::Numeric => Check::Numeric,
                    Rule::Pattern { regex, message } => {
                        let re = Regex::new(regex).map_err(|e| SchemaError::InvalidPattern {
                            field: spec.name.clone(),
                            message: e.to_string(),
                        })?;
                        Check::Pattern(re, message.clone())
                    }
                })
            })
            .collect::<Result<Vec<_>, SchemaError>>()?;

        Ok(Self {
            name: spec.name.clone(),
            label: spec.label.clone(),
            kind: spec.kind.clone(),
            initial: spec.initial_value(),
            checks,
            validator: spec.validator.clone(),
        })
    }

    fn check(&self, value: &str) -> Result<(), String> {
        let trimmed = value.trim();
        let empty = match self.kind {
            FieldKind::Checkbox => value != "true",
            _ => trimmed.is_empty(),
        };

        if empty {
            if self.checks.iter().any(|c| matches!(c, Check::Required)) {
                return Err(format!("{} is required", self.label));
            }
            return Ok(());
        }

        match self.kind {
            FieldKind::Number if trimmed.parse::<f64>().is_err() => {
                return Err(format!("{} must be a number", self.label));
            }
            FieldKind::Date if NaiveDate::parse_from_str(trimmed, DATE_FORMAT).is_err() => {
                return Err(format!("{} must be a date (YYYY-MM-DD)", self.label));
            }
            FieldKind::Checkbox if value != "true" && value != "false" => {
                return Err(format!("{} must be true or false", self.label));
            }
            _ => {}
        }

        for check in &self.checks {
            match check {
                Check::Required => {}
                Check::MinLength(n) if value.chars().count() < *n => {
                    return Err(format!("{} must be at least {n} characters", self.label));
                }
                Check::MaxLength(n) if value.chars().count() > *n => {
                    return Err(format!("{} must be at most {n} characters", self.label));
                }
                Check::Numeric if trimmed.parse::<f64>().is_err() => {
                    return Err(format!("{} must be numeric", self.label));
                }
                Check::Pattern(re, message) if !re.is_match(value) => {
                    return Err(message.clone());
                }
                _ => {}
            }
        }

        match &self.validator {
            Some(validator) => validator(value),
            None => Ok(()),
        }
    }
}

/// [`FormHandle`] driven by field specs and their rules.
pub struct SchemaForm {
    fields: Vec<FieldChecks>,
    values: FormValues,
    errors: IndexMap<String, String>,
}

impl SchemaForm {
    /// Fails if a pattern rule does not compile.
    pub fn from_fields(fields: &[FieldSpec]) -> Result<Self, SchemaError> {
        let fields = fields
            .iter()
            .map(FieldChecks::compile)
            .collect::<Result<Vec<_>, _>>()?;
        let values = fields
            .iter()
            .map(|f| (f.name.clone(), f.initial.clone()))
            .collect();
        Ok(Self {
            fields,
            values,
            errors: IndexMap::new(),
        })
    }
}

impl FormHandle for SchemaForm {
    fn values(&self) -> FormValues {
        self.values.clone()
    }

    fn value(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    fn set_value(&mut self, name: &str, value: String) -> Result<(), SchemaError> {
        let slot = self
            .values
            .get_mut(name)
            .ok_or_else(|| SchemaError::UnknownField(name.to_string()))?;
        *slot = value;
        self.errors.shift_remove(name);
        Ok(())
    }

    fn reset(&mut self, values: &FormValues) {
        for field in &self.fields {
            let value = values
                .get(&field.name)
                .cloned()
                .unwrap_or_else(|| field.initial.clone());
            self.values.insert(field.name.clone(), value);
        }
        self.errors.clear();
    }

    fn validate(&mut self) -> ValidationResult {
        self.errors = self
            .fields
            .iter()
            .filter_map(|field| {
                let value = self.values.get(&field.name).map(String::as_str).unwrap_or("");
                field.check(value).err().map(|msg| (field.name.clone(), msg))
            })
            .collect();
        debug!(errors = self.errors.len(), "form validated");
        ValidationResult {
            errors: self.errors.clone(),
        }
    }

    fn field_error(&self, name: &str) -> Option<&str> {
        self.errors.get(name).map(String::as_str)
    }
}
