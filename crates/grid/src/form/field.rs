//! Declarative form field types.
//!
//! A [`FieldSpec`] describes one input of a form section: its name, label,
//! control kind and validation rules. Field kinds are a closed set; schemas
//! naming any other `type` fail to deserialize instead of degrading to a
//! text input.
//!
//! ```ignore
//! let weight = FieldSpec::new("weight", "Weight (kg)", FieldKind::Number)
//!     .rule(Rule::Required)
//!     .validator(|v| match v.parse::<f64>() {
//!         Ok(w) if w > 0.0 => Ok(()),
//!         _ => Err("Weight must be positive".into()),
//!     });
//! ```
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::options::SelectOption;

/// Custom check on a field's raw value; `Err(message)` is shown inline.
pub type Validator = Arc<dyn Fn(&str) -> Result<(), String> + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Number,
    Password,
    Textarea,
    Select {
        #[serde(default)]
        options: Vec<SelectOption>,
        /// Renders an inline "+" that asks the caller to add an option.
        #[serde(default, rename = "plusAction")]
        plus_action: bool,
    },
    Radio {
        #[serde(default)]
        options: Vec<SelectOption>,
    },
    Checkbox,
    Date,
    File,
}

/// The widget a field is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    LineInput,
    SecretInput,
    MultiLineInput,
    Dropdown,
    RadioGroup,
    Toggle,
    DatePicker,
    FilePicker,
}

impl FieldKind {
    pub fn control(&self) -> ControlKind {
        match self {
            FieldKind::Text | FieldKind::Number => ControlKind::LineInput,
            FieldKind::Password => ControlKind::SecretInput,
            FieldKind::Textarea => ControlKind::MultiLineInput,
            FieldKind::Select { .. } => ControlKind::Dropdown,
            FieldKind::Radio { .. } => ControlKind::RadioGroup,
            FieldKind::Checkbox => ControlKind::Toggle,
            FieldKind::Date => ControlKind::DatePicker,
            FieldKind::File => ControlKind::FilePicker,
        }
    }

    pub fn options(&self) -> Option<&[SelectOption]> {
        match self {
            FieldKind::Select { options, .. } | FieldKind::Radio { options } => Some(options),
            _ => None,
        }
    }

    pub(crate) fn options_mut(&mut self) -> Option<&mut Vec<SelectOption>> {
        match self {
            FieldKind::Select { options, .. } | FieldKind::Radio { options } => Some(options),
            _ => None,
        }
    }

    pub fn has_plus_action(&self) -> bool {
        matches!(
            self,
            FieldKind::Select {
                plus_action: true,
                ..
            }
        )
    }

    /// Value a field of this kind starts with when the schema gives none.
    pub fn empty_value(&self) -> &'static str {
        match self {
            FieldKind::Checkbox => "false",
            _ => "",
        }
    }
}

/// Declarative validation rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Rule {
    Required,
    MinLength(usize),
    MaxLength(usize),
    Numeric,
    Pattern { regex: String, message: String },
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSpec {
    pub name: String,
    pub label: String,
    #[serde(flatten)]
    pub kind: FieldKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub disabled: bool,
    /// Field name used when the value is edited through a modal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modal_field_name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unit_options: Vec<SelectOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<Rule>,
    #[serde(skip)]
    pub validator: Option<Validator>,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            kind,
            placeholder: None,
            disabled: false,
            modal_field_name: None,
            unit_options: Vec::new(),
            default_value: None,
            rules: Vec::new(),
            validator: None,
        }
    }

    pub fn placeholder(mut self, text: impl Into<String>) -> Self {
        self.placeholder = Some(text.into());
        self
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn unit_options<O: Into<SelectOption>>(mut self, units: impl IntoIterator<Item = O>) -> Self {
        self.unit_options = units.into_iter().map(Into::into).collect();
        self
    }

    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn required(self) -> Self {
        self.rule(Rule::Required)
    }

    pub fn validator(
        mut self,
        f: impl Fn(&str) -> Result<(), String> + Send + Sync + 'static,
    ) -> Self {
        self.validator = Some(Arc::new(f));
        self
    }

    pub fn is_required(&self) -> bool {
        self.rules.contains(&Rule::Required)
    }

    pub fn initial_value(&self) -> String {
        self.default_value
            .clone()
            .unwrap_or_else(|| self.kind.empty_value().to_string())
    }

    /// Typed JSON for a raw form value: checkboxes become booleans, numeric
    /// fields become numbers when they parse.
    pub fn to_json(&self, raw: &str) -> Value {
        match self.kind {
            FieldKind::Checkbox => Value::Bool(raw == "true"),
            FieldKind::Number => raw
                .trim()
                .parse::<i64>()
                .map(Value::from)
                .or_else(|_| raw.trim().parse::<f64>().map(Value::from))
                .unwrap_or_else(|_| Value::String(raw.to_string())),
            _ => Value::String(raw.to_string()),
        }
    }
}

impl fmt::Debug for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldSpec")
            .field("name", &self.name)
            .field("label", &self.label)
            .field("kind", &self.kind)
            .field("disabled", &self.disabled)
            .field("rules", &self.rules)
            .field("validator", &self.validator.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_every_kind_and_rejects_unknown() {
        let fields: Vec<FieldSpec> = serde_json::from_str(
            r#"[
                {"name":"customer","label":"Customer","type":"text","rules":["required",{"minLength":3}]},
                {"name":"mode","label":"Mode","type":"select","options":["Road",{"value":"SEA","label":"Sea"}],"plusAction":true},
                {"name":"priority","label":"Priority","type":"radio","options":["Low","High"]},
                {"name":"hazardous","label":"Hazardous","type":"checkbox"},
                {"name":"pickup","label":"Pickup","type":"date","disabled":true}
            ]"#,
        )
        .unwrap();

        assert!(fields[0].is_required());
        assert_eq!(fields[0].rules[1], Rule::MinLength(3));
        assert!(fields[1].kind.has_plus_action());
        assert_eq!(fields[1].kind.options().map(|o| o[1].label.as_str()), Some("Sea"));
        assert_eq!(fields[2].kind.control(), ControlKind::RadioGroup);
        assert_eq!(fields[3].initial_value(), "false");
        assert!(fields[4].disabled);

        let unknown = serde_json::from_str::<FieldSpec>(
            r#"{"name":"x","label":"X","type":"colorpicker"}"#,
        );
        assert!(unknown.is_err());
    }

    #[test]
    fn typed_json_values() {
        let weight = FieldSpec::new("weight", "Weight", FieldKind::Number);
        assert_eq!(weight.to_json("12"), Value::from(12));
        assert_eq!(weight.to_json("12.5"), Value::from(12.5));
        assert_eq!(weight.to_json("heavy"), Value::from("heavy"));
        let flag = FieldSpec::new("hazardous", "Hazardous", FieldKind::Checkbox);
        assert_eq!(flag.to_json("true"), Value::Bool(true));
    }
}
