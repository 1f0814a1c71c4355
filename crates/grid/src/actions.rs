use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::record::RowRecord;

/// Symbolic row action. The built-in keys only carry a conventional label
/// and glyph; all behavior is supplied by the caller's action handler.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActionKey {
    Edit,
    View,
    Delete,
    Custom(String),
}

impl ActionKey {
    pub fn as_str(&self) -> &str {
        match self {
            ActionKey::Edit => "edit",
            ActionKey::View => "view",
            ActionKey::Delete => "delete",
            ActionKey::Custom(key) => key,
        }
    }

    /// Button label rendered in a row's action cell.
    pub fn label(&self) -> String {
        match self {
            ActionKey::Edit => "Edit".into(),
            ActionKey::View => "View".into(),
            ActionKey::Delete => "Delete".into(),
            ActionKey::Custom(key) => {
                let mut chars = key.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            }
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            ActionKey::Edit => "✎",
            ActionKey::View => "◉",
            ActionKey::Delete => "✗",
            ActionKey::Custom(_) => "•",
        }
    }
}

impl From<&str> for ActionKey {
    fn from(key: &str) -> Self {
        match key {
            "edit" => ActionKey::Edit,
            "view" => ActionKey::View,
            "delete" => ActionKey::Delete,
            other => ActionKey::Custom(other.to_string()),
        }
    }
}

impl From<String> for ActionKey {
    fn from(key: String) -> Self {
        key.as_str().into()
    }
}

impl From<ActionKey> for String {
    fn from(key: ActionKey) -> Self {
        key.as_str().to_string()
    }
}

impl FromStr for ActionKey {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.into())
    }
}

impl fmt::Display for ActionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered allow-list of actions rendered for every row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnabledActions(Vec<ActionKey>);

impl EnabledActions {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &ActionKey) -> bool {
        self.0.contains(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActionKey> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&ActionKey> {
        self.0.get(idx)
    }
}

impl<K: Into<ActionKey>> FromIterator<K> for EnabledActions {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut keys: Vec<ActionKey> = Vec::new();
        for key in iter {
            let key = key.into();
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
        Self(keys)
    }
}

pub type MenuHandler = Box<dyn FnMut(Option<&RowRecord>) + Send>;

/// Entry of a header icon dropdown menu. The handler receives the row under
/// the cursor, if any.
pub struct ActionDescriptor {
    pub label: String,
    on_click: MenuHandler,
}

impl ActionDescriptor {
    pub fn new(
        label: impl Into<String>,
        on_click: impl FnMut(Option<&RowRecord>) + Send + 'static,
    ) -> Self {
        Self {
            label: label.into(),
            on_click: Box::new(on_click),
        }
    }

    pub fn click(&mut self, row: Option<&RowRecord>) {
        (self.on_click)(row)
    }
}

impl fmt::Debug for ActionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionDescriptor")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_round_trip_through_strings() {
        assert_eq!(ActionKey::from("edit"), ActionKey::Edit);
        assert_eq!(
            ActionKey::from("invoice"),
            ActionKey::Custom("invoice".into())
        );
        assert_eq!(ActionKey::Custom("invoice".into()).label(), "Invoice");
        let parsed: EnabledActions = serde_json::from_str(r#"["edit","view","edit"]"#).unwrap();
        assert_eq!(parsed.len(), 3, "serde keeps the list as written");
        let collected: EnabledActions = ["edit", "view", "edit"].into_iter().collect();
        assert_eq!(collected.len(), 2);
        assert!(!collected.contains(&ActionKey::Delete));
    }
}
