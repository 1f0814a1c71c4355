use serde::{Deserialize, Serialize};

/// Choice offered by select-like controls.
///
/// Schemas may list options either as plain strings or as `{value, label}`
/// pairs; both normalise to this type and render identically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "OptionSpec", into = "OptionSpec")]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

impl From<&str> for SelectOption {
    fn from(value: &str) -> Self {
        Self::new(value, value)
    }
}

impl From<String> for SelectOption {
    fn from(value: String) -> Self {
        Self {
            label: value.clone(),
            value,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum OptionSpec {
    Plain(String),
    Pair { value: String, label: String },
}

impl From<OptionSpec> for SelectOption {
    fn from(spec: OptionSpec) -> Self {
        match spec {
            OptionSpec::Plain(value) => value.into(),
            OptionSpec::Pair { value, label } => Self { value, label },
        }
    }
}

impl From<SelectOption> for OptionSpec {
    fn from(option: SelectOption) -> Self {
        OptionSpec::Pair {
            value: option.value,
            label: option.label,
        }
    }
}

/// Convenience: build an option list from anything option-like.
pub fn options<I, O>(items: I) -> Vec<SelectOption>
where
    I: IntoIterator<Item = O>,
    O: Into<SelectOption>,
{
    items.into_iter().map(Into::into).collect()
}

/// Label shown for a stored value; unknown values show as-is.
pub fn label_for<'a>(options: &'a [SelectOption], value: &'a str) -> &'a str {
    options
        .iter()
        .find(|o| o.value == value)
        .map(|o| o.label.as_str())
        .unwrap_or(value)
}

/// Step through `options` from `current` by `dir`, treating "no choice" as
/// a position before the first option.
pub fn cycle<'a>(options: &'a [SelectOption], current: &str, dir: i32) -> &'a str {
    if options.is_empty() {
        return "";
    }
    let len = options.len() as i32 + 1;
    let idx = options
        .iter()
        .position(|o| o.value == current)
        .map(|p| p as i32 + 1)
        .unwrap_or(0);
    let next = (idx + dir).rem_euclid(len);
    if next == 0 {
        ""
    } else {
        options[(next - 1) as usize].value.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn plain_and_pair_options_normalise_identically() {
        let plain: Vec<SelectOption> = serde_json::from_str(r#"["A","B"]"#).unwrap();
        let pairs: Vec<SelectOption> =
            serde_json::from_str(r#"[{"value":"A","label":"A"},{"value":"B","label":"B"}]"#)
                .unwrap();
        assert_eq!(plain, pairs);
    }

    #[test]
    fn cycle_wraps_through_empty() {
        let opts = options(["A", "B"]);
        assert_eq!(cycle(&opts, "", 1), "A");
        assert_eq!(cycle(&opts, "A", 1), "B");
        assert_eq!(cycle(&opts, "B", 1), "");
        assert_eq!(cycle(&opts, "", -1), "B");
    }
}
