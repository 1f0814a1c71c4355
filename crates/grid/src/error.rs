use thiserror::Error;

/// Errors raised by the engines when a caller addresses something the schema
/// does not know about, or feeds a value a control cannot hold.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    #[error("unknown field: {0}")]
    UnknownField(String),

    #[error("{value:?} is not an option of {field}")]
    InvalidOption { field: String, value: String },

    #[error("invalid date for {field}: {value:?} (expected YYYY-MM-DD)")]
    InvalidDate { field: String, value: String },

    #[error("invalid pattern for {field}: {message}")]
    InvalidPattern { field: String, message: String },

    #[error("row not found: {0}")]
    RowNotFound(String),

    #[error("entry {0} is out of range")]
    EntryOutOfRange(usize),

    #[error("unknown tab: {0}")]
    UnknownTab(String),

    #[error("section {0} is out of range")]
    SectionOutOfRange(usize),

    #[error("section {index} is not a {expected} section")]
    WrongSection { index: usize, expected: &'static str },

    #[error("table section does not allow adding rows")]
    StaticRows,

    #[error("field {0} has no inline add action")]
    NoPlusAction(String),

    #[error("schema parse error: {0}")]
    Parse(String),
}

impl From<serde_json::Error> for SchemaError {
    fn from(err: serde_json::Error) -> Self {
        SchemaError::Parse(err.to_string())
    }
}
