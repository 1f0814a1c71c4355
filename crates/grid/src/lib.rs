//! Headless, schema-driven list and form engines.
//!
//! Pages declare schemas (columns, filter fields, form fields, sections) and
//! hand their data to the engines in this crate. The engines never fetch or
//! persist anything; they hold presentation state and report user intent
//! back to the caller through registered handlers.
//!
//! - [`list`]: filterable, sortable, paginated table with gated row actions,
//!   header icon menus and tabs
//! - [`filter`]: the filter bar above a table
//! - [`form`]: accordion of form and table sections, validation, custom
//!   tables and mapping-driven cross-population
//! - [`identity`]: stable row ids for fetched records
//! - [`routes`]: entity key to page path lookups
pub mod actions;
pub mod column;
pub mod error;
pub mod filter;
pub mod form;
pub mod identity;
pub mod list;
pub mod options;
pub mod record;
pub mod routes;

pub use actions::{ActionDescriptor, ActionKey, EnabledActions};
pub use column::ColumnSpec;
pub use error::SchemaError;
pub use filter::{FilterBar, FilterFieldSpec, FilterKind, FilterValues};
pub use form::{
    CustomTable, FieldKind, FieldSpec, FormEngine, FormHandle, FormSection, FormValues,
    MappingConfig, MappingRule, Rule, SchemaForm, Section, SubmitOutcome, TableSection,
    ValidationResult,
};
pub use identity::{IdGenerator, UuidGenerator, assign_ids, with_ids};
pub use list::{HeaderIcon, HeaderIcons, IconOutcome, ListView, SortDirection, TabSet, TableData};
pub use options::SelectOption;
pub use record::{Fields, RowRecord, value_text};
pub use routes::RouteTable;
