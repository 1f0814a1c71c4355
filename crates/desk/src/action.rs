use grid::{ActionKey, Fields, FilterValues, FormValues, HeaderIcon, RowRecord};
use strum::Display;

use crate::fetch::Loaded;

/// Outcome reported by a popup when it closes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PopupResult {
    Confirmed,
    Cancelled,
    Chosen(usize),
    Entered(String),
}

#[derive(Debug, Clone, PartialEq, Display)]
pub enum Action {
    Tick,
    Render,
    Resize(u16, u16),
    Suspend,
    Resume,
    Quit,
    Error(String),
    /// Show a message in an alert popup.
    Notify(String),
    /// Open the page registered for a route path.
    Navigate(String),
    Back,
    OpenPageMenu,
    /// Re-run the active page's fetch.
    Reload,
    PopupResult(PopupResult),
    /// Fixture fetch finished for a page activation.
    DataLoaded(Loaded),
    /// Row action dispatched by a list.
    RowAction { key: ActionKey, row: RowRecord },
    /// Filter bar search.
    Search(FilterValues),
    HeaderIcon(HeaderIcon),
    /// Header menu entry, by command name.
    MenuCommand(String),
    TabChanged(String),
    /// A form section passed validation.
    FormSubmitted { section: usize, values: FormValues },
    /// Custom table entry loaded back into its section for editing.
    EntryEdited { section: usize, index: usize },
    EntryDeleted { section: usize, entry: Fields },
    TableSaved { section: usize, rows: usize },
    /// The "+" next to a select asked for a new option.
    AddOption { section: usize, field: String },
}
