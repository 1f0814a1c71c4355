//! List/table engine.
//!
//! A [`ListView`] renders whatever rows it is given against a column schema.
//! It owns presentation state only (sort, page, cursor, selection, open
//! menus) and reports intent through handlers; the only mutation it makes
//! to its dataset is [`ListView::remove_row`].
mod icons;
mod pager;
mod sort;
mod tabs;

use indexmap::IndexSet;
use tracing::debug;

pub use icons::{HeaderIcon, HeaderIcons, IconOutcome};
pub use pager::Pager;
pub use sort::{SortDirection, SortState};
pub use tabs::{TabSet, TableData};

use crate::actions::{ActionDescriptor, ActionKey, EnabledActions};
use crate::column::ColumnSpec;
use crate::error::SchemaError;
use crate::filter::{FilterBar, FilterValues};
use crate::record::RowRecord;

pub type ActionHandler = Box<dyn FnMut(&ActionKey, &RowRecord) + Send>;
pub type IconHandler = Box<dyn FnMut(HeaderIcon) + Send>;
pub type TabHandler = Box<dyn FnMut(&str) + Send>;

pub struct ListView {
    columns: Vec<ColumnSpec>,
    rows: Vec<RowRecord>,

    filter_bar: Option<FilterBar>,
    filters_open: bool,

    enabled_actions: EnabledActions,
    on_action: Option<ActionHandler>,

    icons: HeaderIcons,
    second_icon_menu: Vec<ActionDescriptor>,
    third_icon_menu: Vec<ActionDescriptor>,
    on_icon: Option<IconHandler>,

    tabs: Option<TabSet>,
    on_tab_change: Option<TabHandler>,

    sort: Option<SortState>,
    pager: Pager,
    /// Position within the current page.
    cursor: usize,
    selectable: bool,
    selected: IndexSet<String>,
}

impl ListView {
    pub fn new(columns: Vec<ColumnSpec>, rows: Vec<RowRecord>) -> Self {
        Self {
            columns,
            rows,
            filter_bar: None,
            filters_open: false,
            enabled_actions: EnabledActions::none(),
            on_action: None,
            icons: HeaderIcons::default(),
            second_icon_menu: Vec::new(),
            third_icon_menu: Vec::new(),
            on_icon: None,
            tabs: None,
            on_tab_change: None,
            sort: None,
            pager: Pager::default(),
            cursor: 0,
            selectable: false,
            selected: IndexSet::new(),
        }
    }

    /// Build a view bound to the active tab's dataset.
    pub fn from_tabs(tabs: TabSet) -> Self {
        let data = tabs.data(tabs.active()).cloned().unwrap_or_default();
        let mut view = Self::new(data.headers, data.rows);
        view.tabs = Some(tabs);
        view
    }

    pub fn with_filter_bar(mut self, bar: FilterBar) -> Self {
        self.filter_bar = Some(bar);
        self
    }

    pub fn with_actions(
        mut self,
        enabled: EnabledActions,
        handler: impl FnMut(&ActionKey, &RowRecord) + Send + 'static,
    ) -> Self {
        self.enabled_actions = enabled;
        self.on_action = Some(Box::new(handler));
        self
    }

    pub fn with_icons(mut self, icons: HeaderIcons) -> Self {
        self.icons = icons;
        self
    }

    pub fn on_icon(mut self, handler: impl FnMut(HeaderIcon) + Send + 'static) -> Self {
        self.on_icon = Some(Box::new(handler));
        self
    }

    pub fn with_second_icon_menu(mut self, menu: Vec<ActionDescriptor>) -> Self {
        self.second_icon_menu = menu;
        self
    }

    pub fn with_third_icon_menu(mut self, menu: Vec<ActionDescriptor>) -> Self {
        self.third_icon_menu = menu;
        self
    }

    pub fn on_tab_change(mut self, handler: impl FnMut(&str) + Send + 'static) -> Self {
        self.on_tab_change = Some(Box::new(handler));
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.pager.page_size = page_size;
        self
    }

    pub fn selectable(mut self, selectable: bool) -> Self {
        self.selectable = selectable;
        self
    }

    // ---- data ----

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn rows(&self) -> &[RowRecord] {
        &self.rows
    }

    /// No grid is rendered when either the schema or the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() || self.rows.is_empty()
    }

    /// Replace the dataset. Presentation state is kept where it still applies.
    pub fn set_rows(&mut self, rows: Vec<RowRecord>) {
        self.rows = rows;
        let ids: IndexSet<&str> = self.rows.iter().map(|r| r.id.as_str()).collect();
        self.selected.retain(|id| ids.contains(id.as_str()));
        self.clamp();
    }

    /// Delete a row by id.
    pub fn remove_row(&mut self, id: &str) -> Option<RowRecord> {
        let pos = self.rows.iter().position(|r| r.id == id)?;
        let row = self.rows.remove(pos);
        if let Some(tabs) = self.tabs.as_mut() {
            tabs.remove_from_active(id);
        }
        self.selected.shift_remove(id);
        self.clamp();
        debug!(id, "row removed");
        Some(row)
    }

    pub fn cell_text(&self, row: &RowRecord, accessor_key: &str) -> String {
        row.cell_text(accessor_key)
    }

    /// Rows of the current page in display order.
    pub fn visible_rows(&self) -> Vec<&RowRecord> {
        self.visible_indices()
            .into_iter()
            .map(|i| &self.rows[i])
            .collect()
    }

    fn visible_indices(&self) -> Vec<usize> {
        let order = sort::order(&self.rows, self.sort.as_ref());
        let window = self.pager.window(order.len());
        order[window].to_vec()
    }

    fn clamp(&mut self) {
        self.pager.clamp(self.rows.len());
        let on_page = self.pager.window(self.rows.len()).len();
        self.cursor = self.cursor.min(on_page.saturating_sub(1));
    }

    // ---- sorting ----

    /// Cycle a sortable column through ascending, descending and unsorted.
    /// Returns false for unknown or non-sortable columns.
    pub fn toggle_sort(&mut self, accessor_key: &str) -> bool {
        let sortable = self
            .columns
            .iter()
            .any(|c| c.accessor_key == accessor_key && c.sortable);
        if !sortable {
            return false;
        }
        self.sort = sort::next(self.sort.as_ref(), accessor_key);
        self.pager.page = 0;
        self.cursor = 0;
        true
    }

    pub fn sort_state(&self) -> Option<&SortState> {
        self.sort.as_ref()
    }

    pub fn sort_direction(&self, accessor_key: &str) -> Option<SortDirection> {
        self.sort
            .as_ref()
            .filter(|s| s.key == accessor_key)
            .map(|s| s.direction)
    }

    // ---- pagination ----

    pub fn page(&self) -> usize {
        self.pager.page
    }

    pub fn page_size(&self) -> usize {
        self.pager.page_size
    }

    pub fn page_count(&self) -> usize {
        self.pager.page_count(self.rows.len())
    }

    pub fn next_page(&mut self) -> bool {
        if self.pager.page + 1 < self.page_count() {
            self.pager.page += 1;
            self.cursor = 0;
            true
        } else {
            false
        }
    }

    pub fn prev_page(&mut self) -> bool {
        if self.pager.page > 0 {
            self.pager.page -= 1;
            self.cursor = 0;
            true
        } else {
            false
        }
    }

    // ---- cursor & selection ----

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn move_cursor(&mut self, delta: i32) {
        let on_page = self.pager.window(self.rows.len()).len();
        if on_page == 0 {
            self.cursor = 0;
            return;
        }
        let next = (self.cursor as i64 + delta as i64).clamp(0, on_page as i64 - 1);
        self.cursor = next as usize;
    }

    pub fn cursor_row(&self) -> Option<&RowRecord> {
        self.cursor_index().map(|i| &self.rows[i])
    }

    fn cursor_index(&self) -> Option<usize> {
        self.visible_indices().get(self.cursor).copied()
    }

    pub fn is_selectable(&self) -> bool {
        self.selectable
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    pub fn toggle_selected(&mut self, id: &str) -> bool {
        if !self.selectable || !self.rows.iter().any(|r| r.id == id) {
            return false;
        }
        if !self.selected.shift_remove(id) {
            self.selected.insert(id.to_string());
        }
        true
    }

    /// Header checkbox: select every row of the page, or clear them if all
    /// are already selected.
    pub fn toggle_select_page(&mut self) {
        if !self.selectable {
            return;
        }
        let ids: Vec<String> = self.visible_rows().iter().map(|r| r.id.clone()).collect();
        if ids.iter().all(|id| self.selected.contains(id)) {
            for id in &ids {
                self.selected.shift_remove(id);
            }
        } else {
            self.selected.extend(ids);
        }
    }

    /// Selected rows in dataset order.
    pub fn selected_rows(&self) -> Vec<&RowRecord> {
        self.rows
            .iter()
            .filter(|r| self.selected.contains(&r.id))
            .collect()
    }

    // ---- row actions ----

    pub fn enabled_actions(&self) -> &EnabledActions {
        &self.enabled_actions
    }

    /// Actions rendered in a row's action cell. Every row gets the same set.
    pub fn actions_for(&self, _row: &RowRecord) -> Vec<&ActionKey> {
        self.enabled_actions.iter().collect()
    }

    /// Dispatch a row action. Keys outside the allow-list are ignored and
    /// report `false`.
    pub fn click_action(&mut self, key: &ActionKey, row_id: &str) -> Result<bool, SchemaError> {
        if !self.enabled_actions.contains(key) {
            debug!(%key, row_id, "action not enabled");
            return Ok(false);
        }
        let row = self
            .rows
            .iter()
            .find(|r| r.id == row_id)
            .ok_or_else(|| SchemaError::RowNotFound(row_id.to_string()))?;
        debug!(%key, row_id, "row action");
        if let Some(handler) = self.on_action.as_mut() {
            handler(key, row);
        }
        Ok(true)
    }

    // ---- filter bar ----

    pub fn filter_bar(&self) -> Option<&FilterBar> {
        self.filter_bar.as_ref()
    }

    pub fn filter_bar_mut(&mut self) -> Option<&mut FilterBar> {
        self.filter_bar.as_mut()
    }

    pub fn filters_open(&self) -> bool {
        self.filters_open && self.filter_bar.is_some()
    }

    /// Forward the filter values to the search handler. Rows are untouched.
    pub fn search(&mut self) -> Option<FilterValues> {
        self.filter_bar.as_mut().map(FilterBar::search)
    }

    // ---- header icons ----

    pub fn icons(&self) -> HeaderIcons {
        self.icons
    }

    pub fn menu(&self, icon: HeaderIcon) -> &[ActionDescriptor] {
        match icon {
            HeaderIcon::Layout => &self.second_icon_menu,
            HeaderIcon::Export => &self.third_icon_menu,
            _ => &[],
        }
    }

    pub fn press_icon(&mut self, icon: HeaderIcon) -> IconOutcome {
        if !self.icons.shows(icon) {
            return IconOutcome::Hidden;
        }
        if icon == HeaderIcon::Search {
            self.filters_open = !self.filters_open;
            return IconOutcome::FiltersToggled(self.filters_open);
        }
        let menu = self.menu(icon);
        if icon.has_menu() && !menu.is_empty() {
            return IconOutcome::Menu(menu.iter().map(|d| d.label.clone()).collect());
        }
        debug!(%icon, "header icon");
        if let Some(handler) = self.on_icon.as_mut() {
            handler(icon);
        }
        IconOutcome::Dispatched
    }

    /// Run a dropdown entry with the row under the cursor.
    pub fn activate_menu_item(&mut self, icon: HeaderIcon, idx: usize) -> Result<(), SchemaError> {
        let row = self.cursor_index();
        let menu = match icon {
            HeaderIcon::Layout => &mut self.second_icon_menu,
            HeaderIcon::Export => &mut self.third_icon_menu,
            _ => return Err(SchemaError::EntryOutOfRange(idx)),
        };
        let item = menu.get_mut(idx).ok_or(SchemaError::EntryOutOfRange(idx))?;
        debug!(%icon, label = %item.label, "menu item");
        item.click(row.map(|i| &self.rows[i]));
        Ok(())
    }

    // ---- tabs ----

    pub fn tabs(&self) -> Option<&TabSet> {
        self.tabs.as_ref()
    }

    /// Rebind the view to a copy of another tab's dataset. Other tabs are
    /// never touched, including by later row deletions.
    pub fn switch_tab(&mut self, key: &str) -> Result<(), SchemaError> {
        let data = self
            .tabs
            .as_mut()
            .and_then(|t| t.activate(key))
            .ok_or_else(|| SchemaError::UnknownTab(key.to_string()))?;
        self.columns = data.headers;
        self.rows = data.rows;
        self.sort = None;
        self.pager.page = 0;
        self.cursor = 0;
        self.selected.clear();
        debug!(tab = key, "tab switched");
        if let Some(handler) = self.on_tab_change.as_mut() {
            handler(key);
        }
        Ok(())
    }
}

impl std::fmt::Debug for ListView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListView")
            .field("columns", &self.columns)
            .field("rows", &self.rows.len())
            .field("enabled_actions", &self.enabled_actions)
            .field("sort", &self.sort)
            .field("pager", &self.pager)
            .finish_non_exhaustive()
    }
}
