//! Generic list page: one fixture, one [`TableView`], and the caller-side
//! logic the list engine leaves to its owner (filtering, deletion,
//! navigation and exports).
use std::path::PathBuf;

use color_eyre::{Result, eyre::WrapErr};
use crossterm::event::{KeyCode, KeyEvent};
use grid::{
    ActionDescriptor, ActionKey, EnabledActions, FilterBar, FilterFieldSpec, HeaderIcon,
    HeaderIcons, ListView, RowRecord, TabSet,
};
use indexmap::IndexMap;
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

use crate::{
    action::{Action, PopupResult},
    components::{
        Component, PopupComponent, render_backdrop,
        popups::ConfirmPopup,
        table_view::{Density, TableView},
    },
    fetch::Dataset,
    pages::{Page, PageContext, query::RowQuery},
    tui::{EventResponse, Frame},
};

/// Header dropdown entry: the label shown and the command sent back to
/// the page as `Action::MenuCommand`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuEntry {
    pub label: String,
    pub command: String,
}

impl MenuEntry {
    pub fn new(label: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            command: command.into(),
        }
    }
}

/// Everything a list page declares up front.
#[derive(Debug, Clone)]
pub struct ListSpec {
    pub key: String,
    pub title: String,
    pub fixture: String,
    pub filters: Vec<FilterFieldSpec>,
    pub actions: EnabledActions,
    pub icons: HeaderIcons,
    pub layout_menu: Vec<MenuEntry>,
    pub export_menu: Vec<MenuEntry>,
    /// Display label per tab key. Keys missing here show as-is.
    pub tab_labels: IndexMap<String, String>,
    pub selectable: bool,
}

impl ListSpec {
    pub fn new(
        key: impl Into<String>,
        title: impl Into<String>,
        fixture: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            fixture: fixture.into(),
            filters: Vec::new(),
            actions: EnabledActions::none(),
            icons: HeaderIcons::default(),
            layout_menu: Vec::new(),
            export_menu: Vec::new(),
            tab_labels: IndexMap::new(),
            selectable: false,
        }
    }

    pub fn filters(mut self, filters: Vec<FilterFieldSpec>) -> Self {
        self.filters = filters;
        self
    }

    pub fn actions<K: Into<ActionKey>>(mut self, keys: impl IntoIterator<Item = K>) -> Self {
        self.actions = keys.into_iter().collect();
        self
    }

    pub fn icons(mut self, icons: HeaderIcons) -> Self {
        self.icons = icons;
        self
    }

    pub fn layout_menu(mut self, entries: Vec<MenuEntry>) -> Self {
        self.layout_menu = entries;
        self
    }

    pub fn export_menu(mut self, entries: Vec<MenuEntry>) -> Self {
        self.export_menu = entries;
        self
    }

    pub fn tab_labels<K: Into<String>, V: Into<String>>(
        mut self,
        labels: impl IntoIterator<Item = (K, V)>,
    ) -> Self {
        self.tab_labels = labels
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self
    }

    pub fn selectable(mut self) -> Self {
        self.selectable = true;
        self
    }
}

enum State {
    Loading,
    Failed(String),
    Ready(Box<TableView>),
}

pub struct ListPage {
    spec: ListSpec,
    ctx: PageContext,
    tx: Option<UnboundedSender<Action>>,
    state: State,
    /// Rows of the active dataset before filtering. Searches run against
    /// these; deletions apply to both.
    all_rows: Vec<RowRecord>,
    pending_delete: Option<(RowRecord, ConfirmPopup)>,
}

/// Handler glue: engine callbacks become actions on the app channel.
fn emitter(tx: Option<UnboundedSender<Action>>) -> impl Fn(Action) + Clone + Send + 'static {
    move |action| {
        if let Some(tx) = &tx {
            tx.send(action).ok();
        }
    }
}

fn menu(entries: &[MenuEntry], emit: impl Fn(Action) + Clone + Send + 'static) -> Vec<ActionDescriptor> {
    entries
        .iter()
        .map(|entry| {
            let emit = emit.clone();
            let command = entry.command.clone();
            ActionDescriptor::new(entry.label.clone(), move |_row| {
                emit(Action::MenuCommand(command.clone()))
            })
        })
        .collect()
}

impl ListPage {
    pub fn new(spec: ListSpec, ctx: PageContext) -> Self {
        Self {
            spec,
            ctx,
            tx: None,
            state: State::Loading,
            all_rows: Vec::new(),
            pending_delete: None,
        }
    }

    pub fn spec(&self) -> &ListSpec {
        &self.spec
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, State::Loading)
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            State::Failed(msg) => Some(msg),
            _ => None,
        }
    }

    pub fn view(&self) -> Option<&TableView> {
        match &self.state {
            State::Ready(view) => Some(&**view),
            _ => None,
        }
    }

    pub fn confirming_delete(&self) -> bool {
        self.pending_delete.is_some()
    }

    fn view_mut(&mut self) -> Option<&mut TableView> {
        match &mut self.state {
            State::Ready(view) => Some(&mut **view),
            _ => None,
        }
    }

    fn build_view(&self, dataset: Dataset) -> TableView {
        let emit = emitter(self.tx.clone());
        let list = match dataset {
            Dataset::Table(table) => ListView::new(table.headers, table.rows),
            Dataset::Tabs(tabs) => {
                let labels = tabs
                    .keys()
                    .map(|k| {
                        let label = self.spec.tab_labels.get(k).cloned();
                        (k.clone(), label.unwrap_or_else(|| k.clone()))
                    })
                    .collect();
                ListView::from_tabs(TabSet::new(tabs, labels))
            }
        };

        let mut list = list
            .with_page_size(self.ctx.page_size)
            .selectable(self.spec.selectable)
            .with_icons(self.spec.icons)
            .with_second_icon_menu(menu(&self.spec.layout_menu, emit.clone()))
            .with_third_icon_menu(menu(&self.spec.export_menu, emit.clone()));

        if !self.spec.filters.is_empty() {
            let on_search = emit.clone();
            list = list.with_filter_bar(
                FilterBar::new(self.spec.filters.clone())
                    .on_search(move |values| on_search(Action::Search(values.clone()))),
            );
        }

        let on_action = emit.clone();
        let on_icon = emit.clone();
        let on_tab = emit;
        let list = list
            .with_actions(self.spec.actions.clone(), move |key, row| {
                on_action(Action::RowAction {
                    key: key.clone(),
                    row: row.clone(),
                })
            })
            .on_icon(move |icon| on_icon(Action::HeaderIcon(icon)))
            .on_tab_change(move |tab| on_tab(Action::TabChanged(tab.to_string())));

        TableView::new(self.spec.title.clone(), list)
    }

    fn load(&mut self, result: std::result::Result<Dataset, String>) {
        match result {
            Ok(dataset) => {
                let view = self.build_view(dataset);
                self.all_rows = view.list().rows().to_vec();
                info!(page = %self.spec.key, rows = self.all_rows.len(), "list ready");
                self.state = State::Ready(Box::new(view));
            }
            Err(msg) => {
                warn!(page = %self.spec.key, error = %msg, "list failed to load");
                self.all_rows.clear();
                self.state = State::Failed(msg);
            }
        }
    }

    /// First column's text, which is what a person would call the row.
    fn row_label(&self, row: &RowRecord) -> String {
        self.view()
            .and_then(|v| v.list().columns().first())
            .map(|c| row.cell_text(&c.accessor_key))
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| row.id.clone())
    }

    fn row_details(&self, row: &RowRecord) -> String {
        let Some(view) = self.view() else {
            return row.id.clone();
        };
        view.list()
            .columns()
            .iter()
            .map(|c| format!("{}: {}", c.header, row.cell_text(&c.accessor_key)))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn delete(&mut self, row_id: &str) {
        let removed = self
            .view_mut()
            .and_then(|view| view.list_mut().remove_row(row_id));
        self.all_rows.retain(|r| r.id != row_id);
        if removed.is_some() {
            info!(page = %self.spec.key, row_id = %row_id, "row deleted");
        }
    }

    fn search(&mut self, values: &grid::FilterValues) {
        let query = RowQuery::new(&self.spec.filters, values);
        let rows = query.apply(&self.all_rows);
        debug!(page = %self.spec.key, matches = rows.len(), "search");
        if let Some(view) = self.view_mut() {
            view.list_mut().set_rows(rows);
        }
    }

    fn row_action(&mut self, key: ActionKey, row: RowRecord) -> Option<Action> {
        match key {
            ActionKey::Delete => {
                let question = format!("Delete {}? This cannot be undone.", self.row_label(&row));
                let popup = ConfirmPopup::new("Delete row", question)
                    .ok_label("Delete")
                    .cancel_label("Keep");
                self.pending_delete = Some((row, popup));
                Some(Action::Render)
            }
            ActionKey::View => Some(Action::Notify(self.row_details(&row))),
            ActionKey::Edit => match self.ctx.routes.lookup(&format!("{}.edit", self.spec.key)) {
                Some(path) => Some(Action::Navigate(path.to_string())),
                None => Some(Action::Notify(format!(
                    "{} cannot be edited here.",
                    self.row_label(&row)
                ))),
            },
            ActionKey::Custom(name) => Some(Action::Notify(format!(
                "{name}: {}",
                self.row_label(&row)
            ))),
        }
    }

    fn header_icon(&mut self, icon: HeaderIcon) -> Option<Action> {
        match icon {
            HeaderIcon::AddNew => match self.ctx.routes.add_new_target(&self.spec.key) {
                Some(path) => Some(Action::Navigate(path)),
                None => Some(Action::Notify(format!(
                    "No page is registered for adding to {}.",
                    self.spec.title
                ))),
            },
            HeaderIcon::Refresh => Some(Action::Reload),
            // search toggles locally, layout/export open menus
            _ => None,
        }
    }

    fn menu_command(&mut self, command: &str) -> Option<Action> {
        match command {
            "layout.compact" | "layout.comfortable" => {
                let density = if command == "layout.compact" {
                    Density::Compact
                } else {
                    Density::Comfortable
                };
                if let Some(view) = self.view_mut() {
                    view.set_density(density);
                }
                Some(Action::Render)
            }
            "export.json" | "export.selected" => {
                let selected_only = command == "export.selected";
                let rows: Vec<RowRecord> = match self.view() {
                    Some(view) if selected_only => {
                        view.list().selected_rows().into_iter().cloned().collect()
                    }
                    Some(view) => view.list().rows().to_vec(),
                    None => Vec::new(),
                };
                if rows.is_empty() {
                    return Some(Action::Notify("Nothing to export.".into()));
                }
                Some(match self.export(&rows) {
                    Ok(path) => Action::Notify(format!(
                        "Exported {} rows to {}",
                        rows.len(),
                        path.display()
                    )),
                    Err(err) => Action::Error(format!("{err:#}")),
                })
            }
            other => {
                debug!(page = %self.spec.key, command = other, "unknown menu command");
                None
            }
        }
    }

    fn export(&self, rows: &[RowRecord]) -> Result<PathBuf> {
        let dir = &self.ctx.exports_dir;
        std::fs::create_dir_all(dir)
            .wrap_err_with(|| format!("cannot create {}", dir.display()))?;
        let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
        let path = dir.join(format!("{}-{stamp}.json", self.spec.key));
        let body = serde_json::to_vec_pretty(rows)?;
        std::fs::write(&path, body).wrap_err_with(|| format!("cannot write {}", path.display()))?;
        info!(page = %self.spec.key, rows = rows.len(), path = %path.display(), "exported");
        Ok(path)
    }

    fn draw_message(&self, f: &mut Frame<'_>, area: Rect, text: String, style: Style) {
        let block = Block::default()
            .title(format!(" {} ", self.spec.title))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray));
        let inner = block.inner(area);
        f.render_widget(block, area);
        f.render_widget(Paragraph::new(text).style(style).centered(), inner);
    }
}

impl Page for ListPage {
    fn key(&self) -> &str {
        &self.spec.key
    }

    fn title(&self) -> &str {
        &self.spec.title
    }

    fn fixture(&self) -> Option<&str> {
        Some(&self.spec.fixture)
    }

    fn register_action_handler(&mut self, tx: UnboundedSender<Action>) -> Result<()> {
        self.tx = Some(tx);
        Ok(())
    }

    fn on_enter(&mut self) -> Result<()> {
        info!(page = %self.spec.key, "enter");
        self.state = State::Loading;
        self.all_rows.clear();
        self.pending_delete = None;
        Ok(())
    }

    fn on_exit(&mut self) -> Result<()> {
        info!(page = %self.spec.key, "exit");
        self.pending_delete = None;
        Ok(())
    }

    fn handle_key_events(&mut self, key: KeyEvent) -> Result<Option<EventResponse<Action>>> {
        if let Some((row, popup)) = self.pending_delete.as_mut() {
            match popup.on_key(key) {
                Some(PopupResult::Confirmed) => {
                    let id = row.id.clone();
                    self.pending_delete = None;
                    self.delete(&id);
                }
                Some(_) => self.pending_delete = None,
                None => {}
            }
            return Ok(Some(EventResponse::Stop(Action::Render)));
        }
        match &mut self.state {
            State::Ready(view) => view.handle_key_events(key),
            State::Failed(_) if key.code == KeyCode::Char('r') => {
                Ok(Some(EventResponse::Stop(Action::Reload)))
            }
            _ => Ok(None),
        }
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        let next = match action {
            Action::DataLoaded(loaded) if loaded.page == self.spec.key => {
                self.load(loaded.result);
                Some(Action::Render)
            }
            Action::RowAction { key, row } => self.row_action(key, row),
            Action::Search(values) => {
                self.search(&values);
                Some(Action::Render)
            }
            Action::HeaderIcon(icon) => self.header_icon(icon),
            Action::MenuCommand(command) => self.menu_command(&command),
            Action::TabChanged(tab) => {
                if let Some(view) = self.view_mut() {
                    if let Some(bar) = view.list_mut().filter_bar_mut() {
                        bar.clear();
                    }
                }
                self.all_rows = self
                    .view()
                    .map(|v| v.list().rows().to_vec())
                    .unwrap_or_default();
                debug!(page = %self.spec.key, tab = %tab, rows = self.all_rows.len(), "tab rows");
                Some(Action::Render)
            }
            _ => None,
        };
        Ok(next)
    }

    fn draw(&mut self, f: &mut Frame<'_>, area: Rect) -> Result<()> {
        let message = match &self.state {
            State::Loading => Some(("Loading…".to_string(), Style::default().fg(Color::Gray))),
            State::Failed(msg) => Some((format!("Error: {msg}"), Style::default().fg(Color::Red))),
            State::Ready(_) => None,
        };
        if let Some((text, style)) = message {
            self.draw_message(f, area, text, style);
        } else if let State::Ready(view) = &mut self.state {
            view.draw(f, area)?;
        }
        if let Some((_, popup)) = self.pending_delete.as_mut() {
            render_backdrop(f, area);
            popup.draw(f, area)?;
        }
        Ok(())
    }

    fn hints(&self) -> Vec<(&'static str, &'static str)> {
        if self.pending_delete.is_some() {
            return vec![("←/→", "Choose"), ("Enter", "Confirm"), ("Esc", "Cancel")];
        }
        match &self.state {
            State::Ready(view) => view.hints(),
            State::Failed(_) => vec![("r", "Retry")],
            State::Loading => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::Loaded;
    use crossterm::event::KeyModifiers;
    use grid::{ColumnSpec, FilterValues, RouteTable, TableData, with_ids};
    use pretty_assertions::assert_eq;
    use ratatui::{Terminal, backend::TestBackend};
    use serde_json::json;
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn rows() -> Vec<RowRecord> {
        let raw = json!([
            { "id": "b1", "bookingNo": "BK-1001", "status": "Open" },
            { "id": "b2", "bookingNo": "BK-1002", "status": "Closed" },
            { "id": "b3", "bookingNo": "BK-2001", "status": "Open" }
        ]);
        let serde_json::Value::Array(items) = raw else {
            unreachable!()
        };
        with_ids(
            items
                .into_iter()
                .filter_map(|v| v.as_object().cloned())
                .collect(),
        )
    }

    fn table() -> Dataset {
        Dataset::Table(TableData::new(
            vec![
                ColumnSpec::new("bookingNo", "Booking No"),
                ColumnSpec::new("status", "Status"),
            ],
            rows(),
        ))
    }

    fn page(dir: &std::path::Path) -> (ListPage, UnboundedReceiver<Action>) {
        let spec = ListSpec::new("bookings", "Bookings", "bookings")
            .filters(vec![
                FilterFieldSpec::text("bookingNo", "Booking No"),
                FilterFieldSpec::select("status", "Status", ["Open", "Closed"]),
            ])
            .actions(["view", "delete"])
            .icons(HeaderIcons::all())
            .export_menu(vec![MenuEntry::new("All rows (JSON)", "export.json")])
            .selectable();
        let routes = RouteTable::new().with("bookings", "/bookings");
        let ctx = PageContext::new(routes, dir);
        let mut page = ListPage::new(spec, ctx);
        let (tx, rx) = mpsc::unbounded_channel();
        page.register_action_handler(tx).unwrap();
        page.on_enter().unwrap();
        (page, rx)
    }

    fn loaded(result: std::result::Result<Dataset, String>) -> Action {
        Action::DataLoaded(Loaded {
            page: "bookings".into(),
            generation: 1,
            result,
        })
    }

    /// Feed queued actions back into the page, like the app loop does, and
    /// return what the page asked for in turn.
    fn pump(page: &mut ListPage, rx: &mut UnboundedReceiver<Action>) -> Vec<Action> {
        let mut out = Vec::new();
        while let Ok(action) = rx.try_recv() {
            if let Some(next) = page.update(action).unwrap() {
                out.push(next);
            }
        }
        out
    }

    fn screen(page: &mut ListPage) -> String {
        let mut terminal = Terminal::new(TestBackend::new(90, 20)).unwrap();
        terminal
            .draw(|f| {
                let area = f.area();
                page.draw(f, area).unwrap();
            })
            .unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer
            .content()
            .chunks(90)
            .map(|line| line.iter().map(|c| c.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn loading_then_error() {
        let dir = tempfile::tempdir().unwrap();
        let (mut page, _rx) = page(dir.path());
        assert!(page.is_loading());
        assert!(screen(&mut page).contains("Loading…"));

        page.update(loaded(Err("fixture not found: bookings".into())))
            .unwrap();
        assert_eq!(page.error(), Some("fixture not found: bookings"));
        assert!(screen(&mut page).contains("Error: fixture not found: bookings"));
        let retry = page.handle_key_events(key(KeyCode::Char('r'))).unwrap();
        assert_eq!(retry, Some(EventResponse::Stop(Action::Reload)));
    }

    #[test]
    fn other_pages_results_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let (mut page, _rx) = page(dir.path());
        let other = Action::DataLoaded(Loaded {
            page: "claims".into(),
            generation: 1,
            result: Ok(table()),
        });
        assert_eq!(page.update(other).unwrap(), None);
        assert!(page.is_loading());
    }

    #[test]
    fn delete_asks_first() {
        let dir = tempfile::tempdir().unwrap();
        let (mut page, mut rx) = page(dir.path());
        page.update(loaded(Ok(table()))).unwrap();

        page.handle_key_events(key(KeyCode::Char('d'))).unwrap();
        pump(&mut page, &mut rx);
        assert!(page.confirming_delete());
        assert!(screen(&mut page).contains("Delete BK-1001?"));

        // cancel keeps the row
        page.handle_key_events(key(KeyCode::Esc)).unwrap();
        assert_eq!(page.view().unwrap().list().rows().len(), 3);

        page.handle_key_events(key(KeyCode::Char('d'))).unwrap();
        pump(&mut page, &mut rx);
        page.handle_key_events(key(KeyCode::Enter)).unwrap();
        let ids: Vec<_> = page
            .view()
            .unwrap()
            .list()
            .rows()
            .iter()
            .map(|r| r.id.clone())
            .collect();
        assert_eq!(ids, vec!["b2", "b3"]);

        // a later search does not bring it back
        let values: FilterValues = [("bookingNo".to_string(), "BK-1".to_string())]
            .into_iter()
            .collect();
        page.update(Action::Search(values)).unwrap();
        assert_eq!(page.view().unwrap().list().rows().len(), 1);
    }

    #[test]
    fn disabled_edit_is_not_dispatched() {
        let dir = tempfile::tempdir().unwrap();
        let (mut page, mut rx) = page(dir.path());
        page.update(loaded(Ok(table()))).unwrap();
        page.handle_key_events(key(KeyCode::Char('e'))).unwrap();
        assert!(pump(&mut page, &mut rx).is_empty());

        page.handle_key_events(key(KeyCode::Char('v'))).unwrap();
        let out = pump(&mut page, &mut rx);
        assert_eq!(
            out,
            vec![Action::Notify("Booking No: BK-1001\nStatus: Open".into())]
        );
    }

    #[test]
    fn search_filters_from_the_bar() {
        let dir = tempfile::tempdir().unwrap();
        let (mut page, mut rx) = page(dir.path());
        page.update(loaded(Ok(table()))).unwrap();

        // open filters, focus status, pick "Closed", press Search
        for code in [
            KeyCode::Char('/'),
            KeyCode::Down,
            KeyCode::Right,
            KeyCode::Right,
            KeyCode::Down,
            KeyCode::Enter,
        ] {
            page.handle_key_events(key(code)).unwrap();
        }
        pump(&mut page, &mut rx);
        let rows = page.view().unwrap().list().rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, "b2");
    }

    #[test]
    fn add_new_and_refresh() {
        let dir = tempfile::tempdir().unwrap();
        let (mut page, mut rx) = page(dir.path());
        page.update(loaded(Ok(table()))).unwrap();
        page.handle_key_events(key(KeyCode::Char('n'))).unwrap();
        page.handle_key_events(key(KeyCode::Char('r'))).unwrap();
        assert_eq!(
            pump(&mut page, &mut rx),
            vec![Action::Navigate("/bookings/new".into()), Action::Reload]
        );
    }

    #[test]
    fn export_writes_json() {
        let dir = tempfile::tempdir().unwrap();
        let (mut page, mut rx) = page(dir.path());
        page.update(loaded(Ok(table()))).unwrap();
        page.handle_key_events(key(KeyCode::Char('x'))).unwrap();
        page.handle_key_events(key(KeyCode::Enter)).unwrap();
        let out = pump(&mut page, &mut rx);
        assert!(matches!(&out[..], [Action::Notify(msg)] if msg.starts_with("Exported 3 rows")));

        let files: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .collect();
        assert_eq!(files.len(), 1);
        let body = std::fs::read_to_string(files[0].path()).unwrap();
        let exported: Vec<RowRecord> = serde_json::from_str(&body).unwrap();
        assert_eq!(exported, rows());
    }
}
