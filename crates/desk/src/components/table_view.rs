//! Terminal rendering of a [`ListView`]: tab strip, header icons, filter
//! bar, the grid itself with selection and action columns, and a pager
//! footer.
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use grid::{ActionKey, HeaderIcon, IconOutcome, ListView};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Cell, Paragraph, Row, Table, TableState, Tabs},
};
use tracing::debug;

use crate::{
    action::{Action, PopupResult},
    components::{
        Component, PopupComponent,
        filter_view::{FilterBarView, FilterOutcome},
        popups::MenuPopup,
    },
    tui::{EventResponse, Frame},
};

pub const EMPTY_MESSAGE: &str = "No data available";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Density {
    #[default]
    Comfortable,
    Compact,
}

pub struct TableView {
    title: String,
    list: ListView,
    filter: FilterBarView,
    filter_focused: bool,
    /// Index into the enabled actions of the cursor row.
    action_cursor: usize,
    density: Density,
    menu: Option<(HeaderIcon, MenuPopup)>,
}

impl TableView {
    pub fn new(title: impl Into<String>, list: ListView) -> Self {
        Self {
            title: title.into(),
            list,
            filter: FilterBarView::new(),
            filter_focused: false,
            action_cursor: 0,
            density: Density::default(),
            menu: None,
        }
    }

    pub fn list(&self) -> &ListView {
        &self.list
    }

    pub fn list_mut(&mut self) -> &mut ListView {
        &mut self.list
    }

    pub fn density(&self) -> Density {
        self.density
    }

    pub fn set_density(&mut self, density: Density) {
        self.density = density;
    }

    pub fn menu_open(&self) -> bool {
        self.menu.is_some()
    }

    pub fn filter_focused(&self) -> bool {
        self.filter_focused && self.list.filters_open()
    }

    fn press_icon(&mut self, icon: HeaderIcon) {
        match self.list.press_icon(icon) {
            IconOutcome::FiltersToggled(open) => self.filter_focused = open,
            IconOutcome::Menu(labels) => {
                self.menu = Some((icon, MenuPopup::new(icon.to_string(), labels)));
            }
            IconOutcome::Hidden | IconOutcome::Dispatched => {}
        }
    }

    fn dispatch(&mut self, key: &ActionKey) {
        let Some(row_id) = self.list.cursor_row().map(|r| r.id.clone()) else {
            return;
        };
        if let Err(err) = self.list.click_action(key, &row_id) {
            debug!(%key, row_id = %row_id, error = %err, "row action not dispatched");
        }
    }

    fn switch_tab(&mut self, step: i32) {
        let Some(next) = self
            .list
            .tabs()
            .and_then(|t| t.neighbour(step))
            .map(str::to_string)
        else {
            return;
        };
        if let Err(err) = self.list.switch_tab(&next) {
            debug!(tab = %next, error = %err, "tab switch failed");
        }
        self.action_cursor = 0;
    }

    fn handle_menu_key(&mut self, key: KeyEvent) {
        let Some((icon, menu)) = self.menu.as_mut() else {
            return;
        };
        let icon = *icon;
        match menu.on_key(key) {
            Some(PopupResult::Chosen(idx)) => {
                self.menu = None;
                if let Err(err) = self.list.activate_menu_item(icon, idx) {
                    debug!(%icon, idx, error = %err, "menu entry missing");
                }
            }
            Some(_) => self.menu = None,
            None => {}
        }
    }

    fn handle_filter_key(&mut self, key: KeyEvent) -> bool {
        let Some(bar) = self.list.filter_bar_mut() else {
            return false;
        };
        match self.filter.handle_key(bar, key) {
            FilterOutcome::Consumed => true,
            FilterOutcome::Search => {
                self.list.search();
                self.filter_focused = false;
                true
            }
            FilterOutcome::Close => {
                self.press_icon(HeaderIcon::Search);
                self.filter_focused = false;
                true
            }
            FilterOutcome::Ignored => false,
        }
    }

    /// Returns true when the key was used.
    fn handle_table_key(&mut self, key: KeyEvent) -> bool {
        let actions = self.list.enabled_actions().len();
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.list.move_cursor(-1),
            KeyCode::Down | KeyCode::Char('j') => self.list.move_cursor(1),
            KeyCode::PageDown | KeyCode::Char(']') => {
                self.list.next_page();
            }
            KeyCode::PageUp | KeyCode::Char('[') => {
                self.list.prev_page();
            }
            KeyCode::Left | KeyCode::Char('h') => {
                self.action_cursor = self.action_cursor.saturating_sub(1);
            }
            KeyCode::Right | KeyCode::Char('l') => {
                if self.action_cursor + 1 < actions {
                    self.action_cursor += 1;
                }
            }
            KeyCode::Enter => {
                if let Some(key) = self.list.enabled_actions().get(self.action_cursor).cloned() {
                    self.dispatch(&key);
                }
            }
            KeyCode::Char('e') => self.dispatch(&ActionKey::Edit),
            KeyCode::Char('v') => self.dispatch(&ActionKey::View),
            KeyCode::Char('d') | KeyCode::Delete => self.dispatch(&ActionKey::Delete),
            KeyCode::Char(' ') => {
                if let Some(id) = self.list.cursor_row().map(|r| r.id.clone()) {
                    self.list.toggle_selected(&id);
                }
            }
            KeyCode::Char('a') => self.list.toggle_select_page(),
            KeyCode::Char(c @ '1'..='9') => {
                let idx = c as usize - '1' as usize;
                let Some(column) = self.list.columns().get(idx).map(|c| c.accessor_key.clone())
                else {
                    return false;
                };
                return self.list.toggle_sort(&column);
            }
            KeyCode::Tab => self.switch_tab(1),
            KeyCode::BackTab => self.switch_tab(-1),
            KeyCode::Char('/') => self.press_icon(HeaderIcon::Search),
            KeyCode::Char('f') if self.list.filters_open() => self.filter_focused = true,
            KeyCode::Char('m') => self.press_icon(HeaderIcon::Layout),
            KeyCode::Char('x') => self.press_icon(HeaderIcon::Export),
            KeyCode::Char('n') => self.press_icon(HeaderIcon::AddNew),
            KeyCode::Char('r') => self.press_icon(HeaderIcon::Refresh),
            _ => return false,
        }
        if actions > 0 {
            self.action_cursor = self.action_cursor.min(actions - 1);
        }
        true
    }

    pub fn hints(&self) -> Vec<(&'static str, &'static str)> {
        if self.menu.is_some() {
            return vec![("↑/↓", "Select"), ("Enter", "Choose"), ("Esc", "Close")];
        }
        if self.filter_focused() {
            return vec![
                ("↑/↓", "Field"),
                ("Enter", "Edit"),
                ("←/→", "Option"),
                ("Esc", "Close filters"),
            ];
        }
        let mut hints = vec![("↑/↓", "Row"), ("←/→ Enter", "Action"), ("[/]", "Page")];
        if self.list.tabs().is_some() {
            hints.push(("Tab", "Next tab"));
        }
        hints.push(("1-9", "Sort"));
        if self.list.is_selectable() {
            hints.push(("Space", "Select"));
        }
        hints
    }

    /// Tab strip, if the list has tabs. Returns the rows used.
    pub fn draw_tabs(&self, f: &mut Frame<'_>, area: Rect) -> u16 {
        let Some(tabs) = self.list.tabs() else {
            return 0;
        };
        let titles: Vec<Line> = tabs
            .labels()
            .map(|(_, label)| Line::from(label.to_string()))
            .collect();
        let widget = Tabs::new(titles)
            .select(tabs.active_index())
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White).bold())
            .divider("│");
        f.render_widget(widget, Rect { height: 1, ..area });
        1
    }

    fn draw_header(&self, f: &mut Frame<'_>, area: Rect) {
        let icons = self.list.icons();
        let mut spans = vec![Span::styled(self.title.clone(), Style::default().bold())];
        for icon in icons.visible() {
            let key = match icon {
                HeaderIcon::Search => "/",
                HeaderIcon::Layout => "m",
                HeaderIcon::Export => "x",
                HeaderIcon::AddNew => "n",
                HeaderIcon::Refresh => "r",
            };
            let active = icon == HeaderIcon::Search && self.list.filters_open();
            let style = if active {
                Style::default().fg(Color::Cyan)
            } else {
                Style::default().fg(Color::Gray)
            };
            spans.push(Span::raw("  "));
            spans.push(Span::styled(icon.glyph(), style));
            spans.push(Span::styled(format!(" ({key})"), Style::default().fg(Color::DarkGray)));
        }
        f.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn draw_grid(&self, f: &mut Frame<'_>, area: Rect) {
        let list = &self.list;
        let selectable = list.is_selectable();
        let rows = list.visible_rows();

        let mut header = Vec::new();
        if selectable {
            let all = !rows.is_empty() && rows.iter().all(|r| list.is_selected(&r.id));
            header.push(Cell::from(if all { "[x]" } else { "[ ]" }));
        }
        for column in list.columns() {
            let indicator = list
                .sort_direction(&column.accessor_key)
                .map(|d| format!(" {}", d.indicator()))
                .unwrap_or_default();
            header.push(Cell::from(format!("{}{indicator}", column.header)));
        }
        let has_actions = !list.enabled_actions().is_empty();
        if has_actions {
            header.push(Cell::from("Actions"));
        }

        let cursor = list.cursor();
        let body: Vec<Row> = rows
            .iter()
            .enumerate()
            .map(|(pos, row)| {
                let mut cells = Vec::new();
                if selectable {
                    cells.push(Cell::from(if list.is_selected(&row.id) { "[x]" } else { "[ ]" }));
                }
                for column in list.columns() {
                    cells.push(Cell::from(list.cell_text(row, &column.accessor_key)));
                }
                if has_actions {
                    let mut spans = Vec::new();
                    for (idx, key) in list.actions_for(row).into_iter().enumerate() {
                        let style = if pos == cursor && idx == self.action_cursor {
                            Style::default().add_modifier(Modifier::REVERSED)
                        } else {
                            Style::default()
                        };
                        spans.push(Span::styled(format!("{} {}", key.glyph(), key.label()), style));
                        spans.push(Span::raw(" "));
                    }
                    cells.push(Cell::from(Line::from(spans)));
                }
                Row::new(cells)
            })
            .collect();

        let mut widths = Vec::new();
        if selectable {
            widths.push(Constraint::Length(3));
        }
        widths.extend(list.columns().iter().map(|_| Constraint::Fill(1)));
        if has_actions {
            let len: usize = list
                .enabled_actions()
                .iter()
                .map(|k| k.label().chars().count() + 3)
                .sum();
            widths.push(Constraint::Length(len.max(7) as u16));
        }

        let (spacing, margin) = match self.density {
            Density::Comfortable => (2, 1),
            Density::Compact => (1, 0),
        };
        let table = Table::new(body, widths)
            .header(
                Row::new(header)
                    .style(Style::default().bold().fg(Color::White))
                    .bottom_margin(margin),
            )
            .column_spacing(spacing)
            .row_highlight_style(Style::default().bg(Color::DarkGray));
        let mut state = TableState::default().with_selected(if rows.is_empty() {
            None
        } else {
            Some(cursor)
        });
        f.render_stateful_widget(table, area, &mut state);
    }

    fn draw_footer(&self, f: &mut Frame<'_>, area: Rect) {
        let list = &self.list;
        let mut text = format!(
            "Page {}/{} · {} rows",
            list.page() + 1,
            list.page_count(),
            list.rows().len()
        );
        if list.is_selectable() {
            text.push_str(&format!(" · {} selected", list.selected_rows().len()));
        }
        if let Some(sort) = list.sort_state() {
            text.push_str(&format!(" · sort {} {}", sort.key, sort.direction.indicator()));
        }
        f.render_widget(
            Paragraph::new(Span::styled(text, Style::default().fg(Color::DarkGray))),
            area,
        );
    }
}

impl Component for TableView {
    fn handle_key_events(&mut self, key: KeyEvent) -> Result<Option<EventResponse<Action>>> {
        let used = if self.menu.is_some() {
            self.handle_menu_key(key);
            true
        } else if self.filter_focused() {
            self.handle_filter_key(key)
        } else {
            self.handle_table_key(key)
        };
        Ok(used.then_some(EventResponse::Stop(Action::Render)))
    }

    fn draw(&mut self, f: &mut Frame<'_>, area: Rect) -> Result<()> {
        let tab_rows = if self.list.tabs().is_some() { 1 } else { 0 };
        let filter_rows = match self.list.filter_bar() {
            Some(bar) if self.list.filters_open() => FilterBarView::height(bar),
            _ => 0,
        };
        let [tabs, header, filters, body, footer] = Layout::vertical([
            Constraint::Length(tab_rows),
            Constraint::Length(1),
            Constraint::Length(filter_rows),
            Constraint::Fill(1),
            Constraint::Length(1),
        ])
        .areas(area);

        self.draw_tabs(f, tabs);
        self.draw_header(f, header);
        if let (Some(bar), true) = (self.list.filter_bar(), filter_rows > 0) {
            self.filter.draw(f, filters, bar, self.filter_focused());
        }

        if self.list.is_empty() {
            f.render_widget(
                Paragraph::new(EMPTY_MESSAGE).style(Style::default().fg(Color::DarkGray)),
                body,
            );
        } else {
            self.draw_grid(f, body);
            self.draw_footer(f, footer);
        }

        if let Some((_, menu)) = self.menu.as_mut() {
            menu.draw(f, area)?;
        }
        Ok(())
    }
}
