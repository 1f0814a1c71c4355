use crossterm::event::{Event as CrosstermEvent, KeyCode, KeyEvent};
use grid::{FilterBar, FilterKind, options};
use ratatui::{
    layout::Rect,
    style::{Color, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph},
};
use tracing::debug;
use tui_input::{Input, backend::crossterm::EventHandler};

use crate::tui::Frame;

/// What a key did to the filter bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOutcome {
    Consumed,
    /// The Search button was pressed.
    Search,
    /// Esc outside of editing: the bar wants to close.
    Close,
    Ignored,
}

/// Keyboard focus and inline editing for a [`FilterBar`]. The bar itself
/// stays with the list that owns it.
///
/// Focus runs over the fields, then the Search and Clear buttons.
#[derive(Default)]
pub struct FilterBarView {
    focus: usize,
    editing: Option<Input>,
    error: Option<String>,
}

impl FilterBarView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn focus(&self) -> usize {
        self.focus
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    /// Rows needed to draw `bar`, borders included.
    pub fn height(bar: &FilterBar) -> u16 {
        bar.fields().len() as u16 + 3
    }

    fn search_slot(bar: &FilterBar) -> usize {
        bar.fields().len()
    }

    pub fn handle_key(&mut self, bar: &mut FilterBar, key: KeyEvent) -> FilterOutcome {
        if self.editing.is_some() {
            return self.handle_editing(bar, key);
        }
        let slots = bar.fields().len() + 2;
        match key.code {
            KeyCode::Up | KeyCode::BackTab => {
                self.focus = self.focus.checked_sub(1).unwrap_or(slots - 1);
                FilterOutcome::Consumed
            }
            KeyCode::Down | KeyCode::Tab => {
                self.focus = (self.focus + 1) % slots;
                FilterOutcome::Consumed
            }
            KeyCode::Left | KeyCode::Right => {
                let dir = if key.code == KeyCode::Left { -1 } else { 1 };
                if let Some(field) = bar.fields().get(self.focus) {
                    let name = field.name.clone();
                    if let Err(err) = bar.cycle_option(&name, dir) {
                        debug!(field = %name, error = %err, "filter option not changed");
                    }
                }
                FilterOutcome::Consumed
            }
            KeyCode::Enter => {
                let search = Self::search_slot(bar);
                if self.focus == search {
                    return FilterOutcome::Search;
                }
                if self.focus == search + 1 {
                    bar.clear();
                    self.error = None;
                    return FilterOutcome::Consumed;
                }
                if let Some(field) = bar.fields().get(self.focus) {
                    let start = match field.kind {
                        // type-ahead starts from scratch
                        FilterKind::FilterSelect { .. } => String::new(),
                        _ => bar.value(&field.name).unwrap_or("").to_string(),
                    };
                    if !matches!(field.kind, FilterKind::Select { .. }) {
                        self.editing = Some(Input::new(start));
                    }
                }
                FilterOutcome::Consumed
            }
            KeyCode::Backspace | KeyCode::Delete => {
                if let Some(field) = bar.fields().get(self.focus) {
                    let name = field.name.clone();
                    if let Err(err) = bar.set_value(&name, "") {
                        debug!(field = %name, error = %err, "filter not cleared");
                    }
                }
                FilterOutcome::Consumed
            }
            KeyCode::Esc => FilterOutcome::Close,
            _ => FilterOutcome::Ignored,
        }
    }

    fn handle_editing(&mut self, bar: &mut FilterBar, key: KeyEvent) -> FilterOutcome {
        match key.code {
            KeyCode::Esc => {
                self.editing = None;
                self.error = None;
            }
            KeyCode::Enter => {
                let Some(input) = self.editing.take() else {
                    return FilterOutcome::Consumed;
                };
                let Some(field) = bar.fields().get(self.focus) else {
                    return FilterOutcome::Consumed;
                };
                let name = field.name.clone();
                let value = match field.kind {
                    FilterKind::FilterSelect { .. } => field
                        .matching_options(input.value())
                        .first()
                        .map(|o| o.value.clone())
                        .unwrap_or_default(),
                    _ => input.value().trim().to_string(),
                };
                match bar.set_value(&name, value) {
                    Ok(()) => self.error = None,
                    Err(err) => {
                        self.error = Some(err.to_string());
                        self.editing = Some(input);
                    }
                }
            }
            _ => {
                if let Some(input) = self.editing.as_mut() {
                    input.handle_event(&CrosstermEvent::Key(key));
                }
            }
        }
        FilterOutcome::Consumed
    }

    pub fn draw(&self, f: &mut Frame<'_>, area: Rect, bar: &FilterBar, focused: bool) {
        let block = Block::default()
            .title(" Filters ")
            .borders(Borders::ALL)
            .border_style(if focused {
                Style::default().fg(Color::Cyan)
            } else {
                Style::default().fg(Color::DarkGray)
            });
        let inner = block.inner(area);
        f.render_widget(block, area);

        let label_width = bar
            .fields()
            .iter()
            .map(|f| f.label.chars().count())
            .max()
            .unwrap_or(0);

        let mut lines: Vec<Line> = Vec::new();
        for (idx, field) in bar.fields().iter().enumerate() {
            let is_focused = focused && idx == self.focus;
            let raw = bar.value(&field.name).unwrap_or("");
            let shown = match (&self.editing, is_focused) {
                (Some(input), true) => format!("{}▏", input.value()),
                _ => match field.kind.options() {
                    Some(_) if raw.is_empty() => "Any".to_string(),
                    Some(opts) => options::label_for(opts, raw).to_string(),
                    None if raw.is_empty() => String::new(),
                    None => raw.to_string(),
                },
            };
            let label_style = if is_focused {
                Style::default().bold()
            } else {
                Style::default()
            };
            let value_style = if is_focused {
                Style::default().fg(Color::Black).bg(Color::White)
            } else {
                Style::default().fg(Color::Gray)
            };
            let mut spans = vec![
                Span::styled(format!("{:<label_width$}  ", field.label), label_style),
                Span::styled(format!(" {shown} "), value_style),
            ];
            if let FilterKind::Select { .. } | FilterKind::FilterSelect { .. } = field.kind {
                spans.push(Span::styled(" ◂▸", Style::default().fg(Color::DarkGray)));
            }
            lines.push(Line::from(spans));
        }

        let button = |label: &str, slot: usize| {
            let style = if focused && self.focus == slot {
                Style::default().fg(Color::Black).bg(Color::White).bold()
            } else {
                Style::default().fg(Color::White)
            };
            Span::styled(format!("[ {label} ]"), style)
        };
        let search = Self::search_slot(bar);
        let mut buttons = vec![button("Search", search), Span::raw("  "), button("Clear", search + 1)];
        if let Some(err) = &self.error {
            buttons.push(Span::styled(format!("  {err}"), Style::default().fg(Color::Red)));
        }
        lines.push(Line::from(buttons));

        f.render_widget(Paragraph::new(Text::from(lines)), inner);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use grid::FilterFieldSpec;
    use pretty_assertions::assert_eq;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn bar() -> FilterBar {
        FilterBar::new(vec![
            FilterFieldSpec::text("bookingNo", "Booking No"),
            FilterFieldSpec::select("status", "Status", ["Open", "Closed"]),
            FilterFieldSpec::date("bookingDate", "Booking Date"),
        ])
    }

    #[test]
    fn edits_text_and_cycles_select() {
        let mut bar = bar();
        let mut view = FilterBarView::new();

        view.handle_key(&mut bar, key(KeyCode::Enter));
        assert!(view.is_editing());
        for c in "BK-1".chars() {
            view.handle_key(&mut bar, key(KeyCode::Char(c)));
        }
        view.handle_key(&mut bar, key(KeyCode::Enter));
        assert_eq!(bar.value("bookingNo"), Some("BK-1"));

        view.handle_key(&mut bar, key(KeyCode::Down));
        view.handle_key(&mut bar, key(KeyCode::Right));
        view.handle_key(&mut bar, key(KeyCode::Right));
        assert_eq!(bar.value("status"), Some("Closed"));
    }

    #[test]
    fn bad_date_stays_in_edit_mode() {
        let mut bar = bar();
        let mut view = FilterBarView::new();
        view.handle_key(&mut bar, key(KeyCode::Up));
        view.handle_key(&mut bar, key(KeyCode::Up));
        view.handle_key(&mut bar, key(KeyCode::Up));
        assert_eq!(view.focus(), 2);
        view.handle_key(&mut bar, key(KeyCode::Enter));
        for c in "31/12".chars() {
            view.handle_key(&mut bar, key(KeyCode::Char(c)));
        }
        view.handle_key(&mut bar, key(KeyCode::Enter));
        assert!(view.is_editing());
        assert_eq!(bar.value("bookingDate"), Some(""));
    }

    #[test]
    fn search_button_and_escape() {
        let mut bar = bar();
        let mut view = FilterBarView::new();
        for _ in 0..3 {
            view.handle_key(&mut bar, key(KeyCode::Tab));
        }
        assert_eq!(view.handle_key(&mut bar, key(KeyCode::Enter)), FilterOutcome::Search);
        assert_eq!(view.handle_key(&mut bar, key(KeyCode::Esc)), FilterOutcome::Close);
    }
}
