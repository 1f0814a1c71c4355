use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::{Color, Style, Stylize},
    text::{Line, Span, Text},
    widgets::Paragraph,
};

use crate::{
    action::{Action, PopupResult},
    components::{
        Component, PopupComponent, centered_rect_fixed, draw_popup_frame, hint_line,
        popup::respond,
    },
    tui::{EventResponse, Frame},
};

/// Pick one entry from a list of labels.
///
/// Up/Down move (wrapping), Enter reports `Chosen(index)`, Esc cancels. An
/// empty menu cancels on Enter.
pub struct MenuPopup {
    title: String,
    items: Vec<String>,
    selected: usize,
    scroll: usize,
    min_width: u16,
}

impl MenuPopup {
    pub fn new(title: impl Into<String>, items: Vec<String>) -> Self {
        Self {
            title: title.into(),
            items,
            selected: 0,
            scroll: 0,
            min_width: 40,
        }
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    fn ensure_visible(&mut self, rows: usize) {
        let rows = rows.max(1);
        if self.selected < self.scroll {
            self.scroll = self.selected;
        } else if self.selected >= self.scroll + rows {
            self.scroll = self.selected + 1 - rows;
        }
    }
}

impl PopupComponent for MenuPopup {
    fn on_key(&mut self, key: KeyEvent) -> Option<PopupResult> {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                if !self.items.is_empty() {
                    self.selected = self
                        .selected
                        .checked_sub(1)
                        .unwrap_or(self.items.len() - 1);
                }
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if !self.items.is_empty() {
                    self.selected = (self.selected + 1) % self.items.len();
                }
                None
            }
            KeyCode::Enter if self.items.is_empty() => Some(PopupResult::Cancelled),
            KeyCode::Enter => Some(PopupResult::Chosen(self.selected)),
            KeyCode::Esc => Some(PopupResult::Cancelled),
            _ => None,
        }
    }
}

impl Component for MenuPopup {
    fn handle_key_events(&mut self, key: KeyEvent) -> Result<Option<EventResponse<Action>>> {
        Ok(respond(self.on_key(key)))
    }

    fn draw(&mut self, f: &mut Frame<'_>, area: Rect) -> Result<()> {
        if area.width < 5 || area.height < 5 {
            return Ok(());
        }

        let height = (self.items.len() as u16).clamp(1, 12) + 4;
        let dialog = centered_rect_fixed(area, self.min_width, height);
        let inner = draw_popup_frame(f, dialog, &self.title);

        let rows = inner.height.saturating_sub(2) as usize;
        self.ensure_visible(rows);

        let mut lines: Vec<Line> = Vec::new();
        if self.items.is_empty() {
            lines.push(Line::from(Span::styled(
                "No options available",
                Style::default().fg(Color::DarkGray),
            )));
        }
        for (idx, label) in self.items.iter().enumerate().skip(self.scroll).take(rows) {
            if idx == self.selected {
                lines.push(Line::from(vec![
                    Span::raw("> "),
                    Span::styled(
                        label.clone(),
                        Style::default().fg(Color::Black).bg(Color::White).bold(),
                    ),
                ]));
            } else {
                lines.push(Line::from(vec![Span::raw("  "), Span::raw(label.clone())]));
            }
        }
        lines.push(Line::raw(""));
        lines.push(hint_line(&[("↑/↓", "Select"), ("Enter", "Choose"), ("Esc", "Cancel")]));

        f.render_widget(Paragraph::new(Text::from(lines)), inner);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use pretty_assertions::assert_eq;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn navigation_wraps() {
        let mut menu = MenuPopup::new("Export", vec!["JSON".into(), "Selected rows".into()]);
        menu.on_key(key(KeyCode::Up));
        assert_eq!(menu.selected(), 1);
        menu.on_key(key(KeyCode::Down));
        assert_eq!(menu.on_key(key(KeyCode::Enter)), Some(PopupResult::Chosen(0)));
    }

    #[test]
    fn empty_menu_cancels() {
        let mut menu = MenuPopup::new("Nothing", vec![]);
        menu.on_key(key(KeyCode::Down));
        assert_eq!(menu.on_key(key(KeyCode::Enter)), Some(PopupResult::Cancelled));
    }
}
