use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::{Color, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Paragraph, Wrap},
};

use crate::{
    action::{Action, PopupResult},
    components::{
        Component, PopupComponent, centered_rect_fixed, draw_popup_frame, hint_line,
        popup::respond,
    },
    tui::{EventResponse, Frame},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Choice {
    Ok,
    Cancel,
}

/// Modal confirmation with OK/Cancel buttons.
///
/// - Left/Right, Tab/BackTab: switch button
/// - Enter: `Confirmed` or `Cancelled` depending on the button
/// - Esc: `Cancelled`
pub struct ConfirmPopup {
    title: String,
    question: String,
    ok_label: String,
    cancel_label: String,
    selected: Choice,
    min_width: u16,
    min_height: u16,
}

impl ConfirmPopup {
    pub fn new<T: Into<String>, Q: Into<String>>(title: T, question: Q) -> Self {
        Self {
            title: title.into(),
            question: question.into(),
            ok_label: "OK".into(),
            cancel_label: "Cancel".into(),
            selected: Choice::Ok,
            min_width: 60,
            min_height: 9,
        }
    }

    pub fn ok_label<S: Into<String>>(mut self, label: S) -> Self {
        self.ok_label = label.into();
        self
    }

    pub fn cancel_label<S: Into<String>>(mut self, label: S) -> Self {
        self.cancel_label = label.into();
        self
    }

    fn toggle_selection(&mut self) {
        self.selected = match self.selected {
            Choice::Ok => Choice::Cancel,
            Choice::Cancel => Choice::Ok,
        };
    }

    fn button(&self, label: &str, choice: Choice) -> Span<'static> {
        let style = if self.selected == choice {
            Style::default().fg(Color::Black).bg(Color::White).bold()
        } else {
            Style::default().fg(Color::White).bg(Color::Black)
        };
        Span::styled(format!("[ {label} ]"), style)
    }
}

impl PopupComponent for ConfirmPopup {
    fn on_key(&mut self, key: KeyEvent) -> Option<PopupResult> {
        match key.code {
            KeyCode::Left | KeyCode::Right | KeyCode::Tab | KeyCode::BackTab => {
                self.toggle_selection();
                None
            }
            KeyCode::Enter => Some(match self.selected {
                Choice::Ok => PopupResult::Confirmed,
                Choice::Cancel => PopupResult::Cancelled,
            }),
            KeyCode::Esc => Some(PopupResult::Cancelled),
            _ => None,
        }
    }
}

impl Component for ConfirmPopup {
    fn handle_key_events(&mut self, key: KeyEvent) -> Result<Option<EventResponse<Action>>> {
        Ok(respond(self.on_key(key)))
    }

    fn draw(&mut self, f: &mut Frame<'_>, area: Rect) -> Result<()> {
        if area.width < 5 || area.height < 5 {
            return Ok(());
        }

        let dialog = centered_rect_fixed(area, self.min_width, self.min_height);
        let inner = draw_popup_frame(f, dialog, &self.title);

        let mut lines: Vec<Line> = self
            .question
            .lines()
            .map(|l| Line::from(Span::raw(l.to_string())))
            .collect();
        if inner.height >= 3 {
            lines.push(Line::raw(""));
        }

        // buttons centered by left padding
        let spacing = "   ";
        let buttons_len = (4 + self.ok_label.len()) + spacing.len() + (4 + self.cancel_label.len());
        let pad = (inner.width as usize).saturating_sub(buttons_len) / 2;
        lines.push(Line::from(vec![
            Span::raw(" ".repeat(pad)),
            self.button(&self.ok_label, Choice::Ok),
            Span::raw(spacing),
            self.button(&self.cancel_label, Choice::Cancel),
        ]));

        if inner.height >= 4 {
            lines.push(Line::raw(""));
            lines.push(hint_line(&[
                ("←/→/Tab", "Select"),
                ("Enter", "Confirm"),
                ("Esc", "Cancel"),
            ]));
        }

        let para = Paragraph::new(Text::from(lines)).wrap(Wrap { trim: false });
        f.render_widget(para, inner);
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
    fn enter_reports_selected_button() {
        let mut popup = ConfirmPopup::new("Delete", "Delete BK-1001?");
        assert_eq!(popup.on_key(key(KeyCode::Enter)), Some(PopupResult::Confirmed));
        popup.on_key(key(KeyCode::Tab));
        assert_eq!(popup.on_key(key(KeyCode::Enter)), Some(PopupResult::Cancelled));
        popup.on_key(key(KeyCode::Left));
        assert_eq!(popup.on_key(key(KeyCode::Esc)), Some(PopupResult::Cancelled));
    }

    #[test]
    fn main_loop_sees_popup_result() {
        let mut popup = ConfirmPopup::new("Quit", "Leave desk?");
        assert_eq!(
            popup.handle_key_events(key(KeyCode::Enter)).unwrap(),
            Some(EventResponse::Stop(Action::PopupResult(PopupResult::Confirmed)))
        );
        assert_eq!(
            popup.handle_key_events(key(KeyCode::Char('z'))).unwrap(),
            Some(EventResponse::Stop(Action::Render))
        );
    }
}
