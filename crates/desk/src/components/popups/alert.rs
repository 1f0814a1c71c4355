use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
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

/// Modal message with a single acknowledgement. Enter and Esc both close
/// it with `PopupResult::Confirmed`.
pub struct AlertPopup {
    title: String,
    message: String,
    min_width: u16,
    min_height: u16,
}

impl AlertPopup {
    pub fn new<T: Into<String>, M: Into<String>>(title: T, message: M) -> Self {
        let message = message.into();
        // one row per message line plus frame, spacer and hints
        let rows = message.lines().count().max(1) as u16;
        Self {
            title: title.into(),
            message,
            min_width: 60,
            min_height: (rows + 4).clamp(7, 20),
        }
    }

    pub fn min_width(mut self, w: u16) -> Self {
        self.min_width = w.max(20);
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl PopupComponent for AlertPopup {
    fn on_key(&mut self, key: KeyEvent) -> Option<PopupResult> {
        match key.code {
            KeyCode::Enter | KeyCode::Esc => Some(PopupResult::Confirmed),
            _ => None,
        }
    }
}

impl Component for AlertPopup {
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
            .message
            .lines()
            .map(|l| Line::from(Span::raw(l.to_string())))
            .collect();
        if inner.height >= 3 {
            lines.push(Line::raw(""));
        }
        lines.push(hint_line(&[("Enter", "OK"), ("Esc", "Close")]));

        let para = Paragraph::new(Text::from(lines)).wrap(Wrap { trim: true });
        f.render_widget(para, inner);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use pretty_assertions::assert_eq;

    #[test]
    fn enter_and_esc_acknowledge() {
        let mut alert = AlertPopup::new("Saved", "Booking saved");
        let key = |c| KeyEvent::new(c, KeyModifiers::NONE);
        assert_eq!(alert.on_key(key(KeyCode::Char('x'))), None);
        assert_eq!(alert.on_key(key(KeyCode::Esc)), Some(PopupResult::Confirmed));
        assert_eq!(alert.on_key(key(KeyCode::Enter)), Some(PopupResult::Confirmed));
    }
}
