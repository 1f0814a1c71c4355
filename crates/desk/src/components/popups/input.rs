use color_eyre::Result;
use crossterm::event::{Event as CrosstermEvent, KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};
use tui_input::{Input, backend::crossterm::EventHandler};

use crate::{
    action::{Action, PopupResult},
    components::{
        Component, PopupComponent, centered_rect_fixed, draw_popup_frame, hint_line,
        popup::respond,
    },
    tui::{EventResponse, Frame},
};

type InputValidator = Box<dyn Fn(&str) -> std::result::Result<(), String> + Send + Sync>;

/// Single-line text entry.
///
/// Enter validates and reports `Entered(value)`; a failed check keeps the
/// popup open with the message shown. Esc cancels.
pub struct InputPopup {
    title: String,
    label: String,
    input: Input,
    error: Option<String>,
    validator: Option<InputValidator>,
    min_width: u16,
    min_height: u16,
}

impl InputPopup {
    pub fn new<T: Into<String>, L: Into<String>>(title: T, label: L) -> Self {
        Self {
            title: title.into(),
            label: label.into(),
            input: Input::default(),
            error: None,
            validator: None,
            min_width: 60,
            min_height: 10,
        }
    }

    pub fn initial_value(mut self, value: impl Into<String>) -> Self {
        self.input = Input::new(value.into());
        self
    }

    pub fn validator(
        mut self,
        check: impl Fn(&str) -> std::result::Result<(), String> + Send + Sync + 'static,
    ) -> Self {
        self.validator = Some(Box::new(check));
        self
    }

    pub fn value(&self) -> &str {
        self.input.value()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn submit(&mut self) -> Option<PopupResult> {
        let value = self.input.value().trim().to_string();
        let checked = match &self.validator {
            Some(check) => check(&value),
            None => Ok(()),
        };
        match checked {
            Ok(()) => {
                self.error = None;
                Some(PopupResult::Entered(value))
            }
            Err(msg) => {
                self.error = Some(msg);
                None
            }
        }
    }
}

impl PopupComponent for InputPopup {
    fn on_key(&mut self, key: KeyEvent) -> Option<PopupResult> {
        match key.code {
            KeyCode::Enter => self.submit(),
            KeyCode::Esc => Some(PopupResult::Cancelled),
            _ => {
                self.input.handle_event(&CrosstermEvent::Key(key));
                None
            }
        }
    }
}

impl Component for InputPopup {
    fn handle_key_events(&mut self, key: KeyEvent) -> Result<Option<EventResponse<Action>>> {
        Ok(respond(self.on_key(key)))
    }

    fn draw(&mut self, f: &mut Frame<'_>, area: Rect) -> Result<()> {
        if area.width < 5 || area.height < 5 {
            return Ok(());
        }

        let dialog = centered_rect_fixed(area, self.min_width, self.min_height);
        let inner = draw_popup_frame(f, dialog, &self.title);
        if inner.height < 4 {
            return Ok(());
        }

        let label = Line::from(vec![
            Span::styled(self.label.clone(), Style::default().bold()),
            Span::raw(":"),
        ]);
        f.render_widget(Paragraph::new(label), Rect { height: 1, ..inner });

        let box_area = Rect {
            y: inner.y + 1,
            height: 3,
            ..inner
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded);
        let field = block.inner(box_area);
        f.render_widget(block, box_area);

        let width = field.width.max(1) as usize;
        let scroll = self.input.visual_scroll(width);
        f.render_widget(
            Paragraph::new(self.input.value()).scroll((0, scroll as u16)),
            field,
        );
        let cursor = (self.input.visual_cursor().max(scroll) - scroll) as u16;
        f.set_cursor_position((field.x + cursor.min(field.width.saturating_sub(1)), field.y));

        let below = box_area.y + box_area.height;
        if let Some(err) = &self.error {
            if below < inner.y + inner.height {
                f.render_widget(
                    Paragraph::new(Span::styled(err.clone(), Style::default().fg(Color::Red))),
                    Rect {
                        y: below,
                        height: 1,
                        ..inner
                    },
                );
            }
        }

        let hints_y = inner.y + inner.height - 1;
        if hints_y > below {
            f.render_widget(
                Paragraph::new(hint_line(&[("Enter", "Submit"), ("Esc", "Cancel")])),
                Rect {
                    y: hints_y,
                    height: 1,
                    ..inner
                },
            );
        }
        Ok(())
    }
}
