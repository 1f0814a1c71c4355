use crossterm::event::KeyEvent;
use ratatui::{
    layout::Rect,
    style::{Color, Style, Stylize},
    symbols,
    text::{Line, Span},
    widgets::{Block, Borders, Clear},
};

use crate::{
    action::{Action, PopupResult},
    components::Component,
    tui::{EventResponse, Frame},
};

/// Popup components and helpers.
///
/// A popup can be driven two ways:
/// - through [`Component::handle_key_events`], which wraps the outcome in
///   `Action::PopupResult` for the main loop (app-level popups)
/// - through [`PopupComponent::on_key`] by the page that owns it, which
///   acts on the outcome directly
///
/// Drawing: call `render_backdrop` after the page when the popup is modal,
/// then let the popup place itself with `centered_rect_fixed` and
/// `draw_popup_frame`.
pub trait PopupComponent: Component + Send {
    /// Feed one key. `Some` means the popup is done.
    fn on_key(&mut self, key: KeyEvent) -> Option<PopupResult>;
}

/// Wrap a popup outcome for the main loop. Popups swallow every key.
pub(crate) fn respond(result: Option<PopupResult>) -> Option<EventResponse<Action>> {
    Some(EventResponse::Stop(match result {
        Some(result) => Action::PopupResult(result),
        None => Action::Render,
    }))
}

/// Dim the page behind a modal popup.
pub fn render_backdrop(frame: &mut Frame<'_>, area: Rect) {
    let backdrop = Block::default().style(Style::default().bg(Color::Black));
    frame.render_widget(backdrop, area);
}

/// A `width` x `height` rectangle centered in `area`, clamped to fit.
pub fn centered_rect_fixed(area: Rect, width: u16, height: u16) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);

    let x = area.x.saturating_add((area.width.saturating_sub(w)) / 2);
    let y = area.y.saturating_add((area.height.saturating_sub(h)) / 2);

    Rect {
        x,
        y,
        width: w,
        height: h,
    }
}

/// Clear `area` and draw a rounded, titled frame around it. Returns the
/// inner area.
pub fn draw_popup_frame(frame: &mut Frame<'_>, area: Rect, title: impl Into<String>) -> Rect {
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(format!(" {} ", title.into()))
        .borders(Borders::ALL)
        .border_set(symbols::border::ROUNDED)
        .style(Style::default().fg(Color::White).bg(Color::Black));

    let inner = block.inner(area);
    frame.render_widget(block, area);
    inner
}

/// Dimmed `key: label` hint row.
pub fn hint_line(hints: &[(&str, &str)]) -> Line<'static> {
    let mut spans = Vec::with_capacity(hints.len() * 2);
    for (i, (key, label)) in hints.iter().enumerate() {
        spans.push(Span::styled(key.to_string(), Style::default().fg(Color::White)));
        let sep = if i + 1 < hints.len() { "   " } else { "" };
        spans.push(Span::raw(format!(": {label}{sep}")));
    }
    Line::from(spans).fg(Color::DarkGray)
}
