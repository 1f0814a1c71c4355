use std::path::PathBuf;

use color_eyre::Result;
use crossterm::event::KeyEvent;
use grid::RouteTable;
use ratatui::layout::Rect;
use tokio::sync::mpsc::UnboundedSender;

use crate::{
    action::Action,
    tui::{Event, EventResponse, Frame},
};

pub mod catalog;
mod form;
mod list;
pub mod query;

pub use form::FormPage;
pub use list::{ListPage, ListSpec, MenuEntry};
pub use query::RowQuery;

/// What every page gets from the app: where "Add New" and friends lead,
/// and where exports go.
#[derive(Debug, Clone)]
pub struct PageContext {
    pub routes: RouteTable,
    pub exports_dir: PathBuf,
    pub page_size: usize,
}

impl PageContext {
    pub fn new(routes: RouteTable, exports_dir: impl Into<PathBuf>) -> Self {
        Self {
            routes,
            exports_dir: exports_dir.into(),
            page_size: 10,
        }
    }

    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }
}

/// A `Page` composes components and the engines they render, and exposes
/// a lifecycle similar to [`crate::components::Component`] at the page
/// level.
pub trait Page {
    /// Route key the page is registered under.
    fn key(&self) -> &str;

    fn title(&self) -> &str;

    /// Fixture to load whenever the page is entered.
    fn fixture(&self) -> Option<&str> {
        None
    }

    fn register_action_handler(&mut self, tx: UnboundedSender<Action>) -> Result<()> {
        let _ = tx;
        Ok(())
    }

    /// Called when the page becomes active.
    fn on_enter(&mut self) -> Result<()> {
        Ok(())
    }

    /// Called when the page is leaving / being replaced.
    fn on_exit(&mut self) -> Result<()> {
        Ok(())
    }

    fn handle_events(&mut self, event: Event) -> Result<Option<EventResponse<Action>>> {
        match event {
            Event::Key(key) => self.handle_key_events(key),
            _ => Ok(None),
        }
    }

    fn handle_key_events(&mut self, key: KeyEvent) -> Result<Option<EventResponse<Action>>> {
        let _ = key;
        Ok(None)
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        let _ = action;
        Ok(None)
    }

    fn draw(&mut self, f: &mut Frame<'_>, area: Rect) -> Result<()>;

    /// Key hints for the footer.
    fn hints(&self) -> Vec<(&'static str, &'static str)> {
        Vec::new()
    }
}
