use std::{sync::Arc, time::Duration};

use color_eyre::{Result, eyre::eyre};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use grid::RouteTable;
use indexmap::IndexMap;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::Paragraph,
};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error, info};

use crate::{
    action::{Action, PopupResult},
    components::{
        Component, hint_line,
        popups::{AlertPopup, ConfirmPopup, MenuPopup},
        render_backdrop,
    },
    config::Config,
    fetch::{FixtureSource, Loader},
    pages::{Page, PageContext},
    tui::{Event, EventResponse, Frame, Tui},
};

/// Popups owned by the app rather than a page. Their outcome comes back as
/// `Action::PopupResult`.
enum AppPopup {
    Alert(AlertPopup),
    /// Page keys in menu order.
    PageMenu(MenuPopup, Vec<String>),
    QuitConfirm(ConfirmPopup),
}

impl AppPopup {
    fn component(&mut self) -> &mut dyn Component {
        match self {
            AppPopup::Alert(p) => p,
            AppPopup::PageMenu(p, _) => p,
            AppPopup::QuitConfirm(p) => p,
        }
    }
}

pub struct App {
    config: Config,
    routes: RouteTable,
    pages: IndexMap<String, Box<dyn Page>>,
    active: String,
    history: Vec<String>,
    popup: Option<AppPopup>,
    loader: Loader,
    should_quit: bool,
    should_suspend: bool,
    action_tx: UnboundedSender<Action>,
    action_rx: UnboundedReceiver<Action>,
}

impl App {
    pub fn new(
        config: Config,
        ctx: &PageContext,
        pages: Vec<Box<dyn Page>>,
        source: Arc<dyn FixtureSource>,
    ) -> Result<Self> {
        let (action_tx, action_rx) = mpsc::unbounded_channel::<Action>();
        let mut by_key = IndexMap::new();
        for mut page in pages {
            page.register_action_handler(action_tx.clone())?;
            by_key.insert(page.key().to_string(), page);
        }
        if by_key.is_empty() {
            return Err(eyre!("no pages registered"));
        }
        let loader = Loader::new(source, Duration::from_millis(config.fetch_timeout_ms));
        Ok(Self {
            config,
            routes: ctx.routes.clone(),
            pages: by_key,
            active: String::new(),
            history: Vec::new(),
            popup: None,
            loader,
            should_quit: false,
            should_suspend: false,
            action_tx,
            action_rx,
        })
    }

    pub fn active(&self) -> &str {
        &self.active
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Open the first page: `key` if it names one, else the first registered.
    pub fn start(&mut self, key: Option<&str>) -> Result<()> {
        let first = match key {
            Some(key) if self.pages.contains_key(key) => key.to_string(),
            Some(key) => return Err(eyre!("unknown page '{key}'")),
            None => self
                .pages
                .keys()
                .next()
                .cloned()
                .ok_or_else(|| eyre!("no pages registered"))?,
        };
        self.switch_to(&first, false)
    }

    pub async fn run(&mut self, start: Option<&str>) -> Result<()> {
        let mut tui = Tui::new()?
            .tick_rate(self.config.tick_rate)
            .frame_rate(self.config.frame_rate);
        tui.enter()?;
        self.start(start)?;

        loop {
            if let Some(e) = tui.next().await {
                self.handle_event(e)?;
            }

            while let Ok(action) = self.action_rx.try_recv() {
                if action != Action::Tick && action != Action::Render {
                    debug!("{action:?}");
                }
                match action {
                    Action::Resize(w, h) => {
                        tui.resize(Rect::new(0, 0, w, h))?;
                        self.draw(&mut tui)?;
                    }
                    Action::Render => self.draw(&mut tui)?,
                    other => self.update(other)?,
                }
            }

            if self.should_suspend {
                tui.suspend()?;
                self.action_tx.send(Action::Resume)?;
                tui = Tui::new()?
                    .tick_rate(self.config.tick_rate)
                    .frame_rate(self.config.frame_rate);
                tui.enter()?;
            } else if self.should_quit {
                tui.stop()?;
                break;
            }
        }
        self.loader.cancel();
        tui.exit()?;
        Ok(())
    }

    fn draw(&mut self, tui: &mut Tui) -> Result<()> {
        let tx = self.action_tx.clone();
        tui.draw(|f| {
            if let Err(err) = self.render(f) {
                tx.send(Action::Error(format!("Failed to draw: {err:?}"))).ok();
            }
        })?;
        Ok(())
    }

    /// Offer an event to the popup, then the active page, then the app's
    /// own key bindings. A `Stop` response ends the chain.
    pub fn handle_event(&mut self, event: Event) -> Result<()> {
        let tx = self.action_tx.clone();
        let forward = |response: Option<EventResponse<Action>>| match response {
            Some(EventResponse::Continue(action)) => {
                tx.send(action).ok();
                false
            }
            Some(EventResponse::Stop(action)) => {
                tx.send(action).ok();
                true
            }
            None => false,
        };

        let mut stop = match self.popup.as_mut() {
            Some(popup) => forward(popup.component().handle_events(event.clone())?),
            None => false,
        };
        if !stop {
            if let Some(page) = self.pages.get_mut(&self.active) {
                stop = forward(page.handle_events(event.clone())?);
            }
        }
        if stop {
            return Ok(());
        }

        match event {
            Event::Quit => self.action_tx.send(Action::Quit)?,
            Event::Tick => self.action_tx.send(Action::Tick)?,
            Event::Render => self.action_tx.send(Action::Render)?,
            Event::Resize(x, y) => self.action_tx.send(Action::Resize(x, y))?,
            Event::Key(key) => self.handle_global_key(key)?,
            _ => {}
        }
        Ok(())
    }

    fn handle_global_key(&mut self, key: KeyEvent) -> Result<()> {
        let action = match (key.code, key.modifiers) {
            (KeyCode::Char('c'), KeyModifiers::CONTROL) => Action::Quit,
            (KeyCode::Char('z'), KeyModifiers::CONTROL) => Action::Suspend,
            (KeyCode::Char('q'), _) => {
                self.popup = Some(AppPopup::QuitConfirm(
                    ConfirmPopup::new("Quit", "Leave the back-office?").ok_label("Quit"),
                ));
                Action::Render
            }
            (KeyCode::Char('g'), _) => Action::OpenPageMenu,
            (KeyCode::Esc, _) => Action::Back,
            _ => return Ok(()),
        };
        self.action_tx.send(action)?;
        Ok(())
    }

    /// Apply one action. Anything the app does not consume goes to the
    /// active page; what the page returns is queued again.
    pub fn update(&mut self, action: Action) -> Result<()> {
        match action {
            Action::Quit => self.should_quit = true,
            Action::Suspend => self.should_suspend = true,
            Action::Resume => self.should_suspend = false,
            Action::Error(msg) => {
                error!(error = %msg, "action error");
                self.alert("Error", msg);
            }
            Action::Notify(msg) => self.alert("Notice", msg),
            Action::Navigate(target) => self.navigate(&target)?,
            Action::Back => {
                if let Some(previous) = self.history.pop() {
                    self.switch_to(&previous, false)?;
                }
            }
            Action::OpenPageMenu => {
                let (keys, titles): (Vec<String>, Vec<String>) = self
                    .pages
                    .iter()
                    .map(|(k, p)| (k.clone(), p.title().to_string()))
                    .unzip();
                self.popup = Some(AppPopup::PageMenu(MenuPopup::new("Go to", titles), keys));
                self.action_tx.send(Action::Render)?;
            }
            Action::Reload => {
                if let Some(page) = self.pages.get_mut(&self.active) {
                    page.on_enter()?;
                }
                self.load_active();
            }
            Action::PopupResult(result) => self.popup_closed(result)?,
            Action::DataLoaded(loaded) => {
                if loaded.page == self.active && self.loader.is_current(&loaded) {
                    self.forward(Action::DataLoaded(loaded))?;
                } else {
                    debug!(page = %loaded.page, generation = loaded.generation, "stale result dropped");
                }
            }
            other => self.forward(other)?,
        }
        Ok(())
    }

    fn forward(&mut self, action: Action) -> Result<()> {
        if let Some(page) = self.pages.get_mut(&self.active) {
            if let Some(next) = page.update(action)? {
                self.action_tx.send(next)?;
            }
        }
        Ok(())
    }

    fn alert(&mut self, title: &str, message: String) {
        self.popup = Some(AppPopup::Alert(AlertPopup::new(title, message)));
        self.action_tx.send(Action::Render).ok();
    }

    fn popup_closed(&mut self, result: PopupResult) -> Result<()> {
        let Some(popup) = self.popup.take() else {
            return Ok(());
        };
        match (popup, result) {
            (AppPopup::PageMenu(_, keys), PopupResult::Chosen(idx)) => {
                if let Some(key) = keys.get(idx) {
                    self.switch_to(key, true)?;
                }
            }
            (AppPopup::QuitConfirm(_), PopupResult::Confirmed) => self.should_quit = true,
            _ => {}
        }
        self.action_tx.send(Action::Render)?;
        Ok(())
    }

    /// `target` is a page key or a route path.
    fn navigate(&mut self, target: &str) -> Result<()> {
        let key = if self.pages.contains_key(target) {
            Some(target.to_string())
        } else {
            self.routes
                .key_for(target)
                .filter(|k| self.pages.contains_key(*k))
                .map(str::to_string)
        };
        match key {
            Some(key) => self.switch_to(&key, true),
            None => {
                self.alert("Notice", format!("Nothing is registered at {target}."));
                Ok(())
            }
        }
    }

    fn switch_to(&mut self, key: &str, remember: bool) -> Result<()> {
        if !self.pages.contains_key(key) {
            return Err(eyre!("unknown page '{key}'"));
        }
        self.loader.cancel();
        if let Some(current) = self.pages.get_mut(&self.active) {
            current.on_exit()?;
        }
        if remember && !self.active.is_empty() && self.active != key {
            self.history.push(self.active.clone());
        }
        self.active = key.to_string();
        if let Some(page) = self.pages.get_mut(key) {
            page.on_enter()?;
        }
        info!(page = %key, "page activated");
        self.load_active();
        self.action_tx.send(Action::Render)?;
        Ok(())
    }

    fn load_active(&mut self) {
        let fixture = self
            .pages
            .get(&self.active)
            .and_then(|p| p.fixture())
            .map(str::to_string);
        if let Some(fixture) = fixture {
            self.loader
                .start(&self.active, &fixture, self.action_tx.clone());
        }
    }

    pub fn render(&mut self, frame: &mut Frame<'_>) -> Result<()> {
        let [title, body, footer] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Fill(1),
            Constraint::Length(1),
        ])
        .areas(frame.area());

        let page_title = self
            .pages
            .get(&self.active)
            .map(|p| p.title().to_string())
            .unwrap_or_default();
        let mut crumbs = vec![
            Span::styled(" desk ", Style::default().fg(Color::Black).bg(Color::Cyan).bold()),
            Span::raw(" "),
        ];
        if let Some(previous) = self.history.last().and_then(|k| self.pages.get(k)) {
            crumbs.push(Span::styled(
                format!("{} › ", previous.title()),
                Style::default().fg(Color::DarkGray),
            ));
        }
        crumbs.push(Span::styled(page_title, Style::default().bold()));
        frame.render_widget(Paragraph::new(Line::from(crumbs)), title);

        let mut hints = Vec::new();
        if let Some(page) = self.pages.get_mut(&self.active) {
            page.draw(frame, body)?;
            hints = page.hints();
        }
        hints.extend([("g", "Pages"), ("Esc", "Back"), ("q", "Quit")]);
        frame.render_widget(Paragraph::new(hint_line(&hints)), footer);

        if let Some(popup) = self.popup.as_mut() {
            let area = frame.area();
            render_backdrop(frame, body);
            popup.component().draw(frame, area)?;
        }
        Ok(())
    }
}
