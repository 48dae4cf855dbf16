use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::prelude::*;
use ratatui::widgets::*;
use tokio::sync::mpsc;

use crate::components::Component;
use crate::components::event_feed::EventFeed;
use crate::components::header::{CUSTOM_TAB, Header};
use crate::components::help::HelpOverlay;
use crate::components::status_bar::{StatusBar, SubscriptionState};
use crate::components::stream_prompt::{PromptOutcome, StreamPrompt};
use crate::data::EventService;
use crate::data::subscription::Subscription;
use crate::data::types::EventTypeId;
use crate::events::{AppEvent, View};
use crate::theme::THEME;

const SEALED_HEIGHT_REFRESH: Duration = Duration::from_secs(5);

pub struct App {
    // Navigation
    view_stack: Vec<View>,
    current_view: View,

    // Components
    header: Header,
    feed: EventFeed,
    status_bar: StatusBar,
    prompt: StreamPrompt,
    help: HelpOverlay,

    // Data
    service: Arc<EventService>,
    subscription: Option<Subscription>,
    event_rx: mpsc::UnboundedReceiver<AppEvent>,

    // State
    should_quit: bool,
    tick_rate: Duration,
}

impl App {
    pub fn with_service(
        service: Arc<EventService>,
        event_rx: mpsc::UnboundedReceiver<AppEvent>,
        initial: EventTypeId,
        tick_rate_ms: u64,
    ) -> Self {
        let catalog = service.catalog();
        let header = Header::new(catalog.network(), catalog.contract());
        let prompt = StreamPrompt::new(catalog.clone());
        Self {
            view_stack: Vec::new(),
            current_view: View::Stream(initial),
            header,
            feed: EventFeed::new(),
            status_bar: StatusBar::new(),
            prompt,
            help: HelpOverlay::new(),
            service,
            subscription: None,
            event_rx,
            should_quit: false,
            tick_rate: Duration::from_millis(tick_rate_ms),
        }
    }

    pub async fn run(&mut self, mut terminal: ratatui::DefaultTerminal) -> color_eyre::Result<()> {
        self.subscribe_current();

        let mut interval = tokio::time::interval(self.tick_rate);
        let mut height_interval = tokio::time::interval(SEALED_HEIGHT_REFRESH);
        let mut events = EventStream::new();

        while !self.should_quit {
            tokio::select! {
                _ = interval.tick() => {
                    terminal.draw(|frame| self.render(frame))?;
                }
                _ = height_interval.tick() => {
                    self.service.fetch_sealed_height();
                }
                Some(Ok(event)) = events.next() => {
                    self.handle_terminal_event(event);
                }
                Some(app_event) = self.event_rx.recv() => {
                    self.handle_app_event(app_event);
                }
            }
        }

        if let Some(mut subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
        Ok(())
    }

    fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();

        frame.render_widget(
            Block::default().style(Style::default().bg(THEME.bg)),
            area,
        );

        // Layout: header (1) | feed (fill) | status bar (1)
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(area);

        self.header.render(frame, chunks[0]);
        match &self.current_view {
            View::Stream(_) => self.feed.render(frame, chunks[1]),
        }
        self.status_bar.render(frame, chunks[2]);

        // Overlays
        self.prompt.render(frame, area);
        self.help.render(frame, area);
    }

    fn handle_terminal_event(&mut self, event: Event) {
        if let Event::Key(key) = event {
            // Only handle key press events (not release/repeat) for cross-platform compat
            if key.kind != KeyEventKind::Press {
                return;
            }
            self.handle_key(key);
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if self.help.handle_key(key) {
            return;
        }

        if self.prompt.active {
            if let Some(PromptOutcome::Selected(stream)) = self.prompt.handle_key(key) {
                self.navigate_to(View::Stream(stream));
            }
            return;
        }

        match key.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
                return;
            }
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
                return;
            }
            KeyCode::Char('/') => {
                self.prompt.activate();
                return;
            }
            KeyCode::Char('?') => {
                self.help.toggle();
                return;
            }
            KeyCode::Char(c @ '1'..='5') => {
                if let Some(stream) = self.service.catalog().resolve(&c.to_string()) {
                    self.navigate_to(View::Stream(stream));
                }
                return;
            }
            KeyCode::Char('r') => {
                self.subscribe_current();
                self.status_bar.info_message = Some("Resubscribed".to_string());
                return;
            }
            KeyCode::Esc | KeyCode::Backspace => {
                self.go_back();
                return;
            }
            _ => {}
        }

        let app_event = match &self.current_view {
            View::Stream(_) => self.feed.handle_key(key),
        };
        if let Some(event) = app_event {
            self.handle_app_event(event);
        }
    }

    fn handle_app_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Connected { sealed_height } => {
                self.header.sealed_height = sealed_height;
                self.header.connected = true;
            }
            AppEvent::SealedHeight(height) => {
                self.header.sealed_height = self.header.sealed_height.max(height);
                self.header.connected = true;
            }
            AppEvent::SubscriptionStarted {
                subscription,
                start_height,
            } => {
                if self.feed.is_attached_to(subscription) {
                    self.feed.start_height = Some(start_height);
                    self.status_bar.subscription = SubscriptionState::Live;
                    self.status_bar.start_height = Some(start_height);
                }
            }
            AppEvent::Flow {
                subscription,
                event,
            } => {
                let height = event.block_height;
                if self.feed.accept(subscription, *event) {
                    self.status_bar.event_count = self.feed.log().len();
                    self.header.sealed_height = self.header.sealed_height.max(height);
                }
            }
            AppEvent::SubscriptionFailed {
                subscription,
                message,
            } => {
                if self.feed.is_attached_to(subscription) {
                    self.feed.failed = true;
                    self.feed.detach();
                    self.subscription = None;
                    self.header.connected = false;
                    self.status_bar.subscription = SubscriptionState::Failed;
                    self.status_bar.error_message =
                        Some(format!("Subscription failed: {message} (r to retry)"));
                }
            }
            AppEvent::Export { stream, events } => {
                self.status_bar.info_message = Some(format!("Exporting {} events...", events.len()));
                self.service.export(stream, events);
            }
            AppEvent::ExportComplete(message) => {
                self.status_bar.info_message = Some(message);
            }
            AppEvent::Error(message) => {
                self.status_bar.error_message = Some(message);
            }
        }
    }

    fn navigate_to(&mut self, view: View) {
        if view == self.current_view {
            return;
        }
        let old_view = std::mem::replace(&mut self.current_view, view);
        self.view_stack.push(old_view);
        self.subscribe_current();
    }

    fn go_back(&mut self) {
        if let Some(prev_view) = self.view_stack.pop() {
            self.current_view = prev_view;
            self.subscribe_current();
        }
    }

    /// Drop the current subscription and open a fresh one for the current view.
    fn subscribe_current(&mut self) {
        let View::Stream(stream) = self.current_view.clone();

        if let Some(mut old) = self.subscription.take() {
            old.unsubscribe();
        }
        self.feed.detach();

        let subscription = self.service.subscribe(stream.clone());
        let kind = self.service.catalog().kind_of(stream.as_str());
        tracing::info!(subscription = %subscription.id(), %stream, "showing stream");
        self.feed.mount(stream, kind, subscription.id());
        self.subscription = Some(subscription);

        self.header.current_tab = kind.map_or(CUSTOM_TAB, |k| k as usize);
        self.status_bar.clear_messages();
        self.status_bar.subscription = SubscriptionState::Connecting;
        self.status_bar.start_height = None;
        self.status_bar.event_count = 0;
    }

}
