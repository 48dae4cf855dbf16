use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::components::Component;
use crate::data::event_log::EventLog;
use crate::data::types::{EventKind, EventTypeId, FlowEvent, SubscriptionId};
use crate::events::AppEvent;
use crate::render::{self, EventCard};
use crate::theme::THEME;
use crate::utils;

/// Live list of one event stream, newest first.
///
/// The feed owns its log for as long as it is mounted on a stream. Only
/// notifications from the attached subscription are accepted.
pub struct EventFeed {
    stream: Option<EventTypeId>,
    kind: Option<EventKind>,
    log: EventLog,
    attached: Option<SubscriptionId>,
    pub start_height: Option<u64>,
    pub failed: bool,
    selected: usize,
}

impl EventFeed {
    pub fn new() -> Self {
        Self {
            stream: None,
            kind: None,
            log: EventLog::new(),
            attached: None,
            start_height: None,
            failed: false,
            selected: 0,
        }
    }

    /// Mount the feed on a stream with an empty log, accepting only `subscription`.
    pub fn mount(
        &mut self,
        stream: EventTypeId,
        kind: Option<EventKind>,
        subscription: SubscriptionId,
    ) {
        self.stream = Some(stream);
        self.kind = kind;
        self.log = EventLog::new();
        self.attached = Some(subscription);
        self.start_height = None;
        self.failed = false;
        self.selected = 0;
    }

    /// Stop accepting notifications. The log stays visible until the next mount.
    pub fn detach(&mut self) {
        self.attached = None;
    }

    pub fn is_attached_to(&self, subscription: SubscriptionId) -> bool {
        self.attached == Some(subscription)
    }

    /// Append `event` if it comes from the attached subscription. Returns whether it was kept.
    pub fn accept(&mut self, subscription: SubscriptionId, event: FlowEvent) -> bool {
        if !self.is_attached_to(subscription) {
            return false;
        }
        let shown = render::event_card(&event.event).is_some();
        self.log.append(event);
        // Keep the selected card in place while new ones arrive on top.
        if self.selected > 0 && shown {
            self.selected += 1;
        }
        true
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    fn cards(&self) -> Vec<(&FlowEvent, EventCard)> {
        self.log
            .iter()
            .filter_map(|e| render::event_card(&e.event).map(|card| (e, card)))
            .collect()
    }

    fn select_next(&mut self) {
        let len = self.cards().len();
        if len == 0 {
            return;
        }
        if self.selected + 1 < len {
            self.selected += 1;
        }
    }

    fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    fn select_last(&mut self) {
        self.selected = self.cards().len().saturating_sub(1);
    }

    fn empty_message(&self) -> &'static str {
        match self.kind {
            Some(kind) => kind.empty_message(),
            None => "No events have been received yet.",
        }
    }
}

fn card_lines(event: &FlowEvent, card: &EventCard) -> Vec<Line<'static>> {
    let mut lines: Vec<Line<'static>> = card
        .fields
        .iter()
        .map(|f| {
            Line::from(vec![
                Span::styled(format!(" {}: ", f.label), THEME.muted_style()),
                Span::styled(f.value.clone(), THEME.field_style(f.style)),
            ])
        })
        .collect();

    let mut meta = vec![
        Span::styled(
            format!(" block #{}", utils::format_number(event.block_height)),
            THEME.muted_style(),
        ),
        Span::styled("  tx ", THEME.muted_style()),
        Span::styled(utils::truncate_id(&event.transaction_id), THEME.muted_style()),
    ];
    let ago = utils::format_time_ago(&event.block_timestamp);
    if !ago.is_empty() {
        meta.push(Span::styled(
            format!("  {} ({ago})", utils::format_timestamp(&event.block_timestamp)),
            THEME.muted_style(),
        ));
    }
    lines.push(Line::from(meta));
    lines
}

impl Component for EventFeed {
    fn handle_key(&mut self, key: KeyEvent) -> Option<AppEvent> {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                self.select_next();
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.select_prev();
                None
            }
            KeyCode::Char('g') => {
                self.selected = 0;
                None
            }
            KeyCode::Char('G') => {
                self.select_last();
                None
            }
            KeyCode::Char('e') => {
                let stream = self.stream.clone()?;
                if self.log.is_empty() {
                    return Some(AppEvent::Error("Nothing to export yet".to_string()));
                }
                Some(AppEvent::Export {
                    stream,
                    events: self.log.iter().cloned().collect(),
                })
            }
            _ => None,
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let name = self
            .stream
            .as_ref()
            .map(|s| s.event_name().to_string())
            .unwrap_or_default();
        let mut title = format!(" {name} Events ({}) ", self.log.len());
        if let Some(height) = self.start_height {
            title.push_str(&format!("from #{} ", utils::format_number(height)));
        }
        let border_style = if self.failed {
            THEME.error_style()
        } else {
            THEME.border_focused_style()
        };

        let outer_block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(border_style);
        let inner = outer_block.inner(area);
        frame.render_widget(outer_block, area);

        let cards = self.cards();
        if cards.is_empty() {
            let message = if self.log.is_empty() {
                self.empty_message()
            } else {
                "Received events have no display format."
            };
            let paragraph = Paragraph::new(Span::styled(message, THEME.muted_style()))
                .alignment(Alignment::Center);
            if inner.height > 0 {
                let y = inner.y + inner.height / 2;
                frame.render_widget(paragraph, Rect::new(inner.x, y, inner.width, 1));
            }
            return;
        }

        let selected = self.selected.min(cards.len() - 1);

        let mut y = inner.y;
        for (index, (event, card)) in cards.iter().enumerate().skip(selected) {
            if y >= inner.bottom() {
                break;
            }
            let lines = card_lines(event, card);
            let height = (lines.len() as u16 + 2).min(inner.bottom() - y);
            let box_area = Rect::new(inner.x, y, inner.width, height);

            let border_style = if index == selected {
                Style::default().fg(THEME.kind_color(card.kind))
            } else {
                THEME.border_style()
            };
            let card_block = Block::default()
                .title(Span::styled(
                    format!(" {} ", card.title),
                    THEME.card_title_style(card.kind),
                ))
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(border_style);

            let paragraph = Paragraph::new(lines).block(card_block);
            frame.render_widget(paragraph, box_area);

            y += height;
        }
        self.selected = selected;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::types::{BattleCreated, GameEvent};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn battle(battle_id: u64) -> FlowEvent {
        FlowEvent {
            event_type: "A.01.AutoGame.BattleCreated".to_string(),
            block_height: 100 + battle_id,
            block_timestamp: String::new(),
            transaction_id: "c0ffee".to_string(),
            event_index: 0,
            event: GameEvent::BattleCreated(BattleCreated {
                battle_id,
                team1_address: "0x01".to_string(),
                team2_address: "0x02".to_string(),
                team1_ids: vec![1, 2],
                team2_ids: vec![3],
            }),
        }
    }

    fn mounted() -> (EventFeed, SubscriptionId) {
        let mut feed = EventFeed::new();
        let id = SubscriptionId::next();
        feed.mount(
            EventTypeId::new("01", "AutoGame", "BattleCreated"),
            Some(EventKind::BattleCreated),
            id,
        );
        (feed, id)
    }

    fn screen(feed: &mut EventFeed) -> String {
        let mut terminal = Terminal::new(TestBackend::new(60, 20)).unwrap();
        terminal.draw(|frame| feed.render(frame, frame.area())).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_accepts_attached_subscription() {
        let (mut feed, id) = mounted();
        assert!(feed.accept(id, battle(1)));
        assert!(feed.accept(id, battle(2)));
        let ids: Vec<u64> = feed.log().iter().map(|e| e.block_height).collect();
        assert_eq!(ids, vec![102, 101]);
    }

    #[test]
    fn test_rejects_other_subscription() {
        let (mut feed, _) = mounted();
        assert!(!feed.accept(SubscriptionId::next(), battle(1)));
        assert!(feed.log().is_empty());
    }

    #[test]
    fn test_no_appends_after_detach() {
        let (mut feed, id) = mounted();
        feed.accept(id, battle(1));
        feed.detach();
        feed.detach();
        assert!(!feed.accept(id, battle(2)));
        assert_eq!(feed.log().len(), 1);
    }

    #[test]
    fn test_remount_discards_log() {
        let (mut feed, id) = mounted();
        feed.accept(id, battle(1));
        let next = SubscriptionId::next();
        feed.mount(EventTypeId::new("01", "AutoGame", "CardCreated"), Some(EventKind::CardCreated), next);
        assert!(feed.log().is_empty());
        assert!(!feed.accept(id, battle(2)));
        assert!(feed.is_attached_to(next));
    }

    #[test]
    fn test_renders_empty_message() {
        let (mut feed, _) = mounted();
        assert!(screen(&mut feed).contains("No battles have been created yet."));
    }

    #[test]
    fn test_renders_battle_box() {
        let (mut feed, id) = mounted();
        feed.accept(id, battle(7));
        let text = screen(&mut feed);
        assert!(text.contains("Battle ID: 7"));
        assert!(text.contains("Team1 IDs: [1, 2]"));
        assert!(text.contains("BattleCreated Events (1)"));
    }

    #[test]
    fn test_unknown_events_render_nothing() {
        let (mut feed, id) = mounted();
        feed.accept(
            id,
            FlowEvent {
                event_type: "A.09.Other.Thing".to_string(),
                block_height: 1,
                block_timestamp: String::new(),
                transaction_id: String::new(),
                event_index: 0,
                event: GameEvent::Other {
                    event_type: "A.09.Other.Thing".to_string(),
                    data: serde_json::json!({}),
                },
            },
        );
        let text = screen(&mut feed);
        assert!(!text.contains("Battle ID"));
        assert!(text.contains("no display format"));
    }

    #[test]
    fn test_export_key() {
        let (mut feed, id) = mounted();
        assert!(matches!(
            feed.handle_key(KeyEvent::from(KeyCode::Char('e'))),
            Some(AppEvent::Error(_))
        ));

        feed.accept(id, battle(1));
        feed.accept(id, battle(2));
        match feed.handle_key(KeyEvent::from(KeyCode::Char('e'))) {
            Some(AppEvent::Export { stream, events }) => {
                assert_eq!(stream.event_name(), "BattleCreated");
                let heights: Vec<u64> = events.iter().map(|e| e.block_height).collect();
                assert_eq!(heights, vec![102, 101]);
            }
            other => panic!("unexpected {other:?}"),
        }

        assert!(EventFeed::new().handle_key(KeyEvent::from(KeyCode::Char('e'))).is_none());
    }

    #[test]
    fn test_scrolling_is_clamped() {
        let (mut feed, id) = mounted();
        feed.accept(id, battle(1));
        feed.accept(id, battle(2));
        for _ in 0..5 {
            feed.handle_key(KeyEvent::from(KeyCode::Char('j')));
        }
        assert_eq!(feed.selected, 1);
        feed.handle_key(KeyEvent::from(KeyCode::Char('k')));
        feed.handle_key(KeyEvent::from(KeyCode::Char('k')));
        assert_eq!(feed.selected, 0);
    }
}
