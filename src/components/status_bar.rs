use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::theme::THEME;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionState {
    Idle,
    Connecting,
    Live,
    Failed,
}

pub struct StatusBar {
    pub subscription: SubscriptionState,
    pub event_count: usize,
    pub start_height: Option<u64>,
    pub error_message: Option<String>,
    pub info_message: Option<String>,
}

impl StatusBar {
    pub fn new() -> Self {
        Self {
            subscription: SubscriptionState::Idle,
            event_count: 0,
            start_height: None,
            error_message: None,
            info_message: None,
        }
    }

    pub fn clear_messages(&mut self) {
        self.error_message = None;
        self.info_message = None;
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let bg = Block::default().style(THEME.header_style());
        frame.render_widget(bg, area);

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(36)])
            .split(area);

        // --- Left side ---
        let left_content = if let Some(ref err) = self.error_message {
            Line::from(vec![
                Span::styled(
                    " ! ",
                    Style::default()
                        .fg(THEME.error)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(err.as_str(), Style::default().fg(THEME.warning)),
            ])
        } else if let Some(ref info) = self.info_message {
            Line::from(Span::styled(
                format!(" {info}"),
                Style::default().fg(THEME.success),
            ))
        } else {
            Line::from(vec![
                Span::styled(" \u{2191}\u{2193}", Style::default().fg(THEME.text_accent)),
                Span::styled(":Scroll  ", Style::default().fg(THEME.text_muted)),
                Span::styled("1-5", Style::default().fg(THEME.text_accent)),
                Span::styled(":Stream  ", Style::default().fg(THEME.text_muted)),
                Span::styled("/", Style::default().fg(THEME.text_accent)),
                Span::styled(":Custom  ", Style::default().fg(THEME.text_muted)),
                Span::styled("r", Style::default().fg(THEME.text_accent)),
                Span::styled(":Resubscribe  ", Style::default().fg(THEME.text_muted)),
                Span::styled("e", Style::default().fg(THEME.text_accent)),
                Span::styled(":Export  ", Style::default().fg(THEME.text_muted)),
                Span::styled("?", Style::default().fg(THEME.text_accent)),
                Span::styled(":Help  ", Style::default().fg(THEME.text_muted)),
                Span::styled("q", Style::default().fg(THEME.text_accent)),
                Span::styled(":Quit", Style::default().fg(THEME.text_muted)),
            ])
        };

        let left = Paragraph::new(left_content).style(THEME.header_style());
        frame.render_widget(left, chunks[0]);

        // --- Right side: subscription state + event count ---
        let (dot_color, status_text) = match self.subscription {
            SubscriptionState::Idle => (THEME.text_muted, "Idle".to_string()),
            SubscriptionState::Connecting => (THEME.warning, "Subscribing".to_string()),
            SubscriptionState::Live => (
                THEME.success,
                match self.start_height {
                    Some(h) => format!("Live from #{h}"),
                    None => "Live".to_string(),
                },
            ),
            SubscriptionState::Failed => (THEME.error, "Failed".to_string()),
        };

        let right_content = Line::from(vec![
            Span::styled("\u{25cf} ", Style::default().fg(dot_color)),
            Span::styled(status_text, Style::default().fg(dot_color)),
            Span::styled(" | ", THEME.muted_style()),
            Span::styled(format!("{} events ", self.event_count), THEME.accent_style()),
        ]);

        let right = Paragraph::new(right_content)
            .alignment(Alignment::Right)
            .style(THEME.header_style());
        frame.render_widget(right, chunks[1]);
    }
}
