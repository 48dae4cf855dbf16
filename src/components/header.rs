use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::theme::THEME;
use crate::utils;

pub struct Header {
    pub network: String,
    pub contract: String,
    pub sealed_height: u64,
    pub current_tab: usize,
    pub connected: bool,
}

/// One tab per known stream, in EventKind::ALL order, then custom identifiers.
const TABS: &[&str] = &[
    "Battles [1]",
    "Turns [2]",
    "Ended [3]",
    "Fainted [4]",
    "Cards [5]",
    "Custom [/]",
];

pub const CUSTOM_TAB: usize = 5;

impl Header {
    pub fn new(network: &str, contract: &str) -> Self {
        Self {
            network: network.to_string(),
            contract: contract.to_string(),
            sealed_height: 0,
            current_tab: 0,
            connected: false,
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let header_block = Block::default().style(THEME.header_style());
        frame.render_widget(header_block, area);

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(16),
                Constraint::Min(0),
                Constraint::Length(34),
            ])
            .split(area);

        let title = Paragraph::new(Span::styled(
            " autogame-tui",
            Style::default()
                .fg(THEME.text_accent)
                .add_modifier(Modifier::BOLD),
        ))
        .style(THEME.header_style());
        frame.render_widget(title, chunks[0]);

        let tab_titles: Vec<Line> = TABS.iter().map(|t| Line::from(*t)).collect();
        let tabs = Tabs::new(tab_titles)
            .select(self.current_tab)
            .style(THEME.muted_style())
            .highlight_style(THEME.accent_style().add_modifier(Modifier::BOLD))
            .divider(Span::raw(" | "));
        frame.render_widget(tabs, chunks[1]);

        let network_style = if self.connected {
            Style::default().fg(THEME.text)
        } else {
            THEME.error_style()
        };
        let network_info = Line::from(vec![
            Span::styled(self.contract.as_str(), THEME.muted_style()),
            Span::styled("@", THEME.muted_style()),
            Span::styled(self.network.as_str(), network_style),
            Span::styled(" | ", THEME.muted_style()),
            Span::styled(
                format!("#{} ", utils::format_number(self.sealed_height)),
                THEME.accent_style(),
            ),
        ]);
        let network_paragraph = Paragraph::new(network_info)
            .alignment(Alignment::Right)
            .style(THEME.header_style());
        frame.render_widget(network_paragraph, chunks[2]);
    }
}
