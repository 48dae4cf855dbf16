use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::data::catalog::EventCatalog;
use crate::data::types::{EventKind, EventTypeId};
use crate::theme::THEME;

/// What the prompt hands back when it closes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptOutcome {
    Selected(EventTypeId),
    Cancelled,
}

/// Stream picker opened with `/`.
///
/// The input is resolved against the catalog on every keystroke. Known event
/// names matching the input are listed below it and can be completed with Tab
/// or picked with the arrow keys.
pub struct StreamPrompt {
    catalog: EventCatalog,
    pub active: bool,
    input: String,
    matches: Vec<EventKind>,
    highlighted: usize,
    resolved: Option<EventTypeId>,
    pub error: Option<String>,
}

impl StreamPrompt {
    pub fn new(catalog: EventCatalog) -> Self {
        let mut prompt = Self {
            catalog,
            active: false,
            input: String::new(),
            matches: Vec::new(),
            highlighted: 0,
            resolved: None,
            error: None,
        };
        prompt.refresh();
        prompt
    }

    pub fn activate(&mut self) {
        self.active = true;
        self.input.clear();
        self.error = None;
        self.highlighted = 0;
        self.refresh();
    }

    fn refresh(&mut self) {
        let query = self.input.trim().to_ascii_lowercase();
        self.resolved = if query.is_empty() {
            None
        } else {
            self.catalog.resolve(&self.input)
        };
        self.matches = EventKind::ALL
            .into_iter()
            .enumerate()
            .filter(|(i, kind)| {
                query.is_empty()
                    || (i + 1).to_string() == query
                    || kind.event_name().to_ascii_lowercase().starts_with(&query)
            })
            .map(|(_, kind)| kind)
            .collect();
        self.highlighted = self.highlighted.min(self.matches.len().saturating_sub(1));
    }

    fn edit(&mut self, change: impl FnOnce(&mut String)) {
        change(&mut self.input);
        self.error = None;
        self.highlighted = 0;
        self.refresh();
    }

    /// The stream Enter would open right now.
    fn selection(&self) -> Option<EventTypeId> {
        self.resolved.clone().or_else(|| {
            self.matches
                .get(self.highlighted)
                .map(|kind| self.catalog.id(*kind).clone())
        })
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<PromptOutcome> {
        if !self.active {
            return None;
        }

        match key.code {
            KeyCode::Enter => match self.selection() {
                Some(stream) => {
                    self.active = false;
                    Some(PromptOutcome::Selected(stream))
                }
                None => {
                    self.error = Some(format!("not an event type: {}", self.input.trim()));
                    None
                }
            },
            KeyCode::Esc => {
                self.active = false;
                self.error = None;
                Some(PromptOutcome::Cancelled)
            }
            KeyCode::Tab => {
                if let Some(kind) = self.matches.get(self.highlighted).copied() {
                    self.edit(|input| *input = kind.event_name().to_string());
                }
                None
            }
            KeyCode::Down => {
                if !self.matches.is_empty() {
                    self.highlighted = (self.highlighted + 1) % self.matches.len();
                }
                None
            }
            KeyCode::Up => {
                if !self.matches.is_empty() {
                    self.highlighted =
                        (self.highlighted + self.matches.len() - 1) % self.matches.len();
                }
                None
            }
            KeyCode::Backspace => {
                self.edit(|input| {
                    input.pop();
                });
                None
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.edit(String::clear);
                None
            }
            KeyCode::Char(c) => {
                self.edit(|input| input.push(c));
                None
            }
            _ => None,
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        if !self.active {
            return;
        }

        // input, resolution, one row per suggestion
        let height = (self.matches.len() as u16 + 4).min(area.height);
        let width = area.width.min(72);
        let x = area.x + (area.width.saturating_sub(width)) / 2;
        let popup_area = Rect::new(x, area.y + 2, width, height);

        frame.render_widget(Clear, popup_area);

        let border_style = if self.error.is_some() {
            THEME.error_style()
        } else {
            THEME.border_focused_style()
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(" Open stream (Tab completes, \u{2191}\u{2193} picks) ")
            .style(Style::default().bg(THEME.surface));
        let inner = block.inner(popup_area);
        frame.render_widget(block, popup_area);

        let mut lines = vec![Line::from(vec![
            Span::styled("> ", THEME.accent_style()),
            Span::styled(self.input.as_str(), Style::default().fg(THEME.text)),
        ])];

        lines.push(match (&self.error, self.selection()) {
            (Some(err), _) => Line::from(Span::styled(err.as_str(), THEME.error_style())),
            (None, Some(stream)) => Line::from(vec![
                Span::styled("\u{2192} ", THEME.muted_style()),
                Span::styled(stream.to_string(), Style::default().fg(THEME.success)),
            ]),
            (None, None) => Line::from(Span::styled(
                "name, tab number or A.<address>.<Contract>.<Event>",
                Style::default().fg(THEME.warning),
            )),
        });

        for (i, kind) in self.matches.iter().enumerate() {
            let number = EventKind::ALL
                .iter()
                .position(|k| k == kind)
                .map_or(0, |p| p + 1);
            let style = if i == self.highlighted {
                Style::default()
                    .fg(THEME.kind_color(*kind))
                    .add_modifier(Modifier::BOLD | Modifier::REVERSED)
            } else {
                Style::default().fg(THEME.kind_color(*kind))
            };
            lines.push(Line::from(vec![
                Span::styled(format!(" [{number}] "), THEME.muted_style()),
                Span::styled(kind.event_name(), style),
            ]));
        }

        frame.render_widget(Paragraph::new(lines), inner);

        let cursor_x = inner.x + 2 + self.input.chars().count() as u16;
        if cursor_x < inner.right() {
            frame.set_cursor_position((cursor_x, inner.y));
        }
    }
}
