use ratatui::style::{Color, Modifier, Style};

use crate::data::types::EventKind;
use crate::render::FieldStyle;

pub struct Theme {
    pub bg: Color,
    pub surface: Color,
    pub text: Color,
    pub text_muted: Color,
    pub text_accent: Color,
    pub success: Color,
    pub error: Color,
    pub warning: Color,
    pub border: Color,
    pub border_focused: Color,
    pub address_color: Color,
    pub id_color: Color,
    pub battle_created: Color,
    pub battle_turn: Color,
    pub battle_ended: Color,
    pub card_fainted: Color,
    pub card_created: Color,
}

pub const THEME: Theme = Theme {
    bg: Color::Rgb(16, 16, 28),
    surface: Color::Rgb(24, 24, 40),
    text: Color::Rgb(220, 220, 230),
    text_muted: Color::Rgb(120, 120, 140),
    text_accent: Color::Cyan,
    success: Color::Green,
    error: Color::Red,
    warning: Color::Yellow,
    border: Color::Rgb(60, 60, 80),
    border_focused: Color::Cyan,
    address_color: Color::Rgb(255, 179, 71),
    id_color: Color::Rgb(150, 150, 180),
    battle_created: Color::Rgb(98, 126, 234),
    battle_turn: Color::Rgb(120, 200, 200),
    battle_ended: Color::Rgb(230, 200, 90),
    card_fainted: Color::Rgb(220, 90, 90),
    card_created: Color::Rgb(204, 204, 255),
};

impl Theme {
    pub const fn header_style(&self) -> Style {
        Style::new().fg(self.text).bg(self.surface)
    }

    pub const fn border_style(&self) -> Style {
        Style::new().fg(self.border)
    }

    pub const fn border_focused_style(&self) -> Style {
        Style::new().fg(self.border_focused)
    }

    pub const fn muted_style(&self) -> Style {
        Style::new().fg(self.text_muted)
    }

    pub const fn accent_style(&self) -> Style {
        Style::new().fg(self.text_accent)
    }

    pub const fn error_style(&self) -> Style {
        Style::new().fg(self.error)
    }

    pub const fn kind_color(&self, kind: EventKind) -> Color {
        match kind {
            EventKind::BattleCreated => self.battle_created,
            EventKind::BattleTurnAdvanced => self.battle_turn,
            EventKind::BattleEnded => self.battle_ended,
            EventKind::CardFainted => self.card_fainted,
            EventKind::CardCreated => self.card_created,
        }
    }

    pub const fn card_title_style(&self, kind: EventKind) -> Style {
        Style::new()
            .fg(self.kind_color(kind))
            .add_modifier(Modifier::BOLD)
    }

    pub const fn field_style(&self, style: FieldStyle) -> Style {
        match style {
            FieldStyle::Plain => Style::new().fg(self.text),
            FieldStyle::Address => Style::new().fg(self.address_color),
            FieldStyle::Id => Style::new().fg(self.id_color),
            FieldStyle::Number => Style::new().fg(self.text_accent),
            FieldStyle::Damage => Style::new().fg(self.error),
            FieldStyle::Outcome => Style::new().fg(self.warning).add_modifier(Modifier::BOLD),
        }
    }
}
