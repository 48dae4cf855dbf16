use crate::data::types::{
    BattleCreated, BattleEnded, BattleTurnAdvanced, CardCreated, CardFainted, EventKind, GameEvent,
};
use crate::utils;

/// How a card value should be highlighted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldStyle {
    Plain,
    Address,
    Id,
    Number,
    Damage,
    Outcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardField {
    pub label: &'static str,
    pub value: String,
    pub style: FieldStyle,
}

/// Display form of one event: a title line plus labelled values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventCard {
    pub kind: EventKind,
    pub title: String,
    pub fields: Vec<CardField>,
}

impl EventCard {
    fn new(kind: EventKind, title: String) -> Self {
        Self {
            kind,
            title,
            fields: Vec::new(),
        }
    }

    fn field(mut self, label: &'static str, value: impl ToString, style: FieldStyle) -> Self {
        self.fields.push(CardField {
            label,
            value: value.to_string(),
            style,
        });
        self
    }

    /// Plain text rendition, one line per row.
    pub fn text(&self) -> String {
        let mut out = self.title.clone();
        for f in &self.fields {
            out.push('\n');
            out.push_str(&format!("{}: {}", f.label, f.value));
        }
        out
    }
}

/// Map an event to its card. Events of unknown type have no card.
pub fn event_card(event: &GameEvent) -> Option<EventCard> {
    match event {
        GameEvent::BattleCreated(e) => Some(battle_created(e)),
        GameEvent::BattleTurnAdvanced(e) => Some(battle_turn_advanced(e)),
        GameEvent::BattleEnded(e) => Some(battle_ended(e)),
        GameEvent::CardFainted(e) => Some(card_fainted(e)),
        GameEvent::CardCreated(e) => Some(card_created(e)),
        GameEvent::Other { .. } => None,
    }
}

fn battle_created(e: &BattleCreated) -> EventCard {
    EventCard::new(EventKind::BattleCreated, format!("Battle ID: {}", e.battle_id))
        .field("Team1 Address", &e.team1_address, FieldStyle::Address)
        .field("Team2 Address", &e.team2_address, FieldStyle::Address)
        .field("Team1 IDs", utils::join_ids(&e.team1_ids), FieldStyle::Id)
        .field("Team2 IDs", utils::join_ids(&e.team2_ids), FieldStyle::Id)
}

fn battle_turn_advanced(e: &BattleTurnAdvanced) -> EventCard {
    EventCard::new(
        EventKind::BattleTurnAdvanced,
        format!("Battle {} - Turn {}", e.battle_id, e.turn),
    )
    .field(
        "Attacker",
        format!("card {} at slot {}", e.attacker_id, e.attacker_index),
        FieldStyle::Id,
    )
    .field(
        "Defender",
        format!("card {} at slot {}", e.defender_id, e.defender_index),
        FieldStyle::Id,
    )
    .field(
        "Attacker Damage Taken",
        e.damage_to_attacker,
        FieldStyle::Damage,
    )
    .field(
        "Defender Damage Taken",
        e.damage_to_defender,
        FieldStyle::Damage,
    )
    .field("Attacker Health", e.attacker_health, FieldStyle::Number)
    .field("Defender Health", e.defender_health, FieldStyle::Number)
}

fn battle_ended(e: &BattleEnded) -> EventCard {
    let card = EventCard::new(EventKind::BattleEnded, format!("Battle Ended: {}", e.battle_id));
    if e.winner.is_none() && e.loser.is_none() {
        return card.field("Result", "Draw", FieldStyle::Outcome);
    }

    let mut card = card;
    if let Some(winner) = &e.winner {
        card = card.field("Winner", winner, FieldStyle::Address);
    }
    if let Some(loser) = &e.loser {
        card = card.field("Loser", loser, FieldStyle::Address);
    }
    card
}

fn card_fainted(e: &CardFainted) -> EventCard {
    EventCard::new(EventKind::CardFainted, format!("Card Fainted: {}", e.card_id))
        .field("Battle ID", e.battle_id, FieldStyle::Id)
        .field("Card ID", e.card_id, FieldStyle::Id)
}

fn card_created(e: &CardCreated) -> EventCard {
    EventCard::new(EventKind::CardCreated, format!("Card Created: {}", e.id))
        .field("Name", &e.name, FieldStyle::Plain)
        .field("URL", &e.url, FieldStyle::Plain)
        .field("Attack", e.attack, FieldStyle::Number)
        .field("Health", e.health, FieldStyle::Number)
        .field("Level", e.level, FieldStyle::Number)
}
