use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Fully-qualified Flow event type, `A.<address>.<Contract>.<Event>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct EventTypeId(String);

impl EventTypeId {
    pub fn new(address: &str, contract: &str, event: &str) -> Self {
        Self(format!("A.{address}.{contract}.{event}"))
    }

    /// Accepts any string of the form `A.<address>.<Contract>.<Event>`.
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        let parts: Vec<&str> = input.split('.').collect();
        if parts.len() != 4 || parts[0] != "A" || parts[1..].iter().any(|p| p.is_empty()) {
            return None;
        }
        Some(Self(input.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Trailing event name segment.
    pub fn event_name(&self) -> &str {
        self.0.rsplit('.').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for EventTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The AutoGame events this viewer knows how to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    BattleCreated,
    BattleTurnAdvanced,
    BattleEnded,
    CardFainted,
    CardCreated,
}

impl EventKind {
    pub const ALL: [EventKind; 5] = [
        EventKind::BattleCreated,
        EventKind::BattleTurnAdvanced,
        EventKind::BattleEnded,
        EventKind::CardFainted,
        EventKind::CardCreated,
    ];

    pub fn event_name(self) -> &'static str {
        match self {
            EventKind::BattleCreated => "BattleCreated",
            EventKind::BattleTurnAdvanced => "BattleTurnAdvanced",
            EventKind::BattleEnded => "BattleEnded",
            EventKind::CardFainted => "CardFainted",
            EventKind::CardCreated => "CardCreated",
        }
    }

    pub fn from_event_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|k| k.event_name().eq_ignore_ascii_case(name))
    }

    /// Message shown while a stream has not delivered anything yet.
    pub fn empty_message(self) -> &'static str {
        match self {
            EventKind::BattleCreated => "No battles have been created yet.",
            EventKind::BattleTurnAdvanced => "No battle turns have been played yet.",
            EventKind::BattleEnded => "No battles have ended yet.",
            EventKind::CardFainted => "No cards have fainted yet.",
            EventKind::CardCreated => "No cards have been created yet.",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.event_name())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleCreated {
    #[serde(rename = "battleID")]
    pub battle_id: u64,
    #[serde(rename = "team1Address")]
    pub team1_address: String,
    #[serde(rename = "team2Address")]
    pub team2_address: String,
    #[serde(rename = "team1IDs")]
    pub team1_ids: Vec<u64>,
    #[serde(rename = "team2IDs")]
    pub team2_ids: Vec<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleTurnAdvanced {
    #[serde(rename = "battleID")]
    pub battle_id: u64,
    pub turn: u64,
    #[serde(rename = "attackerID")]
    pub attacker_id: u64,
    #[serde(rename = "defenderID")]
    pub defender_id: u64,
    pub attacker_index: u64,
    pub defender_index: u64,
    pub damage_to_attacker: i64,
    pub damage_to_defender: i64,
    pub attacker_health: i64,
    pub defender_health: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleEnded {
    #[serde(rename = "battleID")]
    pub battle_id: u64,
    #[serde(default)]
    pub winner: Option<String>,
    #[serde(default)]
    pub loser: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardFainted {
    #[serde(rename = "battleID")]
    pub battle_id: u64,
    #[serde(rename = "cardID")]
    pub card_id: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardCreated {
    pub id: u64,
    pub name: String,
    pub url: String,
    pub attack: i64,
    pub health: i64,
    pub level: u64,
}

/// A decoded event payload, one variant per known event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data")]
pub enum GameEvent {
    BattleCreated(BattleCreated),
    BattleTurnAdvanced(BattleTurnAdvanced),
    BattleEnded(BattleEnded),
    CardFainted(CardFainted),
    CardCreated(CardCreated),
    Other { event_type: String, data: Value },
}

impl GameEvent {
    /// Build the typed variant for `kind`, keeping the raw payload when it does not fit.
    pub fn from_payload(kind: Option<EventKind>, event_type: &str, data: Value) -> Self {
        let Some(kind) = kind else {
            return GameEvent::Other {
                event_type: event_type.to_string(),
                data,
            };
        };

        let typed = match kind {
            EventKind::BattleCreated => {
                serde_json::from_value(data.clone()).map(GameEvent::BattleCreated)
            }
            EventKind::BattleTurnAdvanced => {
                serde_json::from_value(data.clone()).map(GameEvent::BattleTurnAdvanced)
            }
            EventKind::BattleEnded => {
                serde_json::from_value(data.clone()).map(GameEvent::BattleEnded)
            }
            EventKind::CardFainted => {
                serde_json::from_value(data.clone()).map(GameEvent::CardFainted)
            }
            EventKind::CardCreated => {
                serde_json::from_value(data.clone()).map(GameEvent::CardCreated)
            }
        };

        typed.unwrap_or_else(|e| {
            tracing::warn!(%event_type, error = %e, "payload does not match the {kind} schema");
            GameEvent::Other {
                event_type: event_type.to_string(),
                data,
            }
        })
    }

    pub fn kind(&self) -> Option<EventKind> {
        match self {
            GameEvent::BattleCreated(_) => Some(EventKind::BattleCreated),
            GameEvent::BattleTurnAdvanced(_) => Some(EventKind::BattleTurnAdvanced),
            GameEvent::BattleEnded(_) => Some(EventKind::BattleEnded),
            GameEvent::CardFainted(_) => Some(EventKind::CardFainted),
            GameEvent::CardCreated(_) => Some(EventKind::CardCreated),
            GameEvent::Other { .. } => None,
        }
    }
}

/// A game event plus where on chain it was emitted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowEvent {
    pub event_type: String,
    pub block_height: u64,
    pub block_timestamp: String,
    pub transaction_id: String,
    pub event_index: u32,
    pub event: GameEvent,
}

/// Identity of one subscription, unique for the process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_type_id_concatenation() {
        let id = EventTypeId::new("f8d6e0586b0a20c7", "AutoGame", "BattleCreated");
        assert_eq!(id.as_str(), "A.f8d6e0586b0a20c7.AutoGame.BattleCreated");
        assert_eq!(id.event_name(), "BattleCreated");
    }

    #[test]
    fn test_event_type_id_parse() {
        assert!(EventTypeId::parse("A.0x01.AutoGame.CardCreated").is_some());
        assert!(EventTypeId::parse(" A.01.Foo.Bar ").is_some());
        assert!(EventTypeId::parse("B.01.Foo.Bar").is_none());
        assert!(EventTypeId::parse("A.01.Foo").is_none());
        assert!(EventTypeId::parse("A..Foo.Bar").is_none());
        assert!(EventTypeId::parse("").is_none());
    }

    #[test]
    fn test_event_kind_from_name() {
        assert_eq!(
            EventKind::from_event_name("CardFainted"),
            Some(EventKind::CardFainted)
        );
        assert_eq!(
            EventKind::from_event_name("battlecreated"),
            Some(EventKind::BattleCreated)
        );
        assert_eq!(EventKind::from_event_name("Transfer"), None);
    }

    #[test]
    fn test_battle_created_from_payload() {
        let data = json!({
            "battleID": 7,
            "team1Address": "0x01",
            "team2Address": "0x02",
            "team1IDs": [1, 2],
            "team2IDs": [3],
        });
        let event = GameEvent::from_payload(Some(EventKind::BattleCreated), "A.1.AutoGame.BattleCreated", data);
        match event {
            GameEvent::BattleCreated(b) => {
                assert_eq!(b.battle_id, 7);
                assert_eq!(b.team1_ids, vec![1, 2]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_battle_ended_optional_fields() {
        let event = GameEvent::from_payload(
            Some(EventKind::BattleEnded),
            "A.1.AutoGame.BattleEnded",
            json!({ "battleID": 3, "winner": null }),
        );
        assert_eq!(
            event,
            GameEvent::BattleEnded(BattleEnded {
                battle_id: 3,
                winner: None,
                loser: None,
            })
        );
    }

    #[test]
    fn test_turn_advanced_field_names() {
        let data = json!({
            "battleID": 1, "turn": 2,
            "attackerID": 10, "defenderID": 20,
            "attackerIndex": 0, "defenderIndex": 1,
            "damageToAttacker": 3, "damageToDefender": 4,
            "attackerHealth": -1, "defenderHealth": 5,
        });
        let event = GameEvent::from_payload(Some(EventKind::BattleTurnAdvanced), "t", data);
        assert_eq!(event.kind(), Some(EventKind::BattleTurnAdvanced));
    }

    #[test]
    fn test_schema_mismatch_falls_back_to_other() {
        let data = json!({ "unexpected": true });
        let event = GameEvent::from_payload(Some(EventKind::CardCreated), "A.1.AutoGame.CardCreated", data.clone());
        assert_eq!(
            event,
            GameEvent::Other {
                event_type: "A.1.AutoGame.CardCreated".to_string(),
                data,
            }
        );
    }

    #[test]
    fn test_unknown_kind_is_other() {
        let event = GameEvent::from_payload(None, "A.1.Other.Thing", json!({}));
        assert!(event.kind().is_none());
    }

    #[test]
    fn test_subscription_ids_are_unique() {
        let a = SubscriptionId::next();
        let b = SubscriptionId::next();
        assert_ne!(a, b);
    }
}
