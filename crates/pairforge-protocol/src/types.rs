//! Identity and roster types shared by every Pairforge crate.
//!
//! These are the values that cross the boundary between the engine and
//! its external collaborators (the roster store, the transport). They are
//! deliberately small and `Copy` where possible.

use serde::{Deserialize, Serialize};

use std::fmt;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A stable identifier for a player.
///
/// Newtype wrapper over `u64` so a `PlayerId` can never be passed where a
/// `RoomId` or `CardId` is expected. `#[serde(transparent)]` keeps the wire
/// form a plain number: `PlayerId(42)` is `42` in JSON.
///
/// `Ord` is derived because rankings break ties by ascending player id and
/// score maps are kept in a `BTreeMap` for stable output.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// Identifier of a room: one table of players sharing a card set.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RoomId(pub u64);

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R-{}", self.0)
    }
}

/// Identifier of a card. Unique within its room.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct CardId(pub u64);

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Roster shapes
// ---------------------------------------------------------------------------

/// Lifecycle status of a room as stored by the roster.
///
/// The engine only ever moves a room `Waiting → Playing` when a session
/// starts and `Playing → Waiting` when it ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomStatus {
    Waiting,
    Playing,
}

impl fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Waiting => write!(f, "waiting"),
            Self::Playing => write!(f, "playing"),
        }
    }
}

/// A persisted card as the roster knows it: identity and matching key.
///
/// Two cards in the same room share a `matching_key` iff they form a pair.
/// Positions are not part of the record; the engine assigns them by
/// shuffling when a round starts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CardRecord {
    pub card_id: CardId,
    pub matching_key: String,
}

impl CardRecord {
    pub fn new(card_id: CardId, matching_key: impl Into<String>) -> Self {
        Self {
            card_id,
            matching_key: matching_key.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Recipient — who should receive an event?
// ---------------------------------------------------------------------------

/// Addressing for an emitted event.
///
/// Board changes go to `All` members of the room. Rejections go to the
/// single `Player` who made the request, so a failed flip is invisible to
/// everyone else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recipient {
    /// Every member of the room.
    All,

    /// One specific player.
    Player(PlayerId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_serialize_as_plain_numbers() {
        assert_eq!(serde_json::to_string(&PlayerId(42)).unwrap(), "42");
        assert_eq!(serde_json::to_string(&RoomId(99)).unwrap(), "99");
        assert_eq!(serde_json::to_string(&CardId(7)).unwrap(), "7");
    }

    #[test]
    fn test_ids_deserialize_from_plain_numbers() {
        let pid: PlayerId = serde_json::from_str("42").unwrap();
        assert_eq!(pid, PlayerId(42));
        let cid: CardId = serde_json::from_str("3").unwrap();
        assert_eq!(cid, CardId(3));
    }

    #[test]
    fn test_id_display() {
        assert_eq!(PlayerId(7).to_string(), "P-7");
        assert_eq!(RoomId(3).to_string(), "R-3");
        assert_eq!(CardId(12).to_string(), "C-12");
    }

    #[test]
    fn test_player_ids_order_numerically() {
        let mut ids = vec![PlayerId(10), PlayerId(2), PlayerId(7)];
        ids.sort();
        assert_eq!(ids, vec![PlayerId(2), PlayerId(7), PlayerId(10)]);
    }

    #[test]
    fn test_room_status_uses_lowercase_on_the_wire() {
        assert_eq!(
            serde_json::to_string(&RoomStatus::Waiting).unwrap(),
            "\"waiting\""
        );
        assert_eq!(
            serde_json::to_string(&RoomStatus::Playing).unwrap(),
            "\"playing\""
        );
        assert_eq!(RoomStatus::Playing.to_string(), "playing");
    }

    #[test]
    fn test_card_record_new_accepts_str() {
        let card = CardRecord::new(CardId(1), "apple");
        assert_eq!(card.matching_key, "apple");
        assert_eq!(card.card_id, CardId(1));
    }

    #[test]
    fn test_recipient_player_json_shape() {
        let json = serde_json::to_value(Recipient::Player(PlayerId(5))).unwrap();
        assert_eq!(json, serde_json::json!({ "Player": 5 }));
    }
}
