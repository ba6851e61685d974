//! Events the engine emits and requests clients send.
//!
//! Every event is internally tagged (`{"type": "card_flipped", ...}`) so a
//! browser client can switch on a single field.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{CardId, PlayerId, RoomId};

// ---------------------------------------------------------------------------
// ErrorKind
// ---------------------------------------------------------------------------

/// Why a request was rejected.
///
/// This is the only part of a rejection that reaches a client: the engine
/// wraps it in [`GameEvent::Error`] and addresses it to the requester
/// alone. The richer `GameError` (with ids and counts) stays on the server
/// for logging. On the wire each kind is its snake_case name, for example
/// `{"type": "error", "kind": "not_your_turn"}`.
///
/// Every kind except `MalformedRequest` corresponds to one game rule.
/// `MalformedRequest` comes from the framing layer, before any room is
/// known, and is answered on the connection directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotAMember,
    NoActiveGame,
    NotYourTurn,
    GameCompleted,
    UnknownCard,
    AlreadyRevealed,
    AlreadyActive,
    NotRoomCreator,
    NotEnoughPlayers,
    RoomNotWaiting,
    InvalidDeck,
    /// The request bytes could not be decoded.
    MalformedRequest,
}

impl ErrorKind {
    /// The snake_case name used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotAMember => "not_a_member",
            Self::NoActiveGame => "no_active_game",
            Self::NotYourTurn => "not_your_turn",
            Self::GameCompleted => "game_completed",
            Self::UnknownCard => "unknown_card",
            Self::AlreadyRevealed => "already_revealed",
            Self::AlreadyActive => "already_active",
            Self::NotRoomCreator => "not_room_creator",
            Self::NotEnoughPlayers => "not_enough_players",
            Self::RoomNotWaiting => "room_not_waiting",
            Self::InvalidDeck => "invalid_deck",
            Self::MalformedRequest => "malformed_request",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// GameEvent
// ---------------------------------------------------------------------------

/// One line of the final ranking.
///
/// `player_name` is resolved from the roster when the round is announced.
/// A player the roster no longer knows is listed under the id's display
/// form (`P-3`), so every entry in the turn order appears.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingEntry {
    pub player_id: PlayerId,
    pub player_name: String,
    pub score: u32,
}

/// Notifications emitted by the engine.
///
/// Within one room, events are emitted in the order the session applied
/// them: `GameStarted` first, then any mix of `CardFlipped`,
/// `MatchResult`, `CardsReset`, and `TurnChanged`, and `GameOver` last and
/// at most once. `Error` is the exception: it is addressed to a single
/// player and never changes the board.
///
/// The enum is internally tagged, so `TurnChanged` serializes as
/// `{"type": "turn_changed", "current_player_id": 2}`.
///
/// `CardFlipped` carries no matching key: other clients must not learn a
/// card's identity before the pair is resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    /// A new round started in the room.
    GameStarted {
        room_id: RoomId,
        turn_order: Vec<PlayerId>,
        current_player_id: PlayerId,
    },

    /// A card was turned face up.
    CardFlipped {
        card_id: CardId,
        position: u32,
        player_id: PlayerId,
    },

    /// A pair was resolved as equal. `scores` is the full score mapping
    /// after the update.
    MatchResult {
        card1_id: CardId,
        card2_id: CardId,
        matched: bool,
        scores: BTreeMap<PlayerId, u32>,
    },

    /// A mismatched pair was turned face down again. Sent once the reveal
    /// delay has passed, followed by `TurnChanged`.
    CardsReset { card1_id: CardId, card2_id: CardId },

    /// The turn moved to another player.
    TurnChanged { current_player_id: PlayerId },

    /// Every pair is matched. Ranking is ordered best first.
    GameOver { ranking: Vec<RankingEntry> },

    /// A request from this client was rejected.
    Error { kind: ErrorKind },
}

impl GameEvent {
    /// Short event name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::GameStarted { .. } => "game_started",
            Self::CardFlipped { .. } => "card_flipped",
            Self::MatchResult { .. } => "match_result",
            Self::CardsReset { .. } => "cards_reset",
            Self::TurnChanged { .. } => "turn_changed",
            Self::GameOver { .. } => "game_over",
            Self::Error { .. } => "error",
        }
    }
}

// ---------------------------------------------------------------------------
// ClientRequest
// ---------------------------------------------------------------------------

/// Requests a client may send. The acting player's identity comes from
/// the authenticated connection, never from the payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientRequest {
    /// Start a round in a waiting room. Only the room creator may do this.
    StartGame { room_id: RoomId },

    /// Turn a card face up.
    FlipCard { room_id: RoomId, card_id: CardId },
}

impl ClientRequest {
    pub fn room_id(&self) -> RoomId {
        match self {
            Self::StartGame { room_id } | Self::FlipCard { room_id, .. } => *room_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_flipped_json_has_no_matching_key() {
        let event = GameEvent::CardFlipped {
            card_id: CardId(4),
            position: 2,
            player_id: PlayerId(1),
        };
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["type"], "card_flipped");
        assert_eq!(json["card_id"], 4);
        assert_eq!(json["position"], 2);
        assert_eq!(json["player_id"], 1);
        assert_eq!(json.as_object().unwrap().len(), 4);
    }

    #[test]
    fn test_match_result_scores_are_keyed_by_player_id() {
        let mut scores = BTreeMap::new();
        scores.insert(PlayerId(1), 2);
        scores.insert(PlayerId(2), 0);
        let event = GameEvent::MatchResult {
            card1_id: CardId(1),
            card2_id: CardId(2),
            matched: true,
            scores,
        };
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["type"], "match_result");
        assert_eq!(json["matched"], true);
        // JSON object keys are strings; integer newtype keys become "1", "2".
        assert_eq!(json["scores"]["1"], 2);
        assert_eq!(json["scores"]["2"], 0);
    }

    #[test]
    fn test_game_over_ranking_preserves_order() {
        let event = GameEvent::GameOver {
            ranking: vec![
                RankingEntry {
                    player_id: PlayerId(2),
                    player_name: "bob".into(),
                    score: 3,
                },
                RankingEntry {
                    player_id: PlayerId(1),
                    player_name: "alice".into(),
                    score: 1,
                },
            ],
        };
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["type"], "game_over");
        assert_eq!(json["ranking"][0]["player_name"], "bob");
        assert_eq!(json["ranking"][1]["score"], 1);
    }

    #[test]
    fn test_error_event_json_shape() {
        let event = GameEvent::Error {
            kind: ErrorKind::NotYourTurn,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json, serde_json::json!({ "type": "error", "kind": "not_your_turn" }));
    }

    #[test]
    fn test_error_kind_as_str_matches_serde_name() {
        let kinds = [
            ErrorKind::NotAMember,
            ErrorKind::NoActiveGame,
            ErrorKind::NotYourTurn,
            ErrorKind::GameCompleted,
            ErrorKind::UnknownCard,
            ErrorKind::AlreadyRevealed,
            ErrorKind::AlreadyActive,
            ErrorKind::NotRoomCreator,
            ErrorKind::NotEnoughPlayers,
            ErrorKind::RoomNotWaiting,
            ErrorKind::InvalidDeck,
            ErrorKind::MalformedRequest,
        ];
        for kind in kinds {
            let json = serde_json::to_value(kind).unwrap();
            assert_eq!(json, kind.as_str());
        }
    }

    #[test]
    fn test_event_name_matches_tag() {
        let event = GameEvent::TurnChanged {
            current_player_id: PlayerId(9),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], event.name());
    }

    #[test]
    fn test_client_request_flip_card_parses() {
        let raw = r#"{"type": "flip_card", "room_id": 3, "card_id": 11}"#;
        let req: ClientRequest = serde_json::from_str(raw).unwrap();
        assert_eq!(
            req,
            ClientRequest::FlipCard {
                room_id: RoomId(3),
                card_id: CardId(11),
            }
        );
        assert_eq!(req.room_id(), RoomId(3));
    }

    #[test]
    fn test_client_request_rejects_string_card_id() {
        let raw = r#"{"type": "flip_card", "room_id": 3, "card_id": "eleven"}"#;
        let result: Result<ClientRequest, _> = serde_json::from_str(raw);
        assert!(result.is_err());
    }

    #[test]
    fn test_client_request_unknown_type_is_rejected() {
        let raw = r#"{"type": "peek_card", "room_id": 3}"#;
        let result: Result<ClientRequest, _> = serde_json::from_str(raw);
        assert!(result.is_err());
    }
}
