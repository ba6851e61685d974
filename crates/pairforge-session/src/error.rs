//! Error types for the session model.

use pairforge_protocol::{CardId, ErrorKind, PlayerId, RoomId};

/// A rejected game operation.
///
/// Every variant is recoverable and reported only to the requester. A
/// rejected operation never changes the session.
///
/// Variants carry the ids involved so a log line names the exact room,
/// player, or card. Clients never see them: [`GameError::kind`] reduces a
/// rejection to the wire-level [`ErrorKind`] before it is emitted.
///
/// `Clone` and `PartialEq` are derived so the same error can be returned
/// to the caller and compared in tests.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    /// The player is not a member of the room (or of the round's turn order).
    #[error("player {0} is not a member of room {1}")]
    NotAMember(PlayerId, RoomId),

    /// No round is running in the room.
    #[error("no active game in room {0}")]
    NoActiveGame(RoomId),

    /// Someone else holds the turn, or the player's turn-step is spent
    /// while a mismatched pair is still showing.
    #[error("it is not player {0}'s turn")]
    NotYourTurn(PlayerId),

    /// Every pair is matched; the round is waiting for its announcement.
    #[error("the game in room {0} is already completed")]
    GameCompleted(RoomId),

    /// The card id does not belong to this round.
    #[error("card {0} is not part of this game")]
    UnknownCard(CardId),

    /// The card is face up or already matched.
    #[error("card {0} is already revealed")]
    AlreadyRevealed(CardId),

    /// A round is already running in the room.
    #[error("a game is already active in room {0}")]
    AlreadyActive(RoomId),

    /// Only the room's creator may start a round.
    #[error("player {0} did not create room {1}")]
    NotRoomCreator(PlayerId, RoomId),

    /// The room has fewer members than a round needs.
    #[error("room {room_id} has {have} players, {need} required")]
    NotEnoughPlayers {
        room_id: RoomId,
        have: usize,
        need: usize,
    },

    /// The room is not in `waiting` status.
    #[error("room {0} is not waiting for a game")]
    RoomNotWaiting(RoomId),

    /// The room's cards cannot form a playable deck.
    #[error("invalid deck: {0}")]
    InvalidDeck(String),
}

impl GameError {
    /// The wire-level kind sent to the requester in `GameEvent::Error`.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotAMember(..) => ErrorKind::NotAMember,
            Self::NoActiveGame(_) => ErrorKind::NoActiveGame,
            Self::NotYourTurn(_) => ErrorKind::NotYourTurn,
            Self::GameCompleted(_) => ErrorKind::GameCompleted,
            Self::UnknownCard(_) => ErrorKind::UnknownCard,
            Self::AlreadyRevealed(_) => ErrorKind::AlreadyRevealed,
            Self::AlreadyActive(_) => ErrorKind::AlreadyActive,
            Self::NotRoomCreator(..) => ErrorKind::NotRoomCreator,
            Self::NotEnoughPlayers { .. } => ErrorKind::NotEnoughPlayers,
            Self::RoomNotWaiting(_) => ErrorKind::RoomNotWaiting,
            Self::InvalidDeck(_) => ErrorKind::InvalidDeck,
        }
    }
}

/// A delayed task woke up to a session that no longer matches what the
/// task captured. This is a defect, not a user-facing error; the task is
/// dropped without touching the session.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("stale delayed task: {0}")]
pub struct StaleTask(pub &'static str);
