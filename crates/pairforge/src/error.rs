//! Unified error type for the Pairforge facade.

use pairforge_protocol::ProtocolError;
use pairforge_session::GameError;

/// Top-level error that wraps the per-crate errors.
///
/// `#[from]` lets `?` convert sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum PairforgeError {
    /// A request could not be decoded, or an event could not be encoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A game rule rejected the request.
    #[error(transparent)]
    Game(#[from] GameError),
}

impl PairforgeError {
    /// The game rejection, if this is one.
    pub fn as_game(&self) -> Option<&GameError> {
        match self {
            Self::Game(err) => Some(err),
            Self::Protocol(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pairforge_protocol::{PlayerId, RoomId};

    #[test]
    fn test_from_protocol_error() {
        let err = ProtocolError::InvalidMessage("empty frame".into());
        let pairforge_err: PairforgeError = err.into();
        assert!(matches!(pairforge_err, PairforgeError::Protocol(_)));
        assert!(pairforge_err.to_string().contains("empty frame"));
        assert!(pairforge_err.as_game().is_none());
    }

    #[test]
    fn test_from_game_error() {
        let err = GameError::NotYourTurn(PlayerId(2));
        let pairforge_err: PairforgeError = err.clone().into();
        assert_eq!(pairforge_err.as_game(), Some(&err));
        assert_eq!(pairforge_err.to_string(), "it is not player P-2's turn");
    }

    #[test]
    fn test_game_error_display_is_transparent() {
        let err: PairforgeError = GameError::NoActiveGame(RoomId(4)).into();
        assert_eq!(err.to_string(), "no active game in room R-4");
    }
}
