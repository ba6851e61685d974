//! Codec trait and implementations for framing events and requests.
//!
//! A codec converts between Rust values and raw bytes. The engine never
//! touches bytes itself; the surrounding application picks a codec and
//! uses it at the transport boundary.

use serde::{de::DeserializeOwned, Serialize};

use crate::ProtocolError;

/// Encodes values to bytes and decodes bytes back.
///
/// `Send + Sync + 'static` because a codec is shared by every connection
/// task for the lifetime of the process.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if the value cannot be represented.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed or do
    /// not match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] backed by `serde_json`.
///
/// ```rust
/// use pairforge_protocol::{Codec, ErrorKind, GameEvent, JsonCodec};
///
/// let codec = JsonCodec;
/// let event = GameEvent::Error { kind: ErrorKind::NotYourTurn };
///
/// let bytes = codec.encode(&event).unwrap();
/// let decoded: GameEvent = codec.decode(&bytes).unwrap();
/// assert_eq!(event, decoded);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        if data.is_empty() {
            return Err(ProtocolError::InvalidMessage("empty frame".into()));
        }
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::{CardId, ClientRequest, RoomId};

    #[test]
    fn test_decode_client_request() {
        let codec = JsonCodec;
        let req: ClientRequest = codec
            .decode(br#"{"type":"start_game","room_id":8}"#)
            .unwrap();
        assert_eq!(req, ClientRequest::StartGame { room_id: RoomId(8) });
    }

    #[test]
    fn test_encode_is_plain_json() {
        let codec = JsonCodec;
        let bytes = codec
            .encode(&ClientRequest::FlipCard {
                room_id: RoomId(1),
                card_id: CardId(2),
            })
            .unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("\"type\":\"flip_card\""));
    }

    #[test]
    fn test_decode_empty_frame_is_invalid_message() {
        let codec = JsonCodec;
        let result: Result<ClientRequest, _> = codec.decode(b"");
        assert!(matches!(result, Err(ProtocolError::InvalidMessage(_))));
    }

    #[test]
    fn test_decode_garbage_is_decode_error() {
        let codec = JsonCodec;
        let result: Result<ClientRequest, _> = codec.decode(b"not json at all");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }
}
