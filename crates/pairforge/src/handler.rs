//! Request handler: raw client frames in, engine calls out.
//!
//! The transport authenticates a connection and knows which player sent a
//! frame. It hands the bytes to [`RequestHandler::handle_frame`], which
//! decodes a [`ClientRequest`] and calls the matching engine entry point.
//! Events produced by the engine, including rejections, leave through the
//! engine's sink; only frames that cannot be decoded are answered
//! directly, because they carry no room to route an error to.

use pairforge_engine::{Engine, EventSink, Roster};
use pairforge_protocol::{ClientRequest, Codec, ErrorKind, GameEvent, JsonCodec, PlayerId};

use crate::PairforgeError;

/// Decodes client requests and dispatches them to an [`Engine`].
pub struct RequestHandler<R: Roster, S: EventSink, C: Codec = JsonCodec> {
    engine: Engine<R, S>,
    codec: C,
}

impl<R: Roster, S: EventSink> RequestHandler<R, S, JsonCodec> {
    /// A handler speaking JSON.
    pub fn new(engine: Engine<R, S>) -> Self {
        Self::with_codec(engine, JsonCodec)
    }
}

impl<R: Roster, S: EventSink, C: Codec> RequestHandler<R, S, C> {
    pub fn with_codec(engine: Engine<R, S>, codec: C) -> Self {
        Self { engine, codec }
    }

    pub fn engine(&self) -> &Engine<R, S> {
        &self.engine
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Handle one frame from `player_id`.
    ///
    /// Returns bytes to send straight back to the connection when the
    /// frame was malformed; `None` otherwise.
    pub async fn handle_frame(&self, player_id: PlayerId, frame: &[u8]) -> Option<Vec<u8>> {
        let request: ClientRequest = match self.codec.decode(frame) {
            Ok(request) => request,
            Err(err) => {
                tracing::debug!(%player_id, error = %err, "failed to decode request");
                return self.malformed_reply();
            }
        };
        // Game rejections were already delivered through the sink.
        let _ = self.dispatch(player_id, request).await;
        None
    }

    /// Run a decoded request against the engine.
    pub async fn dispatch(&self, player_id: PlayerId, request: ClientRequest) -> Result<(), PairforgeError> {
        match request {
            ClientRequest::StartGame { room_id } => {
                self.engine.start_session_as(room_id, player_id).await?;
            }
            ClientRequest::FlipCard { room_id, card_id } => {
                self.engine.flip_card(room_id, card_id, player_id).await?;
            }
        }
        Ok(())
    }

    fn malformed_reply(&self) -> Option<Vec<u8>> {
        let event = GameEvent::Error {
            kind: ErrorKind::MalformedRequest,
        };
        match self.codec.encode(&event) {
            Ok(bytes) => Some(bytes),
            Err(err) => {
                tracing::warn!(error = %err, "failed to encode error reply");
                None
            }
        }
    }
}
