//! Outbound event delivery.

use pairforge_protocol::{GameEvent, Recipient, RoomId};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Where the engine sends [`GameEvent`]s.
///
/// Implementations translate a `(room, recipient)` pair into whatever the
/// transport needs (a socket room broadcast, a single connection). `emit`
/// must not block: it is called from inside session actors, sometimes
/// while the registry lock is held.
pub trait EventSink: Send + Sync + 'static {
    fn emit(&self, room_id: RoomId, recipient: Recipient, event: GameEvent);
}

/// One emitted event, as delivered by [`ChannelSink`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outbound {
    pub room_id: RoomId,
    pub recipient: Recipient,
    pub event: GameEvent,
}

/// An [`EventSink`] that forwards every event into an unbounded channel.
///
/// Events from one room arrive in emission order.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: mpsc::UnboundedSender<Outbound>,
}

impl ChannelSink {
    /// Create a sink and the receiver that drains it.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Outbound>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, room_id: RoomId, recipient: Recipient, event: GameEvent) {
        tracing::trace!(%room_id, event = event.name(), "emit");
        // A dropped receiver means nobody is listening any more.
        let _ = self.sender.send(Outbound {
            room_id,
            recipient,
            event,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pairforge_protocol::PlayerId;

    #[test]
    fn test_channel_sink_preserves_order() {
        let (sink, mut rx) = ChannelSink::new();
        sink.emit(
            RoomId(1),
            Recipient::All,
            GameEvent::TurnChanged {
                current_player_id: PlayerId(2),
            },
        );
        sink.emit(
            RoomId(1),
            Recipient::Player(PlayerId(2)),
            GameEvent::GameOver { ranking: vec![] },
        );

        let first = rx.try_recv().unwrap();
        assert_eq!(first.recipient, Recipient::All);
        assert_eq!(first.event.name(), "turn_changed");

        let second = rx.try_recv().unwrap();
        assert_eq!(second.recipient, Recipient::Player(PlayerId(2)));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_outbound_serializes_with_tagged_event() {
        let outbound = Outbound {
            room_id: RoomId(3),
            recipient: Recipient::Player(PlayerId(9)),
            event: GameEvent::TurnChanged {
                current_player_id: PlayerId(9),
            },
        };
        let json = serde_json::to_value(&outbound).unwrap();

        assert_eq!(json["room_id"], 3);
        assert_eq!(json["event"]["type"], "turn_changed");
        assert_eq!(json["event"]["current_player_id"], 9);
    }

    #[test]
    fn test_emit_after_receiver_dropped_is_silent() {
        let (sink, rx) = ChannelSink::new();
        drop(rx);
        sink.emit(
            RoomId(1),
            Recipient::All,
            GameEvent::GameOver { ranking: vec![] },
        );
    }
}
