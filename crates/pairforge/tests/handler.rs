//! Integration tests for request framing and dispatch through the facade.

use std::sync::Arc;
use std::time::Duration;

use pairforge::prelude::*;
use tokio::sync::mpsc::UnboundedReceiver;

const ROOM: RoomId = RoomId(5);
const HOST: PlayerId = PlayerId(10);
const GUEST: PlayerId = PlayerId(11);

fn handler() -> (
    RequestHandler<MemoryRoster, ChannelSink>,
    UnboundedReceiver<Outbound>,
) {
    let roster = Arc::new(MemoryRoster::new());
    roster.add_player(HOST, "host");
    roster.add_player(GUEST, "guest");
    roster.create_room(ROOM, HOST);
    roster.join(ROOM, GUEST);
    roster.set_cards(
        ROOM,
        vec![
            CardRecord::new(CardId(1), "sun"),
            CardRecord::new(CardId(2), "sun"),
            CardRecord::new(CardId(3), "moon"),
            CardRecord::new(CardId(4), "moon"),
        ],
    );

    let (sink, rx) = ChannelSink::new();
    let config = EngineConfig::default().with_reveal_delay(Duration::from_millis(200));
    let engine = Engine::with_config(roster, Arc::new(sink), config);
    (RequestHandler::new(engine), rx)
}

fn drain(rx: &mut UnboundedReceiver<Outbound>) -> Vec<Outbound> {
    let mut out = Vec::new();
    while let Ok(msg) = rx.try_recv() {
        out.push(msg);
    }
    out
}

#[tokio::test(start_paused = true)]
async fn test_start_and_flip_frames_drive_the_engine() {
    let (handler, mut rx) = handler();

    let reply = handler
        .handle_frame(HOST, br#"{"type":"start_game","room_id":5}"#)
        .await;
    assert!(reply.is_none());
    assert!(handler.engine().is_active(ROOM).await);

    let reply = handler
        .handle_frame(HOST, br#"{"type":"flip_card","room_id":5,"card_id":3}"#)
        .await;
    assert!(reply.is_none());

    let events = drain(&mut rx);
    let names: Vec<_> = events.iter().map(|o| o.event.name()).collect();
    assert_eq!(names, vec!["game_started", "card_flipped"]);
}

#[tokio::test(start_paused = true)]
async fn test_malformed_frame_gets_direct_error_reply() {
    let (handler, mut rx) = handler();

    let reply = handler.handle_frame(HOST, b"{ nope").await.unwrap();
    let event: GameEvent = JsonCodec.decode(&reply).unwrap();

    assert_eq!(
        event,
        GameEvent::Error {
            kind: ErrorKind::MalformedRequest
        }
    );
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_empty_and_unknown_frames_are_malformed() {
    let (handler, _rx) = handler();

    assert!(handler.handle_frame(HOST, b"").await.is_some());
    assert!(
        handler
            .handle_frame(HOST, br#"{"type":"shuffle","room_id":5}"#)
            .await
            .is_some()
    );
}

#[tokio::test(start_paused = true)]
async fn test_rejected_request_reaches_requester_through_sink() {
    let (handler, mut rx) = handler();

    let reply = handler
        .handle_frame(GUEST, br#"{"type":"start_game","room_id":5}"#)
        .await;

    assert!(reply.is_none());
    let events = drain(&mut rx);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].recipient, Recipient::Player(GUEST));
    assert_eq!(
        events[0].event,
        GameEvent::Error {
            kind: ErrorKind::NotRoomCreator
        }
    );
}

#[tokio::test(start_paused = true)]
async fn test_dispatch_returns_game_errors() {
    let (handler, _rx) = handler();

    let err = handler
        .dispatch(
            HOST,
            ClientRequest::FlipCard {
                room_id: ROOM,
                card_id: CardId(1),
            },
        )
        .await
        .unwrap_err();

    assert_eq!(err.as_game(), Some(&GameError::NoActiveGame(ROOM)));
}

#[tokio::test(start_paused = true)]
async fn test_configured_reveal_delay_is_used() {
    let (handler, mut rx) = handler();
    let engine = handler.engine();
    engine.start_session_as(ROOM, HOST).await.unwrap();
    engine.flip_card(ROOM, CardId(1), HOST).await.unwrap();
    engine.flip_card(ROOM, CardId(3), HOST).await.unwrap();
    drain(&mut rx);

    tokio::time::sleep(Duration::from_millis(250)).await;
    let board = engine.snapshot(ROOM).await.unwrap();

    assert_eq!(board.current_player_id, GUEST);
    let names: Vec<_> = drain(&mut rx).iter().map(|o| o.event.name()).collect();
    assert_eq!(names, vec!["cards_reset", "turn_changed"]);
}
