use std::sync::Arc;
use std::time::Duration;

use pairforge::prelude::*;

const ROOM: RoomId = RoomId(1);
const HOST: PlayerId = PlayerId(1);
const GUEST: PlayerId = PlayerId(2);

// ---------------------------------------------------------------------------
// Setup
// ---------------------------------------------------------------------------

fn roster() -> MemoryRoster {
    let roster = MemoryRoster::new();
    roster.add_player(HOST, "ada");
    roster.add_player(GUEST, "grace");
    roster.create_room(ROOM, HOST);
    roster.join(ROOM, GUEST);

    let cards = ["apple", "pear", "plum"]
        .iter()
        .enumerate()
        .flat_map(|(i, key)| {
            let first = 2 * i as u64 + 1;
            [
                CardRecord::new(CardId(first), *key),
                CardRecord::new(CardId(first + 1), *key),
            ]
        })
        .collect();
    roster.set_cards(ROOM, cards);
    roster
}

/// A client frame, as a transport would receive it.
fn frame(request: &ClientRequest) -> Result<Vec<u8>, PairforgeError> {
    Ok(JsonCodec.encode(request)?)
}

async fn send(
    handler: &RequestHandler<MemoryRoster, ChannelSink>,
    player: PlayerId,
    request: ClientRequest,
) -> Result<(), PairforgeError> {
    if let Some(reply) = handler.handle_frame(player, &frame(&request)?).await {
        println!("-> {player} {}", String::from_utf8_lossy(&reply));
    }
    Ok(())
}

fn flip(card: u64) -> ClientRequest {
    ClientRequest::FlipCard {
        room_id: ROOM,
        card_id: CardId(card),
    }
}

// ---------------------------------------------------------------------------
// Main: one scripted round
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pairforge::telemetry::init_tracing();

    let config = pairforge::config::load_config();
    let pause = config.reveal_delay.max(config.announce_delay) + Duration::from_millis(100);

    let (sink, mut events) = ChannelSink::new();
    let engine = Engine::with_config(Arc::new(roster()), Arc::new(sink), config);
    let handler = RequestHandler::new(engine);

    // Print every event as the JSON a client would receive.
    let printer = tokio::spawn(async move {
        while let Some(outbound) = events.recv().await {
            let to = match outbound.recipient {
                Recipient::All => "all".to_string(),
                Recipient::Player(player) => player.to_string(),
            };
            match JsonCodec.encode(&outbound.event) {
                Ok(bytes) => println!("-> {to} {}", String::from_utf8_lossy(&bytes)),
                Err(err) => tracing::warn!(error = %err, "failed to encode event"),
            }
            if matches!(outbound.event, GameEvent::GameOver { .. }) {
                break;
            }
        }
    });

    send(&handler, HOST, ClientRequest::StartGame { room_id: ROOM }).await?;

    // Guest jumps the queue, then host misses.
    send(&handler, GUEST, flip(1)).await?;
    send(&handler, HOST, flip(1)).await?;
    send(&handler, HOST, flip(3)).await?;
    tokio::time::sleep(pause).await;

    // Guest clears the board.
    for card in 1..=6 {
        send(&handler, GUEST, flip(card)).await?;
    }
    // Too late: every pair is matched.
    send(&handler, GUEST, flip(1)).await?;

    // Garbage is answered on the connection itself.
    if let Some(reply) = handler.handle_frame(HOST, b"not json").await {
        println!("-> {HOST} {}", String::from_utf8_lossy(&reply));
    }

    tokio::time::sleep(pause).await;

    printer.await?;
    Ok(())
}
