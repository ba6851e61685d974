//! # Pairforge
//!
//! Server-side sessions for a multiplayer memory-match ("concentration")
//! game. Players in a room take turns flipping two cards; a matching pair
//! scores and keeps the turn, a mismatch is hidden again after a short
//! delay and the turn passes on. When every pair is matched the ranking
//! is announced and the room goes back to waiting.
//!
//! The application owns rooms, players, and card sets (behind a
//! [`Roster`](pairforge_engine::Roster)) and delivers events (through an
//! [`EventSink`](pairforge_engine::EventSink)). Pairforge owns the rounds.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use pairforge::prelude::*;
//!
//! # async fn run() -> Result<(), PairforgeError> {
//! pairforge::telemetry::init_tracing();
//!
//! let roster = Arc::new(MemoryRoster::new());
//! roster.create_room(RoomId(1), PlayerId(1));
//! roster.join(RoomId(1), PlayerId(2));
//! roster.set_cards(
//!     RoomId(1),
//!     vec![
//!         CardRecord::new(CardId(1), "cat"),
//!         CardRecord::new(CardId(2), "cat"),
//!     ],
//! );
//!
//! let (sink, mut events) = ChannelSink::new();
//! let engine = Engine::with_config(roster, Arc::new(sink), pairforge::config::load_config());
//!
//! engine.start_session_as(RoomId(1), PlayerId(1)).await?;
//! engine.flip_card(RoomId(1), CardId(1), PlayerId(1)).await?;
//! while let Ok(outbound) = events.try_recv() {
//!     println!("{:?}", outbound.event);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
mod error;
mod handler;
pub mod telemetry;

pub use error::PairforgeError;
pub use handler::RequestHandler;

/// Re-exports for applications embedding the engine.
pub mod prelude {
    pub use crate::{PairforgeError, RequestHandler};
    pub use pairforge_engine::{
        ChannelSink, Engine, EngineConfig, EventSink, MemberLeft, MemoryRoster, Outbound, Roster,
    };
    pub use pairforge_protocol::{
        CardId, CardRecord, ClientRequest, Codec, ErrorKind, GameEvent, JsonCodec, PlayerId,
        RankingEntry, Recipient, RoomId, RoomStatus,
    };
    pub use pairforge_session::{BoardView, FlipOutcome, GameError, Phase};
}
