//! Concurrent game-session engine for Pairforge.
//!
//! Each playing room runs one session actor: an isolated Tokio task that
//! owns the room's [`GameSession`](pairforge_session::GameSession) and its
//! delayed-task timer. Every mutation of a room (flips, members leaving,
//! hiding a mismatched pair, announcing the ranking, teardown) is processed
//! by that one task, so rooms never race with themselves and run fully in
//! parallel with each other.
//!
//! # Key types
//!
//! - [`Engine`] — entry points used by the surrounding application
//! - [`SessionRegistry`] — room id → running session, with teardown
//! - [`SessionHandle`] — send commands to a running session actor
//! - [`Roster`] — durable room/player/card data, owned elsewhere
//! - [`EventSink`] — where emitted [`GameEvent`](pairforge_protocol::GameEvent)s go
//! - [`EngineConfig`] — delays and limits

mod actor;
mod config;
mod engine;
mod registry;
mod roster;
mod sink;

pub use actor::SessionHandle;
pub use config::EngineConfig;
pub use engine::{Engine, MemberLeft};
pub use registry::SessionRegistry;
pub use roster::{MemoryRoster, Roster};
pub use sink::{ChannelSink, EventSink, Outbound};
