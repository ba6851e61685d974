//! Wire-level vocabulary for Pairforge.
//!
//! This crate defines what the game engine and its consumers agree on:
//!
//! - **Identities** ([`PlayerId`], [`RoomId`], [`CardId`]) and the durable
//!   roster shapes the engine reads ([`CardRecord`], [`RoomStatus`]).
//! - **Events** ([`GameEvent`]) the engine emits, addressed with a
//!   [`Recipient`], and the [`ErrorKind`] carried by rejections.
//! - **Requests** ([`ClientRequest`]) a transport decodes from a client.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) for framing all of the above.
//!
//! # Architecture
//!
//! ```text
//! Transport (bytes) → Protocol (ClientRequest / GameEvent) → Engine (sessions)
//! ```
//!
//! The protocol layer knows nothing about sessions or timing. It only
//! describes what travels between the engine and the outside world.

mod codec;
mod error;
mod events;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use events::{ClientRequest, ErrorKind, GameEvent, RankingEntry};
pub use types::{CardId, CardRecord, PlayerId, Recipient, RoomId, RoomStatus};
