//! Game session model for Pairforge.
//!
//! Everything in this crate is synchronous and single-owner: a
//! [`GameSession`] is mutated by exactly one task (the session actor in
//! `pairforge-engine`), so none of these types need locks.
//!
//! # Key types
//!
//! - [`Deck`] / [`Card`] / [`CardState`] — shuffled cards and their visibility
//! - [`TurnSequencer`] — fixed player rotation
//! - [`GameSession`] — flip buffer, pair resolution, scores, phases
//! - [`GameError`] — rejections surfaced to the requesting player
//!
//! # How it fits in the stack
//!
//! ```text
//! Engine (above)  ← owns one GameSession per playing room, schedules FollowUps
//!     ↕
//! Session model (this crate)  ← validates flips, resolves pairs
//!     ↕
//! Protocol (below)  ← ids, GameEvent, ErrorKind
//! ```

mod deck;
mod error;
mod game;
mod turn;

pub use deck::{Card, CardState, Deck};
pub use error::{GameError, StaleTask};
pub use game::{BoardView, CardView, FlipOutcome, FlipStep, FollowUp, GameSession, Phase};
pub use turn::TurnSequencer;
