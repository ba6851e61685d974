//! The roster hook: durable room, player, and card data.
//!
//! Pairforge does not store users, rooms, or card sets. Whatever does
//! (a database, a web app's models) implements [`Roster`], and the engine
//! reads membership and cards through it when a round starts and writes
//! back only the room's status.
//!
//! Methods are synchronous and expected to be quick: the engine calls
//! some of them while holding the registry lock, so that a room's status
//! flips together with its session entry.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use pairforge_protocol::{CardRecord, PlayerId, RoomId, RoomStatus};

/// Read access to rooms, players, and cards, plus room status updates.
///
/// `Send + Sync + 'static` because one roster is shared by every session
/// actor for the lifetime of the engine.
pub trait Roster: Send + Sync + 'static {
    /// Current members of a room, in join order. Empty for unknown rooms.
    fn members(&self, room_id: RoomId) -> Vec<PlayerId>;

    /// Whether `player_id` currently belongs to `room_id`.
    fn is_member(&self, room_id: RoomId, player_id: PlayerId) -> bool {
        self.members(room_id).contains(&player_id)
    }

    /// Display name for a player.
    fn player_name(&self, player_id: PlayerId) -> Option<String>;

    /// The player who created the room.
    fn room_creator(&self, room_id: RoomId) -> Option<PlayerId>;

    /// Stored status of a room. `None` for unknown rooms.
    fn room_status(&self, room_id: RoomId) -> Option<RoomStatus>;

    /// Persist a new status for a room.
    fn set_room_status(&self, room_id: RoomId, status: RoomStatus);

    /// The room's card set. Positions are assigned by the engine.
    fn cards(&self, room_id: RoomId) -> Vec<CardRecord>;
}

// ---------------------------------------------------------------------------
// MemoryRoster
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct RoomEntry {
    creator: PlayerId,
    status: RoomStatus,
    members: Vec<PlayerId>,
    cards: Vec<CardRecord>,
}

#[derive(Debug, Default)]
struct RosterData {
    players: HashMap<PlayerId, String>,
    rooms: HashMap<RoomId, RoomEntry>,
}

/// An in-process [`Roster`] for demos, tests, and single-node deployments.
#[derive(Debug, Default)]
pub struct MemoryRoster {
    data: RwLock<RosterData>,
}

impl MemoryRoster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a player name.
    pub fn add_player(&self, player_id: PlayerId, name: impl Into<String>) {
        self.write().players.insert(player_id, name.into());
    }

    /// Create a waiting room with `creator` as its first member.
    ///
    /// Returns `false` if the room already exists.
    pub fn create_room(&self, room_id: RoomId, creator: PlayerId) -> bool {
        let mut data = self.write();
        if data.rooms.contains_key(&room_id) {
            return false;
        }
        data.rooms.insert(
            room_id,
            RoomEntry {
                creator,
                status: RoomStatus::Waiting,
                members: vec![creator],
                cards: Vec::new(),
            },
        );
        true
    }

    /// Add a member. Returns `false` for unknown rooms or existing members.
    pub fn join(&self, room_id: RoomId, player_id: PlayerId) -> bool {
        let mut data = self.write();
        match data.rooms.get_mut(&room_id) {
            Some(room) if !room.members.contains(&player_id) => {
                room.members.push(player_id);
                true
            }
            _ => false,
        }
    }

    /// Remove a member. Returns `false` if they were not in the room.
    pub fn leave(&self, room_id: RoomId, player_id: PlayerId) -> bool {
        let mut data = self.write();
        match data.rooms.get_mut(&room_id) {
            Some(room) => {
                let before = room.members.len();
                room.members.retain(|p| *p != player_id);
                room.members.len() != before
            }
            None => false,
        }
    }

    /// Replace the room's card set.
    pub fn set_cards(&self, room_id: RoomId, cards: Vec<CardRecord>) {
        if let Some(room) = self.write().rooms.get_mut(&room_id) {
            room.cards = cards;
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, RosterData> {
        self.data.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, RosterData> {
        self.data.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Roster for MemoryRoster {
    fn members(&self, room_id: RoomId) -> Vec<PlayerId> {
        self.read()
            .rooms
            .get(&room_id)
            .map(|r| r.members.clone())
            .unwrap_or_default()
    }

    fn is_member(&self, room_id: RoomId, player_id: PlayerId) -> bool {
        self.read()
            .rooms
            .get(&room_id)
            .is_some_and(|r| r.members.contains(&player_id))
    }

    fn player_name(&self, player_id: PlayerId) -> Option<String> {
        self.read().players.get(&player_id).cloned()
    }

    fn room_creator(&self, room_id: RoomId) -> Option<PlayerId> {
        self.read().rooms.get(&room_id).map(|r| r.creator)
    }

    fn room_status(&self, room_id: RoomId) -> Option<RoomStatus> {
        self.read().rooms.get(&room_id).map(|r| r.status)
    }

    fn set_room_status(&self, room_id: RoomId, status: RoomStatus) {
        if let Some(room) = self.write().rooms.get_mut(&room_id) {
            room.status = status;
        }
    }

    fn cards(&self, room_id: RoomId) -> Vec<CardRecord> {
        self.read()
            .rooms
            .get(&room_id)
            .map(|r| r.cards.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pairforge_protocol::CardId;

    #[test]
    fn test_create_room_adds_creator_as_waiting_member() {
        let roster = MemoryRoster::new();
        assert!(roster.create_room(RoomId(1), PlayerId(7)));

        assert_eq!(roster.members(RoomId(1)), vec![PlayerId(7)]);
        assert_eq!(roster.room_creator(RoomId(1)), Some(PlayerId(7)));
        assert_eq!(roster.room_status(RoomId(1)), Some(RoomStatus::Waiting));
        assert!(!roster.create_room(RoomId(1), PlayerId(8)));
    }

    #[test]
    fn test_join_and_leave() {
        let roster = MemoryRoster::new();
        roster.create_room(RoomId(1), PlayerId(1));

        assert!(roster.join(RoomId(1), PlayerId(2)));
        assert!(!roster.join(RoomId(1), PlayerId(2)));
        assert!(!roster.join(RoomId(9), PlayerId(2)));
        assert_eq!(roster.members(RoomId(1)), vec![PlayerId(1), PlayerId(2)]);

        assert!(roster.leave(RoomId(1), PlayerId(1)));
        assert!(!roster.leave(RoomId(1), PlayerId(1)));
        assert!(!roster.is_member(RoomId(1), PlayerId(1)));
        assert!(roster.is_member(RoomId(1), PlayerId(2)));
    }

    #[test]
    fn test_unknown_room_reads_are_empty() {
        let roster = MemoryRoster::new();
        assert!(roster.members(RoomId(5)).is_empty());
        assert!(roster.cards(RoomId(5)).is_empty());
        assert_eq!(roster.room_status(RoomId(5)), None);
    }

    #[test]
    fn test_status_and_cards_round_trip() {
        let roster = MemoryRoster::new();
        roster.create_room(RoomId(1), PlayerId(1));
        roster.add_player(PlayerId(1), "alice");
        roster.set_cards(RoomId(1), vec![CardRecord::new(CardId(1), "cat")]);
        roster.set_room_status(RoomId(1), RoomStatus::Playing);

        assert_eq!(roster.player_name(PlayerId(1)).as_deref(), Some("alice"));
        assert_eq!(roster.cards(RoomId(1)).len(), 1);
        assert_eq!(roster.room_status(RoomId(1)), Some(RoomStatus::Playing));
    }
}
