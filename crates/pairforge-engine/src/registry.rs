//! Session registry: which rooms have a running session.

use std::collections::HashMap;
use std::sync::Arc;

use pairforge_protocol::RoomId;
use pairforge_session::GameError;
use tokio::sync::Mutex;

use crate::SessionHandle;

/// Maps each playing room to its session actor.
///
/// An entry exists exactly while a room is served by a session. The
/// engine inserts it when a round starts and removes it on destroy. A
/// session that finishes on its own removes itself through
/// [`remove_generation`](Self::remove_generation). Session actors also
/// consult the map through [`if_current`](Self::if_current) before they
/// touch their game, so a session whose entry is gone becomes inert even
/// if commands or timers still reach it.
///
/// This map is the only shared mutable collection in the engine. Every
/// method takes the lock for a short, non-awaiting critical section, and
/// the closures passed to [`create_with`](Self::create_with) and the
/// removal methods run inside that section. That is how a room's status
/// change in the roster stays atomic with its registry entry.
///
/// Cloning is cheap and every clone shares the same map.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<Mutex<HashMap<RoomId, SessionHandle>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle to the running session of `room_id`, if any.
    pub async fn get(&self, room_id: RoomId) -> Option<SessionHandle> {
        self.sessions.lock().await.get(&room_id).cloned()
    }

    /// Whether `room_id` has a registered session.
    pub async fn contains(&self, room_id: RoomId) -> bool {
        self.sessions.lock().await.contains_key(&room_id)
    }

    /// Number of rooms with a registered session.
    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }

    /// Rooms with a running session, in no particular order.
    pub async fn room_ids(&self) -> Vec<RoomId> {
        self.sessions.lock().await.keys().copied().collect()
    }

    /// Register a new session for `room_id`.
    ///
    /// Fails with [`GameError::AlreadyActive`] if the room already has one.
    /// Otherwise `create` runs under the lock; if it returns a handle, the
    /// handle is stored and a clone returned.
    pub async fn create_with<F>(&self, room_id: RoomId, create: F) -> Result<SessionHandle, GameError>
    where
        F: FnOnce() -> Result<SessionHandle, GameError>,
    {
        let mut sessions = self.sessions.lock().await;
        if sessions.contains_key(&room_id) {
            return Err(GameError::AlreadyActive(room_id));
        }
        let handle = create()?;
        sessions.insert(room_id, handle.clone());
        tracing::debug!(%room_id, generation = handle.generation(), "session registered");
        Ok(handle)
    }

    /// Remove whatever session `room_id` has.
    ///
    /// `on_removed` runs under the lock, only if an entry was removed.
    pub async fn remove<F>(&self, room_id: RoomId, on_removed: F) -> Option<SessionHandle>
    where
        F: FnOnce(),
    {
        let mut sessions = self.sessions.lock().await;
        let handle = sessions.remove(&room_id)?;
        on_removed();
        tracing::debug!(%room_id, generation = handle.generation(), "session unregistered");
        Some(handle)
    }

    /// Run `f` under the lock if `room_id` is still served by the session
    /// with `generation`. Returns `None` (and skips `f`) otherwise.
    pub async fn if_current<T, F>(&self, room_id: RoomId, generation: u64, f: F) -> Option<T>
    where
        F: FnOnce() -> T,
    {
        let sessions = self.sessions.lock().await;
        match sessions.get(&room_id) {
            Some(handle) if handle.generation() == generation => Some(f()),
            _ => None,
        }
    }

    /// Remove `room_id`'s entry only if it belongs to `generation`.
    ///
    /// A session ending itself uses this so it can never remove a newer
    /// session started for the same room. `on_removed` runs under the lock.
    pub async fn remove_generation<F>(&self, room_id: RoomId, generation: u64, on_removed: F) -> bool
    where
        F: FnOnce(),
    {
        let mut sessions = self.sessions.lock().await;
        match sessions.get(&room_id) {
            Some(handle) if handle.generation() == generation => {
                sessions.remove(&room_id);
                on_removed();
                tracing::debug!(%room_id, generation, "session released itself");
                true
            }
            _ => false,
        }
    }
}

impl std::fmt::Debug for SessionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRegistry").finish_non_exhaustive()
    }
}
