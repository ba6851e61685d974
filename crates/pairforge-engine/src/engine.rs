//! Engine: the entry points the surrounding application calls.

use std::sync::Arc;

use pairforge_protocol::{CardId, GameEvent, PlayerId, Recipient, RoomId, RoomStatus};
use pairforge_session::{BoardView, Deck, FlipOutcome, GameError, GameSession, TurnSequencer};
use tracing::{debug, info};

use crate::actor::spawn_session;
use crate::{EngineConfig, EventSink, Roster, SessionRegistry};

/// What [`Engine::on_member_left`] did to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberLeft {
    /// Other members remain; the round goes on.
    Continuing,
    /// The room emptied and its session was destroyed.
    SessionClosed,
}

/// Runs memory-match rounds for any number of rooms.
///
/// Rooms, players, and cards live behind the [`Roster`]; events leave
/// through the [`EventSink`]. Every rejected request returns its
/// [`GameError`] and also emits `GameEvent::Error` to the requester alone.
pub struct Engine<R: Roster, S: EventSink> {
    roster: Arc<R>,
    sink: Arc<S>,
    registry: SessionRegistry,
    config: EngineConfig,
}

impl<R: Roster, S: EventSink> Clone for Engine<R, S> {
    fn clone(&self) -> Self {
        Self {
            roster: Arc::clone(&self.roster),
            sink: Arc::clone(&self.sink),
            registry: self.registry.clone(),
            config: self.config.clone(),
        }
    }
}

impl<R: Roster, S: EventSink> Engine<R, S> {
    /// An engine with [`EngineConfig::default`]: one-second reveal and
    /// announce delays and a two-player minimum.
    pub fn new(roster: Arc<R>, sink: Arc<S>) -> Self {
        Self::with_config(roster, sink, EngineConfig::default())
    }

    /// An engine with `config`, clamped by [`EngineConfig::validated`].
    pub fn with_config(roster: Arc<R>, sink: Arc<S>, config: EngineConfig) -> Self {
        Self {
            roster,
            sink,
            registry: SessionRegistry::new(),
            config: config.validated(),
        }
    }

    /// Start a round in `room_id`. The first member in roster order
    /// takes the opening turn.
    ///
    /// Fails if a round is already running (`AlreadyActive`), the room is
    /// not waiting, has too few members, or its cards do not pair up.
    pub async fn start_session(&self, room_id: RoomId) -> Result<(), GameError> {
        self.start(room_id, None).await
    }

    /// Start a round at a player's request. The requester must be the
    /// room's creator and takes the opening turn.
    pub async fn start_session_as(&self, room_id: RoomId, requester: PlayerId) -> Result<(), GameError> {
        let result = self.start(room_id, Some(requester)).await;
        self.report(room_id, requester, "start_session", result)
    }

    async fn start(&self, room_id: RoomId, requester: Option<PlayerId>) -> Result<(), GameError> {
        if let Some(player_id) = requester {
            if !self.roster.is_member(room_id, player_id) {
                return Err(GameError::NotAMember(player_id, room_id));
            }
            if self.roster.room_creator(room_id) != Some(player_id) {
                return Err(GameError::NotRoomCreator(player_id, room_id));
            }
        }

        let handle = self
            .registry
            .create_with(room_id, || {
                if self.roster.room_status(room_id) != Some(RoomStatus::Waiting) {
                    return Err(GameError::RoomNotWaiting(room_id));
                }
                let members = self.roster.members(room_id);
                let need = self.config.min_players;
                if members.len() < need {
                    return Err(GameError::NotEnoughPlayers {
                        room_id,
                        have: members.len(),
                        need,
                    });
                }
                let turns = match requester {
                    Some(first) => TurnSequencer::starting_with(members, first)
                        .ok_or(GameError::NotAMember(first, room_id))?,
                    None => TurnSequencer::new(members).ok_or(GameError::NotEnoughPlayers {
                        room_id,
                        have: 0,
                        need,
                    })?,
                };
                let deck = Deck::shuffled(self.roster.cards(room_id))?;
                let game = GameSession::new(room_id, deck, turns);

                self.roster.set_room_status(room_id, RoomStatus::Playing);
                Ok(spawn_session(
                    game,
                    self.config.clone(),
                    Arc::clone(&self.roster),
                    Arc::clone(&self.sink),
                    self.registry.clone(),
                ))
            })
            .await?;

        info!(%room_id, generation = handle.generation(), "room is playing");
        Ok(())
    }

    /// Flip `card_id` in `room_id` on behalf of `player_id`.
    pub async fn flip_card(
        &self,
        room_id: RoomId,
        card_id: CardId,
        player_id: PlayerId,
    ) -> Result<FlipOutcome, GameError> {
        let result = self.flip(room_id, card_id, player_id).await;
        self.report(room_id, player_id, "flip_card", result)
    }

    async fn flip(
        &self,
        room_id: RoomId,
        card_id: CardId,
        player_id: PlayerId,
    ) -> Result<FlipOutcome, GameError> {
        if !self.roster.is_member(room_id, player_id) {
            return Err(GameError::NotAMember(player_id, room_id));
        }
        let handle = self
            .registry
            .get(room_id)
            .await
            .ok_or(GameError::NoActiveGame(room_id))?;
        handle.flip(player_id, card_id).await
    }

    /// Record that `player_id` has left `room_id`.
    ///
    /// Call this after the roster has dropped the player. The turn is not
    /// passed on: if the player held it, the round stalls. Once the room
    /// has no members left the session is destroyed, even when the last
    /// one out joined after the round started and never held a turn.
    ///
    /// Rejections are emitted to the departing player like any other
    /// request; a transport that already closed their connection drops it.
    pub async fn on_member_left(&self, room_id: RoomId, player_id: PlayerId) -> Result<MemberLeft, GameError> {
        let result = self.member_left(room_id, player_id).await;
        self.report(room_id, player_id, "on_member_left", result)
    }

    async fn member_left(&self, room_id: RoomId, player_id: PlayerId) -> Result<MemberLeft, GameError> {
        let handle = self
            .registry
            .get(room_id)
            .await
            .ok_or(GameError::NoActiveGame(room_id))?;
        let recorded = handle.member_left(player_id).await;

        if self.roster.members(room_id).is_empty() {
            if let Err(err) = &recorded {
                debug!(%room_id, %player_id, %err, "last member was not in the round");
            }
            self.destroy_session(room_id).await;
            return Ok(MemberLeft::SessionClosed);
        }
        recorded.map(|()| MemberLeft::Continuing)
    }

    /// Tear down the session of `room_id` and return the room to waiting.
    ///
    /// Once this returns, no delayed task of that session will run.
    /// Returns `false` if the room had no session.
    pub async fn destroy_session(&self, room_id: RoomId) -> bool {
        let roster = &self.roster;
        let removed = self
            .registry
            .remove(room_id, || roster.set_room_status(room_id, RoomStatus::Waiting))
            .await;

        match removed {
            Some(handle) => {
                if !handle.shutdown().await {
                    debug!(%room_id, "session actor had already stopped");
                }
                info!(%room_id, generation = handle.generation(), "session destroyed");
                true
            }
            None => false,
        }
    }

    /// Board view of the room's running round.
    pub async fn snapshot(&self, room_id: RoomId) -> Result<BoardView, GameError> {
        let handle = self
            .registry
            .get(room_id)
            .await
            .ok_or(GameError::NoActiveGame(room_id))?;
        handle.snapshot().await
    }

    /// Whether `room_id` has a registered session.
    pub async fn is_active(&self, room_id: RoomId) -> bool {
        self.registry.contains(room_id).await
    }

    /// Rooms with a running round.
    pub async fn active_rooms(&self) -> Vec<RoomId> {
        self.registry.room_ids().await
    }

    pub fn roster(&self) -> &Arc<R> {
        &self.roster
    }

    pub fn sink(&self) -> &Arc<S> {
        &self.sink
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Send a rejection to the requester only.
    fn report<T>(
        &self,
        room_id: RoomId,
        requester: PlayerId,
        operation: &'static str,
        result: Result<T, GameError>,
    ) -> Result<T, GameError> {
        if let Err(err) = &result {
            debug!(%room_id, %requester, operation, %err, "request rejected");
            self.sink.emit(
                room_id,
                Recipient::Player(requester),
                GameEvent::Error { kind: err.kind() },
            );
        }
        result
    }
}
