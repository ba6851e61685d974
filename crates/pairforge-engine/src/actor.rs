//! Session actor: an isolated Tokio task that owns one room's round.
//!
//! The actor is the room's lock. Commands from the engine and wake-ups
//! from its delay timer are handled one at a time by the same loop, so a
//! flip, a member leaving, hiding a mismatched pair, and the game-over
//! announcement can never interleave.

use std::ops::ControlFlow;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use pairforge_protocol::{CardId, PlayerId, Recipient, RoomId, RoomStatus};
use pairforge_session::{BoardView, FlipOutcome, FollowUp, GameError, GameSession, StaleTask};
use pairforge_timer::DelayTimer;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

use crate::{EngineConfig, EventSink, Roster, SessionRegistry};

/// Distinguishes successive sessions of the same room.
static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

/// Commands sent to a session actor. Each carries a reply channel.
pub(crate) enum SessionCommand {
    Flip {
        player_id: PlayerId,
        card_id: CardId,
        reply: oneshot::Sender<Result<FlipOutcome, GameError>>,
    },
    MemberLeft {
        player_id: PlayerId,
        reply: oneshot::Sender<Result<(), GameError>>,
    },
    Snapshot {
        reply: oneshot::Sender<BoardView>,
    },
    /// Stop the actor, dropping any pending delayed task. The ack is sent
    /// after the timer is disarmed.
    Shutdown { ack: oneshot::Sender<()> },
}

/// Handle to a running session actor.
///
/// Cheap to clone. If the actor has already stopped, every request fails
/// with [`GameError::NoActiveGame`].
#[derive(Debug, Clone)]
pub struct SessionHandle {
    room_id: RoomId,
    generation: u64,
    sender: mpsc::Sender<SessionCommand>,
}

impl SessionHandle {
    pub fn room_id(&self) -> RoomId {
        self.room_id
    }

    /// Unique per session, increasing across the process.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether the actor has stopped.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Flip a card on behalf of `player_id`.
    pub async fn flip(&self, player_id: PlayerId, card_id: CardId) -> Result<FlipOutcome, GameError> {
        self.request(|reply| SessionCommand::Flip {
            player_id,
            card_id,
            reply,
        })
        .await?
    }

    /// Tell the session that `player_id` left the room.
    pub async fn member_left(&self, player_id: PlayerId) -> Result<(), GameError> {
        self.request(|reply| SessionCommand::MemberLeft { player_id, reply })
            .await?
    }

    /// The current board.
    pub async fn snapshot(&self) -> Result<BoardView, GameError> {
        self.request(|reply| SessionCommand::Snapshot { reply }).await
    }

    /// Stop the actor and wait until it has let go of its timer.
    ///
    /// Returns `false` if the actor had already stopped.
    pub async fn shutdown(&self) -> bool {
        self.request(|ack| SessionCommand::Shutdown { ack })
            .await
            .is_ok()
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> SessionCommand,
    ) -> Result<T, GameError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(command(reply_tx))
            .await
            .map_err(|_| GameError::NoActiveGame(self.room_id))?;
        reply_rx
            .await
            .map_err(|_| GameError::NoActiveGame(self.room_id))
    }
}

/// The state behind a [`SessionHandle`]. Runs inside its own task.
struct SessionActor<R, S> {
    room_id: RoomId,
    generation: u64,
    game: GameSession,
    timer: DelayTimer<FollowUp>,
    config: EngineConfig,
    roster: Arc<R>,
    sink: Arc<S>,
    registry: SessionRegistry,
    receiver: mpsc::Receiver<SessionCommand>,
}

impl<R: Roster, S: EventSink> SessionActor<R, S> {
    async fn run(mut self) {
        info!(
            room_id = %self.room_id,
            generation = self.generation,
            players = self.game.turn_order().len(),
            cards = self.game.deck().len(),
            "session started"
        );

        loop {
            // Commands win ties, so a queued shutdown beats a due timer.
            let flow = tokio::select! {
                biased;
                cmd = self.receiver.recv() => match cmd {
                    Some(cmd) => self.handle_command(cmd).await,
                    None => ControlFlow::Break(()),
                },
                task = self.timer.wait_for_due() => self.run_follow_up(task).await,
            };
            if flow.is_break() {
                break;
            }
        }

        info!(room_id = %self.room_id, generation = self.generation, "session stopped");
    }

    async fn handle_command(&mut self, cmd: SessionCommand) -> ControlFlow<()> {
        match cmd {
            SessionCommand::Flip {
                player_id,
                card_id,
                reply,
            } => {
                let result = self.while_owner(|actor| actor.flip(player_id, card_id)).await;
                let _ = reply.send(result);
            }
            SessionCommand::MemberLeft { player_id, reply } => {
                let result = self
                    .while_owner(|actor| actor.member_left(player_id))
                    .await;
                let _ = reply.send(result);
            }
            SessionCommand::Snapshot { reply } => {
                let _ = reply.send(self.game.snapshot());
            }
            SessionCommand::Shutdown { ack } => {
                if let Some(task) = self.timer.cancel() {
                    debug!(room_id = %self.room_id, ?task, "dropping pending task");
                }
                let _ = ack.send(());
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }

    /// Apply a player's request only while this session still owns the room.
    ///
    /// `destroy_session` unregisters the session before the actor sees its
    /// `Shutdown`, so commands already queued behind it must not reach the
    /// game. The check and the mutation share one registry critical
    /// section; a removal or a new session for the room cannot slip in
    /// between them.
    async fn while_owner<T>(
        &mut self,
        apply: impl FnOnce(&mut Self) -> Result<T, GameError>,
    ) -> Result<T, GameError> {
        let room_id = self.room_id;
        let generation = self.generation;
        let registry = self.registry.clone();
        match registry.if_current(room_id, generation, || apply(self)).await {
            Some(result) => result,
            None => {
                debug!(%room_id, generation, "session no longer registered, request refused");
                Err(GameError::NoActiveGame(room_id))
            }
        }
    }

    fn member_left(&mut self, player_id: PlayerId) -> Result<(), GameError> {
        self.game.member_left(player_id)?;
        info!(
            room_id = %self.room_id,
            %player_id,
            holds_turn = self.game.current_player() == player_id,
            "member left session"
        );
        Ok(())
    }

    fn flip(&mut self, player_id: PlayerId, card_id: CardId) -> Result<FlipOutcome, GameError> {
        let step = self.game.flip(player_id, card_id)?;
        for (recipient, event) in step.events {
            self.sink.emit(self.room_id, recipient, event);
        }
        if let Some(task) = step.follow_up {
            self.schedule(task);
        }
        Ok(step.outcome)
    }

    fn schedule(&mut self, task: FollowUp) {
        let delay = match task {
            FollowUp::HideAndAdvance { .. } => self.config.reveal_delay,
            FollowUp::AnnounceGameOver => self.config.announce_delay,
        };
        if let Err(task) = self.timer.arm(task, delay) {
            error!(room_id = %self.room_id, ?task, "follow-up dropped, another is pending");
        }
    }

    /// Run a due task, but only if this session still owns the room.
    async fn run_follow_up(&mut self, task: FollowUp) -> ControlFlow<()> {
        let room_id = self.room_id;
        let registry = self.registry.clone();

        match task {
            FollowUp::HideAndAdvance {
                card1,
                card2,
                player,
            } => {
                let applied = registry
                    .if_current(room_id, self.generation, || {
                        let events = self.game.hide_and_advance(card1, card2, player)?;
                        for (recipient, event) in events {
                            self.sink.emit(room_id, recipient, event);
                        }
                        Ok::<(), StaleTask>(())
                    })
                    .await;
                match applied {
                    Some(Ok(())) => ControlFlow::Continue(()),
                    Some(Err(stale)) => {
                        warn!(%room_id, %card1, %card2, %stale, "hide task skipped");
                        ControlFlow::Continue(())
                    }
                    None => {
                        debug!(%room_id, "session no longer registered, hide task dropped");
                        ControlFlow::Break(())
                    }
                }
            }
            FollowUp::AnnounceGameOver => {
                let game = &mut self.game;
                let roster = &self.roster;
                let sink = &self.sink;
                let released = registry
                    .remove_generation(room_id, self.generation, || {
                        match game.close(|player_id| roster.player_name(player_id)) {
                            Ok(event) => sink.emit(room_id, Recipient::All, event),
                            Err(stale) => warn!(%room_id, %stale, "game-over skipped"),
                        }
                        roster.set_room_status(room_id, RoomStatus::Waiting);
                    })
                    .await;
                if released {
                    info!(%room_id, scores = ?self.game.scores(), "game over");
                } else {
                    debug!(%room_id, "session no longer registered, announcement dropped");
                }
                ControlFlow::Break(())
            }
        }
    }
}

/// Spawn the actor for a freshly built round and announce it.
///
/// `GameStarted` is emitted before this returns, so it precedes every
/// other event of the session.
pub(crate) fn spawn_session<R: Roster, S: EventSink>(
    game: GameSession,
    config: EngineConfig,
    roster: Arc<R>,
    sink: Arc<S>,
    registry: SessionRegistry,
) -> SessionHandle {
    let room_id = game.room_id();
    let generation = NEXT_GENERATION.fetch_add(1, Ordering::Relaxed);
    let (tx, rx) = mpsc::channel(config.channel_size);

    sink.emit(room_id, Recipient::All, game.started_event());

    let actor = SessionActor {
        room_id,
        generation,
        game,
        timer: DelayTimer::new(),
        config,
        roster,
        sink,
        registry,
        receiver: rx,
    };
    tokio::spawn(actor.run());

    SessionHandle {
        room_id,
        generation,
        sender: tx,
    }
}

#[cfg(test)]
impl SessionHandle {
    /// A handle with no actor behind it, for registry tests.
    pub(crate) fn detached(room_id: RoomId) -> (Self, mpsc::Receiver<SessionCommand>) {
        let (tx, rx) = mpsc::channel(1);
        let handle = Self {
            room_id,
            generation: NEXT_GENERATION.fetch_add(1, Ordering::Relaxed),
            sender: tx,
        };
        (handle, rx)
    }
}
