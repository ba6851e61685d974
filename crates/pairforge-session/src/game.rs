//! The flip-resolution state machine for one round.

use std::collections::{BTreeMap, BTreeSet};

use pairforge_protocol::{CardId, GameEvent, PlayerId, RankingEntry, Recipient, RoomId};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{CardState, Deck, GameError, StaleTask, TurnSequencer};

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// Where a round is in its turn cycle.
///
/// ```text
/// AwaitingFirstFlip → AwaitingSecondFlip ─┬─(match)────→ AwaitingFirstFlip (same player)
///                                         ├─(mismatch)─→ PendingReveal → AwaitingFirstFlip (next player)
///                                         └─(last pair)→ Completed → Closed
/// ```
///
/// Pair resolution happens inside the second flip, so it never shows up
/// as a phase of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    AwaitingFirstFlip,
    AwaitingSecondFlip,
    /// A mismatched pair is face up, waiting for the hide delay.
    PendingReveal,
    /// Every pair is matched; the game-over announcement is scheduled.
    Completed,
    /// The ranking was announced. The session is about to be dropped.
    Closed,
}

impl Phase {
    /// Returns `true` once the last pair has been matched.
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Completed | Self::Closed)
    }
}

// ---------------------------------------------------------------------------
// Flip results
// ---------------------------------------------------------------------------

/// Deferred work a flip asks the owner to schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowUp {
    /// Turn a mismatched pair face down and pass the turn on.
    HideAndAdvance {
        card1: CardId,
        card2: CardId,
        player: PlayerId,
    },
    /// Announce the final ranking and end the round.
    AnnounceGameOver,
}

/// What an accepted flip did to the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlipOutcome {
    /// First card of the pair is face up.
    Revealed,
    /// The pair matched; the same player flips again.
    Matched,
    /// The pair did not match; it will be hidden after a delay.
    Mismatched,
    /// The pair matched and it was the last one.
    Completed,
}

/// Result of an accepted flip: what to emit now, and what to schedule.
#[derive(Debug, Clone, PartialEq)]
pub struct FlipStep {
    pub outcome: FlipOutcome,
    pub events: Vec<(Recipient, GameEvent)>,
    pub follow_up: Option<FollowUp>,
}

// ---------------------------------------------------------------------------
// Board snapshot
// ---------------------------------------------------------------------------

/// Public view of a card. The matching key is only present once the card
/// is matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardView {
    pub card_id: CardId,
    pub position: u32,
    pub state: CardState,
    pub matching_key: Option<String>,
}

/// Public view of a round, suitable for rendering a board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardView {
    pub room_id: RoomId,
    pub phase: Phase,
    pub current_player_id: PlayerId,
    pub turn_order: Vec<PlayerId>,
    pub scores: BTreeMap<PlayerId, u32>,
    pub departed: Vec<PlayerId>,
    /// Ordered by position.
    pub cards: Vec<CardView>,
}

// ---------------------------------------------------------------------------
// GameSession
// ---------------------------------------------------------------------------

/// One round of play in one room.
///
/// Invariants held between calls:
/// - `flipped` holds at most two cards, all `Revealed`.
/// - scores only ever grow, and their sum equals the matched pair count.
/// - the current player is always in the turn order.
#[derive(Debug, Clone)]
pub struct GameSession {
    room_id: RoomId,
    deck: Deck,
    turns: TurnSequencer,
    flipped: Vec<CardId>,
    scores: BTreeMap<PlayerId, u32>,
    phase: Phase,
    departed: BTreeSet<PlayerId>,
}

impl GameSession {
    pub fn new(room_id: RoomId, deck: Deck, turns: TurnSequencer) -> Self {
        let scores = turns.order().iter().map(|p| (*p, 0)).collect();
        Self {
            room_id,
            deck,
            turns,
            flipped: Vec::with_capacity(2),
            scores,
            phase: Phase::AwaitingFirstFlip,
            departed: BTreeSet::new(),
        }
    }

    /// The `GameStarted` announcement for this round.
    pub fn started_event(&self) -> GameEvent {
        GameEvent::GameStarted {
            room_id: self.room_id,
            turn_order: self.turns.order().to_vec(),
            current_player_id: self.turns.current(),
        }
    }

    /// Turn `card_id` face up on behalf of `player`.
    ///
    /// Checks, in order: round not finished, `player` holds the turn, the
    /// card exists, the card is hidden, and the player's turn-step is not
    /// spent on a pending mismatch. A rejected flip changes nothing.
    pub fn flip(&mut self, player: PlayerId, card_id: CardId) -> Result<FlipStep, GameError> {
        if self.phase.is_finished() {
            return Err(GameError::GameCompleted(self.room_id));
        }
        if player != self.turns.current() {
            return Err(GameError::NotYourTurn(player));
        }
        let card = self
            .deck
            .get(card_id)
            .ok_or(GameError::UnknownCard(card_id))?;
        if !card.is_hidden() {
            return Err(GameError::AlreadyRevealed(card_id));
        }
        if self.phase == Phase::PendingReveal {
            return Err(GameError::NotYourTurn(player));
        }
        let position = card.position();

        self.deck.set_state(card_id, CardState::Revealed);
        self.flipped.push(card_id);
        debug!(room_id = %self.room_id, %player, %card_id, position, "card flipped");

        let mut events = vec![(
            Recipient::All,
            GameEvent::CardFlipped {
                card_id,
                position,
                player_id: player,
            },
        )];

        if self.flipped.len() < 2 {
            self.phase = Phase::AwaitingSecondFlip;
            return Ok(FlipStep {
                outcome: FlipOutcome::Revealed,
                events,
                follow_up: None,
            });
        }

        let follow_up = self.resolve_pair(player, &mut events);
        let outcome = match follow_up {
            None => FlipOutcome::Matched,
            Some(FollowUp::HideAndAdvance { .. }) => FlipOutcome::Mismatched,
            Some(FollowUp::AnnounceGameOver) => FlipOutcome::Completed,
        };
        Ok(FlipStep {
            outcome,
            events,
            follow_up,
        })
    }

    fn resolve_pair(
        &mut self,
        player: PlayerId,
        events: &mut Vec<(Recipient, GameEvent)>,
    ) -> Option<FollowUp> {
        let (card1, card2) = (self.flipped[0], self.flipped[1]);

        if !self.deck.is_pair(card1, card2) {
            // The pair stays face up until the hide task runs.
            self.phase = Phase::PendingReveal;
            debug!(room_id = %self.room_id, %player, %card1, %card2, "mismatch");
            return Some(FollowUp::HideAndAdvance {
                card1,
                card2,
                player,
            });
        }

        self.deck.set_state(card1, CardState::Matched);
        self.deck.set_state(card2, CardState::Matched);
        *self.scores.entry(player).or_insert(0) += 1;
        self.flipped.clear();
        debug!(room_id = %self.room_id, %player, %card1, %card2, "match");

        events.push((
            Recipient::All,
            GameEvent::MatchResult {
                card1_id: card1,
                card2_id: card2,
                matched: true,
                scores: self.scores.clone(),
            },
        ));

        if self.deck.all_matched() {
            self.phase = Phase::Completed;
            Some(FollowUp::AnnounceGameOver)
        } else {
            self.phase = Phase::AwaitingFirstFlip;
            None
        }
    }

    /// Turn a mismatched pair face down and pass the turn after `player`.
    ///
    /// Re-checks that the session still holds exactly the pair the task
    /// captured; otherwise nothing changes.
    pub fn hide_and_advance(
        &mut self,
        card1: CardId,
        card2: CardId,
        player: PlayerId,
    ) -> Result<Vec<(Recipient, GameEvent)>, StaleTask> {
        if self.phase != Phase::PendingReveal {
            return Err(StaleTask("session is not holding a mismatched pair"));
        }
        if self.flipped.as_slice() != [card1, card2] {
            return Err(StaleTask("flip buffer does not hold the captured pair"));
        }
        if self.turns.current() != player {
            return Err(StaleTask("turn moved while the pair was showing"));
        }
        let both_revealed = [card1, card2].iter().all(|id| {
            self.deck
                .get(*id)
                .is_some_and(|c| c.state() == CardState::Revealed)
        });
        if !both_revealed {
            return Err(StaleTask("captured cards are no longer face up"));
        }

        self.deck.set_state(card1, CardState::Hidden);
        self.deck.set_state(card2, CardState::Hidden);
        self.flipped.clear();
        let next = self.turns.advance_from(player);
        self.phase = Phase::AwaitingFirstFlip;
        debug!(room_id = %self.room_id, %card1, %card2, next = %next, "pair hidden, turn passed");

        Ok(vec![
            (
                Recipient::All,
                GameEvent::CardsReset {
                    card1_id: card1,
                    card2_id: card2,
                },
            ),
            (
                Recipient::All,
                GameEvent::TurnChanged {
                    current_player_id: next,
                },
            ),
        ])
    }

    /// Scores ordered best first; ties go to the lower player id.
    pub fn ranking(&self) -> Vec<(PlayerId, u32)> {
        let mut ranking: Vec<(PlayerId, u32)> =
            self.scores.iter().map(|(p, s)| (*p, *s)).collect();
        ranking.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        ranking
    }

    /// Build the `GameOver` event and close the round.
    ///
    /// `resolve_name` maps ids to display names; unresolved players are
    /// listed under their id.
    pub fn close<F>(&mut self, resolve_name: F) -> Result<GameEvent, StaleTask>
    where
        F: Fn(PlayerId) -> Option<String>,
    {
        if self.phase != Phase::Completed {
            return Err(StaleTask("game-over announced before every pair matched"));
        }
        let ranking = self
            .ranking()
            .into_iter()
            .map(|(player_id, score)| RankingEntry {
                player_id,
                player_name: resolve_name(player_id).unwrap_or_else(|| player_id.to_string()),
                score,
            })
            .collect();
        self.phase = Phase::Closed;
        Ok(GameEvent::GameOver { ranking })
    }

    /// Record that `player` left the room.
    ///
    /// The turn is not reassigned: if the departed player held it, the
    /// round stalls until the room empties.
    pub fn member_left(&mut self, player: PlayerId) -> Result<(), GameError> {
        if !self.turns.contains(player) {
            return Err(GameError::NotAMember(player, self.room_id));
        }
        self.departed.insert(player);
        Ok(())
    }

    /// A read-only copy of the board.
    ///
    /// Matching keys are included only for matched cards, so a snapshot
    /// reveals nothing a player could not already see on the table.
    pub fn snapshot(&self) -> BoardView {
        BoardView {
            room_id: self.room_id,
            phase: self.phase,
            current_player_id: self.turns.current(),
            turn_order: self.turns.order().to_vec(),
            scores: self.scores.clone(),
            departed: self.departed.iter().copied().collect(),
            cards: self
                .deck
                .iter()
                .map(|c| CardView {
                    card_id: c.id(),
                    position: c.position(),
                    state: c.state(),
                    matching_key: (c.state() == CardState::Matched)
                        .then(|| c.matching_key().to_string()),
                })
                .collect(),
        }
    }

    pub fn room_id(&self) -> RoomId {
        self.room_id
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn current_player(&self) -> PlayerId {
        self.turns.current()
    }

    pub fn turn_order(&self) -> &[PlayerId] {
        self.turns.order()
    }

    pub fn flipped(&self) -> &[CardId] {
        &self.flipped
    }

    pub fn scores(&self) -> &BTreeMap<PlayerId, u32> {
        &self.scores
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn departed(&self) -> &BTreeSet<PlayerId> {
        &self.departed
    }
}
