//! Card deck model: shuffled positions and per-card visibility.

use std::collections::HashMap;

use pairforge_protocol::{CardId, CardRecord};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::GameError;

// ---------------------------------------------------------------------------
// CardState
// ---------------------------------------------------------------------------

/// Visibility of a card during a round.
///
/// ```text
/// Hidden → Revealed → Matched
///             │
///             └──→ Hidden   (mismatch, after the reveal delay)
/// ```
///
/// `Matched` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardState {
    Hidden,
    Revealed,
    Matched,
}

impl CardState {
    /// Returns `true` if moving to `target` is a legal transition.
    pub fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Hidden, Self::Revealed)
                | (Self::Revealed, Self::Matched)
                | (Self::Revealed, Self::Hidden)
        )
    }
}

// ---------------------------------------------------------------------------
// Card
// ---------------------------------------------------------------------------

/// A card's working copy for one round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    id: CardId,
    matching_key: String,
    position: u32,
    state: CardState,
}

impl Card {
    pub fn id(&self) -> CardId {
        self.id
    }

    pub fn matching_key(&self) -> &str {
        &self.matching_key
    }

    /// 1-based board position, fixed for the round.
    pub fn position(&self) -> u32 {
        self.position
    }

    pub fn state(&self) -> CardState {
        self.state
    }

    pub fn is_hidden(&self) -> bool {
        self.state == CardState::Hidden
    }

    fn transition(&mut self, target: CardState) -> bool {
        if self.state.can_transition_to(target) {
            self.state = target;
            true
        } else {
            false
        }
    }
}

// ---------------------------------------------------------------------------
// Deck
// ---------------------------------------------------------------------------

/// All cards of a round, ordered by position.
///
/// Built once at session start and never reshuffled. Only the visibility
/// state of each card changes afterwards.
#[derive(Debug, Clone)]
pub struct Deck {
    cards: Vec<Card>,
    index: HashMap<CardId, usize>,
}

impl Deck {
    /// Shuffle `records` with the thread-local RNG and assign positions.
    pub fn shuffled(records: Vec<CardRecord>) -> Result<Self, GameError> {
        Self::shuffled_with(records, &mut rand::rng())
    }

    /// Shuffle with a caller-supplied RNG.
    pub fn shuffled_with<R: Rng + ?Sized>(
        mut records: Vec<CardRecord>,
        rng: &mut R,
    ) -> Result<Self, GameError> {
        records.shuffle(rng);
        Self::in_order(records)
    }

    /// Assign positions 1..N in the order given, without shuffling.
    ///
    /// Validates that the deck is non-empty, card ids are unique and every
    /// matching key occurs exactly twice.
    pub fn in_order(records: Vec<CardRecord>) -> Result<Self, GameError> {
        if records.is_empty() {
            return Err(GameError::InvalidDeck("room has no cards".into()));
        }

        let mut key_counts: HashMap<&str, usize> = HashMap::new();
        for record in &records {
            *key_counts.entry(record.matching_key.as_str()).or_default() += 1;
        }
        if let Some((key, count)) = key_counts.iter().find(|(_, count)| **count != 2) {
            return Err(GameError::InvalidDeck(format!(
                "matching key {key:?} appears {count} times, expected 2"
            )));
        }

        let mut index = HashMap::with_capacity(records.len());
        let mut cards = Vec::with_capacity(records.len());
        for (i, record) in records.into_iter().enumerate() {
            if index.insert(record.card_id, i).is_some() {
                return Err(GameError::InvalidDeck(format!(
                    "card {} appears more than once",
                    record.card_id
                )));
            }
            cards.push(Card {
                id: record.card_id,
                matching_key: record.matching_key,
                position: (i + 1) as u32,
                state: CardState::Hidden,
            });
        }

        Ok(Self { cards, index })
    }

    pub fn get(&self, id: CardId) -> Option<&Card> {
        self.index.get(&id).map(|&i| &self.cards[i])
    }

    /// Cards in position order.
    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn pair_count(&self) -> usize {
        self.cards.len() / 2
    }

    pub fn matched_pairs(&self) -> usize {
        self.cards
            .iter()
            .filter(|c| c.state == CardState::Matched)
            .count()
            / 2
    }

    pub fn all_matched(&self) -> bool {
        self.cards.iter().all(|c| c.state == CardState::Matched)
    }

    /// `true` if both cards exist and share a matching key.
    pub fn is_pair(&self, a: CardId, b: CardId) -> bool {
        match (self.get(a), self.get(b)) {
            (Some(a), Some(b)) => a.id != b.id && a.matching_key == b.matching_key,
            _ => false,
        }
    }

    /// Move a card to `target`. Returns `false` (and changes nothing) for
    /// unknown cards or illegal transitions.
    pub(crate) fn set_state(&mut self, id: CardId, target: CardState) -> bool {
        match self.index.get(&id) {
            Some(&i) => self.cards[i].transition(target),
            None => false,
        }
    }
}
