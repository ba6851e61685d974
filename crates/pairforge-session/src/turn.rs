//! Player rotation for a round.

use pairforge_protocol::PlayerId;

/// Fixed turn order plus the player currently allowed to flip.
///
/// The order is a snapshot of room membership taken when the round
/// starts. It never changes during the round, and the current player is
/// always a member of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnSequencer {
    order: Vec<PlayerId>,
    current: usize,
}

impl TurnSequencer {
    /// Rotation starting with the first player in `order`.
    ///
    /// Duplicate ids are dropped, keeping the first occurrence. Returns
    /// `None` if no players remain.
    pub fn new(order: Vec<PlayerId>) -> Option<Self> {
        let mut unique = Vec::with_capacity(order.len());
        for player in order {
            if !unique.contains(&player) {
                unique.push(player);
            }
        }
        if unique.is_empty() {
            return None;
        }
        Some(Self {
            order: unique,
            current: 0,
        })
    }

    /// Rotation where `first` takes the opening turn. Returns `None` if
    /// `first` is not in `order`.
    pub fn starting_with(order: Vec<PlayerId>, first: PlayerId) -> Option<Self> {
        let mut seq = Self::new(order)?;
        seq.current = seq.order.iter().position(|p| *p == first)?;
        Some(seq)
    }

    /// The player whose flips are authorized.
    pub fn current(&self) -> PlayerId {
        self.order[self.current]
    }

    pub fn order(&self) -> &[PlayerId] {
        &self.order
    }

    pub fn contains(&self, player: PlayerId) -> bool {
        self.order.contains(&player)
    }

    /// Hand the turn to the player after `after`, wrapping around.
    ///
    /// If `after` is not in the rotation the turn advances from the
    /// current player instead.
    pub fn advance_from(&mut self, after: PlayerId) -> PlayerId {
        let from = self
            .order
            .iter()
            .position(|p| *p == after)
            .unwrap_or(self.current);
        self.current = (from + 1) % self.order.len();
        self.current()
    }
}
