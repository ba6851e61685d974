//! Engine configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Settings shared by every session the engine runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// How long a mismatched pair stays face up before it is hidden and
    /// the turn passes.
    pub reveal_delay: Duration,

    /// Pause between the last match and the game-over announcement.
    pub announce_delay: Duration,

    /// Minimum room members required to start a round.
    pub min_players: usize,

    /// Command channel capacity per session actor.
    pub channel_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            reveal_delay: Duration::from_secs(1),
            announce_delay: Duration::from_secs(1),
            min_players: 2,
            channel_size: 64,
        }
    }
}

impl EngineConfig {
    pub fn with_reveal_delay(mut self, delay: Duration) -> Self {
        self.reveal_delay = delay;
        self
    }

    pub fn with_announce_delay(mut self, delay: Duration) -> Self {
        self.announce_delay = delay;
        self
    }

    pub fn with_min_players(mut self, min_players: usize) -> Self {
        self.min_players = min_players;
        self
    }

    /// Clamp values that would make the engine unusable.
    ///
    /// A round needs at least one player and a channel needs at least one
    /// slot; `min_players` of 0 is raised to 1, `channel_size` of 0 to 1.
    pub fn validated(mut self) -> Self {
        if self.min_players == 0 {
            tracing::warn!("min_players of 0, raising to 1");
            self.min_players = 1;
        }
        if self.channel_size == 0 {
            tracing::warn!("channel_size of 0, raising to 1");
            self.channel_size = 1;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.reveal_delay, Duration::from_secs(1));
        assert_eq!(config.announce_delay, Duration::from_secs(1));
        assert_eq!(config.min_players, 2);
        assert_eq!(config.channel_size, 64);
    }

    #[test]
    fn test_builder_methods() {
        let config = EngineConfig::default()
            .with_reveal_delay(Duration::from_millis(250))
            .with_announce_delay(Duration::from_millis(500))
            .with_min_players(3);
        assert_eq!(config.reveal_delay, Duration::from_millis(250));
        assert_eq!(config.announce_delay, Duration::from_millis(500));
        assert_eq!(config.min_players, 3);
    }

    #[test]
    fn test_validated_clamps_zeroes() {
        let config = EngineConfig {
            min_players: 0,
            channel_size: 0,
            ..EngineConfig::default()
        }
        .validated();
        assert_eq!(config.min_players, 1);
        assert_eq!(config.channel_size, 1);
    }
}
