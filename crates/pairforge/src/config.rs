//! Engine configuration loading from a JSON file.

use std::{env, fs, io::ErrorKind, path::Path, path::PathBuf, time::Duration};

use pairforge_engine::EngineConfig;
use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk of the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/pairforge.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "PAIRFORGE_CONFIG_PATH";

/// Load the engine configuration, falling back to defaults when the file
/// is missing or unreadable.
pub fn load_config() -> EngineConfig {
    load_config_from(&resolve_config_path())
}

/// Load the engine configuration from `path`.
pub fn load_config_from(path: &Path) -> EngineConfig {
    match fs::read_to_string(path) {
        Ok(contents) => match parse_config(&contents) {
            Ok(config) => {
                info!(
                    path = %path.display(),
                    reveal_delay_ms = config.reveal_delay.as_millis() as u64,
                    announce_delay_ms = config.announce_delay.as_millis() as u64,
                    min_players = config.min_players,
                    "loaded engine config"
                );
                config
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to parse config; falling back to defaults"
                );
                EngineConfig::default()
            }
        },
        Err(err) if err.kind() == ErrorKind::NotFound => {
            info!(
                path = %path.display(),
                "config file not found; using built-in defaults"
            );
            EngineConfig::default()
        }
        Err(err) => {
            warn!(
                path = %path.display(),
                error = %err,
                "failed to read config; falling back to defaults"
            );
            EngineConfig::default()
        }
    }
}

/// Parse a JSON config document. Missing fields keep their defaults.
pub fn parse_config(contents: &str) -> Result<EngineConfig, serde_json::Error> {
    let raw: RawConfig = serde_json::from_str(contents)?;
    Ok(raw.into())
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
/// JSON representation of the configuration file. Delays are in milliseconds.
struct RawConfig {
    reveal_delay_ms: Option<u64>,
    announce_delay_ms: Option<u64>,
    min_players: Option<usize>,
    channel_size: Option<usize>,
}

impl From<RawConfig> for EngineConfig {
    fn from(value: RawConfig) -> Self {
        let defaults = EngineConfig::default();
        Self {
            reveal_delay: value
                .reveal_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.reveal_delay),
            announce_delay: value
                .announce_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.announce_delay),
            min_players: value.min_players.unwrap_or(defaults.min_players),
            channel_size: value.channel_size.unwrap_or(defaults.channel_size),
        }
        .validated()
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
