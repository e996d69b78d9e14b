//! Server configuration: defaults, an optional JSON file, and environment
//! overrides.

use std::path::Path;
use std::time::Duration;

use haven_room::{RoomConfig, secs};
use haven_session::GameConfig;
use serde::{Deserialize, Serialize};

use crate::HavenError;

/// Path of a JSON config file to load.
pub const CONFIG_ENV: &str = "HAVEN_CONFIG";
/// Overrides `bind`.
pub const BIND_ENV: &str = "HAVEN_BIND";

/// Everything the server needs to start.
///
/// ```json
/// { "bind": "0.0.0.0:8080",
///   "connection_idle_timeout": 1800,
///   "room": { "inactivity_timeout": 1800, "sweep_interval": 60 },
///   "game": { "board_width": 6, "board_height": 8 } }
/// ```
///
/// Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    /// A connection that sends nothing for this long is closed.
    #[serde(with = "secs")]
    pub connection_idle_timeout: Duration,
    pub room: RoomConfig,
    pub game: GameConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".to_string(),
            connection_idle_timeout: Duration::from_secs(30 * 60),
            room: RoomConfig::default(),
            game: GameConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Reads a JSON config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, HavenError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| HavenError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| HavenError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Defaults, then `$HAVEN_CONFIG` if set, then `$HAVEN_BIND` if set.
    pub fn from_env() -> Result<Self, HavenError> {
        let mut config = match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        if let Ok(bind) = std::env::var(BIND_ENV) {
            config.bind = bind;
        }
        Ok(config.validated())
    }

    /// Clamps nested configs and replaces a zero idle timeout.
    pub fn validated(mut self) -> Self {
        if self.connection_idle_timeout.is_zero() {
            tracing::warn!("connection_idle_timeout is zero, using default");
            self.connection_idle_timeout = Self::default().connection_idle_timeout;
        }
        self.room = self.room.validated();
        self.game = self.game.validated();
        self
    }
}
