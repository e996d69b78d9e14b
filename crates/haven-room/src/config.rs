//! Room registry configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Timeouts and sizing for the room registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomConfig {
    /// A room with no traffic for this long is closed by the sweep.
    #[serde(with = "secs")]
    pub inactivity_timeout: Duration,

    /// How often the sweep runs.
    #[serde(with = "secs")]
    pub sweep_interval: Duration,

    /// Capacity of each room actor's command channel.
    pub channel_size: usize,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            inactivity_timeout: Duration::from_secs(30 * 60),
            sweep_interval: Duration::from_secs(60),
            channel_size: 64,
        }
    }
}

impl RoomConfig {
    /// Replaces zero values with the defaults; a zero interval would make
    /// `tokio::time::interval` panic.
    pub fn validated(mut self) -> Self {
        let defaults = Self::default();
        if self.sweep_interval.is_zero() {
            tracing::warn!("sweep_interval is zero, using default");
            self.sweep_interval = defaults.sweep_interval;
        }
        if self.inactivity_timeout.is_zero() {
            tracing::warn!("inactivity_timeout is zero, using default");
            self.inactivity_timeout = defaults.inactivity_timeout;
        }
        if self.channel_size == 0 {
            tracing::warn!("channel_size is zero, using default");
            self.channel_size = defaults.channel_size;
        }
        self
    }
}

/// Durations as whole seconds in config files.
pub mod secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_config_default() {
        let config = RoomConfig::default();
        assert_eq!(config.inactivity_timeout, Duration::from_secs(1800));
        assert_eq!(config.sweep_interval, Duration::from_secs(60));
        assert_eq!(config.channel_size, 64);
    }

    #[test]
    fn test_validated_replaces_zeroes() {
        let config = RoomConfig {
            sweep_interval: Duration::ZERO,
            channel_size: 0,
            ..RoomConfig::default()
        }
        .validated();
        assert_eq!(config, RoomConfig::default());
    }

    #[test]
    fn test_durations_read_as_seconds() {
        let config: RoomConfig =
            serde_json::from_str(r#"{"inactivity_timeout": 90}"#).unwrap();
        assert_eq!(config.inactivity_timeout, Duration::from_secs(90));
        assert_eq!(config.sweep_interval, Duration::from_secs(60));
    }
}
