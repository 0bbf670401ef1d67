//! Tunables for framing, parsing and trip detection.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An invalid configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration document could not be read.
    #[error("Malformed configuration: {0}.")]
    Json(#[from] serde_json::Error),
    /// The window cannot hold any fixes.
    #[error("Window capacity must be at least one fix.")]
    WindowCapacity,
    /// The movement radius is not a positive distance.
    #[error("Movement radius must be a positive number of metres.")]
    MovementRadius,
    /// The stale interval is zero.
    #[error("Stale interval must be longer than zero.")]
    StaleAfter,
    /// The read buffer is empty.
    #[error("Read buffer must hold at least one byte.")]
    ReadBuffer,
}

/// Tracking configuration.
///
/// Missing keys take their default when deserialized, so a host may supply
/// only the values it overrides:
///
/// ```json
/// { "movement_radius_m": 35.0, "stale_after_secs": 300 }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Fixes collected before each movement decision.
    pub window_capacity: usize,
    /// Distance from the window centroid that counts as movement, in metres.
    pub movement_radius_m: f64,
    /// Time without a parsed fix after which an open trip is closed.
    #[serde(rename = "stale_after_secs", with = "seconds")]
    pub stale_after: Duration,
    /// Reject sentences whose checksum is missing or wrong.
    pub verify_checksum: bool,
    /// Bytes requested from the receiver per read.
    pub read_buffer_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            window_capacity: 20,
            movement_radius_m: 20.0,
            stale_after: Duration::from_secs(120),
            verify_checksum: false,
            read_buffer_size: 1024,
        }
    }
}

impl Config {
    /// Read a configuration from JSON, validating it.
    pub fn from_json(r: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(r)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_window_capacity(self, window_capacity: usize) -> Self {
        Self {
            window_capacity,
            ..self
        }
    }

    pub fn with_movement_radius_m(self, movement_radius_m: f64) -> Self {
        Self {
            movement_radius_m,
            ..self
        }
    }

    pub fn with_stale_after(self, stale_after: Duration) -> Self {
        Self {
            stale_after,
            ..self
        }
    }

    pub fn with_verify_checksum(self, verify_checksum: bool) -> Self {
        Self {
            verify_checksum,
            ..self
        }
    }

    pub fn with_read_buffer_size(self, read_buffer_size: usize) -> Self {
        Self {
            read_buffer_size,
            ..self
        }
    }

    /// Check every value is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_capacity == 0 {
            Err(ConfigError::WindowCapacity)?;
        }

        if !(self.movement_radius_m.is_finite() && self.movement_radius_m > 0.0) {
            Err(ConfigError::MovementRadius)?;
        }

        if self.stale_after.is_zero() {
            Err(ConfigError::StaleAfter)?;
        }

        if self.read_buffer_size == 0 {
            Err(ConfigError::ReadBuffer)?;
        }

        Ok(())
    }
}

/// Durations as whole seconds.
mod seconds {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_secs)
    }
}
