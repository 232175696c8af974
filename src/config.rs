//! System configuration parameters
//!
//! All tunable parameters for the relay firmware.  Values can be overridden
//! via NVS (see [`ConfigPort`](crate::app::ports::ConfigPort)).

use serde::{Deserialize, Serialize};

use log::error;

use crate::app::identity::{DEFAULT_NAMESPACE, MAX_NAME_LEN, NameString, RelayIdentity};
use crate::app::ports::ConfigError;
use crate::pins;

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayConfig {
    // --- Relay ---
    /// NVS namespace holding the relay's persisted state
    pub namespace: NameString,
    /// GPIO driving the relay
    pub pin: i32,

    // --- Timing ---
    /// Control loop interval (milliseconds)
    pub poll_interval_ms: u32,
    /// Task watchdog timeout (milliseconds)
    pub watchdog_timeout_ms: u32,
}

impl Default for RelayConfig {
    fn default() -> Self {
        // An empty namespace is rejected by `validate()` and `identity()`.
        let namespace = NameString::try_from(DEFAULT_NAMESPACE).unwrap_or_else(|()| {
            error!("Config: default namespace does not fit {} bytes", MAX_NAME_LEN);
            NameString::new()
        });

        Self {
            namespace,
            pin: pins::RELAY_GPIO,

            poll_interval_ms: 1000,     // 1 Hz
            watchdog_timeout_ms: 10_000, // 10 s
        }
    }
}

impl RelayConfig {
    /// Range-check every field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0..=pins::MAX_GPIO).contains(&self.pin) {
            return Err(ConfigError::ValidationFailed("pin must be 0–48"));
        }
        if RelayIdentity::with_namespace(&self.namespace, self.pin).is_err() {
            return Err(ConfigError::ValidationFailed(
                "namespace must be 1–15 bytes with room for the schedule key",
            ));
        }
        if !(10..=60_000).contains(&self.poll_interval_ms) {
            return Err(ConfigError::ValidationFailed(
                "poll_interval_ms must be 10–60000",
            ));
        }
        if self.watchdog_timeout_ms <= self.poll_interval_ms {
            return Err(ConfigError::ValidationFailed(
                "watchdog_timeout_ms must exceed poll_interval_ms",
            ));
        }
        Ok(())
    }

    /// Identity of the configured relay.
    pub fn identity(&self) -> crate::error::Result<RelayIdentity> {
        Ok(RelayIdentity::with_namespace(&self.namespace, self.pin)?)
    }
}
