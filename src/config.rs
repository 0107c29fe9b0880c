//! Delivery configuration
//!
//! Timeouts here are defensive bounds on the platform round trips, not part
//! of the delivery contract; the defaults suit an interactive unlock.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Tunable bounds for a delivery attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliveryConfig {
    /// How long to scan for a matching peripheral before giving up
    pub scan_timeout_secs: u64,
    /// Interval between peripheral-list polls while scanning
    pub scan_poll_ms: u64,
    /// Upper bound for each GATT round trip (connect, discovery, write)
    pub operation_timeout_secs: u64,
    /// Request a write acknowledgement from the peripheral
    pub write_with_response: bool,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            scan_timeout_secs: 10,
            scan_poll_ms: 300,
            operation_timeout_secs: 15,
            write_with_response: true,
        }
    }
}

impl DeliveryConfig {
    pub fn scan_timeout(&self) -> Duration {
        Duration::from_secs(self.scan_timeout_secs)
    }

    pub fn scan_poll(&self) -> Duration {
        Duration::from_millis(self.scan_poll_ms.max(1))
    }

    pub fn operation_timeout(&self) -> Duration {
        Duration::from_secs(self.operation_timeout_secs)
    }

    /// Budget for the selection step: the scan deadline plus one round trip
    pub fn selection_budget(&self) -> Duration {
        self.scan_timeout() + self.operation_timeout()
    }

    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }
}
