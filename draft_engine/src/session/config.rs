//! Session store configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Upper bound accepted for the exclusive-access timeout.
pub const MAX_LOCK_TIMEOUT_MS: u64 = 60_000;

/// Session store configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// How long a mutation may wait for exclusive access before failing
    /// with `SessionBusy` (default: 2000 ms)
    pub lock_timeout_ms: u64,

    /// Buffered events per broadcast subscriber before events are dropped
    /// (default: 64)
    pub subscriber_capacity: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            lock_timeout_ms: 2_000,
            subscriber_capacity: 64,
        }
    }
}

impl StoreConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.lock_timeout_ms == 0 || self.lock_timeout_ms > MAX_LOCK_TIMEOUT_MS {
            return Err(format!(
                "Lock timeout must be between 1 and {MAX_LOCK_TIMEOUT_MS} ms"
            ));
        }

        if self.subscriber_capacity == 0 {
            return Err("Subscriber capacity must be at least 1".to_string());
        }

        Ok(())
    }

    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }
}
