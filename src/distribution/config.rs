//! Distributor configuration.

use std::time::Duration;

use serde::Deserialize;

/// Default number of records requested per read.
pub const DEFAULT_MAX_READ_COUNT: usize = 50;

/// Default delay before re-polling a drained log, in milliseconds.
pub const DEFAULT_IDLE_POLL_DELAY_MS: u64 = 250;

/// Tuning for a transaction-log distributor.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DistributionConfig {
    /// Maximum records per read window.
    ///
    /// Default: 50.
    pub max_read_count: usize,

    /// Delay before the next read once the log is drained.
    ///
    /// Default: 250 ms. Keeps an idle cursor from busy-polling.
    pub idle_poll_delay_ms: u64,

    /// Emit an end-of-log marker every time a read comes back empty.
    ///
    /// Default: true.
    pub deliver_end_of_log: bool,

    /// Progress reported when the log tail is unknown (zero or negative).
    ///
    /// Default: 0.0.
    pub unknown_tail_progress: f32,
}

impl Default for DistributionConfig {
    fn default() -> Self {
        Self {
            max_read_count: DEFAULT_MAX_READ_COUNT,
            idle_poll_delay_ms: DEFAULT_IDLE_POLL_DELAY_MS,
            deliver_end_of_log: true,
            unknown_tail_progress: 0.0,
        }
    }
}

impl DistributionConfig {
    pub fn idle_poll_delay(&self) -> Duration {
        Duration::from_millis(self.idle_poll_delay_ms)
    }

    pub fn with_max_read_count(mut self, count: usize) -> Self {
        self.max_read_count = count;
        self
    }

    pub fn with_idle_poll_delay(mut self, delay: Duration) -> Self {
        self.idle_poll_delay_ms = delay.as_millis() as u64;
        self
    }

    pub fn with_end_of_log(mut self, deliver: bool) -> Self {
        self.deliver_end_of_log = deliver;
        self
    }
}
