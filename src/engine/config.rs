use std::time::Duration;

/// Tunables for [`LedgerEngine`](super::LedgerEngine).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Longest wait for exclusive access to an account before the attempt fails as a
    /// store timeout.
    pub lock_timeout: Duration,
    /// Append a `failed` record when a store failure aborts a validated transfer.
    pub record_failed_attempts: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            lock_timeout: Duration::from_secs(5),
            record_failed_attempts: true,
        }
    }
}

impl EngineConfig {
    pub fn with_lock_timeout(mut self, lock_timeout: Duration) -> Self {
        self.lock_timeout = lock_timeout;
        self
    }

    pub fn with_failed_records(mut self, enabled: bool) -> Self {
        self.record_failed_attempts = enabled;
        self
    }
}
