use std::fmt::Display;
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 15;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Bounded retry with a fixed blocking pause between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self { max_attempts, delay }
    }

    /// No pauses; used where the fetchers are deterministic.
    pub fn immediate(max_attempts: u32) -> Self {
        Self::new(max_attempts, Duration::ZERO)
    }

    /// Calls `op` with the 1-based attempt number until it succeeds or the
    /// attempt budget runs out. Returns `None` once every attempt has failed.
    pub fn run<T, E, F>(&self, label: &str, mut op: F) -> Option<T>
    where
        E: Display,
        F: FnMut(u32) -> Result<T, E>,
    {
        let attempts = self.max_attempts.max(1);
        for attempt in 1..=attempts {
            match op(attempt) {
                Ok(value) => return Some(value),
                Err(e) => {
                    debug!(
                        repo = label,
                        attempt,
                        max_attempts = attempts,
                        error = %e,
                        "attempt failed"
                    );
                    if attempt < attempts && !self.delay.is_zero() {
                        thread::sleep(self.delay);
                    }
                }
            }
        }
        warn!(repo = label, attempts, "giving up after exhausting retry budget");
        None
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY)
    }
}
