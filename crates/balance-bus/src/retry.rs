//! Startup connection with bounded exponential backoff.

use std::time::Duration;

use balance_errors::ConnectionError;
use tracing::{info, warn};

use crate::MessageBus;

/// How hard to try before declaring the broker unreachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Zero is treated as one.
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(8),
        }
    }
}

impl RetryPolicy {
    /// Backoff to wait after the given failed attempt (1-based).
    pub fn backoff_after(&self, attempt: u32) -> Duration {
        let shift = attempt.saturating_sub(1).min(16);
        self.initial_backoff
            .saturating_mul(1u32 << shift)
            .min(self.max_backoff)
    }
}

/// Connect, retrying retryable failures with exponential backoff.
///
/// Returns the number of attempts it took.
///
/// # Errors
///
/// Returns the underlying error when it is not retryable, or
/// [`ConnectionError::RetriesExhausted`] once every attempt has failed.
pub async fn connect_with_backoff(
    bus: &dyn MessageBus,
    policy: RetryPolicy,
) -> Result<u32, ConnectionError> {
    let max_attempts = policy.max_attempts.max(1);

    for attempt in 1..=max_attempts {
        match bus.connect().await {
            Ok(()) => {
                info!(broker = bus.broker(), attempt, "Connected to message bus");
                return Ok(attempt);
            }
            Err(e) if !e.is_retryable() => return Err(e),
            Err(e) => {
                if attempt == max_attempts {
                    warn!(broker = bus.broker(), attempt, error = %e, "Final connection attempt failed");
                    break;
                }
                let backoff = policy.backoff_after(attempt);
                warn!(
                    broker = bus.broker(),
                    attempt,
                    backoff_ms = u64::try_from(backoff.as_millis()).unwrap_or(u64::MAX),
                    error = %e,
                    "Connection attempt failed, retrying"
                );
                tokio::time::sleep(backoff).await;
            }
        }
    }

    Err(ConnectionError::retries_exhausted(bus.broker(), max_attempts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LoopbackBus;

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = RetryPolicy {
            max_attempts: 10,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_millis(500),
        };
        assert_eq!(policy.backoff_after(1), Duration::from_millis(100));
        assert_eq!(policy.backoff_after(2), Duration::from_millis(200));
        assert_eq!(policy.backoff_after(3), Duration::from_millis(400));
        assert_eq!(policy.backoff_after(4), Duration::from_millis(500));
        assert_eq!(policy.backoff_after(40), Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_connect_succeeds_after_transient_failures() -> Result<(), ConnectionError> {
        let bus = LoopbackBus::new();
        bus.fail_next_connects(2);

        let attempts = connect_with_backoff(&bus, RetryPolicy::default()).await?;

        assert_eq!(attempts, 3);
        assert!(bus.is_connected());
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_connect_gives_up() {
        let bus = LoopbackBus::new();
        bus.set_online(false);
        let policy = RetryPolicy {
            max_attempts: 3,
            ..RetryPolicy::default()
        };

        let result = connect_with_backoff(&bus, policy).await;

        assert!(matches!(
            result,
            Err(ConnectionError::RetriesExhausted { attempts: 3, .. })
        ));
        assert!(!bus.is_connected());
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_attempts_still_tries_once() -> Result<(), ConnectionError> {
        let bus = LoopbackBus::new();
        let policy = RetryPolicy {
            max_attempts: 0,
            ..RetryPolicy::default()
        };
        assert_eq!(connect_with_backoff(&bus, policy).await?, 1);
        Ok(())
    }
}
