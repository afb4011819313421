//! Atomic counters for the ingest and publish paths.
//!
//! All counters use `AtomicU64` with `Ordering::Relaxed`. Each counter is
//! independently consistent; a [`CounterSnapshot`] is not an atomic cut
//! across all of them.

use core::sync::atomic::{AtomicU64, Ordering};

/// Counter snapshot returned by [`PipelineCounters::snapshot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CounterSnapshot {
    /// Inbound telemetry messages handed to the ingestor
    pub messages_received: u64,
    /// Inbound messages dropped because they failed to decode
    pub decode_errors: u64,
    /// Samples written into the ring buffer
    pub samples_written: u64,
    /// Gain publishes attempted by the debounced publisher
    pub publish_attempts: u64,
    /// Gain publishes confirmed by the bus
    pub publishes_succeeded: u64,
    /// Gain publishes that failed and were left pending for retry
    pub publish_failures: u64,
}

impl CounterSnapshot {
    /// Messages that made it into the ring buffer.
    #[must_use]
    pub fn messages_ingested(&self) -> u64 {
        self.samples_written
    }

    /// Percentage of received messages that were dropped (0.0 - 100.0).
    #[must_use]
    #[expect(
        clippy::cast_precision_loss,
        reason = "percentages only need f64 precision"
    )]
    pub fn drop_rate_percent(&self) -> f64 {
        if self.messages_received == 0 {
            return 0.0;
        }
        (self.decode_errors as f64 / self.messages_received as f64) * 100.0
    }
}

/// Lock-free counters shared by the ingestor and the publisher.
///
/// ```rust
/// use balance_atomic::PipelineCounters;
///
/// let counters = PipelineCounters::new();
/// counters.inc_publish_attempt();
/// counters.inc_publish_failure();
/// counters.inc_publish_attempt();
/// counters.inc_publish_success();
///
/// let snapshot = counters.snapshot();
/// assert_eq!(snapshot.publish_attempts, 2);
/// assert_eq!(snapshot.publishes_succeeded, 1);
/// ```
#[derive(Debug)]
pub struct PipelineCounters {
    messages_received: AtomicU64,
    decode_errors: AtomicU64,
    samples_written: AtomicU64,
    publish_attempts: AtomicU64,
    publishes_succeeded: AtomicU64,
    publish_failures: AtomicU64,
}

impl Default for PipelineCounters {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineCounters {
    /// Create counters with every value at zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            messages_received: AtomicU64::new(0),
            decode_errors: AtomicU64::new(0),
            samples_written: AtomicU64::new(0),
            publish_attempts: AtomicU64::new(0),
            publishes_succeeded: AtomicU64::new(0),
            publish_failures: AtomicU64::new(0),
        }
    }

    /// Record an inbound message handed to the ingestor.
    #[inline]
    pub fn inc_received(&self) {
        self.messages_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an inbound message dropped on decode failure.
    #[inline]
    pub fn inc_decode_error(&self) {
        self.decode_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a sample written into the ring buffer.
    #[inline]
    pub fn inc_sample_written(&self) {
        self.samples_written.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a publish attempt.
    #[inline]
    pub fn inc_publish_attempt(&self) {
        self.publish_attempts.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a confirmed publish.
    #[inline]
    pub fn inc_publish_success(&self) {
        self.publishes_succeeded.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a failed publish.
    #[inline]
    pub fn inc_publish_failure(&self) {
        self.publish_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Read every counter without resetting.
    #[inline]
    #[must_use]
    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            messages_received: self.messages_received.load(Ordering::Relaxed),
            decode_errors: self.decode_errors.load(Ordering::Relaxed),
            samples_written: self.samples_written.load(Ordering::Relaxed),
            publish_attempts: self.publish_attempts.load(Ordering::Relaxed),
            publishes_succeeded: self.publishes_succeeded.load(Ordering::Relaxed),
            publish_failures: self.publish_failures.load(Ordering::Relaxed),
        }
    }

    /// Read every counter and reset it to zero.
    ///
    /// Increments racing this call land in either the returned snapshot or
    /// the next one, never both.
    #[inline]
    #[must_use]
    pub fn snapshot_and_reset(&self) -> CounterSnapshot {
        CounterSnapshot {
            messages_received: self.messages_received.swap(0, Ordering::Relaxed),
            decode_errors: self.decode_errors.swap(0, Ordering::Relaxed),
            samples_written: self.samples_written.swap(0, Ordering::Relaxed),
            publish_attempts: self.publish_attempts.swap(0, Ordering::Relaxed),
            publishes_succeeded: self.publishes_succeeded.swap(0, Ordering::Relaxed),
            publish_failures: self.publish_failures.swap(0, Ordering::Relaxed),
        }
    }
}
