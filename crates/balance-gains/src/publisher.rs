//! Debounced gain publisher.
//!
//! A fixed-tick poller: every `poll_interval` it checks whether the gains
//! have been quiet for `quiescence` and, if so, publishes them once. Rapid
//! slider movement therefore produces a single message carrying the final
//! value. A failed publish leaves the change pending and is retried on the
//! next tick.

use std::sync::Arc;
use std::time::Duration;

use balance_atomic::PipelineCounters;
use balance_bus::{GAINS_TOPIC, MessageBus};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval};
use tracing::{debug, info, trace, warn};

use crate::gain::{GainState, GainValues};
use crate::payload::format_gains_payload;

/// Quiet period required before a change is sent.
pub const DEFAULT_QUIESCENCE: Duration = Duration::from_secs(2);

/// Publisher tick.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Shortest tick `run` will use; shorter intervals are raised to it.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublisherConfig {
    pub topic: String,
    pub quiescence: Duration,
    pub poll_interval: Duration,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            topic: GAINS_TOPIC.to_string(),
            quiescence: DEFAULT_QUIESCENCE,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// What one publisher tick did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PollOutcome {
    /// Nothing pending
    Idle,
    /// A change is pending but not yet quiet long enough
    Settling,
    /// The values were accepted by the bus
    Published(GainValues),
    /// The bus rejected the publish; the change stays pending
    Failed,
}

pub struct DebouncedPublisher {
    gains: Arc<GainState>,
    bus: Arc<dyn MessageBus>,
    config: PublisherConfig,
    counters: Arc<PipelineCounters>,
}

impl DebouncedPublisher {
    pub fn new(gains: Arc<GainState>, bus: Arc<dyn MessageBus>, config: PublisherConfig) -> Self {
        Self {
            gains,
            bus,
            config,
            counters: Arc::new(PipelineCounters::new()),
        }
    }

    #[must_use]
    pub fn with_counters(mut self, counters: Arc<PipelineCounters>) -> Self {
        self.counters = counters;
        self
    }

    pub fn config(&self) -> &PublisherConfig {
        &self.config
    }

    pub fn counters(&self) -> &Arc<PipelineCounters> {
        &self.counters
    }

    /// Run a single tick against the current time.
    pub async fn poll_once(&self) -> PollOutcome {
        self.poll_at(Instant::now()).await
    }

    /// Run a single tick as if the current time were `now`.
    pub async fn poll_at(&self, now: Instant) -> PollOutcome {
        let Some(due) = self.gains.take_due(now, self.config.quiescence) else {
            return if self.gains.is_pending() {
                PollOutcome::Settling
            } else {
                PollOutcome::Idle
            };
        };

        let payload = format_gains_payload(due.values);
        self.counters.inc_publish_attempt();

        match self.bus.publish(&self.config.topic, payload.as_bytes()).await {
            Ok(()) => {
                self.counters.inc_publish_success();
                if self.gains.mark_published(due.revision) {
                    info!(
                        topic = %self.config.topic,
                        kp = due.values.kp,
                        kd = due.values.kd,
                        "Published gains"
                    );
                } else {
                    debug!(
                        topic = %self.config.topic,
                        revision = due.revision,
                        "Published gains, newer change still pending"
                    );
                }
                PollOutcome::Published(due.values)
            }
            Err(e) => {
                self.counters.inc_publish_failure();
                warn!(
                    topic = %self.config.topic,
                    error = %e,
                    "Gain publish failed, will retry"
                );
                PollOutcome::Failed
            }
        }
    }

    /// Poll until `shutdown` fires or its sender is dropped.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        let mut ticker = interval(self.config.poll_interval.max(MIN_POLL_INTERVAL));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            topic = %self.config.topic,
            quiescence_ms = u64::try_from(self.config.quiescence.as_millis()).unwrap_or(u64::MAX),
            "Gain publisher started"
        );

        loop {
            tokio::select! {
                _ = shutdown.recv() => break,
                _ = ticker.tick() => {
                    let outcome = self.poll_once().await;
                    trace!(?outcome, "Gain publisher tick");
                }
            }
        }

        if self.gains.is_pending() {
            warn!(values = ?self.gains.values(), "Gain publisher stopped with an unpublished change");
        } else {
            info!("Gain publisher stopped");
        }
    }

    pub fn spawn(self, shutdown: broadcast::Receiver<()>) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gain::GainChannel;
    use balance_bus::LoopbackBus;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    async fn connected_bus() -> Result<Arc<LoopbackBus>, Box<dyn std::error::Error>> {
        let bus = Arc::new(LoopbackBus::new());
        bus.connect().await?;
        Ok(bus)
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_outcomes() -> TestResult {
        let bus = connected_bus().await?;
        let gains = Arc::new(GainState::new());
        let publisher =
            DebouncedPublisher::new(Arc::clone(&gains), bus.clone(), PublisherConfig::default());

        assert_eq!(publisher.poll_once().await, PollOutcome::Idle);

        let t0 = Instant::now();
        gains.set_gain_at(GainChannel::Kp, 4.0, t0);
        assert_eq!(
            publisher.poll_at(t0 + Duration::from_secs(1)).await,
            PollOutcome::Settling
        );
        assert_eq!(
            publisher.poll_at(t0 + Duration::from_secs(2)).await,
            PollOutcome::Published(GainValues::new(4.0, 0.0))
        );
        assert_eq!(
            publisher.poll_at(t0 + Duration::from_secs(3)).await,
            PollOutcome::Idle
        );
        assert_eq!(bus.published_on(GAINS_TOPIC).len(), 1);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_publish_stays_pending() -> TestResult {
        let bus = connected_bus().await?;
        bus.set_online(false);
        let gains = Arc::new(GainState::new());
        let publisher =
            DebouncedPublisher::new(Arc::clone(&gains), bus.clone(), PublisherConfig::default());

        let t0 = Instant::now();
        gains.set_gain_at(GainChannel::Kd, 1.5, t0);
        let later = t0 + Duration::from_secs(3);

        assert_eq!(publisher.poll_at(later).await, PollOutcome::Failed);
        assert!(gains.is_pending());

        bus.set_online(true);
        assert_eq!(
            publisher.poll_at(later).await,
            PollOutcome::Published(GainValues::new(0.0, 1.5))
        );
        assert!(!gains.is_pending());

        let counters = publisher.counters().snapshot();
        assert_eq!(counters.publish_attempts, 2);
        assert_eq!(counters.publish_failures, 1);
        assert_eq!(counters.publishes_succeeded, 1);
        Ok(())
    }
}
