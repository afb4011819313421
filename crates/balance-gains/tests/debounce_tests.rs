//! Debounce timing against a running publisher on a paused clock.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use balance_bus::{BusReceiver, GAINS_TOPIC, LoopbackBus, MessageBus};
use balance_errors::{ConnectionError, PublishError};
use balance_gains::{
    DebouncedPublisher, GainChannel, GainState, GainValues, PollOutcome, PublisherConfig,
    parse_gains_payload,
};
use balance_test_helpers::prelude::*;
use tokio::sync::broadcast;
use tokio::time::{Instant, sleep};

struct Harness {
    bus: Arc<LoopbackBus>,
    gains: Arc<GainState>,
    shutdown: broadcast::Sender<()>,
    task: tokio::task::JoinHandle<()>,
    started_at: Instant,
}

async fn start() -> Result<Harness, Box<dyn std::error::Error>> {
    start_with(PublisherConfig::default()).await
}

async fn start_with(config: PublisherConfig) -> Result<Harness, Box<dyn std::error::Error>> {
    let bus = Arc::new(LoopbackBus::new());
    bus.connect().await?;
    let gains = Arc::new(GainState::new());
    let (shutdown, rx) = broadcast::channel(1);
    let started_at = Instant::now();
    let task = DebouncedPublisher::new(Arc::clone(&gains), bus.clone(), config).spawn(rx);
    Ok(Harness {
        bus,
        gains,
        shutdown,
        task,
        started_at,
    })
}

impl Harness {
    fn publish_offsets(&self) -> Vec<Duration> {
        self.bus
            .published_on(GAINS_TOPIC)
            .iter()
            .map(|p| p.at.saturating_duration_since(self.started_at))
            .collect()
    }

    async fn stop(self) -> TestResult {
        self.shutdown.send(())?;
        self.task.await?;
        Ok(())
    }
}

#[tokio::test(start_paused = true)]
async fn test_burst_publishes_once_after_quiescence() -> TestResult {
    let h = start().await?;

    h.gains.set_gain(GainChannel::Kp, 1.0);
    sleep(Duration::from_millis(500)).await;
    h.gains.set_gain(GainChannel::Kp, 2.0);
    sleep(Duration::from_millis(500)).await;
    h.gains.set_gain(GainChannel::Kp, 3.0);

    sleep(Duration::from_millis(1900)).await;
    assert!(h.publish_offsets().is_empty(), "published before quiescence");

    sleep(Duration::from_secs(3)).await;
    let offsets = h.publish_offsets();
    assert_eq!(offsets.len(), 1);
    let at = must_some(offsets.first().copied(), "publish time");
    assert!(at >= Duration::from_secs(3) && at <= Duration::from_millis(3200), "published at {at:?}");

    let sent = h.bus.published_on(GAINS_TOPIC);
    let payload = must_some(sent.first(), "published payload");
    assert_eq!(
        parse_gains_payload(&payload.message.payload)?,
        GainValues::new(3.0, 0.0)
    );
    assert!(!h.gains.is_pending());
    h.stop().await
}

#[tokio::test(start_paused = true)]
async fn test_zero_poll_interval_still_ticks() -> TestResult {
    let h = start_with(PublisherConfig {
        poll_interval: Duration::ZERO,
        ..PublisherConfig::default()
    })
    .await?;

    h.gains.set_gain(GainChannel::Kd, 1.5);
    sleep(Duration::from_millis(2010)).await;

    assert_eq!(h.publish_offsets().len(), 1);
    assert!(!h.gains.is_pending());
    h.stop().await
}

#[tokio::test(start_paused = true)]
async fn test_continuous_changes_never_publish() -> TestResult {
    let h = start().await?;

    for step in 0..40 {
        h.gains.set_gain(GainChannel::Kd, f64::from(step) * 0.1);
        sleep(Duration::from_millis(500)).await;
    }
    assert!(h.publish_offsets().is_empty());

    sleep(Duration::from_secs(2)).await;
    assert_eq!(h.publish_offsets().len(), 1);
    h.stop().await
}

#[tokio::test(start_paused = true)]
async fn test_exact_payload_on_the_wire() -> TestResult {
    let h = start().await?;

    h.gains.set_gain(GainChannel::Kp, 1.0);
    h.gains.set_gain(GainChannel::Kd, 2.5);
    sleep(Duration::from_millis(2500)).await;

    let sent = h.bus.published_on(GAINS_TOPIC);
    let payload = must_some(sent.first(), "published payload");
    assert_eq!(payload.message.payload, br#"{"balancing": "[1.000,2.500]"}"#.to_vec());
    h.stop().await
}

#[tokio::test(start_paused = true)]
async fn test_publish_retried_after_bus_recovers() -> TestResult {
    let h = start().await?;
    h.bus.set_online(false);

    h.gains.set_gain(GainChannel::Kp, 5.0);
    sleep(Duration::from_secs(4)).await;
    assert!(h.publish_offsets().is_empty());
    assert!(h.gains.is_pending());

    h.bus.set_online(true);
    sleep(Duration::from_millis(250)).await;
    assert_eq!(h.publish_offsets().len(), 1);
    assert!(!h.gains.is_pending());
    h.stop().await
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_stops_promptly() -> TestResult {
    let h = start().await?;
    h.gains.set_gain(GainChannel::Kp, 1.0);

    h.shutdown.send(())?;
    tokio::time::timeout(Duration::from_millis(50), h.task).await??;
    assert!(h.gains.is_pending());
    Ok(())
}

/// Bus whose publish lets the operator move a slider while the message is in
/// flight.
struct SliderDuringPublish {
    inner: LoopbackBus,
    gains: Arc<GainState>,
}

#[async_trait]
impl MessageBus for SliderDuringPublish {
    fn broker(&self) -> &str {
        self.inner.broker()
    }

    async fn connect(&self) -> Result<(), ConnectionError> {
        self.inner.connect().await
    }

    async fn subscribe(&self, topic: &str) -> Result<BusReceiver, ConnectionError> {
        self.inner.subscribe(topic).await
    }

    async fn publish(&self, topic: &str, payload: &[u8]) -> Result<(), PublishError> {
        if self.inner.published().is_empty() {
            self.gains.set_gain(GainChannel::Kp, 9.0);
        }
        self.inner.publish(topic, payload).await
    }

    async fn disconnect(&self) {
        self.inner.disconnect().await;
    }
}

#[tokio::test(start_paused = true)]
async fn test_change_during_publish_is_not_lost() -> TestResult {
    let gains = Arc::new(GainState::new());
    let bus = Arc::new(SliderDuringPublish {
        inner: LoopbackBus::new(),
        gains: Arc::clone(&gains),
    });
    bus.connect().await?;
    let publisher =
        DebouncedPublisher::new(Arc::clone(&gains), bus.clone(), PublisherConfig::default());

    gains.set_gain(GainChannel::Kp, 1.0);
    let t0 = Instant::now();

    assert_eq!(
        publisher.poll_at(t0 + Duration::from_secs(2)).await,
        PollOutcome::Published(GainValues::new(1.0, 0.0))
    );
    assert!(gains.is_pending(), "in-flight change was dropped");
    assert_eq!(gains.values(), GainValues::new(9.0, 0.0));

    assert_eq!(
        publisher.poll_at(t0 + Duration::from_secs(4)).await,
        PollOutcome::Published(GainValues::new(9.0, 0.0))
    );
    assert!(!gains.is_pending());
    assert_eq!(bus.inner.published().len(), 2);
    Ok(())
}
