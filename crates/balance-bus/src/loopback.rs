//! In-process broker.
//!
//! Routes every publish to the subscribers of the exact same topic and keeps a
//! log of what was published. Fault injection (`set_online`,
//! `fail_next_connects`) lets callers exercise the reconnect and retry paths
//! without a network.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use async_trait::async_trait;
use balance_errors::{ConnectionError, PublishError};
use parking_lot::Mutex;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::{BusMessage, BusReceiver, DEFAULT_BROKER, MessageBus};

const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// A message recorded by [`LoopbackBus::published`].
#[derive(Debug, Clone)]
pub struct PublishedMessage {
    pub at: Instant,
    pub message: BusMessage,
}

pub struct LoopbackBus {
    broker: String,
    online: AtomicBool,
    connected: AtomicBool,
    failing_connects: AtomicU32,
    channel_capacity: usize,
    subscribers: Mutex<HashMap<String, Vec<mpsc::Sender<BusMessage>>>>,
    published: Mutex<Vec<PublishedMessage>>,
}

impl LoopbackBus {
    pub fn new() -> Self {
        Self::with_broker(DEFAULT_BROKER)
    }

    pub fn with_broker(broker: impl Into<String>) -> Self {
        Self {
            broker: broker.into(),
            online: AtomicBool::new(true),
            connected: AtomicBool::new(false),
            failing_connects: AtomicU32::new(0),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            subscribers: Mutex::new(HashMap::new()),
            published: Mutex::new(Vec::new()),
        }
    }

    /// Per-subscription queue depth. Messages beyond it are dropped.
    #[must_use]
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.max(1);
        self
    }

    /// Take the broker offline (publishes and connects fail) or bring it back.
    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
        info!(broker = %self.broker, online, "Loopback broker availability changed");
    }

    /// Make the next `count` connect attempts fail.
    pub fn fail_next_connects(&self, count: u32) {
        self.failing_connects.store(count, Ordering::SeqCst);
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Deliver a message to subscribers as if another client had published it.
    ///
    /// Bypasses this client's connection state and publish log. Returns the
    /// number of subscribers that accepted the message.
    pub fn inject(&self, topic: &str, payload: &[u8]) -> usize {
        self.route(&BusMessage::new(topic, payload))
    }

    /// Every successful publish so far, oldest first.
    pub fn published(&self) -> Vec<PublishedMessage> {
        self.published.lock().clone()
    }

    /// Successful publishes on one topic, oldest first.
    pub fn published_on(&self, topic: &str) -> Vec<PublishedMessage> {
        self.published
            .lock()
            .iter()
            .filter(|p| p.message.topic == topic)
            .cloned()
            .collect()
    }

    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.subscribers.lock().get(topic).map_or(0, Vec::len)
    }

    fn route(&self, message: &BusMessage) -> usize {
        let mut subscribers = self.subscribers.lock();
        let Some(senders) = subscribers.get_mut(&message.topic) else {
            return 0;
        };

        let mut delivered = 0usize;
        senders.retain(|tx| match tx.try_send(message.clone()) {
            Ok(()) => {
                delivered = delivered.saturating_add(1);
                true
            }
            Err(TrySendError::Full(_)) => {
                warn!(topic = %message.topic, "Subscriber queue full, dropping message");
                true
            }
            Err(TrySendError::Closed(_)) => {
                debug!(topic = %message.topic, "Subscriber dropped, removing");
                false
            }
        });
        delivered
    }
}

impl Default for LoopbackBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessageBus for LoopbackBus {
    fn broker(&self) -> &str {
        &self.broker
    }

    async fn connect(&self) -> Result<(), ConnectionError> {
        let failing = self.failing_connects.load(Ordering::SeqCst);
        if failing > 0 {
            self.failing_connects
                .store(failing.saturating_sub(1), Ordering::SeqCst);
            return Err(ConnectionError::unreachable(
                &self.broker,
                "connection refused",
            ));
        }
        if !self.online.load(Ordering::SeqCst) {
            return Err(ConnectionError::unreachable(&self.broker, "broker offline"));
        }

        self.connected.store(true, Ordering::SeqCst);
        debug!(broker = %self.broker, "Loopback bus connected");
        Ok(())
    }

    async fn subscribe(&self, topic: &str) -> Result<BusReceiver, ConnectionError> {
        if !self.is_connected() {
            return Err(ConnectionError::subscribe_failed(topic, "not connected"));
        }

        let (tx, rx) = mpsc::channel(self.channel_capacity);
        self.subscribers
            .lock()
            .entry(topic.to_string())
            .or_default()
            .push(tx);
        debug!(topic, "Loopback subscription registered");
        Ok(rx)
    }

    async fn publish(&self, topic: &str, payload: &[u8]) -> Result<(), PublishError> {
        if !self.is_connected() || !self.online.load(Ordering::SeqCst) {
            return Err(PublishError::disconnected(topic));
        }

        let message = BusMessage::new(topic, payload);
        self.route(&message);
        self.published.lock().push(PublishedMessage {
            at: Instant::now(),
            message,
        });
        Ok(())
    }

    async fn disconnect(&self) {
        self.connected.store(false, Ordering::SeqCst);
        self.subscribers.lock().clear();
        debug!(broker = %self.broker, "Loopback bus disconnected");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[tokio::test]
    async fn test_publish_requires_connection() {
        let bus = LoopbackBus::new();
        let result = bus.publish("ESP32/gains", b"{}").await;
        assert!(matches!(result, Err(PublishError::Disconnected { .. })));
    }

    #[tokio::test]
    async fn test_exact_topic_routing() -> TestResult {
        let bus = LoopbackBus::new();
        bus.connect().await?;
        let mut data = bus.subscribe("ESP32/data").await?;
        let mut gains = bus.subscribe("ESP32/gains").await?;

        bus.publish("ESP32/data", b"{\"anglex\": 1.0}").await?;

        let received = data.recv().await.ok_or("data subscription closed")?;
        assert_eq!(received.payload, b"{\"anglex\": 1.0}".to_vec());
        assert!(gains.try_recv().is_err());
        Ok(())
    }

    #[tokio::test]
    async fn test_offline_broker_rejects_publish() -> TestResult {
        let bus = LoopbackBus::new();
        bus.connect().await?;
        bus.set_online(false);

        assert!(bus.publish("ESP32/gains", b"x").await.is_err());
        assert!(bus.published().is_empty());

        bus.set_online(true);
        bus.publish("ESP32/gains", b"x").await?;
        assert_eq!(bus.published_on("ESP32/gains").len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_disconnect_closes_subscriptions() -> TestResult {
        let bus = LoopbackBus::new();
        bus.connect().await?;
        let mut rx = bus.subscribe("ESP32/data").await?;

        bus.disconnect().await;

        assert!(rx.recv().await.is_none());
        assert_eq!(bus.subscriber_count("ESP32/data"), 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_full_queue_drops_instead_of_blocking() -> TestResult {
        let bus = LoopbackBus::new().with_channel_capacity(1);
        bus.connect().await?;
        let _rx = bus.subscribe("ESP32/data").await?;

        assert_eq!(bus.inject("ESP32/data", b"1"), 1);
        assert_eq!(bus.inject("ESP32/data", b"2"), 0);
        Ok(())
    }
}
