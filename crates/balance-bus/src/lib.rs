//! Publish/subscribe bus seam for the balance telemetry viewer.
//!
//! The viewer talks to the robot through a broker: telemetry arrives on
//! [`DATA_TOPIC`] and tuned gains leave on [`GAINS_TOPIC`]. The transport itself
//! (MQTT client, handshake, keep-alive) lives behind [`MessageBus`] so the core
//! never depends on a particular client library.
//!
//! - [`MessageBus`] - async trait every transport implements
//! - [`LoopbackBus`] - in-process broker with fault injection
//! - [`connect_with_backoff`] - bounded reconnect loop used at startup

#![deny(static_mut_refs)]

pub mod loopback;
pub mod retry;

use async_trait::async_trait;
use balance_errors::{ConnectionError, PublishError};
use tokio::sync::mpsc;

pub use loopback::{LoopbackBus, PublishedMessage};
pub use retry::{RetryPolicy, connect_with_backoff};

/// Topic the controller publishes telemetry records on.
pub const DATA_TOPIC: &str = "ESP32/data";

/// Topic the controller listens on for gain updates.
pub const GAINS_TOPIC: &str = "ESP32/gains";

/// Address of the broker the robot is provisioned against.
pub const DEFAULT_BROKER: &str = "10.243.82.33";

/// Message delivered by a subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusMessage {
    pub topic: String,
    pub payload: Vec<u8>,
}

impl BusMessage {
    pub fn new(topic: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
        }
    }
}

/// Stream of messages for one subscription. Ends when the bus disconnects.
pub type BusReceiver = mpsc::Receiver<BusMessage>;

/// Pub/sub transport used by the viewer.
///
/// Implementations deliver inbound messages on their own task and must never
/// block the caller of [`MessageBus::publish`] on the consumer side.
#[async_trait]
pub trait MessageBus: Send + Sync {
    /// Broker address, for logs and errors.
    fn broker(&self) -> &str;

    /// Establish the connection.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionError::Unreachable`] when the broker cannot be reached.
    async fn connect(&self) -> Result<(), ConnectionError>;

    /// Subscribe to an exact topic.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionError::SubscribeFailed`] when the subscription is refused.
    async fn subscribe(&self, topic: &str) -> Result<BusReceiver, ConnectionError>;

    /// Publish a payload and wait for the client to accept it.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError`] when the message did not leave the client.
    async fn publish(&self, topic: &str, payload: &[u8]) -> Result<(), PublishError>;

    /// Drop the connection and close every subscription.
    async fn disconnect(&self);
}
