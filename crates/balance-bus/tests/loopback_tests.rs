//! Integration tests for the loopback bus through the `MessageBus` trait object.

use std::sync::Arc;

use balance_bus::{DATA_TOPIC, GAINS_TOPIC, LoopbackBus, MessageBus};

type TestResult = Result<(), Box<dyn std::error::Error>>;

#[tokio::test]
async fn test_trait_object_round_trip() -> TestResult {
    let loopback = Arc::new(LoopbackBus::new());
    let bus: Arc<dyn MessageBus> = loopback.clone();

    bus.connect().await?;
    let mut rx = bus.subscribe(GAINS_TOPIC).await?;
    bus.publish(GAINS_TOPIC, br#"{"balancing": "[1.000,2.500]"}"#).await?;

    let message = rx.recv().await.ok_or("subscription closed")?;
    assert_eq!(message.topic, GAINS_TOPIC);
    assert_eq!(message.payload, br#"{"balancing": "[1.000,2.500]"}"#.to_vec());
    assert_eq!(loopback.published_on(GAINS_TOPIC).len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_fan_out_to_every_subscriber() -> TestResult {
    let bus = LoopbackBus::new();
    bus.connect().await?;
    let mut first = bus.subscribe(DATA_TOPIC).await?;
    let mut second = bus.subscribe(DATA_TOPIC).await?;

    assert_eq!(bus.inject(DATA_TOPIC, b"{}"), 2);

    assert!(first.recv().await.is_some());
    assert!(second.recv().await.is_some());
    Ok(())
}

#[tokio::test]
async fn test_dropped_subscriber_is_pruned() -> TestResult {
    let bus = LoopbackBus::new();
    bus.connect().await?;
    let kept = bus.subscribe(DATA_TOPIC).await?;
    drop(bus.subscribe(DATA_TOPIC).await?);
    assert_eq!(bus.subscriber_count(DATA_TOPIC), 2);

    assert_eq!(bus.inject(DATA_TOPIC, b"{}"), 1);
    assert_eq!(bus.subscriber_count(DATA_TOPIC), 1);
    drop(kept);
    Ok(())
}

#[tokio::test]
async fn test_subscribe_before_connect_fails() {
    let bus = LoopbackBus::new();
    assert!(bus.subscribe(DATA_TOPIC).await.is_err());
}

#[tokio::test]
async fn test_inject_without_subscribers() {
    let bus = LoopbackBus::new();
    assert_eq!(bus.inject(DATA_TOPIC, b"{}"), 0);
}
