//! Wires the bus, ingestor, ring, gain state and publisher together.
//!
//! ```text
//! bus (dataTopic) ──► ingest task ──► ring ──► SnapshotView ──► renderer
//! sliders ──► GainState ──► publisher task ──► bus (gainsTopic)
//! ```

use std::sync::Arc;

use balance_atomic::{CounterSnapshot, PipelineCounters};
use balance_bus::{BusReceiver, MessageBus, connect_with_backoff};
use balance_errors::ViewerError;
use balance_gains::{DebouncedPublisher, GainChannel, GainRange, GainState, GainValues};
use balance_telemetry::{
    DeviceGains, ReportedGains, SnapshotView, TelemetryIngestor, TimeBase, WindowSnapshot,
    ring_buffer,
};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use crate::config::ViewerConfig;

/// A running viewer core.
///
/// Created by [`ViewerRuntime::start`]; stop it with [`ViewerRuntime::shutdown`].
pub struct ViewerRuntime {
    config: ViewerConfig,
    bus: Arc<dyn MessageBus>,
    gains: Arc<GainState>,
    reported_gains: ReportedGains,
    counters: Arc<PipelineCounters>,
    snapshot: SnapshotView,
    shutdown_tx: broadcast::Sender<()>,
    ingest_task: JoinHandle<()>,
    publisher_task: JoinHandle<()>,
}

impl ViewerRuntime {
    /// Connect, subscribe to telemetry and start the ingest and publisher tasks.
    ///
    /// # Errors
    ///
    /// Returns [`ViewerError::Config`] for an invalid config and
    /// [`ViewerError::Connection`] when the broker stays unreachable or the
    /// subscription is refused. No task is running in either case.
    pub async fn start(config: ViewerConfig, bus: Arc<dyn MessageBus>) -> Result<Self, ViewerError> {
        config.validate()?;

        let attempts = connect_with_backoff(bus.as_ref(), config.retry_policy()).await?;
        let inbound = match bus.subscribe(&config.data_topic).await {
            Ok(rx) => rx,
            Err(e) => {
                bus.disconnect().await;
                return Err(e.into());
            }
        };

        let time_base = TimeBase::start();
        let (writer, reader) = ring_buffer(config.buffer_size);
        let counters = Arc::new(PipelineCounters::new());
        let reported_gains = ReportedGains::new();
        let ingestor = TelemetryIngestor::new(writer, time_base)
            .with_counters(Arc::clone(&counters))
            .with_reported_gains(reported_gains.clone());
        let snapshot = SnapshotView::new(reader, time_base).with_lookback(config.lookback_seconds);
        let gains = Arc::new(GainState::new());

        let (shutdown_tx, _) = broadcast::channel(1);
        let ingest_task = tokio::spawn(run_ingest(ingestor, inbound, shutdown_tx.subscribe()));
        let publisher_task = DebouncedPublisher::new(
            Arc::clone(&gains),
            Arc::clone(&bus),
            config.publisher_config(),
        )
        .with_counters(Arc::clone(&counters))
        .spawn(shutdown_tx.subscribe());

        info!(
            broker = bus.broker(),
            attempts,
            data_topic = %config.data_topic,
            gains_topic = %config.gains_topic,
            buffer_size = config.buffer_size,
            "Viewer runtime started"
        );

        Ok(Self {
            config,
            bus,
            gains,
            reported_gains,
            counters,
            snapshot,
            shutdown_tx,
            ingest_task,
            publisher_task,
        })
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    /// Shared gain state, for input layers that hold their own handle.
    pub fn gains(&self) -> &Arc<GainState> {
        &self.gains
    }

    pub fn gain_values(&self) -> GainValues {
        self.gains.values()
    }

    /// Slider range from the config.
    pub fn gain_range(&self) -> GainRange {
        self.config.gain_range()
    }

    /// Record a slider movement. The publisher sends it once the sliders settle.
    pub fn set_gain(&self, channel: GainChannel, value: f64) -> u64 {
        self.gains.set_gain(channel, value)
    }

    /// Trailing window ending now.
    pub fn snapshot(&self) -> WindowSnapshot {
        self.snapshot.windowed_now()
    }

    pub fn snapshot_view(&self) -> &SnapshotView {
        &self.snapshot
    }

    /// Gains the controller last reported running with.
    pub fn reported_gains(&self) -> Option<DeviceGains> {
        self.reported_gains.latest()
    }

    pub fn counters(&self) -> CounterSnapshot {
        self.counters.snapshot()
    }

    /// Stop both tasks, wait for them and disconnect the bus.
    ///
    /// Returns the final counter values.
    pub async fn shutdown(self) -> CounterSnapshot {
        if self.shutdown_tx.send(()).is_err() {
            debug!("Both viewer tasks already stopped");
        }

        if let Err(e) = self.ingest_task.await {
            warn!(error = %e, "Ingest task ended abnormally");
        }
        if let Err(e) = self.publisher_task.await {
            warn!(error = %e, "Gain publisher task ended abnormally");
        }
        self.bus.disconnect().await;

        let counters = self.counters.snapshot();
        info!(
            received = counters.messages_received,
            decode_errors = counters.decode_errors,
            publishes = counters.publishes_succeeded,
            publish_failures = counters.publish_failures,
            "Viewer runtime stopped"
        );
        counters
    }
}

async fn run_ingest(
    mut ingestor: TelemetryIngestor,
    mut inbound: BusReceiver,
    mut shutdown: broadcast::Receiver<()>,
) {
    loop {
        tokio::select! {
            _ = shutdown.recv() => break,
            message = inbound.recv() => {
                let Some(message) = message else {
                    info!("Telemetry subscription closed");
                    break;
                };
                match ingestor.on_message(&message.payload) {
                    Ok(sample) => trace!(timestamp = sample.timestamp, "Ingested telemetry sample"),
                    Err(e) => warn!(
                        topic = %message.topic,
                        payload_len = message.payload.len(),
                        error = %e,
                        "Dropping malformed telemetry message"
                    ),
                }
            }
        }
    }
    debug!("Ingest task stopped");
}
