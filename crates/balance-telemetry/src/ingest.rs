//! Turning inbound bus payloads into ring buffer samples.

use std::sync::Arc;

use balance_atomic::PipelineCounters;
use balance_errors::DecodeError;
use parking_lot::Mutex;
use tracing::debug;

use crate::channel::Sample;
use crate::decode::{DeviceGains, decode_payload};
use crate::ring::{RingReader, RingWriter};
use crate::time::TimeBase;

/// Latest gains echoed by the controller in its telemetry.
///
/// Clones share the same cell.
#[derive(Debug, Clone, Default)]
pub struct ReportedGains {
    inner: Arc<Mutex<Option<DeviceGains>>>,
}

impl ReportedGains {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `gains`. Returns `true` when they differ from the previous echo.
    pub fn store(&self, gains: DeviceGains) -> bool {
        let mut current = self.inner.lock();
        let changed = current.is_none_or(|previous| previous != gains);
        *current = Some(gains);
        changed
    }

    pub fn latest(&self) -> Option<DeviceGains> {
        *self.inner.lock()
    }
}

/// Owns the ring writer and stamps each decoded record on the shared axis.
///
/// Driven by the single task that receives data-topic messages. A payload
/// that fails to decode leaves the ring untouched.
pub struct TelemetryIngestor {
    writer: RingWriter,
    time_base: TimeBase,
    counters: Arc<PipelineCounters>,
    reported_gains: ReportedGains,
}

impl TelemetryIngestor {
    pub fn new(writer: RingWriter, time_base: TimeBase) -> Self {
        Self {
            writer,
            time_base,
            counters: Arc::new(PipelineCounters::new()),
            reported_gains: ReportedGains::new(),
        }
    }

    #[must_use]
    pub fn with_counters(mut self, counters: Arc<PipelineCounters>) -> Self {
        self.counters = counters;
        self
    }

    #[must_use]
    pub fn with_reported_gains(mut self, reported_gains: ReportedGains) -> Self {
        self.reported_gains = reported_gains;
        self
    }

    pub fn counters(&self) -> &Arc<PipelineCounters> {
        &self.counters
    }

    pub fn reported_gains(&self) -> &ReportedGains {
        &self.reported_gains
    }

    pub fn time_base(&self) -> TimeBase {
        self.time_base
    }

    pub fn reader(&self) -> RingReader {
        self.writer.reader()
    }

    /// Decode `payload` and append it, stamped with the current axis offset.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] when the payload is rejected. Nothing is written.
    pub fn on_message(&mut self, payload: &[u8]) -> Result<Sample, DecodeError> {
        let timestamp = self.time_base.elapsed_secs();
        self.on_message_at(payload, timestamp)
    }

    /// Decode `payload` and append it with an explicit timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] when the payload is rejected. Nothing is written.
    pub fn on_message_at(&mut self, payload: &[u8], timestamp: f64) -> Result<Sample, DecodeError> {
        self.counters.inc_received();

        let decoded = decode_payload(payload).inspect_err(|_| self.counters.inc_decode_error())?;

        if let Some(gains) = decoded.reported_gains
            && self.reported_gains.store(gains)
        {
            debug!(kp = gains.kp, kd = gains.kd, "Controller reported new gains");
        }

        self.writer.write(timestamp, &decoded.values);
        self.counters.inc_sample_written();
        Ok(Sample::new(timestamp, decoded.values))
    }
}
