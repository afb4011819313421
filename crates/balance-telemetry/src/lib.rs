//! Telemetry path of the balance telemetry viewer.
//!
//! Inbound records flow through three stages:
//!
//! 1. [`decode_payload`] turns a JSON record into [`ChannelValues`].
//! 2. [`TelemetryIngestor`] stamps it on the shared [`TimeBase`] and writes
//!    it into the lock-free ring created by [`ring_buffer`].
//! 3. [`SnapshotView`] reads a trailing window for rendering, one
//!    [`ChannelSeries`] per [`ChannelId`].
//!
//! The ingest side and the render side only share the ring; neither ever
//! waits on the other.

#![deny(static_mut_refs)]

pub mod channel;
pub mod decode;
pub mod ingest;
pub mod ring;
pub mod snapshot;
pub mod time;

pub use channel::{ChannelId, ChannelValues, Sample};
pub use decode::{DecodedTelemetry, DeviceGains, decode_payload};
pub use ingest::{ReportedGains, TelemetryIngestor};
pub use ring::{RingReader, RingWriter, ring_buffer};
pub use snapshot::{
    AxisBounds, AxisScaler, ChannelSeries, DEFAULT_LOOKBACK_SECS, SnapshotView, TimeRange,
    WindowSnapshot,
};
pub use time::TimeBase;

/// Number of samples kept when no capacity is configured.
pub const DEFAULT_BUFFER_SIZE: usize = 1000;
