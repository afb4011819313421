//! Windowed, per-channel views of the ring for rendering.
//!
//! A [`WindowSnapshot`] is everything a plot needs for one frame: the x-axis
//! range and, per channel, the samples inside it plus the y-axis bounds. The
//! view only reads; rendering never blocks ingestion.

use crate::channel::{ChannelId, Sample};
use crate::ring::RingReader;
use crate::time::TimeBase;

/// Seconds of history shown by default.
pub const DEFAULT_LOOKBACK_SECS: f64 = 10.0;

/// Y-axis limits of one series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisBounds {
    pub min: f64,
    pub max: f64,
}

impl AxisBounds {
    /// Min and max of `values`, ignoring NaN. `None` when nothing is left.
    pub fn of(values: &[f64]) -> Option<Self> {
        values
            .iter()
            .copied()
            .filter(|v| !v.is_nan())
            .fold(None, |bounds, v| match bounds {
                None => Some(Self { min: v, max: v }),
                Some(b) => Some(Self {
                    min: b.min.min(v),
                    max: b.max.max(v),
                }),
            })
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }
}

/// X-axis range of a window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeRange {
    pub start: f64,
    pub end: f64,
}

impl TimeRange {
    /// `[max(0, now - lookback), now]`.
    pub fn trailing(now: f64, lookback: f64) -> Self {
        Self {
            start: (now - lookback.max(0.0)).max(0.0),
            end: now,
        }
    }

    pub fn contains(&self, timestamp: f64) -> bool {
        timestamp >= self.start && timestamp <= self.end
    }
}

/// One channel's samples inside a window.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelSeries {
    pub channel: ChannelId,
    pub timestamps: Vec<f64>,
    pub values: Vec<f64>,
    /// `None` when the window holds no samples; keep the previous limits then
    pub bounds: Option<AxisBounds>,
}

impl ChannelSeries {
    fn from_samples(channel: ChannelId, samples: &[Sample]) -> Self {
        let timestamps: Vec<f64> = samples.iter().map(|s| s.timestamp).collect();
        let values: Vec<f64> = samples.iter().map(|s| s.values.get(channel)).collect();
        let bounds = AxisBounds::of(&values);
        Self {
            channel,
            timestamps,
            values,
            bounds,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// `(timestamp, value)` pairs, oldest first.
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.timestamps.iter().copied().zip(self.values.iter().copied())
    }
}

/// Render-ready state of every channel for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowSnapshot {
    pub x_range: TimeRange,
    series: Vec<ChannelSeries>,
}

impl WindowSnapshot {
    pub fn channel(&self, channel: ChannelId) -> Option<&ChannelSeries> {
        self.series.get(channel.index())
    }

    /// Series in [`ChannelId::ALL`] order.
    pub fn channels(&self) -> &[ChannelSeries] {
        &self.series
    }

    /// Samples in the window (identical for every channel).
    pub fn sample_count(&self) -> usize {
        self.series.first().map_or(0, ChannelSeries::len)
    }

    pub fn is_empty(&self) -> bool {
        self.sample_count() == 0
    }
}

/// Read side used by the renderer.
#[derive(Debug, Clone)]
pub struct SnapshotView {
    reader: RingReader,
    time_base: TimeBase,
    lookback: f64,
}

impl SnapshotView {
    pub fn new(reader: RingReader, time_base: TimeBase) -> Self {
        Self {
            reader,
            time_base,
            lookback: DEFAULT_LOOKBACK_SECS,
        }
    }

    /// Lookback used by [`SnapshotView::windowed_now`]. Negative values become zero.
    #[must_use]
    pub fn with_lookback(mut self, lookback: f64) -> Self {
        self.lookback = lookback.max(0.0);
        self
    }

    pub fn lookback(&self) -> f64 {
        self.lookback
    }

    pub fn reader(&self) -> &RingReader {
        &self.reader
    }

    /// Samples with `timestamp >= max(0, now_offset - lookback)`.
    ///
    /// Samples stamped after `now_offset` are kept; they are simply drawn past
    /// the right edge of `x_range`.
    pub fn windowed(&self, now_offset: f64, lookback: f64) -> WindowSnapshot {
        let x_range = TimeRange::trailing(now_offset, lookback);
        let samples = self.reader.window_since(x_range.start);
        let series = ChannelId::ALL
            .into_iter()
            .map(|channel| ChannelSeries::from_samples(channel, &samples))
            .collect();
        WindowSnapshot { x_range, series }
    }

    /// Window ending at the current axis offset, using the configured lookback.
    pub fn windowed_now(&self) -> WindowSnapshot {
        self.windowed(self.time_base.elapsed_secs(), self.lookback)
    }
}

/// Keeps the last known y-limits of one plot across empty frames.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AxisScaler {
    current: Option<AxisBounds>,
}

impl AxisScaler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adopt `bounds` if present and return the limits to draw with.
    pub fn apply(&mut self, bounds: Option<AxisBounds>) -> Option<AxisBounds> {
        if bounds.is_some() {
            self.current = bounds;
        }
        self.current
    }

    pub fn current(&self) -> Option<AxisBounds> {
        self.current
    }
}
