//! Shared time axis.

use tokio::time::Instant;

/// Origin of every sample timestamp and plot offset.
///
/// Built on [`tokio::time::Instant`] so paused-clock tests drive it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeBase {
    origin: Instant,
}

impl TimeBase {
    /// Start the axis now.
    pub fn start() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    pub fn from_origin(origin: Instant) -> Self {
        Self { origin }
    }

    pub fn origin(&self) -> Instant {
        self.origin
    }

    /// Seconds since the origin.
    pub fn elapsed_secs(&self) -> f64 {
        self.offset_of(Instant::now())
    }

    /// Offset of `instant` on this axis. Instants before the origin map to `0.0`.
    pub fn offset_of(&self, instant: Instant) -> f64 {
        instant.saturating_duration_since(self.origin).as_secs_f64()
    }
}

impl Default for TimeBase {
    fn default() -> Self {
        Self::start()
    }
}
