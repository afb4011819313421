//! Current controller gains and their publish bookkeeping.

use core::fmt;
use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

/// A tunable controller gain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GainChannel {
    /// Proportional gain
    Kp,
    /// Derivative gain
    Kd,
}

impl fmt::Display for GainChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GainChannel::Kp => write!(f, "Kp"),
            GainChannel::Kd => write!(f, "Kd"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GainValues {
    pub kp: f64,
    pub kd: f64,
}

impl GainValues {
    pub const fn new(kp: f64, kd: f64) -> Self {
        Self { kp, kd }
    }

    pub fn get(&self, channel: GainChannel) -> f64 {
        match channel {
            GainChannel::Kp => self.kp,
            GainChannel::Kd => self.kd,
        }
    }

    fn set(&mut self, channel: GainChannel, value: f64) {
        match channel {
            GainChannel::Kp => self.kp = value,
            GainChannel::Kd => self.kd = value,
        }
    }
}

/// Slider range offered to the operator.
///
/// The core accepts any value; clamping is up to the input layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GainRange {
    pub min: f64,
    pub max: f64,
}

impl Default for GainRange {
    fn default() -> Self {
        Self {
            min: 0.0,
            max: 10.0,
        }
    }
}

impl GainRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Pull `value` into the range. NaN maps to `min`.
    pub fn clamp(&self, value: f64) -> f64 {
        if value.is_nan() {
            return self.min;
        }
        value.max(self.min).min(self.max)
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Whether a change is waiting to go out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishState {
    Idle,
    Pending,
}

/// Gains that have been quiet long enough to publish.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingGains {
    pub values: GainValues,
    /// Revision the values were read at; hand back to [`GainState::mark_published`]
    pub revision: u64,
}

#[derive(Debug)]
struct Inner {
    values: GainValues,
    last_change_at: Option<Instant>,
    pending: bool,
    revision: u64,
}

/// Kp/Kd shared between the input layer and the publisher.
///
/// Every change bumps a revision. A publish only clears the pending flag if
/// the revision it sent is still current, so a change racing a publish is
/// never lost.
#[derive(Debug)]
pub struct GainState {
    inner: Mutex<Inner>,
}

impl Default for GainState {
    fn default() -> Self {
        Self::new()
    }
}

impl GainState {
    /// Both gains at zero, nothing pending.
    pub fn new() -> Self {
        Self::with_values(GainValues::default())
    }

    pub fn with_values(values: GainValues) -> Self {
        Self {
            inner: Mutex::new(Inner {
                values,
                last_change_at: None,
                pending: false,
                revision: 0,
            }),
        }
    }

    /// Record a new value for `channel`. Returns the new revision.
    pub fn set_gain(&self, channel: GainChannel, value: f64) -> u64 {
        self.set_gain_at(channel, value, Instant::now())
    }

    pub fn set_gain_at(&self, channel: GainChannel, value: f64, now: Instant) -> u64 {
        let mut inner = self.inner.lock();
        inner.values.set(channel, value);
        inner.last_change_at = Some(now);
        inner.pending = true;
        inner.revision = inner.revision.wrapping_add(1);
        inner.revision
    }

    pub fn values(&self) -> GainValues {
        self.inner.lock().values
    }

    pub fn is_pending(&self) -> bool {
        self.inner.lock().pending
    }

    pub fn state(&self) -> PublishState {
        if self.is_pending() {
            PublishState::Pending
        } else {
            PublishState::Idle
        }
    }

    pub fn revision(&self) -> u64 {
        self.inner.lock().revision
    }

    pub fn last_change_at(&self) -> Option<Instant> {
        self.inner.lock().last_change_at
    }

    /// The pending values if nothing changed for at least `quiescence`.
    pub fn take_due(&self, now: Instant, quiescence: Duration) -> Option<PendingGains> {
        let inner = self.inner.lock();
        if !inner.pending {
            return None;
        }
        let quiet_for = inner
            .last_change_at
            .map_or(Duration::MAX, |at| now.saturating_duration_since(at));
        (quiet_for >= quiescence).then_some(PendingGains {
            values: inner.values,
            revision: inner.revision,
        })
    }

    /// Clear the pending flag if `revision` is still current.
    ///
    /// Returns `false` when a newer change arrived since `revision` was read;
    /// that change stays pending.
    pub fn mark_published(&self, revision: u64) -> bool {
        let mut inner = self.inner.lock();
        if inner.revision != revision {
            return false;
        }
        inner.pending = false;
        true
    }
}
