//! Controller gain tuning for the balance telemetry viewer.
//!
//! The operator moves Kp/Kd sliders; every movement lands in [`GainState`].
//! [`DebouncedPublisher`] waits until the sliders have been still for the
//! quiescence period and then sends the final values once, formatted by
//! [`format_gains_payload`].

#![deny(static_mut_refs)]

pub mod gain;
pub mod payload;
pub mod publisher;

pub use gain::{GainChannel, GainRange, GainState, GainValues, PendingGains, PublishState};
pub use payload::{format_gains_payload, parse_gains_payload};
pub use publisher::{
    DEFAULT_POLL_INTERVAL, DEFAULT_QUIESCENCE, DebouncedPublisher, MIN_POLL_INTERVAL, PollOutcome,
    PublisherConfig,
};
