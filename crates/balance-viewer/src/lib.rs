//! Core of the balance telemetry viewer.
//!
//! The presentation layer (windows, plots, sliders) is not part of this
//! crate. It drives a [`ViewerRuntime`]:
//!
//! - call [`ViewerRuntime::snapshot`] on every render tick and draw the
//!   [`WindowSnapshot`] channels, keeping one [`AxisScaler`] per plot;
//! - forward slider movements to [`ViewerRuntime::set_gain`];
//! - call [`ViewerRuntime::shutdown`] when the window closes.
//!
//! The bus transport is supplied by the embedder as an `Arc<dyn MessageBus>`.

#![deny(static_mut_refs)]

pub mod config;
pub mod observability;
pub mod runtime;

pub use balance_bus::{LoopbackBus, MessageBus};
pub use balance_gains::{GainChannel, GainRange, GainValues};
pub use balance_telemetry::{AxisBounds, AxisScaler, ChannelId, ChannelSeries, WindowSnapshot};
pub use config::ViewerConfig;
pub use observability::{LoggingConfig, init_logging};
pub use runtime::ViewerRuntime;
