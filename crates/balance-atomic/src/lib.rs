//! # balance-atomic
//!
//! Lock-free counters for the telemetry ingest and gain publish paths.
//!
//! Both hot paths (the bus delivery task and the publisher tick) bump these
//! counters without taking a lock; the presentation layer or a log line reads
//! a [`CounterSnapshot`] whenever it likes.
//!
//! ```rust
//! use balance_atomic::PipelineCounters;
//!
//! let counters = PipelineCounters::new();
//! counters.inc_received();
//! counters.inc_decode_error();
//!
//! let snapshot = counters.snapshot();
//! assert_eq!(snapshot.messages_received, 1);
//! assert_eq!(snapshot.messages_ingested(), 0);
//! ```

#![no_std]
#![deny(
    unsafe_op_in_unsafe_fn,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    missing_debug_implementations
)]
#![warn(clippy::pedantic)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod counters;

pub use counters::{CounterSnapshot, PipelineCounters};
