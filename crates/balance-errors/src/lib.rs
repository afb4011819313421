//! Error types for the balance telemetry viewer.
//!
//! Every failure the viewer core can hit falls into one of three recoverable or
//! fatal classes, plus configuration and I/O problems at startup:
//!
//! - [`telemetry`]: [`DecodeError`] for malformed inbound telemetry payloads.
//!   Recovered locally: the message is dropped and ingestion continues.
//! - [`bus`]: [`PublishError`] (recovered, retried on the next publisher tick)
//!   and [`ConnectionError`] (fatal when the bus cannot be reached at startup).
//! - [`common`]: the top-level [`ViewerError`] plus category and severity
//!   classification.
//!
//! # Example
//!
//! ```
//! use balance_errors::prelude::*;
//!
//! fn require_payload(payload: &[u8]) -> Result<&[u8]> {
//!     if payload.is_empty() {
//!         return Err(DecodeError::Empty.into());
//!     }
//!     Ok(payload)
//! }
//!
//! let err = require_payload(b"").err();
//! assert!(err.is_some_and(|e| e.is_recoverable()));
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod bus;
pub mod common;
pub mod prelude;
pub mod telemetry;

pub use bus::{ConnectionError, PublishError};
pub use common::{ErrorCategory, ErrorContext, ErrorSeverity, ResultExt, ViewerError};
pub use telemetry::DecodeError;

/// A specialized `Result` type for viewer operations.
pub type Result<T> = std::result::Result<T, ViewerError>;
