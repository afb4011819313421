//! Convenience re-exports.
//!
//! ```
//! use balance_errors::prelude::*;
//!
//! fn publish_ready(connected: bool) -> Result<()> {
//!     if !connected {
//!         return Err(PublishError::disconnected("ESP32/gains").into());
//!     }
//!     Ok(())
//! }
//!
//! assert!(publish_ready(true).is_ok());
//! ```

pub use crate::{
    Result,
    bus::{ConnectionError, PublishError},
    common::{ErrorCategory, ErrorContext, ErrorSeverity, ResultExt, ViewerError},
    telemetry::DecodeError,
};
