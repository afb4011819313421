//! Convenience re-exports for common test utilities.
//!
//! ```rust,ignore
//! use balance_test_helpers::prelude::*;
//! ```

pub use crate::must::must_some;

#[cfg(feature = "fixtures")]
pub use crate::fixtures::{TelemetryRecord, ramp_records};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;
