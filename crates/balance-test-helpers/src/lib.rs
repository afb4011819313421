//! Shared test utilities for the balance telemetry viewer.
//!
//! - [`mod@must`] - `must_some`, an unwrap helper with `#[track_caller]`
//! - [`assertions`] - Float and ordering assertions for sample data
//! - [`fixtures`] - Controller telemetry record builders
//! - [`prelude`] - Convenience re-exports
//!
//! ```rust,ignore
//! use balance_test_helpers::prelude::*;
//! ```

#![allow(clippy::unwrap_used, clippy::panic)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod assertions;
pub mod must;
pub mod prelude;

#[cfg(feature = "fixtures")]
#[cfg_attr(docsrs, doc(cfg(feature = "fixtures")))]
pub mod fixtures;

pub use must::*;
