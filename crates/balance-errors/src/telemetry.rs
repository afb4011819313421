//! Errors raised while decoding inbound telemetry.

use crate::common::ErrorSeverity;

/// Inbound telemetry payload could not be turned into a sample.
///
/// Every variant is recoverable: the offending message is dropped and the
/// stream keeps flowing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// Payload carried no bytes
    #[error("telemetry payload is empty")]
    Empty,

    /// Payload is not valid UTF-8
    #[error("telemetry payload is not valid UTF-8: {reason}")]
    InvalidUtf8 {
        /// Decoder message
        reason: String,
    },

    /// Payload is not a JSON object with numeric fields
    #[error("malformed telemetry payload: {reason}")]
    Malformed {
        /// Decoder message
        reason: String,
    },
}

impl DecodeError {
    /// Get the error severity.
    pub fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Warning
    }

    /// Create an invalid UTF-8 error.
    pub fn invalid_utf8(reason: impl ToString) -> Self {
        DecodeError::InvalidUtf8 {
            reason: reason.to_string(),
        }
    }

    /// Create a malformed payload error.
    pub fn malformed(reason: impl ToString) -> Self {
        DecodeError::Malformed {
            reason: reason.to_string(),
        }
    }
}
