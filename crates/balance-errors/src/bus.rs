//! Message bus errors.
//!
//! Publishing is best-effort and retried by the caller; connecting is the one
//! operation whose failure stops the viewer.

use crate::common::ErrorSeverity;

/// Outbound publish did not reach the broker.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PublishError {
    /// Bus is not connected
    #[error("cannot publish to {topic}: bus disconnected")]
    Disconnected {
        /// Destination topic
        topic: String,
    },

    /// Broker or client refused the message
    #[error("publish to {topic} rejected: {reason}")]
    Rejected {
        /// Destination topic
        topic: String,
        /// Rejection reason
        reason: String,
    },
}

impl PublishError {
    /// Get the error severity.
    pub fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Warning
    }

    /// Topic the failed publish was addressed to.
    pub fn topic(&self) -> &str {
        match self {
            PublishError::Disconnected { topic } | PublishError::Rejected { topic, .. } => topic,
        }
    }

    /// Create a disconnected error.
    pub fn disconnected(topic: impl Into<String>) -> Self {
        PublishError::Disconnected {
            topic: topic.into(),
        }
    }

    /// Create a rejected error.
    pub fn rejected(topic: impl Into<String>, reason: impl Into<String>) -> Self {
        PublishError::Rejected {
            topic: topic.into(),
            reason: reason.into(),
        }
    }
}

/// Bus connection could not be established or was lost.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConnectionError {
    /// Single connection attempt failed
    #[error("broker {broker} unreachable: {reason}")]
    Unreachable {
        /// Broker address
        broker: String,
        /// Failure reason
        reason: String,
    },

    /// All connection attempts failed
    #[error("giving up on broker {broker} after {attempts} attempts")]
    RetriesExhausted {
        /// Broker address
        broker: String,
        /// Attempts made
        attempts: u32,
    },

    /// Subscription could not be registered
    #[error("subscribe to {topic} failed: {reason}")]
    SubscribeFailed {
        /// Topic
        topic: String,
        /// Failure reason
        reason: String,
    },
}

impl ConnectionError {
    /// Get the error severity.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ConnectionError::Unreachable { .. } => ErrorSeverity::Error,
            ConnectionError::RetriesExhausted { .. } | ConnectionError::SubscribeFailed { .. } => {
                ErrorSeverity::Critical
            }
        }
    }

    /// Check if another connection attempt might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ConnectionError::Unreachable { .. })
    }

    /// Create an unreachable error.
    pub fn unreachable(broker: impl Into<String>, reason: impl Into<String>) -> Self {
        ConnectionError::Unreachable {
            broker: broker.into(),
            reason: reason.into(),
        }
    }

    /// Create a retries exhausted error.
    pub fn retries_exhausted(broker: impl Into<String>, attempts: u32) -> Self {
        ConnectionError::RetriesExhausted {
            broker: broker.into(),
            attempts,
        }
    }

    /// Create a subscribe failure.
    pub fn subscribe_failed(topic: impl Into<String>, reason: impl Into<String>) -> Self {
        ConnectionError::SubscribeFailed {
            topic: topic.into(),
            reason: reason.into(),
        }
    }
}
