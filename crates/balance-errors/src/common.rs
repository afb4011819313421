//! Top-level error type and classification shared by every viewer crate.

use core::fmt;

use crate::{ConnectionError, DecodeError, PublishError};

/// Top-level error that wraps every viewer sub-error.
#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
    /// Inbound telemetry could not be decoded
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Outbound publish failed
    #[error("Publish error: {0}")]
    Publish(#[from] PublishError),

    /// Bus connection failed
    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[source] std::io::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl ViewerError {
    /// Get the error category for classification.
    pub fn category(&self) -> ErrorCategory {
        match self {
            ViewerError::Decode(_) => ErrorCategory::Telemetry,
            ViewerError::Publish(_) | ViewerError::Connection(_) => ErrorCategory::Bus,
            ViewerError::Config(_) => ErrorCategory::Config,
            ViewerError::Io(_) => ErrorCategory::IO,
            ViewerError::Other(_) => ErrorCategory::Other,
        }
    }

    /// Get the error severity level.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ViewerError::Decode(e) => e.severity(),
            ViewerError::Publish(e) => e.severity(),
            ViewerError::Connection(e) => e.severity(),
            ViewerError::Config(_) | ViewerError::Io(_) | ViewerError::Other(_) => {
                ErrorSeverity::Error
            }
        }
    }

    /// Check if the viewer can keep running after this error.
    pub fn is_recoverable(&self) -> bool {
        self.severity() < ErrorSeverity::Critical
    }

    /// Create a configuration error with a message.
    pub fn config(msg: impl Into<String>) -> Self {
        ViewerError::Config(msg.into())
    }

    /// Create a generic error with a message.
    pub fn other(msg: impl Into<String>) -> Self {
        ViewerError::Other(msg.into())
    }
}

impl From<std::io::Error> for ViewerError {
    fn from(e: std::io::Error) -> Self {
        ViewerError::Io(e)
    }
}

/// Error category for classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ErrorCategory {
    /// Inbound telemetry errors
    Telemetry = 0,
    /// Message bus errors
    Bus = 1,
    /// Configuration errors
    Config = 2,
    /// I/O errors
    IO = 3,
    /// Other errors
    Other = 255,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Telemetry => write!(f, "Telemetry"),
            ErrorCategory::Bus => write!(f, "Bus"),
            ErrorCategory::Config => write!(f, "Config"),
            ErrorCategory::IO => write!(f, "IO"),
            ErrorCategory::Other => write!(f, "Other"),
        }
    }
}

/// Error severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum ErrorSeverity {
    /// Informational, no action required
    Info = 0,
    /// Warning, handled locally
    Warning = 1,
    /// Error, operation failed
    Error = 2,
    /// Critical, the viewer cannot continue
    Critical = 3,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// Context attached to an error on its way up.
#[derive(Debug, Clone)]
pub struct ErrorContext {
    /// The operation that was being performed
    pub operation: String,
    /// Additional context key-value pairs
    pub context: Vec<(String, String)>,
}

impl ErrorContext {
    /// Create a new error context for an operation.
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            context: Vec::new(),
        }
    }

    /// Add a context key-value pair.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.push((key.into(), value.into()));
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "operation: {}", self.operation)?;
        for (key, value) in &self.context {
            write!(f, ", {key}: {value}")?;
        }
        Ok(())
    }
}

/// Extension trait for adding context to errors.
pub trait ResultExt<T> {
    /// Add context to an error.
    ///
    /// # Errors
    ///
    /// Returns the underlying error wrapped as [`ViewerError::Other`] with the
    /// context prepended.
    fn context(self, ctx: ErrorContext) -> Result<T, ViewerError>;

    /// Add context with an operation name.
    ///
    /// # Errors
    ///
    /// Same as [`ResultExt::context`].
    fn with_context(self, operation: impl Into<String>) -> Result<T, ViewerError>;
}

impl<T, E: Into<ViewerError>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, ctx: ErrorContext) -> Result<T, ViewerError> {
        self.map_err(|e| {
            let err: ViewerError = e.into();
            match err {
                // Keep the category of config errors intact.
                ViewerError::Config(msg) => ViewerError::Config(format!("{ctx}: {msg}")),
                other => ViewerError::Other(format!("{ctx}: {other}")),
            }
        })
    }

    fn with_context(self, operation: impl Into<String>) -> Result<T, ViewerError> {
        self.context(ErrorContext::new(operation))
    }
}
