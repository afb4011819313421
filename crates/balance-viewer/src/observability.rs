//! Structured logging setup.

use balance_errors::ViewerError;
use tracing::info;

/// Logging configuration for embedders that do not install their own subscriber.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Default level when `RUST_LOG` is not set
    pub level: tracing::Level,
    /// Include the event target (module path)
    pub with_target: bool,
    /// Include thread ids and names
    pub with_threads: bool,
    /// Emit ANSI colour codes
    pub ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: tracing::Level::INFO,
            with_target: true,
            with_threads: false,
            ansi: true,
        }
    }
}

/// Install a global `tracing` subscriber.
///
/// `RUST_LOG` takes precedence over [`LoggingConfig::level`].
///
/// # Errors
///
/// Returns [`ViewerError::Other`] when a global subscriber is already set.
pub fn init_logging(config: LoggingConfig) -> Result<(), ViewerError> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.to_string()));

    let fmt_layer = fmt::layer()
        .with_target(config.with_target)
        .with_thread_ids(config.with_threads)
        .with_thread_names(config.with_threads)
        .with_ansi(config.ansi);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| ViewerError::other(format!("logging already initialized: {e}")))?;

    info!(
        level = %config.level,
        with_target = config.with_target,
        with_threads = config.with_threads,
        "Structured logging initialized"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_an_error_not_a_panic() {
        let config = LoggingConfig {
            ansi: false,
            ..LoggingConfig::default()
        };
        // Another test may have installed a subscriber first; either way the
        // second call must fail cleanly.
        let _first = init_logging(config.clone());
        assert!(matches!(init_logging(config), Err(ViewerError::Other(_))));
    }
}
