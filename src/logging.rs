//! Subscriber setup for binaries and demos.
//!
//! The library only emits `tracing` events; installing a subscriber is left
//! to the application, which can call [`init`] with its [`LoggingConfig`].

use crate::config::{ConfigError, ConfigResult, LogFormat, LoggingConfig};
use tracing_subscriber::EnvFilter;

/// Build the event filter. `RUST_LOG` takes precedence over the configured
/// level when it is set.
pub fn env_filter(config: &LoggingConfig) -> ConfigResult<EnvFilter> {
    match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(directives) if !directives.trim().is_empty() => EnvFilter::try_new(&directives)
            .map_err(|e| ConfigError::env(EnvFilter::DEFAULT_ENV, e.to_string())),
        _ => EnvFilter::try_new(&config.level)
            .map_err(|e| ConfigError::invalid("logging.level", e.to_string())),
    }
}

/// Install the global fmt subscriber.
///
/// Fails if the filter is malformed or a global subscriber is already set.
pub fn init(config: &LoggingConfig) -> ConfigResult<()> {
    let filter = env_filter(config)?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let result = match config.format {
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
    };
    result.map_err(|e| ConfigError::Logging(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_configured_level_used_without_rust_log() {
        std::env::remove_var("RUST_LOG");
        let config = LoggingConfig {
            level: "serial_line=debug".to_string(),
            format: LogFormat::Compact,
        };
        let filter = env_filter(&config).unwrap();
        assert!(filter.to_string().contains("serial_line=debug"));
    }

    #[test]
    #[serial]
    fn test_rust_log_wins() {
        std::env::set_var("RUST_LOG", "warn");
        let filter = env_filter(&LoggingConfig::default()).unwrap();
        std::env::remove_var("RUST_LOG");
        assert_eq!(filter.to_string(), "warn");
    }
}
