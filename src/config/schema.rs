//! Configuration schema definitions.
//!
//! Every section carries `#[serde(default)]`, so a file only needs the keys
//! it wants to change.

use super::error::{ConfigError, ConfigResult};
use crate::port::{LineSettings, MAX_READ_TIMEOUT_MS};
use serde::{Deserialize, Serialize};

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Which device to open
    pub port: PortConfig,
    /// Line parameters applied after open
    pub line: LineSettings,
    /// Read behaviour
    pub io: IoConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Config {
    /// Check every value a port or the logger would reject later.
    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(name) = &self.port.name {
            if name.trim().is_empty() {
                return Err(ConfigError::invalid("port.name", "must not be empty"));
            }
        }
        self.io.validate()?;
        self.logging.validate()
    }

    /// The configured device name.
    pub fn port_name(&self) -> ConfigResult<&str> {
        self.port
            .name
            .as_deref()
            .ok_or_else(|| ConfigError::Missing("port.name".to_string()))
    }
}

/// Port section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortConfig {
    /// Device path, e.g. `/dev/ttyUSB0`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Read behaviour section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IoConfig {
    /// Per-byte read timeout in milliseconds; 0 blocks
    pub read_timeout_ms: u32,
    /// Line terminator, exactly one byte
    pub line_terminator: String,
    /// Upper bound for a single line read
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_line_length: Option<usize>,
}

impl Default for IoConfig {
    fn default() -> Self {
        Self {
            read_timeout_ms: 1000,
            line_terminator: "\n".to_string(),
            max_line_length: None,
        }
    }
}

impl IoConfig {
    /// The terminator as a single byte, as `SerialPort::read_configured_line`
    /// passes it to the line reader.
    pub fn terminator_byte(&self) -> ConfigResult<u8> {
        match self.line_terminator.as_bytes() {
            [byte] => Ok(*byte),
            _ => Err(ConfigError::invalid(
                "io.line_terminator",
                format!(
                    "must be exactly one byte, got {:?}",
                    self.line_terminator
                ),
            )),
        }
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.read_timeout_ms > MAX_READ_TIMEOUT_MS {
            return Err(ConfigError::invalid(
                "io.read_timeout_ms",
                format!("must be at most {}", MAX_READ_TIMEOUT_MS),
            ));
        }
        self.terminator_byte()?;
        if self.max_line_length == Some(0) {
            return Err(ConfigError::invalid(
                "io.max_line_length",
                "must be greater than zero",
            ));
        }
        Ok(())
    }
}

/// Logging configuration section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive: "info", "serial_line=debug", ...
    pub level: String,
    /// Log format: "pretty" or "compact"
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl LoggingConfig {
    fn validate(&self) -> ConfigResult<()> {
        tracing_subscriber::EnvFilter::try_new(&self.level)
            .map(|_| ())
            .map_err(|e| ConfigError::invalid("logging.level", e.to_string()))
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Pretty format with colors
    Pretty,
    /// Compact format
    Compact,
}

impl Default for LogFormat {
    fn default() -> Self {
        Self::Pretty
    }
}
