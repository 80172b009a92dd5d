//! Configuration module for serial_line.
//!
//! This module provides TOML-based configuration with environment variable overrides.
//!
//! # Configuration Resolution
//!
//! Configuration is loaded from the following locations (in order of priority):
//!
//! 1. `SERIAL_LINE_CONFIG` environment variable (explicit path)
//! 2. `./serial-line.toml` (current directory)
//! 3. `serial-line.toml` in the platform config directory
//!    (`~/.config/serial-line/` on Linux)
//! 4. Built-in defaults (no file required)
//!
//! # Environment Overrides
//!
//! The pattern is `SERIAL_LINE_<SECTION>_<KEY>`:
//!
//! - `SERIAL_LINE_PORT_NAME=/dev/ttyUSB0`
//! - `SERIAL_LINE_LINE_BAUD_RATE=115200`
//! - `SERIAL_LINE_IO_READ_TIMEOUT_MS=500`
//! - `SERIAL_LINE_LOGGING_LEVEL=serial_line=debug`
//! - `SERIAL_LINE_LOGGING_FORMAT=compact`
//!
//! # Example
//!
//! ```no_run
//! use serial_line::config::ConfigLoader;
//!
//! # fn main() -> Result<(), serial_line::config::ConfigError> {
//! let loader = ConfigLoader::load()?;
//! let config = loader.config();
//!
//! println!("Port: {:?}", config.port.name);
//! println!("Line: {}", config.line);
//! # Ok(())
//! # }
//! ```

mod error;
mod loader;
mod schema;

pub use error::{ConfigError, ConfigResult};
pub use loader::{
    get_default_config_dir, get_default_config_path, resolve_config_path, ConfigLoader,
};
pub use schema::{Config, IoConfig, LogFormat, LoggingConfig, PortConfig};
