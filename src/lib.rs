//! Serial line library
//!
//! Blocking access to Unix serial devices: open and close a port, configure
//! its line parameters, read with per-byte timeouts and write whole buffers.
//!
//! # Modules
//!
//! - `port`: device access, line parameters and the port state machine
//! - `config`: TOML configuration with environment overrides
//! - `logging`: tracing subscriber setup for applications
//!
//! Most applications only need [`SerialPort`]:
//!
//! ```no_run
//! use serial_line::{BaudRate, LineSettings, SerialPort};
//!
//! # fn main() -> Result<(), serial_line::PortError> {
//! let settings = LineSettings {
//!     baud_rate: BaudRate::B115200,
//!     ..LineSettings::default()
//! };
//! let mut port = SerialPort::new("/dev/ttyUSB0");
//! port.open(&settings)?;
//! port.write(b"ping")?;
//! let reply = port.read(4, 1000)?;
//! # let _ = reply;
//! port.close()?;
//! # Ok(())
//! # }
//! ```

#[cfg(not(unix))]
compile_error!("serial_line only supports Unix terminal devices");

pub mod config;
pub mod logging;
pub mod port;
mod serial_port;

pub use port::{
    BaudRate, CharSize, FlowControl, LineSettings, MockLine, Parity, PortError, PortHandle,
    PortResult, StopBits, Tty,
};
pub use serial_port::SerialPort;

// Re-export config types
pub use config::{Config, ConfigError, ConfigLoader, ConfigResult};
