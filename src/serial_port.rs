//! Serial port facade.
//!
//! [`SerialPort`] is the type applications hold. It forwards to a
//! [`PortHandle`] and adds the conveniences built on top of it: opening with
//! a full set of line parameters, line reads, and string writes.
//!
//! ```no_run
//! use serial_line::{LineSettings, SerialPort};
//!
//! # fn main() -> Result<(), serial_line::PortError> {
//! let mut port = SerialPort::new("/dev/ttyUSB0");
//! port.open(&LineSettings::default())?;
//! port.write_str("AT\r")?;
//! let reply = port.read_line(1000, b'\n')?;
//! println!("{}", String::from_utf8_lossy(&reply));
//! # Ok(())
//! # }
//! ```

use crate::config::IoConfig;
use crate::port::{
    Backend, BaudRate, CharSize, FlowControl, LineSettings, Parity, PortError, PortHandle,
    PortResult, StopBits, Tty,
};
use tracing::{info, warn};

/// A serial line session.
#[derive(Debug)]
pub struct SerialPort<B: Backend = Tty> {
    inner: PortHandle<B>,
}

impl SerialPort<Tty> {
    /// Create a closed port for the terminal device at `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            inner: PortHandle::new(name),
        }
    }
}

impl<B: Backend> SerialPort<B> {
    /// Create a closed port that opens `name` through `backend`.
    pub fn with_backend(name: impl Into<String>, backend: B) -> Self {
        Self {
            inner: PortHandle::with_backend(name, backend),
        }
    }

    /// The device identifier this port was created with.
    pub fn name(&self) -> &str {
        self.inner.name()
    }

    /// Open the port and apply `settings`.
    ///
    /// If any parameter is rejected the port is closed again before the
    /// error is returned, so a failed `open` never leaves a half-configured
    /// session behind.
    pub fn open(&mut self, settings: &LineSettings) -> PortResult<()> {
        self.inner.open()?;
        if let Err(e) = self.inner.apply_settings(settings) {
            warn!(port = %self.name(), error = %e, "line settings rejected, closing port");
            if let Err(close_err) = self.inner.close() {
                warn!(port = %self.name(), error = %close_err, "close after failed open");
            }
            return Err(e);
        }
        info!(port = %self.name(), %settings, "serial port configured");
        Ok(())
    }

    /// Open the port with only the raw baseline applied.
    pub fn open_raw(&mut self) -> PortResult<()> {
        self.inner.open()
    }

    /// Restore the saved settings and release the device.
    pub fn close(&mut self) -> PortResult<()> {
        self.inner.close()
    }

    /// Whether a device session is held.
    pub fn is_open(&self) -> bool {
        self.inner.is_open()
    }

    /// Set input and output speed.
    pub fn set_baud_rate(&mut self, rate: BaudRate) -> PortResult<()> {
        self.inner.set_baud_rate(rate)
    }

    /// The current input speed.
    pub fn baud_rate(&self) -> PortResult<BaudRate> {
        self.inner.baud_rate()
    }

    /// Set the number of data bits per character.
    pub fn set_char_size(&mut self, size: CharSize) -> PortResult<()> {
        self.inner.set_char_size(size)
    }

    /// The current character size.
    pub fn char_size(&self) -> PortResult<CharSize> {
        self.inner.char_size()
    }

    /// Set the parity mode.
    pub fn set_parity(&mut self, parity: Parity) -> PortResult<()> {
        self.inner.set_parity(parity)
    }

    /// The current parity mode.
    pub fn parity(&self) -> PortResult<Parity> {
        self.inner.parity()
    }

    /// Set the number of stop bits.
    pub fn set_stop_bits(&mut self, stop_bits: StopBits) -> PortResult<()> {
        self.inner.set_stop_bits(stop_bits)
    }

    /// The current number of stop bits.
    pub fn stop_bits(&self) -> PortResult<StopBits> {
        self.inner.stop_bits()
    }

    /// Enable or disable hardware flow control.
    pub fn set_flow_control(&mut self, flow_control: FlowControl) -> PortResult<()> {
        self.inner.set_flow_control(flow_control)
    }

    /// The current flow control mode.
    pub fn flow_control(&self) -> PortResult<FlowControl> {
        self.inner.flow_control()
    }

    /// Apply all five line parameters, stopping at the first failure.
    pub fn apply_settings(&mut self, settings: &LineSettings) -> PortResult<()> {
        self.inner.apply_settings(settings)
    }

    /// Read back all five line parameters.
    pub fn line_settings(&self) -> PortResult<LineSettings> {
        self.inner.line_settings()
    }

    /// Whether received bytes are waiting to be read.
    pub fn is_data_available(&self) -> PortResult<bool> {
        self.inner.is_data_available()
    }

    /// Read one byte, waiting at most `timeout_ms`.
    pub fn read_byte(&mut self, timeout_ms: u32) -> PortResult<u8> {
        self.inner.read_byte(timeout_ms)
    }

    /// See [`PortHandle::read`].
    pub fn read(&mut self, count: usize, timeout_ms: u32) -> PortResult<Vec<u8>> {
        self.inner.read(count, timeout_ms)
    }

    /// Read bytes until `terminator` arrives, and return them including the
    /// terminator.
    ///
    /// Each byte gets its own `timeout_ms`, so the call as a whole is
    /// unbounded while data keeps flowing. Use
    /// [`read_line_bounded`](Self::read_line_bounded) to cap the length.
    pub fn read_line(&mut self, timeout_ms: u32, terminator: u8) -> PortResult<Vec<u8>> {
        let mut line = Vec::new();
        loop {
            let byte = self.inner.read_byte(timeout_ms)?;
            line.push(byte);
            if byte == terminator {
                return Ok(line);
            }
        }
    }

    /// Like [`read_line`](Self::read_line), but fails with
    /// [`PortError::LineTooLong`] once `max_len` bytes have been read without
    /// seeing the terminator.
    pub fn read_line_bounded(
        &mut self,
        timeout_ms: u32,
        terminator: u8,
        max_len: usize,
    ) -> PortResult<Vec<u8>> {
        if max_len == 0 {
            return Err(PortError::invalid_argument("line length limit must be non-zero"));
        }
        let mut line = Vec::new();
        while line.len() < max_len {
            let byte = self.inner.read_byte(timeout_ms)?;
            line.push(byte);
            if byte == terminator {
                return Ok(line);
            }
        }
        Err(PortError::LineTooLong(max_len))
    }

    /// Read one line the way the `[io]` configuration section describes:
    /// its per-byte timeout, its terminator and, when `max_line_length` is
    /// set, its length bound.
    pub fn read_configured_line(&mut self, io: &IoConfig) -> PortResult<Vec<u8>> {
        let terminator = io
            .terminator_byte()
            .map_err(|e| PortError::invalid_argument(e.to_string()))?;
        match io.max_line_length {
            Some(max_len) => self.read_line_bounded(io.read_timeout_ms, terminator, max_len),
            None => self.read_line(io.read_timeout_ms, terminator),
        }
    }

    /// Write a single byte.
    pub fn write_byte(&mut self, byte: u8) -> PortResult<()> {
        self.inner.write_byte(byte)
    }

    /// Write every byte of `data`.
    pub fn write(&mut self, data: &[u8]) -> PortResult<()> {
        self.inner.write(data)
    }

    /// Write the UTF-8 bytes of `data`.
    pub fn write_str(&mut self, data: &str) -> PortResult<()> {
        self.inner.write(data.as_bytes())
    }
}
