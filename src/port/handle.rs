//! Port handle: the open/closed state machine and line parameter access.
//!
//! A [`PortHandle`] starts closed. `open` acquires the device, snapshots its
//! attribute block and switches it to a raw baseline; `close` puts the
//! snapshot back and releases the device. Dropping an open handle closes it.
//!
//! Every getter re-reads the attribute block from the device, and every
//! setter is a read-modify-write of that block, so changes made to the line
//! by other processes are always visible.

use super::attributes::LineAttributes;
use super::error::{PortError, PortResult};
use super::params::{BaudRate, CharSize, FlowControl, LineSettings, Parity, StopBits};
use super::traits::{Backend, LineDevice};
use super::tty::Tty;
use std::fmt;
use std::io;
use tracing::{debug, info, warn};

/// State held only while the port is open.
struct Session<D> {
    device: D,
    /// Attributes captured at open, restored at close. Never modified.
    saved: LineAttributes,
}

/// One serial line session.
pub struct PortHandle<B: Backend = Tty> {
    name: String,
    backend: B,
    session: Option<Session<B::Device>>,
}

impl PortHandle<Tty> {
    /// Create a closed handle for the terminal device at `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_backend(name, Tty)
    }
}

impl<B: Backend> PortHandle<B> {
    /// Create a closed handle that opens `name` through `backend`.
    pub fn with_backend(name: impl Into<String>, backend: B) -> Self {
        Self {
            name: name.into(),
            backend,
            session: None,
        }
    }

    /// The device identifier this handle was created with.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether a device session is held.
    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    /// Open the device and apply the raw baseline configuration.
    ///
    /// The baseline leaves baud rate and framing as the device had them;
    /// callers normally follow up with the parameter setters (or use
    /// [`SerialPort::open`](crate::SerialPort::open), which does).
    pub fn open(&mut self) -> PortResult<()> {
        if self.is_open() {
            return Err(PortError::AlreadyOpen);
        }

        let mut device = self
            .backend
            .open_device(&self.name)
            .map_err(PortError::OpenFailed)?;

        let saved = device.get_attributes().map_err(PortError::OpenFailed)?;

        let mut baseline = saved;
        baseline.make_raw_baseline();
        device
            .set_attributes(&baseline)
            .map_err(PortError::OpenFailed)?;

        if let Err(e) = device.bind_async_owner(std::process::id()) {
            if let Err(restore) = device.set_attributes(&saved) {
                warn!(port = %self.name, error = %restore, "failed to restore settings after aborted open");
            }
            return Err(PortError::OpenFailed(e));
        }

        info!(port = %self.name, "serial port opened");
        self.session = Some(Session { device, saved });
        Ok(())
    }

    /// Restore the settings captured at open and release the device.
    ///
    /// A failed restore is logged, not reported; the device is released
    /// either way.
    pub fn close(&mut self) -> PortResult<()> {
        let Session { mut device, saved } = self.session.take().ok_or(PortError::NotOpen)?;

        if let Err(e) = device.set_attributes(&saved) {
            warn!(port = %self.name, error = %e, "failed to restore original line settings");
        }
        drop(device);

        info!(port = %self.name, "serial port closed");
        Ok(())
    }

    /// Set input and output speed. A rejected speed is `UnsupportedBaudRate`.
    pub fn set_baud_rate(&mut self, rate: BaudRate) -> PortResult<()> {
        let device = self.device_mut()?;
        let mut attributes = device.get_attributes()?;
        attributes
            .set_baud_rate(rate)
            .map_err(|e| PortError::unsupported_baud(format!("{} bps: {}", rate, e)))?;
        device
            .set_attributes(&attributes)
            .map_err(|e| PortError::unsupported_baud(format!("{} bps: {}", rate, e)))?;
        debug!(port = %self.name, %rate, "baud rate set");
        Ok(())
    }

    /// The current input speed.
    pub fn baud_rate(&self) -> PortResult<BaudRate> {
        self.read_attributes()?.baud_rate().ok_or_else(|| {
            PortError::Io(io::Error::new(io::ErrorKind::InvalidData, "Unknown baud rate"))
        })
    }

    /// Set the number of data bits per character.
    pub fn set_char_size(&mut self, size: CharSize) -> PortResult<()> {
        self.modify_attributes(|attributes| attributes.set_char_size(size))?;
        debug!(port = %self.name, %size, "character size set");
        Ok(())
    }

    /// The current character size.
    pub fn char_size(&self) -> PortResult<CharSize> {
        Ok(self.read_attributes()?.char_size())
    }

    /// Set the parity mode.
    pub fn set_parity(&mut self, parity: Parity) -> PortResult<()> {
        self.modify_attributes(|attributes| attributes.set_parity(parity))?;
        debug!(port = %self.name, %parity, "parity set");
        Ok(())
    }

    /// The current parity mode.
    pub fn parity(&self) -> PortResult<Parity> {
        Ok(self.read_attributes()?.parity())
    }

    /// Set the number of stop bits.
    pub fn set_stop_bits(&mut self, stop_bits: StopBits) -> PortResult<()> {
        self.modify_attributes(|attributes| attributes.set_stop_bits(stop_bits))?;
        debug!(port = %self.name, %stop_bits, "stop bits set");
        Ok(())
    }

    /// The current number of stop bits.
    pub fn stop_bits(&self) -> PortResult<StopBits> {
        Ok(self.read_attributes()?.stop_bits())
    }

    /// Enable or disable hardware flow control.
    pub fn set_flow_control(&mut self, flow_control: FlowControl) -> PortResult<()> {
        self.modify_attributes(|attributes| attributes.set_flow_control(flow_control))?;
        debug!(port = %self.name, %flow_control, "flow control set");
        Ok(())
    }

    /// The current flow control mode.
    pub fn flow_control(&self) -> PortResult<FlowControl> {
        Ok(self.read_attributes()?.flow_control())
    }

    /// Apply all five parameters: baud rate, character size, parity, stop
    /// bits, then flow control. Stops at the first failure.
    pub fn apply_settings(&mut self, settings: &LineSettings) -> PortResult<()> {
        self.set_baud_rate(settings.baud_rate)?;
        self.set_char_size(settings.char_size)?;
        self.set_parity(settings.parity)?;
        self.set_stop_bits(settings.stop_bits)?;
        self.set_flow_control(settings.flow_control)
    }

    /// Read back all five parameters from a single attribute snapshot.
    pub fn line_settings(&self) -> PortResult<LineSettings> {
        let attributes = self.read_attributes()?;
        Ok(LineSettings {
            baud_rate: attributes.baud_rate().ok_or_else(|| {
                PortError::Io(io::Error::new(io::ErrorKind::InvalidData, "Unknown baud rate"))
            })?,
            char_size: attributes.char_size(),
            parity: attributes.parity(),
            stop_bits: attributes.stop_bits(),
            flow_control: attributes.flow_control(),
        })
    }

    pub(crate) fn device(&self) -> PortResult<&B::Device> {
        self.session
            .as_ref()
            .map(|session| &session.device)
            .ok_or(PortError::NotOpen)
    }

    pub(crate) fn device_mut(&mut self) -> PortResult<&mut B::Device> {
        self.session
            .as_mut()
            .map(|session| &mut session.device)
            .ok_or(PortError::NotOpen)
    }

    pub(crate) fn read_attributes(&self) -> PortResult<LineAttributes> {
        Ok(self.device()?.get_attributes()?)
    }

    /// Read-modify-write of the attribute block for a framing parameter.
    /// A rejected write is an invalid argument.
    fn modify_attributes(&mut self, change: impl FnOnce(&mut LineAttributes)) -> PortResult<()> {
        let device = self.device_mut()?;
        let mut attributes = device.get_attributes()?;
        change(&mut attributes);
        device
            .set_attributes(&attributes)
            .map_err(|e| PortError::invalid_argument(e.to_string()))
    }
}

impl<B: Backend> Drop for PortHandle<B> {
    fn drop(&mut self) {
        if self.is_open() {
            if let Err(e) = self.close() {
                warn!(port = %self.name, error = %e, "failed to close serial port on drop");
            }
        }
    }
}

impl<B: Backend> fmt::Debug for PortHandle<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PortHandle")
            .field("name", &self.name)
            .field("is_open", &self.is_open())
            .finish()
    }
}
