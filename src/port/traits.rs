//! Core traits for the device access surface.
//!
//! `Backend` acquires a device by name; `LineDevice` is the small set of
//! calls the port state machine makes on an acquired device. The real
//! terminal implementation lives in [`tty`](super::tty) and the in-memory one
//! in [`mock`](super::mock). Releasing a device is dropping it.

use super::attributes::LineAttributes;
use std::io;

/// Operations on an acquired serial device.
///
/// Errors are reported as plain `io::Error`s; classifying them into
/// [`PortError`](super::PortError) kinds is the caller's job. A call that
/// could not make progress right now reports `io::ErrorKind::WouldBlock`.
pub trait LineDevice: Send {
    /// Read the current attribute block.
    fn get_attributes(&self) -> io::Result<LineAttributes>;

    /// Apply an attribute block immediately.
    fn set_attributes(&mut self, attributes: &LineAttributes) -> io::Result<()>;

    /// Number of received bytes waiting to be read.
    fn bytes_pending(&self) -> io::Result<usize>;

    /// Read into `buffer`, honouring the device's current read timing.
    ///
    /// `Ok(0)` means the device timer expired with nothing to deliver.
    fn read_bytes(&mut self, buffer: &mut [u8]) -> io::Result<usize>;

    /// Write from `data`, returning how many bytes the device accepted.
    fn write_bytes(&mut self, data: &[u8]) -> io::Result<usize>;

    /// Direct asynchronous I/O signals for this device to process `pid`.
    fn bind_async_owner(&mut self, pid: u32) -> io::Result<()>;
}

/// Something that can open a serial device by name.
pub trait Backend {
    type Device: LineDevice;

    /// Acquire the named device for reading and writing, without making it
    /// the controlling terminal.
    fn open_device(&self, name: &str) -> io::Result<Self::Device>;
}

impl<D: LineDevice + ?Sized> LineDevice for Box<D> {
    fn get_attributes(&self) -> io::Result<LineAttributes> {
        (**self).get_attributes()
    }

    fn set_attributes(&mut self, attributes: &LineAttributes) -> io::Result<()> {
        (**self).set_attributes(attributes)
    }

    fn bytes_pending(&self) -> io::Result<usize> {
        (**self).bytes_pending()
    }

    fn read_bytes(&mut self, buffer: &mut [u8]) -> io::Result<usize> {
        (**self).read_bytes(buffer)
    }

    fn write_bytes(&mut self, data: &[u8]) -> io::Result<usize> {
        (**self).write_bytes(data)
    }

    fn bind_async_owner(&mut self, pid: u32) -> io::Result<()> {
        (**self).bind_async_owner(pid)
    }
}
