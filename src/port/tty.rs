//! Terminal device backend.
//!
//! Opens character devices such as `/dev/ttyUSB0` and drives them through
//! termios, `FIONREAD` and `F_SETOWN`.

use super::attributes::LineAttributes;
use super::traits::{Backend, LineDevice};
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::{AsRawFd, RawFd};

/// Backend that opens real terminal devices.
#[derive(Debug, Clone, Copy, Default)]
pub struct Tty;

impl Backend for Tty {
    type Device = TtyDevice;

    fn open_device(&self, name: &str) -> io::Result<TtyDevice> {
        TtyDevice::open(name)
    }
}

/// An open terminal device. Dropping it closes the descriptor.
#[derive(Debug)]
pub struct TtyDevice {
    file: File,
}

impl TtyDevice {
    /// Open `path` read-write without acquiring it as controlling terminal.
    ///
    /// The descriptor stays in blocking mode so `VMIN`/`VTIME` govern reads.
    pub fn open(path: &str) -> io::Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_NOCTTY)
            .open(path)?;
        Ok(Self { file })
    }

    fn fd(&self) -> RawFd {
        self.file.as_raw_fd()
    }
}

impl LineDevice for TtyDevice {
    fn get_attributes(&self) -> io::Result<LineAttributes> {
        let mut raw = *LineAttributes::zeroed().as_raw();
        // SAFETY: the descriptor is owned by `self.file` and `raw` is a
        // valid termios for the call to fill in.
        if unsafe { libc::tcgetattr(self.fd(), &mut raw) } < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(LineAttributes::from_raw(raw))
    }

    fn set_attributes(&mut self, attributes: &LineAttributes) -> io::Result<()> {
        // SAFETY: the descriptor is owned by `self.file`; the termios is only
        // read.
        if unsafe { libc::tcsetattr(self.fd(), libc::TCSANOW, attributes.as_raw()) } < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    fn bytes_pending(&self) -> io::Result<usize> {
        let mut count: libc::c_int = 0;
        // SAFETY: FIONREAD writes a single c_int through the pointer.
        if unsafe { libc::ioctl(self.fd(), libc::FIONREAD, &mut count as *mut libc::c_int) } < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(count.max(0) as usize)
    }

    fn read_bytes(&mut self, buffer: &mut [u8]) -> io::Result<usize> {
        self.file.read(buffer)
    }

    fn write_bytes(&mut self, data: &[u8]) -> io::Result<usize> {
        self.file.write(data)
    }

    fn bind_async_owner(&mut self, pid: u32) -> io::Result<()> {
        // SAFETY: F_SETOWN takes the owning pid as its only argument.
        if unsafe { libc::fcntl(self.fd(), libc::F_SETOWN, pid as libc::pid_t) } < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}

impl AsRawFd for TtyDevice {
    fn as_raw_fd(&self) -> RawFd {
        self.fd()
    }
}
