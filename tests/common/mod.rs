//! Shared test utilities for serial_line integration tests.
//!
//! - Mock-backed ports that are already open
//! - A pseudo-terminal pair standing in for a cabled device

#![allow(dead_code)]

use serial_line::{LineSettings, MockLine, PortHandle, SerialPort};
use std::fs::File;
use std::io::{self, Read, Write};
use std::os::unix::io::{FromRawFd, RawFd};

/// Open a `PortHandle` on a fresh mock line.
pub fn open_mock_handle(name: &str) -> (MockLine, PortHandle<MockLine>) {
    let line = MockLine::new();
    let mut port = PortHandle::with_backend(name, line.clone());
    port.open().expect("mock open");
    (line, port)
}

/// Open a `SerialPort` on a fresh mock line with default settings.
pub fn open_mock_port(name: &str) -> (MockLine, SerialPort<MockLine>) {
    let line = MockLine::new();
    let mut port = SerialPort::with_backend(name, line.clone());
    port.open(&LineSettings::default()).expect("mock open");
    (line, port)
}

/// A pseudo-terminal pair. The port under test opens `slave_path`; the test
/// plays the remote device through `master`.
pub struct PtyPair {
    pub master: File,
    pub slave_path: String,
    /// Held so the slave side never hangs up between port sessions.
    _slave: File,
}

impl PtyPair {
    pub fn open() -> io::Result<Self> {
        let mut master: libc::c_int = -1;
        let mut slave: libc::c_int = -1;
        // SAFETY: both out-pointers are valid; name, termios and winsize are
        // optional and passed as null.
        let rc = unsafe {
            libc::openpty(
                &mut master,
                &mut slave,
                std::ptr::null_mut(),
                std::ptr::null_mut(),
                std::ptr::null_mut(),
            )
        };
        if rc < 0 {
            return Err(io::Error::last_os_error());
        }

        // SAFETY: openpty handed us ownership of both descriptors.
        let (master, slave_file) = unsafe { (File::from_raw_fd(master), File::from_raw_fd(slave)) };
        let slave_path = tty_name(slave)?;

        Ok(Self {
            master,
            slave_path,
            _slave: slave_file,
        })
    }

    /// Send bytes towards the port.
    pub fn send(&mut self, data: &[u8]) {
        self.master.write_all(data).expect("write to pty master");
        self.master.flush().expect("flush pty master");
    }

    /// Receive exactly `count` bytes the port wrote.
    pub fn receive(&mut self, count: usize) -> Vec<u8> {
        let mut data = vec![0u8; count];
        self.master
            .read_exact(&mut data)
            .expect("read from pty master");
        data
    }
}

fn tty_name(fd: RawFd) -> io::Result<String> {
    let mut buffer = [0 as libc::c_char; 128];
    // SAFETY: the buffer is writable for its full length.
    let rc = unsafe { libc::ttyname_r(fd, buffer.as_mut_ptr(), buffer.len()) };
    if rc != 0 {
        return Err(io::Error::from_raw_os_error(rc));
    }
    // SAFETY: ttyname_r NUL-terminates on success.
    let name = unsafe { std::ffi::CStr::from_ptr(buffer.as_ptr()) };
    Ok(name.to_string_lossy().into_owned())
}
