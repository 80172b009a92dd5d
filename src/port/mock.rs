//! Mock serial line for testing.
//!
//! `MockLine` is a [`Backend`] whose devices live in memory. A test keeps a
//! clone of the `MockLine` to feed receive data, script faults and inspect
//! what the port did to the device.
//!
//! Reads never block: an empty receive queue behaves like an expired device
//! timer and returns `Ok(0)`.

use super::attributes::LineAttributes;
use super::params::BaudRate;
use super::traits::{Backend, LineDevice};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::io;
use std::sync::Arc;

/// A scripted outcome for the next read or write call on a mock device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFault {
    /// The call reports `WouldBlock` and makes no progress.
    WouldBlock,
    /// The call fails with an error of this kind.
    Error(io::ErrorKind),
    /// A write accepts at most this many bytes.
    ShortWrite(usize),
}

#[derive(Debug, Default)]
struct MockLineState {
    /// Attribute block as the "driver" currently holds it.
    attributes: LineAttributes,
    /// Bytes waiting to be read.
    rx: VecDeque<u8>,
    /// Every successful write call, in order.
    write_log: Vec<Vec<u8>>,
    read_faults: VecDeque<MockFault>,
    write_faults: VecDeque<MockFault>,
    open_error: Option<io::ErrorKind>,
    fail_get_attributes: bool,
    reject_attributes: bool,
    rejected_baud: Option<BaudRate>,
    fail_bind_owner: bool,
    device_open: bool,
    opened_names: Vec<String>,
    owner: Option<u32>,
    attribute_reads: usize,
    attribute_writes: usize,
    read_calls: usize,
    write_calls: usize,
}

/// In-memory serial line backend.
///
/// # Example
/// ```
/// use serial_line::port::{MockLine, PortHandle};
///
/// let line = MockLine::new();
/// line.enqueue_read(b"OK\r\n");
///
/// let mut port = PortHandle::with_backend("MOCK0", line.clone());
/// port.open().unwrap();
/// assert_eq!(port.read(4, 100).unwrap(), b"OK\r\n");
///
/// port.write(b"AT\r").unwrap();
/// assert_eq!(line.written(), b"AT\r");
/// ```
#[derive(Clone, Debug, Default)]
pub struct MockLine {
    state: Arc<Mutex<MockLineState>>,
}

impl MockLine {
    /// A closed mock line with an empty receive queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append bytes to the receive queue.
    pub fn enqueue_read(&self, data: &[u8]) {
        self.state.lock().rx.extend(data);
    }

    /// Script the outcome of an upcoming read call.
    pub fn push_read_fault(&self, fault: MockFault) {
        self.state.lock().read_faults.push_back(fault);
    }

    /// Script the outcome of an upcoming write call.
    pub fn push_write_fault(&self, fault: MockFault) {
        self.state.lock().write_faults.push_back(fault);
    }

    /// Make the next open attempts fail with `kind`, or succeed again.
    pub fn set_open_error(&self, kind: Option<io::ErrorKind>) {
        self.state.lock().open_error = kind;
    }

    /// Make attribute reads fail.
    pub fn set_fail_get_attributes(&self, fail: bool) {
        self.state.lock().fail_get_attributes = fail;
    }

    /// Make every attribute write fail with `EINVAL`.
    pub fn set_reject_attributes(&self, reject: bool) {
        self.state.lock().reject_attributes = reject;
    }

    /// Make attribute writes carrying this speed fail with `EINVAL`.
    pub fn set_rejected_baud(&self, rate: Option<BaudRate>) {
        self.state.lock().rejected_baud = rate;
    }

    /// Make binding the async I/O owner fail.
    pub fn set_fail_bind_owner(&self, fail: bool) {
        self.state.lock().fail_bind_owner = fail;
    }

    /// Change the line behind the port's back, as another process would.
    pub fn modify_attributes(&self, f: impl FnOnce(&mut LineAttributes)) {
        f(&mut self.state.lock().attributes);
    }

    /// The attribute block currently held by the device.
    pub fn attributes(&self) -> LineAttributes {
        self.state.lock().attributes
    }

    /// All bytes written so far, concatenated.
    pub fn written(&self) -> Vec<u8> {
        self.state.lock().write_log.concat()
    }

    /// Each successful write call's payload.
    pub fn write_log(&self) -> Vec<Vec<u8>> {
        self.state.lock().write_log.clone()
    }

    /// Bytes still queued for reading.
    pub fn available_bytes(&self) -> usize {
        self.state.lock().rx.len()
    }

    /// Whether a device handed out by this line is still held.
    pub fn is_device_open(&self) -> bool {
        self.state.lock().device_open
    }

    /// Every name the line has been opened with, in order.
    pub fn opened_names(&self) -> Vec<String> {
        self.state.lock().opened_names.clone()
    }

    /// The pid bound as async owner, if any.
    pub fn owner(&self) -> Option<u32> {
        self.state.lock().owner
    }

    /// Number of attribute snapshots taken.
    pub fn attribute_reads(&self) -> usize {
        self.state.lock().attribute_reads
    }

    /// Number of attribute writes attempted.
    pub fn attribute_writes(&self) -> usize {
        self.state.lock().attribute_writes
    }

    /// Number of device read calls.
    pub fn read_calls(&self) -> usize {
        self.state.lock().read_calls
    }

    /// Number of device write calls.
    pub fn write_calls(&self) -> usize {
        self.state.lock().write_calls
    }

    /// Total calls made on devices from this line, open excluded.
    pub fn device_calls(&self) -> usize {
        let state = self.state.lock();
        state.attribute_reads + state.attribute_writes + state.read_calls + state.write_calls
    }
}

impl Backend for MockLine {
    type Device = MockDevice;

    fn open_device(&self, name: &str) -> io::Result<MockDevice> {
        let mut state = self.state.lock();
        if let Some(kind) = state.open_error {
            return Err(io::Error::new(kind, format!("cannot open {}", name)));
        }
        state.device_open = true;
        state.opened_names.push(name.to_string());
        Ok(MockDevice {
            state: Arc::clone(&self.state),
        })
    }
}

/// A device handed out by [`MockLine`]. Dropping it marks the line closed.
#[derive(Debug)]
pub struct MockDevice {
    state: Arc<Mutex<MockLineState>>,
}

impl LineDevice for MockDevice {
    fn get_attributes(&self) -> io::Result<LineAttributes> {
        let mut state = self.state.lock();
        state.attribute_reads += 1;
        if state.fail_get_attributes {
            return Err(io::Error::from_raw_os_error(libc::EIO));
        }
        Ok(state.attributes)
    }

    fn set_attributes(&mut self, attributes: &LineAttributes) -> io::Result<()> {
        let mut state = self.state.lock();
        state.attribute_writes += 1;
        let rejected_speed = state.rejected_baud.is_some()
            && attributes.baud_rate() == state.rejected_baud;
        if state.reject_attributes || rejected_speed {
            return Err(io::Error::from_raw_os_error(libc::EINVAL));
        }
        state.attributes = *attributes;
        Ok(())
    }

    fn bytes_pending(&self) -> io::Result<usize> {
        Ok(self.state.lock().rx.len())
    }

    fn read_bytes(&mut self, buffer: &mut [u8]) -> io::Result<usize> {
        let mut state = self.state.lock();
        state.read_calls += 1;
        match state.read_faults.pop_front() {
            Some(MockFault::WouldBlock) => return Err(io::ErrorKind::WouldBlock.into()),
            Some(MockFault::Error(kind)) => return Err(kind.into()),
            Some(MockFault::ShortWrite(_)) | None => {}
        }

        let count = buffer.len().min(state.rx.len());
        for (slot, byte) in buffer.iter_mut().zip(state.rx.drain(..count)) {
            *slot = byte;
        }
        Ok(count)
    }

    fn write_bytes(&mut self, data: &[u8]) -> io::Result<usize> {
        let mut state = self.state.lock();
        state.write_calls += 1;
        let accepted = match state.write_faults.pop_front() {
            Some(MockFault::WouldBlock) => return Err(io::ErrorKind::WouldBlock.into()),
            Some(MockFault::Error(kind)) => return Err(kind.into()),
            Some(MockFault::ShortWrite(limit)) => data.len().min(limit),
            None => data.len(),
        };
        if accepted > 0 {
            state.write_log.push(data[..accepted].to_vec());
        }
        Ok(accepted)
    }

    fn bind_async_owner(&mut self, pid: u32) -> io::Result<()> {
        let mut state = self.state.lock();
        if state.fail_bind_owner {
            return Err(io::Error::from_raw_os_error(libc::EPERM));
        }
        state.owner = Some(pid);
        Ok(())
    }
}

impl Drop for MockDevice {
    fn drop(&mut self) {
        self.state.lock().device_open = false;
    }
}
