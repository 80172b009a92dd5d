//! Timeout-controlled reads.
//!
//! A read request `(count, timeout_ms)` is turned into the terminal's
//! non-canonical read controls right before the read:
//!
//! | timeout_ms | VMIN    | VTIME (deciseconds)  |
//! |------------|---------|----------------------|
//! | 0          | `count` | 0 (block until done) |
//! | > 0        | 0       | `timeout_ms / 100`   |
//!
//! The device timer has 100 ms granularity; timeouts below 100 ms become a
//! zero timer, i.e. a poll of whatever is already buffered.

use super::error::{PortError, PortResult};
use super::handle::PortHandle;
use super::traits::{Backend, LineDevice};
use std::io;
use tracing::{debug, trace};

/// Longest timeout the device timer can express, in milliseconds.
pub const MAX_READ_TIMEOUT_MS: u32 = u8::MAX as u32 * 100;

/// Device-level read controls derived from one read request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadTimeoutRequest {
    min_bytes: u8,
    deciseconds: u8,
}

impl ReadTimeoutRequest {
    /// Translate a caller's request. Values beyond what the terminal fields
    /// hold are saturated.
    pub fn new(count: usize, timeout_ms: u32) -> Self {
        if timeout_ms == 0 {
            Self {
                min_bytes: u8::try_from(count).unwrap_or(u8::MAX),
                deciseconds: 0,
            }
        } else {
            Self {
                min_bytes: 0,
                deciseconds: u8::try_from(timeout_ms / 100).unwrap_or(u8::MAX),
            }
        }
    }

    /// `VMIN`
    pub fn min_bytes(&self) -> u8 {
        self.min_bytes
    }

    /// `VTIME`
    pub fn deciseconds(&self) -> u8 {
        self.deciseconds
    }
}

impl<B: Backend> PortHandle<B> {
    /// Whether received bytes are waiting, without blocking.
    pub fn is_data_available(&self) -> PortResult<bool> {
        Ok(self.device()?.bytes_pending()? > 0)
    }

    /// Read exactly `count` bytes.
    ///
    /// With `count == 0` this drains: it reads one byte at a time for as long
    /// as data is pending and returns what it collected.
    ///
    /// Fails with [`PortError::ReadTimeout`] if the device timer expires
    /// before `count` bytes arrived; the bytes read so far are discarded.
    pub fn read(&mut self, count: usize, timeout_ms: u32) -> PortResult<Vec<u8>> {
        self.device()?;
        if count == 0 {
            return self.drain(timeout_ms);
        }

        self.apply_read_timeout(ReadTimeoutRequest::new(count, timeout_ms))?;

        let device = self.device_mut()?;
        let mut data = Vec::with_capacity(count);
        while data.len() < count {
            match read_one(device)? {
                Some(byte) => data.push(byte),
                None => break,
            }
        }

        if data.len() < count {
            debug!(
                port = %self.name(),
                wanted = count,
                got = data.len(),
                timeout_ms,
                "read timed out"
            );
            return Err(PortError::ReadTimeout);
        }

        trace!(port = %self.name(), ?data, "read complete");
        Ok(data)
    }

    /// Read a single byte.
    pub fn read_byte(&mut self, timeout_ms: u32) -> PortResult<u8> {
        let data = self.read(1, timeout_ms)?;
        data.first().copied().ok_or(PortError::ReadTimeout)
    }

    fn drain(&mut self, timeout_ms: u32) -> PortResult<Vec<u8>> {
        let mut data = Vec::new();
        while self.is_data_available()? {
            data.push(self.read_byte(timeout_ms)?);
        }
        trace!(port = %self.name(), drained = data.len(), "drained pending input");
        Ok(data)
    }

    fn apply_read_timeout(&mut self, request: ReadTimeoutRequest) -> PortResult<()> {
        let device = self.device_mut()?;
        let mut attributes = device.get_attributes()?;
        if attributes.read_timing() == (request.min_bytes, request.deciseconds) {
            return Ok(());
        }
        attributes.set_read_timing(request.min_bytes, request.deciseconds);
        device.set_attributes(&attributes)?;
        trace!(
            port = %self.name(),
            vmin = request.min_bytes,
            vtime = request.deciseconds,
            "read timing updated"
        );
        Ok(())
    }
}

/// One byte from the device, or `None` when its timer expired.
/// Would-block is retried for the same byte.
fn read_one<D: LineDevice>(device: &mut D) -> PortResult<Option<u8>> {
    let mut byte = [0u8; 1];
    loop {
        match device.read_bytes(&mut byte) {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(byte[0])),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                trace!("read would block, retrying");
            }
            Err(e) => return Err(PortError::Io(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::mock::{MockFault, MockLine};

    fn open_mock() -> (MockLine, PortHandle<MockLine>) {
        let line = MockLine::new();
        let mut port = PortHandle::with_backend("MOCK0", line.clone());
        port.open().unwrap();
        (line, port)
    }

    #[test]
    fn test_timeout_translation() {
        let blocking = ReadTimeoutRequest::new(12, 0);
        assert_eq!((blocking.min_bytes(), blocking.deciseconds()), (12, 0));

        let timed = ReadTimeoutRequest::new(12, 1_250);
        assert_eq!((timed.min_bytes(), timed.deciseconds()), (0, 12));

        // sub-100ms timeouts floor to a zero timer
        let poll = ReadTimeoutRequest::new(1, 99);
        assert_eq!((poll.min_bytes(), poll.deciseconds()), (0, 0));
    }

    #[test]
    fn test_timeout_translation_saturates() {
        let big = ReadTimeoutRequest::new(4096, 0);
        assert_eq!(big.min_bytes(), u8::MAX);

        let long = ReadTimeoutRequest::new(1, MAX_READ_TIMEOUT_MS * 10);
        assert_eq!(long.deciseconds(), u8::MAX);
    }

    #[test]
    fn test_read_sets_device_timing() {
        let (line, mut port) = open_mock();
        line.enqueue_read(b"abc");

        port.read(3, 500).unwrap();
        assert_eq!(line.attributes().read_timing(), (0, 5));

        line.enqueue_read(b"de");
        port.read(2, 0).unwrap();
        assert_eq!(line.attributes().read_timing(), (2, 0));
    }

    #[test]
    fn test_read_exact_count_in_order() {
        let (line, mut port) = open_mock();
        line.enqueue_read(b"hello world");

        assert_eq!(port.read(5, 1000).unwrap(), b"hello");
        assert_eq!(line.available_bytes(), 6);
    }

    #[test]
    fn test_read_timeout_discards_partial() {
        let (line, mut port) = open_mock();
        line.enqueue_read(b"ab");

        let err = port.read(5, 200).unwrap_err();
        assert!(matches!(err, PortError::ReadTimeout));
        assert_eq!(line.available_bytes(), 0);
    }

    #[test]
    fn test_would_block_retried_in_place() {
        let (line, mut port) = open_mock();
        line.enqueue_read(b"xy");
        line.push_read_fault(MockFault::WouldBlock);
        line.push_read_fault(MockFault::WouldBlock);

        assert_eq!(port.read(2, 100).unwrap(), b"xy");
        assert_eq!(line.read_calls(), 4);
    }

    #[test]
    fn test_hard_read_error_is_io() {
        let (line, mut port) = open_mock();
        line.enqueue_read(b"xyz");
        line.push_read_fault(MockFault::Error(io::ErrorKind::BrokenPipe));

        let err = port.read(3, 100).unwrap_err();
        assert!(matches!(err, PortError::Io(ref e) if e.kind() == io::ErrorKind::BrokenPipe));
    }

    #[test]
    fn test_drain_reads_only_pending() {
        let (line, mut port) = open_mock();
        line.enqueue_read(b"123");

        assert_eq!(port.read(0, 100).unwrap(), b"123");
        assert_eq!(port.read(0, 100).unwrap(), b"");
    }

    #[test]
    fn test_read_byte() {
        let (line, mut port) = open_mock();
        line.enqueue_read(&[0x7e]);
        assert_eq!(port.read_byte(100).unwrap(), 0x7e);
        assert!(matches!(port.read_byte(100), Err(PortError::ReadTimeout)));
    }

    #[test]
    fn test_read_on_closed_port() {
        let line = MockLine::new();
        let mut port = PortHandle::with_backend("MOCK0", line.clone());
        assert!(matches!(port.read(1, 100), Err(PortError::NotOpen)));
        assert!(matches!(port.read(0, 100), Err(PortError::NotOpen)));
        assert!(matches!(port.is_data_available(), Err(PortError::NotOpen)));
        assert_eq!(line.device_calls(), 0);
    }
}
