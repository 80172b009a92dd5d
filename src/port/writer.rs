//! Retrying writes.

use super::error::{PortError, PortResult};
use super::handle::PortHandle;
use super::traits::{Backend, LineDevice};
use std::io;
use tracing::{debug, trace};

impl<B: Backend> PortHandle<B> {
    /// Write the whole buffer.
    ///
    /// Each device call is handed everything not yet written. Would-block
    /// repeats the same call; a short write continues with the remainder.
    /// An empty buffer does not touch the device.
    pub fn write(&mut self, data: &[u8]) -> PortResult<()> {
        let device = self.device_mut()?;
        if data.is_empty() {
            return Ok(());
        }

        let mut remaining = data;
        while !remaining.is_empty() {
            match device.write_bytes(remaining) {
                Ok(0) => {
                    return Err(PortError::Io(io::Error::new(
                        io::ErrorKind::WriteZero,
                        "device accepted no bytes",
                    )));
                }
                Ok(n) => {
                    if n < remaining.len() {
                        debug!(written = n, left = remaining.len() - n, "short write");
                    }
                    remaining = &remaining[n..];
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                    trace!("write would block, retrying");
                }
                Err(e) => return Err(PortError::Io(e)),
            }
        }

        trace!(port = %self.name(), ?data, "write complete");
        Ok(())
    }

    /// Write a single byte.
    pub fn write_byte(&mut self, byte: u8) -> PortResult<()> {
        self.write(std::slice::from_ref(&byte))
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
    fn test_single_call_for_whole_buffer() {
        let (line, mut port) = open_mock();
        port.write(b"ping").unwrap();
        assert_eq!(line.write_log(), vec![b"ping".to_vec()]);
    }

    #[test]
    fn test_empty_write_touches_nothing() {
        let (line, mut port) = open_mock();
        port.write(&[]).unwrap();
        assert_eq!(line.write_calls(), 0);
    }

    #[test]
    fn test_would_block_retries_same_call() {
        let (line, mut port) = open_mock();
        line.push_write_fault(MockFault::WouldBlock);
        line.push_write_fault(MockFault::WouldBlock);

        port.write(b"data").unwrap();
        assert_eq!(line.write_calls(), 3);
        assert_eq!(line.write_log(), vec![b"data".to_vec()]);
    }

    #[test]
    fn test_short_write_completes_remainder() {
        let (line, mut port) = open_mock();
        line.push_write_fault(MockFault::ShortWrite(3));

        port.write(b"abcdefg").unwrap();
        assert_eq!(line.write_log(), vec![b"abc".to_vec(), b"defg".to_vec()]);
    }

    #[test]
    fn test_zero_length_acceptance_is_error() {
        let (line, mut port) = open_mock();
        line.push_write_fault(MockFault::ShortWrite(0));

        let err = port.write(b"abc").unwrap_err();
        assert!(matches!(err, PortError::Io(ref e) if e.kind() == io::ErrorKind::WriteZero));
    }

    #[test]
    fn test_hard_write_error() {
        let (line, mut port) = open_mock();
        line.push_write_fault(MockFault::Error(io::ErrorKind::BrokenPipe));
        assert!(matches!(port.write(b"abc"), Err(PortError::Io(_))));
        assert!(line.written().is_empty());
    }

    #[test]
    fn test_write_on_closed_port() {
        let line = MockLine::new();
        let mut port = PortHandle::with_backend("MOCK0", line.clone());
        assert!(matches!(port.write(b"x"), Err(PortError::NotOpen)));
        assert!(matches!(port.write(&[]), Err(PortError::NotOpen)));
        assert!(matches!(port.write_byte(b'x'), Err(PortError::NotOpen)));
    }

    #[test]
    fn test_write_byte() {
        let (line, mut port) = open_mock();
        port.write_byte(0x55).unwrap();
        assert_eq!(line.written(), vec![0x55]);
    }
}
