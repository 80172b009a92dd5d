//! Exact device call sequences and fault handling, checked with a mockall
//! device in place of a terminal.

use mockall::{mock, Sequence};
use parking_lot::Mutex;
use serial_line::port::{Backend, LineAttributes, LineDevice};
use serial_line::{BaudRate, Parity, PortError, PortHandle};
use std::io;

mock! {
    pub Uart {}

    impl LineDevice for Uart {
        fn get_attributes(&self) -> io::Result<LineAttributes>;
        fn set_attributes(&mut self, attributes: &LineAttributes) -> io::Result<()>;
        fn bytes_pending(&self) -> io::Result<usize>;
        fn read_bytes(&mut self, buffer: &mut [u8]) -> io::Result<usize>;
        fn write_bytes(&mut self, data: &[u8]) -> io::Result<usize>;
        fn bind_async_owner(&mut self, pid: u32) -> io::Result<()>;
    }
}

/// Hands out one prepared device.
struct OneShot(Mutex<Option<MockUart>>);

impl Backend for OneShot {
    type Device = MockUart;

    fn open_device(&self, _name: &str) -> io::Result<MockUart> {
        self.0
            .lock()
            .take()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "device already taken"))
    }
}

fn handle_for(uart: MockUart) -> PortHandle<OneShot> {
    PortHandle::with_backend("UART0", OneShot(Mutex::new(Some(uart))))
}

/// What the device reports before the port touches it.
fn original() -> LineAttributes {
    let mut attributes = LineAttributes::default();
    attributes.set_baud_rate(BaudRate::B9600).unwrap();
    attributes.set_read_timing(1, 5);
    attributes
}

fn einval() -> io::Error {
    io::Error::from_raw_os_error(libc::EINVAL)
}

/// A device that accepts every attribute write and remembers the last one.
fn permissive_uart() -> MockUart {
    let current = std::sync::Arc::new(Mutex::new(original()));
    let mut uart = MockUart::new();
    let read = current.clone();
    uart.expect_get_attributes()
        .returning(move || Ok(*read.lock()));
    uart.expect_set_attributes().returning(move |attributes| {
        *current.lock() = *attributes;
        Ok(())
    });
    uart.expect_bind_async_owner().returning(|_| Ok(()));
    uart
}

#[test]
fn test_open_and_close_call_sequence() {
    let mut seq = Sequence::new();
    let mut uart = MockUart::new();

    uart.expect_get_attributes()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|| Ok(original()));
    uart.expect_set_attributes()
        .withf(|a| a.local_flags() == 0 && a.read_timing() == (0, 0))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(()));
    uart.expect_bind_async_owner()
        .withf(|pid| *pid == std::process::id())
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(()));
    uart.expect_set_attributes()
        .withf(|a| *a == original())
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(()));

    let mut port = handle_for(uart);
    port.open().unwrap();
    port.close().unwrap();
    assert!(!port.is_open());
}

#[test]
fn test_attribute_snapshot_failure_fails_open() {
    let mut uart = MockUart::new();
    uart.expect_get_attributes()
        .times(1)
        .returning(|| Err(io::Error::from_raw_os_error(libc::ENOTTY)));

    let mut port = handle_for(uart);
    assert!(matches!(port.open(), Err(PortError::OpenFailed(_))));
    assert!(!port.is_open());
}

#[test]
fn test_owner_binding_failure_restores_before_release() {
    let mut seq = Sequence::new();
    let mut uart = MockUart::new();

    uart.expect_get_attributes()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|| Ok(original()));
    uart.expect_set_attributes()
        .withf(|a| a.read_timing() == (0, 0))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(()));
    uart.expect_bind_async_owner()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Err(io::Error::from_raw_os_error(libc::EPERM)));
    uart.expect_set_attributes()
        .withf(|a| *a == original())
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(()));

    let mut port = handle_for(uart);
    assert!(matches!(port.open(), Err(PortError::OpenFailed(_))));
    assert!(!port.is_open());
}

#[test]
fn test_rejected_speed_is_unsupported_baud_rate() {
    let mut uart = MockUart::new();
    uart.expect_get_attributes().returning(|| Ok(original()));
    uart.expect_set_attributes().returning(|a| {
        if a.baud_rate() == Some(BaudRate::B300) {
            Err(einval())
        } else {
            Ok(())
        }
    });
    uart.expect_bind_async_owner().returning(|_| Ok(()));

    let mut port = handle_for(uart);
    port.open().unwrap();
    assert!(matches!(
        port.set_baud_rate(BaudRate::B300),
        Err(PortError::UnsupportedBaudRate(_))
    ));
    port.set_baud_rate(BaudRate::B19200).unwrap();
}

#[test]
fn test_rejected_framing_is_invalid_argument() {
    let mut uart = MockUart::new();
    uart.expect_get_attributes().returning(|| Ok(original()));
    uart.expect_set_attributes().returning(|a| {
        if a.parity() == Parity::Odd {
            Err(einval())
        } else {
            Ok(())
        }
    });
    uart.expect_bind_async_owner().returning(|_| Ok(()));

    let mut port = handle_for(uart);
    port.open().unwrap();
    assert!(matches!(
        port.set_parity(Parity::Odd),
        Err(PortError::InvalidArgument(_))
    ));
}

#[test]
fn test_read_retries_would_block_once_per_call() {
    let mut uart = permissive_uart();
    let mut calls = 0;
    uart.expect_read_bytes().times(2).returning(move |buffer| {
        calls += 1;
        if calls == 1 {
            Err(io::ErrorKind::WouldBlock.into())
        } else {
            buffer[0] = b'A';
            Ok(1)
        }
    });

    let mut port = handle_for(uart);
    port.open().unwrap();
    assert_eq!(port.read(1, 500).unwrap(), b"A");
}

#[test]
fn test_read_error_is_io() {
    let mut uart = permissive_uart();
    uart.expect_read_bytes()
        .times(1)
        .returning(|_| Err(io::Error::from_raw_os_error(libc::EIO)));

    let mut port = handle_for(uart);
    port.open().unwrap();
    assert!(matches!(port.read(4, 500), Err(PortError::Io(_))));
}

#[test]
fn test_pending_count_failure_is_io() {
    let mut uart = permissive_uart();
    uart.expect_bytes_pending()
        .returning(|| Err(io::Error::from_raw_os_error(libc::EBADF)));

    let mut port = handle_for(uart);
    port.open().unwrap();
    assert!(matches!(port.is_data_available(), Err(PortError::Io(_))));
}

#[test]
fn test_short_write_continues_with_remainder() {
    let mut seq = Sequence::new();
    let mut uart = permissive_uart();
    uart.expect_write_bytes()
        .withf(|data| data == b"hello")
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(2));
    let mut blocked = false;
    uart.expect_write_bytes()
        .withf(|data| data == b"llo")
        .times(2)
        .in_sequence(&mut seq)
        .returning(move |data| {
            if blocked {
                Ok(data.len())
            } else {
                blocked = true;
                Err(io::ErrorKind::WouldBlock.into())
            }
        });

    let mut port = handle_for(uart);
    port.open().unwrap();
    port.write(b"hello").unwrap();
}

#[test]
fn test_failed_restore_still_releases() {
    let mut seq = Sequence::new();
    let mut uart = MockUart::new();
    uart.expect_get_attributes()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|| Ok(original()));
    uart.expect_set_attributes()
        .withf(|a| *a != original())
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(()));
    uart.expect_bind_async_owner()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(()));
    uart.expect_set_attributes()
        .withf(|a| *a == original())
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Err(io::Error::from_raw_os_error(libc::EIO)));

    let mut port = handle_for(uart);
    port.open().unwrap();
    port.close().unwrap();
    assert!(!port.is_open());
}

#[test]
fn test_drop_restores_saved_settings() {
    let mut uart = MockUart::new();
    uart.expect_get_attributes().times(1).returning(|| Ok(original()));
    uart.expect_set_attributes()
        .withf(|a| *a != original())
        .times(1)
        .returning(|_| Ok(()));
    uart.expect_bind_async_owner().times(1).returning(|_| Ok(()));
    uart.expect_set_attributes()
        .withf(|a| *a == original())
        .times(1)
        .returning(|_| Ok(()));

    let mut port = handle_for(uart);
    port.open().unwrap();
    drop(port);
}
