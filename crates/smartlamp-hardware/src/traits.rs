//! Transport contract for the lamp link.
//!
//! A [`Transport`] is a blocking duplex byte channel: a USB bulk endpoint
//! pair, a serial port, or a simulated device in tests. The line framer
//! and the transaction engine depend only on this trait.
//!
//! # Contract
//!
//! - `write` sends bytes and returns how many were accepted. Implementations
//!   may return fewer than requested; the engine treats that as a failure.
//! - `read` blocks for at most `timeout` and returns at least one byte, or
//!   fails. A read that times out with no data must fail with
//!   [`Error::Timeout`](smartlamp_core::Error::Timeout). `Ok(0)` is allowed
//!   but is treated as "nothing yet" by the framer.
//! - A read may return any number of bytes, including several lines or a
//!   fraction of one.

use std::time::Duration;

use smartlamp_core::Result;
use smartlamp_core::constants::DEFAULT_MAX_TRANSFER_SIZE;

/// Blocking duplex byte channel to the lamp.
///
/// Transports are `Send` so a session can be moved to and shared between
/// threads behind a lock; they are never used from two threads at once.
///
/// # Examples
///
/// ```
/// use smartlamp_hardware::Transport;
/// use smartlamp_hardware::mock::MockTransport;
/// use std::time::Duration;
///
/// let mut transport = MockTransport::new().with_line("RES GET_LDR 512");
/// transport.write(b"GET_LDR", Duration::from_millis(100)).unwrap();
///
/// let mut buf = [0u8; 64];
/// let n = transport.read(&mut buf, Duration::from_millis(100)).unwrap();
/// assert_eq!(&buf[..n], b"RES GET_LDR 512\n");
/// ```
pub trait Transport: Send {
    /// Write `bytes` to the device, blocking for at most `timeout`.
    fn write(&mut self, bytes: &[u8], timeout: Duration) -> Result<usize>;

    /// Read into `buf`, blocking for at most `timeout`.
    fn read(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize>;

    /// Largest chunk a single read can deliver.
    fn max_transfer_size(&self) -> usize {
        DEFAULT_MAX_TRANSFER_SIZE
    }

    /// Human readable name used in log messages.
    fn name(&self) -> &str {
        "transport"
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn write(&mut self, bytes: &[u8], timeout: Duration) -> Result<usize> {
        (**self).write(bytes, timeout)
    }

    fn read(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize> {
        (**self).read(buf, timeout)
    }

    fn max_transfer_size(&self) -> usize {
        (**self).max_transfer_size()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn write(&mut self, bytes: &[u8], timeout: Duration) -> Result<usize> {
        (**self).write(bytes, timeout)
    }

    fn read(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize> {
        (**self).read(buf, timeout)
    }

    fn max_transfer_size(&self) -> usize {
        (**self).max_transfer_size()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
