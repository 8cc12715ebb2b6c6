//! Serial port transport.
//!
//! Talks to the lamp through the host's CP2102 driver (`/dev/ttyUSB0`,
//! `COM3`, ...). Enabled with the `hardware-serial` feature.

use std::io::{ErrorKind, Read, Write};
use std::time::Duration;

use serialport::{SerialPort, SerialPortType};
use smartlamp_core::constants::{
    DEFAULT_BAUD_RATE, DEFAULT_MAX_TRANSFER_SIZE, DEFAULT_READ_TIMEOUT_MS, PRODUCT_ID, VENDOR_ID,
};
use smartlamp_core::{Error, Result};
use tracing::{debug, info};

use crate::traits::Transport;

/// Lamp transport over a serial port.
pub struct SerialTransport {
    port: Box<dyn SerialPort>,
    path: String,
}

impl SerialTransport {
    /// Open `path` at the lamp's default baud rate.
    pub fn open(path: &str) -> Result<Self> {
        Self::open_with_baud(path, DEFAULT_BAUD_RATE)
    }

    /// Open `path` at `baud_rate`.
    pub fn open_with_baud(path: &str, baud_rate: u32) -> Result<Self> {
        let port = serialport::new(path, baud_rate)
            .timeout(Duration::from_millis(DEFAULT_READ_TIMEOUT_MS))
            .open()
            .map_err(|e| map_serial_error(path, e))?;

        info!(path, baud_rate, "Opened serial port");
        Ok(Self {
            port,
            path: path.to_string(),
        })
    }

    /// Find serial ports that belong to a lamp (CP2102 vendor/product id).
    pub fn discover() -> Result<Vec<String>> {
        let ports = serialport::available_ports().map_err(|e| Error::transport(e.to_string()))?;

        let found: Vec<String> = ports
            .into_iter()
            .filter(|port| match &port.port_type {
                SerialPortType::UsbPort(usb) => usb.vid == VENDOR_ID && usb.pid == PRODUCT_ID,
                _ => false,
            })
            .map(|port| port.port_name)
            .collect();

        debug!(count = found.len(), "Discovered lamp serial ports");
        Ok(found)
    }

    /// Path the port was opened with.
    pub fn path(&self) -> &str {
        &self.path
    }

    fn set_timeout(&mut self, timeout: Duration) -> Result<()> {
        self.port
            .set_timeout(timeout)
            .map_err(|e| map_serial_error(&self.path, e))
    }
}

impl std::fmt::Debug for SerialTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialTransport")
            .field("path", &self.path)
            .finish()
    }
}

impl Transport for SerialTransport {
    fn write(&mut self, bytes: &[u8], timeout: Duration) -> Result<usize> {
        self.set_timeout(timeout)?;
        let n = self
            .port
            .write(bytes)
            .map_err(|e| map_io_error(&self.path, e, timeout))?;
        self.port
            .flush()
            .map_err(|e| map_io_error(&self.path, e, timeout))?;
        Ok(n)
    }

    fn read(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize> {
        self.set_timeout(timeout)?;
        self.port
            .read(buf)
            .map_err(|e| map_io_error(&self.path, e, timeout))
    }

    fn max_transfer_size(&self) -> usize {
        DEFAULT_MAX_TRANSFER_SIZE
    }

    fn name(&self) -> &str {
        &self.path
    }
}

fn map_serial_error(path: &str, error: serialport::Error) -> Error {
    match error.kind() {
        serialport::ErrorKind::NoDevice => Error::disconnected(path),
        _ => Error::transport(format!("{path}: {error}")),
    }
}

fn map_io_error(path: &str, error: std::io::Error, timeout: Duration) -> Error {
    match error.kind() {
        ErrorKind::TimedOut | ErrorKind::WouldBlock => Error::timeout(timeout.as_millis() as u64),
        ErrorKind::BrokenPipe | ErrorKind::NotConnected => Error::disconnected(path),
        _ => Error::Io(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_mapping() {
        let err = map_io_error(
            "/dev/ttyUSB0",
            std::io::Error::from(ErrorKind::TimedOut),
            Duration::from_millis(250),
        );
        assert!(matches!(err, Error::Timeout { duration_ms: 250 }));
    }

    #[test]
    fn test_broken_pipe_mapping() {
        let err = map_io_error(
            "/dev/ttyUSB0",
            std::io::Error::from(ErrorKind::BrokenPipe),
            Duration::from_millis(250),
        );
        assert!(matches!(err, Error::Disconnected { .. }));
    }

    #[test]
    fn test_open_missing_port_fails() {
        assert!(SerialTransport::open("/dev/smartlamp-does-not-exist").is_err());
    }
}
