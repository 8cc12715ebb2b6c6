//! Scripted transport for testing.
//!
//! [`MockTransport`] replays a fixed script of read events and records
//! every write, so tests can assert exactly what went over the wire and
//! how many reads a transaction consumed.

use std::collections::VecDeque;
use std::time::Duration;

use smartlamp_core::constants::DEFAULT_MAX_TRANSFER_SIZE;
use smartlamp_core::{Error, Result};

use crate::traits::Transport;

/// One scripted outcome of a `read` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadEvent {
    /// Deliver these bytes, split across reads if larger than the buffer.
    Data(Vec<u8>),

    /// Fail with [`Error::Timeout`].
    Timeout,

    /// Fail with [`Error::Transport`].
    Fault(String),

    /// Fail with [`Error::Disconnected`].
    Disconnect,
}

/// How the mock handles writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteBehavior {
    /// Accept every byte.
    Accept,

    /// Accept at most this many bytes.
    Partial(usize),

    /// Fail every write.
    Fail,
}

/// Mock transport driven by a read script.
///
/// When the script runs out every read times out.
///
/// # Examples
///
/// ```
/// use smartlamp_hardware::mock::MockTransport;
/// use smartlamp_hardware::Transport;
/// use std::time::Duration;
///
/// let mut transport = MockTransport::new()
///     .with_line("RES GET_LED 1")
///     .with_timeout();
///
/// let mut buf = [0u8; 32];
/// assert!(transport.read(&mut buf, Duration::from_millis(10)).is_ok());
/// assert!(transport.read(&mut buf, Duration::from_millis(10)).is_err());
/// assert_eq!(transport.read_calls(), 2);
/// ```
#[derive(Debug)]
pub struct MockTransport {
    script: VecDeque<ReadEvent>,
    writes: Vec<Vec<u8>>,
    read_calls: usize,
    write_behavior: WriteBehavior,
    max_transfer_size: usize,
}

impl MockTransport {
    /// Create a mock with an empty script.
    pub fn new() -> Self {
        Self {
            script: VecDeque::new(),
            writes: Vec::new(),
            read_calls: 0,
            write_behavior: WriteBehavior::Accept,
            max_transfer_size: DEFAULT_MAX_TRANSFER_SIZE,
        }
    }

    /// Queue `line` plus a terminator as a single chunk.
    pub fn with_line(mut self, line: &str) -> Self {
        self.push_line(line);
        self
    }

    /// Queue `text` one byte per read.
    pub fn with_bytewise(mut self, text: &str) -> Self {
        self.script
            .extend(text.bytes().map(|b| ReadEvent::Data(vec![b])));
        self
    }

    /// Queue raw bytes as a single chunk.
    pub fn with_chunk(mut self, bytes: &[u8]) -> Self {
        self.script.push_back(ReadEvent::Data(bytes.to_vec()));
        self
    }

    /// Queue a read timeout.
    pub fn with_timeout(mut self) -> Self {
        self.script.push_back(ReadEvent::Timeout);
        self
    }

    /// Queue an arbitrary event.
    pub fn with_event(mut self, event: ReadEvent) -> Self {
        self.script.push_back(event);
        self
    }

    /// Set how writes are handled.
    pub fn with_write_behavior(mut self, behavior: WriteBehavior) -> Self {
        self.write_behavior = behavior;
        self
    }

    /// Set the reported transfer size.
    pub fn with_max_transfer_size(mut self, size: usize) -> Self {
        self.max_transfer_size = size;
        self
    }

    /// Queue `line` plus a terminator on an existing mock.
    pub fn push_line(&mut self, line: &str) {
        let mut bytes = line.as_bytes().to_vec();
        bytes.push(b'\n');
        self.script.push_back(ReadEvent::Data(bytes));
    }

    /// Every write seen so far, in order.
    pub fn writes(&self) -> &[Vec<u8>] {
        &self.writes
    }

    /// Number of `read` calls made so far.
    pub fn read_calls(&self) -> usize {
        self.read_calls
    }

    /// Number of script events not yet consumed.
    pub fn remaining_events(&self) -> usize {
        self.script.len()
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for MockTransport {
    fn write(&mut self, bytes: &[u8], timeout: Duration) -> Result<usize> {
        match self.write_behavior {
            WriteBehavior::Accept => {
                self.writes.push(bytes.to_vec());
                Ok(bytes.len())
            }
            WriteBehavior::Partial(limit) => {
                let n = limit.min(bytes.len());
                self.writes.push(bytes[..n].to_vec());
                Ok(n)
            }
            WriteBehavior::Fail => Err(Error::timeout(timeout.as_millis() as u64)),
        }
    }

    fn read(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize> {
        self.read_calls += 1;

        match self.script.pop_front() {
            Some(ReadEvent::Data(mut data)) => {
                let n = buf.len().min(data.len());
                buf[..n].copy_from_slice(&data[..n]);
                if n < data.len() {
                    self.script.push_front(ReadEvent::Data(data.split_off(n)));
                }
                Ok(n)
            }
            Some(ReadEvent::Timeout) | None => Err(Error::timeout(timeout.as_millis() as u64)),
            Some(ReadEvent::Fault(message)) => Err(Error::transport(message)),
            Some(ReadEvent::Disconnect) => Err(Error::disconnected("mock")),
        }
    }

    fn max_transfer_size(&self) -> usize {
        self.max_transfer_size
    }

    fn name(&self) -> &str {
        "mock"
    }
}
