//! Line framer for the lamp's response stream.
//!
//! The device answers with `\n`-terminated ASCII lines, but the transport
//! delivers arbitrary chunks: one byte, half a line, or several lines at
//! once. [`LineFramer`] buffers whatever arrives and hands out one complete
//! line at a time, terminator removed. Bytes after a terminator stay
//! buffered for the next call.
//!
//! # State Machine
//!
//! ```text
//! ┌──────────────┐  line > capacity   ┌────────────┐
//! │ Accumulating │───────────────────>│ Discarding │
//! └──────────────┘                    └────────────┘
//!        ^   │ '\n' => line ready           │
//!        │   └──────────┘                   │ '\n' (overlong tail dropped)
//!        └──────────────────────────────────┘
//! ```
//!
//! A line longer than the capacity is never truncated into a shorter one:
//! the framer reports [`Error::LineOverflow`] and drops everything up to the
//! next terminator.
//!
//! # Usage
//!
//! ```
//! use smartlamp_hardware::LineFramer;
//!
//! let mut framer = LineFramer::new(100);
//! framer.feed(b"RES GET_LDR 5");
//! assert!(framer.take_line().unwrap().is_none());
//!
//! framer.feed(b"12\nRES GET_LED 1\n");
//! assert_eq!(framer.take_line().unwrap().unwrap().as_bytes(), b"RES GET_LDR 512");
//! assert_eq!(framer.take_line().unwrap().unwrap().as_bytes(), b"RES GET_LED 1");
//! ```

use std::time::{Duration, Instant};

use bytes::{Buf, BytesMut};
use smartlamp_core::constants::{DEFAULT_MAX_TRANSFER_SIZE, LINE_TERMINATOR, MAX_LINE_CAPACITY};
use smartlamp_core::{Error, Result};
use smartlamp_protocol::Line;
use tracing::trace;

use crate::traits::Transport;

/// Framer states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramerState {
    /// Collecting bytes of the current line.
    Accumulating,

    /// Dropping the tail of an overlong line until the next terminator.
    Discarding,
}

/// Reassembles newline-terminated lines from transport reads.
#[derive(Debug)]
pub struct LineFramer {
    /// Received bytes not yet handed out. Holds at most one partial line
    /// after [`take_line`](Self::take_line) returns `None`.
    buffer: BytesMut,

    /// Scratch space for a single transport read. Grown to the transport's
    /// transfer size, which may exceed the line capacity.
    scratch: Vec<u8>,

    /// Longest accepted line, terminator excluded.
    capacity: usize,

    state: FramerState,
}

impl LineFramer {
    /// Create a framer accepting lines of up to `capacity` bytes.
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(capacity.min(MAX_LINE_CAPACITY).saturating_mul(2)),
            scratch: vec![0; DEFAULT_MAX_TRANSFER_SIZE],
            capacity,
            state: FramerState::Accumulating,
        }
    }

    /// Longest accepted line, in bytes.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current framer state.
    pub fn state(&self) -> FramerState {
        self.state
    }

    /// Number of received bytes waiting to be framed.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Append raw bytes from the transport.
    pub fn feed(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Take the next complete line from the buffer, if any.
    ///
    /// Returns `Ok(None)` when more bytes are needed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LineOverflow`] once per line that exceeds the
    /// capacity.
    pub fn take_line(&mut self) -> Result<Option<Line>> {
        loop {
            let terminator = self.buffer.iter().position(|&b| b == LINE_TERMINATOR);

            match (self.state, terminator) {
                (FramerState::Discarding, Some(pos)) => {
                    self.buffer.advance(pos + 1);
                    self.state = FramerState::Accumulating;
                }
                (FramerState::Discarding, None) => {
                    self.buffer.clear();
                    return Ok(None);
                }
                (FramerState::Accumulating, Some(pos)) if pos <= self.capacity => {
                    let line = self.buffer.split_to(pos).freeze();
                    self.buffer.advance(1);
                    return Ok(Some(Line::new(line)));
                }
                (FramerState::Accumulating, Some(pos)) => {
                    self.buffer.advance(pos + 1);
                    return Err(Error::LineOverflow {
                        capacity: self.capacity,
                    });
                }
                (FramerState::Accumulating, None) if self.buffer.len() > self.capacity => {
                    self.buffer.clear();
                    self.state = FramerState::Discarding;
                    return Err(Error::LineOverflow {
                        capacity: self.capacity,
                    });
                }
                (FramerState::Accumulating, None) => return Ok(None),
            }
        }
    }

    /// Drop the partial line after a failed read.
    ///
    /// Complete lines can't be pending here: `next_line` drains them
    /// before it reads again.
    pub fn abort_line(&mut self) {
        self.buffer.clear();
        self.state = FramerState::Accumulating;
    }

    /// Drop all buffered bytes, including complete lines.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.state = FramerState::Accumulating;
    }

    /// Read from `transport` until one complete line is available.
    ///
    /// Lines already buffered from an earlier read are returned without
    /// touching the transport. Each read offers a buffer of at least the
    /// transport's transfer size (a bulk endpoint fails short reads), even
    /// when that exceeds the line capacity; the whole call is bounded by
    /// `timeout`.
    ///
    /// # Errors
    ///
    /// Any read failure, an elapsed deadline or an overlong line aborts the
    /// current line and is returned as is. The framer never retries.
    pub fn next_line<T: Transport + ?Sized>(
        &mut self,
        transport: &mut T,
        timeout: Duration,
    ) -> Result<Line> {
        let deadline = Instant::now() + timeout;
        let chunk = transport.max_transfer_size().max(1);
        if self.scratch.len() < chunk {
            self.scratch.resize(chunk, 0);
        }

        loop {
            if let Some(line) = self.take_line()? {
                trace!(line = %line, "Framed line");
                return Ok(line);
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                self.abort_line();
                return Err(Error::timeout(timeout.as_millis() as u64));
            }

            match transport.read(&mut self.scratch[..chunk], remaining) {
                Ok(n) => {
                    trace!(bytes = n, "Read chunk from {}", transport.name());
                    self.buffer.extend_from_slice(&self.scratch[..n]);
                }
                Err(e) => {
                    self.abort_line();
                    return Err(e);
                }
            }
        }
    }
}

impl Default for LineFramer {
    fn default() -> Self {
        Self::new(smartlamp_core::constants::MAX_RECV_LINE)
    }
}
