//! Command/response transaction engine.
//!
//! A [`Transaction`] writes one command and then pulls lines from the
//! [`LineFramer`] until one answers the command, the retry budget runs out,
//! or the write fails.
//!
//! # States
//!
//! ```text
//! Sending ──write ok──> AwaitingLine ──line──> Matching ──match──> Succeeded
//!    │                    ^      │                 │
//!    │ write failed       │      │ read failed     │ mismatch / malformed
//!    v                    │      v                 v
//! TransportFailed         └──── budget left? ──────┘
//!                                │ no
//!                                v
//!                            Exhausted
//! ```
//!
//! # Retry Policy
//!
//! The budget counts line attempts. A failed read, a line with the wrong
//! prefix and a line with an unparsable value each cost exactly one
//! attempt. The command is written once per transaction and never resent;
//! a failed write ends the transaction immediately.
//!
//! # Example
//!
//! ```
//! use smartlamp_hardware::{LineFramer, Transaction};
//! use smartlamp_hardware::mock::MockTransport;
//! use smartlamp_protocol::{Command, CommandCode};
//! use std::time::Duration;
//!
//! let mut transport = MockTransport::new()
//!     .with_line("RES GET_LED 1")
//!     .with_line("RES GET_LDR 512");
//! let mut framer = LineFramer::default();
//! let command = Command::new(CommandCode::GetLdr).unwrap();
//!
//! let mut transaction = Transaction::new(&command, 10, Duration::from_millis(100));
//! assert_eq!(transaction.run(&mut transport, &mut framer).unwrap(), 512);
//! assert_eq!(transaction.stats().attempts, 2);
//! assert_eq!(transaction.stats().soft_misses, 1);
//! ```

use std::fmt;
use std::time::Duration;

use smartlamp_core::constants::{DEFAULT_WRITE_TIMEOUT_MS, LINE_TERMINATOR};
use smartlamp_core::{Error, Result};
use smartlamp_protocol::{Command, match_response};
use tracing::{debug, debug_span, error, trace, warn};

use crate::framer::LineFramer;
use crate::traits::Transport;

/// States of a single transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    /// Writing the command bytes.
    Sending,

    /// Waiting for one line, bounded by the per-attempt timeout.
    AwaitingLine,

    /// Checking a received line against the expected prefix.
    Matching,

    /// A line answered the command with this value.
    Succeeded(i32),

    /// The retry budget ran out.
    Exhausted,

    /// The command could not be written.
    TransportFailed,
}

impl TransactionState {
    /// Returns `true` once the transaction can make no further progress.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Succeeded(_) | Self::Exhausted | Self::TransportFailed
        )
    }
}

impl fmt::Display for TransactionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sending => write!(f, "Sending"),
            Self::AwaitingLine => write!(f, "AwaitingLine"),
            Self::Matching => write!(f, "Matching"),
            Self::Succeeded(value) => write!(f, "Succeeded({value})"),
            Self::Exhausted => write!(f, "Exhausted"),
            Self::TransportFailed => write!(f, "TransportFailed"),
        }
    }
}

/// Counters describing how a transaction spent its budget.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransactionStats {
    /// Line attempts made, successful one included.
    pub attempts: u32,

    /// Reads that failed or timed out.
    pub read_errors: u32,

    /// Lines that arrived but did not answer the command.
    pub soft_misses: u32,
}

/// One bounded send/await/match cycle for a single command.
#[derive(Debug)]
pub struct Transaction<'a> {
    command: &'a Command,
    retry_budget: u32,
    read_timeout: Duration,
    write_timeout: Duration,
    terminate_command: bool,
    state: TransactionState,
    stats: TransactionStats,
}

impl<'a> Transaction<'a> {
    /// Create a transaction with the given budget and per-attempt timeout.
    pub fn new(command: &'a Command, retry_budget: u32, read_timeout: Duration) -> Self {
        Self {
            command,
            retry_budget,
            read_timeout,
            write_timeout: Duration::from_millis(DEFAULT_WRITE_TIMEOUT_MS),
            terminate_command: false,
            state: TransactionState::Sending,
            stats: TransactionStats::default(),
        }
    }

    /// Set the write timeout.
    pub fn with_write_timeout(mut self, write_timeout: Duration) -> Self {
        self.write_timeout = write_timeout;
        self
    }

    /// Append a newline to the command on the wire.
    pub fn with_terminated_command(mut self, terminate: bool) -> Self {
        self.terminate_command = terminate;
        self
    }

    /// Current state.
    pub fn state(&self) -> TransactionState {
        self.state
    }

    /// Budget usage so far.
    pub fn stats(&self) -> TransactionStats {
        self.stats
    }

    /// Attempts left in the budget.
    pub fn remaining(&self) -> u32 {
        self.retry_budget - self.stats.attempts
    }

    /// Drive the transaction to a terminal state.
    ///
    /// Buffered bytes from an earlier exchange are dropped before the
    /// command is written; bytes received during this transaction are
    /// carried over between attempts.
    ///
    /// # Errors
    ///
    /// - The write error, if the command could not be written in full.
    /// - [`Error::NoValidResponse`] if the budget ran out.
    pub fn run<T: Transport + ?Sized>(
        &mut self,
        transport: &mut T,
        framer: &mut LineFramer,
    ) -> Result<i32> {
        let span = debug_span!("transaction", command = self.command.name());
        let _enter = span.enter();

        framer.clear();
        self.send(transport)?;

        while self.remaining() > 0 {
            self.transition(TransactionState::AwaitingLine);
            self.stats.attempts += 1;

            let line = match framer.next_line(transport, self.read_timeout) {
                Ok(line) => line,
                Err(e) => {
                    self.stats.read_errors += 1;
                    debug!(
                        attempt = self.stats.attempts,
                        remaining = self.remaining(),
                        "Read failed: {}",
                        e
                    );
                    continue;
                }
            };

            self.transition(TransactionState::Matching);
            match match_response(&line, self.command) {
                Ok(value) => {
                    self.transition(TransactionState::Succeeded(value));
                    debug!(value, attempts = self.stats.attempts, "Transaction succeeded");
                    return Ok(value);
                }
                Err(e @ Error::MalformedValue { .. }) => {
                    self.stats.soft_misses += 1;
                    warn!(attempt = self.stats.attempts, "{}", e);
                }
                Err(e) => {
                    self.stats.soft_misses += 1;
                    debug!(attempt = self.stats.attempts, "Ignoring line: {}", e);
                }
            }
        }

        self.transition(TransactionState::Exhausted);
        warn!(
            attempts = self.stats.attempts,
            read_errors = self.stats.read_errors,
            soft_misses = self.stats.soft_misses,
            "No valid response"
        );
        Err(Error::no_valid_response(
            self.command.name(),
            self.stats.attempts,
        ))
    }

    fn send<T: Transport + ?Sized>(&mut self, transport: &mut T) -> Result<()> {
        let mut bytes = self.command.text().as_bytes().to_vec();
        if self.terminate_command {
            bytes.push(LINE_TERMINATOR);
        }

        debug!(text = self.command.text(), "Sending command");
        let result = transport.write(&bytes, self.write_timeout).and_then(|n| {
            if n == bytes.len() {
                Ok(())
            } else {
                Err(Error::transport(format!(
                    "partial write: {n} of {} bytes",
                    bytes.len()
                )))
            }
        });

        if let Err(e) = result {
            self.transition(TransactionState::TransportFailed);
            error!("Failed to send {}: {}", self.command, e);
            return Err(e);
        }
        Ok(())
    }

    fn transition(&mut self, next: TransactionState) {
        trace!(from = %self.state, to = %next, "Transaction state change");
        self.state = next;
    }
}
