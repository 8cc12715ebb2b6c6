//! Transaction configuration.
//!
//! Controls the retry budget and per-attempt timeouts of every
//! command/response exchange, plus the line capacity of the framer.
//!
//! # Example
//!
//! ```
//! use smartlamp_core::TransactionConfig;
//! use std::time::Duration;
//!
//! let config = TransactionConfig::default()
//!     .with_retry_budget(5)
//!     .with_read_timeout(Duration::from_millis(250));
//!
//! assert!(config.validate().is_ok());
//! assert_eq!(config.worst_case_wait(), Duration::from_millis(1250));
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_READ_TIMEOUT_MS, DEFAULT_RETRY_BUDGET, DEFAULT_WRITE_TIMEOUT_MS, MAX_LINE_CAPACITY,
    MAX_RECV_LINE,
};
use crate::{Error, Result};

/// Configuration for a command/response transaction.
///
/// Durations are serialised as whole milliseconds:
///
/// ```
/// use smartlamp_core::TransactionConfig;
///
/// let json = r#"{"retry_budget":3,"read_timeout_ms":200}"#;
/// let config: TransactionConfig = serde_json::from_str(json).unwrap();
/// assert_eq!(config.retry_budget, 3);
/// assert_eq!(config.read_timeout.as_millis(), 200);
/// assert_eq!(config.max_line_len, 100);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransactionConfig {
    /// Maximum number of line attempts per transaction.
    pub retry_budget: u32,

    /// Time allowed for one response line to arrive.
    #[serde(rename = "read_timeout_ms", with = "duration_ms")]
    pub read_timeout: Duration,

    /// Time allowed for the command to be written.
    #[serde(rename = "write_timeout_ms", with = "duration_ms")]
    pub write_timeout: Duration,

    /// Line capacity of the framer, in bytes.
    pub max_line_len: usize,

    /// Append a `\n` to every command on the wire.
    ///
    /// The stock firmware reads bare commands; some builds expect a
    /// terminated line instead.
    pub terminate_commands: bool,
}

impl Default for TransactionConfig {
    fn default() -> Self {
        Self {
            retry_budget: DEFAULT_RETRY_BUDGET,
            read_timeout: Duration::from_millis(DEFAULT_READ_TIMEOUT_MS),
            write_timeout: Duration::from_millis(DEFAULT_WRITE_TIMEOUT_MS),
            max_line_len: MAX_RECV_LINE,
            terminate_commands: false,
        }
    }
}

impl TransactionConfig {
    /// Set the retry budget.
    pub fn with_retry_budget(mut self, retry_budget: u32) -> Self {
        self.retry_budget = retry_budget;
        self
    }

    /// Set the per-attempt read timeout.
    pub fn with_read_timeout(mut self, read_timeout: Duration) -> Self {
        self.read_timeout = read_timeout;
        self
    }

    /// Set the write timeout.
    pub fn with_write_timeout(mut self, write_timeout: Duration) -> Self {
        self.write_timeout = write_timeout;
        self
    }

    /// Set the framer line capacity.
    pub fn with_max_line_len(mut self, max_line_len: usize) -> Self {
        self.max_line_len = max_line_len;
        self
    }

    /// Append a newline to outgoing commands.
    pub fn with_terminated_commands(mut self, terminate_commands: bool) -> Self {
        self.terminate_commands = terminate_commands;
        self
    }

    /// Check that the configuration can drive a transaction.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for a zero retry budget, a zero timeout,
    /// or a line capacity outside `1..=MAX_LINE_CAPACITY`.
    pub fn validate(&self) -> Result<()> {
        if self.retry_budget == 0 {
            return Err(Error::Config("retry_budget must be at least 1".into()));
        }
        if self.read_timeout.is_zero() {
            return Err(Error::Config("read_timeout_ms must be non-zero".into()));
        }
        if self.write_timeout.is_zero() {
            return Err(Error::Config("write_timeout_ms must be non-zero".into()));
        }
        if self.max_line_len == 0 {
            return Err(Error::Config("max_line_len must be non-zero".into()));
        }
        if self.max_line_len > MAX_LINE_CAPACITY {
            return Err(Error::Config(format!(
                "max_line_len must not exceed {MAX_LINE_CAPACITY}"
            )));
        }
        Ok(())
    }

    /// Longest time a read phase can block: budget times read timeout.
    pub fn worst_case_wait(&self) -> Duration {
        self.read_timeout.saturating_mul(self.retry_budget)
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
