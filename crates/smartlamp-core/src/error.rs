//! Error types for lamp transactions.
//!
//! Errors fall into three classes that the transaction engine treats
//! differently:
//!
//! - **Transport** errors come from the link itself (timeouts, a vanished
//!   device, bus failures, an overlong line). A failed write ends the
//!   transaction; a failed read costs one retry.
//! - **Soft misses** are complete lines that do not answer the command
//!   (`ProtocolMismatch`) or answer it with a broken value
//!   (`MalformedValue`). They cost one retry, same as a failed read.
//! - **Definitive** failures end a transaction or adapter call:
//!   `NoValidResponse` and the adapter errors.

/// Result type alias for lamp operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to the lamp.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No bytes arrived before the deadline.
    #[error("Operation timeout after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// Device is not connected or has been disconnected.
    #[error("Device disconnected: {device}")]
    Disconnected { device: String },

    /// Link-level failure (bus error, partial write, pipe stall).
    #[error("Transport error: {message}")]
    Transport { message: String },

    /// A line grew past the buffer capacity without a terminator.
    #[error("Line exceeded {capacity} bytes without a terminator")]
    LineOverflow { capacity: usize },

    /// A complete line arrived but does not start with the expected prefix.
    #[error("Unexpected line {line:?}, expected prefix {expected:?}")]
    ProtocolMismatch { expected: String, line: String },

    /// The prefix matched but the value is not a base-10 integer.
    #[error("Malformed value in line {line:?}")]
    MalformedValue { line: String },

    /// The retry budget ran out without a matching line.
    #[error("No valid response to {command} after {attempts} attempts")]
    NoValidResponse { command: String, attempts: u32 },

    /// Attribute name not present in the attribute table.
    #[error("Unknown attribute: {0}")]
    UnknownAttribute(String),

    /// Attribute exists but cannot be written.
    #[error("Attribute is read-only: {0}")]
    ReadOnlyAttribute(String),

    /// A value supplied by the caller cannot be sent to the device.
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// A write through the attribute interface was refused.
    #[error("Access denied: {attribute}")]
    AccessDenied { attribute: String },

    /// Invalid transaction configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with custom message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a new timeout error.
    pub fn timeout(duration_ms: u64) -> Self {
        Self::Timeout { duration_ms }
    }

    /// Create a new disconnected error.
    pub fn disconnected(device: impl Into<String>) -> Self {
        Self::Disconnected {
            device: device.into(),
        }
    }

    /// Create a new transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create a new protocol mismatch.
    pub fn mismatch(expected: impl Into<String>, line: impl Into<String>) -> Self {
        Self::ProtocolMismatch {
            expected: expected.into(),
            line: line.into(),
        }
    }

    /// Create a new malformed value error.
    pub fn malformed(line: impl Into<String>) -> Self {
        Self::MalformedValue { line: line.into() }
    }

    /// Create a new exhausted-budget error.
    pub fn no_valid_response(command: impl Into<String>, attempts: u32) -> Self {
        Self::NoValidResponse {
            command: command.into(),
            attempts,
        }
    }

    /// Create a new access denied error.
    pub fn access_denied(attribute: impl Into<String>) -> Self {
        Self::AccessDenied {
            attribute: attribute.into(),
        }
    }

    /// Create a generic error with custom message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }

    /// Returns `true` for failures of the link itself.
    ///
    /// # Example
    ///
    /// ```
    /// use smartlamp_core::Error;
    ///
    /// assert!(Error::timeout(1000).is_transport());
    /// assert!(!Error::malformed("RES GET_LDR abc").is_transport());
    /// ```
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. }
                | Self::Disconnected { .. }
                | Self::Transport { .. }
                | Self::LineOverflow { .. }
                | Self::Io(_)
        )
    }

    /// Returns `true` for lines that arrived intact but did not answer
    /// the command.
    pub fn is_soft_miss(&self) -> bool {
        matches!(
            self,
            Self::ProtocolMismatch { .. } | Self::MalformedValue { .. }
        )
    }

    /// Maps a failure onto the integer convention of plain adapters.
    pub fn to_sentinel(&self) -> i32 {
        crate::constants::FAILURE_SENTINEL
    }
}
