//! Response lines and reply matching.
//!
//! A [`Line`] is one newline-delimited unit received from the lamp, with the
//! terminator already removed. [`match_response`] decides whether a line
//! answers a given [`Command`] and extracts its integer value.
//!
//! # Matching Rules
//!
//! 1. The line must start with the command's expected prefix, compared
//!    byte for byte. Otherwise the line is a [`ProtocolMismatch`].
//! 2. The rest of the line, minus a trailing `\r`, must be a base-10
//!    signed integer that fits an `i32`. Otherwise it is a
//!    [`MalformedValue`].
//! 3. Commands with an argument may have it echoed before the value
//!    (`RES SET_LED 80 1`); the echo must equal the argument sent.
//!
//! ```
//! use smartlamp_protocol::{Command, CommandCode, Line, match_response};
//!
//! let cmd = Command::new(CommandCode::GetLdr).unwrap();
//! let line = Line::from("RES GET_LDR 512");
//! assert_eq!(match_response(&line, &cmd).unwrap(), 512);
//! ```
//!
//! [`ProtocolMismatch`]: smartlamp_core::Error::ProtocolMismatch
//! [`MalformedValue`]: smartlamp_core::Error::MalformedValue

use std::fmt;

use bytes::Bytes;
use smartlamp_core::constants::{CARRIAGE_RETURN, TOKEN_SEPARATOR};
use smartlamp_core::{Error, Result};

use crate::commands::Command;

/// One complete line received from the device, terminator removed.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Line {
    bytes: Bytes,
}

impl Line {
    /// Wrap raw line bytes.
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    /// Raw bytes of the line.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Line length in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` for a bare terminator.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Returns `true` if every byte is 7-bit ASCII.
    pub fn is_ascii(&self) -> bool {
        self.bytes.is_ascii()
    }

    /// Lossy text form for logging.
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

impl From<&str> for Line {
    fn from(s: &str) -> Self {
        Self::new(Bytes::copy_from_slice(s.as_bytes()))
    }
}

impl From<Vec<u8>> for Line {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

impl fmt::Debug for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Line({:?})", self.to_string_lossy())
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_lossy())
    }
}

/// Check a line against a command and extract the reply value.
///
/// # Errors
///
/// - [`Error::ProtocolMismatch`] if the line does not start with the
///   command's expected prefix (empty and short lines included).
/// - [`Error::MalformedValue`] if the prefix matches but the remainder is
///   not a single integer, or an echoed argument differs from the one sent.
pub fn match_response(line: &Line, command: &Command) -> Result<i32> {
    let prefix = command.expected_prefix();

    let Some(suffix) = line.as_bytes().strip_prefix(prefix.as_bytes()) else {
        return Err(Error::mismatch(prefix, line.to_string_lossy()));
    };
    let suffix = suffix.strip_suffix(&[CARRIAGE_RETURN]).unwrap_or(suffix);

    let text = std::str::from_utf8(suffix).map_err(|_| Error::malformed(line.to_string_lossy()))?;

    let value_text = match (command.argument(), text.split_once(TOKEN_SEPARATOR)) {
        (Some(argument), Some((echo, value))) => {
            if echo.parse::<i32>().ok() != Some(argument) {
                return Err(Error::malformed(line.to_string_lossy()));
            }
            value
        }
        _ => text,
    };

    value_text
        .parse::<i32>()
        .map_err(|_| Error::malformed(line.to_string_lossy()))
}
