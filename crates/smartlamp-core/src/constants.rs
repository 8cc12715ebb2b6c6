//! Core constants for the SmartLamp line protocol.
//!
//! The lamp firmware speaks a tiny ASCII protocol over a CP2102 USB-serial
//! bridge. The host writes a bare command and the device answers with a
//! newline-terminated response line:
//!
//! ```text
//! host   -> device : SET_LED 80
//! device -> host   : RES SET_LED 1\n
//! ```
//!
//! A response is `RES <COMMAND_NAME>[ <ARG>] <VALUE>` where `<VALUE>` is a
//! base-10 signed integer.
//!
//! # Usage
//!
//! ```
//! use smartlamp_core::constants::*;
//!
//! assert_eq!(RESPONSE_TAG, "RES");
//! assert_eq!(LINE_TERMINATOR, b'\n');
//! assert_eq!(FAILURE_SENTINEL, -1);
//! ```

// ============================================================================
// Wire Format
// ============================================================================

/// Tag that starts every response line sent by the device.
///
/// # Examples
///
/// ```
/// use smartlamp_core::constants::RESPONSE_TAG;
///
/// let line = "RES GET_LDR 512";
/// assert!(line.starts_with(RESPONSE_TAG));
/// ```
pub const RESPONSE_TAG: &str = "RES";

/// Separator between the tokens of a command or response line.
pub const TOKEN_SEPARATOR: char = ' ';

/// Byte that terminates a response line.
///
/// The terminator is never part of a delivered line.
pub const LINE_TERMINATOR: u8 = b'\n';

/// Carriage return, stripped from the end of a line when the firmware
/// is built with CRLF line endings.
pub const CARRIAGE_RETURN: u8 = b'\r';

// ============================================================================
// Buffer Limits
// ============================================================================

/// Maximum length of a single response line, in bytes.
///
/// A line that grows past this capacity without a terminator is dropped
/// and reported as an overflow instead of being truncated.
pub const MAX_RECV_LINE: usize = 100;

/// Largest line capacity a configuration may ask for, in bytes.
pub const MAX_LINE_CAPACITY: usize = 4096;

/// Fallback transfer size used when a transport cannot report one.
pub const DEFAULT_MAX_TRANSFER_SIZE: usize = 64;

// ============================================================================
// Timing and Retries
// ============================================================================

/// Number of line attempts a transaction makes before giving up.
pub const DEFAULT_RETRY_BUDGET: u32 = 10;

/// Time allowed for one line to arrive, in milliseconds.
///
/// # Examples
///
/// ```
/// use smartlamp_core::constants::DEFAULT_READ_TIMEOUT_MS;
/// use std::time::Duration;
///
/// let timeout = Duration::from_millis(DEFAULT_READ_TIMEOUT_MS);
/// assert_eq!(timeout.as_secs(), 1);
/// ```
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 1000;

/// Time allowed for a command to be written, in milliseconds.
pub const DEFAULT_WRITE_TIMEOUT_MS: u64 = 1000;

// ============================================================================
// Adapter Boundary
// ============================================================================

/// Value reported by integer-only adapters when a transaction fails.
pub const FAILURE_SENTINEL: i32 = -1;

// ============================================================================
// Device Identity
// ============================================================================

/// USB vendor id of the CP2102 bridge on the lamp board.
pub const VENDOR_ID: u16 = 0x10c4;

/// USB product id of the CP2102 bridge on the lamp board.
pub const PRODUCT_ID: u16 = 0xea60;

/// Baud rate of the lamp firmware's serial console.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;
