//! Command catalog for the SmartLamp protocol.
//!
//! Every operation the host can ask of the lamp is one row of [`CATALOG`]:
//! the command name written on the wire, and the prefix a reply to it must
//! start with. The prefix is always `"RES " + name + " "`.
//!
//! | Command    | Argument | Reply prefix     | Example exchange              |
//! |------------|----------|------------------|-------------------------------|
//! | `GET_LDR`  | -        | `RES GET_LDR `   | `GET_LDR` / `RES GET_LDR 512` |
//! | `GET_LED`  | -        | `RES GET_LED `   | `GET_LED` / `RES GET_LED 80`  |
//! | `SET_LED`  | level    | `RES SET_LED `   | `SET_LED 80` / `RES SET_LED 1`|
//! | `GET_TEMP` | -        | `RES GET_TEMP `  | `GET_TEMP` / `RES GET_TEMP 23`|
//! | `GET_HUM`  | -        | `RES GET_HUM `   | `GET_HUM` / `RES GET_HUM 41`  |
//!
//! # Usage Examples
//!
//! ```
//! use smartlamp_protocol::{Command, CommandCode};
//!
//! let cmd = CommandCode::parse("GET_LDR").unwrap();
//! assert_eq!(cmd, CommandCode::GetLdr);
//! assert_eq!(cmd.expected_prefix(), "RES GET_LDR ");
//!
//! let set = Command::with_argument(CommandCode::SetLed, 80).unwrap();
//! assert_eq!(set.text(), "SET_LED 80");
//! ```
//!
//! Adding a sensor means adding one variant and one catalog row; the
//! transaction engine only ever sees [`Command`].

use std::fmt;

use serde::{Deserialize, Serialize};
use smartlamp_core::{Error, Result};

/// Codes for every command the lamp firmware understands.
///
/// The discriminant is the row index in [`CATALOG`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommandCode {
    GetLdr = 0,
    GetLed = 1,
    SetLed = 2,
    GetTemp = 3,
    GetHum = 4,
}

/// One row of the command catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Code this row describes.
    pub code: CommandCode,

    /// Command name as written on the wire.
    pub name: &'static str,

    /// Literal prefix of a valid reply, trailing space included.
    pub expected_prefix: &'static str,

    /// Whether the command carries an integer argument.
    pub takes_argument: bool,
}

/// The static command table, indexed by [`CommandCode`] discriminant.
pub const CATALOG: &[CatalogEntry] = &[
    CatalogEntry {
        code: CommandCode::GetLdr,
        name: "GET_LDR",
        expected_prefix: "RES GET_LDR ",
        takes_argument: false,
    },
    CatalogEntry {
        code: CommandCode::GetLed,
        name: "GET_LED",
        expected_prefix: "RES GET_LED ",
        takes_argument: false,
    },
    CatalogEntry {
        code: CommandCode::SetLed,
        name: "SET_LED",
        expected_prefix: "RES SET_LED ",
        takes_argument: true,
    },
    CatalogEntry {
        code: CommandCode::GetTemp,
        name: "GET_TEMP",
        expected_prefix: "RES GET_TEMP ",
        takes_argument: false,
    },
    CatalogEntry {
        code: CommandCode::GetHum,
        name: "GET_HUM",
        expected_prefix: "RES GET_HUM ",
        takes_argument: false,
    },
];

impl CommandCode {
    /// All codes in catalog order.
    pub const ALL: [CommandCode; 5] = [
        CommandCode::GetLdr,
        CommandCode::GetLed,
        CommandCode::SetLed,
        CommandCode::GetTemp,
        CommandCode::GetHum,
    ];

    /// Parse a command name as written on the wire.
    pub fn parse(s: &str) -> Result<Self> {
        CATALOG
            .iter()
            .find(|entry| entry.name == s)
            .map(|entry| entry.code)
            .ok_or_else(|| Error::InvalidValue(format!("unknown command {s:?}")))
    }

    /// Catalog row for this code.
    #[inline]
    pub fn entry(&self) -> &'static CatalogEntry {
        &CATALOG[*self as usize]
    }

    /// Command name as written on the wire.
    #[inline]
    pub fn as_str(&self) -> &'static str {
        self.entry().name
    }

    /// Prefix a reply to this command must start with.
    #[inline]
    pub fn expected_prefix(&self) -> &'static str {
        self.entry().expected_prefix
    }

    /// Returns `true` if the command carries an integer argument.
    #[inline]
    pub fn takes_argument(&self) -> bool {
        self.entry().takes_argument
    }

    /// Returns `true` if the command only reads device state.
    ///
    /// # Example
    /// ```
    /// use smartlamp_protocol::CommandCode;
    ///
    /// assert!(CommandCode::GetTemp.is_query());
    /// assert!(!CommandCode::SetLed.is_query());
    /// ```
    #[inline]
    pub fn is_query(&self) -> bool {
        !self.takes_argument()
    }
}

impl fmt::Display for CommandCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully formed request: wire text plus the reply prefix it expects.
///
/// Built from the catalog and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    code: CommandCode,
    argument: Option<i32>,
    text: String,
}

impl Command {
    /// Build an argument-less command.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidValue`] if the command requires an argument.
    pub fn new(code: CommandCode) -> Result<Self> {
        if code.takes_argument() {
            return Err(Error::InvalidValue(format!("{code} requires an argument")));
        }
        Ok(Self {
            code,
            argument: None,
            text: code.as_str().to_string(),
        })
    }

    /// Build a command that carries an integer argument.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidValue`] if the command takes no argument.
    pub fn with_argument(code: CommandCode, argument: i32) -> Result<Self> {
        if !code.takes_argument() {
            return Err(Error::InvalidValue(format!("{code} takes no argument")));
        }
        Ok(Self {
            code,
            argument: Some(argument),
            text: format!("{} {}", code.as_str(), argument),
        })
    }

    /// Catalog code of this command.
    pub fn code(&self) -> CommandCode {
        self.code
    }

    /// Command name, e.g. `"SET_LED"`.
    pub fn name(&self) -> &'static str {
        self.code.as_str()
    }

    /// Argument sent with the command, if any.
    pub fn argument(&self) -> Option<i32> {
        self.argument
    }

    /// Exact text written to the device, e.g. `"SET_LED 80"`.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Prefix a valid reply must start with, e.g. `"RES SET_LED "`.
    pub fn expected_prefix(&self) -> &'static str {
        self.code.expected_prefix()
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
