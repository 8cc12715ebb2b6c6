//! Named lamp attributes.
//!
//! Front ends address the lamp by short attribute names (`ldr`, `led`,
//! `temp`, `hum`). Each name is resolved once into an [`Attribute`], which
//! knows the catalog commands that read and write it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use smartlamp_core::{Error, Result};

use crate::commands::{Command, CommandCode};

/// A readable (and possibly writable) value exposed by the lamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Attribute {
    /// Ambient light level from the light-dependent resistor.
    Ldr,

    /// LED brightness.
    Led,

    /// Temperature reading.
    Temp,

    /// Relative humidity reading.
    Hum,
}

impl Attribute {
    /// All attributes in display order.
    pub const ALL: [Attribute; 4] = [
        Attribute::Led,
        Attribute::Ldr,
        Attribute::Temp,
        Attribute::Hum,
    ];

    /// Attribute name as shown to users.
    pub fn name(&self) -> &'static str {
        match self {
            Attribute::Ldr => "ldr",
            Attribute::Led => "led",
            Attribute::Temp => "temp",
            Attribute::Hum => "hum",
        }
    }

    /// Command that reads this attribute.
    pub fn read_code(&self) -> CommandCode {
        match self {
            Attribute::Ldr => CommandCode::GetLdr,
            Attribute::Led => CommandCode::GetLed,
            Attribute::Temp => CommandCode::GetTemp,
            Attribute::Hum => CommandCode::GetHum,
        }
    }

    /// Command that writes this attribute, if it is writable.
    pub fn write_code(&self) -> Option<CommandCode> {
        match self {
            Attribute::Led => Some(CommandCode::SetLed),
            _ => None,
        }
    }

    /// Returns `true` if the attribute accepts writes.
    pub fn is_writable(&self) -> bool {
        self.write_code().is_some()
    }

    /// Build the read command for this attribute.
    pub fn read_command(&self) -> Result<Command> {
        Command::new(self.read_code())
    }

    /// Build the write command for this attribute.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ReadOnlyAttribute`] for sensors.
    pub fn write_command(&self, value: i32) -> Result<Command> {
        let code = self
            .write_code()
            .ok_or_else(|| Error::ReadOnlyAttribute(self.name().to_string()))?;
        Command::with_argument(code, value)
    }
}

impl FromStr for Attribute {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Attribute::ALL
            .into_iter()
            .find(|attr| attr.name() == s)
            .ok_or_else(|| Error::UnknownAttribute(s.to_string()))
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("ldr", Attribute::Ldr, "GET_LDR")]
    #[case("led", Attribute::Led, "GET_LED")]
    #[case("temp", Attribute::Temp, "GET_TEMP")]
    #[case("hum", Attribute::Hum, "GET_HUM")]
    fn test_resolve_and_read(#[case] name: &str, #[case] attr: Attribute, #[case] text: &str) {
        let parsed: Attribute = name.parse().unwrap();
        assert_eq!(parsed, attr);
        assert_eq!(parsed.read_command().unwrap().text(), text);
        assert_eq!(parsed.to_string(), name);
    }

    #[test]
    fn test_unknown_attribute() {
        let err = "dht".parse::<Attribute>().unwrap_err();
        assert!(matches!(err, Error::UnknownAttribute(name) if name == "dht"));
    }

    #[test]
    fn test_only_led_is_writable() {
        let writable: Vec<_> = Attribute::ALL.iter().filter(|a| a.is_writable()).collect();
        assert_eq!(writable, vec![&Attribute::Led]);

        let cmd = Attribute::Led.write_command(100).unwrap();
        assert_eq!(cmd.text(), "SET_LED 100");
    }

    #[test]
    fn test_sensor_write_rejected() {
        let err = Attribute::Temp.write_command(5).unwrap_err();
        assert!(matches!(err, Error::ReadOnlyAttribute(name) if name == "temp"));
    }
}
