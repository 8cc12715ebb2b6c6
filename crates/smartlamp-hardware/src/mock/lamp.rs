//! Simulated lamp firmware.
//!
//! [`SimulatedLamp`] answers commands the way the lamp firmware does, so
//! sessions and adapters can be exercised end to end without a board.
//! Replies are queued on write and drained by reads in configurable chunk
//! sizes. Optional noise lines (boot banners, debug prints) are emitted
//! before every reply.

use std::collections::VecDeque;
use std::time::Duration;

use smartlamp_core::constants::{DEFAULT_MAX_TRANSFER_SIZE, RESPONSE_TAG};
use smartlamp_core::{Error, Result};
use smartlamp_protocol::CommandCode;

use crate::traits::Transport;

/// Highest brightness the firmware accepts.
pub const MAX_LED_LEVEL: i32 = 100;

/// Deterministic model of the lamp firmware.
///
/// # Examples
///
/// ```
/// use smartlamp_hardware::mock::SimulatedLamp;
/// use smartlamp_hardware::Transport;
/// use std::time::Duration;
///
/// let mut lamp = SimulatedLamp::new().with_ldr(512);
/// lamp.write(b"GET_LDR", Duration::from_millis(10)).unwrap();
///
/// let mut buf = [0u8; 64];
/// let n = lamp.read(&mut buf, Duration::from_millis(10)).unwrap();
/// assert_eq!(&buf[..n], b"RES GET_LDR 512\n");
/// ```
#[derive(Debug)]
pub struct SimulatedLamp {
    ldr: i32,
    led: i32,
    temp: i32,
    hum: i32,
    noise: Vec<String>,
    chunk_size: usize,
    echo_argument: bool,
    outbox: VecDeque<u8>,
    commands: Vec<String>,
    connected: bool,
}

impl SimulatedLamp {
    /// Create a lamp with LED off and room-condition sensor readings.
    pub fn new() -> Self {
        Self {
            ldr: 512,
            led: 0,
            temp: 25,
            hum: 40,
            noise: Vec::new(),
            chunk_size: DEFAULT_MAX_TRANSFER_SIZE,
            echo_argument: false,
            outbox: VecDeque::new(),
            commands: Vec::new(),
            connected: true,
        }
    }

    /// Set the light sensor reading.
    pub fn with_ldr(mut self, ldr: i32) -> Self {
        self.ldr = ldr;
        self
    }

    /// Set the initial LED level.
    pub fn with_led(mut self, led: i32) -> Self {
        self.led = led;
        self
    }

    /// Set the temperature reading.
    pub fn with_temp(mut self, temp: i32) -> Self {
        self.temp = temp;
        self
    }

    /// Set the humidity reading.
    pub fn with_hum(mut self, hum: i32) -> Self {
        self.hum = hum;
        self
    }

    /// Emit `line` before every reply.
    pub fn with_noise(mut self, line: impl Into<String>) -> Self {
        self.noise.push(line.into());
        self
    }

    /// Deliver at most `chunk_size` bytes per read.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Echo the argument of `SET_LED` in its reply (`RES SET_LED 80 1`).
    pub fn with_echoed_argument(mut self, echo: bool) -> Self {
        self.echo_argument = echo;
        self
    }

    /// Current LED level.
    pub fn led(&self) -> i32 {
        self.led
    }

    /// Commands received so far, as text.
    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    /// Simulate unplugging the board.
    pub fn unplug(&mut self) {
        self.connected = false;
        self.outbox.clear();
    }

    fn queue_line(&mut self, line: &str) {
        self.outbox.extend(line.bytes());
        self.outbox.push_back(b'\n');
    }

    fn respond(&mut self, text: &str) {
        let mut tokens = text.split_whitespace();
        let name = tokens.next().unwrap_or_default();
        let argument = tokens.next();

        let reply = match (CommandCode::parse(name), argument) {
            (Ok(CommandCode::GetLdr), None) => format!("{RESPONSE_TAG} {name} {}", self.ldr),
            (Ok(CommandCode::GetLed), None) => format!("{RESPONSE_TAG} {name} {}", self.led),
            (Ok(CommandCode::GetTemp), None) => format!("{RESPONSE_TAG} {name} {}", self.temp),
            (Ok(CommandCode::GetHum), None) => format!("{RESPONSE_TAG} {name} {}", self.hum),
            (Ok(CommandCode::SetLed), Some(arg)) => {
                let status = match arg.parse::<i32>() {
                    Ok(level) if (0..=MAX_LED_LEVEL).contains(&level) => {
                        self.led = level;
                        1
                    }
                    _ => -1,
                };
                if self.echo_argument {
                    format!("{RESPONSE_TAG} {name} {arg} {status}")
                } else {
                    format!("{RESPONSE_TAG} {name} {status}")
                }
            }
            _ => "ERR UNKNOWN_COMMAND".to_string(),
        };

        for noise in self.noise.clone() {
            self.queue_line(&noise);
        }
        self.queue_line(&reply);
    }
}

impl Default for SimulatedLamp {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for SimulatedLamp {
    fn write(&mut self, bytes: &[u8], _timeout: Duration) -> Result<usize> {
        if !self.connected {
            return Err(Error::disconnected("simulated lamp"));
        }

        let text = String::from_utf8_lossy(bytes).trim_end().to_string();
        self.respond(&text);
        self.commands.push(text);
        Ok(bytes.len())
    }

    fn read(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize> {
        if !self.connected {
            return Err(Error::disconnected("simulated lamp"));
        }
        if self.outbox.is_empty() {
            return Err(Error::timeout(timeout.as_millis() as u64));
        }

        let n = buf.len().min(self.chunk_size).min(self.outbox.len());
        for (slot, byte) in buf.iter_mut().zip(self.outbox.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }

    fn max_transfer_size(&self) -> usize {
        self.chunk_size
    }

    fn name(&self) -> &str {
        "simulated lamp"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_millis(10);

    fn read_all(lamp: &mut SimulatedLamp) -> String {
        let mut out = Vec::new();
        let mut buf = [0u8; 16];
        while let Ok(n) = lamp.read(&mut buf, TIMEOUT) {
            out.extend_from_slice(&buf[..n]);
        }
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_sensor_replies() {
        let mut lamp = SimulatedLamp::new().with_temp(23).with_hum(41);

        lamp.write(b"GET_TEMP", TIMEOUT).unwrap();
        lamp.write(b"GET_HUM", TIMEOUT).unwrap();

        assert_eq!(read_all(&mut lamp), "RES GET_TEMP 23\nRES GET_HUM 41\n");
    }

    #[test]
    fn test_set_then_get_led() {
        let mut lamp = SimulatedLamp::new();

        lamp.write(b"SET_LED 80", TIMEOUT).unwrap();
        lamp.write(b"GET_LED", TIMEOUT).unwrap();

        assert_eq!(read_all(&mut lamp), "RES SET_LED 1\nRES GET_LED 80\n");
        assert_eq!(lamp.led(), 80);
    }

    #[test]
    fn test_out_of_range_level_rejected() {
        let mut lamp = SimulatedLamp::new().with_led(10);

        lamp.write(b"SET_LED 150", TIMEOUT).unwrap();

        assert_eq!(read_all(&mut lamp), "RES SET_LED -1\n");
        assert_eq!(lamp.led(), 10);
    }

    #[test]
    fn test_noise_and_unknown_commands() {
        let mut lamp = SimulatedLamp::new().with_noise("DBG boot ok");

        lamp.write(b"GET_DHT\n", TIMEOUT).unwrap();

        assert_eq!(read_all(&mut lamp), "DBG boot ok\nERR UNKNOWN_COMMAND\n");
        assert_eq!(lamp.commands(), &["GET_DHT".to_string()]);
    }

    #[test]
    fn test_chunked_reads() {
        let mut lamp = SimulatedLamp::new().with_ldr(7).with_chunk_size(1);
        lamp.write(b"GET_LDR", TIMEOUT).unwrap();

        let mut buf = [0u8; 16];
        assert_eq!(lamp.read(&mut buf, TIMEOUT).unwrap(), 1);
        assert_eq!(buf[0], b'R');
    }

    #[test]
    fn test_unplugged_lamp_fails() {
        let mut lamp = SimulatedLamp::new();
        lamp.unplug();

        assert!(matches!(
            lamp.write(b"GET_LDR", TIMEOUT),
            Err(Error::Disconnected { .. })
        ));
    }
}
