//! LED brightness adapter.
//!
//! Presents the lamp LED as a brightness control (the shape platform LED
//! registries expect: an unsigned level in, a level out). Set and get are
//! serialised by the adapter's own lock, which also guards the cached
//! level.
//!
//! The cache is written only after the device accepted a `SET_LED`, and is
//! read only when a live `GET_LED` fails.

use std::sync::{Arc, Mutex};

use smartlamp_core::constants::FAILURE_SENTINEL;
use smartlamp_core::{Error, Result};
use smartlamp_protocol::Attribute;
use tracing::{info, warn};

use crate::session::SmartLamp;
use crate::traits::Transport;

/// Default name the LED is registered under.
pub const DEFAULT_LED_NAME: &str = "smartlamp_led";

/// Brightness control backed by `SET_LED` / `GET_LED`.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use smartlamp_hardware::{LedBrightness, SmartLamp};
/// use smartlamp_hardware::mock::SimulatedLamp;
/// use smartlamp_core::TransactionConfig;
///
/// let lamp = Arc::new(SmartLamp::new(SimulatedLamp::new(), TransactionConfig::default()).unwrap());
/// let led = LedBrightness::new(lamp);
///
/// led.set_brightness(80).unwrap();
/// assert_eq!(led.brightness(), 80);
/// assert_eq!(led.cached_brightness(), Some(80));
/// ```
#[derive(Debug)]
pub struct LedBrightness<T: Transport> {
    lamp: Arc<SmartLamp<T>>,
    name: String,
    cached: Mutex<Option<i32>>,
}

impl<T: Transport> LedBrightness<T> {
    /// Create an adapter with the default LED name.
    pub fn new(lamp: Arc<SmartLamp<T>>) -> Self {
        Self::with_name(lamp, DEFAULT_LED_NAME)
    }

    /// Create an adapter with a custom LED name.
    pub fn with_name(lamp: Arc<SmartLamp<T>>, name: impl Into<String>) -> Self {
        Self {
            lamp,
            name: name.into(),
            cached: Mutex::new(None),
        }
    }

    /// Name the LED is registered under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Send a new brightness level to the lamp.
    ///
    /// Returns the device's status value. The cache is updated only when
    /// the status is non-negative.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidValue`] if `level` does not fit the wire format.
    /// - [`Error::AccessDenied`] if the device reported a negative status.
    /// - Any transaction error.
    pub fn set_brightness(&self, level: u32) -> Result<i32> {
        let level = i32::try_from(level)
            .map_err(|_| Error::InvalidValue(format!("brightness {level} out of range")))?;

        let mut cached = self.lock_cache()?;
        let status = self.lamp.set(Attribute::Led, level)?;
        if status < 0 {
            warn!(led = %self.name, level, status, "Lamp refused brightness");
            return Err(Error::access_denied(Attribute::Led.name()));
        }

        *cached = Some(level);
        info!(led = %self.name, level, "LED set brightness");
        Ok(status)
    }

    /// Query the current brightness.
    ///
    /// Falls back to the last level successfully set, or
    /// [`FAILURE_SENTINEL`] if nothing was ever set.
    pub fn brightness(&self) -> i32 {
        let cached = match self.lock_cache() {
            Ok(guard) => guard,
            Err(e) => {
                warn!(led = %self.name, "{}", e);
                return FAILURE_SENTINEL;
            }
        };

        match self.lamp.get(Attribute::Led) {
            Ok(level) => {
                info!(led = %self.name, level, "LED get brightness");
                level
            }
            Err(e) => {
                let fallback = (*cached).unwrap_or(e.to_sentinel());
                warn!(led = %self.name, fallback, "Brightness query failed: {}", e);
                fallback
            }
        }
    }

    /// Last level accepted by the device, if any.
    pub fn cached_brightness(&self) -> Option<i32> {
        self.cached.lock().ok().and_then(|guard| *guard)
    }

    fn lock_cache(&self) -> Result<std::sync::MutexGuard<'_, Option<i32>>> {
        self.cached
            .lock()
            .map_err(|_| Error::other("LED cache lock poisoned"))
    }
}
