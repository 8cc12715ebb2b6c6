//! Text attribute interface.
//!
//! Exposes the lamp as a set of small text files, one value per attribute
//! (`led`, `ldr`, `temp`, `hum`). Reads render the value followed by a
//! newline; a failed read renders the failure sentinel instead. Writes
//! parse a base-10 integer and are accepted only for `led`.

use std::sync::Arc;

use smartlamp_core::{Error, Result};
use smartlamp_protocol::Attribute;
use tracing::{info, warn};

use crate::session::SmartLamp;
use crate::traits::Transport;

/// Name of the directory the attributes live under.
pub const ATTRIBUTE_GROUP: &str = "smartlamp";

/// Text read/write handlers for every lamp attribute.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use smartlamp_hardware::{AttributeTable, SmartLamp};
/// use smartlamp_hardware::mock::SimulatedLamp;
/// use smartlamp_core::TransactionConfig;
/// use smartlamp_protocol::Attribute;
///
/// let lamp = Arc::new(SmartLamp::new(SimulatedLamp::new().with_ldr(512), TransactionConfig::default()).unwrap());
/// let table = AttributeTable::new(lamp);
///
/// assert_eq!(table.show(Attribute::Ldr), "512\n");
/// assert_eq!(table.store(Attribute::Led, "80\n").unwrap(), 3);
/// assert_eq!(table.show(Attribute::Led), "80\n");
/// ```
#[derive(Debug)]
pub struct AttributeTable<T: Transport> {
    lamp: Arc<SmartLamp<T>>,
}

impl<T: Transport> AttributeTable<T> {
    /// Create the table over a shared lamp.
    pub fn new(lamp: Arc<SmartLamp<T>>) -> Self {
        Self { lamp }
    }

    /// Resolve an attribute file name.
    pub fn lookup(&self, name: &str) -> Result<Attribute> {
        name.parse()
    }

    /// Attribute names in display order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> {
        Attribute::ALL.into_iter().map(|attr| attr.name())
    }

    /// Render an attribute's current value.
    pub fn show(&self, attribute: Attribute) -> String {
        info!(group = ATTRIBUTE_GROUP, "Reading {}", attribute);

        let value = self.lamp.get(attribute).unwrap_or_else(|e| {
            warn!(group = ATTRIBUTE_GROUP, "Failed to read {}: {}", attribute, e);
            e.to_sentinel()
        });
        format!("{value}\n")
    }

    /// Render every attribute, in display order.
    pub fn show_all(&self) -> Vec<(Attribute, String)> {
        Attribute::ALL
            .into_iter()
            .map(|attr| (attr, self.show(attr)))
            .collect()
    }

    /// Parse `input` and write it to `attribute`.
    ///
    /// Returns the number of input bytes consumed (all of them).
    ///
    /// # Errors
    ///
    /// - [`Error::ReadOnlyAttribute`] for sensors.
    /// - [`Error::AccessDenied`] if the input is not an integer, the
    ///   transaction fails, or the device reports a negative status.
    pub fn store(&self, attribute: Attribute, input: &str) -> Result<usize> {
        if !attribute.is_writable() {
            return Err(Error::ReadOnlyAttribute(attribute.name().to_string()));
        }

        let value: i32 = input.trim().parse().map_err(|_| {
            warn!(group = ATTRIBUTE_GROUP, "Invalid value for {}: {:?}", attribute, input);
            Error::access_denied(attribute.name())
        })?;

        info!(group = ATTRIBUTE_GROUP, "Setting {} to {}", attribute, value);
        match self.lamp.set(attribute, value) {
            Ok(status) if status >= 0 => Ok(input.len()),
            Ok(status) => {
                warn!(group = ATTRIBUTE_GROUP, status, "Lamp refused {} = {}", attribute, value);
                Err(Error::access_denied(attribute.name()))
            }
            Err(e) => {
                warn!(group = ATTRIBUTE_GROUP, "Failed to set {}: {}", attribute, e);
                Err(Error::access_denied(attribute.name()))
            }
        }
    }
}
