//! Host-side driver for the SmartLamp peripheral.
//!
//! This crate turns get/set requests into text commands, sends them over a
//! byte link, and reliably pulls the matching numeric reply out of the
//! lamp's line-oriented output.
//!
//! # Layers
//!
//! ```text
//! AttributeTable / LedBrightness     adapters (text files, LED control)
//!            │
//!        SmartLamp                   lock held per transaction
//!            │
//!         Session                    owns transport + framer + config
//!            │
//!       Transaction ──> LineFramer   send, await line, match, retry
//!            │              │
//!            └── Transport ─┘        USB bulk, serial port, mock
//! ```
//!
//! # Example
//!
//! ```
//! use smartlamp_hardware::SmartLamp;
//! use smartlamp_hardware::mock::SimulatedLamp;
//! use smartlamp_core::TransactionConfig;
//! use smartlamp_protocol::Attribute;
//!
//! let lamp = SmartLamp::new(SimulatedLamp::new().with_hum(41), TransactionConfig::default())?;
//! assert_eq!(lamp.get(Attribute::Hum)?, 41);
//! # Ok::<(), smartlamp_core::Error>(())
//! ```
//!
//! # Features
//!
//! - `hardware-serial`: [`SerialTransport`] over the host serial driver.
//! - `hardware-usb`: [`UsbBulkTransport`] over libusb bulk endpoints.

pub mod attributes;
pub mod framer;
pub mod led;
pub mod mock;
pub mod session;
pub mod traits;
pub mod transaction;

#[cfg(feature = "hardware-serial")]
pub mod serial;
#[cfg(feature = "hardware-usb")]
pub mod usb;

pub use attributes::AttributeTable;
pub use framer::{FramerState, LineFramer};
pub use led::LedBrightness;
pub use session::{Session, SmartLamp};
pub use traits::Transport;
pub use transaction::{Transaction, TransactionState, TransactionStats};

#[cfg(feature = "hardware-serial")]
pub use serial::SerialTransport;
#[cfg(feature = "hardware-usb")]
pub use usb::{BulkEndpoints, UsbBulkTransport};
