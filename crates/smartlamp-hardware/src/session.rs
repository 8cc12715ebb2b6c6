//! Lamp sessions.
//!
//! A [`Session`] owns everything one physical link needs: the transport,
//! the framer with its carry-over buffer, and the transaction settings.
//! [`SmartLamp`] puts a session behind a mutex so adapters on different
//! threads can share one link; the lock is held for the full transaction
//! (write plus every retried read).
//!
//! # Example
//!
//! ```
//! use smartlamp_hardware::SmartLamp;
//! use smartlamp_hardware::mock::SimulatedLamp;
//! use smartlamp_core::TransactionConfig;
//! use smartlamp_protocol::Attribute;
//!
//! let lamp = SmartLamp::new(SimulatedLamp::new().with_ldr(512), TransactionConfig::default())?;
//!
//! assert_eq!(lamp.get(Attribute::Ldr)?, 512);
//! assert_eq!(lamp.set(Attribute::Led, 80)?, 1);
//! assert_eq!(lamp.get_by_name("led")?, 80);
//! # Ok::<(), smartlamp_core::Error>(())
//! ```

use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use smartlamp_core::{Error, Result, TransactionConfig};
use smartlamp_protocol::{Attribute, Command};
use tracing::debug;

use crate::framer::LineFramer;
use crate::traits::Transport;
use crate::transaction::{Transaction, TransactionStats};

/// Connection state for one lamp: transport, framer and settings.
#[derive(Debug)]
pub struct Session<T: Transport> {
    transport: T,
    framer: LineFramer,
    config: TransactionConfig,
    last_stats: Option<TransactionStats>,
}

impl<T: Transport> Session<T> {
    /// Create a session over `transport`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `config` fails validation.
    pub fn new(transport: T, config: TransactionConfig) -> Result<Self> {
        config.validate()?;
        debug!(
            transport = transport.name(),
            max_transfer_size = transport.max_transfer_size(),
            "Opening lamp session"
        );

        Ok(Self {
            framer: LineFramer::new(config.max_line_len),
            transport,
            config,
            last_stats: None,
        })
    }

    /// Run `command` with the configured budget and timeout.
    pub fn execute(&mut self, command: &Command) -> Result<i32> {
        self.execute_with(command, self.config.retry_budget, self.config.read_timeout)
    }

    /// Run `command` with an explicit budget and per-attempt timeout.
    pub fn execute_with(
        &mut self,
        command: &Command,
        retry_budget: u32,
        read_timeout: Duration,
    ) -> Result<i32> {
        let mut transaction = Transaction::new(command, retry_budget, read_timeout)
            .with_write_timeout(self.config.write_timeout)
            .with_terminated_command(self.config.terminate_commands);

        let result = transaction.run(&mut self.transport, &mut self.framer);
        self.last_stats = Some(transaction.stats());
        result
    }

    /// Budget usage of the most recent transaction.
    pub fn last_stats(&self) -> Option<TransactionStats> {
        self.last_stats
    }

    /// Transaction settings.
    pub fn config(&self) -> &TransactionConfig {
        &self.config
    }

    /// Underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Underlying transport, mutably.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Close the session and return the transport.
    pub fn into_inner(self) -> T {
        self.transport
    }
}

/// Thread-safe handle to one lamp.
///
/// At most one transaction is in flight at a time.
#[derive(Debug)]
pub struct SmartLamp<T: Transport> {
    session: Mutex<Session<T>>,
}

impl<T: Transport> SmartLamp<T> {
    /// Open a lamp over `transport`.
    pub fn new(transport: T, config: TransactionConfig) -> Result<Self> {
        Ok(Self::from_session(Session::new(transport, config)?))
    }

    /// Wrap an existing session.
    pub fn from_session(session: Session<T>) -> Self {
        Self {
            session: Mutex::new(session),
        }
    }

    /// Read an attribute.
    pub fn get(&self, attribute: Attribute) -> Result<i32> {
        self.execute(&attribute.read_command()?)
    }

    /// Write an attribute and return the device's status value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ReadOnlyAttribute`] for sensors, otherwise any
    /// transaction error.
    pub fn set(&self, attribute: Attribute, value: i32) -> Result<i32> {
        self.execute(&attribute.write_command(value)?)
    }

    /// Read an attribute by name.
    pub fn get_by_name(&self, name: &str) -> Result<i32> {
        self.get(name.parse()?)
    }

    /// Write an attribute by name.
    pub fn set_by_name(&self, name: &str, value: i32) -> Result<i32> {
        self.set(name.parse()?, value)
    }

    /// Run an arbitrary catalog command under the session lock.
    pub fn execute(&self, command: &Command) -> Result<i32> {
        self.lock()?.execute(command)
    }

    /// Run `f` with exclusive access to the session.
    pub fn with_session<R>(&self, f: impl FnOnce(&mut Session<T>) -> R) -> Result<R> {
        let mut guard = self.lock()?;
        Ok(f(&mut *guard))
    }

    /// Close the lamp and return the session.
    pub fn into_session(self) -> Result<Session<T>> {
        self.session
            .into_inner()
            .map_err(|_| Error::other("lamp session lock poisoned"))
    }

    fn lock(&self) -> Result<MutexGuard<'_, Session<T>>> {
        self.session
            .lock()
            .map_err(|_| Error::other("lamp session lock poisoned"))
    }
}
