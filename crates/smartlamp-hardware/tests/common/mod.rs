//! Shared helpers for the lamp integration tests.
//!
//! Transactions here run against [`MockTransport`] scripts, whose reads fail
//! immediately once the script is exhausted, so the short timeouts below
//! only bound the pathological cases.

#![allow(dead_code)]

use std::time::Duration;

use smartlamp_core::{Result, TransactionConfig};
use smartlamp_hardware::mock::MockTransport;
use smartlamp_hardware::{LineFramer, Transaction, TransactionStats};
use smartlamp_protocol::{Command, CommandCode};

/// Per-attempt timeout used by every test.
pub const TEST_TIMEOUT: Duration = Duration::from_millis(50);

/// Budget matching the device default.
pub const TEST_BUDGET: u32 = 10;

/// Config with the default budget and a short timeout.
pub fn fast_config() -> TransactionConfig {
    TransactionConfig::default().with_read_timeout(TEST_TIMEOUT)
}

/// Build a query command.
pub fn query(code: CommandCode) -> Command {
    Command::new(code).expect("query command")
}

/// Run one transaction to completion with a fresh framer.
pub fn run(
    transport: &mut MockTransport,
    command: &Command,
    budget: u32,
) -> (Result<i32>, TransactionStats) {
    let mut framer = LineFramer::default();
    run_with_framer(transport, &mut framer, command, budget)
}

/// Run one transaction sharing `framer` with earlier ones.
pub fn run_with_framer(
    transport: &mut MockTransport,
    framer: &mut LineFramer,
    command: &Command,
    budget: u32,
) -> (Result<i32>, TransactionStats) {
    let mut transaction = Transaction::new(command, budget, TEST_TIMEOUT);
    let result = transaction.run(transport, framer);
    (result, transaction.stats())
}

/// Assert the transport saw exactly one write, equal to `text`.
pub fn assert_single_write(transport: &MockTransport, text: &str) {
    assert_eq!(
        transport.writes().len(),
        1,
        "expected exactly one write, got {:?}",
        transport.writes()
    );
    assert_eq!(transport.writes()[0], text.as_bytes());
}
