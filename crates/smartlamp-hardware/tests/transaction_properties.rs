//! End-to-end behaviour of a single request/response transaction.
//!
//! Each test drives a real [`Transaction`] and [`LineFramer`] over a
//! scripted transport and checks what went over the wire, what came back
//! and how much of the retry budget was spent.

mod common;

use common::{TEST_BUDGET, assert_single_write, fast_config, query, run, run_with_framer};
use rstest::rstest;
use smartlamp_core::Error;
use smartlamp_hardware::mock::{MockTransport, ReadEvent, SimulatedLamp, WriteBehavior};
use smartlamp_hardware::{LineFramer, SmartLamp};
use smartlamp_protocol::{Attribute, Command, CommandCode};

// ============================================================================
// Wire discipline
// ============================================================================

#[rstest]
#[case(CommandCode::GetLdr, "RES GET_LDR 512", 512)]
#[case(CommandCode::GetLed, "RES GET_LED 0", 0)]
#[case(CommandCode::GetTemp, "RES GET_TEMP -3", -3)]
#[case(CommandCode::GetHum, "RES GET_HUM 61", 61)]
fn test_each_query_writes_once(
    #[case] code: CommandCode,
    #[case] reply: &str,
    #[case] expected: i32,
) {
    let command = query(code);
    let mut transport = MockTransport::new().with_line(reply);

    let (result, _) = run(&mut transport, &command, TEST_BUDGET);

    assert_eq!(result.unwrap(), expected);
    assert_single_write(&transport, code.as_str());
}

#[test]
fn test_no_resend_while_retrying() {
    let command = query(CommandCode::GetLdr);
    let mut transport = MockTransport::new()
        .with_timeout()
        .with_line("noise")
        .with_timeout()
        .with_line("RES GET_LDR 9");

    let (result, stats) = run(&mut transport, &command, TEST_BUDGET);

    assert_eq!(result.unwrap(), 9);
    assert_eq!(stats.attempts, 4);
    assert_single_write(&transport, "GET_LDR");
}

#[test]
fn test_set_led_writes_argument() {
    let command = Command::with_argument(CommandCode::SetLed, 80).unwrap();
    let mut transport = MockTransport::new().with_line("RES SET_LED 1");

    let (result, _) = run(&mut transport, &command, TEST_BUDGET);

    assert_eq!(result.unwrap(), 1);
    assert_single_write(&transport, "SET_LED 80");
}

#[rstest]
#[case(WriteBehavior::Fail)]
#[case(WriteBehavior::Partial(3))]
fn test_write_failure_is_terminal(#[case] behavior: WriteBehavior) {
    let command = query(CommandCode::GetLdr);
    let mut transport = MockTransport::new()
        .with_write_behavior(behavior)
        .with_line("RES GET_LDR 512");

    let (result, stats) = run(&mut transport, &command, TEST_BUDGET);

    assert!(result.unwrap_err().is_transport());
    assert_eq!(stats.attempts, 0);
    assert_eq!(transport.read_calls(), 0);
}

// ============================================================================
// Framing
// ============================================================================

#[test]
fn test_bytewise_delivery() {
    let command = query(CommandCode::GetLdr);
    let mut transport = MockTransport::new().with_bytewise("RES GET_LDR 512\n");

    let (result, stats) = run(&mut transport, &command, TEST_BUDGET);

    assert_eq!(result.unwrap(), 512);
    assert_eq!(stats.attempts, 1);
    assert_eq!(transport.read_calls(), 16);
}

#[test]
fn test_two_lines_in_one_chunk() {
    let command = query(CommandCode::GetLdr);
    let mut transport = MockTransport::new().with_chunk(b"RES GET_LED 1\nRES GET_LDR 512\n");

    let (result, stats) = run(&mut transport, &command, TEST_BUDGET);

    assert_eq!(result.unwrap(), 512);
    assert_eq!(stats.attempts, 2);
    assert_eq!(transport.read_calls(), 1);
}

#[test]
fn test_line_at_capacity_is_delivered() {
    let mut framer = LineFramer::new(100);
    let line = "x".repeat(100);
    framer.feed(line.as_bytes());
    framer.feed(b"\n");

    let framed = framer.take_line().unwrap().unwrap();
    assert_eq!(framed.len(), 100);
}

#[test]
fn test_line_over_capacity_overflows() {
    let mut framer = LineFramer::new(100);
    framer.feed("x".repeat(101).as_bytes());

    assert!(matches!(
        framer.take_line(),
        Err(Error::LineOverflow { capacity: 100 })
    ));
}

#[test]
fn test_overflow_costs_one_attempt() {
    let command = query(CommandCode::GetTemp);
    let mut long = "y".repeat(150);
    long.push('\n');
    let mut transport = MockTransport::new()
        .with_chunk(long.as_bytes())
        .with_line("RES GET_TEMP 21");

    let (result, stats) = run(&mut transport, &command, TEST_BUDGET);

    assert_eq!(result.unwrap(), 21);
    assert_eq!(stats.attempts, 2);
    assert_eq!(stats.read_errors, 1);
}

#[test]
fn test_stale_carry_over_dropped() {
    let mut framer = LineFramer::default();
    let mut transport = MockTransport::new()
        .with_chunk(b"RES GET_LDR 512\nRES GET_LDR 999\n")
        .with_line("RES GET_LDR 300");

    let command = query(CommandCode::GetLdr);
    let (first, _) = run_with_framer(&mut transport, &mut framer, &command, TEST_BUDGET);
    let (second, _) = run_with_framer(&mut transport, &mut framer, &command, TEST_BUDGET);

    assert_eq!(first.unwrap(), 512);
    assert_eq!(second.unwrap(), 300);
}

// ============================================================================
// Retry budget
// ============================================================================

#[test]
fn test_mismatch_then_match() {
    let command = query(CommandCode::GetLdr);
    let mut transport = MockTransport::new()
        .with_line("RES GET_LED 1")
        .with_line("RES GET_LDR 512");

    let (result, stats) = run(&mut transport, &command, TEST_BUDGET);

    assert_eq!(result.unwrap(), 512);
    assert_eq!(stats.attempts, 2);
    assert_eq!(stats.soft_misses, 1);
}

#[rstest]
#[case(1)]
#[case(3)]
#[case(10)]
fn test_silent_device_exhausts_budget(#[case] budget: u32) {
    let command = query(CommandCode::GetHum);
    let mut transport = MockTransport::new();

    let (result, stats) = run(&mut transport, &command, budget);

    match result.unwrap_err() {
        Error::NoValidResponse { command, attempts } => {
            assert_eq!(command, "GET_HUM");
            assert_eq!(attempts, budget);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(stats.read_errors, budget);
    assert_eq!(transport.read_calls(), budget as usize);
}

#[test]
fn test_garbage_consumes_budget() {
    let command = query(CommandCode::GetLdr);
    let mut transport = MockTransport::new();
    for _ in 0..TEST_BUDGET {
        transport.push_line("abc");
    }

    let (result, stats) = run(&mut transport, &command, TEST_BUDGET);

    assert!(matches!(result, Err(Error::NoValidResponse { attempts: 10, .. })));
    assert_eq!(stats.soft_misses, TEST_BUDGET);
    assert_eq!(transport.remaining_events(), 0);
}

#[test]
fn test_malformed_value_is_soft_miss() {
    let command = query(CommandCode::GetLdr);
    let mut transport = MockTransport::new()
        .with_line("RES GET_LDR abc")
        .with_line("RES GET_LDR 77");

    let (result, stats) = run(&mut transport, &command, TEST_BUDGET);

    assert_eq!(result.unwrap(), 77);
    assert_eq!(stats.soft_misses, 1);
}

#[rstest]
#[case(ReadEvent::Fault("stall".to_string()))]
#[case(ReadEvent::Disconnect)]
#[case(ReadEvent::Timeout)]
fn test_read_error_is_retried(#[case] event: ReadEvent) {
    let command = query(CommandCode::GetLed);
    let mut transport = MockTransport::new()
        .with_event(event)
        .with_line("RES GET_LED 40");

    let (result, stats) = run(&mut transport, &command, TEST_BUDGET);

    assert_eq!(result.unwrap(), 40);
    assert_eq!(stats.read_errors, 1);
}

#[test]
fn test_reply_after_budget_is_not_reached() {
    let command = query(CommandCode::GetLdr);
    let mut transport = MockTransport::new()
        .with_line("one")
        .with_line("two")
        .with_line("RES GET_LDR 1");

    let (result, _) = run(&mut transport, &command, 2);

    assert!(matches!(result, Err(Error::NoValidResponse { attempts: 2, .. })));
    assert_eq!(transport.remaining_events(), 1);
}

// ============================================================================
// Device behaviour
// ============================================================================

#[test]
fn test_repeated_queries_are_stable() {
    let lamp = SmartLamp::new(SimulatedLamp::new().with_ldr(512), fast_config()).unwrap();

    let first = lamp.get(Attribute::Ldr).unwrap();
    let second = lamp.get(Attribute::Ldr).unwrap();

    assert_eq!(first, 512);
    assert_eq!(first, second);
}

#[test]
fn test_set_then_get_led() {
    let lamp = SmartLamp::new(SimulatedLamp::new(), fast_config()).unwrap();

    assert_eq!(lamp.set(Attribute::Led, 80).unwrap(), 1);
    assert_eq!(lamp.get(Attribute::Led).unwrap(), 80);
}

#[test]
fn test_noisy_chunked_device() {
    let device = SimulatedLamp::new()
        .with_temp(19)
        .with_noise("DBG tick")
        .with_noise("RES GET_HUM 40")
        .with_chunk_size(3);
    let lamp = SmartLamp::new(device, fast_config()).unwrap();

    assert_eq!(lamp.get(Attribute::Temp).unwrap(), 19);
    let stats = lamp.with_session(|s| s.last_stats()).unwrap().unwrap();
    assert_eq!(stats.attempts, 3);
    assert_eq!(stats.soft_misses, 2);
}

#[test]
fn test_echoed_set_argument() {
    let device = SimulatedLamp::new().with_echoed_argument(true);
    let lamp = SmartLamp::new(device, fast_config()).unwrap();

    assert_eq!(lamp.set(Attribute::Led, 80).unwrap(), 1);
    assert_eq!(lamp.set(Attribute::Led, 300).unwrap(), -1);
    assert_eq!(lamp.get(Attribute::Led).unwrap(), 80);
}

#[test]
fn test_unplugged_device() {
    let lamp = SmartLamp::new(SimulatedLamp::new(), fast_config()).unwrap();
    lamp.with_session(|s| s.transport_mut().unplug()).unwrap();

    let err = lamp.get(Attribute::Ldr).unwrap_err();
    assert!(matches!(err, Error::Disconnected { .. }));
}
