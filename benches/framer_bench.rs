//! Benchmarks for line framing and full transactions.
//!
//! Run with:
//! ```sh
//! cargo bench --bench framer_bench
//! ```

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use std::time::Duration;

use smartlamp_core::TransactionConfig;
use smartlamp_hardware::mock::{MockTransport, SimulatedLamp};
use smartlamp_hardware::{LineFramer, SmartLamp, Transaction};
use smartlamp_protocol::{Attribute, Command, CommandCode};

const REPLY: &[u8] = b"RES GET_LDR 512\n";

/// Frame one reply delivered in chunks of varying size.
fn bench_take_line(c: &mut Criterion) {
    let mut group = c.benchmark_group("take_line");
    group.throughput(Throughput::Bytes(REPLY.len() as u64));

    for chunk in [1usize, 4, 16] {
        group.bench_with_input(BenchmarkId::from_parameter(chunk), &chunk, |b, &chunk| {
            b.iter(|| {
                let mut framer = LineFramer::default();
                let mut framed = None;
                for piece in REPLY.chunks(chunk) {
                    framer.feed(piece);
                    if let Some(line) = framer.take_line().unwrap() {
                        framed = Some(line);
                    }
                }
                black_box(framed)
            });
        });
    }

    group.finish();
}

/// Full transaction against a scripted transport with one noise line.
fn bench_transaction(c: &mut Criterion) {
    let command = Command::new(CommandCode::GetLdr).unwrap();

    c.bench_function("transaction_with_noise", |b| {
        b.iter(|| {
            let mut transport = MockTransport::new()
                .with_line("RES GET_LED 1")
                .with_line("RES GET_LDR 512");
            let mut framer = LineFramer::default();
            let mut tx = Transaction::new(&command, 10, Duration::from_millis(10));
            black_box(tx.run(&mut transport, &mut framer).unwrap())
        });
    });
}

/// Attribute read through the locked lamp handle.
fn bench_lamp_get(c: &mut Criterion) {
    let lamp = SmartLamp::new(SimulatedLamp::new(), TransactionConfig::default()).unwrap();

    c.bench_function("lamp_get_ldr", |b| {
        b.iter(|| black_box(lamp.get(black_box(Attribute::Ldr)).unwrap()));
    });
}

criterion_group!(benches, bench_take_line, bench_transaction, bench_lamp_get);
criterion_main!(benches);
