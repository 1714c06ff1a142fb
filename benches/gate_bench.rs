//! Benchmarks for the admission gate.
//!
//! Benchmarks cover:
//! - Uncontended acquire/release
//! - Event recording overhead
//! - Contended runs with mixed classes

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;
use std::sync::Arc;
use std::time::Duration;

use venue_gate::core::{event_channel, AdmissionGate, Client, Dispatcher, StayPolicy};
use venue_gate::util::ClientClass;

// ============================================================================
// Helper Functions
// ============================================================================

fn mixed_clients(count: u32) -> Vec<Client> {
    (0..count)
        .map(|id| Client::new(id, ClientClass::from_flag(i64::from(id % 3 == 0))))
        .collect()
}

// ============================================================================
// Gate Benchmarks
// ============================================================================

fn bench_acquire_release_uncontended(c: &mut Criterion) {
    let gate = AdmissionGate::new(4).unwrap();
    let client = Client::new(0, ClientClass::Normal);

    c.bench_function("acquire_release_uncontended", |b| {
        b.iter(|| {
            let permit = gate.acquire(black_box(client));
            black_box(permit.release());
        });
    });
}

fn bench_acquire_release_with_sink(c: &mut Criterion) {
    let (sink, log) = event_channel();
    let gate = AdmissionGate::new(4).unwrap().with_sink(sink);
    let client = Client::new(0, ClientClass::Vip);

    c.bench_function("acquire_release_with_sink", |b| {
        b.iter(|| {
            gate.acquire(black_box(client)).release();
            black_box(log.drain());
        });
    });
}

// ============================================================================
// Scenario Benchmarks
// ============================================================================

fn bench_dispatch_contended(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch_contended");
    group.sample_size(10);

    for capacity in [1_u32, 4, 16] {
        let clients = mixed_clients(64);
        group.throughput(Throughput::Elements(clients.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(capacity), &capacity, |b, &capacity| {
            b.iter(|| {
                let gate = Arc::new(AdmissionGate::new(capacity).unwrap());
                let summary = Dispatcher::new(gate, StayPolicy::Fixed(Duration::ZERO))
                    .run(clients.clone())
                    .unwrap();
                black_box(summary);
            });
        });
    }
    group.finish();
}

// ============================================================================
// Benchmark Groups
// ============================================================================

criterion_group!(
    gate_benches,
    bench_acquire_release_uncontended,
    bench_acquire_release_with_sink
);

criterion_group!(scenario_benches, bench_dispatch_contended);

criterion_main!(gate_benches, scenario_benches);
