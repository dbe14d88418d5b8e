//! Session Benchmarks
//!
//! Measures performance of:
//! - Payload classification
//! - Live session logging
//! - Session persistence

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use tempfile::TempDir;

use ep_core::message::{BinaryKind, InboundPayload, PreviewRegistry, classify};
use ep_core::session::{LiveSession, SessionRecord, SessionStore};

const EDITOR: &str = "https://www.photopea.com";

/// Benchmark payload classification
fn bench_classify(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify");

    group.bench_function("text", |b| {
        b.iter(|| classify(black_box(InboundPayload::text("layer count: 12"))))
    });

    for size in [64usize, 4096, 1 << 20].iter() {
        let bytes = vec![0xABu8; *size];
        group.throughput(Throughput::Bytes(*size as u64));
        group.bench_with_input(BenchmarkId::new("binary", size), &bytes, |b, bytes| {
            b.iter(|| classify(black_box(InboundPayload::binary(BinaryKind::ArrayBuffer, bytes.clone()))))
        });
    }

    group.finish();
}

fn populated_session(messages: usize) -> SessionRecord {
    let previews = PreviewRegistry::new();
    let mut live = LiveSession::new(EDITOR);
    for i in 0..messages {
        if i % 2 == 0 {
            live.record_sent(format!("app.echoToOE({})", i));
        } else {
            live.record_received(InboundPayload::text(format!("reply {}", i)), &previews);
        }
    }
    live.snapshot()
}

/// Benchmark live session logging
fn bench_live_session(c: &mut Criterion) {
    let mut group = c.benchmark_group("live_session");

    group.bench_function("record_round_trip", |b| {
        let previews = PreviewRegistry::new();
        let mut live = LiveSession::new(EDITOR);
        b.iter(|| {
            live.record_sent(black_box("app.echoToOE(app.documents.length)"));
            live.record_received(black_box(InboundPayload::text("1")), &previews);
        })
    });

    group.bench_function("snapshot_100", |b| {
        let live = LiveSession::resume(populated_session(100));
        b.iter(|| black_box(live.snapshot()))
    });

    group.finish();
}

/// Benchmark session persistence
fn bench_store(c: &mut Criterion) {
    let mut group = c.benchmark_group("session_store");

    for count in [10usize, 100].iter() {
        let record = populated_session(*count);
        group.bench_with_input(BenchmarkId::new("put", count), &record, |b, record| {
            let temp_dir = TempDir::new().unwrap();
            let store = SessionStore::new(temp_dir.path());
            b.iter(|| store.put(black_box(record)).unwrap())
        });
    }

    group.bench_function("list_50", |b| {
        let temp_dir = TempDir::new().unwrap();
        let store = SessionStore::new(temp_dir.path());
        for _ in 0..50 {
            store.put(&populated_session(20)).unwrap();
        }
        b.iter(|| black_box(store.list_summaries()))
    });

    group.finish();
}

criterion_group!(benches, bench_classify, bench_live_session, bench_store);
criterion_main!(benches);
