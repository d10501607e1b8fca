//! Benchmarks for the overlay hub
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use overlay_hub::hub::{Connection, Frame, Hub, HubConfig, StateStore, Topic, TopicRegistry};
use overlay_hub::websocket::ServerMessage;
use serde_json::json;
use tokio::sync::mpsc;

fn registry_with_subscribers(
    count: usize,
) -> (TopicRegistry, Vec<mpsc::UnboundedReceiver<Frame>>) {
    let mut registry = TopicRegistry::new();
    let mut receivers = Vec::with_capacity(count);
    for _ in 0..count {
        let (tx, rx) = mpsc::unbounded_channel();
        registry.register(Connection::new(Topic::Chat, tx));
        receivers.push(rx);
    }
    (registry, receivers)
}

fn bench_broadcast(c: &mut Criterion) {
    let mut group = c.benchmark_group("broadcast");

    for size in [1, 10, 100, 1000] {
        let (mut registry, mut receivers) = registry_with_subscribers(size);
        let message = ServerMessage::Update {
            payload: json!({"user": "viewer", "comment": "hello overlay"}),
        };

        group.throughput(Throughput::Elements(size as u64));

        group.bench_function(format!("fan_out_{}", size), |b| {
            b.iter(|| {
                let report = registry.broadcast(Topic::Chat, black_box(&message));
                for rx in receivers.iter_mut() {
                    while rx.try_recv().is_ok() {}
                }
                report
            })
        });
    }

    group.finish();
}

fn bench_store(c: &mut Criterion) {
    let mut group = c.benchmark_group("store");

    group.bench_function("accumulate_likes", |b| {
        let mut store = StateStore::new(100, 50);
        b.iter(|| {
            store
                .accumulate(Topic::LikeGoal, "current", black_box(5), None)
                .is_ok()
        })
    });

    group.bench_function("accumulate_capped", |b| {
        let mut store = StateStore::new(100, 50);
        b.iter(|| {
            store
                .accumulate(Topic::FollowGoal, "current", black_box(1), Some(50))
                .is_ok()
        })
    });

    group.finish();
}

fn bench_ingest(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let hub = Hub::new(HubConfig::default());

    let mut group = c.benchmark_group("ingest");

    group.bench_function("like_event", |b| {
        b.iter(|| runtime.block_on(hub.ingest_like(json!({"likeCount": black_box(3)}))))
    });

    group.bench_function("gift_event", |b| {
        b.iter(|| {
            runtime.block_on(hub.ingest_gift(json!({
                "giftName": "Rose",
                "diamondCount": black_box(1),
                "nickname": "viewer"
            })))
        })
    });

    group.finish();
}

criterion_group!(benches, bench_broadcast, bench_store, bench_ingest);
criterion_main!(benches);
