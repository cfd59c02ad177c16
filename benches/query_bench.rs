//! Query pipeline benchmarks.
//!
//! | Group | What it measures |
//! |-------|-----------------|
//! | `parse` | Tokenizing and compiling query text |
//! | `refilter` | Re-evaluating a whole history after the query changes |
//! | `hierarchy` | Rendering a payload for the detail pane |
//!
//! ```sh
//! cargo bench --bench query_bench
//! open target/criterion/report/index.html
//! ```

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use emulog_core::{parse_query, render_hierarchy, AccessorCache, LogHistory, LogRecord};
use serde_json::json;

const QUERIES: &[(&str, &str)] = &[
    ("level", "level=error"),
    ("nested", "user.order.items[1]=\"cake\" metadata.emulator.name=functions"),
    ("search", "order received"),
    ("mixed", "level=user user.customer=* crashed\nmetadata.function.name=us-central1-hello"),
];

fn corpus(n: usize) -> LogHistory {
    (0..n)
        .map(|i| {
            let level = if i % 10 == 0 { "error" } else { "user" };
            let mut record = LogRecord::new(level, format!("order received {i}"), i as i64);
            record.data.insert(
                "user".into(),
                json!({"order": {"id": i, "items": ["tea", if i % 3 == 0 { "cake" } else { "scone" }]}, "customer": "Ada"}),
            );
            record.data.insert(
                "metadata".into(),
                json!({"emulator": {"name": if i % 2 == 0 { "functions" } else { "firestore" }}}),
            );
            record
        })
        .collect()
}

fn parse_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    for (name, query) in QUERIES {
        group.throughput(Throughput::Bytes(query.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), query, |b, q| {
            b.iter(|| parse_query(black_box(q)))
        });
    }
    group.finish();
}

fn refilter_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("refilter");
    for size in [1_000usize, 10_000] {
        let history = corpus(size);
        group.throughput(Throughput::Elements(size as u64));
        for (name, query) in QUERIES {
            let filter = parse_query(query).filters;
            let mut cache = AccessorCache::new();
            group.bench_with_input(BenchmarkId::new(*name, size), &filter, |b, f| {
                b.iter(|| history.matching_indices(black_box(f), &mut cache))
            });
        }
    }
    group.finish();
}

fn hierarchy_bench(c: &mut Criterion) {
    let payload = json!({
        "order": {"id": 7, "paid": true, "items": ["tea", "cake", {"name": "scone", "qty": 2}]},
        "customer": {"name": "Ada", "tags": ["vip", "early"], "address": {"city": "London"}},
    });
    let mut cache = AccessorCache::new();
    c.bench_function("hierarchy/render", |b| {
        b.iter(|| render_hierarchy(black_box(&payload), &mut cache))
    });
}

criterion_group!(benches, parse_bench, refilter_bench, hierarchy_bench);
criterion_main!(benches);
