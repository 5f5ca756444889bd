//! Benchmarks for redis-key-analyzer
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use redis_key_analyzer::analyze::Aggregator;
use redis_key_analyzer::report::build_report;
use redis_key_analyzer::{KeyRecord, KeyType, PatternRules, Separator};
use std::convert::Infallible;

fn sample_keys() -> Vec<String> {
    (0..10_000)
        .map(|i| match i % 4 {
            0 => format!("user:{}:profile", i),
            1 => format!("session:{:x}", i * 7919),
            2 => format!("cache{}", i),
            _ => format!("order:{}:item:{}", i / 10, i % 10),
        })
        .collect()
}

fn benchmark_generalize(c: &mut Criterion) {
    let keys = sample_keys();
    let separator = PatternRules::new(Vec::new(), Some(Separator::new(":", 2).unwrap()));
    let prefixes = PatternRules::new(vec!["user:".into(), "session:".into()], None);

    c.bench_function("generalize_separator", |b| {
        b.iter(|| {
            for key in &keys {
                black_box(separator.generalize(key));
            }
        })
    });

    c.bench_function("generalize_prefix_or_numbers", |b| {
        b.iter(|| {
            for key in &keys {
                black_box(prefixes.generalize(key));
            }
        })
    });
}

fn benchmark_fold(c: &mut Criterion) {
    let types = [KeyType::String, KeyType::Hash, KeyType::List];
    let records: Vec<KeyRecord> = sample_keys()
        .into_iter()
        .enumerate()
        .map(|(i, key)| {
            let ttl = if i % 3 == 0 { -1 } else { (i % 5000) as i64 };
            KeyRecord::new(key, types[i % types.len()], ttl, (i % 2048) as u64, (i % 64) as u64)
        })
        .collect();
    let rules = PatternRules::new(Vec::new(), Some(Separator::new(":", 1).unwrap()));

    c.bench_function("fold_and_report", |b| {
        b.iter(|| {
            let agg = Aggregator::fold(
                records.iter().cloned().map(Ok::<_, Infallible>),
                |k| rules.generalize(k),
            )
            .unwrap();
            black_box(build_report(agg.into_stats(), None));
        })
    });
}

criterion_group!(benches, benchmark_generalize, benchmark_fold);
criterion_main!(benches);
