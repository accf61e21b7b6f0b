//! Evaluation benchmarks: interval lists vs bitmasks, and parsing
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rangeq::catalog::TagCatalog;
use rangeq::query::{evaluate_mask_set, evaluate_range_set, parse_query, RangeSetCache};
use rangeq::set::{range_set_rasterize, EntityId, Interval, RangeSet};

const QUERIES: &[&str] = &[
    "T0",
    "T0 & T1",
    "(T0 | T1) - T2",
    "T0 & T1 & (T2 | T3) - T4",
];

/// Catalog of `entities` timelines of `frames` frames, with five striped tags
fn create_catalog(entities: u32, frames: i32) -> TagCatalog {
    let mut universe = RangeSet::new();
    for entity in 0..entities {
        universe.push(entity as EntityId, &[Interval::new(0, frames)]);
    }

    let mut sets = vec![
        ("All".to_string(), universe),
        ("None".to_string(), RangeSet::new()),
    ];
    for tag in 0..5i32 {
        let period = 7 + tag * 3;
        let mut set = RangeSet::new();
        for entity in 0..entities {
            let phase = (entity as i32 * 5 + tag) % period;
            let intervals: Vec<Interval> = (phase..frames)
                .step_by(period as usize)
                .map(|s| Interval::new(s, (s + period / 2).min(frames)))
                .collect();
            if !intervals.is_empty() {
                set.push(entity as EntityId, &intervals);
            }
        }
        sets.push((format!("T{}", tag), set));
    }

    TagCatalog::from_sets(sets).expect("benchmark catalog is valid")
}

fn bench_representations(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate");

    for &frames in &[64, 1024, 16384] {
        let catalog = create_catalog(32, frames);
        for query in QUERIES {
            let expr = parse_query(query, &catalog).expect("benchmark query parses");
            let id = format!("{}/{}", frames, query);

            group.bench_with_input(BenchmarkId::new("ranges", &id), &expr, |b, expr| {
                b.iter(|| evaluate_range_set(black_box(expr), catalog.range_sets()))
            });
            group.bench_with_input(BenchmarkId::new("masks", &id), &expr, |b, expr| {
                b.iter(|| evaluate_mask_set(black_box(expr), catalog.mask_sets()))
            });
        }
    }

    group.finish();
}

fn bench_cache(c: &mut Criterion) {
    let catalog = create_catalog(32, 4096);
    let expr = parse_query(QUERIES[3], &catalog).expect("benchmark query parses");
    let mut cache = RangeSetCache::new();
    cache.get_or_evaluate(&expr, catalog.range_sets());

    c.bench_function("cache_hit", |b| {
        b.iter(|| cache.get_or_evaluate(black_box(&expr), catalog.range_sets()))
    });
}

fn bench_rasterize(c: &mut Criterion) {
    let catalog = create_catalog(32, 4096);
    let set = &catalog.range_sets()[2];

    c.bench_function("rasterize", |b| {
        b.iter(|| range_set_rasterize(black_box(set), catalog.universe()))
    });
}

fn bench_parse(c: &mut Criterion) {
    let catalog = create_catalog(1, 8);
    let mut group = c.benchmark_group("parse");

    for query in QUERIES {
        group.bench_with_input(BenchmarkId::from_parameter(query), query, |b, query| {
            b.iter(|| parse_query(black_box(query), &catalog))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_representations, bench_cache, bench_rasterize, bench_parse);
criterion_main!(benches);
