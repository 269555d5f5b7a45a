//! Criterion benchmarks for rebalance_core's leaf allocator
//!
//! Run with: cargo bench -p rebalance_core

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use rebalance_core::config::EngineConfig;
use rebalance_core::{allocator::LeafTicker, model::ids::TickerSymbol};

fn tickers_for(n: usize) -> Vec<LeafTicker> {
    (0..n)
        .map(|i| LeafTicker {
            symbol: TickerSymbol::new(format!("T{i}")),
            holding_weight: 1.0 + (i % 3) as f64,
            min_investment: 500.0,
            preferred_rounding: 1.0,
            price: 100.0 + i as f64,
        })
        .collect()
}

fn bench_allocate_leaf(c: &mut Criterion) {
    let config = EngineConfig::default();
    let mut group = c.benchmark_group("allocate_leaf");

    for n in [4usize, 8, 12, 16, 20] {
        let tickers = tickers_for(n);
        let target = 1_000.0 * n as f64;
        group.bench_with_input(BenchmarkId::new("tickers", n), &n, |b, _| {
            b.iter(|| rebalance_core::allocator::allocate_leaf(black_box(&tickers), black_box(target), black_box(&config)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_allocate_leaf);
criterion_main!(benches);
