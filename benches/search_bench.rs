// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Microbenchmarks for the search's inner loops: matching advance,
//! Gray code streaming, the accelerated sorting test, and a complete
//! small search.

use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use sortnet_search::config::{Heuristic, SearchConfig};
use sortnet_search::gray::TernaryGrayCode;
use sortnet_search::{level2, sorting, ComparatorNetwork, Matching, Searcher};

fn bench_matching_walk(c: &mut Criterion) {
    c.bench_function("matching_walk_width10", |b| {
        b.iter(|| {
            let mut matching = Matching::new(10);
            let mut count = 1u64;
            while matching.next() {
                count += 1;
            }
            black_box(count)
        })
    });
}

fn bench_ternary_gray_walk(c: &mut Criterion) {
    c.bench_function("ternary_gray_walk_width12", |b| {
        b.iter(|| {
            let mut gray = TernaryGrayCode::new(12);
            let mut flips = 0u64;
            while gray.next().is_some() {
                flips += 1;
            }
            black_box(flips)
        })
    });
}

fn bench_sorting_test(c: &mut Criterion) {
    // Odd-even transposition sort on eight channels, depth eight.
    let mut network = ComparatorNetwork::new(8, 8);
    for layer in 0..8 {
        let offset = layer % 2;
        let mut j = offset;
        while j + 1 < 8 {
            network.join(layer, j, j + 1);
            j += 2;
        }
    }
    assert!(sorting::sorts(&network));

    c.bench_function("sorting_test_width8_depth8", |b| {
        b.iter(|| black_box(sorting::sorts(black_box(&network))))
    });
}

fn bench_small_search(c: &mut Criterion) {
    let config = SearchConfig::with_heuristic(5, 5, Heuristic::Nearsort).unwrap();
    let candidates = level2::candidates(5);

    c.bench_function("search_width5_depth5_nearsort", |b| {
        b.iter(|| {
            let mut total = 0u64;
            for (index, candidate) in candidates.iter().enumerate() {
                let mut searcher = Searcher::new(config, candidate, index, None);
                searcher.backtrack();
                total += searcher.count();
            }
            black_box(total)
        })
    });
}

criterion_group!(
    benches,
    bench_matching_walk,
    bench_ternary_gray_walk,
    bench_sorting_test,
    bench_small_search
);
criterion_main!(benches);
