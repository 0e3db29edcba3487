// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Common test utilities shared across integration tests.

// Each test binary uses its own subset of these helpers.
#![allow(dead_code)]

use sortnet_search::config::{Heuristic, SearchConfig};
use sortnet_search::{level2, ComparatorNetwork, Searcher};
use std::path::PathBuf;

/// Build a network from explicit per-layer comparator lists.
pub fn network(width: usize, depth: usize, layers: &[&[(usize, usize)]]) -> ComparatorNetwork {
    assert_eq!(layers.len(), depth);
    let mut network = ComparatorNetwork::new(width, depth);
    for (layer, pairs) in layers.iter().enumerate() {
        for &(j, k) in *pairs {
            network.join(layer, j, k);
        }
    }
    network
}

/// The classical 4-input, depth-3 sorting network (odd-even merge).
pub fn batcher4() -> ComparatorNetwork {
    network(4, 3, &[&[(0, 1), (2, 3)], &[(0, 2), (1, 3)], &[(1, 2)]])
}

/// Run the full search over every layer-2 candidate, single-threaded,
/// and return the total count.
pub fn total_count(
    width: usize,
    depth: usize,
    heuristic: Heuristic,
    output_dir: Option<PathBuf>,
) -> u64 {
    let config = SearchConfig::with_heuristic(width, depth, heuristic).unwrap();
    level2::candidates(width)
        .iter()
        .enumerate()
        .map(|(index, candidate)| {
            let mut searcher = Searcher::new(config, candidate, index, output_dir.clone());
            searcher.backtrack();
            searcher.count()
        })
        .sum()
}
