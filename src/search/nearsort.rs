// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Reachability pruning of the deepest enumerated layers.
//!
//! Before enumerating the last one (nearsort) or two (nearsort2) layers
//! ahead of the autocompleted final layer, the candidate prefix is
//! screened: every flip of the sorting test yields a route demand "the
//! value surfacing on channel `j` must reach channel `k`", and with only
//! one or two comparator layers left, each channel can serve only a
//! bounded set of such routes. The screen tracks three relations over
//! the observed demands and fails as soon as a bound would be exceeded:
//!
//! - `from[j]`: targets demanded from source `j`, at most 3 (one layer
//!   of slack) or 7 (two layers);
//! - `to[k]`: sources demanding target `k`, same bounds;
//! - `either`: the union, symmetric, at most 5 or 9 per channel.
//!
//! A prefix that fails the screen has no sorting completion, so the
//! whole subtree is pruned. One that passes is handed to the full
//! per-layer enumeration, so the screen affects only speed, never the
//! result set.

use super::Searcher;
use crate::config::MAX_WIDTH;
use crate::stats::Counter;

/// Route-capacity bounds for one screening pass.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ReachBounds {
    from: usize,
    to: usize,
    either: usize,
}

/// One comparator layer of slack past the propagation cut.
pub(crate) const NEARSORT_BOUNDS: ReachBounds = ReachBounds {
    from: 3,
    to: 3,
    either: 5,
};

/// Two comparator layers of slack past the propagation cut.
pub(crate) const NEARSORT2_BOUNDS: ReachBounds = ReachBounds {
    from: 7,
    to: 7,
    either: 9,
};

/// The route demands observed so far in one screening pass.
#[derive(Debug)]
pub(crate) struct Reachability {
    from: [[bool; MAX_WIDTH]; MAX_WIDTH],
    to: [[bool; MAX_WIDTH]; MAX_WIDTH],
    either: [[bool; MAX_WIDTH]; MAX_WIDTH],
    count_from: [usize; MAX_WIDTH],
    count_to: [usize; MAX_WIDTH],
    count_either: [usize; MAX_WIDTH],
}

impl Reachability {
    pub(crate) fn new() -> Self {
        Self {
            from: [[false; MAX_WIDTH]; MAX_WIDTH],
            to: [[false; MAX_WIDTH]; MAX_WIDTH],
            either: [[false; MAX_WIDTH]; MAX_WIDTH],
            count_from: [0; MAX_WIDTH],
            count_to: [0; MAX_WIDTH],
            count_either: [0; MAX_WIDTH],
        }
    }

    /// Forget all observed demands.
    fn clear(&mut self, width: usize) {
        for j in 0..width {
            for k in 0..width {
                self.from[j][k] = false;
                self.to[j][k] = false;
                self.either[j][k] = false;
            }
            self.count_from[j] = 0;
            self.count_to[j] = 0;
            self.count_either[j] = 0;
        }
    }

    /// Record the route demand `j -> k`; false if any bound would be
    /// exceeded.
    fn admit(&mut self, j: usize, k: usize, bounds: ReachBounds) -> bool {
        if !self.from[j][k] {
            if self.count_from[j] >= bounds.from {
                return false;
            }
            self.count_from[j] += 1;
            self.from[j][k] = true;
        }

        if !self.to[j][k] {
            if self.count_to[k] >= bounds.to {
                return false;
            }
            self.count_to[k] += 1;
            self.to[j][k] = true;
        }

        if !self.either[j][k] {
            if self.count_either[j] >= bounds.either || self.count_either[k] >= bounds.either {
                return false;
            }
            self.count_either[j] += 1;
            self.count_either[k] += 1;
            self.either[j][k] = true;
            self.either[k][j] = true;
        }

        true
    }
}

impl Searcher {
    /// Screen the prefix through layer `depth - 3`, then enumerate the
    /// second-last layer with the autocompleting test.
    pub(crate) fn nearsort_process(&mut self) {
        let depth = self.config.depth;

        if !self.nearsorts(depth - 3, NEARSORT_BOUNDS) {
            self.stats.increment(Counter::NearsortPrunes);
            return;
        }

        let layer = depth - 2;
        self.init_matching(layer);
        loop {
            self.autocomplete_process();
            if !self.matchings[layer].next() {
                break;
            }
            self.sync(layer);
        }
    }

    /// Screen the prefix through layer `depth - 4`, then enumerate the
    /// third-last layer, each assignment going through
    /// [`Searcher::nearsort_process`].
    pub(crate) fn nearsort2_process(&mut self) {
        let depth = self.config.depth;

        if !self.nearsorts(depth - 4, NEARSORT2_BOUNDS) {
            self.stats.increment(Counter::Nearsort2Prunes);
            return;
        }

        let layer = depth - 3;
        self.init_matching(layer);
        loop {
            self.nearsort_process();
            if !self.matchings[layer].next() {
                break;
            }
            self.sync(layer);
        }
    }

    /// Run the screening passes with propagation cut at `cut`.
    ///
    /// Mirrors the sorting test's two-pass protocol for odd widths; the
    /// demand relations accumulate across both passes.
    fn nearsorts(&mut self, cut: usize, bounds: ReachBounds) -> bool {
        self.gray.initialize();
        self.init_values(1, cut);
        self.reach.clear(self.config.width);

        if !self.even_nearsorts(cut, bounds) {
            return false;
        }

        if self.config.width % 2 == 1 {
            self.gray.initialize();
            self.init_values(1, cut);
            self.force_last_channel_one();
            if !self.even_nearsorts(cut, bounds) {
                return false;
            }
        }

        true
    }

    /// One Gray-code pass of the screen.
    fn even_nearsorts(&mut self, cut: usize, bounds: ReachBounds) -> bool {
        while let Some(delta) = self.gray.next() {
            if !self.still_nearsorts(delta, cut, bounds) {
                return false;
            }
        }
        true
    }

    /// Screen a single flip's route demand.
    fn still_nearsorts(&mut self, delta: usize, cut: usize, bounds: ReachBounds) -> bool {
        let k = self.flip_target(delta);
        let j = self.flip_input(delta, 1, cut);

        if j == k {
            return true;
        }

        self.reach.admit(j, k, bounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Heuristic, SearchConfig};
    use crate::level2;

    #[test]
    fn test_admit_from_bound() {
        let mut reach = Reachability::new();
        assert!(reach.admit(0, 1, NEARSORT_BOUNDS));
        assert!(reach.admit(0, 2, NEARSORT_BOUNDS));
        assert!(reach.admit(0, 3, NEARSORT_BOUNDS));
        // Fourth distinct target from channel 0 exceeds |from| <= 3.
        assert!(!reach.admit(0, 4, NEARSORT_BOUNDS));
        // Repeating an admitted route is free.
        assert!(reach.admit(0, 2, NEARSORT_BOUNDS));
    }

    #[test]
    fn test_admit_either_bound_is_symmetric() {
        let mut reach = Reachability::new();
        for k in 1..=3 {
            assert!(reach.admit(0, k, NEARSORT_BOUNDS));
        }
        for j in 4..=5 {
            assert!(reach.admit(j, 0, NEARSORT_BOUNDS));
        }
        // Channel 0 now participates in five routes; a sixth in either
        // direction exceeds |from ∪ to| <= 5.
        assert!(!reach.admit(6, 0, NEARSORT_BOUNDS));
    }

    #[test]
    fn test_clear_resets_counts() {
        let mut reach = Reachability::new();
        for k in 1..=3 {
            assert!(reach.admit(0, k, NEARSORT_BOUNDS));
        }
        reach.clear(8);
        assert!(reach.admit(0, 4, NEARSORT_BOUNDS));
    }

    fn total_count(width: usize, depth: usize, heuristic: Heuristic) -> u64 {
        let config = SearchConfig::with_heuristic(width, depth, heuristic).unwrap();
        level2::candidates(width)
            .iter()
            .enumerate()
            .map(|(index, candidate)| {
                let mut searcher = Searcher::new(config, candidate, index, None);
                searcher.backtrack();
                searcher.count()
            })
            .sum()
    }

    /// The screen is a pure prune: nearsort explores the same network
    /// family as autocomplete and must find exactly the same sorters.
    #[test]
    fn test_nearsort_count_equals_autocomplete_width5() {
        let auto = total_count(5, 5, Heuristic::Autocomplete);
        assert!(auto > 0);
        assert_eq!(auto, total_count(5, 5, Heuristic::Nearsort));
        assert_eq!(auto, total_count(5, 5, Heuristic::Nearsort2));
    }

    #[test]
    fn test_nearsort_count_equals_autocomplete_width6() {
        let auto = total_count(6, 5, Heuristic::Autocomplete);
        assert!(auto > 0);
        assert_eq!(auto, total_count(6, 5, Heuristic::Nearsort));
        assert_eq!(auto, total_count(6, 5, Heuristic::Nearsort2));
    }
}
