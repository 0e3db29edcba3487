// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Last-layer autocomplete.
//!
//! The last layer is not enumerated at all. It starts empty and is built
//! while the sorting test runs: propagation stops one layer early, and
//! when a flip's value surfaces on channel `j` but belongs on channel
//! `k`, the only single comparator that can finish the route is `(j, k)`,
//! so it is installed on the spot. A flip that would need a comparator
//! conflicting with one already installed proves that no completion of
//! the last layer sorts, and the candidate is rejected.
//!
//! For odd widths the layer built during the first pass is kept for the
//! second, forced-ones pass; both passes must agree on it.

use super::Searcher;
use crate::stats::Counter;

impl Searcher {
    /// Test the current network with the last layer synthesized on the
    /// fly, recording any sorter found.
    pub(crate) fn autocomplete_process(&mut self) {
        self.stats.increment(Counter::NetworksTested);
        if self.autocomplete_sorts() {
            self.save_sorter();
        }
    }

    /// Does some completion of the empty last layer sort all 0/1
    /// inputs? On success the completion is left installed in the
    /// network.
    pub(crate) fn autocomplete_sorts(&mut self) -> bool {
        let depth = self.config.depth;
        self.network.clear_layer(depth - 1);

        self.gray.initialize();
        self.init_values(1, depth - 2);
        if !self.autocomplete_even_sorts() {
            return false;
        }

        if self.config.width % 2 == 1 {
            self.gray.initialize();
            self.init_values(1, depth - 2);
            self.force_last_channel_one();
            if !self.autocomplete_even_sorts() {
                return false;
            }
        }

        true
    }

    /// One Gray-code pass of the autocompleting test.
    fn autocomplete_even_sorts(&mut self) -> bool {
        while let Some(delta) = self.gray.next() {
            if !self.autocomplete_still_sorts(delta) {
                return false;
            }
        }
        true
    }

    /// Propagate a flip through all but the last layer, then route it
    /// home through the last layer, extending the layer if a fresh
    /// comparator can do it.
    fn autocomplete_still_sorts(&mut self, delta: usize) -> bool {
        let last = self.config.depth - 1;
        let j = self.flip_input(delta, 1, last - 1);
        let k = self.flip_target(delta);

        if j == k {
            return true;
        }

        let cj = self.network.partner(last, j);
        let ck = self.network.partner(last, k);

        if cj == k && ck == j {
            true
        } else if cj == j && ck == k {
            self.network.join(last, j, k);
            true
        } else {
            // One of the channels already carries a different
            // comparator; no completion can realize this route.
            false
        }
    }
}
