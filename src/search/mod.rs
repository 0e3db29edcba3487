// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Backtracking search over comparator networks.
//!
//! A [`Searcher`] owns everything one task needs: the comparator network
//! being mutated in place, one matching enumerator per layer, the ternary
//! Gray code generator, the layer counters of the non-recursive
//! backtracking walk, and the per-task statistics. Layer 0 is pinned to
//! the identity pairing (first normal form) and layer 1 to the level-2
//! candidate the searcher was built with (second normal form); layers
//! from 2 upward are enumerated, deepest layer advancing first.
//!
//! # Sorting test
//!
//! The test never evaluates the network from scratch. Starting from the
//! all-zero input it follows the ternary Gray code: each step flips one
//! input bit, and the flipped value traces a path down the layers, moving
//! to its comparator partner exactly when the partner's value sits on the
//! wrong side. The network sorts iff every flip surfaces on the output
//! channel where the sorted zero/one boundary moved, which is computed
//! from the generator's zero count in O(1).
//!
//! Because the ternary generator never flips the lone channel of an odd
//! width, odd widths run the test twice: once with that channel at zero
//! and once with it forced to one on every layer.
//!
//! # Heuristics
//!
//! The last layers of each candidate are handled per the configured
//! [`Heuristic`]: plain enumeration, last-layer autocomplete
//! ([`autocomplete`]), or reachability pruning of the last one or two
//! enumerated layers ([`nearsort`]). The heuristic is dispatched once
//! per processed network; the inner flip loops are monomorphic.

pub mod autocomplete;
pub mod nearsort;

use crate::config::{Heuristic, SearchConfig, MAX_DEPTH, MAX_WIDTH};
use crate::gray::TernaryGrayCode;
use crate::matching::{self, Matching};
use crate::network::ComparatorNetwork;
use crate::report;
use crate::stats::{Counter, Statistics};
use nearsort::Reachability;
use std::path::PathBuf;
use tracing::warn;

/// One task's backtracking search state.
pub struct Searcher {
    /// Immutable search parameters.
    config: SearchConfig,

    /// Index of the installed layer-2 candidate, embedded in output
    /// file names so that tasks never collide on disk.
    level2_index: usize,

    /// Where sorter files go; `None` counts without writing.
    output_dir: Option<PathBuf>,

    /// The comparator network under test, mutated in place.
    network: ComparatorNetwork,

    /// Ternary Gray code driving the sorting test.
    gray: TernaryGrayCode,

    /// Value propagated through each channel at each layer.
    value: [[u8; MAX_WIDTH]; MAX_DEPTH],

    /// Per-layer matching enumerators (sequence form).
    matchings: [Matching; MAX_DEPTH],

    /// How far each layer's enumerator has advanced, in `0..=M`.
    counters: [u64; MAX_DEPTH],

    /// Layer currently being advanced by the backtracking walk.
    tos: i64,

    /// First enumerated layer; 2 under second normal form.
    top: usize,

    /// Number of matchings per layer, `M`.
    num_matchings: u64,

    /// Sorting networks found by this searcher, which is also the
    /// 1-based sequence number of the next output file.
    found: u64,

    /// Per-task event counters.
    stats: Statistics,

    /// Reachability state for the nearsort heuristics.
    reach: Reachability,
}

impl Searcher {
    /// Build a searcher for one layer-2 candidate.
    ///
    /// Layer 0 is set to the identity pairing, layer 1 to `candidate`,
    /// and all deeper layers to the first matching in enumeration
    /// order.
    pub fn new(
        config: SearchConfig,
        candidate: &Matching,
        level2_index: usize,
        output_dir: Option<PathBuf>,
    ) -> Self {
        debug_assert_eq!(candidate.width(), config.width);

        let mut searcher = Self {
            config,
            level2_index,
            output_dir,
            network: ComparatorNetwork::new(config.width, config.depth),
            gray: TernaryGrayCode::new(config.width),
            value: [[0; MAX_WIDTH]; MAX_DEPTH],
            matchings: [Matching::new(config.width); MAX_DEPTH],
            counters: [0; MAX_DEPTH],
            tos: 0,
            top: 2,
            num_matchings: matching::count(config.width),
            found: 0,
            stats: Statistics::new(),
            reach: Reachability::new(),
        };

        searcher.init_matching(0);
        searcher.matchings[1] = *candidate;
        searcher.network.install(1, candidate);
        searcher.first_comparator_network(2);
        searcher
    }

    /// Run the backtracking search to exhaustion.
    ///
    /// Every comparator network respecting the fixed layers is visited
    /// and processed; sorters are saved and counted. Restartable: a
    /// second call repeats the whole search.
    pub fn backtrack(&mut self) {
        self.found = 0;
        self.network.install(1, &self.matchings[1]);
        self.first_comparator_network(2);

        loop {
            self.process();
            if !self.next_comparator_network() {
                break;
            }
        }
    }

    /// Number of sorting networks found by the last `backtrack` run.
    pub fn count(&self) -> u64 {
        self.found
    }

    /// Index of the layer-2 candidate this searcher explores.
    pub fn level2_index(&self) -> usize {
        self.level2_index
    }

    /// Per-task event counters.
    pub fn statistics(&self) -> &Statistics {
        &self.stats
    }

    /// Test the current network with the configured heuristic and
    /// record any sorter.
    fn process(&mut self) {
        match self.config.heuristic {
            Heuristic::Plain => {
                self.stats.increment(Counter::NetworksTested);
                if self.sorts() {
                    self.save_sorter();
                }
            }
            Heuristic::Autocomplete => self.autocomplete_process(),
            Heuristic::Nearsort => self.nearsort_process(),
            Heuristic::Nearsort2 => self.nearsort2_process(),
        }
    }

    /// Advance to the next comparator network in backtracking order.
    ///
    /// The deepest enumerated layer advances first; an exhausted layer
    /// is reset and the layer above it advances instead. Returns false
    /// when the walk would climb past `top`, i.e. the search is
    /// exhausted. Heuristics with hidden layers start the walk higher,
    /// and when the whole walk lies below `top` (shallow depths) the
    /// single fixed network has already been processed, so the search
    /// ends without touching the installed layers.
    fn next_comparator_network(&mut self) -> bool {
        self.tos = self.heuristic_tos();
        if self.tos < self.top as i64 {
            return false;
        }

        let t = self.tos as usize;
        self.counters[t] += 1;
        if self.matchings[t].next() {
            self.sync(t);
        }

        while self.tos >= self.top as i64 && self.counters[self.tos as usize] == self.num_matchings
        {
            self.init_matching(self.tos as usize);
            self.tos -= 1;

            if self.tos >= self.top as i64 {
                let t = self.tos as usize;
                self.counters[t] += 1;
                if self.counters[t] < self.num_matchings && self.matchings[t].next() {
                    self.sync(t);
                }
            }
        }

        self.tos >= self.top as i64
    }

    /// Deepest layer the backtracking walk may advance, per heuristic.
    fn heuristic_tos(&self) -> i64 {
        let depth = self.config.depth as i64;
        match self.config.heuristic {
            Heuristic::Plain => depth - 1,
            Heuristic::Autocomplete => depth - 2,
            Heuristic::Nearsort => depth - 3,
            Heuristic::Nearsort2 => depth - 4,
        }
    }

    /// Reset layers `top..depth` to the first matching.
    fn first_comparator_network(&mut self, top: usize) {
        self.top = top;
        for layer in top..self.config.depth {
            self.init_matching(layer);
        }
    }

    /// Reset one layer to the identity matching in both representations.
    pub(crate) fn init_matching(&mut self, layer: usize) {
        self.matchings[layer].initialize();
        self.counters[layer] = 0;
        self.network.set_identity_layer(layer);
    }

    /// Rebuild the network's map form at `layer` from the sequence form.
    pub(crate) fn sync(&mut self, layer: usize) {
        self.network.install(layer, &self.matchings[layer]);
    }

    // Sorting test, first normal form.

    /// Zero the propagated values on layers `first..=last`.
    pub(crate) fn init_values(&mut self, first: usize, last: usize) {
        for layer in first..=last {
            for channel in 0..self.config.width {
                self.value[layer][channel] = 0;
            }
        }
    }

    /// Force the lone channel of an odd width to one on every layer and
    /// correct the generator's zero count.
    pub(crate) fn force_last_channel_one(&mut self) {
        let last = self.config.width - 1;
        for layer in 1..self.config.depth {
            self.value[layer][last] = 1;
        }
        self.gray.set_zeros(self.config.width - 1);
    }

    /// Flip the value on channel `j` at layer `first` and propagate the
    /// change down to layer `last`; returns the channel whose value
    /// toggled after `last`.
    #[inline]
    pub(crate) fn flip_input(&mut self, mut j: usize, first: usize, last: usize) -> usize {
        for layer in first..=last {
            self.value[layer][j] ^= 1;
            let k = self.network.partner(layer, j);
            // The toggled value moves across the comparator exactly when
            // the partner's value sits on the wrong side of it.
            if (self.value[layer][k] != 0) == (j > k) {
                j = k;
            }
        }
        j
    }

    /// Output channel on which the sorted zero/one boundary moved for
    /// the generator's most recent flip.
    #[inline]
    pub(crate) fn flip_target(&self, delta: usize) -> usize {
        self.gray.zeros() + self.gray.bit(delta) as usize - 1
    }

    /// Does the network still sort after flipping input channel `delta`?
    fn still_sorts(&mut self, delta: usize) -> bool {
        let target = self.flip_target(delta);
        self.flip_input(delta, 1, self.config.depth - 1) == target
    }

    /// Run one Gray-code pass; the lone channel of an odd width keeps
    /// whatever value the caller arranged.
    fn even_sorts(&mut self) -> bool {
        while let Some(delta) = self.gray.next() {
            if !self.still_sorts(delta) {
                return false;
            }
        }
        true
    }

    /// Does the current network sort all 0/1 inputs?
    fn sorts(&mut self) -> bool {
        self.gray.initialize();
        self.init_values(1, self.config.depth - 1);
        if !self.even_sorts() {
            return false;
        }

        if self.config.width % 2 == 1 {
            self.gray.initialize();
            self.init_values(1, self.config.depth - 1);
            self.force_last_channel_one();
            if !self.even_sorts() {
                return false;
            }
        }

        true
    }

    /// Record a sorter: bump the counters and, unless counting only,
    /// save it under a name that encodes width, depth, layer-2 index,
    /// size and the 1-based sequence number.
    pub(crate) fn save_sorter(&mut self) {
        let size = self.network.remove_repeated_comparators();
        self.found += 1;
        self.stats.increment(Counter::SortersFound);

        if let Some(dir) = &self.output_dir {
            let name = report::sorter_file_name(
                self.config.width,
                self.config.depth,
                self.level2_index,
                size,
                self.found,
            );
            let path = dir.join(name);
            if let Err(error) = self.network.save(&path) {
                // Per the error contract: skip this network, keep
                // searching.
                warn!(path = %path.display(), %error, "failed to save sorting network");
            }
        }
    }
}
