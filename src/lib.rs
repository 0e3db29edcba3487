// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Exhaustive backtracking search for minimal-depth sorting networks.
//!
//! Given a width `n` (number of input channels) and a depth `d` (number of
//! layers of simultaneous comparators), the crate enumerates every comparator
//! network up to first and second normal form symmetries and emits every one
//! that sorts, deciding by exhaustion whether an `n`-input sorting network of
//! depth `d` exists.
//!
//! # Architecture
//!
//! The search is built from small synchronous state machines:
//!
//! - [`matching`] - a perfect-matching enumerator with two synchronized
//!   representations: a sequence form that is cheap to advance and a map
//!   form (stored in the comparator network) that is cheap to probe.
//! - [`gray`] - binary and ternary reflected Gray code generators that
//!   stream the index of the single bit changed at each step. The sorting
//!   test rides on these so that each new input costs one flip-propagation
//!   instead of a full network evaluation.
//! - [`network`] - the depth×width comparator network table, redundancy
//!   removal, and the on-disk text format.
//! - [`level2`] - layer-2 candidates unique up to permutation of the
//!   layer-1 channel pairs (second normal form).
//! - [`search`] - the backtracking engine and its heuristics: plain
//!   testing, last-layer autocomplete, and the nearsort/nearsort2
//!   reachability prunes.
//! - [`pool`] - the parallel driver: one task per layer-2 candidate, each
//!   owning an independent [`search::Searcher`].
//!
//! # Search Algorithm
//!
//! Layer 0 is pinned to the identity pairing (first normal form) and layer 1
//! to a symmetry-reduced candidate (second normal form). The remaining
//! layers are walked in lexicographic matching order by a non-recursive
//! backtracking stack. Each visited network is tested against all 0/1
//! inputs - by the zero-one principle this decides sorting outright - using
//! a ternary Gray code so that only the inputs sorted by layer 0 need be
//! visited, each in `O(d)` time.
//!
//! # Parallelization
//!
//! Tasks are independent and share no mutable state; output files are
//! disjoint by construction because file names embed the layer-2 candidate
//! index. The pool folds per-task counters after join.
//!
//! # Example
//!
//! Count all 5-input depth-5 sorting networks in second normal form:
//!
//! ```no_run
//! use sortnet_search::{level2, SearchConfig, SearchTask, Searcher, TaskPool};
//!
//! let config = SearchConfig::new(5, 5, false)?;
//! let mut pool = TaskPool::new();
//! for (index, candidate) in level2::candidates(5).iter().enumerate() {
//!     pool.insert(SearchTask::new(Searcher::new(config, candidate, index, None)));
//! }
//! pool.spawn()?;
//! pool.wait();
//! println!("{} sorting networks found", pool.process().found);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod gray;
pub mod level2;
pub mod matching;
pub mod network;
pub mod pool;
pub mod report;
pub mod search;
pub mod sorting;
pub mod stats;

// Re-export commonly used types
pub use config::{Heuristic, SearchConfig};
pub use matching::Matching;
pub use network::ComparatorNetwork;
pub use pool::{SearchTask, TaskPool};
pub use search::Searcher;
