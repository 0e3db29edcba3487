// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Statistics
//!
//! Each task accumulates its own counters while it searches; the pool
//! merges them after join, so no counter is ever shared between threads.

use strum::EnumCount;
use strum_macros::EnumCount as EnumCountMacro;

/// Events counted during a search.
#[derive(EnumCountMacro, Debug, Copy, Clone)]
#[repr(u8)]
pub enum Counter {
    /// Comparator networks run through a full sorting test.
    NetworksTested,

    /// Sorting networks found.
    SortersFound,

    /// Candidates rejected by the nearsort reachability bounds.
    NearsortPrunes,

    /// Candidates rejected by the nearsort2 reachability bounds.
    Nearsort2Prunes,
}

/// A fixed array of counters, one slot per [`Counter`].
#[derive(Debug, Default, Clone, Copy)]
pub struct Statistics {
    counts: [u64; Counter::COUNT],
}

impl Statistics {
    pub fn new() -> Self {
        Statistics::default()
    }

    /// Increment the specified counter by 1.
    #[inline]
    pub fn increment(&mut self, counter: Counter) {
        self.counts[counter as usize] += 1;
    }

    /// Get the current value of the specified counter.
    pub fn get(&self, counter: Counter) -> u64 {
        self.counts[counter as usize]
    }

    /// Fold another task's counters into this one.
    pub fn merge(&mut self, other: &Statistics) {
        for (mine, theirs) in self.counts.iter_mut().zip(other.counts.iter()) {
            *mine += theirs;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_increment_and_get() {
        let mut stats = Statistics::new();
        stats.increment(Counter::SortersFound);
        stats.increment(Counter::SortersFound);
        stats.increment(Counter::NetworksTested);
        assert_eq!(stats.get(Counter::SortersFound), 2);
        assert_eq!(stats.get(Counter::NetworksTested), 1);
        assert_eq!(stats.get(Counter::NearsortPrunes), 0);
    }

    #[test]
    fn test_merge() {
        let mut a = Statistics::new();
        let mut b = Statistics::new();
        a.increment(Counter::SortersFound);
        b.increment(Counter::SortersFound);
        b.increment(Counter::Nearsort2Prunes);
        a.merge(&b);
        assert_eq!(a.get(Counter::SortersFound), 2);
        assert_eq!(a.get(Counter::Nearsort2Prunes), 1);
    }
}
