// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Perfect-matching enumerator.
//!
//! A [`Matching`] pairs up the channels of one layer. For even widths it
//! is a perfect matching on `{0..n}`; odd widths borrow a virtual channel
//! `n`, and whichever channel is paired with it carries no comparator at
//! that layer.
//!
//! The enumerator keeps two synchronized pieces of state:
//!
//! - the *sequence form* `seq`, a permutation of the channels in which
//!   consecutive entries `(seq[2k], seq[2k+1])` are the matched pairs,
//!   advanced in lexicographic pair-permutation order by [`Matching::next`];
//! - the *position map* `pos`, with `pos[seq[i]] == i`, which makes the
//!   O(1) swap steps of `next` possible and lets [`Matching::partner`]
//!   answer in O(1).
//!
//! A signed control stack removes the recursion from the classical
//! pair-permutation walk: advancing is a single swap in the common case,
//! with an occasional rotate-and-reset when a prefix is exhausted. The
//! comparator network's map form is rebuilt from the sequence form by
//! [`crate::network::ComparatorNetwork::install`] whenever a layer
//! changes.

use crate::config::{even_ceil, odd_floor, MAX_WIDTH};
use std::fmt;

/// One more slot than the widest supported layer, for the virtual
/// channel of odd widths.
const SEQ_LEN: usize = MAX_WIDTH + 1;

/// Number of matchings a layer of the given width can take.
///
/// `(n-1)·(n-3)·…·1` for even `n`; for odd `n` the partner of the
/// virtual channel varies too, giving `n·(n-2)·…·1`.
pub const fn count(width: usize) -> u64 {
    let mut product = 1u64;
    let mut i = odd_floor(width);
    while i > 1 {
        product *= i as u64;
        i -= 2;
    }
    product
}

/// A perfect matching on the channels of one layer.
///
/// Copy is deliberate: the search keeps one matching per layer in a
/// fixed array and installs level-2 candidates by plain assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Matching {
    /// Layer width in real channels.
    width: usize,

    /// Sequence form; entries `width..even_ceil(width)` hold the
    /// virtual channel for odd widths.
    seq: [usize; SEQ_LEN],

    /// Position of each channel within `seq`.
    pos: [usize; SEQ_LEN],

    /// Control stack for the nonrecursive pair-permutation walk.
    stack: [i64; SEQ_LEN],
}

impl Matching {
    /// Create the identity matching `(0,1)(2,3)…` of the given width.
    pub fn new(width: usize) -> Self {
        debug_assert!(width >= 2 && width <= MAX_WIDTH);
        let mut matching = Self {
            width,
            seq: [0; SEQ_LEN],
            pos: [0; SEQ_LEN],
            stack: [0; SEQ_LEN],
        };
        matching.initialize();
        matching
    }

    /// Reset to the identity matching, the first in enumeration order.
    pub fn initialize(&mut self) {
        for i in 0..even_ceil(self.width) {
            self.seq[i] = i;
            self.pos[i] = i;
            self.stack[i] = i as i64 - 1;
        }
    }

    /// Advance to the next matching in enumeration order.
    ///
    /// Returns false when the sequence is exhausted; the matching is
    /// then left in its final state and must be re-initialized before
    /// another walk.
    pub fn next(&mut self) -> bool {
        let bound = odd_floor(self.width);
        let mut s: usize = 4;
        let mut i = self.stack[s - 1];

        // A prefix is exhausted: rotate it one step and widen the walk
        // by one pair, until some position can still move.
        while i < 1 && s < bound {
            let temp = self.seq[s - 2];
            for j in (2..s).rev() {
                self.seq[j - 1] = self.seq[j - 2];
                self.pos[self.seq[j - 1]] = j - 1;
            }
            self.seq[0] = temp;
            self.pos[temp] = 0;

            for j in 0..s {
                self.stack[j] = j as i64 - 1;
            }

            s += 2;
            i = self.stack[s - 1];
        }

        if i > 0 {
            let i = i as usize;
            self.seq.swap(i - 1, s - 2);
            self.pos[self.seq[i - 1]] = i - 1;
            self.pos[self.seq[s - 2]] = s - 2;
            self.stack[s - 1] = i as i64 - 1;
        }

        self.stack[i as usize] >= 0
    }

    /// Build a matching from an explicit pair list.
    ///
    /// Pairs may be given in any order and orientation; they must cover
    /// every channel exactly once, except that for odd widths exactly
    /// one channel is left over and becomes the layer's fixed point.
    /// The resulting sequence form is canonical (each pair low channel
    /// first, pairs sorted by low channel, fixed point last).
    pub fn from_pairs(width: usize, pairs: &[(usize, usize)]) -> Self {
        debug_assert!(width >= 2 && width <= MAX_WIDTH);
        debug_assert_eq!(pairs.len(), width / 2);

        let mut matching = Self {
            width,
            seq: [0; SEQ_LEN],
            pos: [0; SEQ_LEN],
            stack: [0; SEQ_LEN],
        };

        let mut sorted: Vec<(usize, usize)> = pairs
            .iter()
            .map(|&(a, b)| (a.min(b), a.max(b)))
            .collect();
        sorted.sort_unstable();

        let mut used = [false; SEQ_LEN];
        let mut top = 0;
        for &(a, b) in &sorted {
            debug_assert!(a < width && b < width && !used[a] && !used[b]);
            used[a] = true;
            used[b] = true;
            matching.seq[top] = a;
            matching.seq[top + 1] = b;
            top += 2;
        }

        if width % 2 == 1 {
            // The leftover channel pairs with the virtual channel.
            let fixed = (0..width).find(|&c| !used[c]).unwrap();
            matching.seq[top] = fixed;
            matching.seq[top + 1] = width;
        }

        for i in 0..even_ceil(width) {
            matching.pos[matching.seq[i]] = i;
            matching.stack[i] = i as i64 - 1;
        }

        matching
    }

    /// Rewrite the sequence form into its canonical ordering without
    /// changing which channels are matched.
    pub fn normalize(&mut self) {
        let pairs = self.pairs();
        *self = Self::from_pairs(self.width, &pairs);
    }

    /// The channel matched with `channel`, or the channel itself if it
    /// is the fixed point of an odd-width layer.
    pub fn partner(&self, channel: usize) -> usize {
        let other = self.seq[self.pos[channel] ^ 1];
        if other == self.width {
            channel
        } else {
            other
        }
    }

    /// Layer width in real channels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Entry `i` of the sequence form.
    #[inline]
    pub fn seq(&self, i: usize) -> usize {
        self.seq[i]
    }

    /// The matched pairs as `(low, high)` tuples sorted by low channel,
    /// excluding the fixed point of odd widths.
    pub fn pairs(&self) -> Vec<(usize, usize)> {
        let mut pairs = Vec::with_capacity(self.width / 2);
        for k in 0..even_ceil(self.width) / 2 {
            let a = self.seq[2 * k];
            let b = self.seq[2 * k + 1];
            if a != self.width && b != self.width {
                pairs.push((a.min(b), a.max(b)));
            }
        }
        pairs.sort_unstable();
        pairs
    }
}

/// Space-separated sequence form over the real channels.
impl fmt::Display for Matching {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.width {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", self.seq[i])?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    /// Reference count: (n-1)!! for even n, n!! for odd n.
    fn double_factorial_count(width: usize) -> u64 {
        count(width)
    }

    fn enumerate_all(width: usize) -> Vec<Vec<(usize, usize)>> {
        let mut matching = Matching::new(width);
        let mut all = vec![matching.pairs()];
        while matching.next() {
            all.push(matching.pairs());
        }
        all
    }

    #[test]
    fn test_count_values() {
        assert_eq!(count(3), 3);
        assert_eq!(count(4), 3);
        assert_eq!(count(5), 15);
        assert_eq!(count(6), 15);
        assert_eq!(count(7), 105);
        assert_eq!(count(8), 105);
        assert_eq!(count(9), 945);
        assert_eq!(count(10), 945);
        assert_eq!(count(11), 10395);
        assert_eq!(count(12), 10395);
    }

    #[test]
    fn test_first_matching_is_identity() {
        let matching = Matching::new(6);
        assert_eq!(matching.pairs(), vec![(0, 1), (2, 3), (4, 5)]);
        let matching = Matching::new(5);
        assert_eq!(matching.pairs(), vec![(0, 1), (2, 3)]);
        assert_eq!(matching.partner(4), 4);
    }

    #[test]
    fn test_totality_and_uniqueness() {
        for width in 3..=9 {
            let all = enumerate_all(width);
            assert_eq!(
                all.len() as u64,
                double_factorial_count(width),
                "count at width {width}"
            );
            let distinct: HashSet<_> = all.iter().cloned().collect();
            assert_eq!(distinct.len(), all.len(), "duplicates at width {width}");
        }
    }

    #[test]
    fn test_representation_sync_after_next() {
        for width in [5, 6, 8] {
            let mut matching = Matching::new(width);
            loop {
                for i in 0..even_ceil(width) {
                    assert_eq!(matching.pos[matching.seq[i]], i);
                }
                for channel in 0..width {
                    assert_eq!(matching.partner(matching.partner(channel)), channel);
                }
                if !matching.next() {
                    break;
                }
            }
        }
    }

    #[test]
    fn test_every_channel_covered() {
        for width in [4, 5, 7] {
            for pairs in enumerate_all(width) {
                let mut covered: Vec<usize> = pairs.iter().flat_map(|&(a, b)| [a, b]).collect();
                covered.sort_unstable();
                covered.dedup();
                assert_eq!(covered.len(), 2 * (width / 2));
            }
        }
    }

    #[test]
    fn test_from_pairs_round_trip() {
        for width in [4, 5, 6, 7] {
            let mut matching = Matching::new(width);
            loop {
                let rebuilt = Matching::from_pairs(width, &matching.pairs());
                assert_eq!(rebuilt.pairs(), matching.pairs());
                for channel in 0..width {
                    assert_eq!(rebuilt.partner(channel), matching.partner(channel));
                }
                if !matching.next() {
                    break;
                }
            }
        }
    }

    #[test]
    fn test_normalize_preserves_matching() {
        let mut matching = Matching::new(6);
        matching.next();
        matching.next();
        let pairs = matching.pairs();
        let mut normalized = matching;
        normalized.normalize();
        assert_eq!(normalized.pairs(), pairs);
        // Canonical ordering: pairs appear low channel first, sorted.
        for k in 0..3 {
            assert!(normalized.seq(2 * k) < normalized.seq(2 * k + 1));
        }
        assert!(normalized.seq(0) < normalized.seq(2));
    }

    #[test]
    fn test_reinitialize_restarts_walk() {
        let mut matching = Matching::new(6);
        while matching.next() {}
        matching.initialize();
        assert_eq!(matching.pairs(), vec![(0, 1), (2, 3), (4, 5)]);
        let mut steps = 1;
        while matching.next() {
            steps += 1;
        }
        assert_eq!(steps, 15);
    }
}
