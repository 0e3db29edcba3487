// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Zero-one sorting test for arbitrary comparator networks.
//!
//! By the zero-one principle a comparator network sorts every input iff
//! it sorts every 0/1 input, so sorting can be decided over `2^n` words
//! instead of `n!` orders. This module walks those words in binary Gray
//! code order and re-propagates only the single flipped bit through the
//! network: starting from the all-zero input, each flip traces a path of
//! one toggled value down the layers, and the network sorts iff every
//! flip's toggled value surfaces on the output channel where the sorted
//! boundary between zeros and ones moved.
//!
//! The search itself uses a specialized first-normal-form variant of this
//! test (see [`crate::search`]); the version here works on any network
//! and doubles as the checking half of the test suite, next to the
//! brute-force [`sorts_by_exhaustion`] oracle.

use crate::config::{MAX_DEPTH, MAX_WIDTH};
use crate::gray::BinaryGrayCode;
use crate::network::ComparatorNetwork;

/// Decide whether the network sorts all inputs, in `O(2^n · d)` time.
pub fn sorts(network: &ComparatorNetwork) -> bool {
    let width = network.width();
    let depth = network.depth();
    let mut gray = BinaryGrayCode::new(width);
    let mut value = [[0u8; MAX_WIDTH]; MAX_DEPTH];

    while let Some(delta) = gray.next() {
        // Post-flip: the sorted output has `zeros` zeros, so the toggled
        // value must surface where the zero/one boundary moved.
        let expected = gray.zeros() + gray.bit(delta) as usize - 1;

        let mut j = delta;
        for layer in 0..depth {
            value[layer][j] ^= 1;
            let k = network.partner(layer, j);
            if (value[layer][k] != 0) == (j > k) {
                j = k;
            }
        }

        if j != expected {
            return false;
        }
    }

    true
}

/// Decide sorting by evaluating the network on every 0/1 input directly.
///
/// Exponentially slower than [`sorts`] and independent of the Gray-code
/// machinery; exists as the reference the accelerated tests are checked
/// against.
pub fn sorts_by_exhaustion(network: &ComparatorNetwork) -> bool {
    let width = network.width();
    (0..1u32 << width).all(|input| {
        let output = apply(network, input);
        let zeros = width - input.count_ones() as usize;
        output == ones_mask(width, zeros)
    })
}

/// Run one 0/1 word through the network; bit `j` of the word is the
/// value on channel `j`.
pub fn apply(network: &ComparatorNetwork, input: u32) -> u32 {
    let mut word = input;
    for layer in 0..network.depth() {
        for j in 0..network.width() {
            let k = network.partner(layer, j);
            if k > j {
                let vj = (word >> j) & 1;
                let vk = (word >> k) & 1;
                if vj > vk {
                    word ^= (1 << j) | (1 << k);
                }
            }
        }
    }
    word
}

/// The sorted 0/1 word with the given number of zeros: zeros on the low
/// channels, ones on the high ones.
fn ones_mask(width: usize, zeros: usize) -> u32 {
    (((1u64 << width) - 1) as u32) & !(((1u64 << zeros) - 1) as u32)
}
