// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Layer-2 candidates unique up to channel-pair symmetry.
//!
//! With layer 1 pinned to the identity pairing, permuting whole channel
//! pairs `{2k, 2k+1}` maps first-normal-form networks to first-normal-form
//! networks and preserves sortedness: the relabeling is absorbed by the
//! untouched identity layer and a final output twist that cancels across
//! the remaining layers. Two layer-2 matchings that differ only by such a
//! permutation therefore generate isomorphic subtrees, and the search
//! need only descend into one representative per equivalence class.
//!
//! The representative of a class is the lexicographic minimum of its
//! orbit under all pair permutations, taken over canonical pair lists;
//! candidates are emitted in order of first appearance in matching
//! enumeration order. The orbit scan is at most `6! = 720` permutations
//! per matching and runs once at startup.

use crate::matching::Matching;
use std::collections::BTreeSet;
use tracing::info;

/// All layer-2 candidates for the given width, one per equivalence
/// class, in a deterministic order consumed once by the driver.
pub fn candidates(width: usize) -> Vec<Matching> {
    let permutations = pair_permutations(width / 2);

    let mut seen = BTreeSet::new();
    let mut result = Vec::new();

    let mut matching = Matching::new(width);
    loop {
        let minimum = orbit_minimum(width, &matching.pairs(), &permutations);
        if seen.insert(minimum.clone()) {
            result.push(Matching::from_pairs(width, &minimum));
        }
        if !matching.next() {
            break;
        }
    }

    info!(
        width,
        classes = result.len(),
        "layer-2 candidates enumerated"
    );
    result
}

/// Lexicographically smallest canonical pair list in the orbit of
/// `pairs` under the given pair-block permutations.
fn orbit_minimum(
    width: usize,
    pairs: &[(usize, usize)],
    permutations: &[Vec<usize>],
) -> Vec<(usize, usize)> {
    let mut minimum: Option<Vec<(usize, usize)>> = None;

    for sigma in permutations {
        let mut image: Vec<(usize, usize)> = pairs
            .iter()
            .map(|&(a, b)| {
                let a = relabel(width, sigma, a);
                let b = relabel(width, sigma, b);
                (a.min(b), a.max(b))
            })
            .collect();
        image.sort_unstable();

        if minimum.as_ref().map_or(true, |m| image < *m) {
            minimum = Some(image);
        }
    }

    minimum.unwrap()
}

/// Apply a pair-block permutation to a channel. The lone channel of an
/// odd width belongs to no block and stays put.
#[inline]
fn relabel(width: usize, sigma: &[usize], channel: usize) -> usize {
    if width % 2 == 1 && channel == width - 1 {
        channel
    } else {
        2 * sigma[channel / 2] + channel % 2
    }
}

/// All permutations of `0..blocks`, identity first.
fn pair_permutations(blocks: usize) -> Vec<Vec<usize>> {
    let mut result = Vec::new();
    let mut current: Vec<usize> = (0..blocks).collect();
    permute(&mut current, 0, &mut result);
    result.sort_unstable();
    result
}

fn permute(current: &mut Vec<usize>, from: usize, result: &mut Vec<Vec<usize>>) {
    if from == current.len() {
        result.push(current.clone());
        return;
    }
    for i in from..current.len() {
        current.swap(from, i);
        permute(current, from + 1, result);
        current.swap(from, i);
    }
}
