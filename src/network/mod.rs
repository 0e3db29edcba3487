// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Comparator network table and its on-disk text format.
//!
//! Each layer is stored in map form: `link[layer][j] == k` with `k != j`
//! means a comparator joins channels `j` and `k` at that layer, routing
//! the minimum to `min(j, k)` and the maximum to `max(j, k)`;
//! `link[layer][j] == j` means channel `j` is free. The map form is what
//! the sorting test probes on every flip, so lookups must be O(1); it is
//! rebuilt from a matching's sequence form by [`ComparatorNetwork::install`]
//! whenever the search changes a layer.
//!
//! A comparator that repeats the identical pair of the previous layer is
//! a no-op; [`ComparatorNetwork::remove_repeated_comparators`] marks such
//! comparators redundant so that the saved text omits them.

use crate::config::{MAX_DEPTH, MAX_WIDTH};
use crate::matching::Matching;
use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

/// A malformed network text file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkParseError {
    /// More lines than the expected depth.
    #[error("expected {depth} layers, found more")]
    TooManyLayers { depth: usize },

    /// A token that is not a channel number.
    #[error("layer {layer}: invalid channel token {token:?}")]
    InvalidToken { layer: usize, token: String },

    /// An odd number of channel tokens on one line.
    #[error("layer {layer}: unpaired channel token")]
    UnpairedChannel { layer: usize },

    /// A channel outside `0..width`.
    #[error("layer {layer}: channel {channel} out of range for width {width}")]
    ChannelOutOfRange {
        layer: usize,
        channel: usize,
        width: usize,
    },

    /// A channel used by two comparators in one layer.
    #[error("layer {layer}: channel {channel} appears in two comparators")]
    ChannelReused { layer: usize, channel: usize },
}

/// A depth×width table of comparator layers in map form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComparatorNetwork {
    /// Number of input channels.
    width: usize,

    /// Number of layers.
    depth: usize,

    /// Partner of each channel at each layer; self means no comparator.
    link: [[usize; MAX_WIDTH]; MAX_DEPTH],

    /// Comparators that duplicate the previous layer's pair.
    redundant: [[bool; MAX_WIDTH]; MAX_DEPTH],
}

impl ComparatorNetwork {
    /// Create a network with no comparators.
    pub fn new(width: usize, depth: usize) -> Self {
        debug_assert!(width >= 2 && width <= MAX_WIDTH);
        debug_assert!(depth >= 1 && depth <= MAX_DEPTH);
        let mut network = Self {
            width,
            depth,
            link: [[0; MAX_WIDTH]; MAX_DEPTH],
            redundant: [[false; MAX_WIDTH]; MAX_DEPTH],
        };
        for layer in 0..depth {
            network.clear_layer(layer);
        }
        network
    }

    /// Number of input channels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of layers.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Partner of `channel` at `layer`; the channel itself when free.
    #[inline]
    pub fn partner(&self, layer: usize, channel: usize) -> usize {
        self.link[layer][channel]
    }

    /// Join two free channels with a comparator.
    #[inline]
    pub fn join(&mut self, layer: usize, j: usize, k: usize) {
        debug_assert!(self.link[layer][j] == j && self.link[layer][k] == k);
        self.link[layer][j] = k;
        self.link[layer][k] = j;
    }

    /// Remove every comparator from a layer.
    pub fn clear_layer(&mut self, layer: usize) {
        for channel in 0..self.width {
            self.link[layer][channel] = channel;
        }
    }

    /// Set a layer to the identity pairing `(0,1)(2,3)…`.
    pub fn set_identity_layer(&mut self, layer: usize) {
        for channel in 0..self.width {
            self.link[layer][channel] = channel ^ 1;
        }
        if self.width % 2 == 1 {
            self.link[layer][self.width - 1] = self.width - 1;
        }
    }

    /// Rebuild a layer's map form from a matching's sequence form.
    ///
    /// This is the synchronize step run after every matching advance;
    /// afterwards `partner(layer, partner(layer, j)) == j` for all `j`.
    pub fn install(&mut self, layer: usize, matching: &Matching) {
        debug_assert_eq!(matching.width(), self.width);
        let mut j = 0;
        while j < self.width {
            let x = matching.seq(j);
            let y = matching.seq(j + 1);
            // The enumerator keeps the virtual channel of odd widths in
            // the final, odd-indexed slot.
            debug_assert_ne!(x, self.width);

            if y == self.width {
                // Partnered with the virtual channel of an odd width:
                // no comparator here.
                self.link[layer][x] = x;
            } else {
                self.link[layer][x] = y;
                self.link[layer][y] = x;
            }
            j += 2;
        }
    }

    /// Mark comparators that duplicate the previous layer's pair and
    /// return the number of comparators that remain.
    pub fn remove_repeated_comparators(&mut self) -> usize {
        let mut endpoints = 0;

        for layer in 0..self.depth {
            for channel in 0..self.width {
                self.redundant[layer][channel] = false;
            }
        }

        for channel in 0..self.width {
            if self.link[0][channel] != channel {
                endpoints += 1;
            }
        }

        for layer in 1..self.depth {
            for channel in 0..self.width {
                if self.link[layer][channel] == self.link[layer - 1][channel] {
                    self.redundant[layer][channel] = true;
                } else if self.link[layer][channel] != channel {
                    endpoints += 1;
                }
            }
        }

        // Each comparator was counted once per endpoint.
        endpoints / 2
    }

    /// The text form: one line per layer of space-terminated "j k "
    /// pairs with `j < k`, redundant comparators omitted.
    ///
    /// Redundancy flags must be current; callers go through
    /// [`Self::remove_repeated_comparators`] first.
    pub fn to_text(&self) -> String {
        let mut text = String::new();
        for layer in 0..self.depth {
            for j in 0..self.width {
                let k = self.link[layer][j];
                if !self.redundant[layer][j] && k > j {
                    text.push_str(&format!("{j} {k} "));
                }
            }
            text.push('\n');
        }
        text
    }

    /// Save the text form to a file.
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let mut file = File::create(path)?;
        file.write_all(self.to_text().as_bytes())
    }

    /// Parse the text form back into a network.
    ///
    /// Missing trailing lines are treated as empty layers. Redundancy
    /// flags are recomputed, so a parse/emit round trip of a saved
    /// network is byte-identical.
    pub fn parse(width: usize, depth: usize, text: &str) -> Result<Self, NetworkParseError> {
        let mut network = Self::new(width, depth);

        for (layer, line) in text.lines().enumerate() {
            if layer >= depth {
                if line.trim().is_empty() {
                    continue;
                }
                return Err(NetworkParseError::TooManyLayers { depth });
            }

            let mut tokens = line.split_whitespace();
            loop {
                let Some(first) = tokens.next() else { break };
                let j: usize =
                    first
                        .parse()
                        .map_err(|_| NetworkParseError::InvalidToken {
                            layer,
                            token: first.to_string(),
                        })?;
                let second = tokens
                    .next()
                    .ok_or(NetworkParseError::UnpairedChannel { layer })?;
                let k: usize =
                    second
                        .parse()
                        .map_err(|_| NetworkParseError::InvalidToken {
                            layer,
                            token: second.to_string(),
                        })?;

                for channel in [j, k] {
                    if channel >= width {
                        return Err(NetworkParseError::ChannelOutOfRange {
                            layer,
                            channel,
                            width,
                        });
                    }
                }
                for channel in [j, k] {
                    if network.link[layer][channel] != channel {
                        return Err(NetworkParseError::ChannelReused { layer, channel });
                    }
                }
                if j == k {
                    return Err(NetworkParseError::ChannelReused { layer, channel: j });
                }

                network.link[layer][j] = k;
                network.link[layer][k] = j;
            }
        }

        network.remove_repeated_comparators();
        Ok(network)
    }
}

impl fmt::Display for ComparatorNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(width: usize, depth: usize, layers: &[&[(usize, usize)]]) -> ComparatorNetwork {
        let mut network = ComparatorNetwork::new(width, depth);
        for (layer, pairs) in layers.iter().enumerate() {
            for &(j, k) in *pairs {
                network.join(layer, j, k);
            }
        }
        network
    }

    #[test]
    fn test_new_network_is_empty() {
        let network = ComparatorNetwork::new(5, 3);
        for layer in 0..3 {
            for channel in 0..5 {
                assert_eq!(network.partner(layer, channel), channel);
            }
        }
    }

    #[test]
    fn test_identity_layer() {
        let mut network = ComparatorNetwork::new(5, 2);
        network.set_identity_layer(0);
        assert_eq!(network.partner(0, 0), 1);
        assert_eq!(network.partner(0, 1), 0);
        assert_eq!(network.partner(0, 2), 3);
        assert_eq!(network.partner(0, 4), 4);
    }

    #[test]
    fn test_install_syncs_map_form() {
        let mut matching = Matching::new(6);
        let mut network = ComparatorNetwork::new(6, 2);
        loop {
            network.install(1, &matching);
            for channel in 0..6 {
                let partner = network.partner(1, channel);
                assert_eq!(network.partner(1, partner), channel);
                assert_eq!(partner, matching.partner(channel));
            }
            if !matching.next() {
                break;
            }
        }
    }

    #[test]
    fn test_install_odd_width_fixed_point() {
        let mut matching = Matching::new(5);
        let mut network = ComparatorNetwork::new(5, 1);
        loop {
            network.install(0, &matching);
            let free: Vec<usize> = (0..5).filter(|&c| network.partner(0, c) == c).collect();
            assert_eq!(free.len(), 1);
            if !matching.next() {
                break;
            }
        }
    }

    #[test]
    fn test_redundancy_marking_and_size() {
        // Layer 1 repeats (0,1) from layer 0; only three comparators
        // survive.
        let mut network = build(4, 2, &[&[(0, 1), (2, 3)], &[(0, 1)]]);
        assert_eq!(network.remove_repeated_comparators(), 2);
        assert!(network.redundant[1][0]);
        assert!(network.redundant[1][1]);

        let mut network = build(4, 2, &[&[(0, 1), (2, 3)], &[(0, 2), (1, 3)]]);
        assert_eq!(network.remove_repeated_comparators(), 4);
    }

    #[test]
    fn test_text_format() {
        let mut network = build(4, 3, &[&[(0, 1), (2, 3)], &[(0, 2), (1, 3)], &[(1, 2)]]);
        network.remove_repeated_comparators();
        assert_eq!(network.to_text(), "0 1 2 3 \n0 2 1 3 \n1 2 \n");
    }

    #[test]
    fn test_redundant_pair_omitted_from_text() {
        let mut network = build(3, 2, &[&[(0, 1)], &[(0, 1)]]);
        network.remove_repeated_comparators();
        assert_eq!(network.to_text(), "0 1 \n\n");
    }

    #[test]
    fn test_parse_round_trip() {
        let mut network = build(5, 3, &[&[(0, 1), (2, 3)], &[(1, 2), (3, 4)], &[(0, 1), (2, 3)]]);
        network.remove_repeated_comparators();
        let text = network.to_text();
        let parsed = ComparatorNetwork::parse(5, 3, &text).unwrap();
        assert_eq!(parsed.to_text(), text);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(ComparatorNetwork::parse(4, 2, "0 x \n\n").is_err());
        assert!(ComparatorNetwork::parse(4, 2, "0 \n\n").is_err());
        assert!(ComparatorNetwork::parse(4, 2, "0 9 \n\n").is_err());
        assert!(ComparatorNetwork::parse(4, 2, "0 1 1 2 \n\n").is_err());
        assert!(ComparatorNetwork::parse(4, 2, "\n\n0 1 \n").is_err());
    }
}
