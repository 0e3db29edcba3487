// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Reflected Gray code generators.
//!
//! Both generators stream the index of the single channel whose bit
//! changes at each step, which is what lets the sorting test re-propagate
//! one channel per input instead of re-evaluating the whole network.
//!
//! - [`BinaryGrayCode`] visits all `2^n` words of `n` bits.
//! - [`TernaryGrayCode`] visits only the words whose channel pairs
//!   `(2k, 2k+1)` stay within `{00, 01, 11}`, i.e. the words that survive
//!   a first layer pinned to the identity pairing.
//!
//! Internally both are 1-indexed with sentinel slots past the width, as
//! in the classical nonrecursive formulation; the public API deals in
//! 0-indexed channels and signals exhaustion with `None`. After
//! exhaustion a generator must be re-initialized before reuse.

pub mod binary;
pub mod ternary;

pub use binary::BinaryGrayCode;
pub use ternary::TernaryGrayCode;
