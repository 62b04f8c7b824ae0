// src/recompute/partial.rs

//! The partial-sum kernel.
//!
//! A hidden unit's pre-activation is a strict sum over all input features.
//! During a sweep only one or two features vary; everything else contributes
//! a constant. This module computes that constant part once per sweep, so
//! the per-sample work drops to adding the swept features' own terms.

use crate::network::OutputUnit;

/// The feature indices a sweep excludes from the fixed set.
///
/// Constructing the exclusion up front (instead of handing the kernel a raw
/// index list) is what keeps "feature counted both as fixed and as swept"
/// from being expressible: the same value drives both the skip here and the
/// sweep terms added later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Exclusion {
    One(usize),
    Pair(usize, usize),
}

impl Exclusion {
    /// Exclusion for a surface axis pair. Coincident axes collapse to a
    /// single excluded index, so the shared feature is skipped exactly once.
    pub(crate) fn axes(x: usize, y: usize) -> Self {
        if x == y {
            Exclusion::One(x)
        } else {
            Exclusion::Pair(x, y)
        }
    }

    pub(crate) fn contains(self, index: usize) -> bool {
        match self {
            Exclusion::One(a) => index == a,
            Exclusion::Pair(a, b) => index == a || index == b,
        }
    }
}

/// Builds the sweep-invariant part of every hidden-unit pre-activation:
/// `sums[j] = cept0[j] + Σ coef0[i][j] * coords[i]` over the non-excluded
/// features `i`.
///
/// O(features × hidden) once per sweep, after which each sample point costs
/// O(hidden) regardless of the feature count.
pub(crate) fn partial_sums(unit: &OutputUnit, coords: &[f64], excluded: Exclusion) -> Vec<f64> {
    debug_assert_eq!(coords.len(), unit.feature_len());
    let mut sums = unit.hidden_biases().to_vec();
    for (i, &value) in coords.iter().enumerate() {
        if excluded.contains(i) {
            continue;
        }
        for (sum, &weight) in sums.iter_mut().zip(unit.input_weights(i)) {
            *sum += weight * value;
        }
    }
    sums
}
