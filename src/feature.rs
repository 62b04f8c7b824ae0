// src/feature.rs

//! Defines `Feature` (one named input dimension of the network, with its
//! normalization bounds) and `FeatureSet` (the fixed, ordered collection of
//! features whose positions are the canonical indices shared by the point
//! store, the weight matrices, and every output buffer).
//!
//! The ordering of a `FeatureSet` is significant and never changes for the
//! life of a session.

use anyhow::{ensure, Context, Result};
use std::collections::HashMap;

/// One input dimension of the perceptron.
///
/// `min`/`max` are the raw-unit bounds used to map slider values into the
/// `[0, 1]` domain the network was trained on. They are fixed at load time.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    /// Stable short key, used by hosts to identify the feature in events.
    pub name: String,
    /// Human-readable display name; the engine treats it as opaque.
    pub label: String,
    min: f64,
    max: f64,
}

impl Feature {
    /// Creates a feature, rejecting degenerate or non-finite bounds.
    ///
    /// `max == min` would make normalization divide by zero and silently fill
    /// every downstream buffer with NaN, so it is refused here instead.
    pub fn new(name: impl Into<String>, label: impl Into<String>, min: f64, max: f64) -> Result<Self> {
        let name = name.into();
        ensure!(
            min.is_finite() && max.is_finite(),
            "feature '{}' has non-finite bounds [{}, {}]",
            name,
            min,
            max
        );
        ensure!(
            max > min,
            "feature '{}' has degenerate bounds [{}, {}] (max must exceed min)",
            name,
            min,
            max
        );
        Ok(Feature {
            name,
            label: label.into(),
            min,
            max,
        })
    }

    /// Raw-unit bounds `(min, max)` of this feature.
    pub fn bounds(&self) -> (f64, f64) {
        (self.min, self.max)
    }

    /// Maps a raw slider value into the feature's `[0, 1]` domain.
    ///
    /// No clamping: values outside the bounds produce coordinates outside
    /// `[0, 1]` and are fed through the network unchanged. That is accepted
    /// input-range behavior, not an error.
    pub fn normalize(&self, raw: f64) -> f64 {
        (raw - self.min) / (self.max - self.min)
    }

    /// Inverse of [`normalize`](Self::normalize): maps a normalized
    /// coordinate back into raw units, e.g. for axis labeling.
    pub fn denormalize(&self, h: f64) -> f64 {
        h * (self.max - self.min) + self.min
    }
}

/// The fixed ordered list of features for a session.
///
/// Positions in this list are the feature indices used everywhere else
/// (weight matrix rows, point-store entries, curve buffers), so a value is
/// looked up by name exactly once — at the event boundary — and flows through
/// the engine as an index thereafter.
#[derive(Debug, Clone)]
pub struct FeatureSet {
    features: Vec<Feature>,
    by_name: HashMap<String, usize>,
}

impl FeatureSet {
    /// Builds the set from an ordered list of features.
    ///
    /// Rejects an empty list and duplicate names; a duplicate would make the
    /// name→index mapping ambiguous.
    pub fn new(features: Vec<Feature>) -> Result<Self> {
        ensure!(!features.is_empty(), "a session needs at least one feature");
        let mut by_name = HashMap::with_capacity(features.len());
        for (index, feature) in features.iter().enumerate() {
            let previous = by_name.insert(feature.name.clone(), index);
            ensure!(
                previous.is_none(),
                "duplicate feature name '{}' (positions {} and {})",
                feature.name,
                previous.unwrap_or_default(),
                index
            );
        }
        Ok(FeatureSet { features, by_name })
    }

    /// Number of features in the session.
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// The feature at `index`. Panics if out of range, like slice indexing;
    /// indices originate inside the engine and are valid by construction.
    pub fn get(&self, index: usize) -> &Feature {
        &self.features[index]
    }

    /// Resolves a feature name to its canonical index.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    /// Like [`index_of`](Self::index_of) but produces a descriptive error,
    /// for use at the event boundary where the name comes from the host.
    pub fn resolve(&self, name: &str) -> Result<usize> {
        self.index_of(name)
            .with_context(|| format!("unknown feature '{}'", name))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Feature> {
        self.features.iter()
    }
}
