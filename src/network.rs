// src/network.rs

//! Coefficient store for the trained one-hidden-layer tanh perceptron.
//!
//! The network has two independent output units. Each unit carries its own
//! hidden layer, so the hidden widths of the two units may differ; the only
//! shape shared between them is the input width, which must equal the
//! session's feature count.
//!
//! All shape checking happens at construction. Once a [`Network`] exists,
//! the sweep kernels index into it without further validation.

use anyhow::{ensure, Result};

/// Number of output units a session network always has.
pub const OUTPUT_UNITS: usize = 2;

/// The coefficients of one output unit.
///
/// Layout follows the training export: `coef0` is indexed
/// `[feature][hidden]`, so `coef0[i]` is the row of hidden-layer weights fed
/// by input feature `i`. `cept0` and `coef1` run over hidden nodes, `cept1`
/// is the scalar output bias.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputUnit {
    coef0: Vec<Vec<f64>>,
    cept0: Vec<f64>,
    coef1: Vec<f64>,
    cept1: f64,
}

impl OutputUnit {
    /// Validates the shapes and builds the unit.
    ///
    /// Every `coef0` row must have one weight per hidden node, and `cept0`
    /// and `coef1` must match that hidden width. A mismatch means the
    /// coefficient file does not describe this architecture, so loading
    /// fails rather than letting a sweep index out of bounds later.
    pub fn new(coef0: Vec<Vec<f64>>, cept0: Vec<f64>, coef1: Vec<f64>, cept1: f64) -> Result<Self> {
        let hidden = cept0.len();
        ensure!(hidden > 0, "output unit has an empty hidden layer");
        ensure!(!coef0.is_empty(), "output unit has no input weights");
        ensure!(
            coef1.len() == hidden,
            "output weight count {} does not match hidden width {}",
            coef1.len(),
            hidden
        );
        for (i, row) in coef0.iter().enumerate() {
            ensure!(
                row.len() == hidden,
                "input weight row {} has {} entries, hidden width is {}",
                i,
                row.len(),
                hidden
            );
        }
        let finite = coef0
            .iter()
            .flatten()
            .chain(&cept0)
            .chain(&coef1)
            .chain(std::iter::once(&cept1))
            .all(|v| v.is_finite());
        ensure!(finite, "output unit contains non-finite coefficients");
        Ok(OutputUnit {
            coef0,
            cept0,
            coef1,
            cept1,
        })
    }

    /// Number of hidden nodes in this unit.
    pub fn hidden_len(&self) -> usize {
        self.cept0.len()
    }

    /// Number of input features this unit was trained on.
    pub fn feature_len(&self) -> usize {
        self.coef0.len()
    }

    /// Hidden-layer weight row for input feature `i`.
    pub fn input_weights(&self, i: usize) -> &[f64] {
        &self.coef0[i]
    }

    /// Hidden-layer biases.
    pub fn hidden_biases(&self) -> &[f64] {
        &self.cept0
    }

    /// Hidden-to-output weights.
    pub fn output_weights(&self) -> &[f64] {
        &self.coef1
    }

    /// Output bias.
    pub fn output_bias(&self) -> f64 {
        self.cept1
    }

    /// Full forward pass at one normalized coordinate vector.
    ///
    /// This is the direct, unfactored evaluation used for the current-point
    /// readouts; the sweep kernels use the partial-sum form instead.
    pub fn evaluate(&self, coords: &[f64]) -> f64 {
        debug_assert_eq!(coords.len(), self.feature_len());
        let mut acc = self.cept1;
        for (j, (&bias, &out_w)) in self.cept0.iter().zip(&self.coef1).enumerate() {
            let mut pre = bias;
            for (i, &x) in coords.iter().enumerate() {
                pre += self.coef0[i][j] * x;
            }
            acc += pre.tanh() * out_w;
        }
        acc
    }
}

/// The full two-unit network for a session.
#[derive(Debug, Clone)]
pub struct Network {
    units: Vec<OutputUnit>,
}

impl Network {
    /// Builds the network, requiring exactly [`OUTPUT_UNITS`] units that
    /// agree on the input width.
    pub fn new(units: Vec<OutputUnit>) -> Result<Self> {
        ensure!(
            units.len() == OUTPUT_UNITS,
            "expected {} output units, got {}",
            OUTPUT_UNITS,
            units.len()
        );
        let feature_len = units[0].feature_len();
        for (r, unit) in units.iter().enumerate() {
            ensure!(
                unit.feature_len() == feature_len,
                "output unit {} expects {} features, unit 0 expects {}",
                r,
                unit.feature_len(),
                feature_len
            );
        }
        Ok(Network { units })
    }

    /// Number of input features all units share.
    pub fn feature_len(&self) -> usize {
        self.units[0].feature_len()
    }

    /// The output unit at index `r`.
    pub fn unit(&self, r: usize) -> &OutputUnit {
        &self.units[r]
    }

    pub fn units(&self) -> &[OutputUnit] {
        &self.units
    }
}
