// src/session.rs

//! `SessionState` owns everything a session reads or writes: the feature
//! set, the network coefficients, the normalized point store, the sampling
//! grids, and the output buffers (readouts, curves, surface heights).
//!
//! There are no ambient globals; the orchestrator threads one
//! `SessionState` by reference through every recompute call. Hosts get
//! read-only access. The mutating methods are crate-internal so buffers can
//! only change through an engine pass, which is what keeps the "replaced
//! wholesale, never patched" rule enforceable in one place.

use anyhow::{ensure, Context, Result};
use log::{debug, trace};

use crate::config::EngineConfig;
use crate::feature::FeatureSet;
use crate::network::{Network, OUTPUT_UNITS};
use crate::recompute;

/// Evenly spaced samples over `[0, 1]`, endpoints included.
fn unit_grid(samples: usize) -> Vec<f64> {
    let last = (samples - 1) as f64;
    (0..samples).map(|k| k as f64 / last).collect()
}

/// The sampled response surface over the two designated axis features.
///
/// `mesh_x`/`mesh_y` hold the raveled grid coordinates (row-major: the x
/// samples repeat within a row, the y sample is constant along it). They are
/// set once at assembly; only the height sequences are ever rewritten.
#[derive(Debug, Clone)]
pub struct SurfaceSheet {
    wx: Vec<f64>,
    wy: Vec<f64>,
    z: [Vec<f64>; OUTPUT_UNITS],
}

impl SurfaceSheet {
    fn new(columns: usize, rows: usize) -> Self {
        let xs = unit_grid(columns);
        let ys = unit_grid(rows);
        let len = columns * rows;
        let mut wx = Vec::with_capacity(len);
        let mut wy = Vec::with_capacity(len);
        for &y in &ys {
            for &x in &xs {
                wx.push(x);
                wy.push(y);
            }
        }
        SurfaceSheet {
            wx,
            wy,
            z: [vec![0.0; len], vec![0.0; len]],
        }
    }

    /// Number of grid points in the raveled mesh.
    pub fn len(&self) -> usize {
        self.wx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wx.is_empty()
    }

    /// Raveled x coordinates of the mesh, in the normalized domain.
    pub fn mesh_x(&self) -> &[f64] {
        &self.wx
    }

    /// Raveled y coordinates of the mesh, in the normalized domain.
    pub fn mesh_y(&self) -> &[f64] {
        &self.wy
    }

    /// Height sequence for output unit `r`, aligned to the mesh.
    pub fn heights(&self, r: usize) -> &[f64] {
        &self.z[r]
    }

    pub(crate) fn replace_heights(&mut self, r: usize, values: Vec<f64>) {
        debug_assert_eq!(values.len(), self.wx.len());
        self.z[r] = values;
    }
}

/// All state for one interactive session.
#[derive(Debug, Clone)]
pub struct SessionState {
    features: FeatureSet,
    network: Network,
    output_labels: [String; OUTPUT_UNITS],
    /// Per-feature `[h, h]` display pairs; both ends equal since the point
    /// is a point, not an interval.
    point: Vec<[f64; 2]>,
    /// Flat coordinate snapshot the sweeps read. Refreshed from `point` as
    /// part of each feature update, so a pass never sees a half-applied mix.
    coords: Vec<f64>,
    curve_grid: Vec<f64>,
    /// `curves[feature][r]`, each aligned to `curve_grid`.
    curves: Vec<[Vec<f64>; OUTPUT_UNITS]>,
    surface: SurfaceSheet,
    surface_axes: (usize, usize),
    readouts: [f64; OUTPUT_UNITS],
}

impl SessionState {
    /// Assembles a session and fills the output buffers with zeros sized to
    /// the configured grids. Call [`prime`](Self::prime) (the orchestrator
    /// constructor does) before handing buffers to a renderer.
    ///
    /// Fails on any cross-structure shape mismatch: the network's input
    /// width, the initial-value count, and the axis names must all agree
    /// with the feature set.
    pub fn new(
        features: FeatureSet,
        network: Network,
        output_labels: [String; OUTPUT_UNITS],
        initial_values: &[f64],
        config: &EngineConfig,
    ) -> Result<Self> {
        config.validate()?;
        ensure!(
            network.feature_len() == features.len(),
            "network was trained on {} features, session defines {}",
            network.feature_len(),
            features.len()
        );
        ensure!(
            initial_values.len() == features.len(),
            "got {} initial values for {} features",
            initial_values.len(),
            features.len()
        );

        let axis_x = match &config.surface.axis_x {
            Some(name) => features
                .resolve(name)
                .context("resolving surface x axis")?,
            None => 0,
        };
        let axis_y = match &config.surface.axis_y {
            Some(name) => features
                .resolve(name)
                .context("resolving surface y axis")?,
            None => 1.min(features.len() - 1),
        };

        let mut point = Vec::with_capacity(features.len());
        let mut coords = Vec::with_capacity(features.len());
        for (feature, &raw) in features.iter().zip(initial_values) {
            let h = feature.normalize(raw);
            point.push([h, h]);
            coords.push(h);
        }

        let curve_grid = unit_grid(config.curve.samples);
        let curves = (0..features.len())
            .map(|_| {
                [
                    vec![0.0; config.curve.samples],
                    vec![0.0; config.curve.samples],
                ]
            })
            .collect();

        debug!(
            "Session: assembled {} features, hidden widths [{}, {}], axes ({}, {})",
            features.len(),
            network.unit(0).hidden_len(),
            network.unit(1).hidden_len(),
            axis_x,
            axis_y
        );

        Ok(SessionState {
            features,
            network,
            output_labels,
            point,
            coords,
            curve_grid,
            curves,
            surface: SurfaceSheet::new(config.surface.columns, config.surface.rows),
            surface_axes: (axis_x, axis_y),
            readouts: [0.0; OUTPUT_UNITS],
        })
    }

    /// Computes every output buffer from the initial point: both readouts,
    /// the curve of *every* feature (at seed time there is no moved feature
    /// to skip), and the surface.
    pub(crate) fn prime(&mut self) {
        recompute::recompute_readouts(self);
        recompute::recompute_curves(self, None);
        recompute::recompute_surface(self);
        debug!("Session: primed all output buffers");
    }

    /// Normalizes `raw` for the feature at `index`, writes its `[h, h]`
    /// point entry, and refreshes the coordinate snapshot the sweeps read.
    pub(crate) fn set_feature_value(&mut self, index: usize, raw: f64) {
        let h = self.features.get(index).normalize(raw);
        self.point[index] = [h, h];
        for (slot, pair) in self.coords.iter_mut().zip(&self.point) {
            *slot = pair[0];
        }
        trace!(
            "Session: feature {} set to raw {} (normalized {:.6})",
            index,
            raw,
            h
        );
    }

    pub fn features(&self) -> &FeatureSet {
        &self.features
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    /// Display label for output unit `r`.
    pub fn output_label(&self, r: usize) -> &str {
        &self.output_labels[r]
    }

    /// The per-feature `[h, h]` display pairs.
    pub fn point(&self) -> &[[f64; 2]] {
        &self.point
    }

    /// The flat normalized coordinate snapshot, one scalar per feature.
    pub fn coordinates(&self) -> &[f64] {
        &self.coords
    }

    /// The shared x-sample grid all curves are evaluated on.
    pub fn curve_grid(&self) -> &[f64] {
        &self.curve_grid
    }

    /// Curve of `feature` for output unit `r`, aligned to the curve grid.
    pub fn curve(&self, feature: usize, r: usize) -> &[f64] {
        &self.curves[feature][r]
    }

    pub fn surface(&self) -> &SurfaceSheet {
        &self.surface
    }

    /// Indices of the features spanning the surface (x axis, y axis).
    pub fn surface_axes(&self) -> (usize, usize) {
        self.surface_axes
    }

    /// Current-point readout for output unit `r`.
    pub fn readout(&self, r: usize) -> f64 {
        self.readouts[r]
    }

    pub(crate) fn set_readout(&mut self, r: usize, value: f64) {
        self.readouts[r] = value;
    }

    pub(crate) fn replace_curve(&mut self, feature: usize, r: usize, values: Vec<f64>) {
        debug_assert_eq!(values.len(), self.curve_grid.len());
        self.curves[feature][r] = values;
    }

    pub(crate) fn replace_surface_heights(&mut self, r: usize, values: Vec<f64>) {
        self.surface.replace_heights(r, values);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::Feature;
    use crate::network::OutputUnit;

    fn three_features() -> FeatureSet {
        FeatureSet::new(vec![
            Feature::new("a", "A", 0.0, 10.0).unwrap(),
            Feature::new("b", "B", 0.0, 1.0).unwrap(),
            Feature::new("c", "C", -1.0, 1.0).unwrap(),
        ])
        .unwrap()
    }

    fn three_feature_network() -> Network {
        let unit = || {
            OutputUnit::new(
                vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![0.5, 0.5]],
                vec![0.0, 0.0],
                vec![1.0, 1.0],
                0.0,
            )
            .unwrap()
        };
        Network::new(vec![unit(), unit()]).unwrap()
    }

    fn labels() -> [String; OUTPUT_UNITS] {
        ["R1".to_string(), "R2".to_string()]
    }

    #[test]
    fn assembly_rejects_cross_structure_mismatches() {
        let config = EngineConfig::default();
        // Network input width vs feature count.
        let narrow = Network::new(vec![
            OutputUnit::new(vec![vec![1.0]], vec![0.0], vec![1.0], 0.0).unwrap(),
            OutputUnit::new(vec![vec![1.0]], vec![0.0], vec![1.0], 0.0).unwrap(),
        ])
        .unwrap();
        assert!(
            SessionState::new(three_features(), narrow, labels(), &[0.0, 0.0, 0.0], &config)
                .is_err()
        );
        // Initial value count.
        assert!(SessionState::new(
            three_features(),
            three_feature_network(),
            labels(),
            &[0.0, 0.0],
            &config
        )
        .is_err());
        // Unknown axis name.
        let mut config = EngineConfig::default();
        config.surface.axis_x = Some("missing".to_string());
        assert!(SessionState::new(
            three_features(),
            three_feature_network(),
            labels(),
            &[0.0, 0.0, 0.0],
            &config
        )
        .is_err());
    }

    #[test]
    fn surface_axes_default_to_first_two_features_and_resolve_by_name() {
        let config = EngineConfig::default();
        let session = SessionState::new(
            three_features(),
            three_feature_network(),
            labels(),
            &[0.0, 0.0, 0.0],
            &config,
        )
        .unwrap();
        assert_eq!(session.surface_axes(), (0, 1));

        let mut config = EngineConfig::default();
        config.surface.axis_x = Some("c".to_string());
        config.surface.axis_y = Some("a".to_string());
        let session = SessionState::new(
            three_features(),
            three_feature_network(),
            labels(),
            &[0.0, 0.0, 0.0],
            &config,
        )
        .unwrap();
        assert_eq!(session.surface_axes(), (2, 0));
    }

    #[test]
    fn grids_have_configured_shapes() {
        let session = SessionState::new(
            three_features(),
            three_feature_network(),
            labels(),
            &[0.0, 0.0, 0.0],
            &EngineConfig::default(),
        )
        .unwrap();

        let grid = session.curve_grid();
        assert_eq!(grid.len(), 64);
        assert_eq!(grid[0], 0.0);
        assert_eq!(grid[63], 1.0);
        assert!(grid.windows(2).all(|w| w[1] > w[0]));

        let sheet = session.surface();
        assert_eq!(sheet.len(), 625);
        // Row-major ravel: x repeats its 25-sample cycle, y is constant
        // within a row and steps between rows.
        assert_eq!(sheet.mesh_x()[0], 0.0);
        assert_eq!(sheet.mesh_x()[24], 1.0);
        assert_eq!(sheet.mesh_x()[25], 0.0);
        assert_eq!(sheet.mesh_y()[24], 0.0);
        assert_eq!(sheet.mesh_y()[25], sheet.mesh_y()[49]);
        assert_eq!(sheet.mesh_y()[624], 1.0);
        assert_eq!(sheet.heights(0).len(), 625);
        assert_eq!(sheet.heights(1).len(), 625);
    }

    #[test]
    fn set_feature_value_updates_point_pair_and_snapshot() {
        let mut session = SessionState::new(
            three_features(),
            three_feature_network(),
            labels(),
            &[0.0, 0.0, -1.0],
            &EngineConfig::default(),
        )
        .unwrap();
        assert_eq!(session.coordinates(), &[0.0, 0.0, 0.0]);

        session.set_feature_value(0, 5.0);
        assert_eq!(session.point()[0], [0.5, 0.5]);
        assert_eq!(session.coordinates(), &[0.5, 0.0, 0.0]);

        // Out-of-bounds raw values pass through unclamped.
        session.set_feature_value(1, 2.0);
        assert_eq!(session.point()[1], [2.0, 2.0]);
        assert_eq!(session.coordinates()[1], 2.0);
    }

    #[test]
    fn single_feature_session_collapses_default_axes() {
        let features = FeatureSet::new(vec![Feature::new("only", "Only", 0.0, 1.0).unwrap()])
            .unwrap();
        let unit = || OutputUnit::new(vec![vec![1.0]], vec![0.0], vec![1.0], 0.0).unwrap();
        let network = Network::new(vec![unit(), unit()]).unwrap();
        let session =
            SessionState::new(features, network, labels(), &[0.5], &EngineConfig::default())
                .unwrap();
        assert_eq!(session.surface_axes(), (0, 0));
    }
}
