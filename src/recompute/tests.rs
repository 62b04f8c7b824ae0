// src/recompute/tests.rs

// --- Unit Tests ---
use super::partial::{partial_sums, Exclusion};
use super::{recompute_curves, recompute_readouts, recompute_surface};
use crate::config::EngineConfig;
use crate::feature::{Feature, FeatureSet};
use crate::network::{Network, OutputUnit, OUTPUT_UNITS};
use crate::session::SessionState;

// --- Test Helpers ---

fn unit(coef0: Vec<Vec<f64>>, cept0: Vec<f64>, coef1: Vec<f64>, cept1: f64) -> OutputUnit {
    OutputUnit::new(coef0, cept0, coef1, cept1).expect("valid test unit")
}

/// Features on `[0, 1]` bounds, so raw slider values equal normalized
/// coordinates and tests can place the point exactly on grid samples.
fn unit_features(names: &[&str]) -> FeatureSet {
    FeatureSet::new(
        names
            .iter()
            .map(|n| Feature::new(*n, n.to_uppercase(), 0.0, 1.0).expect("valid test feature"))
            .collect(),
    )
    .expect("valid test feature set")
}

fn labels() -> [String; OUTPUT_UNITS] {
    ["R1".to_string(), "R2".to_string()]
}

/// Four features, differing hidden widths per unit, and deliberately
/// irregular weights so no symmetry can hide an indexing mistake.
fn mixed_session(samples: usize) -> SessionState {
    let features = unit_features(&["alpha", "beta", "gamma", "delta"]);
    let unit0 = unit(
        vec![
            vec![0.8, -1.2, 0.3],
            vec![-0.5, 0.7, 1.1],
            vec![1.4, 0.2, -0.9],
            vec![0.1, -0.6, 0.5],
        ],
        vec![0.05, -0.15, 0.25],
        vec![1.3, -0.4, 0.8],
        0.2,
    );
    let unit1 = unit(
        vec![
            vec![-0.3, 0.9],
            vec![1.2, -0.1],
            vec![0.4, 0.6],
            vec![-0.8, 0.35],
        ],
        vec![0.1, 0.3],
        vec![-0.7, 1.1],
        -0.05,
    );
    let network = Network::new(vec![unit0, unit1]).expect("valid test network");
    let mut config = EngineConfig::default();
    config.curve.samples = samples;
    config.surface.columns = 5;
    config.surface.rows = 4;
    SessionState::new(features, network, labels(), &[0.0; 4], &config)
        .expect("valid test session")
}

/// Network output at the session's coordinates with the two (distinct)
/// axis features replaced by mesh point `k`'s coordinates.
fn direct_surface_value(session: &SessionState, r: usize, k: usize) -> f64 {
    let (ax, ay) = session.surface_axes();
    assert_ne!(ax, ay, "direct cross-check needs distinct axes");
    let mut coords = session.coordinates().to_vec();
    coords[ax] = session.surface().mesh_x()[k];
    coords[ay] = session.surface().mesh_y()[k];
    session.network().unit(r).evaluate(&coords)
}

fn assert_close(actual: f64, expected: f64, what: &str) {
    let tolerance = 1e-9 * expected.abs().max(1.0);
    assert!(
        (actual - expected).abs() <= tolerance,
        "{}: got {}, expected {}",
        what,
        actual,
        expected
    );
}

// --- Partial-Sum Kernel ---

#[test]
fn partial_sums_add_only_the_non_excluded_features() {
    let unit = unit(
        vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]],
        vec![0.5, -0.5],
        vec![1.0, 1.0],
        0.0,
    );
    let coords = [0.1, 0.2, 0.3];

    let sums = partial_sums(&unit, &coords, Exclusion::One(1));
    assert_close(sums[0], 0.5 + 1.0 * 0.1 + 5.0 * 0.3, "hidden 0, excluding 1");
    assert_close(sums[1], -0.5 + 2.0 * 0.1 + 6.0 * 0.3, "hidden 1, excluding 1");

    let sums = partial_sums(&unit, &coords, Exclusion::Pair(0, 2));
    assert_close(sums[0], 0.5 + 3.0 * 0.2, "hidden 0, excluding 0 and 2");
    assert_close(sums[1], -0.5 + 4.0 * 0.2, "hidden 1, excluding 0 and 2");
}

// --- Curves and Readouts ---

#[test_log::test]
fn factorized_curve_matches_direct_evaluation_at_the_current_point() {
    // Nine samples put the grid at k/8; the chosen coordinates are all
    // exact grid values, so each feature's curve passes through the
    // current point at one sample index.
    let mut session = mixed_session(9);
    session.set_feature_value(0, 0.25);
    session.set_feature_value(1, 0.5);
    session.set_feature_value(2, 0.875);
    session.set_feature_value(3, 0.0);
    recompute_readouts(&mut session);
    recompute_curves(&mut session, None);

    for f in 0..session.features().len() {
        let coord = session.coordinates()[f];
        let k = session
            .curve_grid()
            .iter()
            .position(|&x| x == coord)
            .expect("coordinate sits on a grid sample");
        for r in 0..OUTPUT_UNITS {
            assert_close(
                session.curve(f, r)[k],
                session.readout(r),
                &format!("curve {} unit {} at its own coordinate", f, r),
            );
        }
    }
}

#[test]
fn recomputing_twice_at_the_same_point_is_bitwise_identical() {
    let mut session = mixed_session(16);
    session.set_feature_value(2, 0.4);
    recompute_readouts(&mut session);
    recompute_curves(&mut session, Some(2));
    recompute_surface(&mut session);
    let first = session.clone();

    recompute_readouts(&mut session);
    recompute_curves(&mut session, Some(2));
    recompute_surface(&mut session);

    for r in 0..OUTPUT_UNITS {
        assert_eq!(session.readout(r), first.readout(r), "readout {}", r);
        assert_eq!(
            session.surface().heights(r),
            first.surface().heights(r),
            "surface heights {}",
            r
        );
        for f in 0..session.features().len() {
            assert_eq!(session.curve(f, r), first.curve(f, r), "curve {} {}", f, r);
        }
    }
}

#[test]
fn moved_features_own_curve_is_left_untouched() {
    let mut session = mixed_session(16);
    session.prime();
    let moved_before: Vec<f64> = session.curve(2, 0).to_vec();
    let other_before: Vec<f64> = session.curve(0, 0).to_vec();

    session.set_feature_value(2, 0.9);
    recompute_curves(&mut session, Some(2));

    assert_eq!(
        session.curve(2, 0),
        moved_before.as_slice(),
        "moved feature's curve must keep its pre-event contents"
    );
    assert_ne!(
        session.curve(0, 0),
        other_before.as_slice(),
        "a fixed feature's curve must pick up the new coordinate"
    );
}

#[test]
fn priming_regenerates_every_curve_including_the_first() {
    let mut session = mixed_session(8);
    session.set_feature_value(0, 0.75);
    session.prime();
    // With no moved feature there is no skip: every curve reflects the
    // current coordinates, checked through the direct-evaluation path.
    for f in 0..session.features().len() {
        for r in 0..OUTPUT_UNITS {
            assert_eq!(session.curve(f, r).len(), session.curve_grid().len());
            let mut coords = session.coordinates().to_vec();
            coords[f] = session.curve_grid()[3];
            assert_close(
                session.curve(f, r)[3],
                session.network().unit(r).evaluate(&coords),
                &format!("primed curve {} unit {}", f, r),
            );
        }
    }
}

#[test]
fn scenario_three_features_half_slide() {
    // 3 features, hidden width 2, identity-ish first layer. Setting the
    // first feature to the middle of its [0, 10] range drives hidden unit 0
    // to tanh(0.5) while the others stay at tanh(0).
    let features = FeatureSet::new(vec![
        Feature::new("a", "A", 0.0, 10.0).unwrap(),
        Feature::new("b", "B", 0.0, 1.0).unwrap(),
        Feature::new("c", "C", 0.0, 1.0).unwrap(),
    ])
    .unwrap();
    let scenario_unit = || {
        unit(
            vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![0.5, 0.5]],
            vec![0.0, 0.0],
            vec![1.0, 1.0],
            0.0,
        )
    };
    let network = Network::new(vec![scenario_unit(), scenario_unit()]).unwrap();
    let mut config = EngineConfig::default();
    config.curve.samples = 2; // grid is exactly [0.0, 1.0]
    let mut session =
        SessionState::new(features, network, labels(), &[0.0, 0.0, 0.0], &config).unwrap();

    session.set_feature_value(0, 5.0);
    recompute_readouts(&mut session);
    recompute_curves(&mut session, Some(0));

    let expected_readout = 0.5f64.tanh();
    assert_close(session.readout(0), expected_readout, "readout");
    assert!((session.readout(0) - 0.4621).abs() < 1e-3);

    let curve_b = session.curve(1, 0);
    assert_eq!(curve_b.len(), 2);
    assert_close(curve_b[0], 0.5f64.tanh(), "curve B at x=0");
    assert_close(curve_b[1], 0.5f64.tanh() + 1.0f64.tanh(), "curve B at x=1");
    assert!((curve_b[1] - 1.2237).abs() < 1e-3);
}

// --- Surface ---

#[test_log::test]
fn surface_heights_match_direct_evaluation_on_every_mesh_point() {
    let mut session = mixed_session(8);
    session.set_feature_value(2, 0.6);
    session.set_feature_value(3, 0.15);
    recompute_surface(&mut session);

    let sheet = session.surface();
    for r in 0..OUTPUT_UNITS {
        for k in 0..sheet.len() {
            assert_close(
                sheet.heights(r)[k],
                direct_surface_value(&session, r, k),
                &format!("surface unit {} mesh point {}", r, k),
            );
        }
    }
}

#[test]
fn coincident_axes_exclude_once_and_keep_both_sweep_terms() {
    // Both axes on feature 0 (hidden weight 1.0): fixed set is feature 1
    // alone, and each mesh point contributes through both the wx and wy
    // terms, giving tanh(partial + wx + wy).
    let features = unit_features(&["x", "other"]);
    let coincident_unit = || unit(vec![vec![1.0], vec![2.0]], vec![0.0], vec![1.0], 0.0);
    let network = Network::new(vec![coincident_unit(), coincident_unit()]).unwrap();
    let mut config = EngineConfig::default();
    config.surface.columns = 3;
    config.surface.rows = 3;
    config.surface.axis_x = Some("x".to_string());
    config.surface.axis_y = Some("x".to_string());
    let mut session =
        SessionState::new(features, network, labels(), &[0.0, 0.3], &config).unwrap();
    assert_eq!(session.surface_axes(), (0, 0));

    recompute_surface(&mut session);
    let sheet = session.surface();
    for k in 0..sheet.len() {
        let expected = (2.0 * 0.3 + sheet.mesh_x()[k] + sheet.mesh_y()[k]).tanh();
        assert_close(sheet.heights(0)[k], expected, &format!("mesh point {}", k));
    }

    // The excluded feature's own coordinate must not leak into the sheet.
    let before: Vec<f64> = session.surface().heights(0).to_vec();
    session.set_feature_value(0, 0.9);
    recompute_surface(&mut session);
    assert_eq!(
        session.surface().heights(0),
        before.as_slice(),
        "axis feature's coordinate is swept, never read from the point"
    );
}

#[test]
fn buffers_keep_their_grid_lengths_across_events() {
    let mut session = mixed_session(8);
    session.prime();
    for (index, raw) in [(0, 0.2), (3, 0.9), (1, 0.55)] {
        session.set_feature_value(index, raw);
        recompute_readouts(&mut session);
        recompute_curves(&mut session, Some(index));
        recompute_surface(&mut session);
        for f in 0..session.features().len() {
            for r in 0..OUTPUT_UNITS {
                assert_eq!(session.curve(f, r).len(), 8, "curve {} {}", f, r);
            }
        }
        assert_eq!(session.surface().heights(0).len(), 20);
        assert_eq!(session.surface().heights(1).len(), 20);
    }
}
