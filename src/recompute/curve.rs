// src/recompute/curve.rs

//! Profile-curve regeneration and the current-point readouts.

use log::trace;

use super::partial::{partial_sums, Exclusion};
use crate::network::{OutputUnit, OUTPUT_UNITS};
use crate::session::SessionState;

/// Sweeps one output unit along a grid, adding the swept feature's own
/// hidden-layer contribution on top of the fixed-set partial sums at each
/// sample.
fn sweep(unit: &OutputUnit, partials: &[f64], axis_weights: &[f64], grid: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(grid.len());
    for &x in grid {
        let mut acc = unit.output_bias();
        for ((&partial, &w_axis), &w_out) in partials
            .iter()
            .zip(axis_weights)
            .zip(unit.output_weights())
        {
            acc += (partial + w_axis * x).tanh() * w_out;
        }
        out.push(acc);
    }
    out
}

/// Recomputes both scalar readouts by direct evaluation of the network at
/// the current coordinates. This path runs once per output unit, so it
/// skips the factorization entirely.
pub(crate) fn recompute_readouts(session: &mut SessionState) {
    for r in 0..OUTPUT_UNITS {
        let value = session.network().unit(r).evaluate(session.coordinates());
        session.set_readout(r, value);
        trace!("Curves: readout {} = {:.6}", r, value);
    }
}

/// Regenerates the profile curve of every feature except `moved`; pass
/// `None` at priming time to regenerate all of them.
///
/// From any one curve's perspective the just-moved feature is fixed like
/// every other non-swept feature, so the only exclusion is the feature
/// being swept. The moved feature's own curve keeps its previous contents
/// deliberately: its shape does not change under its own slide, only its
/// point marker does.
pub(crate) fn recompute_curves(session: &mut SessionState, moved: Option<usize>) {
    for other in 0..session.features().len() {
        if moved == Some(other) {
            continue;
        }
        for r in 0..OUTPUT_UNITS {
            let values = {
                let unit = session.network().unit(r);
                let partials = partial_sums(unit, session.coordinates(), Exclusion::One(other));
                sweep(
                    unit,
                    &partials,
                    unit.input_weights(other),
                    session.curve_grid(),
                )
            };
            session.replace_curve(other, r, values);
        }
        trace!("Curves: regenerated feature {}", other);
    }
}
