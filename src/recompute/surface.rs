// src/recompute/surface.rs

//! Response-surface regeneration over the two designated axis features.

use log::trace;

use super::partial::{partial_sums, Exclusion};
use crate::network::OUTPUT_UNITS;
use crate::session::SessionState;

/// Rewrites both surface height sequences at the current coordinates.
///
/// Both axes sweep at once, so the fixed set excludes them both (once, if
/// they coincide) and each mesh point adds the two axis terms on top of the
/// partial sums. The caller decides *whether* an event needs this pass —
/// it does not when the moved feature is itself an axis.
pub(crate) fn recompute_surface(session: &mut SessionState) {
    let (ax, ay) = session.surface_axes();
    let excluded = Exclusion::axes(ax, ay);
    for r in 0..OUTPUT_UNITS {
        let values = {
            let unit = session.network().unit(r);
            let partials = partial_sums(unit, session.coordinates(), excluded);
            let wx_weights = unit.input_weights(ax);
            let wy_weights = unit.input_weights(ay);
            let sheet = session.surface();
            let mut out = Vec::with_capacity(sheet.len());
            for (&wx, &wy) in sheet.mesh_x().iter().zip(sheet.mesh_y()) {
                let mut acc = unit.output_bias();
                for (j, (&partial, &w_out)) in
                    partials.iter().zip(unit.output_weights()).enumerate()
                {
                    acc += (partial + wx_weights[j] * wx + wy_weights[j] * wy).tanh() * w_out;
                }
                out.push(acc);
            }
            out
        };
        session.replace_surface_heights(r, values);
        trace!("Surface: regenerated unit {} heights", r);
    }
}
