// src/recompute/mod.rs

//! The recomputation passes.
//!
//! Three passes, all reading the coordinate snapshot in `SessionState` and
//! replacing output buffers wholesale: the direct current-point readouts,
//! the per-feature profile curves, and the two-axis response surface. The
//! curve and surface passes share the partial-sum factorization in
//! [`partial`]: the sweep-invariant contribution of every fixed feature is
//! computed once per sweep instead of once per sample.

mod curve;
mod partial;
mod surface;

pub(crate) use curve::{recompute_curves, recompute_readouts};
pub(crate) use surface::recompute_surface;

#[cfg(test)]
mod tests;
