// src/lib.rs

//! Live profile and response-surface recomputation for a trained two-output
//! perceptron (one hidden tanh layer per output unit).
//!
//! A session holds a normalized point — one slider position per input
//! feature — and three kinds of derived output: scalar readouts of both
//! network outputs at that point, a profile curve per feature (the output
//! traced over that feature's full range with the others held fixed), and a
//! response surface over two designated axis features. Moving one slider
//! re-derives all of it live.
//!
//! The sweeps share one optimization: a hidden unit's pre-activation is a
//! plain sum over features, so the features held fixed during a sweep
//! contribute a constant that is computed once per sweep instead of once
//! per sample. Two deliberate skips fall out of the interaction model: the
//! moved feature's own curve is never regenerated (its shape does not
//! change under its own slide), and the surface is left untouched when the
//! moved feature is one of its axes.
//!
//! Hosts load a session from JSON via [`loader`], wrap it in an
//! [`Orchestrator`], and feed it [`SliderEvent`]s; each event runs
//! synchronously to completion and reports the rewritten buffer groups.

pub mod config;
pub mod feature;
pub mod loader;
pub mod network;
pub mod notify;
pub mod orchestrator;
mod recompute;
pub mod session;

pub use config::{CurveGridConfig, EngineConfig, SurfaceGridConfig};
pub use feature::{Feature, FeatureSet};
pub use loader::{
    load_engine_config, load_feature_table, load_network, load_session, FeatureTable,
};
pub use network::{Network, OutputUnit, OUTPUT_UNITS};
pub use notify::{BufferGroup, ChangeListener, ChangedBuffers};
pub use orchestrator::{EnginePhase, Orchestrator, SliderEvent};
pub use session::{SessionState, SurfaceSheet};
