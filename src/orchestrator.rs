// src/orchestrator.rs
//! Orchestrates one interactive session: receives slider events, updates the
//! normalized point, runs the recompute passes to completion, and dispatches
//! change notifications to registered listeners. This module encapsulates
//! the event processing logic so hosts never touch the passes directly.

use anyhow::Result;

use crate::notify::{BufferGroup, ChangeListener, ChangedBuffers};
use crate::recompute;
use crate::session::SessionState;

/// A slider change raised by the host UI: which feature moved, and its new
/// value in the feature's native (unnormalized) units.
#[derive(Debug, Clone, PartialEq)]
pub struct SliderEvent {
    pub feature: String,
    pub raw_value: f64,
}

impl SliderEvent {
    pub fn new(feature: impl Into<String>, raw_value: f64) -> Self {
        SliderEvent {
            feature: feature.into(),
            raw_value,
        }
    }
}

/// Where the orchestrator is in its event cycle.
///
/// `Recomputing` covers the whole span from point update through
/// notification dispatch; the transition back to `Idle` happens only after
/// the last listener call returns.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum EnginePhase {
    /// No event in flight.
    Idle,
    /// Processing one event to completion.
    Recomputing,
}

/// Owns the session state and drives it through event cycles.
///
/// Everything is synchronous and run-to-completion: one call to
/// [`on_slider_event`](Self::on_slider_event) performs the point update,
/// all recompute passes, and notification dispatch before returning.
/// Re-entrant event delivery from inside a listener cannot compile, since
/// listeners only ever see `&SessionState`. Hosts with an asynchronous
/// event source feed [`queue_event`](Self::queue_event) instead and drain
/// with [`run_pending`](Self::run_pending).
pub struct Orchestrator {
    session: SessionState,
    listeners: Vec<Box<dyn ChangeListener>>,
    phase: EnginePhase,
    pending: Option<SliderEvent>,
}

impl Orchestrator {
    /// Wraps a session and primes every output buffer from its initial
    /// point, so the state is renderable before the first event arrives.
    pub fn new(mut session: SessionState) -> Self {
        session.prime();
        log::info!(
            "Orchestrator: session ready ({} features, {} curve samples, {} surface points)",
            session.features().len(),
            session.curve_grid().len(),
            session.surface().len()
        );
        Orchestrator {
            session,
            listeners: Vec::new(),
            phase: EnginePhase::Idle,
            pending: None,
        }
    }

    /// Registers a listener for buffer-group change notifications.
    pub fn add_listener(&mut self, listener: Box<dyn ChangeListener>) {
        self.listeners.push(listener);
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn phase(&self) -> EnginePhase {
        self.phase
    }

    /// Processes one slider event to completion and reports which buffer
    /// groups were rewritten.
    ///
    /// An unknown feature name fails before anything is mutated, so no
    /// notification is dispatched for a rejected event.
    pub fn on_slider_event(&mut self, event: &SliderEvent) -> Result<ChangedBuffers> {
        let moved = self.session.features().resolve(&event.feature)?;
        self.phase = EnginePhase::Recomputing;
        log::debug!(
            "Orchestrator: feature '{}' ({}) moved to {}",
            event.feature,
            moved,
            event.raw_value
        );

        self.session.set_feature_value(moved, event.raw_value);
        recompute::recompute_readouts(&mut self.session);
        recompute::recompute_curves(&mut self.session, Some(moved));

        let mut changed = ChangedBuffers::READOUT;
        if self.session.features().len() > 1 {
            changed |= ChangedBuffers::CURVES;
        }

        let (axis_x, axis_y) = self.session.surface_axes();
        if moved == axis_x || moved == axis_y {
            // The surface's shape over its own axes does not change when one
            // of those axes slides, so its buffers stay as they are and its
            // flag stays clear.
            log::debug!(
                "Orchestrator: surface untouched, feature {} is a surface axis",
                moved
            );
        } else {
            recompute::recompute_surface(&mut self.session);
            changed |= ChangedBuffers::SURFACE;
        }

        self.notify(changed);
        self.phase = EnginePhase::Idle;
        log::debug!("Orchestrator: event complete, changed {:?}", changed);
        Ok(changed)
    }

    /// Stores an event for later processing, replacing any event already
    /// waiting. Asynchronous hosts use this to coalesce bursts: only the
    /// latest position of a dragged slider matters.
    pub fn queue_event(&mut self, event: SliderEvent) {
        if let Some(stale) = self.pending.replace(event) {
            log::trace!(
                "Orchestrator: dropped stale pending event for '{}'",
                stale.feature
            );
        }
    }

    /// Processes the pending event, if any.
    pub fn run_pending(&mut self) -> Result<Option<ChangedBuffers>> {
        match self.pending.take() {
            Some(event) => self.on_slider_event(&event).map(Some),
            None => Ok(None),
        }
    }

    /// One listener call per rewritten group, in fixed group order, after
    /// every buffer in the group is complete.
    fn notify(&mut self, changed: ChangedBuffers) {
        for group in BufferGroup::ALL {
            if !changed.contains(group.flag()) {
                continue;
            }
            for listener in &mut self.listeners {
                listener.buffers_changed(group, &self.session);
            }
        }
    }
}
