// src/notify.rs

//! Change notification types for the recomputation engine.
//!
//! After an event is processed, hosts learn which buffer groups were
//! rewritten through a [`ChangedBuffers`] set and, if they registered a
//! listener, through one [`ChangeListener`] call per rewritten group.
//! A group that was not touched for an event (the surface on an axis move,
//! the curves in a single-feature session) is absent from the set and gets
//! no call, so a renderer can redraw exactly what changed.

use bitflags::bitflags;

use crate::session::SessionState;

bitflags! {
    /// The set of buffer groups rewritten by one engine pass.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ChangedBuffers: u8 {
        /// The per-output-unit current-point readouts.
        const READOUT = 1 << 0;
        /// The per-feature profile curves.
        const CURVES = 1 << 1;
        /// The two-axis response surface.
        const SURFACE = 1 << 2;
    }
}

/// One notifiable buffer group.
///
/// Dispatch order is fixed: readout, then curves, then surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferGroup {
    Readout,
    Curves,
    Surface,
}

impl BufferGroup {
    /// All groups, in dispatch order.
    pub const ALL: [BufferGroup; 3] = [
        BufferGroup::Readout,
        BufferGroup::Curves,
        BufferGroup::Surface,
    ];

    /// The flag bit representing this group in a [`ChangedBuffers`] set.
    pub fn flag(self) -> ChangedBuffers {
        match self {
            BufferGroup::Readout => ChangedBuffers::READOUT,
            BufferGroup::Curves => ChangedBuffers::CURVES,
            BufferGroup::Surface => ChangedBuffers::SURFACE,
        }
    }
}

/// Receiver for buffer-group change notifications.
///
/// The listener borrows the session immutably, so feeding another event into
/// the engine from inside a callback does not compile; recomputation cannot
/// re-enter itself through this seam.
pub trait ChangeListener {
    /// Called once per rewritten group, after every buffer in that group has
    /// been fully replaced.
    fn buffers_changed(&mut self, group: BufferGroup, session: &SessionState);
}
