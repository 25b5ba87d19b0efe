#![forbid(unsafe_code)]

//! Per-item drag controller and the drag-session record.
//!
//! The controller owns only the *visual* side of a drag: lifted/settling
//! phases and the translation target. Which slot the item occupies is the
//! reorder engine's business ([`crate::reorder`]); whether a drag may begin
//! at all is the orchestrator's ([`crate::orchestrator`]).
//!
//! # State Machine
//!
//! - `Idle` — resting in flow.
//! - `Lifted` — tracking the finger exactly (unclamped), scaled up,
//!   translucent, elevated above siblings.
//! - `Settling` — released, animating back to its resting transform;
//!   [`settled`](DragController::settled) completes the cycle.
//!
//! Termination behaves identically to release for visual settling; the
//! commit decision on termination is the orchestrator's policy, not the
//! controller's.

use web_time::Duration;

use rowkit_core::motion::VisualTransform;

// ---------------------------------------------------------------------------
// Activation policy
// ---------------------------------------------------------------------------

/// Where a vertical drag may originate on an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragActivation {
    /// Any point on the item starts a drag once the gesture classifies
    /// vertical.
    Anywhere,
    /// Only gestures originating on the designated handle region start a
    /// drag; elsewhere, vertical movement is left to the scroll container.
    Handle,
    /// The item must first be held stationary for the given duration; the
    /// following vertical movement drags.
    LongPress(Duration),
}

// ---------------------------------------------------------------------------
// DragSession
// ---------------------------------------------------------------------------

/// Transient record of a single active drag. At most one exists per list;
/// the orchestrator owns it exclusively.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    /// Slot the item occupied when the session opened.
    pub origin_index: usize,
    /// Slot the item currently occupies (re-based after each live move).
    pub dragged_index: usize,
    /// Slot marked for hover emphasis; `None` while the item is at its
    /// origin slot.
    pub hover_index: Option<usize>,
    /// Total vertical finger travel since drag start, px.
    pub vertical_offset: f32,
}

impl DragSession {
    /// Open a session for the item at `origin_index`.
    #[must_use]
    pub fn new(origin_index: usize) -> Self {
        Self {
            origin_index,
            dragged_index: origin_index,
            hover_index: None,
            vertical_offset: 0.0,
        }
    }

    /// Translation of the dragged item relative to the slot it currently
    /// occupies. The raw finger offset is relative to the *origin* slot;
    /// each live relocation of `item_height` px is subtracted out so the
    /// item stays under the finger.
    #[must_use]
    pub fn slot_offset(&self, item_height: f32) -> f32 {
        let slots_moved = self.dragged_index as f32 - self.origin_index as f32;
        self.vertical_offset - slots_moved * item_height
    }
}

// ---------------------------------------------------------------------------
// DragController
// ---------------------------------------------------------------------------

/// Phase of the drag controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragPhase {
    Idle,
    Lifted,
    Settling,
}

/// Per-item drag visual state.
#[derive(Debug, Clone)]
pub struct DragController {
    phase: DragPhase,
    offset: f32,
}

impl DragController {
    /// Create an idle controller.
    #[must_use]
    pub fn new() -> Self {
        Self {
            phase: DragPhase::Idle,
            offset: 0.0,
        }
    }

    /// Current phase.
    #[inline]
    #[must_use]
    pub fn phase(&self) -> DragPhase {
        self.phase
    }

    /// Current translation target, px.
    #[inline]
    #[must_use]
    pub fn offset(&self) -> f32 {
        self.offset
    }

    /// Lift the item out of flow. Idempotent while already lifted.
    pub fn lift(&mut self) {
        self.phase = DragPhase::Lifted;
        self.offset = 0.0;
    }

    /// Track the finger. The dragged item follows exactly; no clamping.
    pub fn drag_to(&mut self, offset: f32) {
        if self.phase == DragPhase::Lifted {
            self.offset = offset;
        }
    }

    /// Release: settle back toward the resting transform.
    pub fn release(&mut self) {
        if self.phase == DragPhase::Lifted {
            self.phase = DragPhase::Settling;
            self.offset = 0.0;
        }
    }

    /// Platform termination. Visually identical to [`release`](Self::release).
    pub fn terminate(&mut self) {
        self.release();
    }

    /// The animation layer reached the resting transform.
    pub fn settled(&mut self) {
        if self.phase == DragPhase::Settling {
            self.phase = DragPhase::Idle;
        }
    }

    /// Motion target for the item at its current phase.
    ///
    /// The `Lifted` offset passed here is the *slot-relative* translation
    /// (see [`DragSession::slot_offset`]); the controller's own raw offset
    /// is origin-relative and only meaningful to the reorder engine.
    #[must_use]
    pub fn transform(&self, slot_offset: f32) -> VisualTransform {
        match self.phase {
            DragPhase::Lifted => VisualTransform::lifted(slot_offset),
            DragPhase::Settling | DragPhase::Idle => VisualTransform::resting(),
        }
    }
}

impl Default for DragController {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
