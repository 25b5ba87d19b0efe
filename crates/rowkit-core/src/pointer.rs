#![forbid(unsafe_code)]

//! Raw pointer samples and the normalized track-event stream.
//!
//! [`PointerEvent`] is what the embedding platform feeds in: an absolute
//! page-coordinate sample with a contact phase and a timestamp.
//! [`TrackEvent`] is what the tracker emits: deltas relative to the contact
//! origin, a rolling velocity estimate, and the latched [`Axis`]
//! classification. Consumers never see raw coordinates after the start
//! event; everything downstream works in relative terms.
//!
//! # Invariants
//!
//! 1. Every contact is well-formed: `Started` → zero or more `Moved` →
//!    `Ended` or `Cancelled`.
//! 2. `Moved` and `Ended` carry the same axis value once classification has
//!    latched; the axis never changes mid-contact.
//! 3. Velocity components are finite (0.0 until two samples exist).

use web_time::{Duration, Instant};

// ---------------------------------------------------------------------------
// PointerPhase / PointerEvent
// ---------------------------------------------------------------------------

/// Contact phase of a raw pointer sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    /// Contact began (finger down, mouse button pressed).
    Down,
    /// Contact moved while held.
    Move,
    /// Contact lifted normally.
    Up,
    /// Contact terminated by the platform (gesture stolen, app backgrounded).
    Cancel,
}

/// A raw pointer sample in page coordinates (pixels).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub phase: PointerPhase,
    pub x: f32,
    pub y: f32,
    /// When the platform observed the sample.
    pub at: Instant,
}

impl PointerEvent {
    /// Create a sample with the given phase.
    #[must_use]
    pub const fn new(phase: PointerPhase, x: f32, y: f32, at: Instant) -> Self {
        Self { phase, x, y, at }
    }

    /// Contact-began sample.
    #[must_use]
    pub const fn down(x: f32, y: f32, at: Instant) -> Self {
        Self::new(PointerPhase::Down, x, y, at)
    }

    /// Contact-moved sample.
    #[must_use]
    pub const fn moved(x: f32, y: f32, at: Instant) -> Self {
        Self::new(PointerPhase::Move, x, y, at)
    }

    /// Contact-lifted sample.
    #[must_use]
    pub const fn up(x: f32, y: f32, at: Instant) -> Self {
        Self::new(PointerPhase::Up, x, y, at)
    }

    /// Platform-terminated sample.
    #[must_use]
    pub const fn cancel(x: f32, y: f32, at: Instant) -> Self {
        Self::new(PointerPhase::Cancel, x, y, at)
    }
}

// ---------------------------------------------------------------------------
// Axis
// ---------------------------------------------------------------------------

/// Dominant gesture axis, latched for the duration of a contact.
///
/// Classification uses asymmetric thresholds (see
/// [`TrackerConfig`](crate::tracker::TrackerConfig)): a horizontal intent
/// must be both steeper and longer than a vertical one before it preempts
/// vertical handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    /// Returns true for [`Axis::Horizontal`].
    #[must_use]
    pub const fn is_horizontal(self) -> bool {
        matches!(self, Self::Horizontal)
    }

    /// Returns true for [`Axis::Vertical`].
    #[must_use]
    pub const fn is_vertical(self) -> bool {
        matches!(self, Self::Vertical)
    }
}

// ---------------------------------------------------------------------------
// TrackEvent
// ---------------------------------------------------------------------------

/// Normalized events emitted by the gesture tracker.
///
/// Deltas are relative to the contact origin; velocities are px/ms from a
/// rolling window of recent samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrackEvent {
    /// A contact began at the given absolute position.
    Started { x: f32, y: f32 },

    /// The contact moved.
    Moved {
        dx: f32,
        dy: f32,
        vx: f32,
        vy: f32,
        /// Latched classification; `None` while below both thresholds.
        axis: Option<Axis>,
    },

    /// The contact has been held near its origin past the hold threshold.
    /// Fires at most once per contact, and only before classification.
    Held { x: f32, y: f32, held_for: Duration },

    /// The contact lifted normally, with final deltas and velocity.
    Ended {
        dx: f32,
        dy: f32,
        vx: f32,
        vy: f32,
        axis: Option<Axis>,
    },

    /// The platform terminated the contact. Consumers must unwind as if the
    /// gesture never resolved (a terminated swipe never leaves an item
    /// revealed).
    Cancelled { axis: Option<Axis> },
}

impl TrackEvent {
    /// The latched axis carried by this event, if any.
    #[must_use]
    pub const fn axis(&self) -> Option<Axis> {
        match self {
            Self::Moved { axis, .. } | Self::Ended { axis, .. } | Self::Cancelled { axis } => *axis,
            Self::Started { .. } | Self::Held { .. } => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_predicates() {
        assert!(Axis::Horizontal.is_horizontal());
        assert!(!Axis::Horizontal.is_vertical());
        assert!(Axis::Vertical.is_vertical());
        assert!(!Axis::Vertical.is_horizontal());
    }

    #[test]
    fn phase_constructors() {
        let t = Instant::now();
        assert_eq!(PointerEvent::down(1.0, 2.0, t).phase, PointerPhase::Down);
        assert_eq!(PointerEvent::moved(1.0, 2.0, t).phase, PointerPhase::Move);
        assert_eq!(PointerEvent::up(1.0, 2.0, t).phase, PointerPhase::Up);
        assert_eq!(PointerEvent::cancel(1.0, 2.0, t).phase, PointerPhase::Cancel);
    }

    #[test]
    fn track_event_axis_accessor() {
        let moved = TrackEvent::Moved {
            dx: 1.0,
            dy: 0.0,
            vx: 0.0,
            vy: 0.0,
            axis: Some(Axis::Horizontal),
        };
        assert_eq!(moved.axis(), Some(Axis::Horizontal));

        let started = TrackEvent::Started { x: 0.0, y: 0.0 };
        assert_eq!(started.axis(), None);

        let cancelled = TrackEvent::Cancelled {
            axis: Some(Axis::Vertical),
        };
        assert_eq!(cancelled.axis(), Some(Axis::Vertical));
    }
}
