#![forbid(unsafe_code)]

//! Per-item swipe-reveal state machine.
//!
//! A leftward horizontal swipe drags an action button into view behind the
//! item; release snaps open or closed depending on how far and how fast the
//! finger travelled. The controller is callback-free: every input returns a
//! typed outcome the orchestrator maps to caller callbacks, and the visual
//! state is exposed as motion targets an animation layer interpolates
//! toward.
//!
//! # State Machine
//!
//! - `Closed` — affordance hidden, offset 0.
//! - `Opening` — pointer down, offset tracking the finger in
//!   `[-button_width, 0]`.
//! - `Open` — resting revealed, offset = `-button_width`.
//! - `Closing` — target offset 0, awaiting the animation layer's
//!   [`settled`](SwipeReveal::settled) confirmation.
//!
//! # Invariants
//!
//! 1. The offset never leaves `[-button_width, 0]`.
//! 2. Reveal opacity is a monotonic function of `|offset| / button_width`.
//! 3. [`action_tap`](SwipeReveal::action_tap) reports the action at most
//!    once per tap, and never after the reveal has closed.
//! 4. Termination ([`terminate`](SwipeReveal::terminate)) always resolves
//!    toward `Closed` — a terminated gesture never leaves an item revealed.
//!
//! # Failure Modes
//!
//! - Inputs that make no sense in the current phase (e.g.
//!   [`drag_to`](SwipeReveal::drag_to) without a preceding
//!   [`begin`](SwipeReveal::begin)) are ignored rather than panicking;
//!   platforms deliver stray events after focus churn.

use rowkit_core::motion::{VisualTransform, reveal_opacity};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Geometry and snap thresholds for the reveal.
#[derive(Debug, Clone)]
pub struct SwipeConfig {
    /// Width of the revealed action button in px (default: 80.0).
    pub button_width: f32,
    /// Fraction of `button_width` past which a release opens (default: 0.5).
    pub reveal_threshold: f32,
    /// Velocity (px/ms) past which a flick opens regardless of distance
    /// (default: 0.5). An already-open item closes on half this velocity.
    pub velocity_threshold: f32,
}

impl Default for SwipeConfig {
    fn default() -> Self {
        Self {
            button_width: 80.0,
            reveal_threshold: 0.5,
            velocity_threshold: 0.5,
        }
    }
}

/// Minimum leftward travel (px) before a flick counts as an open intent.
const FLICK_MIN_TRAVEL: f32 = -20.0;

// ---------------------------------------------------------------------------
// Phases and outcomes
// ---------------------------------------------------------------------------

/// Phase of the reveal state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipePhase {
    Closed,
    Opening,
    Open,
    Closing,
}

/// How a release resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeResolution {
    Open,
    Closed,
}

/// What a tap on the item body means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapOutcome {
    /// The tap dismissed an open reveal; the normal press callback must
    /// *not* fire for this tap.
    Dismissed,
    /// The normal item-press callback fires.
    Press,
}

// ---------------------------------------------------------------------------
// SwipeReveal
// ---------------------------------------------------------------------------

/// Per-item swipe-reveal controller.
///
/// Created lazily on first interaction and kept across renders. The
/// orchestrator gates [`begin`](Self::begin) on selection mode and drag
/// ownership; the controller itself only knows about offsets and phases.
#[derive(Debug, Clone)]
pub struct SwipeReveal {
    config: SwipeConfig,
    phase: SwipePhase,
    /// Current target offset; always within `[-button_width, 0]`.
    offset: f32,
    /// Offset at gesture begin; finger deltas apply on top of this.
    anchor: f32,
    /// Whether the item was resting open when the gesture began
    /// (hysteresis input for release resolution).
    was_open: bool,
}

impl SwipeReveal {
    /// Create a closed controller.
    #[must_use]
    pub fn new(config: SwipeConfig) -> Self {
        Self {
            config,
            phase: SwipePhase::Closed,
            offset: 0.0,
            anchor: 0.0,
            was_open: false,
        }
    }

    /// Current phase.
    #[inline]
    #[must_use]
    pub fn phase(&self) -> SwipePhase {
        self.phase
    }

    /// Current target offset in px, within `[-button_width, 0]`.
    #[inline]
    #[must_use]
    pub fn offset(&self) -> f32 {
        self.offset
    }

    /// Whether the item rests revealed.
    #[inline]
    #[must_use]
    pub fn is_revealed(&self) -> bool {
        matches!(self.phase, SwipePhase::Open | SwipePhase::Opening)
    }

    /// Reveal opacity of the action affordance: 0.0 hidden, 1.0 fully
    /// revealed.
    #[must_use]
    pub fn opacity(&self) -> f32 {
        reveal_opacity(self.offset, self.config.button_width)
    }

    /// Motion target for the item body.
    #[must_use]
    pub fn transform(&self) -> VisualTransform {
        VisualTransform::revealed(self.offset)
    }

    /// A horizontal gesture started on this item.
    ///
    /// Valid from any phase: re-grabbing an open (or mid-animation) item
    /// continues from its current offset.
    pub fn begin(&mut self) {
        self.was_open = self.phase == SwipePhase::Open;
        self.anchor = self.offset;
        self.phase = SwipePhase::Opening;
    }

    /// The gesture moved `dx` px from its start. Ignored unless a gesture
    /// is in progress.
    pub fn drag_to(&mut self, dx: f32) {
        if self.phase != SwipePhase::Opening {
            return;
        }
        self.offset = (self.anchor + dx).clamp(-self.config.button_width, 0.0);
    }

    /// The gesture released with horizontal velocity `vx` (px/ms, leftward
    /// negative). Resolves open or closed.
    pub fn release(&mut self, vx: f32) -> SwipeResolution {
        if self.phase != SwipePhase::Opening {
            return self.resolution();
        }

        let open_distance = -self.config.button_width * self.config.reveal_threshold;
        let should_open = self.offset < open_distance
            || (vx < -self.config.velocity_threshold && self.offset < FLICK_MIN_TRAVEL);
        // Hysteresis: an already-open item closes on half the velocity a
        // closed item needs to open.
        let should_close = if self.was_open {
            vx > self.config.velocity_threshold / 2.0 || self.offset > open_distance
        } else {
            !should_open
        };

        if should_open && !should_close {
            self.phase = SwipePhase::Open;
            self.offset = -self.config.button_width;
            SwipeResolution::Open
        } else {
            self.close();
            SwipeResolution::Closed
        }
    }

    /// The platform terminated the gesture. Always resolves toward closed.
    pub fn terminate(&mut self) {
        if self.phase != SwipePhase::Closed {
            self.close();
        }
    }

    /// The revealed action button was tapped. Returns whether the action
    /// callback fires (at most once per tap); the close animation and the
    /// callback are concurrent — the callback must not wait for
    /// [`settled`](Self::settled).
    pub fn action_tap(&mut self) -> bool {
        match self.phase {
            SwipePhase::Open | SwipePhase::Opening => {
                self.close();
                true
            }
            SwipePhase::Closed | SwipePhase::Closing => false,
        }
    }

    /// The item body was tapped. An open item dismisses (swallowing the
    /// press); a closed one presses normally.
    pub fn body_tap(&mut self) -> TapOutcome {
        match self.phase {
            SwipePhase::Open | SwipePhase::Opening => {
                self.close();
                TapOutcome::Dismissed
            }
            SwipePhase::Closed | SwipePhase::Closing => TapOutcome::Press,
        }
    }

    /// Force the reveal closed with no callback (selection mode turned on,
    /// or the item joined a drag session).
    pub fn force_close(&mut self) {
        if self.phase != SwipePhase::Closed {
            self.close();
        }
    }

    /// The animation layer reports it reached the current target.
    pub fn settled(&mut self) {
        if self.phase == SwipePhase::Closing {
            self.phase = SwipePhase::Closed;
        }
    }

    fn close(&mut self) {
        self.offset = 0.0;
        self.anchor = 0.0;
        self.was_open = false;
        self.phase = if self.phase == SwipePhase::Closed {
            SwipePhase::Closed
        } else {
            SwipePhase::Closing
        };
    }

    fn resolution(&self) -> SwipeResolution {
        if self.phase == SwipePhase::Open {
            SwipeResolution::Open
        } else {
            SwipeResolution::Closed
        }
    }
}

impl Default for SwipeReveal {
    fn default() -> Self {
        Self::new(SwipeConfig::default())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
