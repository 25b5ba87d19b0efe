#![forbid(unsafe_code)]

//! Gesture tracking: transforms raw pointer samples into normalized events.
//!
//! [`GestureTracker`] is a stateful processor that converts raw
//! [`PointerEvent`] sequences into [`TrackEvent`]s carrying deltas relative
//! to the contact origin, a rolling velocity estimate, and a latched
//! [`Axis`] classification.
//!
//! # Classification
//!
//! A contact is classified **horizontal** when `|dx| > |dy| * ratio` and
//! `|dx| > horizontal_min`; otherwise it becomes **vertical** once
//! `|dy| > vertical_min`. The thresholds are asymmetric: a horizontal
//! intent needs both a steeper angle and a larger displacement before it
//! preempts vertical handling (which usually competes with list scroll).
//! Once latched, the classification never changes for the remainder of the
//! contact — a horizontal swipe cannot flip into a vertical drag mid-way,
//! and vice versa.
//!
//! # Invariants
//!
//! 1. Every contact is well-formed: `Started` → `Moved`* → `Ended` or
//!    `Cancelled`.
//! 2. The axis carried by `Moved`/`Ended`/`Cancelled` is monotone: once
//!    `Some(_)`, it keeps the same value until the contact ends.
//! 3. `Held` fires at most once per contact, and never after the contact
//!    has been classified or drifted beyond the hold tolerance.
//! 4. After [`reset`](GestureTracker::reset), the tracker is idle.
//!
//! # Failure Modes
//!
//! - A `Move`/`Up` sample with no prior `Down` opens a contact silently
//!   (no `Started` is emitted for `Move`; `Up` is dropped). Platforms
//!   occasionally deliver orphaned samples after focus churn.
//! - Two samples with the same timestamp contribute no velocity; the
//!   estimate falls back to 0.0 rather than dividing by zero.

use std::collections::VecDeque;

use web_time::{Duration, Instant};

use crate::pointer::{Axis, PointerEvent, PointerPhase, TrackEvent};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Thresholds and windows for gesture tracking.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Axis-dominance ratio: horizontal requires `|dx| > |dy| * ratio`
    /// (default: 1.5).
    pub horizontal_ratio: f32,
    /// Minimum horizontal displacement (px) before a horizontal intent is
    /// recognized (default: 10.0).
    pub horizontal_min: f32,
    /// Minimum vertical displacement (px) before a vertical intent is
    /// recognized (default: 5.0).
    pub vertical_min: f32,
    /// Rolling window for the velocity estimate (default: 100ms).
    pub velocity_window: Duration,
    /// Duration before a stationary unclassified contact reports `Held`
    /// (default: 500ms).
    pub hold_threshold: Duration,
    /// Drift (px, per axis) a contact may accumulate and still count as
    /// stationary for hold detection (default: 4.0).
    pub hold_tolerance: f32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            horizontal_ratio: 1.5,
            horizontal_min: 10.0,
            vertical_min: 5.0,
            velocity_window: Duration::from_millis(100),
            hold_threshold: Duration::from_millis(500),
            hold_tolerance: 4.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Internal state
// ---------------------------------------------------------------------------

/// An in-progress contact.
#[derive(Debug, Clone)]
struct Contact {
    origin_x: f32,
    origin_y: f32,
    started_at: Instant,
    axis: Option<Axis>,
    /// Recent samples inside the velocity window, oldest first.
    samples: VecDeque<(Instant, f32, f32)>,
    hold_fired: bool,
    hold_broken: bool,
}

impl Contact {
    fn new(x: f32, y: f32, at: Instant) -> Self {
        let mut samples = VecDeque::with_capacity(8);
        samples.push_back((at, x, y));
        Self {
            origin_x: x,
            origin_y: y,
            started_at: at,
            axis: None,
            samples,
            hold_fired: false,
            hold_broken: false,
        }
    }

    /// Rolling velocity in px/ms over the retained window.
    fn velocity(&self) -> (f32, f32) {
        let (Some(&(t0, x0, y0)), Some(&(t1, x1, y1))) =
            (self.samples.front(), self.samples.back())
        else {
            return (0.0, 0.0);
        };
        let dt_ms = t1.duration_since(t0).as_secs_f32() * 1_000.0;
        if dt_ms <= f32::EPSILON {
            return (0.0, 0.0);
        }
        ((x1 - x0) / dt_ms, (y1 - y0) / dt_ms)
    }
}

// ---------------------------------------------------------------------------
// GestureTracker
// ---------------------------------------------------------------------------

/// Stateful tracker that normalizes pointer samples into track events.
///
/// Call [`process`](GestureTracker::process) for each incoming sample.
/// Call [`check_hold`](GestureTracker::check_hold) periodically (e.g., on
/// tick) if hold detection is wanted.
#[derive(Clone)]
pub struct GestureTracker {
    config: TrackerConfig,
    contact: Option<Contact>,
}

impl std::fmt::Debug for GestureTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GestureTracker")
            .field("active", &self.is_active())
            .field("axis", &self.axis())
            .finish()
    }
}

impl GestureTracker {
    /// Create a tracker with the given configuration.
    #[must_use]
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            config,
            contact: None,
        }
    }

    /// Process a raw sample, returning any normalized events produced.
    pub fn process(&mut self, event: &PointerEvent) -> Vec<TrackEvent> {
        let mut out = Vec::with_capacity(1);
        match event.phase {
            PointerPhase::Down => {
                self.contact = Some(Contact::new(event.x, event.y, event.at));
                out.push(TrackEvent::Started {
                    x: event.x,
                    y: event.y,
                });
            }
            PointerPhase::Move => self.on_move(event, &mut out),
            PointerPhase::Up => {
                if let Some(contact) = self.contact.take() {
                    let (dx, dy) = (event.x - contact.origin_x, event.y - contact.origin_y);
                    let (vx, vy) = contact.velocity();
                    out.push(TrackEvent::Ended {
                        dx,
                        dy,
                        vx,
                        vy,
                        axis: contact.axis,
                    });
                }
            }
            PointerPhase::Cancel => {
                if let Some(contact) = self.contact.take() {
                    out.push(TrackEvent::Cancelled { axis: contact.axis });
                }
            }
        }
        out
    }

    /// Check for hold timeout. Call periodically (e.g., on tick).
    ///
    /// Returns `Some(Held { .. })` once per contact when it has stayed
    /// near its origin, unclassified, beyond the configured threshold.
    pub fn check_hold(&mut self, now: Instant) -> Option<TrackEvent> {
        let contact = self.contact.as_mut()?;
        if contact.hold_fired || contact.hold_broken || contact.axis.is_some() {
            return None;
        }
        let held_for = now.duration_since(contact.started_at);
        if held_for >= self.config.hold_threshold {
            contact.hold_fired = true;
            return Some(TrackEvent::Held {
                x: contact.origin_x,
                y: contact.origin_y,
                held_for,
            });
        }
        None
    }

    /// Whether a contact is in progress.
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.contact.is_some()
    }

    /// The latched axis of the current contact, if classified.
    #[inline]
    #[must_use]
    pub fn axis(&self) -> Option<Axis> {
        self.contact.as_ref().and_then(|c| c.axis)
    }

    /// Reset to idle, discarding any in-progress contact.
    pub fn reset(&mut self) {
        self.contact = None;
    }

    /// Get a reference to the current configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Update the configuration. Applies to the next contact; the current
    /// contact keeps its latched classification.
    pub fn set_config(&mut self, config: TrackerConfig) {
        self.config = config;
    }
}

// ---------------------------------------------------------------------------
// Internal handlers
// ---------------------------------------------------------------------------

impl GestureTracker {
    fn on_move(&mut self, event: &PointerEvent, out: &mut Vec<TrackEvent>) {
        let config = self.config.clone();
        let contact = self
            .contact
            .get_or_insert_with(|| Contact::new(event.x, event.y, event.at));

        // Retain only samples inside the velocity window.
        contact.samples.push_back((event.at, event.x, event.y));
        while let Some(&(t, _, _)) = contact.samples.front() {
            if event.at.duration_since(t) > config.velocity_window && contact.samples.len() > 2 {
                contact.samples.pop_front();
            } else {
                break;
            }
        }

        let dx = event.x - contact.origin_x;
        let dy = event.y - contact.origin_y;

        if !contact.hold_broken
            && (dx.abs() > config.hold_tolerance || dy.abs() > config.hold_tolerance)
        {
            contact.hold_broken = true;
        }

        // Latch the classification. Horizontal is checked first and needs
        // both a steeper angle and a larger displacement; anything else that
        // clears the vertical minimum becomes vertical.
        if contact.axis.is_none() {
            if dx.abs() > dy.abs() * config.horizontal_ratio && dx.abs() > config.horizontal_min {
                contact.axis = Some(Axis::Horizontal);
            } else if dy.abs() > config.vertical_min {
                contact.axis = Some(Axis::Vertical);
            }
        }

        let (vx, vy) = contact.velocity();
        out.push(TrackEvent::Moved {
            dx,
            dy,
            vx,
            vy,
            axis: contact.axis,
        });
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
