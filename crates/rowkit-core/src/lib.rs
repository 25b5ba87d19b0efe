#![forbid(unsafe_code)]

//! Core: pointer samples, gesture tracking, and motion targets.
//!
//! # Role in rowkit
//! `rowkit-core` is the input layer. It owns the normalization of raw
//! pointer samples into classified track events, and the target-value types
//! the list-layer state machines emit for an animation layer to interpolate
//! toward.
//!
//! # Primary responsibilities
//! - **PointerEvent / TrackEvent**: raw samples in, normalized deltas +
//!   rolling velocity + latched axis out.
//! - **GestureTracker**: the stateful sample processor.
//! - **VisualTransform**: motion targets (translation, scale, opacity,
//!   elevation) decoupled from any animation driver.
//!
//! # How it fits in the system
//! The list layer (`rowkit-list`) consumes classified [`pointer::TrackEvent`]
//! values and drives per-item state machines. Nothing in this crate knows
//! about items, ordering, or persistence.

pub mod motion;
pub mod pointer;
pub mod tracker;

pub use motion::VisualTransform;
pub use pointer::{Axis, PointerEvent, PointerPhase, TrackEvent};
pub use tracker::{GestureTracker, TrackerConfig};
