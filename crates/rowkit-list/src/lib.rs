#![forbid(unsafe_code)]

//! List layer: reorderable, swipe-to-act list interaction core.
//!
//! # Role in rowkit
//! `rowkit-list` owns the domain side of the interaction: items and their
//! ordered sequence, the per-item swipe-reveal and drag state machines, the
//! live reorder engine, the serialized persistence coordinator, and the
//! orchestrator that composes them over one list.
//!
//! # Primary responsibilities
//! - **OrderedSequence**: the single in-memory order, id-unique at all
//!   times.
//! - **SwipeReveal / DragController**: per-item gesture state machines
//!   emitting motion targets.
//! - **ReorderEngine**: fixed-height slot math and live mutation.
//! - **PersistenceCoordinator**: one commit in flight, supersedable queue,
//!   rollback on failure.
//! - **ListOrchestrator**: session ownership, gesture routing, selection
//!   mode, reconciliation.
//!
//! # How it fits in the system
//! The embedding UI feeds classified
//! [`TrackEvent`](rowkit_core::pointer::TrackEvent)s (from
//! `rowkit-core`) into the orchestrator per item, executes the returned
//! [`ListEvent`](orchestrator::ListEvent)s (callbacks, sink calls,
//! re-renders), and interpolates each item toward the transform the
//! orchestrator exposes.

pub mod drag;
pub mod error;
pub mod item;
pub mod orchestrator;
pub mod persist;
pub mod reorder;
pub mod swipe;

pub use drag::{DragActivation, DragController, DragPhase, DragSession};
pub use error::{CommitError, ListError};
pub use item::{Item, ItemId, OrderEntry, OrderSource, OrderedSequence};
pub use orchestrator::{ListConfig, ListEvent, ListOrchestrator};
pub use persist::{
    CommitDispatch, CommitOutcome, CommitTicket, PersistenceCoordinator, PersistenceSink,
    Resolution,
};
pub use reorder::{ReorderEngine, SlotShift};
pub use swipe::{SwipeConfig, SwipePhase, SwipeResolution, SwipeReveal, TapOutcome};
