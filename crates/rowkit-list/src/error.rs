#![forbid(unsafe_code)]

//! rowkit error model.
//!
//! # Design Principles
//!
//! 1. **No error is fatal** — everything in this subsystem is either
//!    silently rejected (a gesture that may not begin) or recovered locally
//!    (rollback) and surfaced as a transient, retryable notice.
//! 2. **Domain-specific errors** — rejected operations ([`ListError`]) and
//!    sink failures ([`CommitError`]) are separate types so callers match
//!    on what matters.
//! 3. **Observability** — errors expose `error_type()` labels usable as
//!    tracing fields without the error types depending on tracing.

use std::fmt;

use crate::item::ItemId;

// ---------------------------------------------------------------------------
// ListError
// ---------------------------------------------------------------------------

/// An operation on the list was rejected.
///
/// Gesture-conflict variants are not user-visible: the gesture simply does
/// not begin. The caller may log them and move on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListError {
    /// A drag session is already active; at most one per list.
    SessionActive,
    /// No drag session is active.
    NoActiveSession,
    /// The referenced item is not in the sequence.
    UnknownItem(ItemId),
    /// Two items with the same identifier.
    DuplicateId(ItemId),
    /// Selection mode is on; drags and swipes may not begin.
    SelectionModeActive,
    /// A restore target does not match the ids currently present.
    OrderMismatch,
}

impl ListError {
    /// Whether this is a gesture conflict: silently ignored, the gesture
    /// does not begin.
    #[must_use]
    pub fn is_gesture_conflict(&self) -> bool {
        matches!(
            self,
            Self::SessionActive | Self::SelectionModeActive | Self::UnknownItem(_)
        )
    }

    /// Error type label for metrics and tracing.
    #[must_use]
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::SessionActive => "session_active",
            Self::NoActiveSession => "no_active_session",
            Self::UnknownItem(_) => "unknown_item",
            Self::DuplicateId(_) => "duplicate_id",
            Self::SelectionModeActive => "selection_mode_active",
            Self::OrderMismatch => "order_mismatch",
        }
    }
}

impl fmt::Display for ListError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SessionActive => write!(f, "a drag session is already active"),
            Self::NoActiveSession => write!(f, "no drag session is active"),
            Self::UnknownItem(id) => write!(f, "unknown item: {id}"),
            Self::DuplicateId(id) => write!(f, "duplicate item id: {id}"),
            Self::SelectionModeActive => write!(f, "selection mode is active"),
            Self::OrderMismatch => write!(f, "order does not match the current id set"),
        }
    }
}

impl std::error::Error for ListError {}

// ---------------------------------------------------------------------------
// CommitError
// ---------------------------------------------------------------------------

/// The persistence sink rejected a committed order.
///
/// Always recoverable: the coordinator rolls the visible order back and the
/// caller surfaces the failure as a transient notice. Retries are left to
/// explicit user action (re-dragging); the coordinator never retries on its
/// own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitError {
    /// Transport-level failure reaching the backend.
    Network(String),
    /// The backend rejected the payload.
    Validation(String),
    /// The caller is no longer authorized to write.
    Auth(String),
    /// The sink has shut down and accepts no further commits.
    Closed,
}

impl CommitError {
    /// Error type label for metrics and tracing.
    #[must_use]
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Network(_) => "network",
            Self::Validation(_) => "validation",
            Self::Auth(_) => "auth",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for CommitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network(msg) => write!(f, "network: {msg}"),
            Self::Validation(msg) => write!(f, "validation: {msg}"),
            Self::Auth(msg) => write!(f, "auth: {msg}"),
            Self::Closed => write!(f, "sink closed"),
        }
    }
}

impl std::error::Error for CommitError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
