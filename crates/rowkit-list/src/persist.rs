#![forbid(unsafe_code)]

//! Persistence coordinator: serialized, supersedable order commits.
//!
//! A drag session that ends with a changed order produces a pending commit:
//! the full `(id, position)` flattening of the sequence (never a diff — the
//! backend truth is a per-row display-order field with no relative-move
//! primitive). The coordinator is an explicit state machine with two
//! inputs — [`session_finished`](PersistenceCoordinator::session_finished)
//! and [`resolution`](PersistenceCoordinator::resolution) — and
//! effects-as-values outputs the orchestrator executes. There are no
//! timers and no debounce races.
//!
//! # Invariants
//!
//! 1. At most one commit is in flight; dispatches are serialized in
//!    session-completion order, never overlapping.
//! 2. A commit finishing while another is queued never rolls anything
//!    back: the newer commit owns the visible order (last-writer-wins on
//!    rollback targets).
//! 3. Queued commits are superseded, not accumulated: completing a third
//!    session while one commit is in flight and one queued replaces the
//!    queued one.
//! 4. Tickets increase monotonically; a resolution for anything but the
//!    in-flight ticket is ignored.
//!
//! # Failure Modes
//!
//! - A failed commit rolls the visible order back to the order at its
//!   session start and surfaces a recoverable error. Retries are never
//!   automatic; re-dragging is the retry.

use std::fmt;

use crate::error::CommitError;
use crate::item::{ItemId, OrderEntry};

// ---------------------------------------------------------------------------
// Tickets and the sink seam
// ---------------------------------------------------------------------------

/// Correlates a dispatched commit with its asynchronous resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "state-persistence",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct CommitTicket(u64);

impl fmt::Display for CommitTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "commit#{}", self.0)
    }
}

/// External collaborator that durably stores the item ordering.
///
/// `commit_order` is fire-and-forget from the single-threaded core's
/// perspective; the surrounding runtime delivers the result back through
/// [`ListOrchestrator::commit_resolved`](crate::orchestrator::ListOrchestrator::commit_resolved)
/// with the same ticket.
pub trait PersistenceSink {
    fn commit_order(&mut self, ticket: CommitTicket, order: &[OrderEntry]);
}

// ---------------------------------------------------------------------------
// Pending commits and effects
// ---------------------------------------------------------------------------

/// An order change accepted locally but not yet confirmed by the sink.
#[derive(Debug, Clone)]
struct PendingCommit {
    ticket: CommitTicket,
    /// Identifier sequence at session start — the rollback target.
    original: Vec<ItemId>,
    /// Flattened full-order payload.
    entries: Vec<OrderEntry>,
}

/// A commit ready to hand to the sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitDispatch {
    pub ticket: CommitTicket,
    pub entries: Vec<OrderEntry>,
}

/// How a sink resolution was absorbed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// The in-flight commit succeeded; its order is canonical.
    Committed,
    /// The in-flight commit failed and nothing newer exists: restore the
    /// visible order to `to` and surface the error.
    RolledBack { to: Vec<ItemId>, error: CommitError },
    /// The in-flight commit failed but a newer commit owns the visible
    /// order; surface the error, roll nothing back.
    SupersededFailure { error: CommitError },
    /// The ticket does not match the in-flight commit.
    Stale,
}

/// What a resolution asks the orchestrator to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub outcome: CommitOutcome,
    /// The next queued commit to dispatch, if the slot opened up.
    pub next: Option<CommitDispatch>,
}

// ---------------------------------------------------------------------------
// PersistenceCoordinator
// ---------------------------------------------------------------------------

/// Serialized commit queue with drift detection and rollback bookkeeping.
#[derive(Debug, Default)]
pub struct PersistenceCoordinator {
    next_ticket: u64,
    in_flight: Option<PendingCommit>,
    queued: Option<PendingCommit>,
}

impl PersistenceCoordinator {
    /// Create an idle coordinator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a commit is currently awaiting the sink.
    #[inline]
    #[must_use]
    pub fn has_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Whether a commit is queued behind the in-flight one.
    #[inline]
    #[must_use]
    pub fn has_queued(&self) -> bool {
        self.queued.is_some()
    }

    /// A drag session ended. `original` is the identifier sequence at
    /// session start; `entries` the full-order flattening of the sequence
    /// as released.
    ///
    /// Returns a dispatch when the sink should be invoked now; `None` when
    /// the order is unchanged (no-op) or the commit is queued behind an
    /// in-flight one.
    pub fn session_finished(
        &mut self,
        original: Vec<ItemId>,
        entries: Vec<OrderEntry>,
    ) -> Option<CommitDispatch> {
        let proposed_matches = entries.len() == original.len()
            && entries
                .iter()
                .zip(original.iter())
                .all(|(entry, id)| &entry.id == id);
        if proposed_matches {
            tracing::debug!(target: "rowkit.persist", "order unchanged, no commit");
            return None;
        }

        self.next_ticket += 1;
        let pending = PendingCommit {
            ticket: CommitTicket(self.next_ticket),
            original,
            entries,
        };

        if self.in_flight.is_none() {
            let dispatch = CommitDispatch {
                ticket: pending.ticket,
                entries: pending.entries.clone(),
            };
            tracing::debug!(
                target: "rowkit.persist",
                ticket = %pending.ticket,
                rows = pending.entries.len(),
                "dispatching commit"
            );
            self.in_flight = Some(pending);
            Some(dispatch)
        } else {
            if let Some(superseded) = self.queued.take() {
                tracing::debug!(
                    target: "rowkit.persist",
                    superseded = %superseded.ticket,
                    by = %pending.ticket,
                    "queued commit superseded"
                );
            }
            tracing::debug!(
                target: "rowkit.persist",
                ticket = %pending.ticket,
                "commit queued behind in-flight"
            );
            self.queued = Some(pending);
            None
        }
    }

    /// The sink resolved the commit identified by `ticket`.
    pub fn resolution(
        &mut self,
        ticket: CommitTicket,
        result: Result<(), CommitError>,
    ) -> Resolution {
        let Some(finished) = self.in_flight.take_if(|pending| pending.ticket == ticket) else {
            tracing::debug!(target: "rowkit.persist", ticket = %ticket, "stale resolution ignored");
            return Resolution {
                outcome: CommitOutcome::Stale,
                next: None,
            };
        };

        // Commits stay serialized: the queued commit dispatches only now
        // that the in-flight slot is free, regardless of outcome.
        let next = self.promote_queued();

        let outcome = match result {
            Ok(()) => {
                tracing::debug!(target: "rowkit.persist", ticket = %ticket, "commit confirmed");
                CommitOutcome::Committed
            }
            Err(error) => {
                if next.is_some() {
                    // A newer commit owns the visible order; the stale
                    // rollback target must not clobber it.
                    tracing::debug!(
                        target: "rowkit.persist",
                        ticket = %ticket,
                        error_type = error.error_type(),
                        "superseded commit failed, rollback skipped"
                    );
                    CommitOutcome::SupersededFailure { error }
                } else {
                    tracing::debug!(
                        target: "rowkit.persist",
                        ticket = %ticket,
                        error_type = error.error_type(),
                        "commit failed, rolling back"
                    );
                    CommitOutcome::RolledBack {
                        to: finished.original,
                        error,
                    }
                }
            }
        };

        Resolution { outcome, next }
    }

    fn promote_queued(&mut self) -> Option<CommitDispatch> {
        let pending = self.queued.take()?;
        let dispatch = CommitDispatch {
            ticket: pending.ticket,
            entries: pending.entries.clone(),
        };
        tracing::debug!(
            target: "rowkit.persist",
            ticket = %pending.ticket,
            "dispatching queued commit"
        );
        self.in_flight = Some(pending);
        Some(dispatch)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(ids: &[&str]) -> Vec<ItemId> {
        ids.iter().map(|id| (*id).into()).collect()
    }

    fn entries(ids: &[&str]) -> Vec<OrderEntry> {
        ids.iter()
            .enumerate()
            .map(|(position, id)| OrderEntry {
                id: (*id).into(),
                position,
            })
            .collect()
    }

    #[test]
    fn unchanged_order_is_noop() {
        let mut pc = PersistenceCoordinator::new();
        let dispatch = pc.session_finished(ids(&["a", "b"]), entries(&["a", "b"]));
        assert_eq!(dispatch, None);
        assert!(!pc.has_in_flight());
    }

    #[test]
    fn changed_order_dispatches_full_flattening() {
        let mut pc = PersistenceCoordinator::new();
        let dispatch = pc
            .session_finished(ids(&["a", "b", "c", "d"]), entries(&["a", "c", "d", "b"]))
            .expect("changed order must dispatch");

        assert_eq!(dispatch.entries.len(), 4);
        assert_eq!(dispatch.entries[0].id.as_str(), "a");
        assert_eq!(dispatch.entries[0].position, 0);
        assert_eq!(dispatch.entries[3].id.as_str(), "b");
        assert_eq!(dispatch.entries[3].position, 3);
        assert!(pc.has_in_flight());
    }

    #[test]
    fn success_discards_pending_commit() {
        let mut pc = PersistenceCoordinator::new();
        let dispatch = pc
            .session_finished(ids(&["a", "b"]), entries(&["b", "a"]))
            .unwrap();

        let res = pc.resolution(dispatch.ticket, Ok(()));
        assert_eq!(res.outcome, CommitOutcome::Committed);
        assert_eq!(res.next, None);
        assert!(!pc.has_in_flight());
    }

    #[test]
    fn failure_rolls_back_to_session_start_order() {
        let mut pc = PersistenceCoordinator::new();
        let dispatch = pc
            .session_finished(ids(&["a", "b", "c"]), entries(&["c", "a", "b"]))
            .unwrap();

        let res = pc.resolution(dispatch.ticket, Err(CommitError::Network("down".into())));
        let CommitOutcome::RolledBack { to, error } = res.outcome else {
            panic!("expected rollback, got {:?}", res.outcome);
        };
        assert_eq!(to, ids(&["a", "b", "c"]));
        assert_eq!(error, CommitError::Network("down".into()));
        assert_eq!(res.next, None);
    }

    #[test]
    fn second_session_queues_behind_in_flight() {
        let mut pc = PersistenceCoordinator::new();
        let first = pc
            .session_finished(ids(&["a", "b"]), entries(&["b", "a"]))
            .unwrap();

        // Session two completes before the sink answers.
        let second = pc.session_finished(ids(&["b", "a"]), entries(&["a", "b"]));
        assert_eq!(second, None, "dispatch must wait for the in-flight slot");
        assert!(pc.has_queued());

        let res = pc.resolution(first.ticket, Ok(()));
        assert_eq!(res.outcome, CommitOutcome::Committed);
        let next = res.next.expect("queued commit dispatches after resolution");
        assert_eq!(next.entries[0].id.as_str(), "a");
    }

    #[test]
    fn superseded_failure_skips_rollback() {
        let mut pc = PersistenceCoordinator::new();
        let first = pc
            .session_finished(ids(&["a", "b"]), entries(&["b", "a"]))
            .unwrap();
        pc.session_finished(ids(&["b", "a"]), entries(&["a", "b"]));

        // The old failure must not clobber the newer, still-pending state.
        let res = pc.resolution(first.ticket, Err(CommitError::Network("down".into())));
        let CommitOutcome::SupersededFailure { error } = res.outcome else {
            panic!("expected superseded failure, got {:?}", res.outcome);
        };
        assert_eq!(error.error_type(), "network");
        assert!(res.next.is_some());
    }

    #[test]
    fn third_session_supersedes_queued() {
        let mut pc = PersistenceCoordinator::new();
        let first = pc
            .session_finished(ids(&["a", "b", "c"]), entries(&["b", "a", "c"]))
            .unwrap();
        pc.session_finished(ids(&["b", "a", "c"]), entries(&["c", "b", "a"]));
        pc.session_finished(ids(&["c", "b", "a"]), entries(&["a", "c", "b"]));

        let res = pc.resolution(first.ticket, Ok(()));
        let next = res.next.expect("latest queued commit dispatches");
        // Only the third session's order survives the queue.
        let order: Vec<&str> = next.entries.iter().map(|entry| entry.id.as_str()).collect();
        assert_eq!(order, vec!["a", "c", "b"]);
        assert!(!pc.has_queued());
    }

    #[test]
    fn stale_ticket_is_ignored() {
        let mut pc = PersistenceCoordinator::new();
        let first = pc
            .session_finished(ids(&["a", "b"]), entries(&["b", "a"]))
            .unwrap();
        pc.resolution(first.ticket, Ok(()));

        // Resolving the same ticket twice: the second is stale.
        let res = pc.resolution(first.ticket, Err(CommitError::Closed));
        assert_eq!(res.outcome, CommitOutcome::Stale);
        assert_eq!(res.next, None);
    }

    #[test]
    fn tickets_increase_monotonically() {
        let mut pc = PersistenceCoordinator::new();
        let first = pc
            .session_finished(ids(&["a", "b"]), entries(&["b", "a"]))
            .unwrap();
        pc.resolution(first.ticket, Ok(()));
        let second = pc
            .session_finished(ids(&["b", "a"]), entries(&["a", "b"]))
            .unwrap();
        assert_ne!(first.ticket, second.ticket);
    }

    #[test]
    fn queued_failure_rolls_back_to_its_own_session_start() {
        let mut pc = PersistenceCoordinator::new();
        let first = pc
            .session_finished(ids(&["a", "b"]), entries(&["b", "a"]))
            .unwrap();
        pc.session_finished(ids(&["b", "a"]), entries(&["a", "b"]));

        let res = pc.resolution(first.ticket, Ok(()));
        let next = res.next.unwrap();

        // The promoted commit fails with nothing newer: roll back to the
        // order *its* session started from.
        let res = pc.resolution(next.ticket, Err(CommitError::Validation("bad".into())));
        let CommitOutcome::RolledBack { to, .. } = res.outcome else {
            panic!("expected rollback");
        };
        assert_eq!(to, ids(&["b", "a"]));
    }
}
