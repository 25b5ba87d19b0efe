#![forbid(unsafe_code)]

//! List orchestrator: composes the per-item controllers over one ordered
//! sequence.
//!
//! The orchestrator is the single owner of the sequence, the drag session,
//! and the commit pipeline. Per-item swipe controllers are materialized
//! lazily and kept across renders. Classified track events are routed
//! through [`pointer_event`](ListOrchestrator::pointer_event); every input
//! returns the [`ListEvent`]s the caller must act on (invoke callbacks,
//! re-render, call the sink) — effects as values, no stored closures.
//!
//! # Invariants
//!
//! 1. At most one drag session is active; a second start is rejected and
//!    does not disturb the first.
//! 2. The ordered sequence is mutated only here (via the reorder engine,
//!    rollback, cancel, or reconciliation) — never by a per-item
//!    controller.
//! 3. Selection mode and an active session are mutually exclusive;
//!    entering either force-closes every open reveal.
//! 4. External reconciliation never interrupts an active session; it is
//!    deferred and applied when the session ends.
//!
//! # Failure Modes
//!
//! - Gesture conflicts (a second drag, a swipe during selection mode, an
//!   unknown item) are silently ignored: the gesture does not begin and no
//!   event is emitted.
//! - A rollback arriving while a *new* session is active is discarded —
//!   the active session owns the visible order and its own commit or
//!   cancel supersedes the stale target (last-writer-wins).

use ahash::AHashMap;

use rowkit_core::motion::VisualTransform;
use rowkit_core::pointer::{Axis, TrackEvent};

use crate::drag::{DragActivation, DragController, DragSession};
use crate::error::{CommitError, ListError};
use crate::item::{Item, ItemId, OrderSource, OrderedSequence};
use crate::persist::{
    CommitDispatch, CommitOutcome, CommitTicket, PersistenceCoordinator, PersistenceSink,
};
use crate::reorder::ReorderEngine;
use crate::swipe::{SwipeConfig, SwipePhase, SwipeResolution, SwipeReveal, TapOutcome};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Visual and gesture parameters for one list.
#[derive(Debug, Clone)]
pub struct ListConfig {
    /// Uniform item height, px. Required: the reorder slot math depends on
    /// it.
    pub item_height: f32,
    /// Width of the revealed action button, px (default: 80.0).
    pub action_button_width: f32,
    /// Fraction of the button width past which a release opens
    /// (default: 0.5).
    pub reveal_threshold: f32,
    /// Velocity (px/ms) past which a flick opens (default: 0.5).
    pub velocity_threshold: f32,
    /// Where a drag may originate (default: anywhere on the item).
    pub drag_activation: DragActivation,
}

impl ListConfig {
    /// Configuration for items of the given uniform height, defaults
    /// elsewhere.
    #[must_use]
    pub fn new(item_height: f32) -> Self {
        Self {
            item_height,
            action_button_width: 80.0,
            reveal_threshold: 0.5,
            velocity_threshold: 0.5,
            drag_activation: DragActivation::Anywhere,
        }
    }

    /// Set the action button width (builder pattern).
    #[must_use]
    pub fn with_button_width(mut self, width: f32) -> Self {
        self.action_button_width = width;
        self
    }

    /// Set the drag activation policy (builder pattern).
    #[must_use]
    pub fn with_drag_activation(mut self, activation: DragActivation) -> Self {
        self.drag_activation = activation;
        self
    }

    fn swipe_config(&self) -> SwipeConfig {
        SwipeConfig {
            button_width: self.action_button_width,
            reveal_threshold: self.reveal_threshold,
            velocity_threshold: self.velocity_threshold,
        }
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// What the caller must act on after feeding the orchestrator an input.
#[derive(Debug, Clone, PartialEq)]
pub enum ListEvent {
    /// The visible order changed (live mutation, rollback, cancel, or
    /// reconciliation): re-render.
    OrderChanged,
    /// An item's reveal resolved open.
    RevealOpened(ItemId),
    /// An item's reveal is closing (resolved, dismissed, or forced).
    RevealClosed(ItemId),
    /// Invoke the caller's action callback for the item, now; do not wait
    /// for the close animation.
    ActionInvoked(ItemId),
    /// Invoke the normal item-press callback.
    ItemPressed(ItemId),
    /// A commit was handed to the sink.
    CommitDispatched(CommitTicket),
    /// The sink confirmed a commit; the order is canonical.
    CommitConfirmed(CommitTicket),
    /// The sink rejected a commit. Recoverable: surface as a transient
    /// notice. `rolled_back` is false when newer state superseded the
    /// rollback target.
    CommitFailed {
        ticket: CommitTicket,
        error: CommitError,
        rolled_back: bool,
    },
    /// An external order change was adopted.
    OrderReconciled,
}

// ---------------------------------------------------------------------------
// Internal drag bookkeeping
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct ActiveDrag {
    item: ItemId,
    session: DragSession,
    controller: DragController,
    /// Identifier sequence at session start: the cancel target and the
    /// commit baseline.
    start_order: Vec<ItemId>,
}

// ---------------------------------------------------------------------------
// ListOrchestrator
// ---------------------------------------------------------------------------

/// Owner of one reorderable, swipe-to-act list.
pub struct ListOrchestrator<T, S: PersistenceSink> {
    seq: OrderedSequence<T>,
    config: ListConfig,
    engine: ReorderEngine,
    coordinator: PersistenceCoordinator,
    sink: S,
    swipes: AHashMap<ItemId, SwipeReveal>,
    drag: Option<ActiveDrag>,
    /// Controller of the most recently released item, kept until the
    /// animation layer reports it settled.
    settling: Option<(ItemId, DragController)>,
    /// Item armed for long-press drag activation.
    armed: Option<ItemId>,
    selection_mode: bool,
    /// External snapshot deferred while a session is active.
    deferred: Option<Vec<Item<T>>>,
}

impl<T, S: PersistenceSink> ListOrchestrator<T, S> {
    /// Build an orchestrator over an initial snapshot.
    pub fn new(items: Vec<Item<T>>, config: ListConfig, sink: S) -> Result<Self, ListError> {
        let seq = OrderedSequence::new(items)?;
        let engine = ReorderEngine::new(config.item_height);
        Ok(Self {
            seq,
            config,
            engine,
            coordinator: PersistenceCoordinator::new(),
            sink,
            swipes: AHashMap::new(),
            drag: None,
            settling: None,
            armed: None,
            selection_mode: false,
            deferred: None,
        })
    }

    /// Build an orchestrator from a data source's current snapshot.
    pub fn from_source(
        source: &impl OrderSource<T>,
        config: ListConfig,
        sink: S,
    ) -> Result<Self, ListError> {
        Self::new(source.ordered_items(), config, sink)
    }

    // -- Observers ----------------------------------------------------------

    /// The current visible order.
    #[inline]
    #[must_use]
    pub fn order(&self) -> &OrderedSequence<T> {
        &self.seq
    }

    /// The active drag session, if any.
    #[inline]
    #[must_use]
    pub fn session(&self) -> Option<&DragSession> {
        self.drag.as_ref().map(|drag| &drag.session)
    }

    /// Slot currently marked for hover emphasis.
    #[must_use]
    pub fn hover_target(&self) -> Option<usize> {
        self.drag.as_ref().and_then(|drag| drag.session.hover_index)
    }

    /// Whether list scrolling must be disabled (a session is active).
    #[inline]
    #[must_use]
    pub fn scroll_locked(&self) -> bool {
        self.drag.is_some()
    }

    /// Whether selection mode is on.
    #[inline]
    #[must_use]
    pub fn selection_mode(&self) -> bool {
        self.selection_mode
    }

    /// Read-only view of an item's reveal phase (observable swipe state).
    #[must_use]
    pub fn reveal_phase(&self, id: &ItemId) -> SwipePhase {
        self.swipes
            .get(id)
            .map_or(SwipePhase::Closed, SwipeReveal::phase)
    }

    /// Reveal opacity of the item's action affordance.
    #[must_use]
    pub fn reveal_opacity(&self, id: &ItemId) -> f32 {
        self.swipes.get(id).map_or(0.0, SwipeReveal::opacity)
    }

    /// Motion target for an item: lifted when dragged, revealed offset when
    /// swiped, resting otherwise.
    #[must_use]
    pub fn transform(&self, id: &ItemId) -> VisualTransform {
        if let Some(drag) = self.drag.as_ref()
            && &drag.item == id
        {
            return drag
                .controller
                .transform(drag.session.slot_offset(self.config.item_height));
        }
        if let Some((settling_id, controller)) = self.settling.as_ref()
            && settling_id == id
        {
            return controller.transform(0.0);
        }
        self.swipes
            .get(id)
            .map_or_else(VisualTransform::resting, SwipeReveal::transform)
    }

    /// Borrow the sink.
    #[inline]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    // -- Session controls ---------------------------------------------------

    /// Open a drag session for the given item.
    ///
    /// Exits selection mode if it is on (the two modes are mutually
    /// exclusive). Rejected when a session is already active or the item is
    /// unknown; rejection does not disturb the existing session.
    pub fn start_reorder_session(&mut self, id: &ItemId) -> Result<(), ListError> {
        if self.drag.is_some() {
            return Err(ListError::SessionActive);
        }
        let origin = self
            .seq
            .index_of(id)
            .ok_or_else(|| ListError::UnknownItem(id.clone()))?;

        if self.selection_mode {
            self.set_selection_mode(false);
        }

        // The dragged item never shows a reveal.
        if let Some(swipe) = self.swipes.get_mut(id) {
            swipe.force_close();
        }

        let mut controller = DragController::new();
        controller.lift();
        tracing::debug!(target: "rowkit.list", item = %id, origin, "drag session started");
        self.drag = Some(ActiveDrag {
            item: id.clone(),
            session: DragSession::new(origin),
            controller,
            start_order: self.seq.id_order(),
        });
        Ok(())
    }

    /// Abandon the active session: the order reverts to the session start,
    /// no persistence call is made. Safe to call at any time; a no-op when
    /// idle.
    pub fn cancel_reorder_session(&mut self) -> Vec<ListEvent> {
        let Some(active) = self.drag.take() else {
            return Vec::new();
        };
        let mut events = Vec::new();

        let changed = self.seq.id_order() != active.start_order;
        let restored = self.seq.restore_order(&active.start_order);
        debug_assert!(restored.is_ok(), "session start order is a permutation");
        if changed {
            events.push(ListEvent::OrderChanged);
        }

        tracing::debug!(target: "rowkit.list", item = %active.item, "drag session cancelled");
        self.begin_settle(active);
        events.extend(self.apply_deferred());
        events
    }

    /// Toggle selection mode. Entering it cancels any active session and
    /// force-closes every open reveal (no callbacks fire).
    pub fn set_selection_mode(&mut self, on: bool) -> Vec<ListEvent> {
        if on == self.selection_mode {
            return Vec::new();
        }
        let mut events = Vec::new();
        if on {
            events.extend(self.cancel_reorder_session());
            for (id, swipe) in &mut self.swipes {
                if swipe.is_revealed() {
                    swipe.force_close();
                    events.push(ListEvent::RevealClosed(id.clone()));
                }
            }
            self.armed = None;
        }
        self.selection_mode = on;
        tracing::debug!(target: "rowkit.list", on, "selection mode toggled");
        events
    }

    // -- Gesture routing ----------------------------------------------------

    /// Route a classified track event for one item.
    ///
    /// `from_handle` reports whether the contact originated on the item's
    /// designated drag handle; it only matters under
    /// [`DragActivation::Handle`].
    pub fn pointer_event(
        &mut self,
        id: &ItemId,
        event: &TrackEvent,
        from_handle: bool,
    ) -> Vec<ListEvent> {
        let mut events = Vec::new();
        match *event {
            TrackEvent::Started { .. } => {}
            TrackEvent::Held { held_for, .. } => {
                if let DragActivation::LongPress(required) = self.config.drag_activation
                    && held_for >= required
                    && !self.selection_mode
                    && self.drag.is_none()
                    && self.seq.index_of(id).is_some()
                {
                    self.armed = Some(id.clone());
                }
            }
            TrackEvent::Moved { dx, dy, axis, .. } => match axis {
                Some(Axis::Horizontal) => self.swipe_moved(id, dx),
                Some(Axis::Vertical) => self.drag_moved(id, dy, from_handle, &mut events),
                None => {}
            },
            TrackEvent::Ended { vx, axis, .. } => {
                self.disarm(id);
                match axis {
                    Some(Axis::Horizontal) => self.swipe_released(id, vx, &mut events),
                    Some(Axis::Vertical) => self.drag_released(id, &mut events),
                    // No classification: the contact was a tap.
                    None => events.extend(self.body_tapped(id)),
                }
            }
            TrackEvent::Cancelled { axis } => {
                self.disarm(id);
                match axis {
                    Some(Axis::Horizontal) => {
                        if let Some(swipe) = self.swipes.get_mut(id)
                            && swipe.is_revealed()
                        {
                            swipe.terminate();
                            events.push(ListEvent::RevealClosed(id.clone()));
                        }
                    }
                    // Termination commits like a release: partial
                    // completion is indistinguishable from a deliberate
                    // drop.
                    Some(Axis::Vertical) => self.drag_released(id, &mut events),
                    None => {}
                }
            }
        }
        events
    }

    /// The revealed action button was tapped.
    pub fn action_tapped(&mut self, id: &ItemId) -> Vec<ListEvent> {
        let Some(swipe) = self.swipes.get_mut(id) else {
            return Vec::new();
        };
        if swipe.action_tap() {
            vec![
                ListEvent::ActionInvoked(id.clone()),
                ListEvent::RevealClosed(id.clone()),
            ]
        } else {
            Vec::new()
        }
    }

    /// The item body was tapped.
    pub fn body_tapped(&mut self, id: &ItemId) -> Vec<ListEvent> {
        if self.seq.index_of(id).is_none() {
            return Vec::new();
        }
        match self.swipes.get_mut(id).map(SwipeReveal::body_tap) {
            Some(TapOutcome::Dismissed) => vec![ListEvent::RevealClosed(id.clone())],
            Some(TapOutcome::Press) | None => vec![ListEvent::ItemPressed(id.clone())],
        }
    }

    // -- Animation completion -----------------------------------------------

    /// The animation layer settled the released drag item.
    pub fn drag_settled(&mut self) {
        if let Some((_, controller)) = self.settling.as_mut() {
            controller.settled();
        }
        self.settling = None;
    }

    /// The animation layer settled an item's reveal.
    pub fn reveal_settled(&mut self, id: &ItemId) {
        if let Some(swipe) = self.swipes.get_mut(id) {
            swipe.settled();
        }
    }

    // -- Persistence --------------------------------------------------------

    /// The sink resolved the commit identified by `ticket`.
    pub fn commit_resolved(
        &mut self,
        ticket: CommitTicket,
        result: Result<(), CommitError>,
    ) -> Vec<ListEvent> {
        let resolution = self.coordinator.resolution(ticket, result);
        let mut events = Vec::new();

        match resolution.outcome {
            CommitOutcome::Committed => events.push(ListEvent::CommitConfirmed(ticket)),
            CommitOutcome::RolledBack { to, error } => {
                // An active session owns the visible order; a stale
                // rollback target must not yank it out from under the
                // user's fingers.
                let rolled_back = self.drag.is_none() && self.seq.restore_order(&to).is_ok();
                if rolled_back {
                    events.push(ListEvent::OrderChanged);
                }
                events.push(ListEvent::CommitFailed {
                    ticket,
                    error,
                    rolled_back,
                });
            }
            CommitOutcome::SupersededFailure { error } => {
                events.push(ListEvent::CommitFailed {
                    ticket,
                    error,
                    rolled_back: false,
                });
            }
            CommitOutcome::Stale => {}
        }

        if let Some(next) = resolution.next {
            events.push(self.dispatch(next));
        }
        events
    }

    /// Adopt an externally changed order.
    ///
    /// While a session is active the snapshot is deferred and applied when
    /// the session ends — an in-progress drag is never aborted for
    /// reconciliation.
    pub fn reconcile(&mut self, snapshot: Vec<Item<T>>) -> Vec<ListEvent> {
        if self.drag.is_some() {
            tracing::debug!(target: "rowkit.list", "reconciliation deferred: session active");
            self.deferred = Some(snapshot);
            return Vec::new();
        }
        self.adopt(snapshot).into_iter().collect()
    }

    /// Pull a fresh snapshot from the data source and reconcile it.
    pub fn sync_from(&mut self, source: &impl OrderSource<T>) -> Vec<ListEvent> {
        self.reconcile(source.ordered_items())
    }

    // -- Internals ----------------------------------------------------------

    fn swipe_moved(&mut self, id: &ItemId, dx: f32) {
        if self.selection_mode {
            return;
        }
        if let Some(drag) = self.drag.as_ref()
            && &drag.item == id
        {
            return;
        }
        if self.seq.index_of(id).is_none() {
            return;
        }
        let config = self.config.swipe_config();
        let swipe = self
            .swipes
            .entry(id.clone())
            .or_insert_with(|| SwipeReveal::new(config));
        if swipe.phase() != SwipePhase::Opening {
            swipe.begin();
        }
        swipe.drag_to(dx);
    }

    fn swipe_released(&mut self, id: &ItemId, vx: f32, events: &mut Vec<ListEvent>) {
        let Some(swipe) = self.swipes.get_mut(id) else {
            return;
        };
        if swipe.phase() != SwipePhase::Opening {
            return;
        }
        match swipe.release(vx) {
            SwipeResolution::Open => events.push(ListEvent::RevealOpened(id.clone())),
            SwipeResolution::Closed => events.push(ListEvent::RevealClosed(id.clone())),
        }
    }

    fn drag_moved(&mut self, id: &ItemId, dy: f32, from_handle: bool, events: &mut Vec<ListEvent>) {
        if self.drag.is_none() && !self.try_activate_drag(id, from_handle) {
            return;
        }
        let Some(active) = self.drag.as_mut() else {
            return;
        };
        if &active.item != id {
            return;
        }
        active.controller.drag_to(dy);
        let shift = self
            .engine
            .drag_moved(&mut self.seq, &mut active.session, dy);
        if shift.is_some() {
            events.push(ListEvent::OrderChanged);
        }
    }

    fn try_activate_drag(&mut self, id: &ItemId, from_handle: bool) -> bool {
        if self.selection_mode {
            return false;
        }
        let allowed = match self.config.drag_activation {
            DragActivation::Anywhere => true,
            DragActivation::Handle => from_handle,
            DragActivation::LongPress(_) => self.armed.as_ref() == Some(id),
        };
        allowed && self.start_reorder_session(id).is_ok()
    }

    fn drag_released(&mut self, id: &ItemId, events: &mut Vec<ListEvent>) {
        let Some(active) = self.drag.take_if(|active| &active.item == id) else {
            return;
        };
        tracing::debug!(
            target: "rowkit.list",
            item = %active.item,
            from = active.session.origin_index,
            to = active.session.dragged_index,
            "drag session released"
        );

        let dispatch = self
            .coordinator
            .session_finished(active.start_order.clone(), self.seq.positions());
        self.begin_settle(active);
        if let Some(dispatch) = dispatch {
            events.push(self.dispatch(dispatch));
        }
        events.extend(self.apply_deferred());
    }

    fn dispatch(&mut self, dispatch: CommitDispatch) -> ListEvent {
        self.sink.commit_order(dispatch.ticket, &dispatch.entries);
        ListEvent::CommitDispatched(dispatch.ticket)
    }

    fn begin_settle(&mut self, mut active: ActiveDrag) {
        active.controller.release();
        self.settling = Some((active.item, active.controller));
    }

    fn apply_deferred(&mut self) -> Vec<ListEvent> {
        match self.deferred.take() {
            Some(snapshot) => self.adopt(snapshot).into_iter().collect(),
            None => Vec::new(),
        }
    }

    fn adopt(&mut self, snapshot: Vec<Item<T>>) -> Option<ListEvent> {
        let changed = snapshot.len() != self.seq.len()
            || snapshot
                .iter()
                .zip(self.seq.iter())
                .any(|(new, old)| new.id != old.id);
        match OrderedSequence::new(snapshot) {
            Ok(seq) => {
                self.seq = seq;
                if changed {
                    tracing::debug!(target: "rowkit.list", "external order adopted");
                    Some(ListEvent::OrderReconciled)
                } else {
                    None
                }
            }
            Err(err) => {
                tracing::debug!(
                    target: "rowkit.list",
                    error_type = err.error_type(),
                    "external snapshot rejected"
                );
                None
            }
        }
    }

    fn disarm(&mut self, id: &ItemId) {
        if self.armed.as_ref() == Some(id) {
            self.armed = None;
        }
    }
}

impl<T: std::fmt::Debug, S: PersistenceSink> std::fmt::Debug for ListOrchestrator<T, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListOrchestrator")
            .field("len", &self.seq.len())
            .field("session", &self.session())
            .field("selection_mode", &self.selection_mode)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
