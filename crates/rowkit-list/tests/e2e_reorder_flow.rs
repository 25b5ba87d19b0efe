//! End-to-end flows: raw pointer samples → gesture tracker → orchestrator
//! → persistence sink, with a recording sink double.

use web_time::{Duration, Instant};

use rowkit_core::pointer::PointerEvent;
use rowkit_core::tracker::{GestureTracker, TrackerConfig};
use rowkit_list::{
    CommitError, CommitTicket, Item, ItemId, ListConfig, ListEvent, ListOrchestrator, OrderEntry,
    PersistenceSink,
};

#[derive(Debug, Default)]
struct RecordingSink {
    commits: Vec<(CommitTicket, Vec<OrderEntry>)>,
}

impl PersistenceSink for RecordingSink {
    fn commit_order(&mut self, ticket: CommitTicket, order: &[OrderEntry]) {
        self.commits.push((ticket, order.to_vec()));
    }
}

/// One list wired to one tracker, the way an embedding UI drives rowkit.
struct Harness {
    tracker: GestureTracker,
    orch: ListOrchestrator<u32, RecordingSink>,
    events: Vec<ListEvent>,
    t0: Instant,
}

impl Harness {
    fn new(ids: &[&str], config: ListConfig) -> Self {
        let items = ids
            .iter()
            .enumerate()
            .map(|(i, id)| Item::new(*id, i as u32))
            .collect();
        Self {
            tracker: GestureTracker::new(TrackerConfig::default()),
            orch: ListOrchestrator::new(items, config, RecordingSink::default()).unwrap(),
            events: Vec::new(),
            t0: Instant::now(),
        }
    }

    fn feed(&mut self, id: &str, sample: PointerEvent, from_handle: bool) {
        let id: ItemId = id.into();
        for track in self.tracker.process(&sample) {
            self.events
                .extend(self.orch.pointer_event(&id, &track, from_handle));
        }
    }

    fn at(&self, ms: u64) -> Instant {
        self.t0 + Duration::from_millis(ms)
    }

    fn order(&self) -> Vec<String> {
        self.orch
            .order()
            .iter()
            .map(|item| item.id.to_string())
            .collect()
    }

    fn dispatched_ticket(&self, index: usize) -> CommitTicket {
        self.orch.sink().commits[index].0
    }
}

fn config() -> ListConfig {
    ListConfig::new(100.0)
}

// ---------------------------------------------------------------------------
// Drag scenarios
// ---------------------------------------------------------------------------

#[test]
fn drag_b_down_150px_commits_acdb() {
    let mut h = Harness::new(&["a", "b", "c", "d"], config());

    // Finger down on B, pull down 150px over a few samples, release.
    h.feed("b", PointerEvent::down(50.0, 150.0, h.at(0)), false);
    h.feed("b", PointerEvent::moved(50.0, 200.0, h.at(30)), false);
    h.feed("b", PointerEvent::moved(50.0, 260.0, h.at(60)), false);
    h.feed("b", PointerEvent::moved(50.0, 300.0, h.at(90)), false);
    h.feed("b", PointerEvent::up(50.0, 300.0, h.at(120)), false);

    assert_eq!(h.order(), vec!["a", "c", "d", "b"]);
    assert!(h.orch.session().is_none());

    let commits = &h.orch.sink().commits;
    assert_eq!(commits.len(), 1);
    let flat: Vec<(&str, usize)> = commits[0]
        .1
        .iter()
        .map(|entry| (entry.id.as_str(), entry.position))
        .collect();
    assert_eq!(flat, vec![("a", 0), ("c", 1), ("d", 2), ("b", 3)]);
}

#[test]
fn live_mutation_happens_before_release() {
    let mut h = Harness::new(&["a", "b", "c"], config());

    h.feed("a", PointerEvent::down(50.0, 50.0, h.at(0)), false);
    h.feed("a", PointerEvent::moved(50.0, 170.0, h.at(40)), false);

    // Other rows have already slid to make room.
    assert_eq!(h.order(), vec!["b", "a", "c"]);
    assert!(h.events.contains(&ListEvent::OrderChanged));
    assert!(h.orch.scroll_locked());
    assert_eq!(h.orch.hover_target(), Some(1));
}

#[test]
fn rollback_restores_pre_session_order_after_many_mutations() {
    let mut h = Harness::new(&["a", "b", "c", "d"], config());

    h.feed("a", PointerEvent::down(50.0, 50.0, h.at(0)), false);
    for (i, y) in [120.0, 210.0, 320.0, 260.0].iter().enumerate() {
        h.feed(
            "a",
            PointerEvent::moved(50.0, 50.0 + y, h.at(20 * (i as u64 + 1))),
            false,
        );
    }
    h.feed("a", PointerEvent::up(50.0, 310.0, h.at(120)), false);
    assert_ne!(h.order(), vec!["a", "b", "c", "d"]);

    let ticket = h.dispatched_ticket(0);
    let events = h
        .orch
        .commit_resolved(ticket, Err(CommitError::Network("offline".into())));

    assert!(events.iter().any(|event| matches!(
        event,
        ListEvent::CommitFailed {
            rolled_back: true,
            ..
        }
    )));
    assert_eq!(h.order(), vec!["a", "b", "c", "d"]);
}

#[test]
fn drag_on_handle_only_list_needs_handle_origin() {
    use rowkit_list::DragActivation;

    let mut h = Harness::new(
        &["a", "b"],
        config().with_drag_activation(DragActivation::Handle),
    );

    h.feed("a", PointerEvent::down(50.0, 50.0, h.at(0)), false);
    h.feed("a", PointerEvent::moved(50.0, 170.0, h.at(40)), false);
    h.feed("a", PointerEvent::up(50.0, 170.0, h.at(80)), false);
    assert_eq!(h.order(), vec!["a", "b"]);
    assert!(h.orch.sink().commits.is_empty());

    h.feed("a", PointerEvent::down(50.0, 50.0, h.at(200)), true);
    h.feed("a", PointerEvent::moved(50.0, 170.0, h.at(240)), true);
    h.feed("a", PointerEvent::up(50.0, 170.0, h.at(280)), true);
    assert_eq!(h.order(), vec!["b", "a"]);
    assert_eq!(h.orch.sink().commits.len(), 1);
}

// ---------------------------------------------------------------------------
// Swipe scenarios
// ---------------------------------------------------------------------------

#[test]
fn swipe_left_90px_opens_then_body_tap_dismisses() {
    let mut h = Harness::new(&["x", "y"], config());

    // 90px of leftward travel exceeds the 80px button; release at rest.
    h.feed("x", PointerEvent::down(200.0, 50.0, h.at(0)), false);
    h.feed("x", PointerEvent::moved(155.0, 50.0, h.at(300)), false);
    h.feed("x", PointerEvent::moved(110.0, 50.0, h.at(600)), false);
    h.feed("x", PointerEvent::up(110.0, 50.0, h.at(1200)), false);

    assert!(h.events.contains(&ListEvent::RevealOpened("x".into())));
    assert_eq!(h.orch.transform(&"x".into()).translate_x, -80.0);

    // A tap on the body: dismisses, and the press callback does not fire.
    h.events.clear();
    h.feed("x", PointerEvent::down(150.0, 50.0, h.at(2000)), false);
    h.feed("x", PointerEvent::up(150.0, 50.0, h.at(2050)), false);
    assert_eq!(h.events, vec![ListEvent::RevealClosed("x".into())]);

    // After the close settles, a tap presses normally.
    h.orch.reveal_settled(&"x".into());
    h.events.clear();
    h.feed("x", PointerEvent::down(150.0, 50.0, h.at(3000)), false);
    h.feed("x", PointerEvent::up(150.0, 50.0, h.at(3050)), false);
    assert_eq!(h.events, vec![ListEvent::ItemPressed("x".into())]);
}

#[test]
fn horizontal_swipe_never_disturbs_order() {
    let mut h = Harness::new(&["x", "y", "z"], config());

    h.feed("y", PointerEvent::down(200.0, 150.0, h.at(0)), false);
    h.feed("y", PointerEvent::moved(120.0, 155.0, h.at(40)), false);
    h.feed("y", PointerEvent::up(120.0, 155.0, h.at(80)), false);

    assert_eq!(h.order(), vec!["x", "y", "z"]);
    assert!(h.orch.sink().commits.is_empty());
    assert!(!h.orch.scroll_locked());
}

#[test]
fn gesture_cancel_mid_swipe_closes_reveal() {
    let mut h = Harness::new(&["x"], config());

    h.feed("x", PointerEvent::down(200.0, 50.0, h.at(0)), false);
    h.feed("x", PointerEvent::moved(120.0, 50.0, h.at(40)), false);
    h.feed("x", PointerEvent::cancel(120.0, 50.0, h.at(80)), false);

    assert!(h.events.contains(&ListEvent::RevealClosed("x".into())));
    h.orch.reveal_settled(&"x".into());
    assert_eq!(h.orch.transform(&"x".into()).translate_x, 0.0);
}

#[test]
fn axis_latch_prevents_swipe_turning_into_drag() {
    let mut h = Harness::new(&["a", "b"], config());

    // Classifies horizontal, then wanders vertically: still a swipe.
    h.feed("a", PointerEvent::down(200.0, 50.0, h.at(0)), false);
    h.feed("a", PointerEvent::moved(160.0, 52.0, h.at(30)), false);
    h.feed("a", PointerEvent::moved(150.0, 180.0, h.at(60)), false);
    h.feed("a", PointerEvent::up(150.0, 180.0, h.at(90)), false);

    assert_eq!(h.order(), vec!["a", "b"], "no reorder from a swipe");
    assert!(h.orch.session().is_none());
    assert!(h.orch.sink().commits.is_empty());
}

// ---------------------------------------------------------------------------
// Serialized commits across sessions
// ---------------------------------------------------------------------------

#[test]
fn back_to_back_sessions_serialize_commits() {
    let mut h = Harness::new(&["a", "b", "c"], config());

    h.feed("a", PointerEvent::down(50.0, 50.0, h.at(0)), false);
    h.feed("a", PointerEvent::moved(50.0, 170.0, h.at(40)), false);
    h.feed("a", PointerEvent::up(50.0, 170.0, h.at(80)), false);
    assert_eq!(h.orch.sink().commits.len(), 1);

    // Second drag completes while the first commit is still unresolved.
    h.feed("c", PointerEvent::down(50.0, 250.0, h.at(500)), false);
    h.feed("c", PointerEvent::moved(50.0, 40.0, h.at(540)), false);
    h.feed("c", PointerEvent::up(50.0, 40.0, h.at(580)), false);
    assert_eq!(
        h.orch.sink().commits.len(),
        1,
        "second commit waits in the queue"
    );

    let first = h.dispatched_ticket(0);
    let events = h.orch.commit_resolved(first, Ok(()));
    assert!(
        events
            .iter()
            .any(|event| matches!(event, ListEvent::CommitDispatched(_)))
    );
    assert_eq!(h.orch.sink().commits.len(), 2);

    let second = h.dispatched_ticket(1);
    let events = h.orch.commit_resolved(second, Ok(()));
    assert!(events.contains(&ListEvent::CommitConfirmed(second)));
}

// ---------------------------------------------------------------------------
// Reconciliation
// ---------------------------------------------------------------------------

#[test]
fn external_change_during_drag_applies_at_session_end() {
    let mut h = Harness::new(&["a", "b", "c"], config());

    h.feed("a", PointerEvent::down(50.0, 50.0, h.at(0)), false);
    h.feed("a", PointerEvent::moved(50.0, 170.0, h.at(40)), false);

    // Another device reordered (and added) rows mid-drag.
    let snapshot = vec![
        Item::new("c", 0u32),
        Item::new("a", 1),
        Item::new("b", 2),
        Item::new("d", 3),
    ];
    assert!(h.orch.reconcile(snapshot).is_empty());
    assert_eq!(h.order(), vec!["b", "a", "c"], "drag is never aborted");

    h.feed("a", PointerEvent::up(50.0, 170.0, h.at(80)), false);
    assert!(h.events.contains(&ListEvent::OrderReconciled));
    assert_eq!(h.order(), vec!["c", "a", "b", "d"]);
}
