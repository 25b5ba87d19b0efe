#![forbid(unsafe_code)]

//! Reorder engine: maps a dragged item's vertical travel to a target slot
//! and mutates the in-memory order live.
//!
//! Fixed-height grid model: items are uniform `item_height` px tall.
//! The target slot is recomputed from the session origin on every move —
//! `target = clamp(origin + round(offset / H), 0, N-1)` — which for uniform
//! heights is exactly the re-based "one slot at a time" behavior: the item
//! relocates the moment the finger crosses a slot midpoint, and further
//! travel in the same direction advances one slot per crossing.
//!
//! # Invariants
//!
//! 1. Every identifier present before a move event is present exactly once
//!    after it (relocation permutes, never inserts or drops).
//! 2. Mutations are applied serially in arrival order; `&mut` exclusivity
//!    on the sequence enforces this at compile time.
//! 3. `hover_index` is `Some(slot)` for exactly one slot, or `None` while
//!    the dragged item rests at its origin slot.

use crate::drag::DragSession;
use crate::item::OrderedSequence;

/// Minimum item height accepted; degenerate heights are clamped here.
const MIN_ITEM_HEIGHT: f32 = 1.0;

/// A live relocation applied by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotShift {
    pub from: usize,
    pub to: usize,
}

/// List-level reorder logic. Holds no session state of its own; the
/// orchestrator passes the session and sequence in.
#[derive(Debug, Clone)]
pub struct ReorderEngine {
    item_height: f32,
}

impl ReorderEngine {
    /// Create an engine for items of uniform `item_height` px.
    #[must_use]
    pub fn new(item_height: f32) -> Self {
        Self {
            item_height: item_height.max(MIN_ITEM_HEIGHT),
        }
    }

    /// Uniform item height, px.
    #[inline]
    #[must_use]
    pub fn item_height(&self) -> f32 {
        self.item_height
    }

    /// Slot the dragged item would occupy for the given total finger
    /// travel.
    #[must_use]
    pub fn target_index(&self, origin_index: usize, len: usize, offset: f32) -> usize {
        if len == 0 {
            return 0;
        }
        let index_offset = (offset / self.item_height).round() as isize;
        let last = (len - 1) as isize;
        (origin_index as isize + index_offset).clamp(0, last) as usize
    }

    /// Apply a move event: update the session's travel, relocate the item
    /// if the finger crossed into a new slot, and refresh the hover target.
    ///
    /// Returns the relocation applied, if any.
    pub fn drag_moved<T>(
        &self,
        seq: &mut OrderedSequence<T>,
        session: &mut DragSession,
        offset: f32,
    ) -> Option<SlotShift> {
        session.vertical_offset = offset;
        let target = self.target_index(session.origin_index, seq.len(), offset);

        let shift = if target != session.dragged_index {
            seq.relocate(session.dragged_index, target);
            let shift = SlotShift {
                from: session.dragged_index,
                to: target,
            };
            session.dragged_index = target;
            Some(shift)
        } else {
            None
        };

        session.hover_index =
            (session.dragged_index != session.origin_index).then_some(session.dragged_index);
        shift
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{Item, ItemId};

    fn seq(ids: &[&str]) -> OrderedSequence<()> {
        OrderedSequence::new(ids.iter().map(|id| Item::new(*id, ())).collect()).unwrap()
    }

    fn ids(seq: &OrderedSequence<()>) -> Vec<&str> {
        seq.iter().map(|item| item.id.as_str()).collect()
    }

    fn engine() -> ReorderEngine {
        ReorderEngine::new(100.0)
    }

    // --- Target slot math ---

    #[test]
    fn target_rounds_to_nearest_slot() {
        let e = engine();
        assert_eq!(e.target_index(1, 4, 0.0), 1);
        assert_eq!(e.target_index(1, 4, 49.0), 1);
        assert_eq!(e.target_index(1, 4, 51.0), 2);
        assert_eq!(e.target_index(1, 4, 150.0), 3);
        assert_eq!(e.target_index(1, 4, -51.0), 0);
    }

    #[test]
    fn target_clamps_to_ends() {
        let e = engine();
        assert_eq!(e.target_index(1, 4, 10_000.0), 3);
        assert_eq!(e.target_index(1, 4, -10_000.0), 0);
        assert_eq!(e.target_index(0, 1, 500.0), 0);
    }

    #[test]
    fn target_on_empty_list() {
        let e = engine();
        assert_eq!(e.target_index(0, 0, 250.0), 0);
    }

    #[test]
    fn degenerate_height_is_clamped() {
        let e = ReorderEngine::new(0.0);
        assert_eq!(e.item_height(), 1.0);
    }

    // --- Live mutation ---

    #[test]
    fn drag_b_down_150_px_reorders_to_acdb() {
        // [A,B,C,D], height 100, drag B (origin 1) down 150:
        // round(150/100) = 2 → target min(3, 1+2) = 3 → [A,C,D,B].
        let mut s = seq(&["a", "b", "c", "d"]);
        let mut session = DragSession::new(1);
        let e = engine();

        let shift = e.drag_moved(&mut s, &mut session, 150.0);
        assert_eq!(shift, Some(SlotShift { from: 1, to: 3 }));
        assert_eq!(ids(&s), vec!["a", "c", "d", "b"]);
        assert_eq!(session.dragged_index, 3);
        assert_eq!(session.hover_index, Some(3));
    }

    #[test]
    fn commit_payload_after_scenario_drag() {
        let mut s = seq(&["a", "b", "c", "d"]);
        let mut session = DragSession::new(1);
        engine().drag_moved(&mut s, &mut session, 150.0);

        let entries = s.positions();
        let flat: Vec<(&str, usize)> = entries
            .iter()
            .map(|entry| (entry.id.as_str(), entry.position))
            .collect();
        assert_eq!(flat, vec![("a", 0), ("c", 1), ("d", 2), ("b", 3)]);
    }

    #[test]
    fn one_slot_at_a_time() {
        let mut s = seq(&["a", "b", "c", "d"]);
        let mut session = DragSession::new(0);
        let e = engine();

        assert_eq!(e.drag_moved(&mut s, &mut session, 40.0), None);
        assert_eq!(ids(&s), vec!["a", "b", "c", "d"]);

        let shift = e.drag_moved(&mut s, &mut session, 60.0);
        assert_eq!(shift, Some(SlotShift { from: 0, to: 1 }));
        assert_eq!(ids(&s), vec!["b", "a", "c", "d"]);

        let shift = e.drag_moved(&mut s, &mut session, 160.0);
        assert_eq!(shift, Some(SlotShift { from: 1, to: 2 }));
        assert_eq!(ids(&s), vec!["b", "c", "a", "d"]);
    }

    #[test]
    fn reversing_direction_moves_back() {
        let mut s = seq(&["a", "b", "c"]);
        let mut session = DragSession::new(0);
        let e = engine();

        e.drag_moved(&mut s, &mut session, 120.0);
        assert_eq!(ids(&s), vec!["b", "a", "c"]);

        e.drag_moved(&mut s, &mut session, 20.0);
        assert_eq!(ids(&s), vec!["a", "b", "c"]);
        assert_eq!(session.dragged_index, 0);
        assert_eq!(session.hover_index, None);
    }

    #[test]
    fn repeated_offset_is_idempotent() {
        let mut s = seq(&["a", "b", "c", "d"]);
        let mut session = DragSession::new(1);
        let e = engine();

        e.drag_moved(&mut s, &mut session, 150.0);
        let order: Vec<String> = ids(&s).iter().map(|s| s.to_string()).collect();
        // The same total travel arriving again must not move anything.
        assert_eq!(e.drag_moved(&mut s, &mut session, 150.0), None);
        assert_eq!(
            ids(&s).iter().map(|s| s.to_string()).collect::<Vec<String>>(),
            order
        );
    }

    #[test]
    fn hover_is_none_at_origin_slot() {
        let mut s = seq(&["a", "b", "c"]);
        let mut session = DragSession::new(1);
        let e = engine();

        e.drag_moved(&mut s, &mut session, 10.0);
        assert_eq!(session.hover_index, None);

        e.drag_moved(&mut s, &mut session, 90.0);
        assert_eq!(session.hover_index, Some(2));

        e.drag_moved(&mut s, &mut session, 0.0);
        assert_eq!(session.hover_index, None);
    }

    #[test]
    fn slot_offset_stays_small_during_long_drag() {
        // The dragged item's slot-relative translation stays within one
        // slot height as it relocates under a continuous drag.
        let mut s = seq(&["a", "b", "c", "d", "e", "f"]);
        let mut session = DragSession::new(0);
        let e = engine();

        let mut offset = 0.0;
        while offset < 480.0 {
            offset += 15.0;
            e.drag_moved(&mut s, &mut session, offset);
            assert!(
                session.slot_offset(100.0).abs() <= 60.0,
                "slot offset {} at travel {offset}",
                session.slot_offset(100.0)
            );
        }
        assert_eq!(session.dragged_index, 5);
    }

    // --- Property tests ---

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Arbitrary move-event sequences preserve the id set exactly.
            #[test]
            fn uniqueness_under_arbitrary_moves(
                origin in 0usize..6,
                offsets in prop::collection::vec(-800.0f32..800.0, 1..60),
            ) {
                let mut s = seq(&["a", "b", "c", "d", "e", "f"]);
                let mut session = DragSession::new(origin);
                let e = ReorderEngine::new(100.0);

                for offset in offsets {
                    e.drag_moved(&mut s, &mut session, offset);
                    let mut sorted: Vec<ItemId> = s.id_order();
                    sorted.sort();
                    sorted.dedup();
                    prop_assert_eq!(sorted.len(), 6);
                    prop_assert!(session.dragged_index < 6);
                }
            }

            /// The dragged item is always found at `session.dragged_index`.
            #[test]
            fn dragged_index_tracks_item(
                offsets in prop::collection::vec(-500.0f32..500.0, 1..40),
            ) {
                let mut s = seq(&["a", "b", "c", "d"]);
                let mut session = DragSession::new(2);
                let dragged: ItemId = "c".into();
                let e = ReorderEngine::new(100.0);

                for offset in offsets {
                    e.drag_moved(&mut s, &mut session, offset);
                    prop_assert_eq!(s.index_of(&dragged), Some(session.dragged_index));
                }
            }
        }
    }
}
