#![forbid(unsafe_code)]

//! Items, stable identifiers, and the ordered sequence.
//!
//! [`OrderedSequence`] is the single in-memory order every component reads
//! and the reorder engine alone mutates. It upholds one invariant at all
//! times: **identifiers are unique** — no id appears twice and no id is
//! silently dropped by a reorder mutation.

use std::fmt;

use crate::error::ListError;

// ---------------------------------------------------------------------------
// ItemId
// ---------------------------------------------------------------------------

/// Stable string identifier for a list item, supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "state-persistence",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct ItemId(String);

impl ItemId {
    /// Create an identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ItemId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

// ---------------------------------------------------------------------------
// Item
// ---------------------------------------------------------------------------

/// An opaque payload with a stable identifier.
///
/// The core never inspects the payload; it travels with the id through
/// reorder mutations and back out to the renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item<T> {
    pub id: ItemId,
    pub payload: T,
}

impl<T> Item<T> {
    /// Create an item.
    #[must_use]
    pub fn new(id: impl Into<ItemId>, payload: T) -> Self {
        Self {
            id: id.into(),
            payload,
        }
    }
}

// ---------------------------------------------------------------------------
// OrderEntry
// ---------------------------------------------------------------------------

/// One `(identifier, position)` pair of a flattened full-order commit.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "state-persistence",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct OrderEntry {
    pub id: ItemId,
    pub position: usize,
}

// ---------------------------------------------------------------------------
// OrderedSequence
// ---------------------------------------------------------------------------

/// The ordered list of items, index `0..n-1`.
///
/// Position is meaningful and preserved on every mutation except reordering
/// itself. Mutation goes through [`relocate`](Self::relocate) and
/// [`restore_order`](Self::restore_order) only, both of which preserve the
/// id-uniqueness invariant structurally (they permute, never insert or
/// drop).
#[derive(Debug, Clone, Default)]
pub struct OrderedSequence<T> {
    items: Vec<Item<T>>,
}

impl<T> OrderedSequence<T> {
    /// Build a sequence, rejecting duplicate identifiers.
    pub fn new(items: Vec<Item<T>>) -> Result<Self, ListError> {
        for (i, item) in items.iter().enumerate() {
            if items[..i].iter().any(|prev| prev.id == item.id) {
                return Err(ListError::DuplicateId(item.id.clone()));
            }
        }
        Ok(Self { items })
    }

    /// Number of items.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the sequence is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The item at `index`, if in bounds.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Item<T>> {
        self.items.get(index)
    }

    /// Current index of the item with the given id.
    #[must_use]
    pub fn index_of(&self, id: &ItemId) -> Option<usize> {
        self.items.iter().position(|item| &item.id == id)
    }

    /// Iterate items in order.
    pub fn iter(&self) -> impl Iterator<Item = &Item<T>> {
        self.items.iter()
    }

    /// Snapshot of the identifier sequence.
    #[must_use]
    pub fn id_order(&self) -> Vec<ItemId> {
        self.items.iter().map(|item| item.id.clone()).collect()
    }

    /// Flattened `(id, position)` pairs covering the entire sequence.
    #[must_use]
    pub fn positions(&self) -> Vec<OrderEntry> {
        self.items
            .iter()
            .enumerate()
            .map(|(position, item)| OrderEntry {
                id: item.id.clone(),
                position,
            })
            .collect()
    }

    /// Move the item at `from` so it occupies `to`, shifting the items in
    /// between by one slot. Out-of-range indices are clamped.
    pub fn relocate(&mut self, from: usize, to: usize) {
        if self.items.is_empty() {
            return;
        }
        let last = self.items.len() - 1;
        let (from, to) = (from.min(last), to.min(last));
        if from == to {
            return;
        }
        let item = self.items.remove(from);
        self.items.insert(to, item);
    }

    /// Permute the sequence to match `order`.
    ///
    /// `order` must be exactly a permutation of the ids currently present.
    /// Used by cancel and rollback; payloads stay attached to their ids. A
    /// rejected restore leaves the sequence untouched.
    pub fn restore_order(&mut self, order: &[ItemId]) -> Result<(), ListError> {
        if order.len() != self.items.len() {
            return Err(ListError::OrderMismatch);
        }
        // Validate before touching anything: every id must be present, none
        // twice.
        let mut seen = std::collections::BTreeSet::new();
        for id in order {
            if self.index_of(id).is_none() || !seen.insert(id) {
                return Err(ListError::OrderMismatch);
            }
        }

        let mut pool: Vec<Option<Item<T>>> = self.items.drain(..).map(Some).collect();
        let mut reordered = Vec::with_capacity(order.len());
        for id in order {
            let taken = pool
                .iter_mut()
                .find_map(|slot| slot.take_if(|item| &item.id == id));
            if let Some(item) = taken {
                reordered.push(item);
            }
        }
        debug_assert_eq!(reordered.len(), order.len(), "validated permutation");
        self.items = reordered;
        Ok(())
    }
}

impl<T> IntoIterator for OrderedSequence<T> {
    type Item = Item<T>;
    type IntoIter = std::vec::IntoIter<Item<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

// ---------------------------------------------------------------------------
// OrderSource
// ---------------------------------------------------------------------------

/// The data-source seam: a synchronous snapshot of the external order.
///
/// The orchestrator pulls a snapshot on construction and again whenever the
/// caller's change notification fires (see
/// [`ListOrchestrator::reconcile`](crate::orchestrator::ListOrchestrator::reconcile)).
pub trait OrderSource<T> {
    /// The current externally-ordered items.
    fn ordered_items(&self) -> Vec<Item<T>>;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
