#![forbid(unsafe_code)]

//! Ordered-collection state controller.
//!
//! # Design
//!
//! [`ArrayState<T>`] owns one canonical sequence, stored as an immutable
//! [`Snapshot`] (`Rc<Vec<T>>`). A mutation never edits the snapshot in place:
//! it reads the current snapshot, builds a candidate `Vec`, decides whether
//! the candidate is a real change, and only then swaps in a fresh `Rc` and
//! notifies listeners. A no-op leaves the current `Rc` untouched, so
//! `Rc::ptr_eq` on two snapshots tells a host whether anything happened.
//!
//! # Change suppression
//!
//! | Operation                      | Suppressed when                          |
//! |--------------------------------|------------------------------------------|
//! | `push` / `unshift` / `insert`  | no items given                           |
//! | `pop` / `shift` / `clear`      | sequence already empty                   |
//! | `remove`                       | index out of range                       |
//! | `update` / `update_where`      | no target, or the value is equal         |
//! | `remove_where` / `filter`      | length unchanged                         |
//! | `reset` / `set_value` / `sort` | candidate equals current (`PartialEq`)   |
//! | `reverse`                      | length <= 1                              |
//!
//! # Invariants
//!
//! 1. `version` increments by exactly 1 per committed change.
//! 2. Every listener is invoked at most once per committed change, with the
//!    full new sequence.
//! 3. A suppressed operation changes neither the snapshot identity, the
//!    version, nor notifies anyone.
//! 4. The initial snapshot is an independent copy and never changes.
//!
//! # Failure Modes
//!
//! - **Panicking predicate or comparator**: the panic propagates. Candidates
//!   are built outside the canonical state, so the sequence, version and
//!   listeners are exactly as they were before the call.
//! - **Mutation from a predicate, comparator or map closure**: panics. This
//!   covers the query closures of `map`, `find` and `find_index` as well as
//!   the mutating operations; the iteration runs over a snapshot that the
//!   nested change would leave stale.
//! - **Mutation from a listener**: supported. The nested change commits
//!   immediately and notifies depth-first; listeners still pending from the
//!   outer change receive the outer snapshot.

use std::cell::{Cell, RefCell};
use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

#[cfg(feature = "tracing")]
use tracing::{debug, trace};

use crate::index::{slice_range, splice_index};
use crate::notify::{Listeners, Subscription};
use crate::options::ArrayStateOptions;

/// Immutable view of the sequence at one version.
pub type Snapshot<T> = Rc<Vec<T>>;

struct ArrayStateInner<T> {
    current: Snapshot<T>,
    initial: Snapshot<T>,
    version: u64,
    listeners: Listeners<T>,
}

struct Shared<T> {
    state: RefCell<ArrayStateInner<T>>,
    /// Depth of user closures currently computing a candidate.
    evaluating: Cell<u32>,
}

/// Marks a candidate computation; mutations are rejected while one is live.
struct EvalGuard<'a>(&'a Cell<u32>);

impl<'a> EvalGuard<'a> {
    fn enter(depth: &'a Cell<u32>) -> Self {
        depth.set(depth.get() + 1);
        Self(depth)
    }
}

impl Drop for EvalGuard<'_> {
    fn drop(&mut self) {
        self.0.set(self.0.get() - 1);
    }
}

/// A shared ordered sequence with structural mutations and change
/// notification.
///
/// Cloning an `ArrayState` creates another handle to the **same** sequence,
/// version and listeners.
///
/// # Example
///
/// ```
/// use ftui_array_state::ArrayState;
///
/// let stack = ArrayState::new(["React", "TypeScript", "Next.js"]);
/// stack.push(["Go"]);
/// stack.remove(1);
/// stack.sort();
/// assert_eq!(stack.to_vec(), ["Go", "Next.js", "React"]);
///
/// stack.reset();
/// assert_eq!(stack.to_vec(), ["React", "TypeScript", "Next.js"]);
/// ```
pub struct ArrayState<T> {
    shared: Rc<Shared<T>>,
}

impl<T> Clone for ArrayState<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Rc::clone(&self.shared),
        }
    }
}

impl<T: fmt::Debug + 'static> fmt::Debug for ArrayState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.state.borrow();
        f.debug_struct("ArrayState")
            .field("items", &state.current)
            .field("version", &state.version)
            .field("on_change", &state.listeners.has_on_change())
            .field("subscriber_count", &state.listeners.subscriber_count())
            .finish()
    }
}

impl<T: Clone + PartialEq + 'static> Default for ArrayState<T> {
    fn default() -> Self {
        Self::with_options(ArrayStateOptions::default())
    }
}

impl<T: Clone + PartialEq + 'static> From<Vec<T>> for ArrayState<T> {
    fn from(items: Vec<T>) -> Self {
        Self::with_options(ArrayStateOptions {
            initial_value: items,
            on_change: None,
        })
    }
}

impl<T: Clone + PartialEq + 'static> FromIterator<T> for ArrayState<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from(iter.into_iter().collect::<Vec<_>>())
    }
}

impl<T: Clone + PartialEq + 'static> ArrayState<T> {
    /// Create a controller holding `initial`, with no change hook.
    #[must_use]
    pub fn new(initial: impl IntoIterator<Item = T>) -> Self {
        Self::with_options(ArrayStateOptions::new().with_initial_value(initial))
    }

    /// Create a controller from explicit options.
    #[must_use]
    pub fn with_options(options: ArrayStateOptions<T>) -> Self {
        let ArrayStateOptions {
            initial_value,
            on_change,
        } = options;
        let initial = Rc::new(initial_value.clone());
        Self {
            shared: Rc::new(Shared {
                state: RefCell::new(ArrayStateInner {
                    current: Rc::new(initial_value),
                    initial,
                    version: 0,
                    listeners: Listeners::new(on_change),
                }),
                evaluating: Cell::new(0),
            }),
        }
    }

    // -----------------------------------------------------------------------
    // Snapshot access
    // -----------------------------------------------------------------------

    /// The current snapshot. Stays valid (and unchanged) after later
    /// mutations; compare with `Rc::ptr_eq` to detect commits.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot<T> {
        Rc::clone(&self.shared.state.borrow().current)
    }

    /// The frozen snapshot that [`reset`](Self::reset) restores.
    #[must_use]
    pub fn initial_value(&self) -> Snapshot<T> {
        Rc::clone(&self.shared.state.borrow().initial)
    }

    /// Copy of the current items.
    #[must_use]
    pub fn to_vec(&self) -> Vec<T> {
        self.snapshot().as_ref().clone()
    }

    /// Access the current items by reference without cloning them.
    ///
    /// The closure sees the snapshot taken at call time; it may call back
    /// into the controller.
    pub fn with<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        f(self.snapshot().as_slice())
    }

    /// Number of committed changes so far.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.shared.state.borrow().version
    }

    // -----------------------------------------------------------------------
    // Listeners
    // -----------------------------------------------------------------------

    /// Subscribe to committed changes. Subscribers run after the
    /// construction-time change hook, in registration order.
    pub fn subscribe(&self, callback: impl Fn(&[T]) + 'static) -> Subscription {
        self.shared.state.borrow_mut().listeners.subscribe(callback)
    }

    /// Registered subscribers, including dropped ones not yet pruned.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.shared.state.borrow().listeners.subscriber_count()
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Append items, preserving their order. No items is a no-op.
    pub fn push(&self, items: impl IntoIterator<Item = T>) -> bool {
        self.ensure_not_evaluating("push");
        let items: Vec<T> = items.into_iter().collect();
        if items.is_empty() {
            return self.skip("push", "no items");
        }
        let current = self.snapshot();
        let mut next = Vec::with_capacity(current.len() + items.len());
        next.extend_from_slice(&current);
        next.extend(items);
        self.commit("push", next)
    }

    /// Remove and return the last item. `None` (and no change) when empty.
    pub fn pop(&self) -> Option<T> {
        self.ensure_not_evaluating("pop");
        let current = self.snapshot();
        let Some((last, rest)) = current.split_last() else {
            self.skip("pop", "empty");
            return None;
        };
        let item = last.clone();
        self.commit("pop", rest.to_vec());
        Some(item)
    }

    /// Remove and return the first item. `None` (and no change) when empty.
    pub fn shift(&self) -> Option<T> {
        self.ensure_not_evaluating("shift");
        let current = self.snapshot();
        let Some((first, rest)) = current.split_first() else {
            self.skip("shift", "empty");
            return None;
        };
        let item = first.clone();
        self.commit("shift", rest.to_vec());
        Some(item)
    }

    /// Prepend items, preserving their order. No items is a no-op.
    pub fn unshift(&self, items: impl IntoIterator<Item = T>) -> bool {
        self.ensure_not_evaluating("unshift");
        let mut next: Vec<T> = items.into_iter().collect();
        if next.is_empty() {
            return self.skip("unshift", "no items");
        }
        next.extend_from_slice(&self.snapshot());
        self.commit("unshift", next)
    }

    /// Splice items in before position `index`.
    ///
    /// Negative indices count back from the end. Positions past either end
    /// clamp: `index >= len` appends and `index <= -len` prepends. No items
    /// is a no-op.
    pub fn insert(&self, index: isize, items: impl IntoIterator<Item = T>) -> bool {
        self.ensure_not_evaluating("insert");
        let items: Vec<T> = items.into_iter().collect();
        if items.is_empty() {
            return self.skip("insert", "no items");
        }
        let current = self.snapshot();
        let at = splice_index(index, current.len());
        let mut next = Vec::with_capacity(current.len() + items.len());
        next.extend_from_slice(&current[..at]);
        next.extend(items);
        next.extend_from_slice(&current[at..]);
        self.commit("insert", next)
    }

    /// Delete the item at `index`. Out of range is a no-op.
    pub fn remove(&self, index: usize) -> bool {
        self.ensure_not_evaluating("remove");
        let current = self.snapshot();
        if index >= current.len() {
            return self.skip("remove", "index out of range");
        }
        let mut next = Vec::with_capacity(current.len() - 1);
        next.extend_from_slice(&current[..index]);
        next.extend_from_slice(&current[index + 1..]);
        self.commit("remove", next)
    }

    /// Delete every item for which `predicate(item, index)` holds.
    pub fn remove_where(&self, mut predicate: impl FnMut(&T, usize) -> bool) -> bool {
        self.ensure_not_evaluating("remove_where");
        let current = self.snapshot();
        match self.retained(&current, |item, i| !predicate(item, i)) {
            Some(next) => self.commit("remove_where", next),
            None => self.skip("remove_where", "nothing matched"),
        }
    }

    /// Replace the item at `index`. Out of range or an equal value is a
    /// no-op.
    pub fn update(&self, index: usize, value: T) -> bool {
        self.ensure_not_evaluating("update");
        let current = self.snapshot();
        self.replace_at("update", &current, Some(index), value)
    }

    /// Replace the first item for which `predicate(item, index)` holds. No
    /// match or an equal value is a no-op.
    pub fn update_where(&self, mut predicate: impl FnMut(&T, usize) -> bool, value: T) -> bool {
        self.ensure_not_evaluating("update_where");
        let current = self.snapshot();
        let index = {
            let _eval = self.evaluating();
            current
                .iter()
                .enumerate()
                .position(|(i, item)| predicate(item, i))
        };
        self.replace_at("update_where", &current, index, value)
    }

    /// Empty the sequence. Already empty is a no-op.
    pub fn clear(&self) -> bool {
        self.ensure_not_evaluating("clear");
        if self.snapshot().is_empty() {
            return self.skip("clear", "empty");
        }
        self.commit("clear", Vec::new())
    }

    /// Restore the initial sequence. A no-op when the current sequence
    /// already equals it.
    pub fn reset(&self) -> bool {
        self.ensure_not_evaluating("reset");
        let (current, initial) = {
            let state = self.shared.state.borrow();
            (Rc::clone(&state.current), Rc::clone(&state.initial))
        };
        if current == initial {
            return self.skip("reset", "already initial");
        }
        #[cfg(feature = "tracing")]
        debug!(len = initial.len(), "array state: reset to initial value");
        self.commit("reset", initial.as_ref().clone())
    }

    /// Replace the whole sequence. A no-op when `items` equals the current
    /// sequence.
    pub fn set_value(&self, items: impl IntoIterator<Item = T>) -> bool {
        self.ensure_not_evaluating("set_value");
        let next: Vec<T> = items.into_iter().collect();
        if *self.snapshot() == next {
            return self.skip("set_value", "unchanged");
        }
        self.commit("set_value", next)
    }

    /// Keep only the items for which `predicate(item, index)` holds.
    ///
    /// Judged by length alone: if every item is kept, nothing is committed.
    pub fn filter(&self, predicate: impl FnMut(&T, usize) -> bool) -> bool {
        self.ensure_not_evaluating("filter");
        let current = self.snapshot();
        match self.retained(&current, predicate) {
            Some(next) => self.commit("filter", next),
            None => self.skip("filter", "everything kept"),
        }
    }

    /// Stable sort by the natural ordering of `T`.
    pub fn sort(&self) -> bool
    where
        T: Ord,
    {
        self.sort_with("sort", T::cmp)
    }

    /// Stable sort by `compare`. Equal-ranked items keep their relative
    /// order. A no-op when the sorted order equals the current one.
    pub fn sort_by(&self, compare: impl FnMut(&T, &T) -> Ordering) -> bool {
        self.sort_with("sort_by", compare)
    }

    /// Stable sort by a derived key.
    pub fn sort_by_key<K: Ord>(&self, mut key: impl FnMut(&T) -> K) -> bool {
        self.sort_with("sort_by_key", |a, b| key(a).cmp(&key(b)))
    }

    /// Reverse the order. Sequences of length <= 1 are left alone.
    pub fn reverse(&self) -> bool {
        self.ensure_not_evaluating("reverse");
        let current = self.snapshot();
        if current.len() <= 1 {
            return self.skip("reverse", "length <= 1");
        }
        self.commit("reverse", current.iter().rev().cloned().collect())
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Project every item through `transform(item, index)`.
    pub fn map<U>(&self, mut transform: impl FnMut(&T, usize) -> U) -> Vec<U> {
        let current = self.snapshot();
        let _eval = self.evaluating();
        current
            .iter()
            .enumerate()
            .map(|(i, item)| transform(item, i))
            .collect()
    }

    /// First item for which `predicate(item, index)` holds.
    pub fn find(&self, mut predicate: impl FnMut(&T, usize) -> bool) -> Option<T> {
        let current = self.snapshot();
        let _eval = self.evaluating();
        current
            .iter()
            .enumerate()
            .find(|&(i, item)| predicate(item, i))
            .map(|(_, item)| item.clone())
    }

    /// Index of the first item for which `predicate(item, index)` holds.
    pub fn find_index(&self, mut predicate: impl FnMut(&T, usize) -> bool) -> Option<usize> {
        let current = self.snapshot();
        let _eval = self.evaluating();
        current
            .iter()
            .enumerate()
            .position(|(i, item)| predicate(item, i))
    }

    /// Whether any item equals `value`.
    #[must_use]
    pub fn includes(&self, value: &T) -> bool {
        self.snapshot().contains(value)
    }

    /// Index of the first item equal to `value`.
    #[must_use]
    pub fn index_of(&self, value: &T) -> Option<usize> {
        self.snapshot().iter().position(|item| item == value)
    }

    /// Copy of the half-open range `start..end`.
    ///
    /// Negative bounds count back from the end, omitted bounds mean the
    /// respective end, and out-of-range bounds clamp. An inverted range
    /// yields an empty vector.
    #[must_use]
    pub fn slice(&self, start: Option<isize>, end: Option<isize>) -> Vec<T> {
        let current = self.snapshot();
        current[slice_range(start, end, current.len())].to_vec()
    }

    /// Item at `index`, if any.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<T> {
        self.snapshot().get(index).cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.shared.state.borrow().current.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn first(&self) -> Option<T> {
        self.snapshot().first().cloned()
    }

    #[must_use]
    pub fn last(&self) -> Option<T> {
        self.snapshot().last().cloned()
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn evaluating(&self) -> EvalGuard<'_> {
        EvalGuard::enter(&self.shared.evaluating)
    }

    fn ensure_not_evaluating(&self, op: &'static str) {
        assert!(
            self.shared.evaluating.get() == 0,
            "ArrayState::{op} called from inside a predicate or comparator"
        );
    }

    /// Items kept by `keep`, or `None` when every item is kept.
    fn retained(
        &self,
        current: &[T],
        mut keep: impl FnMut(&T, usize) -> bool,
    ) -> Option<Vec<T>> {
        let mask: Vec<bool> = {
            let _eval = self.evaluating();
            current
                .iter()
                .enumerate()
                .map(|(i, item)| keep(item, i))
                .collect()
        };
        if mask.iter().all(|&k| k) {
            return None;
        }
        Some(
            current
                .iter()
                .zip(mask)
                .filter_map(|(item, k)| k.then(|| item.clone()))
                .collect(),
        )
    }

    fn replace_at(&self, op: &'static str, current: &[T], index: Option<usize>, value: T) -> bool {
        let Some(index) = index.filter(|&i| i < current.len()) else {
            return self.skip(op, "no target");
        };
        if current[index] == value {
            return self.skip(op, "value unchanged");
        }
        let mut next = current.to_vec();
        next[index] = value;
        self.commit(op, next)
    }

    /// Sorts a permutation of indices so the comparator only ever sees the
    /// snapshot; items are cloned once the result is known to differ.
    fn sort_with(&self, op: &'static str, mut compare: impl FnMut(&T, &T) -> Ordering) -> bool {
        self.ensure_not_evaluating(op);
        let current = self.snapshot();
        let mut order: Vec<usize> = (0..current.len()).collect();
        {
            let _eval = self.evaluating();
            order.sort_by(|&a, &b| compare(&current[a], &current[b]));
        }
        let unchanged = order
            .iter()
            .enumerate()
            .all(|(pos, &src)| current[pos] == current[src]);
        if unchanged {
            return self.skip(op, "order unchanged");
        }
        self.commit(op, order.iter().map(|&i| current[i].clone()).collect())
    }

    /// Install `next` as the current snapshot and notify every listener.
    fn commit(&self, op: &'static str, next: Vec<T>) -> bool {
        let (snapshot, listeners) = {
            let mut state = self.shared.state.borrow_mut();
            let snapshot = Rc::new(next);
            state.current = Rc::clone(&snapshot);
            state.version += 1;

            #[cfg(feature = "tracing")]
            trace!(
                op,
                len = snapshot.len(),
                version = state.version,
                "array state: commit"
            );
            #[cfg(not(feature = "tracing"))]
            let _ = op;

            (snapshot, state.listeners.collect_live())
        };

        for listener in &listeners {
            listener(snapshot.as_slice());
        }
        true
    }

    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    fn skip(&self, op: &'static str, reason: &'static str) -> bool {
        #[cfg(feature = "tracing")]
        trace!(op, reason, version = self.version(), "array state: no-op");
        false
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
