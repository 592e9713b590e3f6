#![forbid(unsafe_code)]

//! Change listeners for [`ArrayState`](crate::ArrayState).
//!
//! # Design
//!
//! A listener set holds at most one primary change hook (supplied at
//! construction and owned for the controller's lifetime) plus any number of
//! subscribers. Subscribers are stored as `Weak` callbacks; the strong `Rc`
//! lives inside the [`Subscription`] guard handed back to the caller, so
//! dropping the guard detaches the callback.
//!
//! # Invariants
//!
//! 1. The change hook runs before any subscriber.
//! 2. Subscribers run in registration order.
//! 3. Dead subscribers are pruned lazily, when the next notification
//!    collects the live set.
//! 4. Listeners are collected into an owned list before being invoked, so the
//!    controller holds no borrow while user code runs.

use std::rc::{Rc, Weak};

/// Callback invoked with the full sequence after a committed change.
pub type ChangeCallback<T> = Rc<dyn Fn(&[T])>;

type ListenerWeak<T> = Weak<dyn Fn(&[T])>;

/// Change hook plus weakly-held subscribers.
pub(crate) struct Listeners<T> {
    on_change: Option<ChangeCallback<T>>,
    subscribers: Vec<ListenerWeak<T>>,
}

impl<T: 'static> Listeners<T> {
    pub(crate) fn new(on_change: Option<ChangeCallback<T>>) -> Self {
        Self {
            on_change,
            subscribers: Vec::new(),
        }
    }

    /// Register a subscriber and hand back the guard that keeps it alive.
    pub(crate) fn subscribe(&mut self, callback: impl Fn(&[T]) + 'static) -> Subscription {
        let strong: ChangeCallback<T> = Rc::new(callback);
        self.subscribers.push(Rc::downgrade(&strong));
        Subscription {
            _guard: Box::new(strong),
        }
    }

    pub(crate) fn has_on_change(&self) -> bool {
        self.on_change.is_some()
    }

    /// Registered subscribers, including dead ones not yet pruned.
    pub(crate) fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Prune dead subscribers and return every live listener in call order.
    pub(crate) fn collect_live(&mut self) -> Vec<ChangeCallback<T>> {
        self.subscribers.retain(|w| w.strong_count() > 0);
        self.on_change
            .iter()
            .cloned()
            .chain(self.subscribers.iter().filter_map(|w| w.upgrade()))
            .collect()
    }
}

/// RAII guard for a subscriber registered with
/// [`ArrayState::subscribe`](crate::ArrayState::subscribe).
///
/// Dropping the guard drops the only strong reference to the callback; it is
/// never invoked again and its slot is pruned on the next notification.
#[must_use = "dropping the Subscription unsubscribes immediately"]
pub struct Subscription {
    _guard: Box<dyn std::any::Any>,
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn recorder(log: &Rc<RefCell<Vec<char>>>, tag: char) -> impl Fn(&[i32]) + 'static {
        let log = Rc::clone(log);
        move |_: &[i32]| log.borrow_mut().push(tag)
    }

    #[test]
    fn on_change_runs_first() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let hook: ChangeCallback<i32> = Rc::new(recorder(&log, 'H'));
        let mut listeners = Listeners::new(Some(hook));
        let _a = listeners.subscribe(recorder(&log, 'A'));
        let _b = listeners.subscribe(recorder(&log, 'B'));

        for cb in listeners.collect_live() {
            cb(&[1][..]);
        }
        assert_eq!(*log.borrow(), vec!['H', 'A', 'B']);
    }

    #[test]
    fn dropped_subscription_is_pruned_on_collect() {
        let mut listeners: Listeners<i32> = Listeners::new(None);
        let keep = listeners.subscribe(|_| {});
        let gone = listeners.subscribe(|_| {});
        assert_eq!(listeners.subscriber_count(), 2);

        drop(gone);
        assert_eq!(listeners.subscriber_count(), 2);

        let live = listeners.collect_live();
        assert_eq!(live.len(), 1);
        assert_eq!(listeners.subscriber_count(), 1);
        drop(keep);
    }

    #[test]
    fn no_hook_no_subscribers() {
        let mut listeners: Listeners<i32> = Listeners::new(None);
        assert!(!listeners.has_on_change());
        assert!(listeners.collect_live().is_empty());
    }

    #[test]
    fn subscription_debug() {
        let mut listeners: Listeners<i32> = Listeners::new(None);
        let sub = listeners.subscribe(|_| {});
        assert!(format!("{sub:?}").contains("Subscription"));
    }
}
