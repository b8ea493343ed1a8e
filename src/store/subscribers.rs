//! Ordered registry of change callbacks.

use crate::core::Snapshot;
use crate::error::StoreError;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Error a subscriber may return; any error type converts into it with `?`.
pub type SubscriberError = Box<dyn std::error::Error>;

/// Outcome of one subscriber invocation.
pub type SubscriberResult = Result<(), SubscriberError>;

/// A shared change callback. Identity is the `Rc` allocation.
pub type Subscriber = Rc<dyn Fn(&Snapshot) -> SubscriberResult>;

/// Handle identifying one registered callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Counts from one notification pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NotifyReport {
    pub delivered: usize,
    pub failed: usize,
}

#[derive(Default)]
struct Entries {
    list: Vec<(SubscriptionId, Subscriber)>,
    next_id: u64,
}

/// Subscribers in insertion order, deduplicated by callback identity.
///
/// The internal borrow is never held while a callback runs, so callbacks may
/// subscribe, unsubscribe or trigger a nested notification pass.
#[derive(Default)]
pub struct SubscriberRegistry {
    inner: RefCell<Entries>,
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback`. Registering the same `Rc` again returns the id it
    /// already has.
    pub fn add(&self, callback: Subscriber) -> SubscriptionId {
        let mut inner = self.inner.borrow_mut();
        if let Some((id, _)) = inner.list.iter().find(|(_, cb)| Rc::ptr_eq(cb, &callback)) {
            return *id;
        }
        let id = SubscriptionId(inner.next_id);
        inner.next_id += 1;
        inner.list.push((id, callback));
        id
    }

    /// Remove a callback. Unknown ids are a logged no-op.
    pub fn remove(&self, id: SubscriptionId) -> bool {
        let mut inner = self.inner.borrow_mut();
        match inner.list.iter().position(|(existing, _)| *existing == id) {
            Some(position) => {
                inner.list.remove(position);
                true
            }
            None => {
                tracing::warn!(
                    component = "store",
                    op = "unsubscribe",
                    event = "not_found",
                    subscriber = %id,
                    "callback has already been removed or was never registered"
                );
                false
            }
        }
    }

    pub fn contains(&self, id: SubscriptionId) -> bool {
        self.inner
            .borrow()
            .list
            .iter()
            .any(|(existing, _)| *existing == id)
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Call every subscriber, in insertion order, with the snapshot `current`
    /// returns at the moment that subscriber is called. An earlier callback
    /// that updates the store is therefore visible to the later ones.
    ///
    /// The pass works on the subscribers registered when it starts. One that
    /// is removed mid-pass is skipped; one added mid-pass waits for the next
    /// pass. A failing callback is logged and the pass moves on.
    pub fn notify_all<F>(&self, current: F) -> NotifyReport
    where
        F: Fn() -> Snapshot,
    {
        let pass = self.inner.borrow().list.clone();
        let mut report = NotifyReport::default();

        for (id, callback) in pass {
            if !self.contains(id) {
                continue;
            }
            match callback(&current()) {
                Ok(()) => report.delivered += 1,
                Err(err) => {
                    report.failed += 1;
                    let failure = StoreError::SubscriberFailure {
                        id,
                        message: err.to_string(),
                    };
                    tracing::error!(
                        component = "store",
                        op = "notify",
                        event = "subscriber_failure",
                        subscriber = %id,
                        error = %failure,
                    );
                }
            }
        }

        report
    }
}

impl fmt::Debug for SubscriberRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ids: Vec<SubscriptionId> = self.inner.borrow().list.iter().map(|(id, _)| *id).collect();
        f.debug_struct("SubscriberRegistry")
            .field("subscribers", &ids)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn counter() -> (Rc<Cell<usize>>, Subscriber) {
        let calls = Rc::new(Cell::new(0));
        let seen = Rc::clone(&calls);
        let subscriber: Subscriber = Rc::new(move |_: &Snapshot| -> SubscriberResult {
            seen.set(seen.get() + 1);
            Ok(())
        });
        (calls, subscriber)
    }

    #[test]
    fn notifies_in_insertion_order() {
        let registry = SubscriberRegistry::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        for label in ["first", "second", "third"] {
            let order = Rc::clone(&order);
            registry.add(Rc::new(move |_: &Snapshot| -> SubscriberResult {
                order.borrow_mut().push(label);
                Ok(())
            }));
        }

        let report = registry.notify_all(Snapshot::new);
        assert_eq!(report.delivered, 3);
        assert_eq!(*order.borrow(), vec!["first", "second", "third"]);
    }

    #[test]
    fn same_callback_is_registered_once() {
        let registry = SubscriberRegistry::new();
        let (calls, subscriber) = counter();

        let first = registry.add(Rc::clone(&subscriber));
        let second = registry.add(subscriber);

        assert_eq!(first, second);
        assert_eq!(registry.len(), 1);
        registry.notify_all(Snapshot::new);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn removed_callback_is_not_called() {
        let registry = SubscriberRegistry::new();
        let (calls, subscriber) = counter();
        let id = registry.add(subscriber);

        assert!(registry.remove(id));
        registry.notify_all(Snapshot::new);

        assert_eq!(calls.get(), 0);
        assert!(registry.is_empty());
    }

    #[test]
    fn removing_unknown_id_is_a_no_op() {
        let registry = SubscriberRegistry::new();
        let (_, subscriber) = counter();
        let id = registry.add(subscriber);

        assert!(registry.remove(id));
        assert!(!registry.remove(id));
    }

    #[test]
    fn failure_does_not_stop_the_pass() {
        let registry = SubscriberRegistry::new();
        registry.add(Rc::new(|_: &Snapshot| -> SubscriberResult { Err("boom".into()) }));
        let (calls, subscriber) = counter();
        registry.add(subscriber);

        let report = registry.notify_all(Snapshot::new);

        assert_eq!(report, NotifyReport { delivered: 1, failed: 1 });
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn callback_removed_mid_pass_is_skipped() {
        let registry = Rc::new(SubscriberRegistry::new());
        let (calls, victim) = counter();
        let victim_id = Rc::new(Cell::new(None));

        let handle = Rc::clone(&registry);
        let target = Rc::clone(&victim_id);
        registry.add(Rc::new(move |_: &Snapshot| -> SubscriberResult {
            if let Some(id) = target.get() {
                handle.remove(id);
            }
            Ok(())
        }));
        victim_id.set(Some(registry.add(victim)));

        let report = registry.notify_all(Snapshot::new);

        assert_eq!(report.delivered, 1);
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn callback_added_mid_pass_waits_for_next_pass() {
        let registry = Rc::new(SubscriberRegistry::new());
        let (calls, late) = counter();

        let handle = Rc::clone(&registry);
        registry.add(Rc::new(move |_: &Snapshot| -> SubscriberResult {
            handle.add(Rc::clone(&late));
            Ok(())
        }));

        registry.notify_all(Snapshot::new);
        assert_eq!(calls.get(), 0);

        registry.notify_all(Snapshot::new);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn each_callback_reads_state_when_called() {
        let registry = SubscriberRegistry::new();
        let live = Rc::new(RefCell::new(Snapshot::new()));
        let seen = Rc::new(RefCell::new(Vec::new()));

        let writer = Rc::clone(&live);
        registry.add(Rc::new(move |_: &Snapshot| -> SubscriberResult {
            *writer.borrow_mut() = Snapshot::from_object([("step", 1)].into_iter().collect());
            Ok(())
        }));
        let log = Rc::clone(&seen);
        registry.add(Rc::new(move |state: &Snapshot| -> SubscriberResult {
            log.borrow_mut().push(state.len());
            Ok(())
        }));

        registry.notify_all(|| live.borrow().clone());

        assert_eq!(*seen.borrow(), vec![1]);
    }

    #[test]
    fn subscription_id_displays_with_hash() {
        assert_eq!(SubscriptionId(7).to_string(), "#7");
    }
}
