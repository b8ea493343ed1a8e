//! The state container: one live snapshot, its history and its subscribers.

use crate::config::StoreConfig;
use crate::core::{diff, History, Path, Snapshot, Value};
use crate::error::StoreError;
use crate::store::subscribers::{
    NotifyReport, Subscriber, SubscriberRegistry, SubscriberResult, SubscriptionId,
};
use crate::store::update::{Update, UpdateResult};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Owns the live snapshot and drives history, diffing and notification.
///
/// Every operation takes `&self`: state lives behind `RefCell`s whose borrows
/// are released before any user code (update functions, subscribers) runs.
/// That is what lets a subscriber call back into the same container.
pub(crate) struct StateContainer {
    state: RefCell<Snapshot>,
    history: RefCell<History>,
    subscribers: SubscriberRegistry,
    config: StoreConfig,
    depth: Cell<usize>,
}

/// Marks one active notification pass for as long as it lives.
struct Pass<'a>(&'a Cell<usize>);

impl<'a> Pass<'a> {
    fn enter(depth: &'a Cell<usize>) -> Self {
        depth.set(depth.get() + 1);
        Pass(depth)
    }
}

impl Drop for Pass<'_> {
    fn drop(&mut self) {
        self.0.set(self.0.get().saturating_sub(1));
    }
}

impl StateContainer {
    /// Create a container after validating `config`.
    pub(crate) fn new(initial: Snapshot, config: StoreConfig) -> Result<Self, StoreError> {
        let violations = config.violations();
        if !violations.is_empty() {
            return Err(StoreError::InvalidConfig(violations));
        }
        let history = History::new(initial.clone(), config.max_history_length);
        Ok(Self::from_parts(initial, history, config))
    }

    /// Assemble a container from already validated parts.
    pub(crate) fn from_parts(state: Snapshot, history: History, config: StoreConfig) -> Self {
        if config.persist {
            tracing::warn!(
                component = "store",
                op = "create",
                event = "persist_unsupported",
                key = config.key.as_deref().unwrap_or_default(),
                "persistence is not wired to any storage; state stays in memory"
            );
        }
        tracing::debug!(
            component = "store",
            op = "create",
            event = "created",
            keys = state.len(),
            max_history_length = config.max_history_length,
        );
        Self {
            state: RefCell::new(state),
            history: RefCell::new(history),
            subscribers: SubscriberRegistry::new(),
            config,
            depth: Cell::new(0),
        }
    }

    pub(crate) fn get_state(&self) -> Snapshot {
        self.state.borrow().clone()
    }

    pub(crate) fn set_state(&self, update: Update<'_>) -> Result<UpdateResult, StoreError> {
        self.ensure_depth()?;

        let previous = self.get_state();
        let next = update.apply(&previous)?;

        *self.state.borrow_mut() = next.clone();
        let (history_len, history_index) = {
            let mut history = self.history.borrow_mut();
            history.push(next.clone());
            (history.len(), history.index())
        };

        let changes = diff(&previous, &next);
        tracing::debug!(
            component = "store",
            op = "set_state",
            event = "commit",
            changes = changes.len(),
            history_len,
            history_index,
            depth = self.depth.get(),
        );

        self.notify();

        Ok(UpdateResult {
            previous_state: previous,
            current_state: next,
            changes,
        })
    }

    pub(crate) fn select_path(&self, path: &Path) -> Option<Value> {
        path.lookup(&self.state.borrow()).cloned()
    }

    pub(crate) fn patch(&self, path: &Path, value: Value) -> Result<UpdateResult, StoreError> {
        self.set_state(Update::replace(move |previous| path.assign(previous, value)))
    }

    pub(crate) fn undo(&self) -> Result<bool, StoreError> {
        self.ensure_depth()?;
        let target = self.history.borrow_mut().undo().cloned();
        Ok(match target {
            Some(snapshot) => {
                self.replace_live(snapshot, "undo");
                true
            }
            None => false,
        })
    }

    pub(crate) fn redo(&self) -> Result<bool, StoreError> {
        self.ensure_depth()?;
        let target = self.history.borrow_mut().redo().cloned();
        Ok(match target {
            Some(snapshot) => {
                self.replace_live(snapshot, "redo");
                true
            }
            None => false,
        })
    }

    pub(crate) fn reset(&self) -> Result<(), StoreError> {
        self.ensure_depth()?;
        let first = self.history.borrow().first().clone();
        self.replace_live(first, "reset");
        Ok(())
    }

    pub(crate) fn subscribe(&self, callback: Subscriber) -> SubscriptionId {
        self.subscribers.add(callback)
    }

    pub(crate) fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.subscribers.remove(id)
    }

    /// Subscribe a callback that fires only when the value at `path` changes
    /// identity. The remembered value advances only after the callback
    /// succeeds.
    pub(crate) fn watch_value<F>(&self, path: Path, callback: F) -> SubscriptionId
    where
        F: Fn(Option<&Value>, Option<&Value>) -> SubscriberResult + 'static,
    {
        let previous = RefCell::new(self.select_path(&path));

        let watcher: Subscriber = Rc::new(move |snapshot: &Snapshot| -> SubscriberResult {
            let current = path.lookup(snapshot).cloned();
            let before = previous.borrow().clone();
            let changed = match (&current, &before) {
                (Some(now), Some(then)) => !now.same(then),
                (None, None) => false,
                _ => true,
            };
            if !changed {
                return Ok(());
            }
            callback(current.as_ref(), before.as_ref())?;
            *previous.borrow_mut() = current;
            Ok(())
        });

        self.subscribe(watcher)
    }

    pub(crate) fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    pub(crate) fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub(crate) fn history_len(&self) -> usize {
        self.history.borrow().len()
    }

    pub(crate) fn history_index(&self) -> usize {
        self.history.borrow().index()
    }

    pub(crate) fn can_undo(&self) -> bool {
        self.history.borrow().can_undo()
    }

    pub(crate) fn can_redo(&self) -> bool {
        self.history.borrow().can_redo()
    }

    pub(crate) fn history_entries(&self) -> Vec<Snapshot> {
        self.history.borrow().entries().cloned().collect()
    }

    fn replace_live(&self, snapshot: Snapshot, op: &'static str) {
        *self.state.borrow_mut() = snapshot;
        tracing::debug!(
            component = "store",
            op,
            event = "restore",
            history_index = self.history_index(),
            depth = self.depth.get(),
        );
        self.notify();
    }

    /// Fan out to subscribers, each reading the live state when called.
    fn notify(&self) -> NotifyReport {
        let _pass = Pass::enter(&self.depth);
        self.subscribers.notify_all(|| self.get_state())
    }

    /// Reject a mutation nested deeper than the configured limit.
    fn ensure_depth(&self) -> Result<(), StoreError> {
        let depth = self.depth.get();
        if depth > self.config.max_reentrancy_depth {
            tracing::warn!(
                component = "store",
                op = "update",
                event = "reentrancy_limit",
                depth,
                limit = self.config.max_reentrancy_depth,
            );
            return Err(StoreError::ReentrancyLimit {
                limit: self.config.max_reentrancy_depth,
            });
        }
        Ok(())
    }
}
