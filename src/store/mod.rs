//! The observable store and its handles.
//!
//! [`Store`] is a cheap, cloneable handle over one state container. Every
//! clone drives the same state; independent stores share nothing.
//!
//! # Reentrancy
//!
//! Subscribers run synchronously inside the update that triggered them and
//! may update the same store. The nested update runs its full
//! commit/diff/notify cycle before the outer pass moves on to its next
//! subscriber. Nesting is bounded by
//! [`StoreConfig::max_reentrancy_depth`]: a mutation nested deeper fails with
//! [`StoreError::ReentrancyLimit`] and leaves the state untouched. A
//! subscriber that unconditionally updates on every notification therefore
//! hits that limit rather than overflowing the stack.
//!
//! A subscriber that captures a `Store` clone keeps the store alive through
//! its own registration; capture a [`WeakStore`] to avoid the cycle.
//!
//! # Example
//!
//! ```rust
//! use recall::{Snapshot, Store, Value};
//! use serde_json::json;
//!
//! let store = Store::new(Snapshot::try_from(json!({"count": 0})).unwrap());
//!
//! for _ in 0..5 {
//!     store
//!         .update(|prev| {
//!             let count = prev.get("count").and_then(Value::as_i64).unwrap_or(0);
//!             prev.merged(&[("count", count + 1)].into_iter().collect())
//!         })
//!         .unwrap();
//! }
//! assert_eq!(store.select("count"), Some(Value::from(5)));
//!
//! store.undo().unwrap();
//! assert_eq!(store.select("count"), Some(Value::from(4)));
//! ```

mod container;
mod subscribers;
mod update;

pub use subscribers::{
    NotifyReport, Subscriber, SubscriberError, SubscriberRegistry, SubscriberResult,
    SubscriptionId,
};
pub use update::{Update, UpdateResult};

use crate::config::StoreConfig;
use crate::core::{History, Path, Snapshot, Value};
use crate::error::StoreError;
use container::StateContainer;
use std::fmt;
use std::rc::{Rc, Weak};

/// Handle to an observable state container.
#[derive(Clone)]
pub struct Store {
    container: Rc<StateContainer>,
}

/// Non-owning handle to a [`Store`].
#[derive(Clone)]
pub struct WeakStore {
    container: Weak<StateContainer>,
}

/// Returned by `subscribe`; removes the callback when asked.
#[derive(Clone, Debug)]
pub struct Subscription {
    id: SubscriptionId,
    container: Weak<StateContainer>,
}

/// Create a store from an initial snapshot and optional configuration.
///
/// Fails with [`StoreError::InvalidConfig`] listing every violation when the
/// configuration is invalid.
pub fn create_store(
    initial: Snapshot,
    config: Option<StoreConfig>,
) -> Result<Store, StoreError> {
    Store::with_config(initial, config.unwrap_or_default())
}

impl Store {
    /// Create a store with the default configuration.
    pub fn new(initial: Snapshot) -> Self {
        Self::assemble(initial, StoreConfig::default())
    }

    pub fn with_config(initial: Snapshot, config: StoreConfig) -> Result<Self, StoreError> {
        StateContainer::new(initial, config).map(Self::from_container)
    }

    /// Rebuild a store around an existing timeline and live snapshot. The
    /// configuration must already be validated.
    pub(crate) fn from_parts(state: Snapshot, history: History, config: StoreConfig) -> Self {
        Self::from_container(StateContainer::from_parts(state, history, config))
    }

    /// Build around a configuration the caller has already validated.
    pub(crate) fn assemble(initial: Snapshot, config: StoreConfig) -> Self {
        let history = History::new(initial.clone(), config.max_history_length);
        Self::from_parts(initial, history, config)
    }

    fn from_container(container: StateContainer) -> Self {
        Self {
            container: Rc::new(container),
        }
    }

    /// The current snapshot. Cloning is O(1); the value is shared, not copied.
    pub fn get_state(&self) -> Snapshot {
        self.container.get_state()
    }

    /// Apply an update, record it in history, diff it and notify subscribers.
    ///
    /// Rejected updates leave state, history and subscribers untouched.
    pub fn set_state(&self, update: Update<'_>) -> Result<UpdateResult, StoreError> {
        self.container.set_state(update)
    }

    /// Shallow-merge `partial` over the current state.
    pub fn merge(&self, partial: impl Into<Value>) -> Result<UpdateResult, StoreError> {
        self.set_state(Update::merge(partial))
    }

    /// Replace the state with what `f` builds from it.
    pub fn update<F>(&self, f: F) -> Result<UpdateResult, StoreError>
    where
        F: FnOnce(&Snapshot) -> Snapshot,
    {
        self.set_state(Update::replace(f))
    }

    /// Register a callback invoked with every committed snapshot.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&Snapshot) -> SubscriberResult + 'static,
    {
        self.subscribe_shared(Rc::new(callback))
    }

    /// Register a shared callback. Registering the same `Rc` twice returns a
    /// subscription to the single existing registration.
    pub fn subscribe_shared(&self, callback: Subscriber) -> Subscription {
        let id = self.container.subscribe(callback);
        self.subscription(id)
    }

    /// Value at a dotted path, or `None` when any segment is missing or
    /// cannot be traversed.
    pub fn select(&self, path: &str) -> Option<Value> {
        self.select_path(&Path::parse(path))
    }

    pub fn select_path(&self, path: &Path) -> Option<Value> {
        self.container.select_path(path)
    }

    /// Set the value at a dotted path, copying only its ancestors.
    pub fn patch(&self, path: &str, value: impl Into<Value>) -> Result<UpdateResult, StoreError> {
        self.patch_path(&Path::parse(path), value)
    }

    pub fn patch_path(
        &self,
        path: &Path,
        value: impl Into<Value>,
    ) -> Result<UpdateResult, StoreError> {
        if path.is_root() {
            return Err(StoreError::invalid_argument("cannot patch the root path"));
        }
        self.container.patch(path, value.into())
    }

    /// Step back one history entry. Returns `false` when there is none.
    pub fn undo(&self) -> Result<bool, StoreError> {
        self.container.undo()
    }

    /// Step forward one history entry. Returns `false` when there is none.
    pub fn redo(&self) -> Result<bool, StoreError> {
        self.container.redo()
    }

    /// Restore the oldest retained history entry. The history itself is kept.
    pub fn reset(&self) -> Result<(), StoreError> {
        self.container.reset()
    }

    /// Call `callback(current, previous)` whenever the value at `path`
    /// changes identity between notifications.
    pub fn watch_value<F>(&self, path: &str, callback: F) -> Subscription
    where
        F: Fn(Option<&Value>, Option<&Value>) -> SubscriberResult + 'static,
    {
        let id = self.container.watch_value(Path::parse(path), callback);
        self.subscription(id)
    }

    pub fn config(&self) -> &StoreConfig {
        self.container.config()
    }

    pub fn history_len(&self) -> usize {
        self.container.history_len()
    }

    pub fn history_index(&self) -> usize {
        self.container.history_index()
    }

    pub fn can_undo(&self) -> bool {
        self.container.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.container.can_redo()
    }

    pub fn subscriber_count(&self) -> usize {
        self.container.subscriber_count()
    }

    /// Snapshots in the history, oldest first.
    pub fn history(&self) -> Vec<Snapshot> {
        self.container.history_entries()
    }

    pub fn downgrade(&self) -> WeakStore {
        WeakStore {
            container: Rc::downgrade(&self.container),
        }
    }

    fn subscription(&self, id: SubscriptionId) -> Subscription {
        Subscription {
            id,
            container: Rc::downgrade(&self.container),
        }
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("state", &self.get_state())
            .field("history_len", &self.history_len())
            .field("history_index", &self.history_index())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

impl WeakStore {
    /// The store, if any strong handle is still alive.
    pub fn upgrade(&self) -> Option<Store> {
        self.container
            .upgrade()
            .map(|container| Store { container })
    }
}

impl fmt::Debug for WeakStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakStore")
            .field("alive", &(self.container.strong_count() > 0))
            .finish()
    }
}

impl Subscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Remove the callback. Returns `false` (and logs a warning) when it was
    /// already removed; returns `false` silently when the store is gone.
    pub fn unsubscribe(&self) -> bool {
        self.container
            .upgrade()
            .is_some_and(|container| container.unsubscribe(self.id))
    }
}
