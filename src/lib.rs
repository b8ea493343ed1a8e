//! Recall: an observable state container with undo/redo history.
//!
//! A [`Store`] holds one immutable [`Snapshot`] of an object-shaped state.
//! Every update produces a new snapshot that shares unchanged subtrees with
//! the previous one, records it in a bounded [`History`], computes the
//! structural [`diff`] between the two and synchronously notifies every
//! subscriber.
//!
//! # Core Concepts
//!
//! - **Snapshot**: Immutable object-shaped state, cheap to clone
//! - **Update**: Either a shallow merge or a function of the previous state
//! - **History**: Bounded, branch-truncating timeline driving undo/redo
//! - **Change**: One added, updated or removed path between two snapshots
//!
//! The pure building blocks live in [`core`]; [`store`] wires them to
//! subscribers and shared mutable state.
//!
//! # Example
//!
//! ```rust
//! use recall::{Snapshot, Store, Value};
//! use serde_json::json;
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let store = Store::new(Snapshot::try_from(json!({"user": {"name": "Ada"}, "count": 0})).unwrap());
//!
//! let seen = Rc::new(Cell::new(0));
//! let counter = Rc::clone(&seen);
//! let subscription = store.subscribe(move |_| {
//!     counter.set(counter.get() + 1);
//!     Ok(())
//! });
//!
//! let result = store.patch("user.name", "Grace").unwrap();
//! assert_eq!(result.changes.len(), 1);
//! assert_eq!(store.select("user.name"), Some(Value::from("Grace")));
//!
//! store.undo().unwrap();
//! assert_eq!(store.select("user.name"), Some(Value::from("Ada")));
//! assert_eq!(seen.get(), 2);
//!
//! subscription.unsubscribe();
//! ```

pub mod builder;
pub mod checkpoint;
pub mod config;
pub mod core;
pub mod error;
pub mod logging;
pub mod store;

// Re-export commonly used types
pub use builder::{BuildError, StoreBuilder};
pub use checkpoint::{Checkpoint, CheckpointError};
pub use config::StoreConfig;
pub use core::{diff, Change, ChangeKind, History, Object, Path, Snapshot, Value};
pub use error::StoreError;
pub use store::{
    create_store, Store, SubscriberResult, Subscription, SubscriptionId, Update, UpdateResult,
    WeakStore,
};
