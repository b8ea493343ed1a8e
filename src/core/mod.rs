//! Pure core of the store.
//!
//! This module contains the side-effect free building blocks:
//! - The dynamic value model snapshots are made of
//! - Dotted paths for reading and copy-on-write assignment
//! - Structural diffing between snapshots
//! - The bounded, branch-truncating history
//!
//! Nothing in here notifies, logs or holds shared mutable state.

mod diff;
mod history;
mod path;
mod value;

pub use diff::{diff, diff_at, Change, ChangeKind};
pub use history::{History, HistoryError, DEFAULT_MAX_HISTORY_LENGTH};
pub use path::Path;
pub use value::{NotAnObject, Object, Snapshot, Value};
