//! Structural diff between two snapshots.

use super::path::Path;
use super::value::{Object, Snapshot, Value};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Kind of a [`Change`], without its payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Added,
    Updated,
    Removed,
}

/// One structural difference between two snapshots.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum Change {
    /// Key present in the next snapshot only.
    Added { path: Path, value: Value },
    /// Key present in both with a different value.
    Updated {
        path: Path,
        old_value: Value,
        new_value: Value,
    },
    /// Key present in the previous snapshot only.
    Removed { path: Path, value: Value },
}

impl Change {
    pub fn kind(&self) -> ChangeKind {
        match self {
            Self::Added { .. } => ChangeKind::Added,
            Self::Updated { .. } => ChangeKind::Updated,
            Self::Removed { .. } => ChangeKind::Removed,
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::Added { path, .. } | Self::Updated { path, .. } | Self::Removed { path, .. } => {
                path
            }
        }
    }
}

/// Compute the changes that turn `prev` into `next`.
///
/// Keys of `next` are visited in its order, recursing into values that are
/// objects on both sides; removals follow in `prev`'s order. Values are
/// compared by identity (see [`Value::same`]), so arrays are opaque: a rebuilt
/// array is reported as updated even when its elements are equal.
///
/// ```rust
/// use recall::{diff, Change, Snapshot};
/// use serde_json::json;
///
/// let prev = Snapshot::try_from(json!({"a": 1})).unwrap();
/// let next = Snapshot::try_from(json!({"a": 1, "b": 2})).unwrap();
///
/// let changes = diff(&prev, &next);
/// assert_eq!(changes.len(), 1);
/// assert!(matches!(&changes[0], Change::Added { path, .. } if path.to_string() == "b"));
/// ```
pub fn diff(prev: &Snapshot, next: &Snapshot) -> Vec<Change> {
    let mut changes = Vec::new();
    if !Snapshot::ptr_eq(prev, next) {
        diff_objects(prev.as_object(), next.as_object(), &Path::root(), &mut changes);
    }
    changes
}

/// Like [`diff`], with every change path nested under `prefix`.
pub fn diff_at(prev: &Object, next: &Object, prefix: &Path) -> Vec<Change> {
    let mut changes = Vec::new();
    diff_objects(prev, next, prefix, &mut changes);
    changes
}

fn diff_objects(prev: &Object, next: &Object, prefix: &Path, changes: &mut Vec<Change>) {
    for (key, next_value) in next.iter() {
        let path = prefix.child(key);
        let Some(prev_value) = prev.get(key) else {
            changes.push(Change::Added {
                path,
                value: next_value.clone(),
            });
            continue;
        };

        match (prev_value, next_value) {
            (Value::Object(before), Value::Object(after)) => {
                if !Arc::ptr_eq(before, after) {
                    diff_objects(before, after, &path, changes);
                }
            }
            _ if !prev_value.same(next_value) => changes.push(Change::Updated {
                path,
                old_value: prev_value.clone(),
                new_value: next_value.clone(),
            }),
            _ => {}
        }
    }

    for (key, prev_value) in prev.iter() {
        if !next.contains_key(key) {
            changes.push(Change::Removed {
                path: prefix.child(key),
                value: prev_value.clone(),
            });
        }
    }
}
