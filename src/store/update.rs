//! Update requests and their results.

use crate::core::{Change, Object, Snapshot, Value};
use crate::error::StoreError;
use serde::Serialize;
use std::fmt;

/// A requested change to the state.
///
/// The two forms are asymmetric: a merge keeps every key of the
/// previous snapshot it does not mention, a replacement keeps nothing the
/// function does not return.
pub enum Update<'a> {
    /// Shallow-merge the object's top-level keys over the previous snapshot.
    Merge(Value),
    /// Replace the snapshot with the function's return value.
    Replace(Box<dyn FnOnce(&Snapshot) -> Value + 'a>),
}

impl<'a> Update<'a> {
    /// Merge `partial` over the current state. It must be an object.
    pub fn merge(partial: impl Into<Value>) -> Self {
        Update::Merge(partial.into())
    }

    /// Replace the state with whatever `f` builds from it.
    pub fn replace<F>(f: F) -> Self
    where
        F: FnOnce(&Snapshot) -> Snapshot + 'a,
    {
        Update::Replace(Box::new(move |previous| f(previous).into()))
    }

    /// Replace the state with a dynamically built value. Returning anything
    /// other than an object rejects the update.
    pub fn replace_value<F>(f: F) -> Self
    where
        F: FnOnce(&Snapshot) -> Value + 'a,
    {
        Update::Replace(Box::new(f))
    }

    /// Compute the next snapshot without touching any store.
    pub fn apply(self, previous: &Snapshot) -> Result<Snapshot, StoreError> {
        match self {
            Update::Merge(Value::Object(partial)) => Ok(previous.merged(&partial)),
            Update::Merge(other) => Err(StoreError::invalid_argument(format!(
                "set_state must receive an object or a function, got {}",
                other.kind_name()
            ))),
            Update::Replace(f) => Ok(Snapshot::try_from(f(previous))?),
        }
    }
}

impl fmt::Debug for Update<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Update::Merge(partial) => f.debug_tuple("Merge").field(partial).finish(),
            Update::Replace(_) => f.write_str("Replace(..)"),
        }
    }
}

impl From<Snapshot> for Update<'_> {
    fn from(partial: Snapshot) -> Self {
        Update::Merge(partial.into())
    }
}

impl From<Object> for Update<'_> {
    fn from(partial: Object) -> Self {
        Update::Merge(partial.into())
    }
}

/// Outcome of a successful update.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResult {
    /// Snapshot the update was applied to
    pub previous_state: Snapshot,
    /// Snapshot the update committed
    pub current_state: Snapshot,
    /// Structural changes from `previous_state` to `current_state`
    pub changes: Vec<Change>,
}

impl UpdateResult {
    pub fn has_changes(&self) -> bool {
        !self.changes.is_empty()
    }
}
