//! Checkpoint and resume for stores.
//!
//! A checkpoint captures everything needed to rebuild a store: the history
//! timeline, its cursor, the live snapshot and the configuration. Subscribers
//! are not captured (callbacks are not serializable).
//!
//! Checkpoints are values; writing them anywhere is left to the caller. JSON
//! is readable and keeps the natural shape of the state, binary is compact.
//!
//! # Example
//!
//! ```rust
//! use recall::checkpoint::Checkpoint;
//! use recall::{Snapshot, Store};
//! use serde_json::json;
//!
//! let store = Store::new(Snapshot::try_from(json!({"theme": "light"})).unwrap());
//! store.patch("theme", "dark").unwrap();
//!
//! let json = store.checkpoint().to_json().unwrap();
//! let resumed = Store::resume(Checkpoint::from_json(&json).unwrap()).unwrap();
//!
//! assert_eq!(resumed.get_state(), store.get_state());
//! resumed.undo().unwrap();
//! assert_eq!(resumed.select("theme").unwrap().as_str(), Some("light"));
//! ```

pub mod error;
mod wire;

pub use error::CheckpointError;

use crate::config::StoreConfig;
use crate::core::{History, Snapshot};
use crate::store::Store;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use wire::WireCheckpoint;

/// Version identifier for checkpoint format
pub const CHECKPOINT_VERSION: u32 = 1;

/// Serializable capture of a store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Checkpoint {
    /// Checkpoint format version
    pub version: u32,

    /// Unique checkpoint identifier
    pub id: Uuid,

    /// When checkpoint was created
    pub timestamp: DateTime<Utc>,

    /// Configuration the store was running with
    pub config: StoreConfig,

    /// History entries, oldest first
    pub history: Vec<Snapshot>,

    /// Position of the history cursor
    pub history_index: usize,

    /// Live snapshot; differs from the entry under the cursor after `reset`
    pub current_state: Snapshot,
}

impl Checkpoint {
    /// Capture the current timeline of `store`.
    pub fn capture(store: &Store) -> Self {
        Self {
            version: CHECKPOINT_VERSION,
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            config: store.config().clone(),
            history: store.history(),
            history_index: store.history_index(),
            current_state: store.get_state(),
        }
    }

    pub fn to_json(&self) -> Result<String, CheckpointError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| CheckpointError::SerializationFailed(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, CheckpointError> {
        let checkpoint: Checkpoint = serde_json::from_str(json)
            .map_err(|e| CheckpointError::DeserializationFailed(e.to_string()))?;
        check_version(checkpoint.version)?;
        Ok(checkpoint)
    }

    pub fn to_binary(&self) -> Result<Vec<u8>, CheckpointError> {
        bincode::serialize(&WireCheckpoint::from(self))
            .map_err(|e| CheckpointError::SerializationFailed(e.to_string()))
    }

    pub fn from_binary(bytes: &[u8]) -> Result<Self, CheckpointError> {
        let wire: WireCheckpoint = bincode::deserialize(bytes)
            .map_err(|e| CheckpointError::DeserializationFailed(e.to_string()))?;
        check_version(wire.version())?;
        Ok(wire.into())
    }
}

fn check_version(found: u32) -> Result<(), CheckpointError> {
    if found != CHECKPOINT_VERSION {
        return Err(CheckpointError::UnsupportedVersion {
            found,
            supported: CHECKPOINT_VERSION,
        });
    }
    Ok(())
}

impl Store {
    /// Capture this store as a [`Checkpoint`].
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint::capture(self)
    }

    /// Rebuild a store from a checkpoint. The new store has no subscribers.
    pub fn resume(checkpoint: Checkpoint) -> Result<Store, CheckpointError> {
        check_version(checkpoint.version)?;

        let violations = checkpoint.config.violations();
        if !violations.is_empty() {
            return Err(CheckpointError::InvalidConfig(violations));
        }

        let history = History::from_parts(
            checkpoint.history,
            checkpoint.history_index,
            checkpoint.config.max_history_length,
        )?;

        let store = Store::from_parts(checkpoint.current_state, history, checkpoint.config);

        tracing::debug!(
            component = "checkpoint",
            op = "resume",
            event = "resumed",
            checkpoint = %checkpoint.id,
            history_len = store.history_len(),
        );
        Ok(store)
    }
}
