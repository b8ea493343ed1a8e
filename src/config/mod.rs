//! Store configuration.
//!
//! `StoreConfig` is plain serde data with every field defaulted, so it can be
//! loaded from any self-describing format. Validation uses Stillwater's
//! `Validation` type to accumulate ALL violations instead of stopping at the
//! first one.
//!
//! # Example
//!
//! ```rust
//! use recall::config::{ConfigViolation, StoreConfig};
//! use stillwater::validation::Validation;
//!
//! let config: StoreConfig = serde_json::from_str(r#"{"maxHistoryLength": 0, "key": ""}"#).unwrap();
//!
//! match config.validate() {
//!     Validation::Failure(violations) => assert_eq!(violations.len(), 2),
//!     Validation::Success(_) => panic!("expected violations"),
//! }
//! ```

mod violations;

pub use violations::ConfigViolation;

use crate::core::DEFAULT_MAX_HISTORY_LENGTH;
use serde::{Deserialize, Serialize};
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// Default limit on how deeply updates may nest inside notification passes.
pub const DEFAULT_MAX_REENTRANCY_DEPTH: usize = 32;

/// Configuration accepted when creating a store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StoreConfig {
    /// Maximum number of snapshots the history keeps
    pub max_history_length: usize,

    /// How deeply a subscriber may nest updates; a mutation issued from
    /// deeper than this many active notification passes is rejected.
    /// `0` disables re-entrant mutation entirely
    pub max_reentrancy_depth: usize,

    /// Accepted and validated, but not wired to any storage backend
    pub persist: bool,

    /// Identifier for the store, carried into checkpoints
    pub key: Option<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_history_length: DEFAULT_MAX_HISTORY_LENGTH,
            max_reentrancy_depth: DEFAULT_MAX_REENTRANCY_DEPTH,
            persist: false,
            key: None,
        }
    }
}

impl StoreConfig {
    pub fn with_max_history_length(mut self, n: usize) -> Self {
        self.max_history_length = n;
        self
    }

    pub fn with_max_reentrancy_depth(mut self, n: usize) -> Self {
        self.max_reentrancy_depth = n;
        self
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_persist(mut self, persist: bool) -> Self {
        self.persist = persist;
        self
    }

    /// Check every rule, accumulating ALL violations.
    pub fn validate(&self) -> Validation<(), NonEmptyVec<ConfigViolation>> {
        let checks = vec![
            check(
                self.max_history_length >= 1,
                ConfigViolation::ZeroHistoryLength,
            ),
            check(
                self.key.as_deref().map_or(true, |k| !k.is_empty()),
                ConfigViolation::EmptyKey,
            ),
            check(
                !self.persist || self.key.is_some(),
                ConfigViolation::PersistWithoutKey,
            ),
        ];

        Validation::all_vec(checks).map(|_| ())
    }

    /// [`validate`](Self::validate) flattened into a plain list of violations.
    pub fn violations(&self) -> Vec<ConfigViolation> {
        match self.validate() {
            Validation::Success(()) => Vec::new(),
            Validation::Failure(errors) => errors.iter().cloned().collect(),
        }
    }
}

fn check(ok: bool, violation: ConfigViolation) -> Validation<(), NonEmptyVec<ConfigViolation>> {
    if ok {
        Validation::success(())
    } else {
        Validation::fail(violation)
    }
}
