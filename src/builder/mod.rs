//! Fluent construction of stores.
//!
//! ```
//! use recall::StoreBuilder;
//! use serde_json::json;
//!
//! let store = StoreBuilder::new()
//!     .initial(json!({"theme": "light", "fontSize": 14}))
//!     .max_history_length(50)
//!     .key("settings")
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(store.config().max_history_length, 50);
//! ```

pub mod error;

pub use error::BuildError;

use crate::config::StoreConfig;
use crate::core::{Snapshot, Value};
use crate::store::Store;

/// Builder for [`Store`]. Only the initial state is required.
#[derive(Debug, Default)]
pub struct StoreBuilder {
    initial: Option<Value>,
    config: StoreConfig,
}

impl StoreBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the initial state (required). Must be an object.
    pub fn initial(mut self, state: impl Into<Value>) -> Self {
        self.initial = Some(state.into());
        self
    }

    pub fn max_history_length(mut self, n: usize) -> Self {
        self.config.max_history_length = n;
        self
    }

    pub fn max_reentrancy_depth(mut self, n: usize) -> Self {
        self.config.max_reentrancy_depth = n;
        self
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.config.key = Some(key.into());
        self
    }

    pub fn persist(mut self, persist: bool) -> Self {
        self.config.persist = persist;
        self
    }

    /// Replace every configuration field at once.
    pub fn config(mut self, config: StoreConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the store. Every configuration violation is reported together.
    pub fn build(self) -> Result<Store, BuildError> {
        let initial = self.initial.ok_or(BuildError::MissingInitialState)?;
        let initial = Snapshot::try_from(initial)
            .map_err(|err| BuildError::InitialNotAnObject { found: err.found })?;

        let violations = self.config.violations();
        if !violations.is_empty() {
            return Err(BuildError::InvalidConfig(violations));
        }

        Ok(Store::assemble(initial, self.config))
    }
}
