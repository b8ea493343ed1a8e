//! Configuration violations.

use thiserror::Error;

/// A single problem found while validating a [`StoreConfig`](super::StoreConfig).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigViolation {
    #[error("maxHistoryLength must be at least 1")]
    ZeroHistoryLength,

    #[error("key must not be empty")]
    EmptyKey,

    #[error("persist requires a key")]
    PersistWithoutKey,
}
