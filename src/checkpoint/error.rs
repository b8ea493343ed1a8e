//! Checkpoint error types.

use crate::config::ConfigViolation;
use crate::core::HistoryError;
use thiserror::Error;

/// Errors that can occur when saving or resuming a checkpoint
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CheckpointError {
    /// Encoding to JSON or binary failed
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    /// Decoding from JSON or binary failed
    #[error("Deserialization failed: {0}")]
    DeserializationFailed(String),

    /// Written by a format version this build cannot read
    #[error("Unsupported checkpoint version {found}, supported: {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// History entries and cursor do not form a valid timeline
    #[error("Checkpoint history is invalid: {0}")]
    InvalidHistory(#[from] HistoryError),

    /// Stored configuration no longer passes validation
    #[error("Checkpoint configuration is invalid: {} violation(s)", .0.len())]
    InvalidConfig(Vec<ConfigViolation>),
}
