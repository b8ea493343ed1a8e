//! Store error types.

use crate::config::ConfigViolation;
use crate::core::NotAnObject;
use crate::store::SubscriptionId;
use thiserror::Error;

/// Errors that can occur when creating or updating a store.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    /// An argument was rejected before any state was touched
    #[error("Invalid argument: {reason}")]
    InvalidArgument { reason: String },

    /// The configuration failed validation; every violation is listed
    #[error("Invalid configuration: {}", format_violations(.0))]
    InvalidConfig(Vec<ConfigViolation>),

    /// A re-entrant mutation was nested deeper than the configured depth
    #[error("Re-entrant update rejected: nested deeper than {limit} levels")]
    ReentrancyLimit { limit: usize },

    /// A subscriber callback failed during notification.
    /// Only ever logged; never returned from a store operation.
    #[error("Subscriber {id} failed: {message}")]
    SubscriberFailure { id: SubscriptionId, message: String },
}

impl StoreError {
    pub(crate) fn invalid_argument(reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            reason: reason.into(),
        }
    }
}

fn format_violations(violations: &[ConfigViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<NotAnObject> for StoreError {
    fn from(err: NotAnObject) -> Self {
        Self::invalid_argument(format!("state must always be an object: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_object_error_mentions_found_type() {
        let err = StoreError::from(NotAnObject { found: "array" });
        assert!(err.to_string().contains("found array"));
    }

    #[test]
    fn config_error_lists_every_violation() {
        let err = StoreError::InvalidConfig(vec![
            ConfigViolation::ZeroHistoryLength,
            ConfigViolation::EmptyKey,
        ]);
        let message = err.to_string();
        assert!(message.contains("maxHistoryLength"));
        assert!(message.contains("key"));
        assert!(message.contains("; "));
    }
}
