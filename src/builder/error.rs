//! Build errors for the store builder.

use crate::config::ConfigViolation;
use thiserror::Error;

/// Errors that can occur when building a store.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BuildError {
    #[error("Initial state not specified. Call .initial(state) before .build()")]
    MissingInitialState,

    #[error("Initial state must be an object, found {found}")]
    InitialNotAnObject { found: &'static str },

    #[error("Invalid configuration: {} violation(s)", .0.len())]
    InvalidConfig(Vec<ConfigViolation>),
}
