//! # Errors
//!
//! Two families live here:
//! - [`DomainError`]: a model refused a value or a transition.
//! - [`StoreError`]: the failure contract every port implementation returns.

use thiserror::Error;

/// Failures raised by the domain models themselves.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A field failed validation (e.g. zero reward, empty title)
    #[error("validation error: {0}")]
    Validation(String),

    /// The entity is in a state that forbids the requested change
    #[error("conflict: {0}")]
    Conflict(String),
}

/// Failures reported by persistence collaborators.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Entity not found (e.g. User, Quest, Reward, Submission)
    #[error("{entity} not found with ID {id}")]
    NotFound { entity: &'static str, id: String },

    /// A points adjustment would drive the balance negative
    #[error("insufficient funds: required {required} points, available {available}")]
    InsufficientFunds { required: u64, available: u64 },

    /// A tracked reward has no remaining stock
    #[error("reward {0} is out of stock")]
    OutOfStock(String),

    /// Unique key or state precondition violated at commit time
    #[error("conflict: {0}")]
    Conflict(String),

    /// Backend unreachable or failed (DB down, network error, timeout)
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

/// A specialized Result type for port calls.
pub type StoreResult<T> = std::result::Result<T, StoreError>;
