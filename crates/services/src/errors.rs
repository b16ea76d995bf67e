//! # Service errors
//!
//! Each flow has its own error enum. Every variant maps to an [`ErrorClass`]
//! so the outer surfaces can pick a status code and a log level without
//! matching on individual variants.

use domains::{DomainError, QuestId, RewardId, StoreError, SubmissionId, UserId};
use thiserror::Error;

/// Coarse classification shared by all service errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Bad user input; the user can retry with a different value
    Input,
    /// The request is valid but the current state forbids it
    Precondition,
    /// The referenced entity does not exist
    NotFound,
    /// A collaborator failed; state is unchanged
    External,
    /// The caller asked for a transition the state machine does not allow
    InvalidTransition,
    /// The caller lacks the required role
    Forbidden,
}

fn classify_store(err: &StoreError) -> ErrorClass {
    match err {
        StoreError::NotFound { .. } => ErrorClass::NotFound,
        StoreError::InsufficientFunds { .. } | StoreError::OutOfStock(_) | StoreError::Conflict(_) => {
            ErrorClass::Precondition
        }
        StoreError::Unavailable(_) => ErrorClass::External,
    }
}

fn classify_domain(err: &DomainError) -> ErrorClass {
    match err {
        DomainError::Validation(_) => ErrorClass::Input,
        DomainError::Conflict(_) => ErrorClass::Precondition,
    }
}

/// Failures of the quest lifecycle.
#[derive(Error, Debug)]
pub enum QuestError {
    #[error("quest {0} not found")]
    QuestNotFound(QuestId),

    #[error("user {0} not found")]
    UserNotFound(UserId),

    #[error("submission {0} not found")]
    SubmissionNotFound(SubmissionId),

    /// Watch-quest code did not match
    #[error("invalid validation code")]
    InvalidCode,

    #[error("proof must not be empty")]
    EmptyProof,

    #[error("invalid transition: {0}")]
    InvalidTransition(String),

    #[error("only admins may {0}")]
    Forbidden(&'static str),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl QuestError {
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::QuestNotFound(_) | Self::UserNotFound(_) | Self::SubmissionNotFound(_) => {
                ErrorClass::NotFound
            }
            Self::InvalidCode | Self::EmptyProof => ErrorClass::Input,
            Self::InvalidTransition(_) => ErrorClass::InvalidTransition,
            Self::Forbidden(_) => ErrorClass::Forbidden,
            Self::Store(e) => classify_store(e),
        }
    }

    /// Text safe to show to the end user.
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidCode => "Invalid code. Please try again.".into(),
            Self::EmptyProof => "Please provide proof of completion.".into(),
            Self::Store(StoreError::Unavailable(_)) => {
                "Something went wrong. Please try again later.".into()
            }
            other => other.to_string(),
        }
    }
}

/// Failures of the reward redemption flow.
#[derive(Error, Debug)]
pub enum RedemptionError {
    #[error("user {0} not found")]
    UserNotFound(UserId),

    #[error("reward {0} not found")]
    RewardNotFound(RewardId),

    #[error("not enough points: {cost} required, {available} available")]
    InsufficientFunds { cost: u64, available: u64 },

    #[error("{0} is out of stock")]
    OutOfStock(String),

    #[error("{0} is not available for redemption")]
    RewardInactive(String),

    /// The reward cost changed between request and confirm
    #[error("price changed from {was} to {now} points")]
    PriceChanged { was: u64, now: u64 },

    #[error("cannot {action} while {state}")]
    InvalidTransition { state: &'static str, action: &'static str },

    #[error("redemption timed out")]
    TimedOut,

    /// The commit was dropped before it settled
    #[error("redemption interrupted")]
    Interrupted,

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for RedemptionError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InsufficientFunds { required, available } => Self::InsufficientFunds {
                cost: required,
                available,
            },
            StoreError::OutOfStock(name) => Self::OutOfStock(name),
            other => Self::Store(other),
        }
    }
}

impl RedemptionError {
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::UserNotFound(_) | Self::RewardNotFound(_) => ErrorClass::NotFound,
            Self::InsufficientFunds { .. }
            | Self::OutOfStock(_)
            | Self::RewardInactive(_)
            | Self::PriceChanged { .. } => ErrorClass::Precondition,
            Self::InvalidTransition { .. } => ErrorClass::InvalidTransition,
            Self::TimedOut | Self::Interrupted => ErrorClass::External,
            Self::Store(e) => classify_store(e),
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            Self::InsufficientFunds { .. } => "Insufficient points".into(),
            Self::TimedOut | Self::Interrupted | Self::Store(StoreError::Unavailable(_)) => {
                "Failed to claim reward. Please try again.".into()
            }
            other => other.to_string(),
        }
    }
}

/// Failures of the catalog, profile and leaderboard services.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("only admins may {0}")]
    Forbidden(&'static str),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ServiceError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            Self::NotFound { .. } => ErrorClass::NotFound,
            Self::Forbidden(_) => ErrorClass::Forbidden,
            Self::Domain(e) => classify_domain(e),
            Self::Store(e) => classify_store(e),
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            Self::Store(StoreError::Unavailable(_)) => {
                "Something went wrong. Please try again later.".into()
            }
            other => other.to_string(),
        }
    }
}
