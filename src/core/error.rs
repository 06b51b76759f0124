//! Core capability errors (parsing and validation).
//!
//! These are bounded and stable: core errors represent domain/refusal states,
//! not library implementation details.

use thiserror::Error;

use crate::error::{Effect, Transience};

/// Invalid category identifier.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("category id `{raw}` is invalid: {reason}")]
pub struct InvalidId {
    pub raw: String,
    pub reason: String,
}

/// Invalid category display name.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("category name `{raw}` is invalid: {reason}")]
pub struct InvalidName {
    pub raw: String,
    pub reason: String,
}

/// Canonical error enum for core capability.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CoreError {
    #[error(transparent)]
    InvalidId(#[from] InvalidId),
    #[error(transparent)]
    InvalidName(#[from] InvalidName),
}

impl CoreError {
    pub fn transience(&self) -> Transience {
        // Core errors are pure domain/input failures.
        Transience::Permanent
    }

    pub fn effect(&self) -> Effect {
        Effect::None
    }
}
