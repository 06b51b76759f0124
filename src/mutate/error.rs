use thiserror::Error;

use crate::core::{CategoryId, CoreError};
use crate::error::{Effect, Transience};
use crate::store::StoreError;

/// Why a tree mutation did not happen (or failed in the store).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MutationError {
    #[error("{field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("cannot move category {id} under {parent}: that would create a circular hierarchy")]
    Cycle { id: CategoryId, parent: CategoryId },

    #[error("category {id} is protected and cannot be deleted")]
    ProtectedNode { id: CategoryId },

    #[error("category {0} not found")]
    NotFound(CategoryId),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl MutationError {
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        MutationError::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// True when the store was never reached.
    pub fn is_local(&self) -> bool {
        !matches!(self, MutationError::Store(_))
    }

    pub fn transience(&self) -> Transience {
        match self {
            MutationError::Store(e) => e.transience(),
            _ => Transience::Permanent,
        }
    }

    pub fn effect(&self) -> Effect {
        match self {
            MutationError::Store(e) => e.effect(),
            _ => Effect::None,
        }
    }
}

impl From<CoreError> for MutationError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidName(e) => MutationError::validation("nom", e.reason),
            CoreError::InvalidId(e) => MutationError::validation("id", e.reason),
        }
    }
}
