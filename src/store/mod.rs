//! Category store contract.
//!
//! The store owns ids and persistence. It performs per-record atomic writes
//! and nothing more: no cycle checks, no protected-node rules. Those belong
//! to the mutator.

mod file;
mod memory;
mod table;

use async_trait::async_trait;
use thiserror::Error;

use crate::core::{CategoryId, CategoryPatch, CategoryRecord, NewCategory};
use crate::error::{Effect, Transience};

pub use file::FileStore;
pub use memory::{MemoryStore, StoreCall, StoreOp};

/// Failure reported by a store. The message is shown to users verbatim.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct StoreError {
    pub message: String,
}

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn not_found(id: CategoryId) -> Self {
        Self::new(format!("category {id} not found"))
    }

    pub fn transience(&self) -> Transience {
        Transience::Unknown
    }

    pub fn effect(&self) -> Effect {
        Effect::Unknown
    }
}

#[async_trait]
pub trait CategoryStore: Send + Sync {
    /// Every record, in store order.
    async fn list(&self) -> Result<Vec<CategoryRecord>, StoreError>;

    /// Insert a record and return it with its assigned id.
    async fn create(&self, category: NewCategory) -> Result<CategoryRecord, StoreError>;

    /// Apply a partial update and return the stored result.
    async fn update(&self, id: CategoryId, patch: CategoryPatch) -> Result<CategoryRecord, StoreError>;

    /// Remove a record together with its whole subtree.
    async fn delete(&self, id: CategoryId) -> Result<(), StoreError>;
}
