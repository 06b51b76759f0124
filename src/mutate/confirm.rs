use std::fmt;

use async_trait::async_trait;

use crate::core::CategoryId;

/// What the user is asked before a delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletePrompt {
    pub id: CategoryId,
    pub name: String,
    /// Records removed along with the target.
    pub descendants: usize,
}

impl fmt::Display for DeletePrompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Delete category \"{}\" (#{})", self.name, self.id)?;
        match self.descendants {
            0 => write!(f, "?"),
            1 => write!(f, " and its 1 sub-category?"),
            n => write!(f, " and its {n} sub-categories?"),
        }
    }
}

/// Asks for explicit confirmation of a destructive action.
#[async_trait]
pub trait Confirm: Send + Sync {
    async fn confirm(&self, prompt: &DeletePrompt) -> bool;
}

pub struct AlwaysConfirm;

#[async_trait]
impl Confirm for AlwaysConfirm {
    async fn confirm(&self, _prompt: &DeletePrompt) -> bool {
        true
    }
}

pub struct NeverConfirm;

#[async_trait]
impl Confirm for NeverConfirm {
    async fn confirm(&self, _prompt: &DeletePrompt) -> bool {
        false
    }
}
