//! Structural checks that keep the forest a forest.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::build::TreeNode;
use crate::core::{CategoryId, CategoryRecord};

pub const DEFAULT_PROTECTED_NAME: &str = "UNCATEGORIZED";
pub const DEFAULT_PROTECTED_ID: CategoryId = CategoryId::new(1);

/// True when `candidate` is `node` itself or anywhere under it.
///
/// Re-parenting `node` under such a candidate would close a cycle.
pub fn is_descendant(candidate: CategoryId, node: &TreeNode) -> bool {
    let mut stack = vec![node];
    let mut seen: HashSet<CategoryId> = HashSet::new();
    while let Some(current) = stack.pop() {
        if current.id() == candidate {
            return true;
        }
        if !seen.insert(current.id()) {
            continue;
        }
        stack.extend(current.children.iter());
    }
    false
}

/// Identifies the reserved fallback category that can never be deleted.
///
/// A record is protected when its name matches `name` (case-insensitive)
/// or its id equals `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtectedPolicy {
    pub name: String,
    pub id: Option<CategoryId>,
}

impl Default for ProtectedPolicy {
    fn default() -> Self {
        Self {
            name: DEFAULT_PROTECTED_NAME.to_string(),
            id: Some(DEFAULT_PROTECTED_ID),
        }
    }
}

impl ProtectedPolicy {
    pub fn is_protected_id(&self, id: CategoryId) -> bool {
        self.id == Some(id)
    }

    pub fn is_protected_name(&self, name: &str) -> bool {
        let reserved = self.name.trim();
        !reserved.is_empty() && name.trim().to_uppercase() == reserved.to_uppercase()
    }

    pub fn is_protected(&self, record: &CategoryRecord) -> bool {
        self.is_protected_id(record.id) || self.is_protected_name(&record.nom)
    }
}
