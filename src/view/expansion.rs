use std::collections::{HashMap, HashSet};

use crate::core::CategoryId;
use crate::tree::Forest;

/// Per-session expand/collapse flags. A node with no entry is expanded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpansionState {
    flags: HashMap<CategoryId, bool>,
}

impl ExpansionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_expanded(&self, id: CategoryId) -> bool {
        self.flags.get(&id).copied().unwrap_or(true)
    }

    /// Flip `id` and return its new state.
    pub fn toggle(&mut self, id: CategoryId) -> bool {
        let expanded = !self.is_expanded(id);
        self.flags.insert(id, expanded);
        expanded
    }

    pub fn set(&mut self, id: CategoryId, expanded: bool) {
        self.flags.insert(id, expanded);
    }

    /// Expand every node that has children. Leaves are left alone.
    pub fn expand_all(&mut self, forest: &Forest) {
        self.set_branches(forest, true);
    }

    /// Collapse every node that has children. Leaves are left alone.
    pub fn collapse_all(&mut self, forest: &Forest) {
        self.set_branches(forest, false);
    }

    /// Forget flags for ids that are no longer in `forest`.
    pub fn prune(&mut self, forest: &Forest) {
        let live: HashSet<CategoryId> = forest.iter().map(|node| node.id()).collect();
        self.flags.retain(|id, _| live.contains(id));
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    fn set_branches(&mut self, forest: &Forest, expanded: bool) {
        for node in forest.iter().filter(|node| node.has_children()) {
            self.flags.insert(node.id(), expanded);
        }
    }
}
