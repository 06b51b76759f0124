use std::collections::HashSet;

use serde::Serialize;

use super::drag::{DragState, DropPosition};
use super::expansion::ExpansionState;
use crate::core::CategoryId;
use crate::tree::{Forest, ProtectedPolicy, TreeNode};

/// One rendered line of the tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Row {
    pub depth: usize,
    pub id: CategoryId,
    pub name: String,
    pub child_count: usize,
    pub has_children: bool,
    pub expanded: bool,
    pub protected: bool,
    /// Set while this row is the node being dragged.
    pub dragging: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drop_hint: Option<DropPosition>,
}

/// Flatten `forest` in display order, skipping children of collapsed nodes.
pub(crate) fn flatten(
    forest: &Forest,
    expansion: &ExpansionState,
    policy: &ProtectedPolicy,
    drag: &DragState,
) -> Vec<Row> {
    let mut rows = Vec::new();
    let mut seen: HashSet<CategoryId> = HashSet::new();
    let mut stack: Vec<(&TreeNode, usize)> = forest.roots().iter().rev().map(|node| (node, 0)).collect();
    while let Some((node, depth)) = stack.pop() {
        if !seen.insert(node.id()) {
            tracing::warn!(category = %node.id(), "category rendered twice, skipping");
            continue;
        }
        let expanded = expansion.is_expanded(node.id());
        rows.push(Row {
            depth,
            id: node.id(),
            name: node.name().to_string(),
            child_count: node.children.len(),
            has_children: node.has_children(),
            expanded,
            protected: policy.is_protected(&node.record),
            dragging: drag.source() == Some(node.id()),
            drop_hint: drag.hint_for(node.id()),
        });
        if expanded {
            stack.extend(node.children.iter().rev().map(|child| (child, depth + 1)));
        }
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CategoryRecord;
    use crate::tree::build_forest;
    use crate::view::DropTarget;

    fn id(raw: u64) -> CategoryId {
        CategoryId::new(raw)
    }

    fn forest() -> Forest {
        build_forest(&[
            CategoryRecord::new(id(1), "UNCATEGORIZED", None),
            CategoryRecord::new(id(2), "Matériaux", None),
            CategoryRecord::new(id(3), "Ciment", Some(id(2))),
            CategoryRecord::new(id(4), "Portland", Some(id(3))),
        ])
    }

    fn summary(rows: &[Row]) -> Vec<(usize, u64)> {
        rows.iter().map(|row| (row.depth, row.id.get())).collect()
    }

    #[test]
    fn expanded_by_default_in_preorder() {
        let rows = flatten(
            &forest(),
            &ExpansionState::new(),
            &ProtectedPolicy::default(),
            &DragState::Idle,
        );
        assert_eq!(summary(&rows), vec![(0, 1), (0, 2), (1, 3), (2, 4)]);
        assert!(rows[0].protected);
        assert!(!rows[1].protected);
        assert_eq!(rows[1].child_count, 1);
    }

    #[test]
    fn collapsed_node_hides_its_subtree() {
        let mut expansion = ExpansionState::new();
        expansion.set(id(3), false);
        let rows = flatten(
            &forest(),
            &expansion,
            &ProtectedPolicy::default(),
            &DragState::Idle,
        );
        assert_eq!(summary(&rows), vec![(0, 1), (0, 2), (1, 3)]);
        assert!(!rows[2].expanded);
    }

    #[test]
    fn drag_highlights_source_and_target() {
        let mut drag = DragState::default();
        drag.start(id(4));
        drag.enter(DropTarget::Node(id(2)), DropPosition::After);
        let rows = flatten(
            &forest(),
            &ExpansionState::new(),
            &ProtectedPolicy::default(),
            &drag,
        );
        assert_eq!(rows[1].drop_hint, Some(DropPosition::After));
        assert!(rows[3].dragging);
        assert!(rows[0].drop_hint.is_none());
    }

    #[test]
    fn hand_built_duplicate_is_rendered_once() {
        let leaf = TreeNode::leaf(CategoryRecord::new(id(9), "Twice", None));
        let forest = Forest::new(vec![leaf.clone(), leaf]);
        let rows = flatten(
            &forest,
            &ExpansionState::new(),
            &ProtectedPolicy::default(),
            &DragState::Idle,
        );
        assert_eq!(rows.len(), 1);
    }
}
