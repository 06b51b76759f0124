use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap, HashSet};

use serde::Serialize;

use crate::core::{CategoryId, CategoryRecord};

/// A category record decorated with its children.
///
/// `Clone` and `Drop` walk the subtree with an explicit stack, so arbitrarily
/// deep chains do not exhaust the thread stack.
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct TreeNode {
    #[serde(flatten)]
    pub record: CategoryRecord,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn leaf(record: CategoryRecord) -> Self {
        Self {
            record,
            children: Vec::new(),
        }
    }

    pub fn id(&self) -> CategoryId {
        self.record.id
    }

    pub fn name(&self) -> &str {
        &self.record.nom
    }

    pub fn parent_id(&self) -> Option<CategoryId> {
        self.record.parent_id
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Number of nodes below this one (children, grandchildren, ...).
    pub fn descendant_count(&self) -> usize {
        Walk::new(&self.children).count()
    }

    /// Find `id` in this node's subtree, the node itself included.
    pub fn find(&self, id: CategoryId) -> Option<&TreeNode> {
        if self.id() == id {
            return Some(self);
        }
        Walk::new(&self.children).find(|node| node.id() == id)
    }
}

impl Clone for TreeNode {
    fn clone(&self) -> Self {
        prune(std::slice::from_ref(self), |_| true)
            .pop()
            .unwrap_or_else(|| TreeNode::leaf(self.record.clone()))
    }
}

impl Drop for TreeNode {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

/// Copy the nodes whose record satisfies `keep`, plus their ancestors.
///
/// Post-order over an explicit stack: a node is emitted once all of its
/// children are settled, and only if it matched or kept a child.
pub(crate) fn prune(roots: &[TreeNode], keep: impl Fn(&CategoryRecord) -> bool) -> Vec<TreeNode> {
    struct Frame<'a> {
        node: &'a TreeNode,
        next: usize,
        kept: Vec<TreeNode>,
    }

    let mut out = Vec::new();
    for root in roots {
        let mut stack = vec![Frame {
            node: root,
            next: 0,
            kept: Vec::new(),
        }];
        while let Some(frame) = stack.last_mut() {
            let node = frame.node;
            if let Some(child) = node.children.get(frame.next) {
                frame.next += 1;
                stack.push(Frame {
                    node: child,
                    next: 0,
                    kept: Vec::new(),
                });
                continue;
            }

            let Some(frame) = stack.pop() else { break };
            if !keep(&frame.node.record) && frame.kept.is_empty() {
                continue;
            }
            let built = TreeNode {
                record: frame.node.record.clone(),
                children: frame.kept,
            };
            match stack.last_mut() {
                Some(parent) => parent.kept.push(built),
                None => out.push(built),
            }
        }
    }
    out
}

/// Ordered collection of root nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Forest {
    roots: Vec<TreeNode>,
}

impl Forest {
    pub fn new(roots: Vec<TreeNode>) -> Self {
        Self { roots }
    }

    pub fn roots(&self) -> &[TreeNode] {
        &self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Total number of nodes in the forest.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Depth-first, pre-order traversal.
    pub fn iter(&self) -> Walk<'_> {
        Walk::new(&self.roots)
    }

    pub fn find(&self, id: CategoryId) -> Option<&TreeNode> {
        self.iter().find(|node| node.id() == id)
    }

    pub fn contains(&self, id: CategoryId) -> bool {
        self.find(id).is_some()
    }

    /// Sort roots and every child list by display name.
    ///
    /// Case-insensitive, then raw name, then id so the order is total.
    pub fn sort_by_name(&mut self) {
        let mut levels: Vec<&mut Vec<TreeNode>> = vec![&mut self.roots];
        while let Some(level) = levels.pop() {
            level.sort_by(compare_nodes);
            for node in level {
                levels.push(&mut node.children);
            }
        }
    }
}

fn compare_nodes(a: &TreeNode, b: &TreeNode) -> Ordering {
    a.name()
        .to_lowercase()
        .cmp(&b.name().to_lowercase())
        .then_with(|| a.name().cmp(b.name()))
        .then_with(|| a.id().cmp(&b.id()))
}

/// Pre-order iterator over a slice of nodes and their subtrees.
pub struct Walk<'a> {
    stack: Vec<&'a TreeNode>,
}

impl<'a> Walk<'a> {
    fn new(nodes: &'a [TreeNode]) -> Self {
        Self {
            stack: nodes.iter().rev().collect(),
        }
    }
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a TreeNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// Build a forest from a flat, parent-referencing record list.
///
/// Never fails. A record whose parent is missing becomes a root. Records
/// that only reach each other through a parent cycle (a corrupted store)
/// are kept: the smallest id on each cycle is promoted to a root.
/// Duplicate ids keep the position of the first occurrence and the data of
/// the last one.
pub fn build_forest(records: &[CategoryRecord]) -> Forest {
    let mut index: HashMap<CategoryId, &CategoryRecord> = HashMap::with_capacity(records.len());
    let mut order: Vec<CategoryId> = Vec::with_capacity(records.len());
    for record in records {
        if index.insert(record.id, record).is_none() {
            order.push(record.id);
        }
    }

    let mut children_of: HashMap<CategoryId, Vec<CategoryId>> = HashMap::new();
    let mut roots: Vec<CategoryId> = Vec::new();
    for id in &order {
        match index[id].parent_id {
            Some(parent) if parent != *id && index.contains_key(&parent) => {
                children_of.entry(parent).or_default().push(*id);
            }
            _ => roots.push(*id),
        }
    }

    let mut visited: HashSet<CategoryId> = HashSet::with_capacity(order.len());
    let mut forest: Vec<TreeNode> = Vec::with_capacity(roots.len());
    for root in roots {
        forest.push(assemble(root, &index, &children_of, &mut visited));
    }

    if visited.len() < order.len() {
        let stranded: BTreeSet<CategoryId> = order
            .iter()
            .copied()
            .filter(|id| !visited.contains(id))
            .collect();
        for id in stranded {
            if visited.contains(&id) {
                continue;
            }
            let anchor = cycle_anchor(id, &index);
            tracing::warn!(category = %anchor, "parent cycle in store data, promoting category to root");
            forest.push(assemble(anchor, &index, &children_of, &mut visited));
        }
    }

    Forest::new(forest)
}

/// Materialize the subtree under `root` without recursion.
///
/// Collects the reachable ids in pre-order (the visited set stops at
/// anything already placed), then builds nodes bottom-up so every child is
/// finished before its parent takes it.
fn assemble(
    root: CategoryId,
    index: &HashMap<CategoryId, &CategoryRecord>,
    children_of: &HashMap<CategoryId, Vec<CategoryId>>,
    visited: &mut HashSet<CategoryId>,
) -> TreeNode {
    visited.insert(root);
    let mut preorder = Vec::new();
    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        preorder.push(id);
        if let Some(children) = children_of.get(&id) {
            for child in children {
                if visited.insert(*child) {
                    stack.push(*child);
                }
            }
        }
    }

    let mut built: HashMap<CategoryId, TreeNode> = HashMap::with_capacity(preorder.len());
    for id in preorder[1..].iter().rev() {
        let node = make_node(*id, index, children_of, &mut built);
        built.insert(*id, node);
    }
    make_node(root, index, children_of, &mut built)
}

fn make_node(
    id: CategoryId,
    index: &HashMap<CategoryId, &CategoryRecord>,
    children_of: &HashMap<CategoryId, Vec<CategoryId>>,
    built: &mut HashMap<CategoryId, TreeNode>,
) -> TreeNode {
    let children = children_of
        .get(&id)
        .map(|ids| ids.iter().filter_map(|child| built.remove(child)).collect())
        .unwrap_or_default();
    TreeNode {
        record: index[&id].clone(),
        children,
    }
}

/// Follow parent links from `start` until a record repeats; return the
/// smallest id on the loop.
fn cycle_anchor(start: CategoryId, index: &HashMap<CategoryId, &CategoryRecord>) -> CategoryId {
    let mut path: Vec<CategoryId> = Vec::new();
    let mut seen: HashSet<CategoryId> = HashSet::new();
    let mut current = start;
    loop {
        if !seen.insert(current) {
            let pos = path.iter().position(|id| *id == current).unwrap_or(0);
            return path[pos..].iter().copied().min().unwrap_or(start);
        }
        path.push(current);
        match index.get(&current).and_then(|record| record.parent_id) {
            Some(parent) if index.contains_key(&parent) => current = parent,
            _ => return start,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use proptest::prelude::*;

    fn rec(id: u64, nom: &str, parent: Option<u64>) -> CategoryRecord {
        CategoryRecord::new(CategoryId::new(id), nom, parent.map(CategoryId::new))
    }

    fn ids(nodes: &[TreeNode]) -> Vec<u64> {
        nodes.iter().map(|node| node.id().get()).collect()
    }

    #[test]
    fn empty_input_builds_empty_forest() {
        let forest = build_forest(&[]);
        assert!(forest.is_empty());
        assert_eq!(forest.len(), 0);
    }

    #[test]
    fn builds_single_chain() {
        let forest = build_forest(&[
            rec(1, "Root", None),
            rec(2, "A", Some(1)),
            rec(3, "B", Some(2)),
        ]);
        assert_eq!(ids(forest.roots()), vec![1]);
        let root = &forest.roots()[0];
        assert_eq!(ids(&root.children), vec![2]);
        assert_eq!(ids(&root.children[0].children), vec![3]);
        assert_eq!(root.descendant_count(), 2);
    }

    #[test]
    fn children_listed_before_parent_still_attach() {
        let forest = build_forest(&[
            rec(3, "B", Some(2)),
            rec(2, "A", Some(1)),
            rec(1, "Root", None),
        ]);
        assert_eq!(ids(forest.roots()), vec![1]);
        assert_eq!(forest.len(), 3);
        assert_eq!(forest.find(CategoryId::new(3)).unwrap().name(), "B");
    }

    #[test]
    fn dangling_parent_becomes_root() {
        let forest = build_forest(&[rec(1, "Root", None), rec(5, "Orphan", Some(42))]);
        assert_eq!(ids(forest.roots()), vec![1, 5]);
    }

    #[test]
    fn self_parent_becomes_root() {
        let forest = build_forest(&[rec(7, "Loop", Some(7))]);
        assert_eq!(ids(forest.roots()), vec![7]);
        assert!(forest.roots()[0].children.is_empty());
    }

    #[test]
    fn parent_cycle_terminates_and_keeps_every_record() {
        let forest = build_forest(&[
            rec(1, "Root", None),
            rec(4, "X", Some(6)),
            rec(5, "Y", Some(4)),
            rec(6, "Z", Some(5)),
            rec(9, "Hanger", Some(5)),
        ]);
        assert_eq!(forest.len(), 5);
        assert_eq!(ids(forest.roots()), vec![1, 4]);
        let promoted = &forest.roots()[1];
        assert!(promoted.find(CategoryId::new(9)).is_some());
        assert_eq!(promoted.descendant_count(), 3);
    }

    #[test]
    fn duplicate_ids_keep_last_data() {
        let forest = build_forest(&[rec(1, "Old", None), rec(1, "New", None)]);
        assert_eq!(forest.len(), 1);
        assert_eq!(forest.roots()[0].name(), "New");
    }

    #[test]
    fn sort_by_name_is_case_insensitive_and_recursive() {
        let mut forest = build_forest(&[
            rec(1, "peinture", None),
            rec(2, "Ciment", None),
            rec(3, "tuyaux", Some(2)),
            rec(4, "Briques", Some(2)),
        ]);
        forest.sort_by_name();
        assert_eq!(ids(forest.roots()), vec![2, 1]);
        assert_eq!(ids(&forest.roots()[0].children), vec![4, 3]);
    }

    #[test]
    fn iter_is_preorder() {
        let forest = build_forest(&[
            rec(1, "R", None),
            rec(2, "A", Some(1)),
            rec(3, "A1", Some(2)),
            rec(4, "B", Some(1)),
        ]);
        let order: Vec<u64> = forest.iter().map(|node| node.id().get()).collect();
        assert_eq!(order, vec![1, 2, 3, 4]);
    }

    pub(crate) fn acyclic_records() -> impl Strategy<Value = Vec<CategoryRecord>> {
        // Parent is either none, an earlier id, or a dangling id past the end.
        prop::collection::vec(prop::option::of(0u64..1000), 0..40).prop_map(|parents| {
            let len = parents.len() as u64;
            parents
                .into_iter()
                .enumerate()
                .map(|(i, parent)| {
                    let id = i as u64 + 1;
                    let parent = parent.map(|p| if id > 1 { p % (id - 1) + 1 } else { len + 1 + p });
                    rec(id, &format!("n{id}"), parent)
                })
                .collect()
        })
    }

    fn chain(depth: u64) -> Vec<CategoryRecord> {
        (1..=depth)
            .map(|id| rec(id, &format!("n{id}"), (id > 1).then(|| id - 1)))
            .collect()
    }

    #[test]
    fn deep_chain_clones_and_drops_without_recursion() {
        let forest = build_forest(&chain(50_000));
        let copy = forest.clone();
        assert_eq!(copy.len(), 50_000);
        drop(forest);
        assert_eq!(copy.iter().last().map(|node| node.id().get()), Some(50_000));
    }

    #[test]
    fn prune_keeps_matches_and_their_ancestors() {
        let forest = build_forest(&[
            rec(1, "R", None),
            rec(2, "A", Some(1)),
            rec(3, "A1", Some(2)),
            rec(4, "B", Some(1)),
            rec(5, "S", None),
        ]);
        let kept = prune(forest.roots(), |record| record.nom == "A1");
        assert_eq!(ids(&kept), vec![1]);
        assert_eq!(ids(&kept[0].children), vec![2]);
        assert_eq!(ids(&kept[0].children[0].children), vec![3]);
    }

    proptest! {
        #[test]
        fn children_are_exactly_the_records_pointing_at_the_node(records in acyclic_records()) {
            let forest = build_forest(&records);
            prop_assert_eq!(forest.len(), records.len());
            for node in forest.iter() {
                let got: BTreeSet<CategoryId> = node.children.iter().map(TreeNode::id).collect();
                let want: BTreeSet<CategoryId> = records
                    .iter()
                    .filter(|r| r.parent_id == Some(node.id()))
                    .map(|r| r.id)
                    .collect();
                prop_assert_eq!(got, want);
            }
        }

        #[test]
        fn arbitrary_parents_never_lose_records(parents in prop::collection::vec(prop::option::of(1u64..30), 0..30)) {
            let records: Vec<CategoryRecord> = parents
                .iter()
                .enumerate()
                .map(|(i, parent)| rec(i as u64 + 1, "n", *parent))
                .collect();
            let forest = build_forest(&records);
            let seen: BTreeSet<CategoryId> = forest.iter().map(TreeNode::id).collect();
            prop_assert_eq!(seen.len(), records.len());
            prop_assert_eq!(forest.len(), records.len());
        }
    }
}
