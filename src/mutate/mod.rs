//! Tree mutations.
//!
//! Every operation validates against the caller's current forest before the
//! store is touched. The forest itself is never patched here; callers
//! refetch and rebuild after a successful mutation.

mod confirm;
mod error;

use serde::Serialize;

use crate::core::{CategoryId, CategoryName, CategoryPatch, CategoryRecord, NewCategory};
use crate::store::{CategoryStore, StoreError};
use crate::tree::{Forest, ProtectedPolicy, TreeNode, is_descendant};

pub use confirm::{AlwaysConfirm, Confirm, DeletePrompt, NeverConfirm};
pub use error::MutationError;

/// Result of a mutation that reached a decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MutationOutcome {
    Created(CategoryRecord),
    Updated(CategoryRecord),
    Deleted { id: CategoryId, descendants: usize },
    /// Nothing to do; the store was not called.
    Unchanged { id: CategoryId },
    /// The user declined the confirmation; the store was not called.
    Cancelled { id: CategoryId },
}

impl MutationOutcome {
    pub fn changed(&self) -> bool {
        matches!(
            self,
            MutationOutcome::Created(_) | MutationOutcome::Updated(_) | MutationOutcome::Deleted { .. }
        )
    }
}

pub struct TreeMutator<S> {
    store: S,
    policy: ProtectedPolicy,
}

impl<S: CategoryStore> TreeMutator<S> {
    pub fn new(store: S) -> Self {
        Self::with_policy(store, ProtectedPolicy::default())
    }

    pub fn with_policy(store: S, policy: ProtectedPolicy) -> Self {
        Self { store, policy }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn policy(&self) -> &ProtectedPolicy {
        &self.policy
    }

    pub async fn create(
        &self,
        forest: &Forest,
        name: &str,
        parent: Option<CategoryId>,
    ) -> Result<CategoryRecord, MutationError> {
        self.create_with(forest, NewCategory::new(name, parent)).await
    }

    /// Create with the full payload (description, translated names).
    pub async fn create_with(
        &self,
        forest: &Forest,
        mut category: NewCategory,
    ) -> Result<CategoryRecord, MutationError> {
        category.nom = CategoryName::new(category.nom)
            .map_err(|e| rejected("create", e.into()))?
            .into_string();
        if let Some(parent) = category.parent_id
            && !forest.contains(parent)
        {
            return Err(rejected("create", MutationError::NotFound(parent)));
        }

        let record = self
            .store
            .create(category)
            .await
            .map_err(|e| store_failed("create", e))?;
        tracing::info!(category = %record.id, nom = %record.nom, "created category");
        Ok(record)
    }

    pub async fn rename(
        &self,
        forest: &Forest,
        id: CategoryId,
        name: &str,
    ) -> Result<MutationOutcome, MutationError> {
        let name = CategoryName::new(name).map_err(|e| rejected("rename", e.into()))?;
        let node = forest
            .find(id)
            .ok_or_else(|| rejected("rename", MutationError::NotFound(id)))?;
        if node.name() == name.as_str() {
            return Ok(MutationOutcome::Unchanged { id });
        }

        let record = self
            .store
            .update(id, CategoryPatch::rename(name.into_string()))
            .await
            .map_err(|e| store_failed("rename", e))?;
        tracing::info!(category = %id, nom = %record.nom, "renamed category");
        Ok(MutationOutcome::Updated(record))
    }

    /// Move `id` under `parent` (`None` = root level).
    pub async fn reparent(
        &self,
        forest: &Forest,
        id: CategoryId,
        parent: Option<CategoryId>,
    ) -> Result<MutationOutcome, MutationError> {
        let node = forest
            .find(id)
            .ok_or_else(|| rejected("reparent", MutationError::NotFound(id)))?;
        if let Some(parent) = parent {
            if !forest.contains(parent) {
                return Err(rejected("reparent", MutationError::NotFound(parent)));
            }
            if is_descendant(parent, node) {
                return Err(rejected("reparent", MutationError::Cycle { id, parent }));
            }
        }
        if node.parent_id() == parent {
            return Ok(MutationOutcome::Unchanged { id });
        }

        let record = self
            .store
            .update(id, CategoryPatch::reparent(parent))
            .await
            .map_err(|e| store_failed("reparent", e))?;
        tracing::info!(category = %id, parent = ?parent.map(CategoryId::get), "moved category");
        Ok(MutationOutcome::Updated(record))
    }

    /// Delete `id` and its subtree after explicit confirmation.
    pub async fn delete<C>(
        &self,
        forest: &Forest,
        id: CategoryId,
        confirm: &C,
    ) -> Result<MutationOutcome, MutationError>
    where
        C: Confirm + ?Sized,
    {
        if self.policy.is_protected_id(id) {
            return Err(rejected("delete", MutationError::ProtectedNode { id }));
        }
        let node = forest
            .find(id)
            .ok_or_else(|| rejected("delete", MutationError::NotFound(id)))?;
        // Cascade would take a protected descendant with it.
        if let Some(protected) = protected_in(node, &self.policy) {
            return Err(rejected(
                "delete",
                MutationError::ProtectedNode { id: protected },
            ));
        }

        let prompt = DeletePrompt {
            id,
            name: node.name().to_string(),
            descendants: node.descendant_count(),
        };
        if !confirm.confirm(&prompt).await {
            tracing::info!(category = %id, "delete cancelled");
            return Ok(MutationOutcome::Cancelled { id });
        }

        self.store
            .delete(id)
            .await
            .map_err(|e| store_failed("delete", e))?;
        tracing::info!(category = %id, descendants = prompt.descendants, "deleted category");
        Ok(MutationOutcome::Deleted {
            id,
            descendants: prompt.descendants,
        })
    }
}

fn protected_in(node: &TreeNode, policy: &ProtectedPolicy) -> Option<CategoryId> {
    let mut stack = vec![node];
    while let Some(current) = stack.pop() {
        if policy.is_protected(&current.record) {
            return Some(current.id());
        }
        stack.extend(current.children.iter());
    }
    None
}

fn rejected(op: &'static str, err: MutationError) -> MutationError {
    tracing::warn!(op, error = %err, "mutation rejected");
    err
}

fn store_failed(op: &'static str, err: StoreError) -> MutationError {
    tracing::error!(op, error = %err, "store call failed");
    MutationError::Store(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, StoreCall, StoreOp};
    use crate::tree::{acyclic_records, build_forest};
    use proptest::prelude::*;
    use proptest::sample::Index;

    fn id(raw: u64) -> CategoryId {
        CategoryId::new(raw)
    }

    fn rec(raw: u64, nom: &str, parent: Option<u64>) -> CategoryRecord {
        CategoryRecord::new(id(raw), nom, parent.map(id))
    }

    /// 1 UNCATEGORIZED, 2 Matériaux > 3 Ciment > 4 Portland, 5 Outillage
    fn fixture() -> (TreeMutator<MemoryStore>, Forest) {
        let records = vec![
            rec(1, "UNCATEGORIZED", None),
            rec(2, "Matériaux", None),
            rec(3, "Ciment", Some(2)),
            rec(4, "Portland", Some(3)),
            rec(5, "Outillage", None),
        ];
        let forest = build_forest(&records);
        (TreeMutator::new(MemoryStore::with_records(records)), forest)
    }

    #[tokio::test]
    async fn create_trims_name_and_returns_stored_record() {
        let (mutator, forest) = fixture();
        let record = mutator.create(&forest, "  Peinture ", Some(id(2))).await.unwrap();
        assert_eq!(record.nom, "Peinture");
        assert_eq!(record.parent_id, Some(id(2)));
        assert_eq!(
            mutator.store().calls().await,
            vec![StoreCall::Create(NewCategory::new("Peinture", Some(id(2))))]
        );
    }

    #[tokio::test]
    async fn blank_name_is_rejected_without_store_call() {
        let (mutator, forest) = fixture();
        let err = mutator.create(&forest, "   ", None).await.unwrap_err();
        assert!(matches!(err, MutationError::Validation { ref field, .. } if field == "nom"));
        let err = mutator.rename(&forest, id(3), "").await.unwrap_err();
        assert!(matches!(err, MutationError::Validation { .. }));
        assert!(mutator.store().calls().await.is_empty());
    }

    #[tokio::test]
    async fn create_under_unknown_parent_is_not_found() {
        let (mutator, forest) = fixture();
        let err = mutator.create(&forest, "X", Some(id(99))).await.unwrap_err();
        assert_eq!(err, MutationError::NotFound(id(99)));
        assert!(mutator.store().calls().await.is_empty());
    }

    #[tokio::test]
    async fn create_with_keeps_description_and_locales() {
        let (mutator, forest) = fixture();
        let mut category = NewCategory::new("Peinture", None);
        category.description = Some("murs et plafonds".into());
        category.locales.nom_en = Some("Paint".into());
        let record = mutator.create_with(&forest, category).await.unwrap();
        assert_eq!(record.description.as_deref(), Some("murs et plafonds"));
        assert_eq!(record.locales.nom_en.as_deref(), Some("Paint"));
    }

    #[tokio::test]
    async fn rename_sends_only_the_name() {
        let (mutator, forest) = fixture();
        let outcome = mutator.rename(&forest, id(3), " Ciments ").await.unwrap();
        assert!(matches!(outcome, MutationOutcome::Updated(ref r) if r.nom == "Ciments" && r.parent_id == Some(id(2))));
        assert_eq!(
            mutator.store().calls().await,
            vec![StoreCall::Update(id(3), CategoryPatch::rename("Ciments"))]
        );
    }

    #[tokio::test]
    async fn rename_to_same_name_is_a_no_op() {
        let (mutator, forest) = fixture();
        let outcome = mutator.rename(&forest, id(3), "Ciment ").await.unwrap();
        assert_eq!(outcome, MutationOutcome::Unchanged { id: id(3) });
        assert!(!outcome.changed());
        assert!(mutator.store().calls().await.is_empty());
    }

    #[tokio::test]
    async fn reparent_under_descendant_is_a_cycle() {
        let (mutator, forest) = fixture();
        let err = mutator.reparent(&forest, id(2), Some(id(4))).await.unwrap_err();
        assert_eq!(err, MutationError::Cycle { id: id(2), parent: id(4) });
        assert!(err.is_local());
        assert!(mutator.store().calls().await.is_empty());
    }

    #[tokio::test]
    async fn reparent_under_itself_is_a_cycle() {
        let (mutator, forest) = fixture();
        let err = mutator.reparent(&forest, id(3), Some(id(3))).await.unwrap_err();
        assert!(matches!(err, MutationError::Cycle { .. }));
    }

    #[tokio::test]
    async fn reparent_to_current_parent_is_a_no_op() {
        let (mutator, forest) = fixture();
        let outcome = mutator.reparent(&forest, id(3), Some(id(2))).await.unwrap();
        assert_eq!(outcome, MutationOutcome::Unchanged { id: id(3) });
        let outcome = mutator.reparent(&forest, id(5), None).await.unwrap();
        assert_eq!(outcome, MutationOutcome::Unchanged { id: id(5) });
        assert!(mutator.store().calls().await.is_empty());
    }

    #[tokio::test]
    async fn reparent_sends_only_parent() {
        let (mutator, forest) = fixture();
        mutator.reparent(&forest, id(4), Some(id(5))).await.unwrap();
        mutator.reparent(&forest, id(3), None).await.unwrap();
        assert_eq!(
            mutator.store().calls().await,
            vec![
                StoreCall::Update(id(4), CategoryPatch::reparent(Some(id(5)))),
                StoreCall::Update(id(3), CategoryPatch::reparent(None)),
            ]
        );
    }

    #[tokio::test]
    async fn protected_node_is_never_deleted_or_prompted() {
        let (mutator, forest) = fixture();
        let err = mutator.delete(&forest, id(1), &AlwaysConfirm).await.unwrap_err();
        assert_eq!(err, MutationError::ProtectedNode { id: id(1) });
        assert!(mutator.store().calls().await.is_empty());
    }

    #[tokio::test]
    async fn protected_by_name_is_case_insensitive() {
        let records = vec![rec(7, "Uncategorized", None), rec(8, "A", None)];
        let forest = build_forest(&records);
        let mutator = TreeMutator::new(MemoryStore::with_records(records));
        let err = mutator.delete(&forest, id(7), &AlwaysConfirm).await.unwrap_err();
        assert_eq!(err, MutationError::ProtectedNode { id: id(7) });
    }

    #[tokio::test]
    async fn deleting_parent_of_protected_node_is_refused() {
        let records = vec![rec(1, "UNCATEGORIZED", Some(2)), rec(2, "Wrapper", None)];
        let forest = build_forest(&records);
        let mutator = TreeMutator::new(MemoryStore::with_records(records));
        let err = mutator.delete(&forest, id(2), &AlwaysConfirm).await.unwrap_err();
        assert_eq!(err, MutationError::ProtectedNode { id: id(1) });
    }

    #[tokio::test]
    async fn declined_delete_issues_no_store_call() {
        let (mutator, forest) = fixture();
        let outcome = mutator.delete(&forest, id(2), &NeverConfirm).await.unwrap();
        assert_eq!(outcome, MutationOutcome::Cancelled { id: id(2) });
        assert!(mutator.store().calls().await.is_empty());
    }

    #[tokio::test]
    async fn confirmed_delete_cascades() {
        let (mutator, forest) = fixture();
        let outcome = mutator.delete(&forest, id(2), &AlwaysConfirm).await.unwrap();
        assert_eq!(outcome, MutationOutcome::Deleted { id: id(2), descendants: 2 });
        let remaining: Vec<u64> = mutator
            .store()
            .snapshot()
            .await
            .iter()
            .map(|r| r.id.get())
            .collect();
        assert_eq!(remaining, vec![1, 5]);
    }

    #[tokio::test]
    async fn store_failure_is_surfaced_verbatim() {
        let (mutator, forest) = fixture();
        mutator.store().fail_next(StoreOp::Update, "Catégorie introuvable").await;
        let err = mutator.rename(&forest, id(3), "Béton").await.unwrap_err();
        assert_eq!(err.to_string(), "Catégorie introuvable");
        assert!(!err.is_local());
        assert_eq!(err.transience(), crate::error::Transience::Unknown);
    }

    #[tokio::test]
    async fn protected_node_with_children_is_never_deleted() {
        let records = vec![
            rec(1, "UNCATEGORIZED", None),
            rec(2, "À trier", Some(1)),
            rec(3, "Divers", Some(2)),
        ];
        let forest = build_forest(&records);
        let mutator = TreeMutator::new(MemoryStore::with_records(records));
        let err = mutator.delete(&forest, id(1), &AlwaysConfirm).await.unwrap_err();
        assert_eq!(err, MutationError::ProtectedNode { id: id(1) });
        assert!(mutator.store().calls().await.is_empty());
        assert_eq!(mutator.store().snapshot().await.len(), 3);
    }

    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_current_thread().build().unwrap()
    }

    /// True when `ancestor` sits on the parent chain of `from` (or is it).
    fn in_subtree(records: &[CategoryRecord], from: CategoryId, ancestor: CategoryId) -> bool {
        let mut current = Some(from);
        while let Some(cur) = current {
            if cur == ancestor {
                return true;
            }
            current = records.iter().find(|r| r.id == cur).and_then(|r| r.parent_id);
        }
        false
    }

    proptest! {
        #[test]
        fn reparent_rejects_exactly_the_moves_that_close_a_cycle(
            records in acyclic_records().prop_filter("non-empty", |r| !r.is_empty()),
            node in any::<Index>(),
            target in any::<Index>(),
        ) {
            let node = &records[node.index(records.len())];
            let target = records[target.index(records.len())].id;
            let forest = build_forest(&records);
            let mutator = TreeMutator::new(MemoryStore::with_records(records.clone()));

            let (result, calls) = runtime().block_on(async {
                let result = mutator.reparent(&forest, node.id, Some(target)).await;
                (result, mutator.store().calls().await)
            });

            if in_subtree(&records, target, node.id) {
                prop_assert_eq!(result, Err(MutationError::Cycle { id: node.id, parent: target }));
                prop_assert!(calls.is_empty());
            } else if node.parent_id == Some(target) {
                prop_assert_eq!(result, Ok(MutationOutcome::Unchanged { id: node.id }));
                prop_assert!(calls.is_empty());
            } else {
                prop_assert!(
                    matches!(&result, Ok(MutationOutcome::Updated(r)) if r.parent_id == Some(target))
                );
                prop_assert_eq!(
                    calls,
                    vec![StoreCall::Update(node.id, CategoryPatch::reparent(Some(target)))]
                );
            }
        }

        #[test]
        fn moving_to_root_never_cycles(
            records in acyclic_records().prop_filter("non-empty", |r| !r.is_empty()),
            node in any::<Index>(),
        ) {
            let node = &records[node.index(records.len())];
            let forest = build_forest(&records);
            let mutator = TreeMutator::new(MemoryStore::with_records(records.clone()));

            let result = runtime().block_on(mutator.reparent(&forest, node.id, None));
            prop_assert!(result.is_ok());
            let rebuilt = build_forest(&runtime().block_on(mutator.store().snapshot()));
            prop_assert_eq!(rebuilt.len(), records.len());
            prop_assert!(rebuilt.roots().iter().any(|root| root.id() == node.id));
        }
    }
}
