//! Interactive tree session.
//!
//! `TreeView` holds one snapshot of the store and everything the user has
//! done to the presentation (expansion, search, drag). Mutations go through
//! the mutator; the snapshot is only replaced by a refetch after success, so
//! a failed call leaves the last known-good tree on screen.

mod drag;
mod expansion;
mod rows;
mod status;

use tracing::Instrument;

use crate::batch::BatchReport;
use crate::core::{CategoryId, CategoryRecord, NewCategory};
use crate::mutate::{Confirm, MutationError, MutationOutcome, TreeMutator};
use crate::store::{CategoryStore, StoreError};
use crate::tree::{Forest, build_forest, filter_forest};

pub use drag::{DragState, DropPosition, DropTarget, MoveRequest};
pub use expansion::ExpansionState;
pub use rows::Row;
pub use status::{StatusKind, StatusMessage};

pub struct TreeView<S> {
    mutator: TreeMutator<S>,
    records: Vec<CategoryRecord>,
    forest: Forest,
    expansion: ExpansionState,
    drag: DragState,
    search: String,
    status: Option<StatusMessage>,
}

impl<S: CategoryStore> TreeView<S> {
    /// Empty view; call [`TreeView::refresh`] to load.
    pub fn new(mutator: TreeMutator<S>) -> Self {
        Self {
            mutator,
            records: Vec::new(),
            forest: Forest::default(),
            expansion: ExpansionState::new(),
            drag: DragState::Idle,
            search: String::new(),
            status: None,
        }
    }

    pub fn mutator(&self) -> &TreeMutator<S> {
        &self.mutator
    }

    pub fn records(&self) -> &[CategoryRecord] {
        &self.records
    }

    /// Full, sorted forest (search not applied).
    pub fn forest(&self) -> &Forest {
        &self.forest
    }

    pub fn expansion(&self) -> &ExpansionState {
        &self.expansion
    }

    pub fn drag(&self) -> &DragState {
        &self.drag
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    /// Reload from the store. On failure the previous snapshot stays.
    pub async fn refresh(&mut self) -> Result<(), StoreError> {
        let loaded = self
            .mutator
            .store()
            .list()
            .instrument(tracing::info_span!("refresh"))
            .await;
        match loaded {
            Ok(records) => {
                let mut forest = build_forest(&records);
                forest.sort_by_name();
                self.expansion.prune(&forest);
                tracing::debug!(records = records.len(), "tree rebuilt");
                self.records = records;
                self.forest = forest;
                Ok(())
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to load categories");
                self.status = Some(StatusMessage::error(err.message.clone()));
                Err(err)
            }
        }
    }

    pub fn set_search(&mut self, query: impl Into<String>) {
        self.search = query.into();
    }

    /// The forest after applying the search query.
    pub fn visible_forest(&self) -> Forest {
        filter_forest(&self.forest, &self.search)
    }

    pub fn rows(&self) -> Vec<Row> {
        rows::flatten(
            &self.visible_forest(),
            &self.expansion,
            self.mutator.policy(),
            &self.drag,
        )
    }

    pub fn toggle(&mut self, id: CategoryId) -> bool {
        self.expansion.toggle(id)
    }

    pub fn expand_all(&mut self) {
        self.expansion.expand_all(&self.forest);
    }

    pub fn collapse_all(&mut self) {
        self.expansion.collapse_all(&self.forest);
    }

    pub fn set_expanded(&mut self, id: CategoryId, expanded: bool) {
        self.expansion.set(id, expanded);
    }

    pub fn drag_start(&mut self, id: CategoryId) {
        self.drag.start(id);
    }

    pub fn drag_enter(&mut self, target: DropTarget, position: DropPosition) {
        self.drag.enter(target, position);
    }

    pub fn drag_leave(&mut self) {
        self.drag.leave();
    }

    pub fn drag_cancel(&mut self) {
        self.drag.cancel();
    }

    /// Complete the drag. `None` when the gesture produced no move.
    pub async fn drop(&mut self) -> Option<Result<MutationOutcome, MutationError>> {
        let request = self.drag.drop()?;
        let result = match request.resolve_parent(&self.forest) {
            Some(parent) => self.mutator.reparent(&self.forest, request.id, parent).await,
            None => match request.target {
                DropTarget::Node(target) => Err(MutationError::NotFound(target)),
                DropTarget::Root => Err(MutationError::NotFound(request.id)),
            },
        };
        Some(self.settle(result, "Category moved").await)
    }

    pub async fn create(
        &mut self,
        name: &str,
        parent: Option<CategoryId>,
    ) -> Result<MutationOutcome, MutationError> {
        self.create_with(NewCategory::new(name, parent)).await
    }

    pub async fn create_with(&mut self, category: NewCategory) -> Result<MutationOutcome, MutationError> {
        let parent = category.parent_id;
        let result = self
            .mutator
            .create_with(&self.forest, category)
            .await
            .map(MutationOutcome::Created);
        if result.is_ok()
            && let Some(parent) = parent
        {
            self.expansion.set(parent, true);
        }
        self.settle(result, "Category created").await
    }

    pub async fn rename(&mut self, id: CategoryId, name: &str) -> Result<MutationOutcome, MutationError> {
        let result = self.mutator.rename(&self.forest, id, name).await;
        self.settle(result, "Category updated").await
    }

    pub async fn reparent(
        &mut self,
        id: CategoryId,
        parent: Option<CategoryId>,
    ) -> Result<MutationOutcome, MutationError> {
        let result = self.mutator.reparent(&self.forest, id, parent).await;
        self.settle(result, "Category moved").await
    }

    pub async fn delete<C>(&mut self, id: CategoryId, confirm: &C) -> Result<MutationOutcome, MutationError>
    where
        C: Confirm + ?Sized,
    {
        let result = self.mutator.delete(&self.forest, id, confirm).await;
        self.settle(result, "Category deleted").await
    }

    pub async fn batch_create(
        &mut self,
        text: &str,
        parent: Option<CategoryId>,
    ) -> Result<BatchReport, MutationError> {
        match self.mutator.batch_create(&self.forest, text, parent).await {
            Ok(report) => {
                self.status = Some(if report.is_complete() {
                    StatusMessage::success(report.summary())
                } else {
                    StatusMessage::error(report.summary())
                });
                if !report.created.is_empty() {
                    self.refetch().await;
                }
                Ok(report)
            }
            Err(err) => {
                self.status = Some(StatusMessage::error(err.to_string()));
                Err(err)
            }
        }
    }

    async fn settle(
        &mut self,
        result: Result<MutationOutcome, MutationError>,
        success: &str,
    ) -> Result<MutationOutcome, MutationError> {
        match &result {
            Ok(MutationOutcome::Unchanged { .. }) => {
                self.status = Some(StatusMessage::info("No changes"));
            }
            Ok(MutationOutcome::Cancelled { .. }) => {
                self.status = Some(StatusMessage::info("Delete cancelled"));
            }
            Ok(_) => {
                self.status = Some(StatusMessage::success(success));
                self.refetch().await;
            }
            Err(err) => {
                self.status = Some(StatusMessage::error(err.to_string()));
            }
        }
        result
    }

    async fn refetch(&mut self) {
        if let Err(err) = self.refresh().await {
            self.status = Some(StatusMessage::error(format!("refresh failed: {err}")));
        }
    }
}
