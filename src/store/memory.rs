use async_trait::async_trait;
use tokio::sync::Mutex;

use super::table::RecordTable;
use super::{CategoryStore, StoreError};
use crate::core::{CategoryId, CategoryPatch, CategoryRecord, NewCategory};

/// Store operation kinds, used to script failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp {
    List,
    Create,
    Update,
    Delete,
}

/// One call received by a [`MemoryStore`], successful or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    List,
    Create(NewCategory),
    Update(CategoryId, CategoryPatch),
    Delete(CategoryId),
}

impl StoreCall {
    pub fn op(&self) -> StoreOp {
        match self {
            StoreCall::List => StoreOp::List,
            StoreCall::Create(_) => StoreOp::Create,
            StoreCall::Update(..) => StoreOp::Update,
            StoreCall::Delete(_) => StoreOp::Delete,
        }
    }
}

#[derive(Debug, Clone)]
struct ScriptedFailure {
    op: StoreOp,
    nom: Option<String>,
    message: String,
}

impl ScriptedFailure {
    fn matches(&self, call: &StoreCall) -> bool {
        if self.op != call.op() {
            return false;
        }
        match (&self.nom, call) {
            (None, _) => true,
            (Some(nom), StoreCall::Create(category)) => category.nom.trim() == nom,
            (Some(nom), StoreCall::Update(_, patch)) => patch.nom.as_deref().map(str::trim) == Some(nom.as_str()),
            (Some(_), _) => false,
        }
    }
}

/// In-process store. Records every call and can be scripted to fail.
#[derive(Default)]
pub struct MemoryStore {
    table: Mutex<RecordTable>,
    calls: Mutex<Vec<StoreCall>>,
    failures: Mutex<Vec<ScriptedFailure>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: impl IntoIterator<Item = CategoryRecord>) -> Self {
        Self {
            table: Mutex::new(RecordTable::from_records(records)),
            ..Self::default()
        }
    }

    /// Every call received so far, in order.
    pub async fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().await.clone()
    }

    /// Calls that would have changed data (everything except `list`).
    pub async fn write_calls(&self) -> Vec<StoreCall> {
        self.calls
            .lock()
            .await
            .iter()
            .filter(|call| call.op() != StoreOp::List)
            .cloned()
            .collect()
    }

    pub async fn clear_calls(&self) {
        self.calls.lock().await.clear();
    }

    /// Make the next call of kind `op` fail with `message`.
    pub async fn fail_next(&self, op: StoreOp, message: impl Into<String>) {
        self.failures.lock().await.push(ScriptedFailure {
            op,
            nom: None,
            message: message.into(),
        });
    }

    /// Make the next create (or rename) to `nom` fail with `message`.
    pub async fn fail_name(&self, op: StoreOp, nom: impl Into<String>, message: impl Into<String>) {
        self.failures.lock().await.push(ScriptedFailure {
            op,
            nom: Some(nom.into()),
            message: message.into(),
        });
    }

    pub async fn snapshot(&self) -> Vec<CategoryRecord> {
        self.table.lock().await.list()
    }

    async fn record(&self, call: StoreCall) -> Result<(), StoreError> {
        let failure = {
            let mut failures = self.failures.lock().await;
            failures
                .iter()
                .position(|failure| failure.matches(&call))
                .map(|index| failures.remove(index))
        };
        self.calls.lock().await.push(call);
        match failure {
            Some(failure) => Err(StoreError::new(failure.message)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl CategoryStore for MemoryStore {
    async fn list(&self) -> Result<Vec<CategoryRecord>, StoreError> {
        self.record(StoreCall::List).await?;
        Ok(self.table.lock().await.list())
    }

    async fn create(&self, category: NewCategory) -> Result<CategoryRecord, StoreError> {
        self.record(StoreCall::Create(category.clone())).await?;
        self.table.lock().await.insert(category)
    }

    async fn update(&self, id: CategoryId, patch: CategoryPatch) -> Result<CategoryRecord, StoreError> {
        self.record(StoreCall::Update(id, patch.clone())).await?;
        self.table.lock().await.update(id, &patch)
    }

    async fn delete(&self, id: CategoryId) -> Result<(), StoreError> {
        self.record(StoreCall::Delete(id)).await?;
        self.table.lock().await.delete(id).map(|_| ())
    }
}
