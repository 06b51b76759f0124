use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::table::{RecordTable, Snapshot};
use super::{CategoryStore, StoreError};
use crate::core::{CategoryId, CategoryPatch, CategoryRecord, NewCategory};

/// JSON snapshot store.
///
/// Every write reloads the file, applies the change and replaces the file
/// atomically, so a crash never leaves a half-written snapshot. A missing
/// file reads as an empty store.
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn write<T, F>(&self, change: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut RecordTable) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let _guard = self.lock.lock().await;
        let path = self.path.clone();
        blocking(move || {
            let mut table = load(&path)?;
            let out = change(&mut table)?;
            save(&path, &table)?;
            Ok(out)
        })
        .await
    }
}

/// Run file I/O off the async worker threads.
async fn blocking<T, F>(task: F) -> Result<T, StoreError>
where
    F: FnOnce() -> Result<T, StoreError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| StoreError::new(format!("store task failed: {e}")))?
}

fn load(path: &Path) -> Result<RecordTable, StoreError> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(RecordTable::default()),
        Err(e) => {
            return Err(StoreError::new(format!(
                "failed to read {}: {e}",
                path.display()
            )));
        }
    };
    if contents.trim().is_empty() {
        return Ok(RecordTable::default());
    }
    let snapshot: Snapshot = serde_json::from_str(&contents)
        .map_err(|e| StoreError::new(format!("failed to parse {}: {e}", path.display())))?;
    Ok(RecordTable::from_snapshot(snapshot))
}

fn save(path: &Path, table: &RecordTable) -> Result<(), StoreError> {
    let data = serde_json::to_vec_pretty(&table.to_snapshot())
        .map_err(|e| StoreError::new(format!("failed to encode store: {e}")))?;
    atomic_write(path, &data)
}

fn atomic_write(path: &Path, data: &[u8]) -> Result<(), StoreError> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)
        .map_err(|e| StoreError::new(format!("failed to create {}: {e}", dir.display())))?;
    let temp = tempfile::NamedTempFile::new_in(dir).map_err(|e| {
        StoreError::new(format!("failed to create temp file in {}: {e}", dir.display()))
    })?;
    fs::write(temp.path(), data)
        .map_err(|e| StoreError::new(format!("failed to write store temp file: {e}")))?;
    temp.persist(path)
        .map_err(|e| StoreError::new(format!("failed to persist {}: {e}", path.display())))?;
    Ok(())
}

#[async_trait]
impl CategoryStore for FileStore {
    async fn list(&self) -> Result<Vec<CategoryRecord>, StoreError> {
        let _guard = self.lock.lock().await;
        let path = self.path.clone();
        blocking(move || load(&path).map(|table| table.list())).await
    }

    async fn create(&self, category: NewCategory) -> Result<CategoryRecord, StoreError> {
        self.write(move |table| table.insert(category)).await
    }

    async fn update(&self, id: CategoryId, patch: CategoryPatch) -> Result<CategoryRecord, StoreError> {
        self.write(move |table| table.update(id, &patch)).await
    }

    async fn delete(&self, id: CategoryId) -> Result<(), StoreError> {
        let removed = self.write(move |table| table.delete(id)).await?;
        tracing::debug!(category = %id, removed = removed.len(), "deleted subtree from file store");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn missing_file_lists_empty() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("categories.json"));
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn records_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("categories.json");

        let store = FileStore::new(&path);
        let root = store.create(NewCategory::new("Matériaux", None)).await.unwrap();
        store
            .create(NewCategory::new("Ciment", Some(root.id)))
            .await
            .unwrap();
        drop(store);

        let reopened = FileStore::new(&path);
        let records = reopened.list().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].parent_id, Some(root.id));

        let next = reopened.create(NewCategory::new("Peinture", None)).await.unwrap();
        assert_eq!(next.id, CategoryId::new(3));
    }

    #[tokio::test]
    async fn failed_write_leaves_file_untouched() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("categories.json");
        let store = FileStore::new(&path);
        store.create(NewCategory::new("A", None)).await.unwrap();
        let before = fs::read_to_string(&path).unwrap();

        assert!(store.delete(CategoryId::new(42)).await.is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), before);
    }

    #[tokio::test]
    async fn corrupt_file_is_a_store_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("categories.json");
        fs::write(&path, "not json").unwrap();
        let err = FileStore::new(&path).list().await.unwrap_err();
        assert!(err.message.contains("failed to parse"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_creates_on_a_multi_thread_runtime_get_distinct_ids() {
        let dir = TempDir::new().unwrap();
        let store = std::sync::Arc::new(FileStore::new(dir.path().join("categories.json")));

        let tasks: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move { store.create(NewCategory::new(format!("C{i}"), None)).await })
            })
            .collect();
        let mut ids = std::collections::BTreeSet::new();
        for task in tasks {
            ids.insert(task.await.unwrap().unwrap().id);
        }

        assert_eq!(ids.len(), 8);
        assert_eq!(store.list().await.unwrap().len(), 8);
    }
}
