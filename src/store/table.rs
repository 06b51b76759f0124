//! Record table shared by the bundled store adapters.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::StoreError;
use crate::core::{CategoryId, CategoryPatch, CategoryRecord, NewCategory};

/// On-disk shape of a table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct Snapshot {
    #[serde(default)]
    pub next_id: u64,
    #[serde(default)]
    pub categories: Vec<CategoryRecord>,
}

#[derive(Debug, Clone)]
pub(crate) struct RecordTable {
    records: BTreeMap<CategoryId, CategoryRecord>,
    /// `None` once `u64::MAX` has been handed out.
    next_id: Option<u64>,
}

impl Default for RecordTable {
    fn default() -> Self {
        Self::from_records([])
    }
}

impl RecordTable {
    pub fn from_records(records: impl IntoIterator<Item = CategoryRecord>) -> Self {
        Self::from_snapshot(Snapshot {
            next_id: 0,
            categories: records.into_iter().collect(),
        })
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let records: BTreeMap<CategoryId, CategoryRecord> = snapshot
            .categories
            .into_iter()
            .map(|record| (record.id, record))
            .collect();
        let after_max = match records.keys().next_back() {
            Some(id) => id.get().checked_add(1),
            None => Some(1),
        };
        Self {
            records,
            next_id: after_max.map(|after| snapshot.next_id.max(after)),
        }
    }

    pub fn to_snapshot(&self) -> Snapshot {
        Snapshot {
            next_id: self.next_id.unwrap_or(u64::MAX),
            categories: self.list(),
        }
    }

    pub fn list(&self) -> Vec<CategoryRecord> {
        self.records.values().cloned().collect()
    }

    pub fn insert(&mut self, category: NewCategory) -> Result<CategoryRecord, StoreError> {
        let nom = required_name(&category.nom)?;
        if let Some(parent) = category.parent_id {
            self.require(parent)?;
        }
        let raw = self
            .next_id
            .ok_or_else(|| StoreError::new("no category ids left"))?;
        let id = CategoryId::new(raw);
        self.next_id = raw.checked_add(1);
        let record = CategoryRecord {
            id,
            nom,
            parent_id: category.parent_id,
            description: clean_description(category.description.as_deref()),
            locales: category.locales,
        };
        self.records.insert(id, record.clone());
        Ok(record)
    }

    pub fn update(&mut self, id: CategoryId, patch: &CategoryPatch) -> Result<CategoryRecord, StoreError> {
        self.require(id)?;
        let mut patch = patch.clone();
        if let Some(nom) = &patch.nom {
            patch.nom = Some(required_name(nom)?);
        }
        if let Some(Some(parent)) = patch.parent_id {
            self.require(parent)?;
        }
        let record = self
            .records
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found(id))?;
        patch.apply_to(record);
        Ok(record.clone())
    }

    /// Remove `id` and every record below it. Returns the removed ids.
    pub fn delete(&mut self, id: CategoryId) -> Result<BTreeSet<CategoryId>, StoreError> {
        self.require(id)?;
        let mut doomed = BTreeSet::from([id]);
        let mut frontier = vec![id];
        while let Some(parent) = frontier.pop() {
            for record in self.records.values() {
                if record.parent_id == Some(parent) && doomed.insert(record.id) {
                    frontier.push(record.id);
                }
            }
        }
        self.records.retain(|id, _| !doomed.contains(id));
        Ok(doomed)
    }

    fn require(&self, id: CategoryId) -> Result<(), StoreError> {
        if self.records.contains_key(&id) {
            Ok(())
        } else {
            Err(StoreError::not_found(id))
        }
    }
}

fn required_name(raw: &str) -> Result<String, StoreError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(StoreError::new("name is required"));
    }
    Ok(trimmed.to_string())
}

fn clean_description(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|description| !description.is_empty())
        .map(str::to_string)
}
