//! Category records as the store sees them.

use serde::{Deserialize, Serialize};

use super::identity::CategoryId;

/// Optional translated display names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocaleNames {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nom_ar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nom_en: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nom_zh: Option<String>,
}

impl LocaleNames {
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        [&self.nom_ar, &self.nom_en, &self.nom_zh]
            .into_iter()
            .filter_map(|name| name.as_deref())
    }
}

/// Persisted category. The store is the only writer of `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRecord {
    pub id: CategoryId,
    pub nom: String,
    #[serde(default)]
    pub parent_id: Option<CategoryId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub locales: LocaleNames,
}

impl CategoryRecord {
    pub fn new(id: CategoryId, nom: impl Into<String>, parent_id: Option<CategoryId>) -> Self {
        Self {
            id,
            nom: nom.into(),
            parent_id,
            description: None,
            locales: LocaleNames::default(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Create payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCategory {
    pub nom: String,
    #[serde(default)]
    pub parent_id: Option<CategoryId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub locales: LocaleNames,
}

impl NewCategory {
    pub fn new(nom: impl Into<String>, parent_id: Option<CategoryId>) -> Self {
        Self {
            nom: nom.into(),
            parent_id,
            ..Self::default()
        }
    }
}

/// Partial update. `None` leaves a field untouched.
///
/// `parent_id: Some(None)` moves the record to the root level.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryPatch {
    pub nom: Option<String>,
    pub parent_id: Option<Option<CategoryId>>,
}

impl CategoryPatch {
    pub fn rename(nom: impl Into<String>) -> Self {
        Self {
            nom: Some(nom.into()),
            ..Self::default()
        }
    }

    pub fn reparent(parent_id: Option<CategoryId>) -> Self {
        Self {
            parent_id: Some(parent_id),
            ..Self::default()
        }
    }

    pub fn apply_to(&self, record: &mut CategoryRecord) {
        if let Some(nom) = &self.nom {
            record.nom = nom.clone();
        }
        if let Some(parent_id) = self.parent_id {
            record.parent_id = parent_id;
        }
    }
}
