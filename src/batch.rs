//! Batch creation of sibling categories from multi-line text.

use serde::{Serialize, Serializer};

use crate::core::{CategoryId, CategoryRecord};
use crate::mutate::{MutationError, TreeMutator};
use crate::store::CategoryStore;
use crate::tree::Forest;

/// One name per line; surrounding whitespace and blank lines are dropped.
pub fn parse_batch_names(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchFailure {
    pub name: String,
    #[serde(serialize_with = "display")]
    pub error: MutationError,
}

/// What a batch managed to do before finishing or stopping.
///
/// A batch stops at the first failure; records created before it stay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub requested: usize,
    pub created: Vec<CategoryRecord>,
    pub failed: Option<BatchFailure>,
}

impl BatchReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_none()
    }

    pub fn summary(&self) -> String {
        let created = self.created.len();
        match &self.failed {
            None => format!("created {created} {}", noun(created)),
            Some(failure) => format!(
                "created {created} of {} {}; stopped at \"{}\": {}",
                self.requested,
                noun(self.requested),
                failure.name,
                failure.error
            ),
        }
    }
}

fn noun(count: usize) -> &'static str {
    if count == 1 { "category" } else { "categories" }
}

fn display<S: Serializer>(err: &MutationError, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(err)
}

impl<S: CategoryStore> TreeMutator<S> {
    /// Create one sibling per non-blank line of `text`, in order.
    pub async fn batch_create(
        &self,
        forest: &Forest,
        text: &str,
        parent: Option<CategoryId>,
    ) -> Result<BatchReport, MutationError> {
        let names = parse_batch_names(text);
        if names.is_empty() {
            tracing::warn!("batch create with no names");
            return Err(MutationError::validation("names", "enter at least one name"));
        }
        if let Some(parent) = parent
            && !forest.contains(parent)
        {
            tracing::warn!(parent = %parent, "batch create under unknown parent");
            return Err(MutationError::NotFound(parent));
        }

        let mut report = BatchReport {
            requested: names.len(),
            created: Vec::with_capacity(names.len()),
            failed: None,
        };
        for name in names {
            match self.create(forest, &name, parent).await {
                Ok(record) => report.created.push(record),
                Err(error) => {
                    report.failed = Some(BatchFailure { name, error });
                    break;
                }
            }
        }
        tracing::info!(
            created = report.created.len(),
            requested = report.requested,
            "batch create finished"
        );
        Ok(report)
    }
}
