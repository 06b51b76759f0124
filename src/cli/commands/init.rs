use serde::Serialize;

use super::super::Ctx;
use crate::Result;
use crate::core::{CategoryRecord, NewCategory};
use crate::mutate::MutationOutcome;
use crate::tree::DEFAULT_PROTECTED_NAME;

const DEFAULT_DESCRIPTION: &str = "Default category";

#[derive(Debug, Serialize)]
struct InitResult<'a> {
    status: &'static str,
    store: String,
    category: &'a CategoryRecord,
}

/// Seed the reserved fallback category unless one already exists.
pub(crate) async fn handle(ctx: &mut Ctx) -> Result<()> {
    let store = ctx.view.mutator().store().path().display().to_string();
    let policy = ctx.view.mutator().policy().clone();

    if let Some(existing) = ctx.view.records().iter().find(|record| policy.is_protected(record)) {
        let result = InitResult {
            status: "exists",
            store,
            category: existing,
        };
        return ctx.emit(&result, || {
            format!(
                "Already initialized: {} (#{}) in {}",
                existing.nom, existing.id, result.store
            )
        });
    }

    let name = match policy.name.trim() {
        "" => DEFAULT_PROTECTED_NAME,
        name => name,
    };
    let mut category = NewCategory::new(name, None);
    category.description = Some(DEFAULT_DESCRIPTION.to_string());

    let outcome = ctx.view.create_with(category).await?;
    let MutationOutcome::Created(record) = &outcome else {
        return Ok(());
    };
    if policy.id.is_some_and(|id| id != record.id) {
        tracing::warn!(
            category = %record.id,
            "seeded category did not get the reserved id; it is protected by name only"
        );
    }
    let result = InitResult {
        status: "initialized",
        store,
        category: record,
    };
    ctx.emit(&result, || {
        format!("✓ Initialized {}: {} (#{})", result.store, record.nom, record.id)
    })
}
