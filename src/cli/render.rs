//! Human renderer for CLI outputs.
//!
//! Pure formatting; handlers gather whatever data is needed.

use crate::batch::BatchReport;
use crate::core::{CategoryId, CategoryRecord};
use crate::mutate::MutationOutcome;
use crate::view::Row;

/// Indented tree, one category per line.
///
/// `▾` marks an expanded node with children, `▸` a collapsed one.
pub fn render_tree(rows: &[Row]) -> String {
    if rows.is_empty() {
        return "No categories".into();
    }
    let mut out = String::new();
    for row in rows {
        if !out.is_empty() {
            out.push('\n');
        }
        let marker = match (row.has_children, row.expanded) {
            (false, _) => '•',
            (true, true) => '▾',
            (true, false) => '▸',
        };
        out.push_str(&"  ".repeat(row.depth));
        out.push_str(&format!("{marker} {} (#{})", row.name, row.id));
        if !row.expanded && row.child_count > 0 {
            out.push_str(&format!(" [{}]", row.child_count));
        }
        if row.protected {
            out.push_str(" (protected)");
        }
    }
    out
}

pub fn render_record(
    record: &CategoryRecord,
    path: &[String],
    children: &[(CategoryId, String)],
    descendants: usize,
    protected: bool,
) -> String {
    let mut out = format!("#{} {}", record.id, record.nom);
    if protected {
        out.push_str(" (protected)");
    }
    out.push('\n');
    if path.len() > 1 {
        out.push_str(&format!("  Path: {}\n", path.join(" / ")));
    }
    match record.parent_id {
        Some(parent) => out.push_str(&format!("  Parent: #{parent}\n")),
        None => out.push_str("  Parent: (root)\n"),
    }
    if let Some(description) = &record.description {
        out.push_str(&format!("  Description: {description}\n"));
    }
    for (label, name) in [
        ("en", &record.locales.nom_en),
        ("ar", &record.locales.nom_ar),
        ("zh", &record.locales.nom_zh),
    ] {
        if let Some(name) = name {
            out.push_str(&format!("  Name ({label}): {name}\n"));
        }
    }
    if children.is_empty() {
        out.push_str("  Children: none");
    } else {
        out.push_str(&format!(
            "  Children: {} ({descendants} in subtree)",
            children.len()
        ));
        for (id, name) in children {
            out.push_str(&format!("\n    - {name} (#{id})"));
        }
    }
    out
}

/// One-line confirmation for a mutation.
pub fn render_outcome(outcome: &MutationOutcome, status: &str) -> String {
    match outcome {
        MutationOutcome::Created(record) | MutationOutcome::Updated(record) => {
            format!("✓ {status}: {} (#{})", record.nom, record.id)
        }
        MutationOutcome::Deleted { id, descendants: 0 } => format!("✓ {status}: #{id}"),
        MutationOutcome::Deleted { id, descendants: 1 } => {
            format!("✓ {status}: #{id} and 1 sub-category")
        }
        MutationOutcome::Deleted { id, descendants } => {
            format!("✓ {status}: #{id} and {descendants} sub-categories")
        }
        MutationOutcome::Unchanged { id } | MutationOutcome::Cancelled { id } => {
            format!("{status} (#{id})")
        }
    }
}

pub fn render_batch(report: &BatchReport) -> String {
    let mut out = String::new();
    for record in &report.created {
        out.push_str(&format!("✓ {} (#{})\n", record.nom, record.id));
    }
    out.push_str(&report.summary());
    out
}
