//! `inspect` command

use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{Context, Result};

use super::output::Output;
use crate::domain::{Export, ExportSummary};
use crate::source::load_export;

/// Distinct, sorted assignee names of an export
fn assignees(export: &Export) -> Vec<&str> {
    export
        .tasks
        .iter()
        .map(|t| t.assignee_name.trim())
        .filter(|name| !name.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

pub fn run(output: &Output, input: &Path) -> Result<()> {
    let export = load_export(input)
        .with_context(|| format!("Failed to load export: {}", input.display()))?;
    let summary = export.summary();
    let assignees = assignees(&export);

    if output.is_json() {
        output.data(&serde_json::json!({
            "project": export.project.name,
            "summary": summary,
            "assignees": assignees,
        }));
        return Ok(());
    }

    println!("Project: {}", export.project.name);
    println!();
    print_counts(&summary);
    if !assignees.is_empty() {
        println!();
        println!("Assignees: {}", assignees.join(", "));
    }

    Ok(())
}

fn print_counts(summary: &ExportSummary) {
    let rows = [
        ("Sections", summary.sections),
        ("Tasks", summary.tasks),
        ("Labels", summary.labels),
        ("Task labels", summary.task_labels),
        ("Checklists", summary.checklists),
        ("Checklist items", summary.checklist_items),
    ];

    println!("{:<16} COUNT", "ENTITY");
    println!("{}", "-".repeat(24));
    for (name, count) in rows {
        println!("{:<16} {}", name, count);
    }
}
