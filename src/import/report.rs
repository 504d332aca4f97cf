//! Summary of an import run

use serde::Serialize;

use crate::domain::RemoteId;

/// Created vs. matched-existing count for a deduplicated entity kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Tally {
    pub created: usize,
    pub reused: usize,
}

/// What an import did (or, in a dry run, would do)
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportReport {
    pub dry_run: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<RemoteId>,
    pub project_created: bool,

    pub purged_tasks: usize,
    pub purged_buckets: usize,

    pub buckets: Tally,
    pub labels: Tally,
    pub tasks: usize,
    pub task_labels: usize,
    pub assignees: usize,
    pub comments: usize,
    pub checklists: usize,
    pub checklist_items: usize,

    /// Tolerated failures, one line per failed step
    pub failures: Vec<String>,

    /// Requests issued (logged only, in a dry run)
    pub requests: usize,
}

impl ImportReport {
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Default::default()
        }
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Human-readable summary
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        let verb = if self.dry_run { "Planned" } else { "Imported" };

        if let Some(project) = self.project_id {
            let how = if self.project_created { "created" } else { "existing" };
            lines.push(format!("{} into project {} ({})", verb, project, how));
        }
        if self.purged_tasks > 0 || self.purged_buckets > 0 {
            lines.push(format!(
                "Purged: {} tasks, {} buckets",
                self.purged_tasks, self.purged_buckets
            ));
        }
        lines.push(format!(
            "Buckets: {} created, {} reused",
            self.buckets.created, self.buckets.reused
        ));
        lines.push(format!(
            "Labels: {} created, {} reused",
            self.labels.created, self.labels.reused
        ));
        lines.push(format!(
            "Tasks: {} ({} labels, {} assignees, {} comments)",
            self.tasks, self.task_labels, self.assignees, self.comments
        ));
        lines.push(format!(
            "Checklists: {} ({} items)",
            self.checklists, self.checklist_items
        ));
        if self.has_failures() {
            lines.push(format!("Failed steps: {}", self.failures.len()));
        }
        if self.dry_run {
            lines.push(format!("Requests planned: {}", self.requests));
        }

        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dry_run_summary_mentions_planned_requests() {
        let report = ImportReport {
            project_id: Some(RemoteId::Planned(1)),
            project_created: true,
            requests: 9,
            ..ImportReport::new(true)
        };

        let lines = report.lines();
        assert_eq!(lines[0], "Planned into project planned-1 (created)");
        assert!(lines.contains(&"Requests planned: 9".to_string()));
    }

    #[test]
    fn failures_are_counted() {
        let mut report = ImportReport::new(false);
        assert!(!report.has_failures());
        report.failures.push("create label x failed".to_string());

        assert!(report.lines().contains(&"Failed steps: 1".to_string()));
    }
}
