//! Run configuration for one import

use crate::source::AssigneeMap;

/// Exact token `--purge-confirm` must carry
pub const PURGE_CONFIRMATION: &str = "YES";

/// Behavioral switches of an import
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    /// Import into this project instead of creating one
    pub project_id: Option<i64>,

    pub continue_on_error: bool,
    pub skip_labels: bool,
    pub skip_checklists: bool,

    /// Assignee display name → user ID
    pub assignee_map: AssigneeMap,

    /// Splits comment text; the list heuristic applies when unset
    pub comment_delimiter: Option<String>,

    /// Delete existing tasks and buckets first
    pub purge_project: bool,
    pub purge_confirm: Option<String>,

    /// Only import the first N tasks (by sequence); 0 means no limit
    pub limit_tasks: Option<usize>,
}

impl ImportOptions {
    /// True when a purge was requested with the exact confirmation token
    pub fn purge_confirmed(&self) -> bool {
        self.purge_confirm.as_deref() == Some(PURGE_CONFIRMATION)
    }

    /// Effective task limit
    pub fn task_limit(&self) -> Option<usize> {
        self.limit_tasks.filter(|n| *n > 0)
    }
}
