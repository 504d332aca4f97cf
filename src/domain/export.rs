//! Canonical export schema
//!
//! Every input format is normalized into an [`Export`]. The field names match
//! the Meistertask JSON export (local IDs live under `hashid`), so a JSON
//! document deserializes straight into this model.

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::id::LocalId;
use super::timestamp::deserialize_lenient;

/// Task status code for an open task
pub const TASK_STATUS_OPEN: i32 = 1;

/// Task status code for a completed task
pub const TASK_STATUS_DONE: i32 = 2;

/// Checklist item status code for a completed item
pub const CHECKLIST_ITEM_DONE: i32 = 5;

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A full export: one project and everything in it
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Export {
    pub project: Project,

    #[serde(default, deserialize_with = "null_as_default")]
    pub sections: Vec<Section>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub tasks: Vec<Task>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub labels: Vec<Label>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub task_labels: Vec<TaskLabel>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub checklists: Vec<Checklist>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub checklist_items: Vec<ChecklistItem>,
}

/// The exported project
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Project {
    #[serde(rename = "hashid", default)]
    pub id: Option<LocalId>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub notes: String,
}

/// A project section; becomes a kanban bucket
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    #[serde(rename = "hashid")]
    pub id: LocalId,

    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,

    #[serde(default)]
    pub sequence: Option<f64>,

    /// Work-in-progress limit for the column
    #[serde(default)]
    pub limit: Option<i64>,
}

/// A task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    #[serde(rename = "hashid")]
    pub id: LocalId,

    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub notes: String,

    /// Source status code (1 = open, 2 = done)
    #[serde(default)]
    pub status: Option<i32>,

    #[serde(default)]
    pub sequence: Option<f64>,

    #[serde(default)]
    pub section_id: Option<LocalId>,

    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub due: Option<DateTime<Utc>>,

    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub completed_at: Option<DateTime<Utc>>,

    /// Display name of the assignee (free text, not a user ID)
    #[serde(default, deserialize_with = "null_as_default")]
    pub assignee_name: String,

    /// All comments joined into one text cell
    #[serde(default, deserialize_with = "null_as_default")]
    pub comments_raw: String,
}

impl Task {
    /// Returns true if the source status marks this task completed
    pub fn is_done(&self) -> bool {
        self.status == Some(TASK_STATUS_DONE)
    }
}

/// A label
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Label {
    #[serde(rename = "hashid")]
    pub id: LocalId,

    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,

    #[serde(default)]
    pub color: Option<String>,
}

/// Association of a label with a task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskLabel {
    pub task_id: LocalId,
    pub label_id: LocalId,
}

/// A checklist attached to a task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checklist {
    #[serde(rename = "hashid")]
    pub id: LocalId,

    pub task_id: LocalId,

    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,

    #[serde(default)]
    pub sequence: Option<f64>,
}

/// An item of a checklist
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChecklistItem {
    #[serde(rename = "hashid", default)]
    pub id: Option<LocalId>,

    pub checklist_id: LocalId,

    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,

    #[serde(default)]
    pub sequence: Option<f64>,

    /// Source status code (5 = done)
    #[serde(default)]
    pub status: Option<i32>,
}

impl ChecklistItem {
    /// Returns true if the source status marks this item completed
    pub fn is_done(&self) -> bool {
        self.status == Some(CHECKLIST_ITEM_DONE)
    }
}

/// Entities ordered by a sequence key
pub trait Sequenced {
    fn sequence(&self) -> Option<f64>;
}

impl Sequenced for Section {
    fn sequence(&self) -> Option<f64> {
        self.sequence
    }
}

impl Sequenced for Task {
    fn sequence(&self) -> Option<f64> {
        self.sequence
    }
}

impl Sequenced for Checklist {
    fn sequence(&self) -> Option<f64> {
        self.sequence
    }
}

impl Sequenced for ChecklistItem {
    fn sequence(&self) -> Option<f64> {
        self.sequence
    }
}

impl<T: Sequenced> Sequenced for &T {
    fn sequence(&self) -> Option<f64> {
        (**self).sequence()
    }
}

/// Sorts by sequence; entries without one go last, ties keep input order
pub fn sorted_by_sequence<'a, T, I>(items: I) -> Vec<&'a T>
where
    T: Sequenced + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut sorted: Vec<&T> = items.into_iter().collect();
    sorted.sort_by(|a, b| match (a.sequence(), b.sequence()) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    sorted
}

/// Entity counts of an export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ExportSummary {
    pub sections: usize,
    pub tasks: usize,
    pub labels: usize,
    pub task_labels: usize,
    pub checklists: usize,
    pub checklist_items: usize,
}

impl Export {
    /// Label IDs per task, in export order
    pub fn labels_by_task(&self) -> HashMap<&LocalId, Vec<&LocalId>> {
        let mut grouped: HashMap<&LocalId, Vec<&LocalId>> = HashMap::new();
        for link in &self.task_labels {
            grouped.entry(&link.task_id).or_default().push(&link.label_id);
        }
        grouped
    }

    /// Checklists per task, in export order
    pub fn checklists_by_task(&self) -> HashMap<&LocalId, Vec<&Checklist>> {
        let mut grouped: HashMap<&LocalId, Vec<&Checklist>> = HashMap::new();
        for checklist in &self.checklists {
            grouped.entry(&checklist.task_id).or_default().push(checklist);
        }
        grouped
    }

    /// Items per checklist, in export order
    pub fn items_by_checklist(&self) -> HashMap<&LocalId, Vec<&ChecklistItem>> {
        let mut grouped: HashMap<&LocalId, Vec<&ChecklistItem>> = HashMap::new();
        for item in &self.checklist_items {
            grouped.entry(&item.checklist_id).or_default().push(item);
        }
        grouped
    }

    pub fn summary(&self) -> ExportSummary {
        ExportSummary {
            sections: self.sections.len(),
            tasks: self.tasks.len(),
            labels: self.labels.len(),
            task_labels: self.task_labels.len(),
            checklists: self.checklists.len(),
            checklist_items: self.checklist_items.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(id: &str, sequence: Option<f64>) -> Section {
        Section {
            id: LocalId::new(id),
            name: id.to_string(),
            sequence,
            limit: None,
        }
    }

    #[test]
    fn sorted_by_sequence_puts_missing_last_and_is_stable() {
        let sections = vec![
            section("none-1", None),
            section("two", Some(2.0)),
            section("one-a", Some(1.0)),
            section("none-2", None),
            section("one-b", Some(1.0)),
        ];

        let ids: Vec<&str> = sorted_by_sequence(&sections)
            .iter()
            .map(|s| s.id.as_str())
            .collect();

        assert_eq!(ids, vec!["one-a", "one-b", "two", "none-1", "none-2"]);
    }

    #[test]
    fn parses_meistertask_document() {
        let json = r#"{
            "project": {"hashid": "p1", "name": "Demo", "notes": null},
            "sections": [{"hashid": 10, "name": "Backlog", "sequence": 1.5, "limit": 3}],
            "tasks": [{
                "hashid": "t1", "name": "Write docs", "notes": "n", "status": 2,
                "sequence": 0, "section_id": 10,
                "due": 1704189600000, "completed_at": "2024-01-03T00:00:00Z"
            }],
            "labels": [{"hashid": "l1", "name": "docs", "color": "ff00ff"}],
            "task_labels": [{"hashid": "x", "task_id": "t1", "label_id": "l1"}],
            "checklists": [{"hashid": "c1", "task_id": "t1", "name": "Steps", "sequence": 1}],
            "checklist_items": [{"hashid": "i1", "checklist_id": "c1", "name": "Draft", "status": 5}],
            "custom_fields": []
        }"#;

        let export: Export = serde_json::from_str(json).unwrap();

        assert_eq!(export.project.name, "Demo");
        assert_eq!(export.project.notes, "");
        assert_eq!(export.sections[0].id.as_str(), "10");
        assert_eq!(export.sections[0].limit, Some(3));
        let task = &export.tasks[0];
        assert!(task.is_done());
        assert_eq!(task.section_id.as_ref().map(LocalId::as_str), Some("10"));
        assert!(task.due.is_some());
        assert!(task.completed_at.is_some());
        assert!(task.assignee_name.is_empty());
        assert!(export.checklist_items[0].is_done());
    }

    #[test]
    fn missing_collections_default_to_empty() {
        let export: Export = serde_json::from_str(r#"{"project": {"name": "Demo"}}"#).unwrap();
        assert_eq!(export.summary(), ExportSummary::default());
        assert!(export.project.id.is_none());
    }

    #[test]
    fn groupings_keep_export_order() {
        let json = r#"{
            "project": {"name": "P"},
            "task_labels": [
                {"task_id": "t1", "label_id": "b"},
                {"task_id": "t2", "label_id": "a"},
                {"task_id": "t1", "label_id": "a"}
            ]
        }"#;
        let export: Export = serde_json::from_str(json).unwrap();
        let grouped = export.labels_by_task();

        let t1: Vec<&str> = grouped[&LocalId::new("t1")].iter().map(|l| l.as_str()).collect();
        assert_eq!(t1, vec!["b", "a"]);
        assert_eq!(grouped[&LocalId::new("t2")].len(), 1);
    }

    #[test]
    fn status_codes() {
        let item: ChecklistItem =
            serde_json::from_str(r#"{"checklist_id": "c", "name": "x", "status": 1}"#).unwrap();
        assert!(!item.is_done());

        let task: Task = serde_json::from_str(r#"{"hashid": "t", "name": "x"}"#).unwrap();
        assert!(!task.is_done());
    }
}
