//! CSV exports
//!
//! Each data row is one task. Recognized columns:
//! `project, section, name, notes, status, due_date, status_updated_at,
//! assignee, comments, tags, token, id`. Empty cells count as absent.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use csv::ReaderBuilder;

use super::ExportError;
use crate::domain::{
    parse_timestamp, split_list, Export, Label, LocalId, Project, Section, Task, TaskLabel,
    TASK_STATUS_DONE, TASK_STATUS_OPEN,
};

/// Project name used when no row names one
pub const DEFAULT_PROJECT_NAME: &str = "Imported Project";

/// Section used for rows without one
pub const DEFAULT_SECTION: &str = "Unsorted";

/// Local ID of the project built from a CSV export
const CSV_PROJECT_ID: &str = "csv";

/// One CSV row keyed by header name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TabularRow(HashMap<String, String>);

impl TabularRow {
    /// Builds a row from `(column, value)` pairs
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }

    /// Returns a column value, treating empty cells as absent
    pub fn get(&self, column: &str) -> Option<&str> {
        self.0
            .get(column)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }
}

/// Reads all rows of a CSV file (header row required, BOM tolerated)
pub fn read_rows(path: &Path) -> Result<Vec<TabularRow>, ExportError> {
    let content = fs::read_to_string(path).map_err(|source| ExportError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let content = content.strip_prefix('\u{feff}').unwrap_or(&content);

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(TabularRow::from_pairs(
            headers.iter().cloned().zip(record.iter().map(str::to_string)),
        ));
    }

    Ok(rows)
}

/// Builds the canonical export from CSV rows
pub fn export_from_rows(rows: &[TabularRow]) -> Export {
    let mut project_name: Option<String> = None;
    let mut sections: Vec<Section> = Vec::new();
    let mut section_index: HashMap<String, usize> = HashMap::new();
    let mut labels: Vec<Label> = Vec::new();
    let mut label_index: HashMap<String, usize> = HashMap::new();
    let mut tasks = Vec::with_capacity(rows.len());
    let mut task_labels = Vec::new();

    for (idx, row) in rows.iter().enumerate() {
        if project_name.is_none() {
            project_name = row.get("project").map(str::to_string);
        }

        let section_name = row.get("section").unwrap_or(DEFAULT_SECTION);
        let section_pos = *section_index
            .entry(section_name.to_string())
            .or_insert_with(|| {
                sections.push(Section {
                    id: LocalId::new(format!("section:{}", section_name)),
                    name: section_name.to_string(),
                    sequence: Some(idx as f64),
                    limit: None,
                });
                sections.len() - 1
            });

        let task_id = row
            .get("token")
            .or_else(|| row.get("id"))
            .map(LocalId::from)
            .unwrap_or_else(|| LocalId::new(format!("task:{}", idx)));

        let status = row
            .get("status")
            .and_then(|s| s.trim().parse::<i32>().ok())
            .unwrap_or(TASK_STATUS_OPEN);

        let completed_at = if status == TASK_STATUS_DONE {
            row.get("status_updated_at").and_then(parse_timestamp)
        } else {
            None
        };

        for tag in split_list(row.get("tags").unwrap_or_default()) {
            let label_pos = *label_index.entry(tag.clone()).or_insert_with(|| {
                labels.push(Label {
                    id: LocalId::new(format!("label:{}", tag)),
                    name: tag.clone(),
                    color: None,
                });
                labels.len() - 1
            });
            task_labels.push(TaskLabel {
                task_id: task_id.clone(),
                label_id: labels[label_pos].id.clone(),
            });
        }

        tasks.push(Task {
            id: task_id,
            name: row.get("name").unwrap_or_default().to_string(),
            notes: row.get("notes").unwrap_or_default().to_string(),
            status: Some(status),
            sequence: Some(idx as f64),
            section_id: Some(sections[section_pos].id.clone()),
            due: row.get("due_date").and_then(parse_timestamp),
            completed_at,
            assignee_name: row.get("assignee").unwrap_or_default().to_string(),
            comments_raw: row.get("comments").unwrap_or_default().to_string(),
        });
    }

    Export {
        project: Project {
            id: Some(LocalId::new(CSV_PROJECT_ID)),
            name: project_name.unwrap_or_else(|| DEFAULT_PROJECT_NAME.to_string()),
            notes: String::new(),
        },
        sections,
        tasks,
        labels,
        task_labels,
        checklists: Vec::new(),
        checklist_items: Vec::new(),
    }
}
