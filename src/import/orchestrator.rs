//! The import run itself

use std::collections::HashMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Map, Value};

use super::options::ImportOptions;
use super::report::ImportReport;
use super::step::Step;
use super::ImportError;
use crate::cli::Output;
use crate::domain::{
    label_color, sorted_by_sequence, split_list, split_on, Export, LocalId, RemoteId, Task,
};
use crate::remote::{Client, RemoteError};

/// Title key used to match existing buckets and labels
fn title_key(title: &str) -> String {
    title.trim().to_lowercase()
}

fn api_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Remote IDs resolved during the run
#[derive(Debug, Default)]
struct Resolved {
    buckets: HashMap<LocalId, RemoteId>,
    labels: HashMap<LocalId, RemoteId>,
}

/// Runs one import against a [`Client`]
pub struct Importer<'a> {
    client: Client,
    options: &'a ImportOptions,
    output: Output,
    report: ImportReport,
}

impl<'a> Importer<'a> {
    pub fn new(client: Client, options: &'a ImportOptions, output: Output) -> Self {
        let report = ImportReport::new(client.is_dry_run());
        Self {
            client,
            options,
            output,
            report,
        }
    }

    /// Imports the export and returns what happened
    ///
    /// With `continue_on_error`, an error that still escapes a step (such as a
    /// project that could not be created) ends the run early with a warning
    /// instead of failing it. Precondition errors fail regardless.
    pub fn run(mut self, export: &Export) -> Result<ImportReport, ImportError> {
        match self.import(export) {
            Ok(()) => {}
            Err(err) if self.options.continue_on_error && !err.is_precondition() => {
                self.output.warn(&err.to_string());
                self.report.failures.push(err.to_string());
            }
            Err(err) => return Err(err),
        }

        self.report.requests = self.client.request_count();
        Ok(self.report)
    }

    fn import(&mut self, export: &Export) -> Result<(), ImportError> {
        if self.options.purge_project && !self.options.purge_confirmed() {
            return Err(ImportError::PurgeNotConfirmed);
        }

        let project = self.resolve_project(export)?;
        self.report.project_id = Some(project);

        if self.options.purge_project {
            self.purge(project)?;
        }

        let mut resolved = Resolved::default();
        self.import_buckets(export, project, &mut resolved)?;
        if !self.options.skip_labels {
            self.import_labels(export, &mut resolved)?;
        }
        self.import_tasks(export, project, &resolved)
    }

    /// Runs one remote step under the failure policy
    fn attempt<T>(
        &mut self,
        description: &str,
        op: impl FnOnce(&mut Client) -> Result<T, RemoteError>,
    ) -> Result<Step<T>, ImportError> {
        match op(&mut self.client) {
            Ok(value) => Ok(Step::Completed(value)),
            Err(err) if self.options.continue_on_error => {
                let message = format!("{} failed: {}", description, err);
                self.output.warn(&message);
                self.report.failures.push(message);
                Ok(Step::Failed)
            }
            Err(err) => Err(err.into()),
        }
    }

    fn resolve_project(&mut self, export: &Export) -> Result<RemoteId, ImportError> {
        if let Some(id) = self.options.project_id {
            let project = RemoteId::Assigned(id);
            self.output
                .progress(&format!("Using existing project ID: {}", id));
            self.attempt(&format!("verify project {}", id), |client| {
                client.ensure_project_resource(project)
            })?;
            return Ok(project);
        }

        let name = export.project.name.as_str();
        let notes = export.project.notes.as_str();
        self.output.progress(&format!("Creating project: {}", name));
        let project = self
            .attempt("create project", |client| client.create_project(name, notes))?
            .completed()
            .ok_or(ImportError::MissingId { what: "project" })?;
        self.report.project_created = true;
        Ok(project)
    }

    /// Deletes every task and all buckets but one
    fn purge(&mut self, project: RemoteId) -> Result<(), ImportError> {
        self.output.progress(&format!(
            "Purging tasks and buckets in project {}...",
            project
        ));

        let list_view = self
            .attempt(&format!("fetch list view for project {}", project), |client| {
                client.list_view_id(project)
            })?
            .completed()
            .flatten()
            .ok_or(ImportError::NoPurgeView)?;

        let tasks = self
            .attempt(&format!("list tasks for project {}", project), |client| {
                client.list_tasks_in_view(project, list_view)
            })?
            .completed()
            .unwrap_or_default();
        self.output
            .progress(&format!("Deleting {} tasks...", tasks.len()));
        for id in tasks {
            let task = RemoteId::Assigned(id);
            let step = self.attempt(&format!("delete task {}", id), |client| {
                client.delete_task(task)
            })?;
            if !step.is_failed() {
                self.report.purged_tasks += 1;
            }
        }

        let kanban = self
            .attempt(
                &format!("fetch kanban view for project {}", project),
                |client| client.kanban_view_id(project),
            )?
            .completed()
            .flatten();
        let Some(kanban) = kanban else {
            return Ok(());
        };

        let mut buckets = self
            .attempt(
                &format!("list buckets for project {} view {}", project, kanban),
                |client| client.list_buckets(project, kanban),
            )?
            .completed()
            .unwrap_or_default();
        if buckets.is_empty() {
            self.output.progress("No buckets to delete.");
            return Ok(());
        }

        // Vikunja refuses to delete the last bucket of a view
        buckets.sort_by(|a, b| {
            a.position
                .unwrap_or(0.0)
                .total_cmp(&b.position.unwrap_or(0.0))
        });
        buckets.pop();
        self.output.progress(&format!(
            "Deleting {} buckets (leaving 1) ...",
            buckets.len()
        ));
        for bucket in buckets.into_iter().filter(|b| b.id != 0) {
            let id = RemoteId::Assigned(bucket.id);
            let step = self.attempt(&format!("delete bucket {}", bucket.id), |client| {
                client.delete_bucket(project, kanban, id)
            })?;
            if !step.is_failed() {
                self.report.purged_buckets += 1;
            }
        }

        Ok(())
    }

    fn import_buckets(
        &mut self,
        export: &Export,
        project: RemoteId,
        resolved: &mut Resolved,
    ) -> Result<(), ImportError> {
        if export.sections.is_empty() {
            return Ok(());
        }

        self.output.progress("Resolving kanban view for buckets...");
        let view = self
            .attempt(
                &format!("fetch kanban view for project {}", project),
                |client| client.kanban_view_id(project),
            )?
            .completed()
            .flatten();
        let Some(view) = view else {
            self.output
                .progress("No kanban view found; skipping buckets.");
            return Ok(());
        };

        self.output
            .progress(&format!("Creating {} buckets...", export.sections.len()));
        let mut existing: HashMap<String, RemoteId> = self
            .attempt(
                &format!("list buckets for project {} view {}", project, view),
                |client| client.list_buckets(project, view),
            )?
            .completed()
            .unwrap_or_default()
            .into_iter()
            .filter(|b| b.id != 0)
            .map(|b| (title_key(&b.title), RemoteId::Assigned(b.id)))
            .collect();

        for section in sorted_by_sequence(&export.sections) {
            let title = section.name.trim();
            let key = title_key(title);

            let bucket = match existing.get(&key).copied() {
                Some(id) => {
                    self.report.buckets.reused += 1;
                    Some(id)
                }
                None => {
                    let created = self
                        .attempt(&format!("create bucket {}", title), |client| {
                            client.create_bucket(project, view, title, section.sequence, section.limit)
                        })?
                        .completed();
                    if let Some(id) = created {
                        self.report.buckets.created += 1;
                        existing.insert(key, id);
                    }
                    created
                }
            };

            if let Some(id) = bucket {
                resolved.buckets.insert(section.id.clone(), id);
            }
        }

        Ok(())
    }

    fn import_labels(&mut self, export: &Export, resolved: &mut Resolved) -> Result<(), ImportError> {
        self.output
            .progress(&format!("Creating {} labels...", export.labels.len()));
        let mut existing: HashMap<String, RemoteId> = self
            .attempt("list labels", |client| client.list_labels())?
            .completed()
            .unwrap_or_default()
            .into_iter()
            .filter(|l| l.id != 0)
            .map(|l| (title_key(&l.title), RemoteId::Assigned(l.id)))
            .collect();

        for label in &export.labels {
            let title = label.name.trim();
            let key = title_key(title);

            let remote = match existing.get(&key).copied() {
                Some(id) => {
                    self.report.labels.reused += 1;
                    Some(id)
                }
                None => {
                    let color = label_color(label.color.as_deref(), title);
                    let created = self
                        .attempt(&format!("create label {}", title), |client| {
                            client.create_label(title, Some(color.as_str()))
                        })?
                        .completed();
                    if let Some(id) = created {
                        self.report.labels.created += 1;
                        existing.insert(key, id);
                    }
                    created
                }
            };

            if let Some(id) = remote {
                resolved.labels.insert(label.id.clone(), id);
            }
        }

        Ok(())
    }

    fn task_payload(task: &Task, resolved: &Resolved) -> Value {
        let mut payload = Map::new();
        payload.insert("title".to_string(), json!(task.name));
        payload.insert("description".to_string(), json!(task.notes));
        payload.insert("done".to_string(), json!(task.is_done()));
        if let Some(due) = &task.due {
            payload.insert("due_date".to_string(), json!(api_timestamp(due)));
        }
        if let Some(done_at) = &task.completed_at {
            payload.insert("done_at".to_string(), json!(api_timestamp(done_at)));
        }
        if let Some(bucket) = task
            .section_id
            .as_ref()
            .and_then(|section| resolved.buckets.get(section))
        {
            payload.insert("bucket_id".to_string(), json!(bucket));
        }
        Value::Object(payload)
    }

    fn import_tasks(
        &mut self,
        export: &Export,
        project: RemoteId,
        resolved: &Resolved,
    ) -> Result<(), ImportError> {
        let labels_by_task = export.labels_by_task();
        let checklists_by_task = export.checklists_by_task();
        let items_by_checklist = export.items_by_checklist();

        let mut tasks = sorted_by_sequence(&export.tasks);
        if let Some(limit) = self.options.task_limit() {
            tasks.truncate(limit);
        }

        self.output
            .progress(&format!("Creating {} tasks...", tasks.len()));
        for task in tasks {
            let payload = Self::task_payload(task, resolved);
            let created = self
                .attempt(&format!("create task {}", task.name), |client| {
                    client.create_task(project, payload)
                })?
                .completed();
            let Some(remote_task) = created else {
                continue;
            };
            self.report.tasks += 1;

            if !self.options.skip_labels {
                let label_ids = labels_by_task.get(&task.id).into_iter().flatten();
                for label in label_ids.filter_map(|id| resolved.labels.get(*id)) {
                    let label = *label;
                    let step = self.attempt(
                        &format!("add label {} to task {}", label, remote_task),
                        |client| client.add_label_to_task(remote_task, label),
                    )?;
                    if !step.is_failed() {
                        self.report.task_labels += 1;
                    }
                }
            }

            self.import_assignee(task, remote_task)?;
            self.import_comments(task, remote_task)?;

            if self.options.skip_checklists {
                continue;
            }
            let checklists = checklists_by_task.get(&task.id).into_iter().flatten();
            for checklist in sorted_by_sequence(checklists.copied()) {
                let created = self
                    .attempt(
                        &format!("create checklist {} for task {}", checklist.name, remote_task),
                        |client| client.create_checklist(remote_task, &checklist.name),
                    )?
                    .completed();
                let Some(remote_checklist) = created else {
                    continue;
                };
                self.report.checklists += 1;

                let items = items_by_checklist.get(&checklist.id).into_iter().flatten();
                for item in sorted_by_sequence(items.copied()) {
                    let step = self.attempt(
                        &format!("create checklist item {} on task {}", item.name, remote_task),
                        |client| {
                            client.create_checklist_item(
                                remote_task,
                                remote_checklist,
                                &item.name,
                                item.is_done(),
                            )
                        },
                    )?;
                    if !step.is_failed() {
                        self.report.checklist_items += 1;
                    }
                }
            }
        }

        Ok(())
    }

    fn import_assignee(&mut self, task: &Task, remote_task: RemoteId) -> Result<(), ImportError> {
        let name = task.assignee_name.trim();
        if name.is_empty() {
            return Ok(());
        }
        let Some(&user_id) = self.options.assignee_map.get(name) else {
            return Ok(());
        };
        if user_id == 0 {
            return Ok(());
        }

        let step = self.attempt(
            &format!("add assignee {} to task {}", name, remote_task),
            |client| client.add_assignee_to_task(remote_task, user_id),
        )?;
        if !step.is_failed() {
            self.report.assignees += 1;
        }
        Ok(())
    }

    fn import_comments(&mut self, task: &Task, remote_task: RemoteId) -> Result<(), ImportError> {
        let parts = match self.options.comment_delimiter.as_deref() {
            Some(delimiter) => split_on(&task.comments_raw, delimiter),
            None => split_list(&task.comments_raw),
        };

        for comment in parts {
            let step = self.attempt(
                &format!("create comment on task {}", remote_task),
                |client| client.create_comment(remote_task, &comment),
            )?;
            if !step.is_failed() {
                self.report.comments += 1;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Section, TaskLabel};

    fn task(id: &str, section: Option<&str>) -> Task {
        Task {
            id: LocalId::new(id),
            name: format!("Task {}", id),
            notes: String::new(),
            status: Some(2),
            sequence: None,
            section_id: section.map(LocalId::new),
            due: None,
            completed_at: Some(
                DateTime::parse_from_rfc3339("2024-01-02T10:00:00Z")
                    .unwrap()
                    .with_timezone(&Utc),
            ),
            assignee_name: String::new(),
            comments_raw: String::new(),
        }
    }

    #[test]
    fn task_payload_resolves_bucket() {
        let mut resolved = Resolved::default();
        resolved
            .buckets
            .insert(LocalId::new("s1"), RemoteId::Assigned(12));

        let payload = Importer::task_payload(&task("t1", Some("s1")), &resolved);

        assert_eq!(
            payload,
            json!({
                "title": "Task t1",
                "description": "",
                "done": true,
                "done_at": "2024-01-02T10:00:00Z",
                "bucket_id": 12
            })
        );
    }

    #[test]
    fn task_payload_without_resolved_section_has_no_bucket() {
        let payload = Importer::task_payload(&task("t1", Some("missing")), &Resolved::default());
        assert!(payload.get("bucket_id").is_none());
    }

    #[test]
    fn title_keys_ignore_case_and_padding() {
        assert_eq!(title_key("  Backlog "), title_key("backlog"));
        assert_ne!(title_key("Back log"), title_key("backlog"));
    }

    #[test]
    fn export_groupings_feed_task_steps() {
        let export = Export {
            sections: vec![Section {
                id: LocalId::new("s1"),
                name: "Todo".to_string(),
                sequence: None,
                limit: None,
            }],
            tasks: vec![task("t1", Some("s1"))],
            task_labels: vec![TaskLabel {
                task_id: LocalId::new("t1"),
                label_id: LocalId::new("l1"),
            }],
            ..Default::default()
        };

        assert_eq!(export.labels_by_task()[&LocalId::new("t1")].len(), 1);
    }
}
