//! Vikunja endpoint wrappers

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::protocol::{value_id, ApiRequest, ApiResponse};
use super::transport::Transport;
use super::RemoteError;
use crate::domain::RemoteId;

const TASKS_PER_PAGE: u32 = 100;

/// Which collection name the server uses for projects
///
/// Older Vikunja releases call projects "lists". The choice is made on the
/// first project call that answers 404 and kept for the rest of the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProjectResource {
    #[default]
    Projects,
    Lists,
}

impl ProjectResource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectResource::Projects => "projects",
            ProjectResource::Lists => "lists",
        }
    }
}

/// A view of a project (list, kanban, ...)
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProjectView {
    pub id: i64,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub view_kind: String,
}

/// An existing kanban bucket
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RemoteBucket {
    #[serde(default)]
    pub id: i64,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub position: Option<f64>,
}

/// An existing label
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RemoteLabel {
    #[serde(default)]
    pub id: i64,

    #[serde(default)]
    pub title: String,
}

/// Vikunja API client
///
/// In dry-run mode requests are still issued to the transport (which only logs
/// them), creations return [`RemoteId::Planned`] placeholders, listings come
/// back empty and view lookups yield planned views.
pub struct Client {
    transport: Box<dyn Transport>,
    resource: ProjectResource,
    kanban_view: Option<RemoteId>,
    next_planned: u32,
    requests: usize,
}

impl Client {
    pub fn new(transport: Box<dyn Transport>) -> Self {
        Self {
            transport,
            resource: ProjectResource::default(),
            kanban_view: None,
            next_planned: 0,
            requests: 0,
        }
    }

    pub fn is_dry_run(&self) -> bool {
        self.transport.is_dry_run()
    }

    /// Project collection currently in use
    pub fn project_resource(&self) -> ProjectResource {
        self.resource
    }

    /// Number of requests issued so far
    pub fn request_count(&self) -> usize {
        self.requests
    }

    fn send(&mut self, request: ApiRequest) -> Result<ApiResponse, RemoteError> {
        self.requests += 1;
        self.transport.send(&request)
    }

    fn plan(&mut self) -> RemoteId {
        self.next_planned += 1;
        RemoteId::Planned(self.next_planned)
    }

    /// Sends a creation request and extracts the new entity's id
    fn create(&mut self, request: ApiRequest) -> Result<RemoteId, RemoteError> {
        let method = request.method;
        let path = request.path.clone();
        let response = self.send(request)?;

        if self.is_dry_run() {
            return Ok(self.plan());
        }
        response
            .id()
            .map(RemoteId::Assigned)
            .ok_or(RemoteError::MissingId { method, path })
    }

    fn list<T: DeserializeOwned>(&mut self, request: ApiRequest) -> Result<Vec<T>, RemoteError> {
        let method = request.method;
        let path = request.path.clone();
        let response = self.send(request)?;

        response
            .items()
            .iter()
            .map(|item| {
                T::deserialize(item).map_err(|source| RemoteError::Decode {
                    method,
                    path: path.clone(),
                    source,
                })
            })
            .collect()
    }

    fn project_path(&self, project: RemoteId) -> String {
        format!("/{}/{}", self.resource.as_str(), project)
    }

    fn view_path(&self, project: RemoteId, view: RemoteId) -> String {
        format!("{}/views/{}", self.project_path(project), view)
    }

    /// Runs a project-collection request, switching to the legacy collection once on 404
    fn with_resource_fallback<T>(
        &mut self,
        mut call: impl FnMut(&mut Self) -> Result<T, RemoteError>,
    ) -> Result<T, RemoteError> {
        match call(self) {
            Err(err) if err.is_not_found() && self.resource == ProjectResource::Projects => {
                self.resource = ProjectResource::Lists;
                call(self)
            }
            other => other,
        }
    }

    /// Creates a project; `PUT /projects` (or `/lists`)
    pub fn create_project(&mut self, title: &str, description: &str) -> Result<RemoteId, RemoteError> {
        let mut payload = Map::new();
        payload.insert("title".to_string(), json!(title));
        if !description.is_empty() {
            payload.insert("description".to_string(), json!(description));
        }
        let payload = Value::Object(payload);

        self.with_resource_fallback(|client| {
            let path = format!("/{}", client.resource.as_str());
            client.create(ApiRequest::put(path, payload.clone()))
        })
    }

    /// Checks that a project exists, settling the project collection name
    pub fn ensure_project_resource(&mut self, project: RemoteId) -> Result<(), RemoteError> {
        self.with_resource_fallback(|client| {
            let path = client.project_path(project);
            client.send(ApiRequest::get(path)).map(|_| ())
        })
    }

    pub fn get_project_views(&mut self, project: RemoteId) -> Result<Vec<ProjectView>, RemoteError> {
        let path = format!("{}/views", self.project_path(project));
        self.list(ApiRequest::get(path))
    }

    /// First view of kind `list`, else the first view
    pub fn list_view_id(&mut self, project: RemoteId) -> Result<Option<RemoteId>, RemoteError> {
        let views = self.get_project_views(project)?;
        if self.is_dry_run() {
            return Ok(Some(self.plan()));
        }

        let view = views
            .iter()
            .find(|v| v.view_kind == "list")
            .or_else(|| views.first());
        Ok(view.map(|v| RemoteId::Assigned(v.id)))
    }

    /// The kanban view, looked up once per run
    pub fn kanban_view_id(&mut self, project: RemoteId) -> Result<Option<RemoteId>, RemoteError> {
        if let Some(view) = self.kanban_view {
            return Ok(Some(view));
        }

        let views = self.get_project_views(project)?;
        let found = if self.is_dry_run() {
            Some(self.plan())
        } else {
            views
                .iter()
                .find(|v| v.view_kind == "kanban")
                .map(|v| RemoteId::Assigned(v.id))
        };
        self.kanban_view = found;
        Ok(found)
    }

    pub fn list_buckets(
        &mut self,
        project: RemoteId,
        view: RemoteId,
    ) -> Result<Vec<RemoteBucket>, RemoteError> {
        let path = format!("{}/buckets", self.view_path(project, view));
        self.list(ApiRequest::get(path))
    }

    pub fn create_bucket(
        &mut self,
        project: RemoteId,
        view: RemoteId,
        title: &str,
        position: Option<f64>,
        limit: Option<i64>,
    ) -> Result<RemoteId, RemoteError> {
        let mut payload = Map::new();
        payload.insert("title".to_string(), json!(title));
        if let Some(position) = position {
            payload.insert("position".to_string(), json!(position));
        }
        if let Some(limit) = limit {
            payload.insert("limit".to_string(), json!(limit));
        }

        let path = format!("{}/buckets", self.view_path(project, view));
        self.create(ApiRequest::put(path, Value::Object(payload)))
    }

    pub fn delete_bucket(
        &mut self,
        project: RemoteId,
        view: RemoteId,
        bucket: RemoteId,
    ) -> Result<(), RemoteError> {
        let path = format!("{}/buckets/{}", self.view_path(project, view), bucket);
        self.send(ApiRequest::delete(path)).map(|_| ())
    }

    pub fn list_labels(&mut self) -> Result<Vec<RemoteLabel>, RemoteError> {
        self.list(ApiRequest::get("/labels"))
    }

    pub fn create_label(&mut self, title: &str, hex_color: Option<&str>) -> Result<RemoteId, RemoteError> {
        let mut payload = Map::new();
        payload.insert("title".to_string(), json!(title));
        if let Some(color) = hex_color {
            payload.insert("hex_color".to_string(), json!(color));
        }
        self.create(ApiRequest::put("/labels", Value::Object(payload)))
    }

    /// Creates a task from a prepared payload
    pub fn create_task(&mut self, project: RemoteId, payload: Value) -> Result<RemoteId, RemoteError> {
        let path = format!("{}/tasks", self.project_path(project));
        self.create(ApiRequest::put(path, payload))
    }

    pub fn add_label_to_task(&mut self, task: RemoteId, label: RemoteId) -> Result<(), RemoteError> {
        let path = format!("/tasks/{}/labels", task);
        self.send(ApiRequest::put(path, json!({ "label_id": label })))
            .map(|_| ())
    }

    pub fn add_assignee_to_task(&mut self, task: RemoteId, user_id: i64) -> Result<(), RemoteError> {
        let path = format!("/tasks/{}/assignees", task);
        self.send(ApiRequest::put(path, json!({ "user_id": user_id })))
            .map(|_| ())
    }

    pub fn create_comment(&mut self, task: RemoteId, comment: &str) -> Result<(), RemoteError> {
        let path = format!("/tasks/{}/comments", task);
        self.send(ApiRequest::put(path, json!({ "comment": comment })))
            .map(|_| ())
    }

    pub fn create_checklist(&mut self, task: RemoteId, title: &str) -> Result<RemoteId, RemoteError> {
        let path = format!("/tasks/{}/checklists", task);
        self.create(ApiRequest::post(path, json!({ "title": title })))
    }

    pub fn create_checklist_item(
        &mut self,
        task: RemoteId,
        checklist: RemoteId,
        title: &str,
        done: bool,
    ) -> Result<(), RemoteError> {
        let path = format!("/tasks/{}/checklists/{}/items", task, checklist);
        self.send(ApiRequest::post(path, json!({ "title": title, "done": done })))
            .map(|_| ())
    }

    /// IDs of every task in a view, across all pages
    ///
    /// Kanban-style views answer with buckets that each carry `tasks`; both
    /// shapes are flattened.
    pub fn list_tasks_in_view(
        &mut self,
        project: RemoteId,
        view: RemoteId,
    ) -> Result<Vec<i64>, RemoteError> {
        let path = format!("{}/tasks", self.view_path(project, view));
        let mut ids = Vec::new();
        let mut page = 1;

        loop {
            let request = ApiRequest::get(path.clone())
                .with_query("page", page)
                .with_query("per_page", TASKS_PER_PAGE);
            let response = self.send(request)?;
            let items = response.items();
            if items.is_empty() {
                break;
            }

            let bucketed = items[0].get("tasks").is_some();
            for item in items {
                if bucketed {
                    let tasks = item.get("tasks").and_then(Value::as_array);
                    ids.extend(tasks.into_iter().flatten().filter_map(value_id));
                } else if let Some(id) = value_id(item) {
                    ids.push(id);
                }
            }

            if page >= response.total_pages.unwrap_or(1) {
                break;
            }
            page += 1;
        }

        Ok(ids)
    }

    pub fn delete_task(&mut self, task: RemoteId) -> Result<(), RemoteError> {
        self.send(ApiRequest::delete(format!("/tasks/{}", task)))
            .map(|_| ())
    }
}
