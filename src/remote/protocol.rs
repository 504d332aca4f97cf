//! Request and response envelopes exchanged with a transport

use std::fmt;

use serde::Serialize;
use serde_json::Value;

/// HTTP verb of an API call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Put,
    Post,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Put => "PUT",
            Method::Post => "POST",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One API call, path relative to `/api/v1`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub query: Vec<(String, String)>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::Put, path).with_body(body)
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::Post, path).with_body(body)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    /// Path plus query string, as shown in logs
    pub fn target(&self) -> String {
        if self.query.is_empty() {
            return self.path.clone();
        }
        let query: Vec<String> = self
            .query
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        format!("{}?{}", self.path, query.join("&"))
    }
}

/// A successful response
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApiResponse {
    pub status: u16,

    /// Parsed body; `None` for an empty body
    pub body: Option<Value>,

    /// Value of the `X-Pagination-Total-Pages` header
    pub total_pages: Option<u32>,
}

impl ApiResponse {
    pub fn new(status: u16, body: Option<Value>) -> Self {
        Self {
            status,
            body,
            total_pages: None,
        }
    }

    /// A 200 with no body
    pub fn empty() -> Self {
        Self::new(200, None)
    }

    pub fn json(body: Value) -> Self {
        Self::new(200, Some(body))
    }

    pub fn with_total_pages(mut self, pages: u32) -> Self {
        self.total_pages = Some(pages);
        self
    }

    /// The non-zero `id` of a created or fetched entity
    pub fn id(&self) -> Option<i64> {
        self.body.as_ref().and_then(|body| value_id(body))
    }

    /// Array body items; anything else counts as no items
    pub fn items(&self) -> &[Value] {
        match &self.body {
            Some(Value::Array(items)) => items,
            _ => &[],
        }
    }
}

/// Reads a non-zero `id` that may arrive as a number or a numeric string
pub(crate) fn value_id(value: &Value) -> Option<i64> {
    let id = match value.get("id")? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }?;
    (id != 0).then_some(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn target_includes_query() {
        let req = ApiRequest::get("/projects/1/views/2/tasks")
            .with_query("page", 1)
            .with_query("per_page", 100);
        assert_eq!(req.target(), "/projects/1/views/2/tasks?page=1&per_page=100");
        assert_eq!(ApiRequest::delete("/tasks/3").target(), "/tasks/3");
    }

    #[test]
    fn id_extraction() {
        assert_eq!(ApiResponse::json(json!({"id": 7})).id(), Some(7));
        assert_eq!(ApiResponse::json(json!({"id": "8"})).id(), Some(8));
        assert_eq!(ApiResponse::json(json!({"id": 0})).id(), None);
        assert_eq!(ApiResponse::json(json!({"title": "x"})).id(), None);
        assert_eq!(ApiResponse::empty().id(), None);
    }

    #[test]
    fn items_of_non_array_body_are_empty() {
        assert!(ApiResponse::json(json!({"id": 1})).items().is_empty());
        assert_eq!(ApiResponse::json(json!([{"id": 1}, {"id": 2}])).items().len(), 2);
    }

    #[test]
    fn request_serialization_omits_empty_parts() {
        let req = ApiRequest::put("/labels", json!({"title": "bug"}));
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(
            value,
            json!({"method": "PUT", "path": "/labels", "body": {"title": "bug"}})
        );
    }
}
