//! Transports: how an [`ApiRequest`] reaches Vikunja (or doesn't)

use std::time::Duration;

use reqwest::blocking::Client as HttpClient;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};

use super::protocol::{ApiRequest, ApiResponse, Method};
use super::RemoteError;
use crate::cli::Output;

const TOTAL_PAGES_HEADER: &str = "x-pagination-total-pages";

/// Sends API requests
pub trait Transport {
    /// Sends one request; non-2xx answers are errors
    fn send(&mut self, request: &ApiRequest) -> Result<ApiResponse, RemoteError>;

    /// True when nothing actually reaches the server
    fn is_dry_run(&self) -> bool {
        false
    }
}

/// Connection settings for [`HttpTransport`]
#[derive(Debug, Clone)]
pub struct HttpSettings {
    /// Server root, without `/api/v1`
    pub base_url: String,
    pub token: String,
    pub verify_ssl: bool,

    /// Overall request timeout; `None` keeps the client default
    pub timeout: Option<Duration>,
}

/// Blocking HTTP transport with bearer authentication
pub struct HttpTransport {
    http: HttpClient,
    api_base: String,
    output: Output,
}

impl HttpTransport {
    /// Builds the session; `output` receives request logs when verbose
    pub fn new(settings: &HttpSettings, output: Output) -> Result<Self, RemoteError> {
        let mut builder = HttpClient::builder()
            .default_headers(default_headers(&settings.token)?)
            .danger_accept_invalid_certs(!settings.verify_ssl);
        if let Some(timeout) = settings.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| RemoteError::Setup(e.to_string()))?;

        Ok(Self {
            http,
            api_base: format!("{}/api/v1", settings.base_url.trim_end_matches('/')),
            output,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }
}

/// JSON headers plus the bearer token, kept out of debug output
fn default_headers(token: &str) -> Result<HeaderMap, RemoteError> {
    let mut bearer = HeaderValue::from_str(&format!("Bearer {}", token))
        .map_err(|_| RemoteError::Setup("API token contains invalid characters".to_string()))?;
    bearer.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, bearer);
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    Ok(headers)
}

fn http_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Put => reqwest::Method::PUT,
        Method::Post => reqwest::Method::POST,
        Method::Delete => reqwest::Method::DELETE,
    }
}

impl Transport for HttpTransport {
    fn send(&mut self, request: &ApiRequest) -> Result<ApiResponse, RemoteError> {
        let url = self.url(&request.path);
        self.output
            .verbose_ctx("http", &format!("{} {}", request.method, self.url(&request.target())));

        let mut builder = self
            .http
            .request(http_method(request.method), &url)
            .query(&request.query);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let transport_error = |e: reqwest::Error| RemoteError::Transport {
            method: request.method,
            path: request.path.clone(),
            message: e.to_string(),
        };

        let response = builder.send().map_err(transport_error)?;
        let status = response.status();
        self.output
            .verbose_ctx("http", &format!("{} {}", status.as_u16(), url));

        let total_pages = response
            .headers()
            .get(TOTAL_PAGES_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u32>().ok());
        let text = response.text().map_err(transport_error)?;

        if !status.is_success() {
            self.output.verbose_ctx("http", &format!("body {}", text));
            return Err(RemoteError::Status {
                method: request.method,
                path: request.path.clone(),
                status: status.as_u16(),
                body: text,
            });
        }

        let body = if text.trim().is_empty() {
            None
        } else {
            Some(
                serde_json::from_str(&text).map_err(|source| RemoteError::Decode {
                    method: request.method,
                    path: request.path.clone(),
                    source,
                })?,
            )
        };

        Ok(ApiResponse {
            status: status.as_u16(),
            body,
            total_pages,
        })
    }
}

/// Logs every request instead of sending it
#[derive(Debug, Default)]
pub struct DryRunTransport {
    output: Output,
    logged: Vec<ApiRequest>,
}

impl DryRunTransport {
    pub fn new(output: Output) -> Self {
        Self {
            output,
            logged: Vec::new(),
        }
    }

    /// Requests that would have been sent, in order
    pub fn logged(&self) -> &[ApiRequest] {
        &self.logged
    }

    /// Log line for one request
    pub fn describe(request: &ApiRequest) -> String {
        let payload = request
            .body
            .as_ref()
            .map(|b| b.to_string())
            .unwrap_or_else(|| "null".to_string());
        format!("DRY RUN {} {} payload={}", request.method, request.target(), payload)
    }
}

impl Transport for DryRunTransport {
    fn send(&mut self, request: &ApiRequest) -> Result<ApiResponse, RemoteError> {
        self.output.planned(&Self::describe(request));
        self.logged.push(request.clone());
        Ok(ApiResponse::empty())
    }

    fn is_dry_run(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn dry_run_logs_and_returns_empty() {
        let mut transport = DryRunTransport::new(Output::quiet());
        let response = transport
            .send(&ApiRequest::put("/labels", json!({"title": "bug"})))
            .unwrap();

        assert_eq!(response.body, None);
        assert!(transport.is_dry_run());
        assert_eq!(transport.logged().len(), 1);
        assert_eq!(transport.logged()[0].path, "/labels");
    }

    #[test]
    fn dry_run_line_format() {
        let line = DryRunTransport::describe(&ApiRequest::put("/labels", json!({"title": "bug"})));
        assert_eq!(line, r#"DRY RUN PUT /labels payload={"title":"bug"}"#);

        let line = DryRunTransport::describe(&ApiRequest::get("/labels"));
        assert_eq!(line, "DRY RUN GET /labels payload=null");
    }

    #[test]
    fn http_transport_builds_api_base() {
        let settings = HttpSettings {
            base_url: "https://vikunja.example.com/".to_string(),
            token: "abc".to_string(),
            verify_ssl: true,
            timeout: None,
        };
        let transport = HttpTransport::new(&settings, Output::quiet()).unwrap();

        assert_eq!(
            transport.url("/labels"),
            "https://vikunja.example.com/api/v1/labels"
        );
        assert!(!transport.is_dry_run());
    }

    #[test]
    fn bearer_token_is_sensitive() {
        let headers = default_headers("abc").unwrap();

        assert_eq!(headers[AUTHORIZATION], "Bearer abc");
        assert!(headers[AUTHORIZATION].is_sensitive());
        assert!(!format!("{:?}", headers).contains("abc"));
    }

    #[test]
    fn http_transport_rejects_unusable_token() {
        let settings = HttpSettings {
            base_url: "https://vikunja.example.com".to_string(),
            token: "line\nbreak".to_string(),
            verify_ssl: true,
            timeout: None,
        };
        assert!(matches!(
            HttpTransport::new(&settings, Output::quiet()),
            Err(RemoteError::Setup(_))
        ));
    }
}
