//! Transport layer abstraction.
//!
//! A transport executes one HTTP request and delivers the raw response.
//! It rejects only when the request could not complete; status handling
//! belongs to the engine.

use crate::error::{SyncError, SyncResult};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;

/// HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// GET.
    Get,
    /// POST.
    Post,
    /// PUT.
    Put,
    /// DELETE.
    Delete,
}

impl Method {
    /// Returns the method name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An outgoing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// Method.
    pub method: Method,
    /// Absolute url, including any querystring.
    pub url: String,
    /// Request body.
    pub body: Option<String>,
    /// `Content-Type` header value.
    pub content_type: Option<String>,
    /// Additional headers.
    pub headers: Vec<(String, String)>,
}

impl HttpRequest {
    /// Creates a bodiless request.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            body: None,
            content_type: None,
            headers: Vec::new(),
        }
    }

    /// Attaches a JSON body.
    #[must_use]
    pub fn with_json(mut self, body: String) -> Self {
        self.body = Some(body);
        self.content_type = Some("application/json".to_string());
        self
    }

    /// Sets the headers.
    #[must_use]
    pub fn with_headers(mut self, headers: Vec<(String, String)>) -> Self {
        self.headers = headers;
        self
    }
}

/// A completed response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// Status code.
    pub status: u16,
    /// Raw body text.
    pub body: String,
    /// Final url after redirects.
    pub url: String,
}

impl HttpResponse {
    /// Creates a response.
    pub fn new(status: u16, body: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            url: url.into(),
        }
    }

    /// Returns true for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Executes HTTP requests.
///
/// This trait abstracts the network layer so the engine can run against
/// `reqwest`, a mock, or any other client.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends a request.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Transport`] with no status when the request
    /// could not complete.
    async fn send(&self, request: HttpRequest) -> SyncResult<HttpResponse>;
}

/// A scripted transport for testing.
///
/// Responses are registered per method and exact url. Unregistered
/// requests answer `404` with an empty body. Every request is recorded.
#[derive(Debug, Default)]
pub struct MockTransport {
    routes: Mutex<HashMap<(Method, String), (u16, String)>>,
    requests: Mutex<Vec<HttpRequest>>,
    offline: Mutex<Option<String>>,
}

impl MockTransport {
    /// Creates a mock with no routes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a response.
    pub fn respond(&self, method: Method, url: impl Into<String>, status: u16, body: impl Into<String>) {
        self.routes
            .lock()
            .insert((method, url.into()), (status, body.into()));
    }

    /// Makes every request fail as if the network were down.
    pub fn set_offline(&self, message: Option<&str>) {
        *self.offline.lock() = message.map(str::to_string);
    }

    /// Returns every request sent so far.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().clone()
    }

    /// Returns how many requests matched `method` and `url`.
    pub fn request_count(&self, method: Method, url: &str) -> usize {
        self.requests
            .lock()
            .iter()
            .filter(|r| r.method == method && r.url == url)
            .count()
    }

    /// Forgets recorded requests.
    pub fn clear_requests(&self) {
        self.requests.lock().clear();
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: HttpRequest) -> SyncResult<HttpResponse> {
        self.requests.lock().push(request.clone());
        if let Some(message) = self.offline.lock().clone() {
            return Err(SyncError::network(message));
        }
        let route = self
            .routes
            .lock()
            .get(&(request.method, request.url.clone()))
            .cloned();
        let (status, body) = route.unwrap_or((404, String::new()));
        Ok(HttpResponse::new(status, body, request.url))
    }
}
