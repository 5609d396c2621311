//! Mock transport for unit testing
//!
//! Serves canned responses keyed by method and path, and records every
//! request so tests can assert on what was sent. Unmatched requests get an
//! empty `404 Not Found`, like a real server would answer.

use crate::common::{ApiResponse, Method};
use crate::error::ScoutError;
use crate::scout_trait::ScoutTransport;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A request seen by the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    /// Request method
    pub method: Method,
    /// Account-rooted path, including any query string
    pub path: String,
    /// POST parameters in the order they were sent
    pub params: Vec<(String, String)>,
}

/// Mock transport for testing
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    responses: Arc<Mutex<HashMap<(Method, String), ApiResponse>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockTransport {
    /// Create a new mock transport
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `response` for `method` on `path` (path includes any query string)
    pub fn respond(&self, method: Method, path: impl Into<String>, response: ApiResponse) {
        lock(&self.responses).insert((method, path.into()), response);
    }

    /// Serve a `200 OK` XML body
    pub fn respond_xml(&self, method: Method, path: impl Into<String>, body: impl Into<String>) {
        self.respond(method, path, ApiResponse::ok(body));
    }

    /// All requests seen so far, oldest first
    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.requests).clone()
    }

    /// Number of requests seen for `method` on `path`
    pub fn request_count(&self, method: Method, path: &str) -> usize {
        lock(&self.requests)
            .iter()
            .filter(|request| request.method == method && request.path == path)
            .count()
    }

    fn handle(&self, method: Method, path: &str, params: &[(&str, &str)]) -> ApiResponse {
        lock(&self.requests).push(RecordedRequest {
            method,
            path: path.to_string(),
            params: params
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        });

        lock(&self.responses)
            .get(&(method, path.to_string()))
            .cloned()
            .unwrap_or_else(|| ApiResponse::new(404, ""))
    }
}

#[async_trait::async_trait]
impl ScoutTransport for MockTransport {
    async fn get(&self, path: &str) -> Result<ApiResponse, ScoutError> {
        Ok(self.handle(Method::Get, path, &[]))
    }

    async fn post(&self, path: &str, params: &[(&str, &str)]) -> Result<ApiResponse, ScoutError> {
        Ok(self.handle(Method::Post, path, params))
    }

    async fn delete(&self, path: &str) -> Result<ApiResponse, ScoutError> {
        Ok(self.handle(Method::Delete, path, &[]))
    }
}
