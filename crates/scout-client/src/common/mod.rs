//! Common utilities for the Scout API client
//!
//! Provides the raw response type shared by every transport, query-string
//! building, and the XML document model the resource types are parsed from.

pub mod de;
pub mod xml;

use std::collections::BTreeMap;
use std::fmt;

/// HTTP methods used against the Scout API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// GET
    Get,
    /// POST
    Post,
    /// DELETE
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Delete => "DELETE",
        };
        f.write_str(name)
    }
}

/// A raw response as returned by a transport
///
/// Header names are stored lowercased; lookups are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers, keyed by lowercased name
    pub headers: BTreeMap<String, String>,
    /// Raw response body
    pub body: String,
}

impl ApiResponse {
    /// Create a response with no headers
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: BTreeMap::new(),
            body: body.into(),
        }
    }

    /// Create a `200 OK` response
    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(200, body)
    }

    /// Add a header
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// Look up a header value
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Whether the HTTP status is in the 2xx range
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Status as reported by Scout
    ///
    /// Older Scout deployments report the outcome in a `Status: 404 Not Found`
    /// header. The leading number of that header wins when present, otherwise
    /// the HTTP status code is used.
    pub fn effective_status(&self) -> u16 {
        self.header("status")
            .and_then(|value| {
                let digits: String = value
                    .trim()
                    .chars()
                    .take_while(char::is_ascii_digit)
                    .collect();
                digits.parse::<u16>().ok()
            })
            .unwrap_or(self.status)
    }
}

/// Build query string from parameters
pub fn build_query_string(params: &[(&str, &str)]) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Append a query string to a path
pub fn with_query(path: &str, params: &[(&str, &str)]) -> String {
    if params.is_empty() {
        path.to_string()
    } else {
        format!("{}?{}", path, build_query_string(params))
    }
}
