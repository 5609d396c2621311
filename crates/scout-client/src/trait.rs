//! ScoutTransport trait for mocking
//!
//! This trait abstracts the HTTP layer so resource code can be exercised
//! without a running Scout service. The reqwest-backed [`HttpTransport`]
//! implements it, and tests use `MockTransport` (feature `test-util`).
//!
//! [`HttpTransport`]: crate::client::HttpTransport

use crate::common::ApiResponse;
use crate::error::ScoutError;
use std::fmt;

/// Raw request/response operations against the Scout API
///
/// Paths are absolute (`/{account}/...`) and may carry a query string.
/// Implementations return the response whatever its status; status
/// handling belongs to the caller. Only transport failures are errors.
#[async_trait::async_trait]
pub trait ScoutTransport: Send + Sync + fmt::Debug {
    /// GET a path
    async fn get(&self, path: &str) -> Result<ApiResponse, ScoutError>;

    /// POST with parameters sent in the query string
    async fn post(&self, path: &str, params: &[(&str, &str)]) -> Result<ApiResponse, ScoutError>;

    /// DELETE a path
    async fn delete(&self, path: &str) -> Result<ApiResponse, ScoutError>;
}
