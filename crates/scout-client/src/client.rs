//! Scout API client
//!
//! [`ScoutClient`] scopes requests under an account and turns raw responses
//! into parsed documents. [`HttpTransport`] is the reqwest-backed transport it
//! uses by default.

use crate::common::xml;
use crate::common::{ApiResponse, Method};
use crate::config::ScoutConfig;
use crate::error::ScoutError;
use crate::scout_trait::ScoutTransport;
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// reqwest transport with HTTP basic auth
pub struct HttpTransport {
    client: Client,
    base_url: String,
    email: String,
    password: String,
}

impl HttpTransport {
    /// Create a new transport from configuration
    pub fn new(config: &ScoutConfig) -> Result<Self, ScoutError> {
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            email: config.email.clone(),
            password: config.password.clone(),
        })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a full URL from a path
    pub fn build_url(&self, path: &str) -> String {
        if path.starts_with("http") {
            path.to_string()
        } else {
            format!("{}{}", self.base_url, path)
        }
    }

    async fn execute(&self, request: RequestBuilder) -> Result<ApiResponse, ScoutError> {
        let response = request
            .basic_auth(&self.email, Some(&self.password))
            .header("Accept", "application/xml")
            .send()
            .await?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_ascii_lowercase(), value.to_string()))
            })
            .collect();
        let body = response.text().await?;

        Ok(ApiResponse {
            status,
            headers,
            body,
        })
    }
}

impl fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.base_url)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

#[async_trait::async_trait]
impl ScoutTransport for HttpTransport {
    async fn get(&self, path: &str) -> Result<ApiResponse, ScoutError> {
        let url = self.build_url(path);
        self.execute(self.client.get(&url)).await
    }

    async fn post(&self, path: &str, params: &[(&str, &str)]) -> Result<ApiResponse, ScoutError> {
        let url = self.build_url(path);
        self.execute(self.client.post(&url).query(params)).await
    }

    async fn delete(&self, path: &str) -> Result<ApiResponse, ScoutError> {
        let url = self.build_url(path);
        self.execute(self.client.delete(&url)).await
    }
}

/// Account-scoped Scout API client
///
/// Cheap to clone; every resource handle keeps a copy.
#[derive(Debug, Clone)]
pub struct ScoutClient {
    account: String,
    transport: Arc<dyn ScoutTransport>,
}

impl ScoutClient {
    /// Create a client that talks HTTP to the configured endpoint
    pub fn new(config: ScoutConfig) -> Result<Self, ScoutError> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self::with_transport(config.account, Arc::new(transport)))
    }

    /// Create a client over any transport
    pub fn with_transport(account: impl Into<String>, transport: Arc<dyn ScoutTransport>) -> Self {
        Self {
            account: account.into(),
            transport,
        }
    }

    /// Get the account name
    pub fn account(&self) -> &str {
        &self.account
    }

    /// Build an account-rooted path, e.g. `clients.xml` -> `/acme/clients.xml`
    pub(crate) fn path(&self, resource: &str) -> String {
        format!("/{}/{}", self.account, resource.trim_start_matches('/'))
    }

    /// GET a path and parse the body as XML
    pub(crate) async fn get_xml(&self, path: &str) -> Result<Value, ScoutError> {
        let response = self.get_checked(path).await?;
        xml::parse_document(&response.body)
    }

    /// GET a path and return the raw body
    pub(crate) async fn get_text(&self, path: &str) -> Result<String, ScoutError> {
        Ok(self.get_checked(path).await?.body)
    }

    /// POST without status handling
    pub(crate) async fn post(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<ApiResponse, ScoutError> {
        debug!("POST {}", path);
        self.transport.post(path, params).await
    }

    /// DELETE without status handling
    pub(crate) async fn delete(&self, path: &str) -> Result<ApiResponse, ScoutError> {
        debug!("DELETE {}", path);
        self.transport.delete(path).await
    }

    async fn get_checked(&self, path: &str) -> Result<ApiResponse, ScoutError> {
        debug!("GET {}", path);
        let response = self.transport.get(path).await?;
        check_status(Method::Get, path, &response)?;
        Ok(response)
    }
}

/// Map a non-success status to an error
pub(crate) fn check_status(
    method: Method,
    path: &str,
    response: &ApiResponse,
) -> Result<(), ScoutError> {
    match response.effective_status() {
        404 => Err(ScoutError::NotFound(format!("{} {}", method, path))),
        status if (200..300).contains(&status) => Ok(()),
        status => Err(ScoutError::Api(format!(
            "{} {} failed: {} - {}",
            method,
            path,
            status,
            response.body.chars().take(500).collect::<String>()
        ))),
    }
}
