//! Servers
//!
//! A [`Server`] is a monitored host. It is the entry point to everything
//! else: plugins, triggers, alerts and descriptors are all fetched through
//! it, and each of them keeps a handle back to the server that produced it.

use crate::alert::Alert;
use crate::client::{ScoutClient, check_status};
use crate::common::{Method, with_query, xml};
use crate::descriptor::Descriptor;
use crate::error::ScoutError;
use crate::models::{AlertRecord, ServerRecord, TriggerRecord};
use crate::plugin::Plugin;
use crate::trigger::Trigger;
use serde_json::Value;
use std::ops::Deref;
use std::sync::Arc;
use tracing::{debug, info};

/// How to find a single server
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerLookup {
    /// Scout's numeric server id
    Id(u64),
    /// Hostname; the first match wins
    Hostname(String),
}

impl From<u64> for ServerLookup {
    fn from(id: u64) -> Self {
        ServerLookup::Id(id)
    }
}

impl From<&str> for ServerLookup {
    fn from(hostname: &str) -> Self {
        ServerLookup::Hostname(hostname.to_string())
    }
}

impl From<String> for ServerLookup {
    fn from(hostname: String) -> Self {
        ServerLookup::Hostname(hostname)
    }
}

/// Filters for [`Server::all`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerQuery {
    /// Hostname to match; required
    pub host: Option<String>,
}

impl ServerQuery {
    /// Match servers by hostname
    pub fn host(host: impl Into<String>) -> Self {
        Self {
            host: Some(host.into()),
        }
    }
}

/// Options for [`Server::create`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateServerOptions {
    /// Existing server whose plugins are copied onto the new one
    pub copy_plugins_from: Option<u64>,
}

impl CreateServerOptions {
    /// Use an existing server as a template
    pub fn copy_plugins_from(id: u64) -> Self {
        Self {
            copy_plugins_from: Some(id),
        }
    }
}

/// A monitored host
///
/// Cheap to clone: clones share the same record, and
/// [`Server::ptr_eq`] tells whether two handles are the same instance.
#[derive(Debug, Clone)]
pub struct Server {
    inner: Arc<ServerInner>,
}

#[derive(Debug)]
struct ServerInner {
    record: ServerRecord,
    active_alerts: Vec<Arc<AlertRecord>>,
    client: ScoutClient,
}

impl Server {
    /// Build a server from a `client` element
    ///
    /// The embedded `active_alerts` collection is parsed here and removed
    /// from the record.
    pub(crate) fn from_value(client: &ScoutClient, value: Value) -> Result<Self, ScoutError> {
        let mut fields = xml::expect_record(value, "client")?;

        let active_alerts = fields
            .remove("active_alerts")
            .map(|alerts| xml::into_list(alerts, "alert"))
            .transpose()?
            .unwrap_or_default()
            .into_iter()
            .map(|alert| serde_json::from_value::<AlertRecord>(alert).map(Arc::new))
            .collect::<Result<Vec<_>, _>>()?;

        let record: ServerRecord = serde_json::from_value(Value::Object(fields))?;

        Ok(Self {
            inner: Arc::new(ServerInner {
                record,
                active_alerts,
                client: client.clone(),
            }),
        })
    }

    /// Get the server's record
    pub fn record(&self) -> &ServerRecord {
        &self.inner.record
    }

    /// Get the client this server was fetched with
    pub fn client(&self) -> &ScoutClient {
        &self.inner.client
    }

    /// Whether both handles refer to the same server instance
    pub fn ptr_eq(&self, other: &Server) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Find a server by id or by hostname
    ///
    /// A hostname lookup returns the first matching server.
    ///
    /// ```no_run
    /// # use scout_client::{ScoutClient, Server, ServerLookup};
    /// # async fn example(client: &ScoutClient) -> Result<(), scout_client::ScoutError> {
    /// let by_id = Server::first(client, ServerLookup::Id(12345)).await?;
    /// let by_host = Server::first(client, "web1.example.com").await?;
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Returns
    /// * `Ok(Server)` - The matching server
    /// * `Err(ScoutError::NotFound)` - No server matches
    pub async fn first(
        client: &ScoutClient,
        lookup: impl Into<ServerLookup>,
    ) -> Result<Server, ScoutError> {
        match lookup.into() {
            ServerLookup::Id(id) => {
                let path = client.path(&format!("clients/{}.xml", id));
                debug!("Fetching server {} from Scout", id);

                let mut document = client.get_xml(&path).await?;
                let element = xml::take_root(&mut document, "client")
                    .filter(|element| !element.is_null())
                    .ok_or_else(|| ScoutError::NotFound(format!("Server {} not found", id)))?;
                Server::from_value(client, element)
            }
            ServerLookup::Hostname(hostname) => {
                let element = Self::clients_for_host(client, &hostname)
                    .await?
                    .and_then(|elements| elements.into_iter().next())
                    .ok_or_else(|| {
                        ScoutError::NotFound(format!("Server {} not found", hostname))
                    })?;
                Server::from_value(client, element)
            }
        }
    }

    /// Find all servers matching a hostname
    ///
    /// # Returns
    /// * `Ok(Vec<Server>)` - Matching servers, possibly none
    /// * `Err(ScoutError::Configuration)` - No host was given
    pub async fn all(client: &ScoutClient, query: &ServerQuery) -> Result<Vec<Server>, ScoutError> {
        let hostname = query
            .host
            .as_deref()
            .filter(|host| !host.is_empty())
            .ok_or_else(|| {
                ScoutError::Configuration("Please specify a host via ServerQuery::host".to_string())
            })?;

        let servers = match Self::clients_for_host(client, hostname).await? {
            Some(elements) => elements
                .into_iter()
                .map(|element| Server::from_value(client, element))
                .collect::<Result<Vec<_>, _>>()?,
            None => Vec::new(),
        };

        debug!("Found {} servers matching {}", servers.len(), hostname);
        Ok(servers)
    }

    /// Create a server, optionally copying plugins from an existing one
    ///
    /// The new server is re-fetched by the id Scout returns in the `id`
    /// response header.
    ///
    /// # Returns
    /// * `Ok(Server)` - The created server
    /// * `Err(ScoutError::Api)` - Scout rejected the request; carries its message
    pub async fn create(
        client: &ScoutClient,
        name: &str,
        options: &CreateServerOptions,
    ) -> Result<Server, ScoutError> {
        let path = client.path("clients.xml");
        let template = options.copy_plugins_from.map(|id| id.to_string());

        let mut params = vec![("client[name]", name)];
        if let Some(template) = template.as_deref() {
            params.push(("client[copy_plugins_from_client_id]", template));
        }

        let response = client.post(&path, &params).await?;

        // Failure pages are not always XML; the status decides then.
        let message = match error_message(&response.body) {
            Ok(message) => message,
            Err(_) if !(200..300).contains(&response.effective_status()) => None,
            Err(e) => return Err(e),
        };
        if let Some(message) = message {
            return Err(ScoutError::Api(message));
        }
        check_status(Method::Post, &path, &response)?;

        let id = response
            .header("id")
            .and_then(|id| id.trim().parse::<u64>().ok())
            .ok_or_else(|| {
                ScoutError::Api(format!("Scout did not return an id for server {}", name))
            })?;

        info!("Created server {} with id {}", name, id);
        Self::first(client, id).await
    }

    /// Delete a server by id
    ///
    /// # Returns
    /// * `Ok(())` - Scout answered `200 OK`
    /// * `Err(ScoutError::NotFound)` - Scout answered 404
    /// * `Err(ScoutError::Api)` - Any other status
    pub async fn delete(client: &ScoutClient, id: u64) -> Result<(), ScoutError> {
        let path = client.path(&format!("clients/{}.xml", id));
        let response = client.delete(&path).await?;

        match response.effective_status() {
            200 => {
                info!("Deleted server {}", id);
                Ok(())
            }
            404 => Err(ScoutError::NotFound(format!("Server {} not found", id))),
            status => Err(ScoutError::Api(format!(
                "Failed to delete server {}: {}",
                id, status
            ))),
        }
    }

    /// Alerts that were active when this server was fetched
    pub fn active_alerts(&self) -> Vec<Alert> {
        self.inner
            .active_alerts
            .iter()
            .map(|record| Alert::new(Arc::clone(record), self.clone()))
            .collect()
    }

    /// Recent alerts for this server, fetched fresh on every call
    pub async fn alerts(&self) -> Result<Vec<Alert>, ScoutError> {
        let path = self.client().path(&format!("clients/{}/activities.xml", self.id));
        let mut document = self.client().get_xml(&path).await?;

        xml::take_list(&mut document, "alerts", "alert")?
            .into_iter()
            .map(|element| -> Result<Alert, ScoutError> {
                let record: AlertRecord = serde_json::from_value(element)?;
                Ok(Alert::new(Arc::new(record), self.clone()))
            })
            .collect()
    }

    /// All plugins installed on this server
    pub async fn plugins(&self) -> Result<Vec<Plugin>, ScoutError> {
        let path = self.client().path(&format!("clients/{}/plugins.xml", self.id));
        let mut document = self.client().get_xml(&path).await?;

        let plugins = xml::take_list(&mut document, "plugins", "plugin")?
            .into_iter()
            .map(|element| Plugin::from_value(self, element))
            .collect::<Result<Vec<_>, _>>()?;

        debug!("Server {} has {} plugins", self.id, plugins.len());
        Ok(plugins)
    }

    /// A single plugin on this server
    pub async fn plugin(&self, id: u64) -> Result<Plugin, ScoutError> {
        let path = self
            .client()
            .path(&format!("clients/{}/plugins/{}.xml", self.id, id));
        let mut document = self.client().get_xml(&path).await?;

        let element = xml::take_root(&mut document, "plugin")
            .filter(|element| !element.is_null())
            .ok_or_else(|| {
                ScoutError::NotFound(format!("Plugin {} not found on server {}", id, self.id))
            })?;
        Plugin::from_value(self, element)
    }

    /// Metric descriptors for every server sharing this server's hostname
    pub async fn descriptors(&self) -> Result<Vec<Descriptor>, ScoutError> {
        let records = Descriptor::all(self.client(), &self.hostname).await?;
        Ok(records
            .into_iter()
            .map(|record| Descriptor::new(record, self.clone()))
            .collect())
    }

    /// Triggers defined on this server
    pub async fn triggers(&self) -> Result<Vec<Trigger>, ScoutError> {
        let path = self.client().path(&format!("clients/{}/triggers.xml", self.id));
        let mut document = self.client().get_xml(&path).await?;

        xml::take_list(&mut document, "triggers", "trigger")?
            .into_iter()
            .map(|element| -> Result<Trigger, ScoutError> {
                let record: TriggerRecord = serde_json::from_value(element)?;
                Ok(Trigger::new(record, self.clone(), None))
            })
            .collect()
    }

    /// `client` elements for a hostname; `None` when Scout returned no `clients` element
    async fn clients_for_host(
        client: &ScoutClient,
        hostname: &str,
    ) -> Result<Option<Vec<Value>>, ScoutError> {
        let path = with_query(&client.path("clients.xml"), &[("host", hostname)]);
        let mut document = client.get_xml(&path).await?;

        xml::take_root(&mut document, "clients")
            .map(|clients| xml::into_list(clients, "client"))
            .transpose()
    }
}

impl Deref for Server {
    type Target = ServerRecord;

    fn deref(&self) -> &ServerRecord {
        &self.inner.record
    }
}

/// Messages from an `errors` payload, joined with `; `
fn error_message(body: &str) -> Result<Option<String>, ScoutError> {
    if !body.trim_start().starts_with('<') {
        return Ok(None);
    }

    let mut document = xml::parse_document(body)?;
    let Some(errors) = xml::take_root(&mut document, "errors") else {
        return Ok(None);
    };

    let items = match errors {
        text @ Value::String(_) => vec![text],
        errors => xml::into_list(errors, "error")?,
    };

    let messages: Vec<String> = items
        .into_iter()
        .map(|message| match message {
            Value::String(text) => text,
            other => other.to_string(),
        })
        .collect();

    if messages.is_empty() {
        Ok(Some("Scout reported an error".to_string()))
    } else {
        Ok(Some(messages.join("; ")))
    }
}
