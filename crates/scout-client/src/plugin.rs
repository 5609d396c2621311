//! Plugins
//!
//! A plugin is a monitoring check installed on a server. Its metric
//! descriptors arrive embedded in the plugin element and are parsed once,
//! when the plugin is built.

use crate::common::{with_query, xml};
use crate::error::ScoutError;
use crate::metric::Metric;
use crate::models::{DescriptorRecord, EmailSubscriber, PluginRecord, TriggerRecord};
use crate::server::Server;
use crate::trigger::Trigger;
use scraper::{Html, Selector};
use serde_json::Value;
use std::ops::Deref;
use std::sync::Arc;
use tracing::debug;

/// A plugin, linked to the server it is installed on
#[derive(Debug, Clone)]
pub struct Plugin {
    inner: Arc<PluginInner>,
}

#[derive(Debug)]
struct PluginInner {
    record: PluginRecord,
    server: Server,
    descriptors: Vec<Arc<DescriptorRecord>>,
}

impl Plugin {
    /// Build a plugin from a `plugin` element
    ///
    /// The embedded `descriptors/descriptor` collection is parsed here and
    /// removed from the record.
    pub(crate) fn from_value(server: &Server, value: Value) -> Result<Self, ScoutError> {
        let mut fields = xml::expect_record(value, "plugin")?;

        let descriptors = fields
            .remove("descriptors")
            .map(|descriptors| xml::into_list(descriptors, "descriptor"))
            .transpose()?
            .unwrap_or_default()
            .into_iter()
            .map(|descriptor| serde_json::from_value::<DescriptorRecord>(descriptor).map(Arc::new))
            .collect::<Result<Vec<_>, _>>()?;

        let record: PluginRecord = serde_json::from_value(Value::Object(fields))?;

        Ok(Self {
            inner: Arc::new(PluginInner {
                record,
                server: server.clone(),
                descriptors,
            }),
        })
    }

    /// Get the plugin's record
    pub fn record(&self) -> &PluginRecord {
        &self.inner.record
    }

    /// The server this plugin is installed on
    pub fn server(&self) -> &Server {
        &self.inner.server
    }

    /// Whether both handles refer to the same plugin instance
    pub fn ptr_eq(&self, other: &Plugin) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// All metrics for this plugin, with their latest values
    ///
    /// Built from the descriptors captured when the plugin was fetched; no
    /// request is made.
    pub fn metrics(&self) -> Vec<Metric> {
        self.inner
            .descriptors
            .iter()
            .map(|record| Metric::new(Arc::clone(record), self.server().clone(), self.clone()))
            .collect()
    }

    /// People subscribed to this plugin's alert emails
    ///
    /// Scout only exposes this as an HTML page, which is scraped.
    pub async fn email_subscribers(&self) -> Result<Vec<EmailSubscriber>, ScoutError> {
        let client = self.server().client();
        let plugin_id = self.id.to_string();
        let path = with_query(
            &client.path(&format!("clients/{}/email_subscribers", self.server().id)),
            &[("plugin_id", plugin_id.as_str())],
        );

        let body = client.get_text(&path).await?;
        let subscribers = parse_email_subscribers(&body)?;

        debug!("Plugin {} has {} email subscribers", self.id, subscribers.len());
        Ok(subscribers)
    }

    /// Triggers defined on this plugin
    pub async fn triggers(&self) -> Result<Vec<Trigger>, ScoutError> {
        let client = self.server().client();
        let plugin_id = self.id.to_string();
        let path = with_query(
            &client.path(&format!("clients/{}/triggers.xml", self.server().id)),
            &[("plugin_id", plugin_id.as_str())],
        );
        let mut document = client.get_xml(&path).await?;

        xml::take_list(&mut document, "triggers", "trigger")?
            .into_iter()
            .map(|element| -> Result<Trigger, ScoutError> {
                let record: TriggerRecord = serde_json::from_value(element)?;
                Ok(Trigger::new(record, self.server().clone(), Some(self.clone())))
            })
            .collect()
    }
}

impl Deref for Plugin {
    type Target = PluginRecord;

    fn deref(&self) -> &PluginRecord {
        &self.inner.record
    }
}

fn selector(css: &str) -> Result<Selector, ScoutError> {
    Selector::parse(css).map_err(|e| ScoutError::Api(format!("invalid selector {}: {:?}", css, e)))
}

/// Read subscribers out of the first `table.list` on the page
///
/// The first row holds headings. Each remaining row has the subscriber's
/// name in its first cell and a notification checkbox in its second.
pub(crate) fn parse_email_subscribers(html: &str) -> Result<Vec<EmailSubscriber>, ScoutError> {
    let document = Html::parse_document(html);
    let table_selector = selector("table.list")?;
    let row_selector = selector("tr")?;
    let cell_selector = selector("td")?;
    let input_selector = selector("input")?;

    let table = document
        .select(&table_selector)
        .next()
        .ok_or_else(|| ScoutError::Api("email subscriber page has no subscriber list".to_string()))?;

    let subscribers = table
        .select(&row_selector)
        .skip(1)
        .filter_map(|row| {
            let mut cells = row.select(&cell_selector);
            let name: String = cells
                .next()?
                .text()
                .flat_map(str::chars)
                .filter(|c| !matches!(c, '\t' | '\n'))
                .collect();

            let receiving_notifications = cells
                .next()
                .and_then(|cell| cell.select(&input_selector).next())
                .and_then(|input| input.value().attr("checked"))
                .is_some_and(|checked| checked == "checked");

            Some(EmailSubscriber {
                name,
                receiving_notifications,
            })
        })
        .collect();

    Ok(subscribers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ScoutClient;
    use crate::common::{ApiResponse, Method};
    use crate::mock::MockTransport;

    const SERVER_XML: &str = r#"<client>
  <id type="integer">12345</id>
  <name>Web 1</name>
  <hostname>web1.example.com</hostname>
</client>"#;

    const PLUGIN_XML: &str = r#"<plugin>
  <id type="integer">77</id>
  <name>Load Averages</name>
  <interval type="integer">3</interval>
  <descriptors>
    <descriptor><name>last_minute</name><value>0.42</value></descriptor>
    <descriptor><name>last_five_minutes</name><value>0.37</value></descriptor>
    <descriptor><name>last_fifteen_minutes</name><value>0.30</value></descriptor>
  </descriptors>
</plugin>"#;

    const SUBSCRIBERS_HTML: &str = "<html><body>
<table class=\"list\">
  <tr><th>Name</th><th>Receiving notifications?</th></tr>
  <tr>
    <td>\n\t\tJane Doe\n\t</td>
    <td><input type=\"checkbox\" name=\"notify[1]\" checked=\"checked\" /></td>
  </tr>
  <tr>
    <td>\tJohn Roe\n</td>
    <td><input type=\"checkbox\" name=\"notify[2]\" /></td>
  </tr>
</table>
</body></html>";

    async fn fetched_plugin(mock: &MockTransport) -> (Server, Plugin) {
        let client = ScoutClient::with_transport("acme", Arc::new(mock.clone()));
        mock.respond_xml(Method::Get, "/acme/clients/12345.xml", SERVER_XML);
        mock.respond_xml(Method::Get, "/acme/clients/12345/plugins/77.xml", PLUGIN_XML);

        let server = Server::first(&client, 12345_u64).await.unwrap();
        let plugin = server.plugin(77).await.unwrap();
        (server, plugin)
    }

    #[tokio::test]
    async fn test_descriptors_removed_from_record() {
        let mock = MockTransport::new();
        let (_server, plugin) = fetched_plugin(&mock).await;

        assert_eq!(plugin.name, "Load Averages");
        assert_eq!(plugin.interval, Some(3));
        assert!(!plugin.extra.contains_key("descriptors"));
    }

    #[tokio::test]
    async fn test_metrics_link_to_plugin_and_server() {
        let mock = MockTransport::new();
        let (server, plugin) = fetched_plugin(&mock).await;

        let metrics = plugin.metrics();
        assert_eq!(metrics.len(), 3);
        assert_eq!(metrics[0].name, "last_minute");
        assert_eq!(metrics[0].value, Some(0.42));
        for metric in &metrics {
            assert!(metric.plugin().ptr_eq(&plugin));
            assert!(metric.server().ptr_eq(plugin.server()));
            assert!(metric.server().ptr_eq(&server));
        }
    }

    #[tokio::test]
    async fn test_metrics_are_identity_stable() {
        let mock = MockTransport::new();
        let (_server, plugin) = fetched_plugin(&mock).await;
        let requests_before = mock.requests().len();

        let first = plugin.metrics();
        let second = plugin.metrics();

        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(&second) {
            assert!(std::ptr::eq(a.record(), b.record()));
        }
        assert_eq!(mock.requests().len(), requests_before);
    }

    #[tokio::test]
    async fn test_plugin_without_descriptors_has_no_metrics() {
        let mock = MockTransport::new();
        let client = ScoutClient::with_transport("acme", Arc::new(mock.clone()));
        mock.respond_xml(Method::Get, "/acme/clients/12345.xml", SERVER_XML);
        mock.respond_xml(
            Method::Get,
            "/acme/clients/12345/plugins/78.xml",
            "<plugin><id type=\"integer\">78</id><name>Ping</name></plugin>",
        );

        let server = Server::first(&client, 12345_u64).await.unwrap();
        let plugin = server.plugin(78).await.unwrap();
        assert!(plugin.metrics().is_empty());
    }

    #[tokio::test]
    async fn test_email_subscribers() {
        let mock = MockTransport::new();
        let (_server, plugin) = fetched_plugin(&mock).await;
        mock.respond(
            Method::Get,
            "/acme/clients/12345/email_subscribers?plugin_id=77",
            ApiResponse::ok(SUBSCRIBERS_HTML),
        );

        let subscribers = plugin.email_subscribers().await.unwrap();
        assert_eq!(
            subscribers,
            vec![
                EmailSubscriber {
                    name: "Jane Doe".to_string(),
                    receiving_notifications: true,
                },
                EmailSubscriber {
                    name: "John Roe".to_string(),
                    receiving_notifications: false,
                },
            ]
        );
    }

    #[test]
    fn test_parse_email_subscribers_requires_list_table() {
        let err = parse_email_subscribers("<html><body><p>Sign in</p></body></html>").unwrap_err();
        assert!(matches!(err, ScoutError::Api(_)));
    }

    #[test]
    fn test_parse_email_subscribers_checked_must_equal_checked() {
        let html = "<table class=\"list\">
            <tr><th>Name</th><th>Notify</th></tr>
            <tr><td>Ops</td><td><input type=\"checkbox\" checked=\"false\"></td></tr>
            <tr><td>Dev</td></tr>
        </table>";

        let subscribers = parse_email_subscribers(html).unwrap();
        assert_eq!(subscribers.len(), 2);
        assert!(!subscribers[0].receiving_notifications);
        assert_eq!(subscribers[1].name, "Dev");
        assert!(!subscribers[1].receiving_notifications);
    }

    #[tokio::test]
    async fn test_triggers_link_to_plugin() {
        let mock = MockTransport::new();
        let (server, plugin) = fetched_plugin(&mock).await;
        mock.respond_xml(
            Method::Get,
            "/acme/clients/12345/triggers.xml?plugin_id=77",
            r#"<triggers type="array">
                 <trigger>
                   <id type="integer">4</id>
                   <trigger-type>plateau</trigger-type>
                   <data-series-name>last_minute</data-series-name>
                   <max-value type="float">4.0</max-value>
                 </trigger>
               </triggers>"#,
        );

        let triggers = plugin.triggers().await.unwrap();
        assert_eq!(triggers.len(), 1);
        assert_eq!(triggers[0].data_series_name.as_deref(), Some("last_minute"));
        assert_eq!(triggers[0].max_value, Some(4.0));
        assert!(triggers[0].server().ptr_eq(&server));
        assert!(triggers[0].plugin().is_some_and(|owner| owner.ptr_eq(&plugin)));
    }
}
