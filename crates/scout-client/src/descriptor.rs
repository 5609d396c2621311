//! Metric descriptors
//!
//! Descriptors list the data series Scout holds for a host, with their most
//! recent values.

use crate::client::ScoutClient;
use crate::common::{with_query, xml};
use crate::error::ScoutError;
use crate::models::DescriptorRecord;
use crate::server::Server;
use std::ops::Deref;
use tracing::debug;

/// A descriptor, linked to the server it was looked up for
#[derive(Debug, Clone)]
pub struct Descriptor {
    record: DescriptorRecord,
    server: Server,
}

impl Descriptor {
    pub(crate) fn new(record: DescriptorRecord, server: Server) -> Self {
        Self { record, server }
    }

    /// Get the descriptor's record
    pub fn record(&self) -> &DescriptorRecord {
        &self.record
    }

    /// The server the descriptor was looked up for
    pub fn server(&self) -> &Server {
        &self.server
    }

    /// All descriptors for servers matching a hostname
    ///
    /// # Returns
    /// * `Ok(Vec<DescriptorRecord>)` - Matching descriptors; empty when Scout
    ///   returns no `ar_descriptors` element
    /// * `Err(ScoutError::Configuration)` - The hostname is empty
    pub async fn all(client: &ScoutClient, host: &str) -> Result<Vec<DescriptorRecord>, ScoutError> {
        if host.is_empty() {
            return Err(ScoutError::Configuration(
                "A host is required to look up descriptors".to_string(),
            ));
        }

        let path = with_query(&client.path("descriptors.xml"), &[("host", host)]);
        let mut document = client.get_xml(&path).await?;

        let records = xml::take_list(&mut document, "ar_descriptors", "ar_descriptor")?
            .into_iter()
            .map(serde_json::from_value::<DescriptorRecord>)
            .collect::<Result<Vec<_>, _>>()?;

        debug!("Found {} descriptors for {}", records.len(), host);
        Ok(records)
    }
}

impl Deref for Descriptor {
    type Target = DescriptorRecord;

    fn deref(&self) -> &DescriptorRecord {
        &self.record
    }
}
