//! Plugin metrics

use crate::models::DescriptorRecord;
use crate::plugin::Plugin;
use crate::server::Server;
use std::ops::Deref;
use std::sync::Arc;

/// One data series reported by a plugin
///
/// The record is shared with the plugin it came from, so repeated calls to
/// [`Plugin::metrics`] hand out the same records.
#[derive(Debug, Clone)]
pub struct Metric {
    record: Arc<DescriptorRecord>,
    server: Server,
    plugin: Plugin,
}

impl Metric {
    pub(crate) fn new(record: Arc<DescriptorRecord>, server: Server, plugin: Plugin) -> Self {
        Self {
            record,
            server,
            plugin,
        }
    }

    /// Get the metric's descriptor record
    pub fn record(&self) -> &DescriptorRecord {
        &self.record
    }

    /// The server reporting this metric
    pub fn server(&self) -> &Server {
        &self.server
    }

    /// The plugin reporting this metric
    pub fn plugin(&self) -> &Plugin {
        &self.plugin
    }
}

impl Deref for Metric {
    type Target = DescriptorRecord;

    fn deref(&self) -> &DescriptorRecord {
        &self.record
    }
}
