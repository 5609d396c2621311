//! Alerting rules

use crate::models::TriggerRecord;
use crate::plugin::Plugin;
use crate::server::Server;
use std::ops::Deref;

/// A trigger, linked to its server and, when fetched through a plugin, that plugin
#[derive(Debug, Clone)]
pub struct Trigger {
    record: TriggerRecord,
    server: Server,
    plugin: Option<Plugin>,
}

impl Trigger {
    pub(crate) fn new(record: TriggerRecord, server: Server, plugin: Option<Plugin>) -> Self {
        Self {
            record,
            server,
            plugin,
        }
    }

    /// Get the trigger's record
    pub fn record(&self) -> &TriggerRecord {
        &self.record
    }

    /// The server the trigger belongs to
    pub fn server(&self) -> &Server {
        &self.server
    }

    /// The plugin this trigger was fetched through, if any
    pub fn plugin(&self) -> Option<&Plugin> {
        self.plugin.as_ref()
    }
}

impl Deref for Trigger {
    type Target = TriggerRecord;

    fn deref(&self) -> &TriggerRecord {
        &self.record
    }
}
