//! Alerts raised for a server

use crate::models::AlertRecord;
use crate::server::Server;
use std::ops::Deref;
use std::sync::Arc;

/// An alert, linked to the server it was raised on
#[derive(Debug, Clone)]
pub struct Alert {
    record: Arc<AlertRecord>,
    server: Server,
}

impl Alert {
    pub(crate) fn new(record: Arc<AlertRecord>, server: Server) -> Self {
        Self { record, server }
    }

    /// Get the alert's record
    pub fn record(&self) -> &AlertRecord {
        &self.record
    }

    /// The server the alert was raised on
    pub fn server(&self) -> &Server {
        &self.server
    }
}

impl Deref for Alert {
    type Target = AlertRecord;

    fn deref(&self) -> &AlertRecord {
        &self.record
    }
}
