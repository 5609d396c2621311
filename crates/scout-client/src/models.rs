//! Scout API records
//!
//! Typed views of the elements Scout returns. Each record keeps any fields
//! it does not name in `extra`, so nothing the service sends is dropped.

use crate::common::de;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A monitored host (`client` element)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerRecord {
    #[serde(deserialize_with = "de::u64_lenient")]
    pub id: u64,
    #[serde(default, deserialize_with = "de::string_or_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "de::string_or_empty")]
    pub hostname: String,
    /// Agent key used by the host to report in
    #[serde(default, deserialize_with = "de::opt_string")]
    pub key: Option<String>,
    #[serde(default, deserialize_with = "de::opt_datetime")]
    pub last_checkin: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "de::opt_datetime")]
    pub last_ping_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "de::opt_bool")]
    pub takes_snapshots: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A monitoring plugin installed on a server (`plugin` element)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginRecord {
    #[serde(deserialize_with = "de::u64_lenient")]
    pub id: u64,
    #[serde(default, deserialize_with = "de::string_or_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "de::opt_datetime")]
    pub last_reported_at: Option<DateTime<Utc>>,
    /// Run interval in minutes
    #[serde(default, deserialize_with = "de::opt_u64")]
    pub interval: Option<u64>,
    #[serde(default, deserialize_with = "de::opt_bool")]
    pub enabled: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A metric descriptor: the name and latest value of one data series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescriptorRecord {
    #[serde(default, deserialize_with = "de::string_or_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "de::opt_u64")]
    pub id: Option<u64>,
    #[serde(default, deserialize_with = "de::opt_f64")]
    pub value: Option<f64>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub units: Option<String>,
    #[serde(default, deserialize_with = "de::opt_u64")]
    pub plugin_id: Option<u64>,
    #[serde(default, deserialize_with = "de::opt_u64")]
    pub server_id: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An alerting rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerRecord {
    #[serde(default, deserialize_with = "de::opt_u64")]
    pub id: Option<u64>,
    /// `peak`, `plateau`, `trend` and so on
    #[serde(default, deserialize_with = "de::opt_string")]
    pub trigger_type: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub data_series_name: Option<String>,
    #[serde(default, deserialize_with = "de::opt_u64")]
    pub plugin_id: Option<u64>,
    #[serde(default, deserialize_with = "de::opt_f64")]
    pub max_value: Option<f64>,
    #[serde(default, deserialize_with = "de::opt_f64")]
    pub min_value: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A raised alert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRecord {
    #[serde(default, deserialize_with = "de::opt_u64")]
    pub id: Option<u64>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub body: Option<String>,
    #[serde(default, deserialize_with = "de::opt_datetime")]
    pub time: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "de::opt_u64")]
    pub plugin_id: Option<u64>,
    #[serde(default, deserialize_with = "de::opt_u64")]
    pub server_id: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A person notified about a plugin's alerts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailSubscriber {
    /// Display name, with layout whitespace removed
    pub name: String,
    /// Whether the notification checkbox is ticked
    pub receiving_notifications: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_server_record_keeps_unknown_fields() {
        let record: ServerRecord = serde_json::from_value(json!({
            "id": 42,
            "name": "Web 1",
            "hostname": "web1.example.com",
            "key": "abc-123",
            "last_checkin": "2010-04-07T16:39:41Z",
            "environment": "production",
        }))
        .unwrap();

        assert_eq!(record.id, 42);
        assert_eq!(record.hostname, "web1.example.com");
        assert_eq!(record.key.as_deref(), Some("abc-123"));
        assert!(record.last_checkin.is_some());
        assert_eq!(record.extra.get("environment"), Some(&json!("production")));
        assert!(!record.extra.contains_key("hostname"));
    }

    #[test]
    fn test_server_record_requires_id() {
        let result: Result<ServerRecord, _> =
            serde_json::from_value(json!({ "hostname": "web1.example.com" }));
        assert!(result.is_err());
    }

    #[test]
    fn test_descriptor_record_lenient_value() {
        let record: DescriptorRecord = serde_json::from_value(json!({
            "name": "load_average",
            "value": "1.25",
            "units": null,
        }))
        .unwrap();

        assert_eq!(record.name, "load_average");
        assert_eq!(record.value, Some(1.25));
        assert_eq!(record.units, None);
    }
}
