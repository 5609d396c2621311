//! Scout API Client
//!
//! A Rust client library for the Scout server-monitoring HTTP/XML API.
//! Servers, plugins, metrics, triggers and alerts are modeled as typed values,
//! and everything fetched through a server keeps a handle back to it.
//!
//! # Example
//!
//! ```no_run
//! use scout_client::{ScoutClient, ScoutConfig, Server, ServerQuery};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // Create a client
//! let client = ScoutClient::new(ScoutConfig::new("acme", "ops@acme.test", "secret"))?;
//!
//! // Look up a server by id or hostname
//! let server = Server::first(&client, "web1.example.com").await?;
//!
//! // Walk its plugins and their latest metric values
//! for plugin in server.plugins().await? {
//!     for metric in plugin.metrics() {
//!         println!("{} {} = {:?}", plugin.name, metric.name, metric.value);
//!     }
//! }
//!
//! // Every server sharing a hostname
//! let servers = Server::all(&client, &ServerQuery::host("web1.example.com")).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! - **Servers**: look up, create from a template, delete
//! - **Plugins**: metrics, triggers and email subscribers
//! - **Alerts**: alerts active at fetch time, plus recent alert history
//! - **Mocking**: `MockTransport` behind the `test-util` feature

pub mod alert;
pub mod client;
pub mod common;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod metric;
pub mod models;
pub mod plugin;
#[path = "trait.rs"]
pub mod scout_trait;
pub mod server;
pub mod trigger;
#[cfg(any(test, feature = "test-util"))]
pub mod mock;

pub use alert::Alert;
pub use client::{HttpTransport, ScoutClient};
pub use common::{ApiResponse, Method};
pub use config::ScoutConfig;
pub use descriptor::Descriptor;
pub use error::ScoutError;
pub use metric::Metric;
pub use models::*;
pub use plugin::Plugin;
pub use scout_trait::ScoutTransport;
pub use server::{CreateServerOptions, Server, ServerLookup, ServerQuery};
pub use trigger::Trigger;
#[cfg(any(test, feature = "test-util"))]
pub use mock::MockTransport;
