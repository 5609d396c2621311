//! Scout Report
//!
//! Looks up every Scout server matching a hostname and logs its plugins,
//! latest metric values, active alerts and triggers.
//!
//! Configuration comes from the environment:
//! - `SCOUT_ACCOUNT`, `SCOUT_EMAIL`, `SCOUT_PASSWORD`: account credentials
//! - `SCOUT_URL`: API endpoint (optional)
//! - `SCOUT_HOST`: hostname to report on

use anyhow::{Context, Result};
use scout_client::{ScoutClient, ScoutConfig, Server, ServerQuery};
use std::env;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting Scout report");

    let config = ScoutConfig::from_env()?;
    let host = env::var("SCOUT_HOST").context("SCOUT_HOST environment variable is required")?;

    info!("Configuration:");
    info!("  Scout URL: {}", config.base_url);
    info!("  Account: {}", config.account);
    info!("  Host: {}", host);

    let client = ScoutClient::new(config)?;
    let servers = Server::all(&client, &ServerQuery::host(host.as_str()))
        .await
        .with_context(|| format!("failed to look up servers for {}", host))?;

    if servers.is_empty() {
        warn!("No servers match {}", host);
        return Ok(());
    }

    for server in &servers {
        report(server).await?;
    }

    Ok(())
}

async fn report(server: &Server) -> Result<()> {
    info!("Server {} ({}) id={}", server.name, server.hostname, server.id);

    for alert in server.active_alerts() {
        warn!(
            "  Active alert: {}",
            alert.title.as_deref().unwrap_or("(untitled)")
        );
    }

    let plugins = server
        .plugins()
        .await
        .with_context(|| format!("failed to list plugins for server {}", server.id))?;

    for plugin in &plugins {
        info!("  Plugin {} id={}", plugin.name, plugin.id);
        for metric in plugin.metrics() {
            match metric.value {
                Some(value) => info!(
                    "    {} = {} {}",
                    metric.name,
                    value,
                    metric.units.as_deref().unwrap_or("")
                ),
                None => info!("    {} has no value", metric.name),
            }
        }
    }

    let triggers = server
        .triggers()
        .await
        .with_context(|| format!("failed to list triggers for server {}", server.id))?;
    info!("  {} triggers", triggers.len());

    Ok(())
}
