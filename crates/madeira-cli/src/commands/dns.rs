//! DNS command handlers.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;

use madeira_lib::{wait_for_value, DnsProvider, DnsProviderConfig, DohResolver, WaitPolicy};

use crate::output::OutputFormat;

/// Output structure for the DNS commands.
#[derive(Debug, Clone, Serialize)]
pub struct DnsOutput {
    pub name: String,
    #[serde(rename = "type")]
    pub record_type: String,
    pub value: String,
    pub status: DnsStatus,
}

/// What a DNS command observed or did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DnsStatus {
    Current,
    Updated,
    Resolved,
}

impl fmt::Display for DnsOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            DnsStatus::Current => write!(f, "{} {} = {}", self.record_type, self.name, self.value),
            DnsStatus::Updated => write!(
                f,
                "{} {} set to {}",
                self.record_type, self.name, self.value
            ),
            DnsStatus::Resolved => write!(
                f,
                "{} {} resolves to {}",
                self.record_type, self.name, self.value
            ),
        }
    }
}

/// Load the provider from an explicit config path or the default location.
fn provider(config: Option<&Path>) -> Result<DnsProvider> {
    let config = match config {
        Some(path) => DnsProviderConfig::load_from(path),
        None => DnsProviderConfig::load(),
    }
    .context("failed to load DNS provider configuration")?;
    Ok(DnsProvider::new(config)?)
}

/// Handle `dns get`.
pub fn handle_dns_get(
    name: &str,
    record_type: &str,
    config: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let provider = provider(config)?;
    let value = provider
        .read_record(name, record_type)
        .with_context(|| format!("failed to read {} record for {}", record_type, name))?;
    format.render(&DnsOutput {
        name: name.to_string(),
        record_type: record_type.to_string(),
        value,
        status: DnsStatus::Current,
    })
}

/// Handle `dns set`.
pub fn handle_dns_set(
    name: &str,
    value: &str,
    record_type: &str,
    ttl: u32,
    config: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let provider = provider(config)?;
    provider
        .write_record(name, value, record_type, ttl)
        .with_context(|| format!("failed to update {} record for {}", record_type, name))?;
    format.render(&DnsOutput {
        name: name.to_string(),
        record_type: record_type.to_string(),
        value: value.to_string(),
        status: DnsStatus::Updated,
    })
}

/// Handle `dns wait`.
pub fn handle_dns_wait(
    host: &str,
    value: &str,
    record_type: &str,
    attempts: u32,
    delay: Duration,
    resolver: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    let resolver = match resolver {
        Some(endpoint) => DohResolver::with_endpoint(endpoint)?,
        None => DohResolver::new()?,
    };
    wait_for_value(
        &resolver,
        host,
        value,
        record_type,
        WaitPolicy { attempts, delay },
    )
    .with_context(|| format!("{} did not resolve to {}", host, value))?;

    format.render(&DnsOutput {
        name: host.to_string(),
        record_type: record_type.to_string(),
        value: value.to_string(),
        status: DnsStatus::Resolved,
    })
}
