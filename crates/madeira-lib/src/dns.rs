//! DNS record management through the GoDaddy API and public resolution polling.
//!
//! Provider credentials are read from a small JSON document, by default
//! `~/.godaddy-dns.json`:
//!
//! ```json
//! {"domain": "example.com", "api_key": "...", "api_secret": "..."}
//! ```
//!
//! The `MADEIRA_DNS_CONFIG` environment variable overrides the location.
//! Record names may be given fully qualified; the account domain suffix is
//! stripped before calling the provider.

use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use directories::BaseDirs;
use reqwest::blocking::Client;
use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::client::build_client;
use crate::error::{Error, Result};

const CONFIG_FILE_NAME: &str = ".godaddy-dns.json";
const CONFIG_PATH_ENV: &str = "MADEIRA_DNS_CONFIG";
const DEFAULT_API_BASE: &str = "https://api.godaddy.com/v1";
const DEFAULT_DOH_ENDPOINT: &str = "https://dns.google/resolve";

/// Default time-to-live applied to updated records, in seconds.
pub const DEFAULT_TTL: u32 = 600;

/// Default number of resolution attempts made by [`wait_for_value`].
pub const DEFAULT_WAIT_ATTEMPTS: u32 = 50;

/// Default delay between resolution attempts made by [`wait_for_value`].
pub const DEFAULT_WAIT_DELAY: Duration = Duration::from_secs(30);

/// Credentials and account domain for the DNS provider.
#[derive(Clone, Serialize, Deserialize)]
pub struct DnsProviderConfig {
    pub domain: String,
    pub api_key: String,
    pub api_secret: String,
    #[serde(default = "default_api_base", skip_serializing)]
    pub api_base: String,
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

impl fmt::Debug for DnsProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DnsProviderConfig")
            .field("domain", &self.domain)
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl DnsProviderConfig {
    /// Load the configuration from the default location.
    pub fn load() -> Result<Self> {
        Self::load_from(&default_config_path()?)
    }

    /// Load the configuration from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::DnsConfigMissing {
                path: path.to_path_buf(),
            });
        }

        let contents = fs::read_to_string(path)?;
        serde_json::from_str(&contents).map_err(|err| Error::DnsConfigInvalid {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
    }

    /// Point the provider client at a different API base URL.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Strip the account domain suffix from a record name, if present.
    pub fn short_name<'a>(&self, name: &'a str) -> &'a str {
        name.strip_suffix(&format!(".{}", self.domain))
            .unwrap_or(name)
    }

    fn authorization(&self) -> String {
        format!("sso-key {}:{}", self.api_key, self.api_secret)
    }

    fn record_url(&self, record_type: &str, short_name: &str) -> String {
        format!(
            "{}/domains/{}/records/{}/{}",
            self.api_base.trim_end_matches('/'),
            self.domain,
            record_type,
            short_name
        )
    }
}

/// Resolve the default configuration path.
pub fn default_config_path() -> Result<PathBuf> {
    if let Some(path) = env::var_os(CONFIG_PATH_ENV) {
        return Ok(PathBuf::from(path));
    }

    let dirs = BaseDirs::new().ok_or(Error::HomeDirUnavailable)?;
    Ok(dirs.home_dir().join(CONFIG_FILE_NAME))
}

/// A single DNS record as exchanged with the provider API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsRecord {
    pub name: String,
    #[serde(rename = "type")]
    pub record_type: String,
    pub data: String,
    pub ttl: u32,
}

/// Authenticated client for reading and updating provider records.
pub struct DnsProvider {
    config: DnsProviderConfig,
    client: Client,
}

impl DnsProvider {
    pub fn new(config: DnsProviderConfig) -> Result<Self> {
        Ok(Self {
            config,
            client: build_client()?,
        })
    }

    /// Build a provider from the default configuration file.
    pub fn from_default_config() -> Result<Self> {
        Self::new(DnsProviderConfig::load()?)
    }

    pub fn config(&self) -> &DnsProviderConfig {
        &self.config
    }

    /// Return the value of the first record matching `name` and `record_type`.
    pub fn read_record(&self, name: &str, record_type: &str) -> Result<String> {
        let short_name = self.config.short_name(name);
        info!(%record_type, name = %short_name, "getting DNS record value");

        let records: Vec<DnsRecord> = self
            .client
            .get(self.config.record_url(record_type, short_name))
            .header(AUTHORIZATION, self.config.authorization())
            .send()?
            .error_for_status()?
            .json()?;

        records
            .into_iter()
            .next()
            .map(|record| record.data)
            .ok_or_else(|| Error::DnsRecordNotFound {
                name: short_name.to_string(),
                record_type: record_type.to_string(),
            })
    }

    /// Replace the records for `name` and `record_type` with a single value.
    pub fn write_record(
        &self,
        name: &str,
        value: &str,
        record_type: &str,
        ttl: u32,
    ) -> Result<()> {
        let short_name = self.config.short_name(name);
        info!(%record_type, name = %short_name, %value, ttl, "setting DNS record value");

        let body = vec![DnsRecord {
            name: short_name.to_string(),
            record_type: record_type.to_string(),
            data: value.to_string(),
            ttl,
        }];

        let response = self
            .client
            .put(self.config.record_url(record_type, short_name))
            .header(AUTHORIZATION, self.config.authorization())
            .json(&body)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(Error::ProviderWriteFailed {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}

/// Outcome of a single public DNS lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// The first answer's value, as returned by the resolver.
    Answer(String),
    /// The name exists but has no record of the requested type.
    NoAnswer,
    /// The name does not exist (yet).
    NonExistent,
}

/// Public DNS resolution used by [`wait_for_value`].
pub trait Resolver {
    fn lookup(&self, host: &str, record_type: &str) -> Result<Lookup>;
}

/// Resolver backed by a DNS-over-HTTPS JSON endpoint.
pub struct DohResolver {
    endpoint: String,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct DohResponse {
    #[serde(rename = "Status")]
    status: u32,
    #[serde(rename = "Answer", default)]
    answer: Vec<DohAnswer>,
}

#[derive(Debug, Deserialize)]
struct DohAnswer {
    data: String,
}

const DOH_NOERROR: u32 = 0;
const DOH_NXDOMAIN: u32 = 3;

impl DohResolver {
    pub fn new() -> Result<Self> {
        Self::with_endpoint(DEFAULT_DOH_ENDPOINT)
    }

    pub fn with_endpoint(endpoint: impl Into<String>) -> Result<Self> {
        Ok(Self {
            endpoint: endpoint.into(),
            client: build_client()?,
        })
    }
}

impl Resolver for DohResolver {
    fn lookup(&self, host: &str, record_type: &str) -> Result<Lookup> {
        let response: DohResponse = self
            .client
            .get(&self.endpoint)
            .query(&[("name", host), ("type", record_type)])
            .header("accept", "application/dns-json")
            .send()?
            .error_for_status()?
            .json()?;

        match response.status {
            DOH_NOERROR => Ok(response
                .answer
                .into_iter()
                .next()
                .map(|answer| Lookup::Answer(answer.data))
                .unwrap_or(Lookup::NoAnswer)),
            DOH_NXDOMAIN => Ok(Lookup::NonExistent),
            other => Err(Error::DnsLookupFailed {
                host: host.to_string(),
                message: format!("resolver returned status {}", other),
            }),
        }
    }
}

/// Attempt budget for [`wait_for_value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_WAIT_ATTEMPTS,
            delay: DEFAULT_WAIT_DELAY,
        }
    }
}

/// Poll public resolution until `host` answers with `desired`.
///
/// Answers are compared without a trailing root dot and ignoring ASCII case,
/// so `target.example.com` matches `Target.Example.com.` while address and
/// text records compare by value. A non-existent name is treated
/// as not propagated yet. Returns [`Error::DnsWaitExhausted`] once the attempt
/// budget runs out.
pub fn wait_for_value<R: Resolver + ?Sized>(
    resolver: &R,
    host: &str,
    desired: &str,
    record_type: &str,
    policy: WaitPolicy,
) -> Result<()> {
    let expected = normalized(desired);

    for attempt in 1..=policy.attempts {
        match resolver.lookup(host, record_type)? {
            Lookup::Answer(value) if normalized(&value) == expected => {
                info!(%host, %desired, attempt, "DNS value observed from this system");
                return Ok(());
            }
            Lookup::Answer(value) => {
                info!(%host, current = %value, %desired, attempt, "DNS value does not match yet");
            }
            Lookup::NoAnswer => {
                debug!(%host, %record_type, attempt, "no answer yet");
            }
            Lookup::NonExistent => {
                debug!(%host, attempt, "name does not exist yet");
            }
        }

        if attempt < policy.attempts && !policy.delay.is_zero() {
            thread::sleep(policy.delay);
        }
    }

    Err(Error::DnsWaitExhausted {
        host: host.to_string(),
        desired: desired.to_string(),
        attempts: policy.attempts,
    })
}

fn normalized(value: &str) -> String {
    value.trim().trim_end_matches('.').to_ascii_lowercase()
}
