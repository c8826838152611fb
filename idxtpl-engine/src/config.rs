//! Client configuration.

use std::time::Duration;

use serde::Deserialize;

use crate::client::Dialect;
use crate::error::{Error, Result};

pub const DEFAULT_URL: &str = "http://localhost:9200";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for a cluster.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the cluster (e.g., http://localhost:9200)
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Pin the API dialect instead of sniffing it from the cluster
    pub dialect: Option<Dialect>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            username: None,
            password: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            dialect: None,
        }
    }
}

impl ClientConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Build a config from `ELASTICSEARCH_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(url) = lookup("ELASTICSEARCH_URL") {
            config.url = url;
        }
        config.username = lookup("ELASTICSEARCH_USERNAME");
        config.password = lookup("ELASTICSEARCH_PASSWORD");
        if let Some(timeout) = lookup("ELASTICSEARCH_TIMEOUT") {
            config.timeout_secs = timeout
                .parse()
                .map_err(|_| Error::Config(format!("invalid ELASTICSEARCH_TIMEOUT: {timeout:?}")))?;
        }
        if let Some(dialect) = lookup("ELASTICSEARCH_DIALECT") {
            config.dialect = Some(dialect.parse()?);
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(Error::Config("url must not be empty".into()));
        }
        if self.timeout_secs == 0 {
            return Err(Error::Config("timeout_secs must be greater than zero".into()));
        }
        if self.password.is_some() && self.username.is_none() {
            return Err(Error::Config("password given without username".into()));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Base URL without a trailing slash.
    pub(crate) fn base_url(&self) -> &str {
        self.url.trim_end_matches('/')
    }
}
