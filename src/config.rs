use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use url::Url;

use crate::auth::Credentials;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/";

pub const ENV_BASE_URL: &str = "TOOLHUB_BASE_URL";
pub const ENV_SESSION_ID: &str = "TOOLHUB_SESSION_ID";
pub const ENV_ACCESS_TOKEN: &str = "TOOLHUB_ACCESS_TOKEN";
pub const ENV_TIMEOUT_SECS: &str = "TOOLHUB_TIMEOUT_SECS";
pub const ENV_MESSAGES: &str = "TOOLHUB_MESSAGES";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: Url,
    pub credentials: Credentials,
    /// No timeout unless configured.
    pub timeout: Option<Duration>,
    /// Optional banana-i18n message file layered over the English catalog.
    pub messages_path: Option<PathBuf>,
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url.trim())
            .with_context(|| format!("invalid Toolhub base URL: {base_url}"))?;
        Ok(Self {
            base_url,
            credentials: Credentials::Anonymous,
            timeout: None,
            messages_path: None,
        })
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup; `from_env` passes the process
    /// environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup(ENV_BASE_URL).unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let mut config = Self::new(&base_url)?;

        config.credentials =
            Credentials::from_parts(lookup(ENV_SESSION_ID), lookup(ENV_ACCESS_TOKEN));
        config.timeout = lookup(ENV_TIMEOUT_SECS)
            .map(|raw| parse_timeout(&raw))
            .transpose()?;
        config.messages_path = lookup(ENV_MESSAGES)
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        Ok(config)
    }
}

pub fn parse_timeout(raw: &str) -> Result<Duration> {
    let secs: u64 = raw
        .trim()
        .parse()
        .with_context(|| {
            format!("{ENV_TIMEOUT_SECS} must be a whole number of seconds, got {raw:?}")
        })?;
    Ok(Duration::from_secs(secs))
}
