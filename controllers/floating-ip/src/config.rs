//! Controller configuration loaded from environment variables.

use crate::error::ControllerError;
use std::fmt;
use std::time::Duration;

const DEFAULT_API_URL: &str = "https://api.digitalocean.com";
const DEFAULT_REQUEUE_AFTER_SECS: u64 = 300;
const DEFAULT_RECONCILE_TIMEOUT_SECS: u64 = 60;
const DEFAULT_CONCURRENCY: u16 = 3;

/// Runtime settings for the controller.
#[derive(Clone)]
pub struct ControllerConfig {
    /// DigitalOcean API base URL
    pub api_url: String,
    /// DigitalOcean API token
    pub token: String,
    /// Namespace to watch bindings in; `None` watches all namespaces
    pub namespace: Option<String>,
    /// Delay before re-checking a binding that is not ready yet.
    /// Also caps the error backoff.
    pub requeue_after: Duration,
    /// Deadline for a single reconciliation attempt
    pub reconcile_timeout: Duration,
    /// Bindings reconciled concurrently
    pub concurrency: u16,
}

impl fmt::Debug for ControllerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerConfig")
            .field("api_url", &self.api_url)
            .field("token", &"<redacted>")
            .field("namespace", &self.namespace)
            .field("requeue_after", &self.requeue_after)
            .field("reconcile_timeout", &self.reconcile_timeout)
            .field("concurrency", &self.concurrency)
            .finish()
    }
}

impl ControllerConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ControllerError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, which returns the value of a variable if set.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ControllerError> {
        let token = lookup("DIGITALOCEAN_TOKEN")
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| ControllerError::InvalidConfig(
                "DIGITALOCEAN_TOKEN environment variable is required".to_string()
            ))?;
        let api_url = lookup("DIGITALOCEAN_API_URL")
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let namespace = lookup("WATCH_NAMESPACE").filter(|ns| !ns.is_empty());

        let requeue_after = parse_secs(&lookup, "REQUEUE_AFTER_SECS", DEFAULT_REQUEUE_AFTER_SECS)?;
        let reconcile_timeout = parse_secs(
            &lookup,
            "RECONCILE_TIMEOUT_SECS",
            DEFAULT_RECONCILE_TIMEOUT_SECS,
        )?;
        let concurrency = match lookup("RECONCILE_CONCURRENCY") {
            None => DEFAULT_CONCURRENCY,
            Some(raw) => raw.trim().parse::<u16>().ok().filter(|c| *c > 0).ok_or_else(|| {
                ControllerError::InvalidConfig(format!(
                    "RECONCILE_CONCURRENCY must be a positive integer, got {:?}",
                    raw
                ))
            })?,
        };

        Ok(Self {
            api_url,
            token,
            namespace,
            requeue_after,
            reconcile_timeout,
            concurrency,
        })
    }
}

fn parse_secs(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: u64,
) -> Result<Duration, ControllerError> {
    match lookup(key) {
        None => Ok(Duration::from_secs(default)),
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .ok()
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .ok_or_else(|| ControllerError::InvalidConfig(format!(
                "{} must be a positive number of seconds, got {:?}",
                key, raw
            ))),
    }
}
