//! Configuration management for the form Lambda.

use std::env;
use std::time::Duration;

use crate::normalize::ExtractionPolicy;
use crate::{Error, Result};

/// Default webhook timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// n8n webhook URL that answers questions
    pub webhook_url: String,
    /// Shared secret forwarded with every question (may be empty)
    pub shared_secret: String,
    /// Timeout for the single outbound request
    pub timeout: Duration,
    /// Field precedence used when reading the webhook response
    pub policy: ExtractionPolicy,
}

impl Config {
    /// Build a configuration with defaults for everything but the webhook.
    pub fn new(webhook_url: impl Into<String>, shared_secret: impl Into<String>) -> Self {
        Self {
            webhook_url: webhook_url.into(),
            shared_secret: shared_secret.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            policy: ExtractionPolicy::default(),
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let webhook_url = lookup("N8N_WEBHOOK")
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .ok_or(Error::ConfigMissing)?;

        let mut config = Self::new(
            webhook_url,
            lookup("N8N_SHARED_SECRET").unwrap_or_default(),
        );

        if let Some(raw) = lookup("WEBHOOK_TIMEOUT_SECS") {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                Error::Config(format!("WEBHOOK_TIMEOUT_SECS must be whole seconds, got '{}'", raw))
            })?;
            if secs == 0 {
                return Err(Error::Config(
                    "WEBHOOK_TIMEOUT_SECS must be at least 1".to_string(),
                ));
            }
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}
