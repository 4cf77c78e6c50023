use std::time::Duration;

use anyhow::{anyhow, Result};
use leadflow_connect::{DEFAULT_API_URL, DEFAULT_TIMEOUT_MS};
use leadflow_core::constants::{DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_POLL_INTERVAL_MS};

use crate::cli::GlobalArgs;

pub struct Config {
    pub api_url: String,
    pub owner_uid: Option<String>,
    pub api_token: Option<String>,
    pub request_timeout: Duration,
    pub poll_interval: Duration,
    pub max_upload_bytes: u64,
    pub log_format: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. Unparsable numbers fall back to defaults.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| var(key).filter(|v| !v.trim().is_empty());
        let number = |key: &str, default: u64| {
            non_empty(key)
                .and_then(|v| v.trim().parse::<u64>().ok())
                .unwrap_or(default)
        };

        Self {
            api_url: non_empty("LEADFLOW_API_URL").unwrap_or_else(|| DEFAULT_API_URL.into()),
            owner_uid: non_empty("LEADFLOW_OWNER_UID"),
            api_token: non_empty("LEADFLOW_API_TOKEN"),
            request_timeout: Duration::from_millis(number(
                "LEADFLOW_REQUEST_TIMEOUT_MS",
                DEFAULT_TIMEOUT_MS,
            )),
            poll_interval: Duration::from_millis(number(
                "LEADFLOW_POLL_INTERVAL_MS",
                DEFAULT_POLL_INTERVAL_MS,
            )),
            max_upload_bytes: number("LEADFLOW_MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES),
            log_format: non_empty("LEADFLOW_LOG_FORMAT").unwrap_or_else(|| "text".into()),
        }
    }

    /// Command-line flags win over the environment.
    pub fn with_overrides(mut self, args: &GlobalArgs) -> Self {
        if let Some(url) = &args.api_url {
            self.api_url = url.clone();
        }
        if let Some(owner) = &args.owner_uid {
            self.owner_uid = Some(owner.clone());
        }
        if let Some(token) = &args.token {
            self.api_token = Some(token.clone());
        }
        self
    }

    pub fn require_owner_uid(&self) -> Result<&str> {
        self.owner_uid
            .as_deref()
            .ok_or_else(|| anyhow!("No owner set: pass --owner-uid or set LEADFLOW_OWNER_UID"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[]));
        assert_eq!(config.api_url, "http://localhost:3000");
        assert!(config.owner_uid.is_none());
        assert_eq!(config.request_timeout, Duration::from_millis(30_000));
        assert_eq!(config.poll_interval, Duration::from_millis(1_000));
        assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
        assert_eq!(config.log_format, "text");
        assert!(config.require_owner_uid().is_err());
    }

    #[test]
    fn test_values_from_environment() {
        let config = Config::from_lookup(lookup(&[
            ("LEADFLOW_API_URL", "https://crm.example.com"),
            ("LEADFLOW_OWNER_UID", "owner-1"),
            ("LEADFLOW_POLL_INTERVAL_MS", "250"),
            ("LEADFLOW_REQUEST_TIMEOUT_MS", "not-a-number"),
            ("LEADFLOW_API_TOKEN", ""),
        ]));
        assert_eq!(config.api_url, "https://crm.example.com");
        assert_eq!(config.require_owner_uid().unwrap(), "owner-1");
        assert_eq!(config.poll_interval, Duration::from_millis(250));
        assert_eq!(config.request_timeout, Duration::from_millis(30_000));
        assert!(config.api_token.is_none());
    }

    #[test]
    fn test_flags_override_environment() {
        let args = GlobalArgs {
            api_url: Some("http://127.0.0.1:4000".into()),
            owner_uid: Some("owner-2".into()),
            token: None,
            json: false,
        };
        let config =
            Config::from_lookup(lookup(&[("LEADFLOW_OWNER_UID", "owner-1")])).with_overrides(&args);
        assert_eq!(config.api_url, "http://127.0.0.1:4000");
        assert_eq!(config.owner_uid.as_deref(), Some("owner-2"));
    }
}
