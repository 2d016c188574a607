//! Configuration management for the client.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Default directory holding the local store and the fallback mirror.
pub const DEFAULT_DATA_DIR: &str = "./turbo-data";
/// Default timeout for a single API request.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;
/// Default interval between connectivity probes.
pub const DEFAULT_PROBE_INTERVAL_MS: u64 = 5_000;

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the workshop REST API, e.g. `http://localhost:8001/api`
    pub api_base_url: String,
    /// Directory for local data
    pub data_dir: PathBuf,
    /// Per-request timeout; expiry counts as a connectivity failure
    pub request_timeout: Duration,
    /// How often the connectivity probe pings the API
    pub probe_interval: Duration,
    /// Optional bearer token sent with every request
    pub api_token: Option<String>,
}

impl Config {
    /// Configuration with defaults for everything but the API URL.
    pub fn new(api_base_url: impl Into<String>, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            data_dir: data_dir.into(),
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
            probe_interval: Duration::from_millis(DEFAULT_PROBE_INTERVAL_MS),
            api_token: None,
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_base_url = lookup("API_BASE_URL")
            .filter(|url| !url.trim().is_empty())
            .ok_or(ConfigError::MissingApiBaseUrl)?;

        let data_dir = lookup("DATA_DIR").unwrap_or_else(|| DEFAULT_DATA_DIR.to_string());

        let request_timeout = millis(
            lookup("REQUEST_TIMEOUT_MS"),
            DEFAULT_REQUEST_TIMEOUT_MS,
            "REQUEST_TIMEOUT_MS",
        )?;
        let probe_interval = millis(
            lookup("PROBE_INTERVAL_MS"),
            DEFAULT_PROBE_INTERVAL_MS,
            "PROBE_INTERVAL_MS",
        )?;

        let api_token = lookup("API_TOKEN").filter(|t| !t.is_empty());

        Ok(Self {
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            data_dir: PathBuf::from(data_dir),
            request_timeout,
            probe_interval,
            api_token,
        })
    }

    /// Directory of the durable record store.
    pub fn store_dir(&self) -> PathBuf {
        self.data_dir.join("store")
    }

    /// Directory of the fallback mirror.
    pub fn mirror_dir(&self) -> PathBuf {
        self.data_dir.join("mirror")
    }
}

fn millis(raw: Option<String>, default: u64, name: &'static str) -> Result<Duration, ConfigError> {
    match raw {
        None => Ok(Duration::from_millis(default)),
        Some(value) => match value.parse::<u64>() {
            Ok(ms) if ms > 0 => Ok(Duration::from_millis(ms)),
            _ => Err(ConfigError::InvalidDuration(name)),
        },
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("API_BASE_URL environment variable is required")]
    MissingApiBaseUrl,

    #[error("Invalid {0} value")]
    InvalidDuration(&'static str),
}
