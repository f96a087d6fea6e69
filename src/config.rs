use crate::error::BatchResult;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default server address (the Flask development server)
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2000;
pub const BOUNDED_POLL_INTERVAL_MS: u64 = 1000;
pub const BOUNDED_POLL_TIMEOUT_SECS: u64 = 300;

/// Complete client configuration (loaded from a TOML file)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub poller: PollerConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_url")]
    pub url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_server_url() -> String {
    DEFAULT_SERVER_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: default_server_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Poll timer policy. The default polls every 2 s with no time limit;
/// [`PollerConfig::bounded`] polls every second and gives up after 5 minutes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollerConfig {
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_POLL_INTERVAL_MS,
            timeout_secs: None,
        }
    }
}

impl PollerConfig {
    pub fn bounded() -> Self {
        Self {
            interval_ms: BOUNDED_POLL_INTERVAL_MS,
            timeout_secs: Some(BOUNDED_POLL_TIMEOUT_SECS),
        }
    }

    pub fn interval(&self) -> Duration {
        // a zero interval would spin
        Duration::from_millis(self.interval_ms.max(1))
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl Config {
    pub fn load(path: &Path) -> BatchResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> BatchResult<Self> {
        Ok(toml::from_str(content)?)
    }
}
