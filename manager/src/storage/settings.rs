//! Settings file management

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::deploy::fanout::FanoutOptions;
use crate::errors::ManagerError;
use crate::filesys::file::File;
use crate::logs::LogLevel;
use crate::utils::CooldownOptions;

/// Manager settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Emit JSON log lines
    #[serde(default)]
    pub log_json: bool,

    /// Also write logs to the storage logs directory
    #[serde(default)]
    pub log_to_file: bool,

    /// Orchestration adapter configuration
    #[serde(default)]
    pub adapter: AdapterSettings,

    /// Retry policy for idempotent adapter calls
    #[serde(default)]
    pub retry: RetrySettings,

    /// Maximum adapter calls in flight per lifecycle operation
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Overrides the default storage base directory
    #[serde(default)]
    pub storage_dir: Option<String>,
}

fn default_max_concurrency() -> usize {
    8
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            log_json: false,
            log_to_file: false,
            adapter: AdapterSettings::default(),
            retry: RetrySettings::default(),
            max_concurrency: default_max_concurrency(),
            storage_dir: None,
        }
    }
}

impl Settings {
    /// Read settings from a JSON file; a missing file yields the defaults
    pub async fn load(file: &File) -> Result<Self, ManagerError> {
        if !file.exists().await {
            return Ok(Self::default());
        }
        file.read_json::<Settings>().await.map_err(|e| {
            ManagerError::ConfigError(format!(
                "Unable to read settings file {}: {}",
                file.path().display(),
                e
            ))
        })
    }

    /// Fan-out behaviour derived from these settings
    pub fn fanout_options(&self) -> FanoutOptions {
        FanoutOptions {
            max_concurrency: self.max_concurrency.max(1),
            max_attempts: self.retry.max_attempts.max(1),
            cooldown: CooldownOptions {
                base_delay: Duration::from_millis(self.retry.base_delay_ms),
                max_delay: Duration::from_millis(self.retry.max_delay_ms),
                multiplier: 2.0,
            },
        }
    }
}

/// Orchestration adapter settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdapterSettings {
    /// Base URL of the adapter API
    #[serde(default = "default_adapter_url")]
    pub base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_adapter_url() -> String {
    "http://localhost:8001/v1".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for AdapterSettings {
    fn default() -> Self {
        Self {
            base_url: default_adapter_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl AdapterSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Retry settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrySettings {
    /// Attempts per call, including the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay before the first retry, in milliseconds
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    /// Upper bound on the delay between retries, in milliseconds
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    500
}

fn default_max_delay_ms() -> u64 {
    10_000
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}
