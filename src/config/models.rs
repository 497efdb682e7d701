use crate::director::{DirectorConfig, GroupingMode};
use crate::http::HttpConfig;
use crate::humanize::HumanDuration;
use crate::retry::RetryPolicy;
use crate::sanitize::NamingMode;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub download: DownloadConfig,
    #[serde(default)]
    pub naming: NamingConfig,
    #[serde(default)]
    pub http: HttpSettings,
}

/// Where and how posts land on disk
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DownloadConfig {
    #[serde(default = "default_destination")]
    pub destination: PathBuf,
    /// Image fetches in flight per post
    #[serde(default = "default_workers")]
    pub workers: usize,
    #[serde(default)]
    pub grouping: GroupingMode,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            destination: default_destination(),
            workers: default_workers(),
            grouping: GroupingMode::default(),
        }
    }
}

fn default_destination() -> PathBuf {
    PathBuf::from(".")
}

fn default_workers() -> usize {
    6
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NamingConfig {
    /// Strip characters Windows rejects from titles and folder names
    #[serde(default = "default_windows_safe")]
    pub windows_safe: bool,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            windows_safe: default_windows_safe(),
        }
    }
}

impl NamingConfig {
    pub fn mode(&self) -> NamingMode {
        NamingMode::from_windows_safe(self.windows_safe)
    }
}

fn default_windows_safe() -> bool {
    true
}

/// HTTP timeouts and retry behaviour
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpSettings {
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: HumanDuration,
    #[serde(default = "default_request_timeout")]
    pub request_timeout: HumanDuration,
    /// Attempts per request, including the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_retry_backoff")]
    pub retry_backoff: HumanDuration,
    #[serde(default = "default_exponential_backoff")]
    pub exponential_backoff: bool,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            connect_timeout: default_connect_timeout(),
            request_timeout: default_request_timeout(),
            max_attempts: default_max_attempts(),
            retry_backoff: default_retry_backoff(),
            exponential_backoff: default_exponential_backoff(),
            user_agent: default_user_agent(),
        }
    }
}

impl HttpSettings {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            backoff: self.retry_backoff.as_duration(),
            exponential: self.exponential_backoff,
        }
    }

    pub fn http_config(&self) -> HttpConfig {
        HttpConfig {
            connect_timeout: self.connect_timeout.as_duration(),
            request_timeout: self.request_timeout.as_duration(),
            user_agent: self.user_agent.clone(),
            retry: self.retry_policy(),
        }
    }
}

fn default_connect_timeout() -> HumanDuration {
    HumanDuration::from_secs(10)
}

fn default_request_timeout() -> HumanDuration {
    HumanDuration::from_secs(30)
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_backoff() -> HumanDuration {
    HumanDuration::from_secs(1)
}

fn default_exponential_backoff() -> bool {
    true
}

fn default_user_agent() -> String {
    HttpConfig::default().user_agent
}

impl Config {
    pub fn director_config(&self) -> DirectorConfig {
        DirectorConfig {
            workers: self.download.workers,
            retry: self.http.retry_policy(),
            naming: self.naming.mode(),
        }
    }
}
