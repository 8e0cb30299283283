//! Application configuration.
//!
//! Settings are read from a TOML file. Every field has a default, so an
//! empty or missing file yields a working configuration; command line
//! flags are applied on top afterwards.
//!
//! ```toml
//! poll_interval_secs = 30
//! debounce_threshold = 4
//! startup_policy = "announce"
//!
//! [[channels]]
//! type = "Desktop"
//! icon = "twitch"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use stream_status_parser::extractor::platforms::twitch::TwitchApi;
use tracing::debug;
use url::Url;

use crate::monitor::{
    DEFAULT_DEBOUNCE_THRESHOLD, NotFoundPolicy, StartupPolicy, StreamMonitorConfig,
};
use crate::notification::launcher::{DEFAULT_PLAYER_COMMAND, default_browser_command};
use crate::notification::{ActionKind, ChannelConfig};
use crate::{Error, Result};

/// Directory name under the platform config directory.
const CONFIG_DIR_NAME: &str = "twitch-notify";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Seconds between two polls of every stream.
    pub poll_interval_secs: u64,
    /// Consecutive disagreeing polls required to confirm a transition.
    pub debounce_threshold: u32,
    /// Timeout for a single HTTP request, in seconds.
    pub request_timeout_secs: u64,
    pub max_concurrent_requests: usize,
    /// Base URL of the status API.
    pub api_base_url: String,
    pub startup_policy: StartupPolicy,
    pub not_found_policy: NotFoundPolicy,
    /// Command used by the "open in browser" action.
    pub browser_command: String,
    /// Command used by the "watch in player" action.
    pub player_command: String,
    /// Actions attached to online notifications.
    pub actions: Vec<ActionKind>,
    /// Directory for daily log files. Console only when unset.
    pub log_dir: Option<PathBuf>,
    /// Filter directive overriding the default log filter.
    pub log_filter: Option<String>,
    pub channels: Vec<ChannelConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 30,
            debounce_threshold: DEFAULT_DEBOUNCE_THRESHOLD,
            request_timeout_secs: 10,
            max_concurrent_requests: 8,
            api_base_url: TwitchApi::DEFAULT_API_BASE.to_string(),
            startup_policy: StartupPolicy::default(),
            not_found_policy: NotFoundPolicy::default(),
            browser_command: default_browser_command().to_string(),
            player_command: DEFAULT_PLAYER_COMMAND.to_string(),
            actions: Vec::new(),
            log_dir: None,
            log_filter: None,
            channels: ChannelConfig::defaults(),
        }
    }
}

impl AppConfig {
    /// Default location of the configuration file, if the platform has a
    /// config directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Log directory used when running detached without `log_dir`.
    pub fn default_log_dir() -> Option<PathBuf> {
        dirs::data_local_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join("logs"))
    }

    /// Load the configuration.
    ///
    /// An explicit `path` must exist. Without one, the default location is
    /// used when the file is present and defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Some(path) if path.is_file() => path,
                _ => {
                    debug!("No configuration file, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        let content = std::fs::read_to_string(&path).map_err(|e| {
            Error::config(format!("failed to read {}: {}", path.display(), e))
        })?;
        let config = Self::from_toml(&content)
            .map_err(|e| Error::config(format!("{}: {}", path.display(), e)))?;

        debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::config(e.to_string()))
    }

    /// Reject settings the monitor cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_secs == 0 {
            return Err(Error::config("poll_interval_secs must be greater than zero"));
        }
        if self.debounce_threshold == 0 {
            return Err(Error::config("debounce_threshold must be at least 1"));
        }
        if self.request_timeout_secs == 0 {
            return Err(Error::config("request_timeout_secs must be greater than zero"));
        }
        if self.max_concurrent_requests == 0 {
            return Err(Error::config("max_concurrent_requests must be at least 1"));
        }

        let url = Url::parse(&self.api_base_url)
            .map_err(|e| Error::config(format!("invalid api_base_url: {}", e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::config(format!(
                "api_base_url must be http or https, got '{}'",
                url.scheme()
            )));
        }

        if self.browser_command.trim().is_empty() || self.player_command.trim().is_empty() {
            return Err(Error::config("action commands must not be empty"));
        }

        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn monitor_config(&self) -> StreamMonitorConfig {
        StreamMonitorConfig {
            poll_interval: self.poll_interval(),
            debounce_threshold: self.debounce_threshold,
            max_concurrent_requests: self.max_concurrent_requests,
            startup_policy: self.startup_policy,
            not_found_policy: self.not_found_policy,
        }
    }
}
