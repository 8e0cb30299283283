//! Log notification channel.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::NotificationChannel;
use crate::Result;
use crate::notification::events::Notification;

/// Log channel configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Whether the channel is enabled.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Writes notifications to the application log.
///
/// Keeps a record of alerts when running detached with a log file and
/// no desktop session to show them.
pub struct LogChannel {
    config: LogConfig,
}

impl LogChannel {
    pub fn new(config: LogConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl NotificationChannel for LogChannel {
    fn channel_type(&self) -> &'static str {
        "log"
    }

    fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    async fn send(&self, notification: &Notification) -> Result<()> {
        if !self.is_enabled() {
            return Ok(());
        }

        info!(
            title = %notification.title,
            stream = notification.stream.as_deref().unwrap_or("-"),
            actions = notification.actions.len(),
            "{}",
            notification.message.replace('\n', " ")
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_log_channel_sends() {
        let channel = LogChannel::new(LogConfig::default());
        assert!(channel.is_enabled());
        let n = Notification::stream_online("bob", "Tetris", &[]);
        assert!(channel.send(&n).await.is_ok());
    }

    #[test]
    fn test_log_channel_disabled() {
        let channel = LogChannel::new(LogConfig { enabled: false });
        assert!(!channel.is_enabled());
    }
}
