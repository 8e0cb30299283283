//! Notification channels.
//!
//! This module provides different channels for delivering notifications:
//! - Desktop notifications through `notify-send`
//! - Log output through `tracing`

mod desktop;
mod log;

pub use desktop::{DesktopChannel, DesktopConfig, select_action};
pub use log::{LogChannel, LogConfig};

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::events::Notification;
use super::launcher::ActionLauncher;
use crate::Result;

/// Trait for notification channels.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Get the channel type name.
    fn channel_type(&self) -> &'static str;

    /// Check if the channel is enabled.
    fn is_enabled(&self) -> bool;

    /// Show a notification through this channel.
    ///
    /// Must not wait for the user to dismiss the notification.
    async fn send(&self, notification: &Notification) -> Result<()>;
}

/// Channel configuration wrapper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ChannelConfig {
    /// Desktop notification channel.
    Desktop(DesktopConfig),
    /// Log channel.
    Log(LogConfig),
}

impl ChannelConfig {
    /// Get the channel type name.
    pub fn channel_type(&self) -> &'static str {
        match self {
            Self::Desktop(_) => "desktop",
            Self::Log(_) => "log",
        }
    }

    /// Check if the channel is enabled.
    pub fn is_enabled(&self) -> bool {
        match self {
            Self::Desktop(c) => c.enabled,
            Self::Log(c) => c.enabled,
        }
    }

    /// Instantiate the channel. Desktop actions are executed by `launcher`.
    pub fn build(&self, launcher: Arc<ActionLauncher>) -> Arc<dyn NotificationChannel> {
        match self {
            Self::Desktop(c) => Arc::new(DesktopChannel::with_launcher(c.clone(), launcher)),
            Self::Log(c) => Arc::new(LogChannel::new(c.clone())),
        }
    }

    /// Channels used when the configuration file names none.
    pub fn defaults() -> Vec<ChannelConfig> {
        vec![
            ChannelConfig::Desktop(DesktopConfig::default()),
            ChannelConfig::Log(LogConfig::default()),
        ]
    }
}
