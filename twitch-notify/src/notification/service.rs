//! Notification service implementation.
//!
//! The NotificationService is responsible for:
//! - Building the "stream went live" notification
//! - Dispatching it to every enabled channel
//! - Counting deliveries and failures

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::channels::NotificationChannel;
use super::events::{ActionKind, Notification};
use super::launcher::ActionLauncher;
use crate::config::AppConfig;
use crate::monitor::StreamDetector;
use crate::streamer::StreamEntity;

/// Configuration for the notification service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationServiceConfig {
    /// Actions attached to online notifications.
    #[serde(default)]
    pub actions: Vec<ActionKind>,
}

/// Snapshot of delivery counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NotificationStats {
    /// Successful channel deliveries.
    pub sent: u64,
    /// Failed channel deliveries.
    pub failed: u64,
}

/// Fans notifications out to the configured channels.
pub struct NotificationService {
    config: NotificationServiceConfig,
    channels: Vec<Arc<dyn NotificationChannel>>,
    sent: AtomicU64,
    failed: AtomicU64,
}

impl NotificationService {
    /// Create a service with no channels.
    pub fn new(config: NotificationServiceConfig) -> Self {
        Self::with_channels(config, Vec::new())
    }

    pub fn with_channels(
        config: NotificationServiceConfig,
        channels: Vec<Arc<dyn NotificationChannel>>,
    ) -> Self {
        Self {
            config,
            channels,
            sent: AtomicU64::new(0),
            failed: AtomicU64::new(0),
        }
    }

    /// Create a service with the enabled channels from the application config.
    pub fn from_config(
        config: &AppConfig,
        actions: Vec<ActionKind>,
        launcher: Arc<ActionLauncher>,
    ) -> Self {
        let channels: Vec<_> = config
            .channels
            .iter()
            .filter(|c| c.is_enabled())
            .map(|c| c.build(launcher.clone()))
            .collect();

        info!(
            "Notification service using {} channel(s): {}",
            channels.len(),
            channels
                .iter()
                .map(|c| c.channel_type())
                .collect::<Vec<_>>()
                .join(", ")
        );

        Self::with_channels(NotificationServiceConfig { actions }, channels)
    }

    pub fn add_channel(&mut self, channel: Arc<dyn NotificationChannel>) {
        self.channels.push(channel);
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn stats(&self) -> NotificationStats {
        NotificationStats {
            sent: self.sent.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }

    pub fn build_online_notification(&self, stream: &str, game: &str) -> Notification {
        Notification::stream_online(stream, game, &self.config.actions)
    }

    /// Send a notification to every enabled channel.
    ///
    /// Delivery is best effort: a failing channel is logged and skipped.
    /// Returns the number of channels that accepted the notification.
    pub async fn send(&self, notification: &Notification) -> usize {
        let mut delivered = 0;

        for channel in self.channels.iter().filter(|c| c.is_enabled()) {
            match channel.send(notification).await {
                Ok(()) => {
                    delivered += 1;
                    self.sent.fetch_add(1, Ordering::Relaxed);
                    debug!("Notification sent via {}", channel.channel_type());
                }
                Err(e) => {
                    self.failed.fetch_add(1, Ordering::Relaxed);
                    warn!(
                        "Failed to send notification via {}: {}",
                        channel.channel_type(),
                        e
                    );
                }
            }
        }

        delivered
    }

    /// Announce that `stream` went live.
    ///
    /// Looks up the current game, records it on the entity and dispatches
    /// exactly one notification.
    pub async fn dispatch_online(
        &self,
        stream: &mut StreamEntity,
        detector: &StreamDetector,
    ) -> Notification {
        let game = detector.current_game(stream.identifier()).await;
        stream.set_metadata(game);

        let notification =
            self.build_online_notification(stream.identifier(), stream.last_metadata());
        let delivered = self.send(&notification).await;
        stream.record_notification();

        info!(
            stream = stream.identifier(),
            game = stream.last_metadata(),
            channels = delivered,
            "Dispatched online notification"
        );
        notification
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use stream_status_parser::extractor::platforms::twitch::TwitchApi;
    use stream_status_parser::test_utils::ScriptedFetcher;

    use crate::{Error, Result};

    #[derive(Default)]
    struct Recording {
        sent: Mutex<Vec<Notification>>,
        fail: bool,
    }

    #[async_trait]
    impl NotificationChannel for Recording {
        fn channel_type(&self) -> &'static str {
            "recording"
        }

        fn is_enabled(&self) -> bool {
            true
        }

        async fn send(&self, notification: &Notification) -> Result<()> {
            if self.fail {
                return Err(Error::notification("boom"));
            }
            self.sent.lock().push(notification.clone());
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_send_counts_failures() {
        let ok = Arc::new(Recording::default());
        let broken: Arc<dyn NotificationChannel> = Arc::new(Recording {
            fail: true,
            ..Default::default()
        });
        let working: Arc<dyn NotificationChannel> = ok.clone();
        let service = NotificationService::with_channels(
            NotificationServiceConfig::default(),
            vec![broken, working],
        );

        let n = service.build_online_notification("bob", "Tetris");
        assert_eq!(service.send(&n).await, 1);
        assert_eq!(ok.sent.lock().len(), 1);
        assert_eq!(service.stats(), NotificationStats { sent: 1, failed: 1 });
    }

    #[tokio::test]
    async fn test_dispatch_online_records_game() {
        let fetcher = Arc::new(ScriptedFetcher::new());
        fetcher.push_body(
            "https://api.twitch.tv/kraken/channels/bob",
            r#"{"mature":false,"status":"hi","game":"Some:Title","name":"bob"}"#,
        );
        let detector = StreamDetector::new(TwitchApi::with_default_base(fetcher).unwrap());

        let recording = Arc::new(Recording::default());
        let mut service = NotificationService::new(NotificationServiceConfig {
            actions: vec![ActionKind::OpenBrowser],
        });
        service.add_channel(recording.clone());

        let mut stream = StreamEntity::new("bob");
        let n = service.dispatch_online(&mut stream, &detector).await;

        assert_eq!(n.message, "bob is online.\nPlaying: Some:Title");
        assert_eq!(n.actions.len(), 1);
        assert_eq!(stream.last_metadata(), "Some:Title");
        assert_eq!(stream.notifications_sent(), 1);
        assert_eq!(recording.sent.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_dispatch_without_channels_still_counts() {
        let fetcher = Arc::new(ScriptedFetcher::new());
        fetcher.push_error("https://api.twitch.tv/kraken/channels/bob", "timeout");
        let detector = StreamDetector::new(TwitchApi::with_default_base(fetcher).unwrap());
        let service = NotificationService::new(NotificationServiceConfig::default());

        let mut stream = StreamEntity::new("bob");
        let n = service.dispatch_online(&mut stream, &detector).await;
        assert_eq!(n.message, "bob is online.\nPlaying: Unknown");
        assert_eq!(stream.notifications_sent(), 1);
    }
}
