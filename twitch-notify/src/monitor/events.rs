//! Monitor events.
//!
//! Events emitted by the Stream Monitor for console output and logging.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::streamer::StreamStatus;

/// Events emitted by the Stream Monitor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum MonitorEvent {
    /// Stream went live (confirmed).
    StreamerLive {
        streamer: String,
        game: String,
        timestamp: DateTime<Utc>,
    },
    /// Stream went offline (confirmed).
    StreamerOffline {
        streamer: String,
        timestamp: DateTime<Utc>,
    },
    /// A poll disagreed with the confirmed status.
    DebouncePending {
        streamer: String,
        observed: StreamStatus,
        count: u32,
        threshold: u32,
        timestamp: DateTime<Utc>,
    },
    /// The stream cannot be monitored any more.
    FatalError {
        streamer: String,
        message: String,
        timestamp: DateTime<Utc>,
    },
}

impl MonitorEvent {
    /// Get a human-readable description of the event.
    pub fn description(&self) -> String {
        match self {
            MonitorEvent::StreamerLive { streamer, game, .. } => {
                if game.is_empty() {
                    format!("{} is online", streamer)
                } else {
                    format!("{} is online playing {}", streamer, game)
                }
            }
            MonitorEvent::StreamerOffline { streamer, .. } => {
                format!("{} went offline", streamer)
            }
            MonitorEvent::DebouncePending {
                streamer,
                observed,
                count,
                threshold,
                ..
            } => {
                format!(
                    "{}: seen {} ({}/{})",
                    streamer, observed, count, threshold
                )
            }
            MonitorEvent::FatalError {
                streamer, message, ..
            } => {
                format!("{}: {}", streamer, message)
            }
        }
    }

    pub fn streamer(&self) -> &str {
        match self {
            MonitorEvent::StreamerLive { streamer, .. }
            | MonitorEvent::StreamerOffline { streamer, .. }
            | MonitorEvent::DebouncePending { streamer, .. }
            | MonitorEvent::FatalError { streamer, .. } => streamer,
        }
    }

    /// Whether the event is worth showing on the console.
    pub fn is_user_visible(&self) -> bool {
        !matches!(self, MonitorEvent::DebouncePending { .. })
    }
}

/// Broadcaster for monitor events.
pub struct MonitorEventBroadcaster {
    sender: broadcast::Sender<MonitorEvent>,
}

impl MonitorEventBroadcaster {
    /// Create a new broadcaster with default capacity (256).
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    /// Create a new broadcaster with specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to monitor events.
    pub fn subscribe(&self) -> broadcast::Receiver<MonitorEvent> {
        self.sender.subscribe()
    }

    /// Publish a monitor event.
    ///
    /// Returns the number of subscribers that received it; having none is
    /// not an error.
    pub fn publish(&self, event: MonitorEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    /// Get the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for MonitorEventBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for MonitorEventBroadcaster {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_description() {
        let event = MonitorEvent::StreamerLive {
            streamer: "bob".to_string(),
            game: "Tetris".to_string(),
            timestamp: Utc::now(),
        };
        assert_eq!(event.description(), "bob is online playing Tetris");
        assert_eq!(event.streamer(), "bob");

        let event = MonitorEvent::StreamerLive {
            streamer: "bob".to_string(),
            game: String::new(),
            timestamp: Utc::now(),
        };
        assert_eq!(event.description(), "bob is online");
    }

    #[test]
    fn test_pending_is_not_user_visible() {
        let event = MonitorEvent::DebouncePending {
            streamer: "bob".to_string(),
            observed: StreamStatus::Online,
            count: 2,
            threshold: 4,
            timestamp: Utc::now(),
        };
        assert!(!event.is_user_visible());
        assert_eq!(event.description(), "bob: seen online (2/4)");
    }

    #[test]
    fn test_broadcaster_publish_subscribe() {
        let broadcaster = MonitorEventBroadcaster::new();
        assert_eq!(
            broadcaster.publish(MonitorEvent::StreamerOffline {
                streamer: "bob".to_string(),
                timestamp: Utc::now(),
            }),
            0
        );

        let mut receiver = broadcaster.subscribe();
        assert_eq!(broadcaster.subscriber_count(), 1);

        broadcaster.publish(MonitorEvent::FatalError {
            streamer: "alice".to_string(),
            message: "Invalid stream name".to_string(),
            timestamp: Utc::now(),
        });

        let received = receiver.try_recv().unwrap();
        assert!(matches!(received, MonitorEvent::FatalError { .. }));
    }
}
