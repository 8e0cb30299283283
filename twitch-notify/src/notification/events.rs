//! Notification payloads.
//!
//! A notification is a title, a message and an optional list of actions.
//! Actions are declarative: they name what to do and for which stream, and
//! are executed by [`ActionLauncher`](super::ActionLauncher) only when the
//! user picks one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Title used for every notification.
pub const NOTIFICATION_TITLE: &str = "Twitch Notify";

/// Shown in place of the game when the channel reports none.
pub const UNKNOWN_GAME: &str = "Unknown";

/// What an action button does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Open the channel page in a web browser.
    OpenBrowser,
    /// Open the stream in an external player.
    OpenPlayer,
}

impl ActionKind {
    /// Stable key reported back by the notification daemon.
    pub fn key(&self) -> &'static str {
        match self {
            Self::OpenBrowser => "browser",
            Self::OpenPlayer => "player",
        }
    }

    pub fn default_label(&self) -> &'static str {
        match self {
            Self::OpenBrowser => "Open in browser",
            Self::OpenPlayer => "Watch in player",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "browser" => Some(Self::OpenBrowser),
            "player" => Some(Self::OpenPlayer),
            _ => None,
        }
    }
}

/// A labelled action bound to a stream identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationAction {
    pub kind: ActionKind,
    pub label: String,
    pub stream: String,
}

impl NotificationAction {
    pub fn new(kind: ActionKind, stream: impl Into<String>) -> Self {
        Self {
            kind,
            label: kind.default_label().to_string(),
            stream: stream.into(),
        }
    }

    pub fn key(&self) -> &'static str {
        self.kind.key()
    }
}

/// A notification ready to be shown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub actions: Vec<NotificationAction>,
    /// Stream the notification is about, if any.
    pub stream: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl Notification {
    /// Alert for a stream that just went live.
    pub fn stream_online(stream: &str, game: &str, actions: &[ActionKind]) -> Self {
        Self {
            title: NOTIFICATION_TITLE.to_string(),
            message: online_message(stream, game),
            actions: actions
                .iter()
                .map(|kind| NotificationAction::new(*kind, stream))
                .collect(),
            stream: Some(stream.to_string()),
            timestamp: Utc::now(),
        }
    }
}

/// Body of the online alert.
pub fn online_message(stream: &str, game: &str) -> String {
    let game = if game.trim().is_empty() {
        UNKNOWN_GAME
    } else {
        game
    };
    format!("{} is online.\nPlaying: {}", stream, game)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_online_message() {
        assert_eq!(
            online_message("bob", "Some:Title"),
            "bob is online.\nPlaying: Some:Title"
        );
        assert_eq!(online_message("bob", ""), "bob is online.\nPlaying: Unknown");
    }

    #[test]
    fn test_stream_online_actions() {
        let n = Notification::stream_online(
            "bob",
            "Tetris",
            &[ActionKind::OpenBrowser, ActionKind::OpenPlayer],
        );
        assert_eq!(n.title, NOTIFICATION_TITLE);
        assert_eq!(n.stream.as_deref(), Some("bob"));
        assert_eq!(n.actions.len(), 2);
        assert!(n.actions.iter().all(|a| a.stream == "bob"));
        assert_eq!(n.actions[1].kind, ActionKind::OpenPlayer);
    }

    #[test]
    fn test_action_key_round_trip() {
        for kind in [ActionKind::OpenBrowser, ActionKind::OpenPlayer] {
            assert_eq!(ActionKind::from_key(kind.key()), Some(kind));
        }
        assert_eq!(ActionKind::from_key("other"), None);
    }

    #[test]
    fn test_notification_serialization() {
        let n = Notification::stream_online("bob", "Tetris", &[ActionKind::OpenBrowser]);
        let json = serde_json::to_value(&n).unwrap();
        assert_eq!(json["title"], NOTIFICATION_TITLE);
        assert_eq!(json["actions"][0]["kind"], "open_browser");
        assert_eq!(json["actions"][0]["stream"], "bob");
    }
}
