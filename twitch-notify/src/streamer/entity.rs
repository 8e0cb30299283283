//! Per-stream state record.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stream_status_parser::Classification;

/// Confirmed or observed status of a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StreamStatus {
    #[default]
    Offline,
    Online,
}

impl StreamStatus {
    pub fn is_online(&self) -> bool {
        matches!(self, StreamStatus::Online)
    }

    /// Map a poll verdict onto a status. `NotFound` has no status.
    pub fn from_classification(classification: Classification) -> Option<Self> {
        match classification {
            Classification::Online => Some(StreamStatus::Online),
            Classification::Offline => Some(StreamStatus::Offline),
            Classification::NotFound => None,
        }
    }
}

impl From<StreamStatus> for Classification {
    fn from(status: StreamStatus) -> Self {
        match status {
            StreamStatus::Online => Classification::Online,
            StreamStatus::Offline => Classification::Offline,
        }
    }
}

impl fmt::Display for StreamStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamStatus::Online => write!(f, "online"),
            StreamStatus::Offline => write!(f, "offline"),
        }
    }
}

/// State of one tracked stream.
///
/// Created once at startup and kept for the whole run. Only the debounce
/// engine and the notification dispatcher mutate it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamEntity {
    pub(crate) identifier: String,
    /// Last status the monitor acted on.
    pub(crate) confirmed_status: StreamStatus,
    /// Status seen on the most recent poll.
    pub(crate) pending_status: StreamStatus,
    /// Consecutive polls that disagreed with `confirmed_status`.
    pub(crate) debounce_count: u32,
    /// Last extracted activity (current game), empty when unknown.
    pub(crate) last_metadata: String,
    pub(crate) notifications_sent: u64,
    pub(crate) last_transition: Option<DateTime<Utc>>,
}

impl StreamEntity {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            confirmed_status: StreamStatus::Offline,
            pending_status: StreamStatus::Offline,
            debounce_count: 0,
            last_metadata: String::new(),
            notifications_sent: 0,
            last_transition: None,
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn confirmed_status(&self) -> StreamStatus {
        self.confirmed_status
    }

    pub fn pending_status(&self) -> StreamStatus {
        self.pending_status
    }

    pub fn debounce_count(&self) -> u32 {
        self.debounce_count
    }

    pub fn last_metadata(&self) -> &str {
        &self.last_metadata
    }

    /// Number of online notifications dispatched for this stream.
    pub fn notifications_sent(&self) -> u64 {
        self.notifications_sent
    }

    /// When the confirmed status last changed, if it ever did.
    pub fn last_transition(&self) -> Option<DateTime<Utc>> {
        self.last_transition
    }

    pub fn is_online(&self) -> bool {
        self.confirmed_status.is_online()
    }

    pub(crate) fn set_metadata(&mut self, value: impl Into<String>) {
        self.last_metadata = value.into();
    }

    pub(crate) fn record_notification(&mut self) {
        self.notifications_sent += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_entity_is_offline() {
        let entity = StreamEntity::new("bob");
        assert_eq!(entity.identifier(), "bob");
        assert_eq!(entity.confirmed_status(), StreamStatus::Offline);
        assert_eq!(entity.pending_status(), StreamStatus::Offline);
        assert_eq!(entity.debounce_count(), 0);
        assert!(entity.last_metadata().is_empty());
        assert_eq!(entity.notifications_sent(), 0);
        assert!(entity.last_transition().is_none());
        assert!(!entity.is_online());
    }

    #[test]
    fn test_status_classification_mapping() {
        assert_eq!(
            StreamStatus::from_classification(Classification::Online),
            Some(StreamStatus::Online)
        );
        assert_eq!(
            StreamStatus::from_classification(Classification::Offline),
            Some(StreamStatus::Offline)
        );
        assert_eq!(StreamStatus::from_classification(Classification::NotFound), None);
        assert_eq!(
            Classification::from(StreamStatus::Online),
            Classification::Online
        );
    }

    #[test]
    fn test_status_display() {
        assert_eq!(StreamStatus::Online.to_string(), "online");
        assert_eq!(StreamStatus::Offline.to_string(), "offline");
    }
}
