//! Debounce engine.
//!
//! A confirmed status only changes after `threshold` consecutive polls
//! disagree with it. Any poll that agrees with the confirmed status resets
//! the counter, so oscillating verdicts never accumulate toward a
//! transition. Only a count is kept per stream, not a history.
//!
//! ```text
//!            N consecutive Online
//!  Offline ───────────────────────► Online   (emits WentOnline)
//!     ▲                                │
//!     └────────────────────────────────┘
//!            N consecutive Offline           (WentOffline, silent)
//! ```

use stream_status_parser::Classification;
use tracing::trace;

use crate::streamer::{StreamEntity, StreamStatus};
use crate::{Error, Result};

/// Consecutive disagreeing polls needed to confirm a transition.
pub const DEFAULT_DEBOUNCE_THRESHOLD: u32 = 4;

/// Outcome of applying one poll to a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The poll agreed with the confirmed status.
    Steady,
    /// The poll disagreed; `count` consecutive disagreements so far.
    Pending { count: u32 },
    /// Offline to online confirmed. This is the only notifying edge.
    WentOnline,
    /// Online to offline confirmed.
    WentOffline,
}

impl Transition {
    pub fn is_rising_edge(&self) -> bool {
        matches!(self, Transition::WentOnline)
    }
}

/// Hysteresis policy applied to each stream on every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hysteresis {
    threshold: u32,
}

impl Default for Hysteresis {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_DEBOUNCE_THRESHOLD,
        }
    }
}

impl Hysteresis {
    pub fn new(threshold: u32) -> Result<Self> {
        if threshold == 0 {
            return Err(Error::validation("debounce threshold must be at least 1"));
        }
        Ok(Self { threshold })
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Apply a fresh poll verdict to a stream.
    ///
    /// `NotFound` leaves the stream untouched and returns
    /// [`Error::StreamNotFound`].
    pub fn apply(
        &self,
        stream: &mut StreamEntity,
        classification: Classification,
    ) -> Result<Transition> {
        if classification.is_fatal() {
            return Err(Error::StreamNotFound(stream.identifier.clone()));
        }
        let observed = if classification.is_online() {
            StreamStatus::Online
        } else {
            StreamStatus::Offline
        };

        stream.pending_status = observed;

        if observed == stream.confirmed_status {
            stream.debounce_count = 0;
            return Ok(Transition::Steady);
        }

        stream.debounce_count = (stream.debounce_count + 1).min(self.threshold);
        trace!(
            stream = %stream.identifier,
            %observed,
            count = stream.debounce_count,
            threshold = self.threshold,
            "debouncing"
        );

        if stream.debounce_count < self.threshold {
            return Ok(Transition::Pending {
                count: stream.debounce_count,
            });
        }

        stream.confirmed_status = observed;
        stream.debounce_count = 0;
        stream.last_transition = Some(chrono::Utc::now());

        Ok(match observed {
            StreamStatus::Online => Transition::WentOnline,
            StreamStatus::Offline => Transition::WentOffline,
        })
    }

    /// Set the confirmed status directly, bypassing debounce.
    ///
    /// Used once at startup so streams that are already live are not
    /// reported as new transitions.
    pub fn seed(&self, stream: &mut StreamEntity, status: StreamStatus) {
        stream.confirmed_status = status;
        stream.pending_status = status;
        stream.debounce_count = 0;
    }
}
