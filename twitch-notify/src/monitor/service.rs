//! Stream Monitor service.
//!
//! Drives the poll loop: every interval each tracked stream is polled,
//! verdicts are fed through the debounce state machine and confirmed
//! offline to online edges are handed to the notification service.
//!
//! Status requests within a tick run concurrently, but verdicts are applied
//! in registration order and a tick finishes before the next one starts.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use stream_status_parser::Classification;
use tokio::sync::broadcast;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::detector::StreamDetector;
use super::events::{MonitorEvent, MonitorEventBroadcaster};
use super::hysteresis::{DEFAULT_DEBOUNCE_THRESHOLD, Hysteresis, Transition};
use crate::notification::NotificationService;
use crate::streamer::{StreamRegistry, StreamStatus};
use crate::{Error, Result};

/// What to do with streams that are already live at startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartupPolicy {
    /// Record the status and report it on the console only.
    #[default]
    Silent,
    /// Also send one notification per live stream.
    Announce,
}

/// What to do when the API reports a stream as not found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotFoundPolicy {
    /// Stop monitoring altogether.
    #[default]
    Exit,
    /// Stop tracking the stream and keep monitoring the others.
    Drop,
}

/// Configuration for the Stream Monitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamMonitorConfig {
    /// Time between the start of two ticks.
    pub poll_interval: Duration,
    /// Consecutive disagreeing polls required to confirm a transition.
    pub debounce_threshold: u32,
    /// Status requests allowed in flight at once.
    pub max_concurrent_requests: usize,
    pub startup_policy: StartupPolicy,
    pub not_found_policy: NotFoundPolicy,
}

impl Default for StreamMonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(30),
            debounce_threshold: DEFAULT_DEBOUNCE_THRESHOLD,
            max_concurrent_requests: 8,
            startup_policy: StartupPolicy::default(),
            not_found_policy: NotFoundPolicy::default(),
        }
    }
}

/// Status of one stream after the initial poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupReport {
    pub identifier: String,
    pub status: StreamStatus,
    /// Current game, empty when offline or unknown.
    pub game: String,
    /// Whether a notification was sent for this stream.
    pub announced: bool,
}

/// Outcome of a single tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickSummary {
    /// Streams whose poll produced a verdict.
    pub polled: usize,
    /// Streams whose poll failed at the transport level.
    pub failed: usize,
    pub went_online: usize,
    pub went_offline: usize,
    /// Streams removed because the API no longer knows them.
    pub dropped: usize,
    pub notifications: usize,
}

/// The Stream Monitor service.
pub struct StreamMonitor {
    config: StreamMonitorConfig,
    detector: Arc<StreamDetector>,
    hysteresis: Hysteresis,
    notifier: Arc<NotificationService>,
    streams: StreamRegistry,
    events: MonitorEventBroadcaster,
}

impl StreamMonitor {
    pub fn new(
        config: StreamMonitorConfig,
        detector: Arc<StreamDetector>,
        notifier: Arc<NotificationService>,
        streams: StreamRegistry,
    ) -> Result<Self> {
        if config.poll_interval.is_zero() {
            return Err(Error::validation("poll interval must be greater than zero"));
        }
        if config.max_concurrent_requests == 0 {
            return Err(Error::validation(
                "max concurrent requests must be at least 1",
            ));
        }
        let hysteresis = Hysteresis::new(config.debounce_threshold)?;

        Ok(Self {
            config,
            detector,
            hysteresis,
            notifier,
            streams,
            events: MonitorEventBroadcaster::new(),
        })
    }

    pub fn config(&self) -> &StreamMonitorConfig {
        &self.config
    }

    pub fn streams(&self) -> &StreamRegistry {
        &self.streams
    }

    pub fn notifier(&self) -> &Arc<NotificationService> {
        &self.notifier
    }

    /// Subscribe to monitor events.
    pub fn subscribe_events(&self) -> broadcast::Receiver<MonitorEvent> {
        self.events.subscribe()
    }

    /// Establish the initial confirmed status of every stream.
    ///
    /// Streams found live are recorded as online without a debounce. A
    /// stream the API does not know is handled per the not-found policy.
    pub async fn seed(&mut self) -> Result<Vec<StartupReport>> {
        let detector = &self.detector;
        let verdicts: Vec<Classification> = stream::iter(self.streams.iter())
            .map(|s| detector.check_status(s))
            .buffered(self.config.max_concurrent_requests)
            .collect()
            .await;

        let mut reports = Vec::with_capacity(verdicts.len());
        let mut dropped = Vec::new();

        for (entity, verdict) in self.streams.iter_mut().zip(verdicts) {
            let Some(status) = StreamStatus::from_classification(verdict) else {
                let err = Error::StreamNotFound(entity.identifier().to_string());
                self.events.publish(MonitorEvent::FatalError {
                    streamer: entity.identifier().to_string(),
                    message: err.to_string(),
                    timestamp: Utc::now(),
                });
                match self.config.not_found_policy {
                    NotFoundPolicy::Exit => return Err(err),
                    NotFoundPolicy::Drop => {
                        warn!(stream = entity.identifier(), "Stream not found, dropping");
                        dropped.push(entity.identifier().to_string());
                        continue;
                    }
                }
            };

            self.hysteresis.seed(entity, status);

            let mut announced = false;
            if status.is_online() {
                match self.config.startup_policy {
                    StartupPolicy::Silent => {
                        let game = self.detector.current_game(entity.identifier()).await;
                        entity.set_metadata(game);
                    }
                    StartupPolicy::Announce => {
                        self.notifier.dispatch_online(entity, &self.detector).await;
                        announced = true;
                    }
                }
                self.events.publish(MonitorEvent::StreamerLive {
                    streamer: entity.identifier().to_string(),
                    game: entity.last_metadata().to_string(),
                    timestamp: Utc::now(),
                });
            }

            info!(stream = entity.identifier(), %status, "Initial status");
            reports.push(StartupReport {
                identifier: entity.identifier().to_string(),
                status,
                game: entity.last_metadata().to_string(),
                announced,
            });
        }

        for id in &dropped {
            self.streams.remove(id);
        }
        self.ensure_streams_left()?;

        Ok(reports)
    }

    /// Poll every stream once and apply the verdicts.
    ///
    /// A stream whose poll failed is skipped for this tick and keeps its
    /// debounce counter.
    pub async fn tick(&mut self) -> Result<TickSummary> {
        let detector = &self.detector;
        let results: Vec<Result<Classification>> = stream::iter(self.streams.iter())
            .map(|s| detector.try_check_status(s))
            .buffered(self.config.max_concurrent_requests)
            .collect()
            .await;

        let mut summary = TickSummary::default();
        let mut dropped = Vec::new();

        for (entity, result) in self.streams.iter_mut().zip(results) {
            let verdict = match result {
                Ok(verdict) => verdict,
                Err(e) => {
                    warn!(stream = entity.identifier(), error = %e, "Status poll failed, skipping");
                    summary.failed += 1;
                    continue;
                }
            };
            summary.polled += 1;

            let transition = match self.hysteresis.apply(entity, verdict) {
                Ok(transition) => transition,
                Err(e) if e.is_stream_not_found() => {
                    self.events.publish(MonitorEvent::FatalError {
                        streamer: entity.identifier().to_string(),
                        message: e.to_string(),
                        timestamp: Utc::now(),
                    });
                    match self.config.not_found_policy {
                        NotFoundPolicy::Exit => {
                            error!(stream = entity.identifier(), "Stream not found");
                            return Err(e);
                        }
                        NotFoundPolicy::Drop => {
                            warn!(stream = entity.identifier(), "Stream not found, dropping");
                            dropped.push(entity.identifier().to_string());
                            continue;
                        }
                    }
                }
                Err(e) => return Err(e),
            };

            match transition {
                Transition::Steady => {}
                Transition::Pending { count } => {
                    self.events.publish(MonitorEvent::DebouncePending {
                        streamer: entity.identifier().to_string(),
                        observed: entity.pending_status(),
                        count,
                        threshold: self.hysteresis.threshold(),
                        timestamp: Utc::now(),
                    });
                }
                Transition::WentOnline => {
                    summary.went_online += 1;
                    self.notifier.dispatch_online(entity, &self.detector).await;
                    summary.notifications += 1;
                    self.events.publish(MonitorEvent::StreamerLive {
                        streamer: entity.identifier().to_string(),
                        game: entity.last_metadata().to_string(),
                        timestamp: Utc::now(),
                    });
                }
                Transition::WentOffline => {
                    summary.went_offline += 1;
                    info!(stream = entity.identifier(), "Stream went offline");
                    self.events.publish(MonitorEvent::StreamerOffline {
                        streamer: entity.identifier().to_string(),
                        timestamp: Utc::now(),
                    });
                }
            }
        }

        summary.dropped = dropped.len();
        for id in &dropped {
            self.streams.remove(id);
        }

        Ok(summary)
    }

    /// Run the poll loop until `cancel` fires.
    ///
    /// The first tick happens one interval after the call. Returns an error
    /// if a stream is not found under [`NotFoundPolicy::Exit`] or no
    /// streams are left to monitor.
    pub async fn run(&mut self, cancel: CancellationToken) -> Result<()> {
        let mut interval = tokio::time::interval(self.config.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        interval.tick().await;

        info!(
            streams = self.streams.len(),
            interval_secs = self.config.poll_interval.as_secs(),
            threshold = self.hysteresis.threshold(),
            "Stream monitor started"
        );

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = interval.tick() => {}
            }

            let summary = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                result = self.tick() => result?,
            };

            debug!(
                polled = summary.polled,
                failed = summary.failed,
                online = summary.went_online,
                offline = summary.went_offline,
                "Tick complete"
            );

            self.ensure_streams_left()?;
        }

        info!("Stream monitor stopped");
        Ok(())
    }

    fn ensure_streams_left(&self) -> Result<()> {
        if self.streams.is_empty() {
            return Err(Error::validation("no streams left to monitor"));
        }
        Ok(())
    }
}
