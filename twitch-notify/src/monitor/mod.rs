//! Stream Monitor module for detecting live status.
//!
//! The Stream Monitor is responsible for:
//! - Polling each tracked stream's status endpoint
//! - Debouncing raw poll verdicts into confirmed transitions
//! - Dispatching a notification on every confirmed offline to online edge
//! - Emitting events for console output and logging

mod detector;
mod events;
mod hysteresis;
mod service;

pub use detector::StreamDetector;
pub use events::{MonitorEvent, MonitorEventBroadcaster};
pub use hysteresis::{DEFAULT_DEBOUNCE_THRESHOLD, Hysteresis, Transition};
pub use service::{
    NotFoundPolicy, StartupPolicy, StartupReport, StreamMonitor, StreamMonitorConfig, TickSummary,
};
