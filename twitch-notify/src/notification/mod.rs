//! Notification system module.
//!
//! Delivers "stream went live" alerts through one or more channels.
//!
//! # Features
//!
//! - Desktop notifications that persist until dismissed
//! - Optional action buttons bound declaratively to a stream
//! - Action execution through a separate [`ActionLauncher`] capability
//! - A tracing-backed channel for headless runs
//!
//! # Example
//!
//! ```ignore
//! use twitch_notify::notification::{NotificationService, NotificationServiceConfig};
//! use twitch_notify::notification::channels::{DesktopChannel, DesktopConfig};
//!
//! let mut service = NotificationService::new(NotificationServiceConfig::default());
//! service.add_channel(Arc::new(DesktopChannel::new(DesktopConfig::default())));
//! ```

pub mod channels;
pub mod events;
pub mod launcher;
pub mod service;

pub use channels::{ChannelConfig, DesktopConfig, LogConfig, NotificationChannel};
pub use events::{ActionKind, Notification, NotificationAction};
pub use launcher::ActionLauncher;
pub use service::{NotificationService, NotificationServiceConfig, NotificationStats};
