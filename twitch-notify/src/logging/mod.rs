//! Logging setup.
//!
//! This module provides:
//! - Console output on stderr with local timezone timestamps
//! - Optional daily rolling log files
//! - Log file retention cleanup (deletes logs older than 7 days)

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{Local, NaiveDate, Utc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::Writer, time::FormatTime},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::{Error, Result};

/// Default log filter directive.
pub const DEFAULT_LOG_FILTER: &str = "twitch_notify=info,stream_status_parser=info";

/// Log retention period in days.
pub const LOG_RETENTION_DAYS: i64 = 7;

/// Prefix of the daily log files; the appender adds `.YYYY-MM-DD`.
const LOG_FILE_PREFIX: &str = "twitch-notify.log";

/// Custom timer that uses the local timezone via chrono.
#[derive(Debug, Clone, Copy)]
struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        let now = Local::now();
        write!(w, "{}", now.format("%Y-%m-%dT%H:%M:%S%.3f%:z"))
    }
}

/// Options for [`init_logging`].
#[derive(Debug, Clone, Default)]
pub struct LoggingOptions {
    /// Log at debug level.
    pub verbose: bool,
    /// Log errors only. Wins over `verbose`.
    pub quiet: bool,
    /// Filter directive from the configuration file.
    pub filter: Option<String>,
    /// Directory for daily log files.
    pub log_dir: Option<PathBuf>,
    /// Whether to write to stderr. Off when running detached.
    pub console: bool,
}

/// Resolve the filter: `-q`/`-v` first, then `RUST_LOG`, then the
/// configured directive, then [`DEFAULT_LOG_FILTER`].
pub fn build_filter(options: &LoggingOptions) -> EnvFilter {
    if options.quiet {
        EnvFilter::new("error")
    } else if options.verbose {
        EnvFilter::new("twitch_notify=debug,stream_status_parser=debug,process_utils=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(options.filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER))
        })
    }
}

/// Initialize the global subscriber.
///
/// Returns the file writer guard when a log directory is configured; keep
/// it alive for the lifetime of the application.
pub fn init_logging(options: &LoggingOptions) -> Result<Option<WorkerGuard>> {
    let console = options.console.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_timer(LocalTimer)
            .boxed()
    });

    let (file, guard) = match &options.log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir).map_err(|e| {
                Error::config(format!("failed to create log directory {}: {}", dir.display(), e))
            })?;
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_timer(LocalTimer)
                .boxed();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(build_filter(options))
        .with(console)
        .with(file)
        .try_init()
        .map_err(|e| Error::Other(format!("Failed to set global default subscriber: {}", e)))?;

    Ok(guard)
}

/// Date of a rotated log file, parsed from `twitch-notify.log.YYYY-MM-DD`.
fn log_file_date(file_name: &str) -> Option<NaiveDate> {
    let date = file_name.strip_prefix(LOG_FILE_PREFIX)?.strip_prefix('.')?;
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

/// Delete log files older than `retention_days`. Returns how many were
/// removed.
pub async fn cleanup_old_logs(log_dir: &Path, retention_days: i64) -> std::io::Result<usize> {
    let cutoff = (Utc::now() - chrono::Duration::days(retention_days)).date_naive();

    let mut entries = tokio::fs::read_dir(log_dir).await?;
    let mut deleted_count = 0;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let Some(file_date) = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(log_file_date)
        else {
            continue;
        };

        if file_date < cutoff {
            if let Err(e) = tokio::fs::remove_file(&path).await {
                warn!(path = %path.display(), error = %e, "Failed to delete old log file");
            } else {
                deleted_count += 1;
                debug!(path = %path.display(), "Deleted old log file");
            }
        }
    }

    if deleted_count > 0 {
        info!(count = deleted_count, "Cleaned up old log files");
    }

    Ok(deleted_count)
}

/// Start the log retention cleanup task.
///
/// Runs once immediately, then daily until `cancel_token` fires.
pub fn start_retention_cleanup(log_dir: PathBuf, cancel_token: CancellationToken) {
    tokio::spawn(async move {
        let cleanup_interval = Duration::from_secs(24 * 60 * 60);

        loop {
            if let Err(e) = cleanup_old_logs(&log_dir, LOG_RETENTION_DAYS).await {
                warn!(error = %e, "Failed to cleanup old logs");
            }

            tokio::select! {
                _ = cancel_token.cancelled() => {
                    debug!("Log retention cleanup task shutting down");
                    break;
                }
                _ = tokio::time::sleep(cleanup_interval) => {}
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter() {
        assert!(DEFAULT_LOG_FILTER.contains("twitch_notify=info"));
        let filter = build_filter(&LoggingOptions {
            quiet: true,
            verbose: true,
            ..Default::default()
        });
        assert_eq!(filter.to_string(), "error");
    }

    #[test]
    fn test_log_file_date() {
        assert_eq!(
            log_file_date("twitch-notify.log.2024-03-01"),
            NaiveDate::from_ymd_opt(2024, 3, 1)
        );
        assert_eq!(log_file_date("twitch-notify.log"), None);
        assert_eq!(log_file_date("twitch-notify.log.yesterday"), None);
        assert_eq!(log_file_date("other.log.2024-03-01"), None);
    }

    #[tokio::test]
    async fn test_cleanup_old_logs() {
        let dir = tempfile::tempdir().unwrap();
        let today = Utc::now().date_naive();
        let old = today - chrono::Duration::days(30);

        let recent_name = format!("twitch-notify.log.{}", today.format("%Y-%m-%d"));
        let old_name = format!("twitch-notify.log.{}", old.format("%Y-%m-%d"));
        for name in [recent_name.as_str(), old_name.as_str(), "notes.txt"] {
            std::fs::write(dir.path().join(name), "x").unwrap();
        }

        let deleted = cleanup_old_logs(dir.path(), LOG_RETENTION_DAYS).await.unwrap();
        assert_eq!(deleted, 1);
        assert!(dir.path().join(&recent_name).exists());
        assert!(!dir.path().join(&old_name).exists());
        assert!(dir.path().join("notes.txt").exists());
    }
}
