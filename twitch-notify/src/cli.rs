//! Command line arguments.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use clap::Parser;

use crate::config::AppConfig;
use crate::monitor::StartupPolicy;
use crate::notification::ActionKind;
use crate::streamer::validate_stream_name;

#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(
    name = "twitch-notify",
    author,
    version,
    about = "Desktop notifications when Twitch streams go live",
    long_about = None
)]
pub struct Args {
    /// Streams to watch
    #[arg(required = true, value_name = "STREAMS", value_parser = parse_stream_name)]
    pub streams: Vec<String>,

    /// Stay in the foreground instead of detaching
    #[arg(short = 'n', long)]
    pub no_daemon: bool,

    /// Add an "open in browser" action to notifications
    #[arg(short = 'b', long)]
    pub browser: bool,

    /// Add a "watch in player" action to notifications
    #[arg(short = 'p', long)]
    pub player: bool,

    /// Configuration file (default: <config dir>/twitch-notify/config.toml)
    #[arg(short = 'c', long, env = "TWITCH_NOTIFY_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Seconds between polls
    #[arg(
        short = 'i',
        long,
        value_name = "SECS",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub interval: Option<u64>,

    /// Consecutive polls needed to confirm a status change
    #[arg(short = 't', long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    pub threshold: Option<u32>,

    /// Notify for streams that are already live at startup
    #[arg(long)]
    pub announce_online: bool,

    /// Write daily log files to this directory
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Only log errors
    #[arg(short = 'q', long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Set on the background copy of the process
    #[arg(long, hide = true)]
    pub detached: bool,
}

fn parse_stream_name(value: &str) -> Result<String, String> {
    validate_stream_name(value)
        .map(|()| value.to_string())
        .map_err(|e| e.to_string())
}

impl Args {
    /// Apply command line overrides to the loaded configuration.
    pub fn apply_to(&self, config: &mut AppConfig) {
        if let Some(interval) = self.interval {
            config.poll_interval_secs = interval;
        }
        if let Some(threshold) = self.threshold {
            config.debounce_threshold = threshold;
        }
        if self.announce_online {
            config.startup_policy = StartupPolicy::Announce;
        }
        if let Some(dir) = &self.log_dir {
            config.log_dir = Some(dir.clone());
        }
        for kind in self.enabled_actions() {
            if !config.actions.contains(&kind) {
                config.actions.push(kind);
            }
        }
    }

    /// Actions requested with `-b` / `-p`.
    pub fn enabled_actions(&self) -> Vec<ActionKind> {
        let mut actions = Vec::new();
        if self.browser {
            actions.push(ActionKind::OpenBrowser);
        }
        if self.player {
            actions.push(ActionKind::OpenPlayer);
        }
        actions
    }

    /// Whether this process runs the poll loop itself.
    pub fn runs_in_foreground(&self) -> bool {
        self.no_daemon || self.detached
    }

    /// Arguments for the background copy of this process.
    ///
    /// Paths are made absolute because the copy runs from the filesystem
    /// root.
    pub fn detached_args(&self) -> std::io::Result<Vec<OsString>> {
        fn absolute(path: &Path) -> std::io::Result<OsString> {
            std::path::absolute(path).map(PathBuf::into_os_string)
        }

        let mut args: Vec<OsString> = vec!["--detached".into()];

        if self.browser {
            args.push("--browser".into());
        }
        if self.player {
            args.push("--player".into());
        }
        if let Some(path) = &self.config {
            args.push("--config".into());
            args.push(absolute(path)?);
        }
        if let Some(interval) = self.interval {
            args.push("--interval".into());
            args.push(interval.to_string().into());
        }
        if let Some(threshold) = self.threshold {
            args.push("--threshold".into());
            args.push(threshold.to_string().into());
        }
        if self.announce_online {
            args.push("--announce-online".into());
        }
        if let Some(dir) = &self.log_dir {
            args.push("--log-dir".into());
            args.push(absolute(dir)?);
        }
        if self.verbose {
            args.push("--verbose".into());
        }
        if self.quiet {
            args.push("--quiet".into());
        }

        args.push("--".into());
        args.extend(self.streams.iter().map(OsString::from));
        Ok(args)
    }
}
