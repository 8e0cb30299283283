//! Execution of notification actions.
//!
//! Notification channels only report which action the user picked; this
//! capability turns that choice into an external command.

use std::process::Stdio;

use stream_status_parser::extractor::platforms::twitch::TwitchApi;
use tracing::info;

use super::events::{ActionKind, NotificationAction};
use crate::config::AppConfig;
use crate::streamer::validate_stream_name;
use crate::{Error, Result};

/// Platform default for opening a URL in the user's browser.
pub fn default_browser_command() -> &'static str {
    if cfg!(target_os = "macos") {
        "open"
    } else if cfg!(windows) {
        "explorer"
    } else {
        "xdg-open"
    }
}

pub const DEFAULT_PLAYER_COMMAND: &str = "mpv";

/// Runs the browser or player command for a chosen action.
#[derive(Debug, Clone)]
pub struct ActionLauncher {
    browser_command: String,
    player_command: String,
}

impl Default for ActionLauncher {
    fn default() -> Self {
        Self::new(default_browser_command(), DEFAULT_PLAYER_COMMAND)
    }
}

impl ActionLauncher {
    pub fn new(browser_command: impl Into<String>, player_command: impl Into<String>) -> Self {
        Self {
            browser_command: browser_command.into(),
            player_command: player_command.into(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(&config.browser_command, &config.player_command)
    }

    /// Program and arguments for an action. The channel page URL is
    /// appended as the last argument.
    pub fn command_line(&self, action: &NotificationAction) -> Result<(String, Vec<String>)> {
        validate_stream_name(&action.stream)?;

        let command = match action.kind {
            ActionKind::OpenBrowser => &self.browser_command,
            ActionKind::OpenPlayer => &self.player_command,
        };

        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts.next().ok_or_else(|| {
            Error::config(format!("no command configured for action '{}'", action.key()))
        })?;
        let mut args: Vec<String> = parts.collect();
        args.push(TwitchApi::channel_page_url(&action.stream));

        Ok((program, args))
    }

    /// Start the command for `action` without waiting for it to exit.
    pub async fn launch(&self, action: &NotificationAction) -> Result<()> {
        let (program, args) = self.command_line(action)?;

        process_utils::tokio_command(&program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| Error::notification(format!("failed to start {}: {}", program, e)))?;

        info!(
            stream = %action.stream,
            action = action.key(),
            %program,
            "Launched notification action"
        );
        Ok(())
    }
}
