//! Desktop notification channel.
//!
//! Shows notifications through `notify-send` (libnotify). Notifications never
//! expire on their own. When actions are attached, the command is started with
//! `--wait` and the reply is handled on a background task, so sending never
//! blocks on the user.

use std::process::Stdio;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::NotificationChannel;
use crate::notification::events::{ActionKind, Notification, NotificationAction};
use crate::notification::launcher::ActionLauncher;
use crate::{Error, Result};

/// Desktop channel configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesktopConfig {
    /// Whether the channel is enabled.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Program used to show notifications.
    #[serde(default = "default_command")]
    pub command: String,
    /// Application name reported to the notification daemon.
    #[serde(default = "default_app_name")]
    pub app_name: String,
    /// Optional icon name or path.
    #[serde(default)]
    pub icon: Option<String>,
}

fn default_enabled() -> bool {
    true
}

fn default_command() -> String {
    "notify-send".to_string()
}

fn default_app_name() -> String {
    "Twitch Notify".to_string()
}

impl Default for DesktopConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            command: default_command(),
            app_name: default_app_name(),
            icon: None,
        }
    }
}

/// Desktop notification channel.
pub struct DesktopChannel {
    config: DesktopConfig,
    launcher: Option<Arc<ActionLauncher>>,
}

impl DesktopChannel {
    /// Create a channel that shows notifications without running actions.
    pub fn new(config: DesktopConfig) -> Self {
        Self {
            config,
            launcher: None,
        }
    }

    /// Create a channel whose action buttons are executed by `launcher`.
    pub fn with_launcher(config: DesktopConfig, launcher: Arc<ActionLauncher>) -> Self {
        Self {
            config,
            launcher: Some(launcher),
        }
    }

    /// Arguments passed to the notification command.
    pub fn build_args(&self, notification: &Notification) -> Vec<String> {
        let mut args = vec![
            format!("--app-name={}", self.config.app_name),
            "--urgency=critical".to_string(),
            // 0 = never expire
            "--expire-time=0".to_string(),
        ];

        if let Some(icon) = &self.config.icon {
            args.push(format!("--icon={}", icon));
        }

        let actions = self.actions(notification);
        for action in actions {
            args.push(format!("--action={}={}", action.key(), action.label));
        }
        if !actions.is_empty() {
            args.push("--wait".to_string());
        }

        args.push("--".to_string());
        args.push(notification.title.clone());
        args.push(notification.message.clone());
        args
    }

    /// Actions are only offered when something can run them.
    fn actions<'a>(&self, notification: &'a Notification) -> &'a [NotificationAction] {
        if self.launcher.is_some() {
            &notification.actions
        } else {
            &[]
        }
    }
}

/// Match the reply printed by `notify-send --wait` against the offered
/// actions. Newer versions print the action key, older ones its index.
pub fn select_action<'a>(
    reply: &str,
    actions: &'a [NotificationAction],
) -> Option<&'a NotificationAction> {
    let reply = reply.trim();
    if reply.is_empty() {
        return None;
    }

    match ActionKind::from_key(reply) {
        Some(kind) => actions.iter().find(|a| a.kind == kind),
        None => reply.parse::<usize>().ok().and_then(|i| actions.get(i)),
    }
}

#[async_trait]
impl NotificationChannel for DesktopChannel {
    fn channel_type(&self) -> &'static str {
        "desktop"
    }

    fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    async fn send(&self, notification: &Notification) -> Result<()> {
        if !self.is_enabled() {
            return Ok(());
        }

        let args = self.build_args(notification);
        let mut command = process_utils::tokio_command(&self.config.command);
        command.args(&args).stdin(Stdio::null()).stderr(Stdio::null());

        let actions = self.actions(notification).to_vec();
        let launcher = match (&self.launcher, actions.is_empty()) {
            (Some(launcher), false) => launcher.clone(),
            _ => {
                let status = command.stdout(Stdio::null()).status().await.map_err(|e| {
                    Error::notification(format!("failed to run {}: {}", self.config.command, e))
                })?;
                if !status.success() {
                    return Err(Error::notification(format!(
                        "{} exited with {}",
                        self.config.command, status
                    )));
                }
                debug!("Desktop notification shown");
                return Ok(());
            }
        };

        let child = command.stdout(Stdio::piped()).spawn().map_err(|e| {
            Error::notification(format!("failed to run {}: {}", self.config.command, e))
        })?;

        tokio::spawn(async move {
            let output = match child.wait_with_output().await {
                Ok(output) => output,
                Err(e) => {
                    warn!("Desktop notification wait failed: {}", e);
                    return;
                }
            };

            let reply = String::from_utf8_lossy(&output.stdout);
            match select_action(&reply, &actions) {
                Some(action) => {
                    if let Err(e) = launcher.launch(action).await {
                        warn!(stream = %action.stream, "Failed to run notification action: {}", e);
                    }
                }
                None => debug!("Desktop notification dismissed"),
            }
        });

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn online(actions: &[ActionKind]) -> Notification {
        Notification::stream_online("bob", "Tetris", actions)
    }

    #[test]
    fn test_args_without_actions() {
        let channel = DesktopChannel::new(DesktopConfig::default());
        let args = channel.build_args(&online(&[]));
        assert_eq!(
            args,
            vec![
                "--app-name=Twitch Notify",
                "--urgency=critical",
                "--expire-time=0",
                "--",
                "Twitch Notify",
                "bob is online.\nPlaying: Tetris",
            ]
        );
    }

    #[test]
    fn test_args_with_actions_and_icon() {
        let config = DesktopConfig {
            icon: Some("twitch".to_string()),
            ..Default::default()
        };
        let channel = DesktopChannel::with_launcher(config, Arc::new(ActionLauncher::default()));
        let args =
            channel.build_args(&online(&[ActionKind::OpenBrowser, ActionKind::OpenPlayer]));

        assert!(args.contains(&"--icon=twitch".to_string()));
        assert!(args.contains(&"--action=browser=Open in browser".to_string()));
        assert!(args.contains(&"--action=player=Watch in player".to_string()));
        assert!(args.contains(&"--wait".to_string()));
        let sep = args.iter().position(|a| a == "--").unwrap();
        assert_eq!(args.len() - sep, 3);
    }

    #[test]
    fn test_actions_dropped_without_launcher() {
        let channel = DesktopChannel::new(DesktopConfig::default());
        let args = channel.build_args(&online(&[ActionKind::OpenBrowser]));
        assert!(!args.iter().any(|a| a.starts_with("--action")));
        assert!(!args.contains(&"--wait".to_string()));
    }

    #[test]
    fn test_select_action() {
        let n = online(&[ActionKind::OpenBrowser, ActionKind::OpenPlayer]);
        assert_eq!(
            select_action("player\n", &n.actions).map(|a| a.kind),
            Some(ActionKind::OpenPlayer)
        );
        assert_eq!(
            select_action("0", &n.actions).map(|a| a.kind),
            Some(ActionKind::OpenBrowser)
        );
        assert!(select_action("", &n.actions).is_none());
        assert!(select_action("7", &n.actions).is_none());
        assert!(select_action("unknown", &n.actions).is_none());
    }

    #[test]
    fn test_select_action_key_not_offered() {
        let n = online(&[ActionKind::OpenBrowser]);
        assert!(select_action("player", &n.actions).is_none());
        assert_eq!(
            select_action(" browser ", &n.actions).map(|a| a.kind),
            Some(ActionKind::OpenBrowser)
        );
    }

    #[tokio::test]
    async fn test_disabled_channel_is_noop() {
        let config = DesktopConfig {
            enabled: false,
            command: "definitely-not-notify-send-5f1c".to_string(),
            ..Default::default()
        };
        let channel = DesktopChannel::new(config);
        assert!(channel.send(&online(&[])).await.is_ok());
    }

    #[tokio::test]
    async fn test_missing_command_is_error() {
        let config = DesktopConfig {
            command: "definitely-not-notify-send-5f1c".to_string(),
            ..Default::default()
        };
        let channel = DesktopChannel::new(config);
        assert!(channel.send(&online(&[])).await.is_err());
    }
}
