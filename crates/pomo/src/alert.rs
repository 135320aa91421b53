//! Desktop alerts for finished timers
//!
//! Shells out to whatever notifier the platform has (notify-send, kdialog,
//! terminal-notifier, osascript) and falls back to printing. Alerts are
//! fire-and-forget from the timer's point of view: a failure is logged and
//! the countdowns carry on.

use std::io::Write;
use std::process::Command;

use anyhow::{bail, Result};
use tracing::{debug, warn};

use crate::countdown::TimerId;

/// Notification urgency levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Urgency {
    Low,
    #[default]
    Normal,
    Critical,
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Low => "low",
            Urgency::Normal => "normal",
            Urgency::Critical => "critical",
        }
    }
}

/// A notification to display
#[derive(Debug, Clone, Default)]
pub struct Notification {
    pub title: String,
    pub message: String,
    pub urgency: Urgency,
    /// Auto-dismiss timeout in seconds
    pub timeout: Option<u32>,
    /// Whether to ask the notifier for a sound
    pub sound: bool,
}

impl Notification {
    /// Alert for a timer that just ran out and the one that took over
    pub fn timer_finished(finished: TimerId, sound: bool) -> Self {
        let message = match finished {
            TimerId::Session => "Session complete. Take a break.",
            TimerId::Break => "Break is over. Back to work.",
        };
        Self {
            title: format!("{} finished", finished.label()),
            message: message.to_string(),
            urgency: Urgency::Normal,
            timeout: Some(10),
            sound,
        }
    }
}

/// Available notification backends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// macOS terminal-notifier
    TerminalNotifier,
    /// macOS osascript
    Osascript,
    /// Linux notify-send
    NotifySend,
    /// KDE kdialog
    Kdialog,
    /// Fallback echo
    Echo,
}

impl Backend {
    /// Detect the best available backend for the current platform
    pub fn detect() -> Self {
        #[cfg(target_os = "macos")]
        {
            if Self::command_exists("terminal-notifier") {
                return Self::TerminalNotifier;
            }
            return Self::Osascript;
        }

        #[cfg(target_os = "linux")]
        {
            if Self::command_exists("notify-send") {
                return Self::NotifySend;
            }
            if Self::command_exists("kdialog") {
                return Self::Kdialog;
            }
            return Self::Echo;
        }

        #[cfg(not(any(target_os = "macos", target_os = "linux")))]
        {
            Self::Echo
        }
    }

    #[cfg_attr(not(any(target_os = "macos", target_os = "linux")), allow(dead_code))]
    fn command_exists(cmd: &str) -> bool {
        Command::new("which")
            .arg(cmd)
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::TerminalNotifier => "terminal-notifier",
            Self::Osascript => "osascript",
            Self::NotifySend => "notify-send",
            Self::Kdialog => "kdialog",
            Self::Echo => "echo",
        }
    }

    /// Send a notification using this backend
    pub fn send(&self, notification: &Notification) -> Result<()> {
        let mut cmd = match self.command(notification) {
            Some(cmd) => cmd,
            None => {
                println!("[{}] {}", notification.title, notification.message);
                return Ok(());
            }
        };

        let status = cmd.status()?;
        if !status.success() {
            bail!("{} failed with status: {}", self.name(), status);
        }
        Ok(())
    }

    /// Build the command line for this backend, `None` for echo
    fn command(&self, notification: &Notification) -> Option<Command> {
        match self {
            Self::TerminalNotifier => {
                let mut cmd = Command::new("terminal-notifier");
                cmd.args([
                    "-title",
                    &notification.title,
                    "-message",
                    &notification.message,
                    "-group",
                    "pomo",
                ]);
                if notification.sound {
                    cmd.args(["-sound", "default"]);
                }
                Some(cmd)
            }
            Self::Osascript => {
                let title = notification.title.replace('"', r#"\""#);
                let message = notification.message.replace('"', r#"\""#);
                let mut script =
                    format!(r#"display notification "{}" with title "{}""#, message, title);
                if notification.sound {
                    script.push_str(r#" sound name "default""#);
                }
                let mut cmd = Command::new("osascript");
                cmd.args(["-e", &script]);
                Some(cmd)
            }
            Self::NotifySend => {
                let mut cmd = Command::new("notify-send");
                cmd.args([&notification.title, &notification.message]);
                cmd.args(["--urgency", notification.urgency.as_str()]);
                if let Some(timeout) = notification.timeout {
                    cmd.args(["--expire-time", &(timeout * 1000).to_string()]);
                }
                Some(cmd)
            }
            Self::Kdialog => {
                let timeout = notification.timeout.unwrap_or(5);
                let mut cmd = Command::new("kdialog");
                cmd.args([
                    "--passivepopup",
                    &notification.message,
                    &timeout.to_string(),
                    "--title",
                    &notification.title,
                ]);
                Some(cmd)
            }
            Self::Echo => None,
        }
    }
}

/// Delivers alerts when timers finish
#[derive(Debug, Clone, Copy)]
pub struct Alerter {
    backend: Option<Backend>,
    bell: bool,
}

impl Alerter {
    /// `desktop` enables notifications, `sound` the terminal bell and
    /// notifier sounds
    pub fn new(desktop: bool, sound: bool) -> Self {
        let backend = desktop.then(Backend::detect);
        if let Some(backend) = backend {
            debug!(backend = backend.name(), "alert backend selected");
        }
        Self {
            backend,
            bell: sound,
        }
    }

    /// Announce that `finished` ran out
    pub fn timer_finished(&self, finished: TimerId) {
        if self.bell {
            let mut stdout = std::io::stdout();
            let _ = stdout.write_all(b"\x07");
            let _ = stdout.flush();
        }

        if let Some(backend) = self.backend {
            let notification = Notification::timer_finished(finished, self.bell);
            if let Err(e) = backend.send(&notification) {
                warn!(backend = backend.name(), error = %e, "failed to send alert");
            }
        }
    }
}
