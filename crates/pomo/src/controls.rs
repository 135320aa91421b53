//! User-facing controls over a `PomoManager`
//!
//! The operations behind the front-end's buttons and keys, kept free of any
//! I/O so they can be exercised directly.

use std::str::FromStr;

use pomo_core::config::clamp_duration;
use thiserror::Error;

use crate::countdown::{Countdown, TimerId};
use crate::manager::PomoManager;

/// How far one press of +/- moves a ceiling, in seconds
pub const ADJUST_STEP_SECS: i64 = 60;

/// Outcome of the start/pause toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Started(TimerId),
    Paused,
    Resumed,
}

/// Move a countdown's ceiling by `delta` seconds inside the accepted window.
///
/// An Idle countdown shows the new value right away; a running one keeps
/// its remaining time and picks up the ceiling on its next restart.
pub fn adjust_max(countdown: &Countdown, delta: i64) -> u32 {
    let max_time = clamp_duration(countdown.max_time() as i64 + delta);
    countdown.set_max_time(max_time as i64);
    if !countdown.is_active() {
        countdown.reset_time();
    }
    max_time
}

/// Start the active timer, or flip its pause if it is already running
pub fn toggle(manager: &PomoManager) -> Toggle {
    if manager.active().is_active() {
        let paused = !manager.is_paused();
        manager.set_paused(paused);
        if paused {
            Toggle::Paused
        } else {
            Toggle::Resumed
        }
    } else {
        let id = manager.active_id();
        manager.start(id);
        Toggle::Started(id)
    }
}

/// Interactive command errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command: {0} (type 'help' for a list)")]
    Unknown(String),
}

/// A line of interactive input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Start, pause or resume the active timer
    Toggle,
    /// Start a timer from the top
    Start(TimerId),
    Pause,
    Resume,
    /// Stop both timers and restore configured durations
    Reset,
    /// Nudge a ceiling by the given number of seconds
    Adjust(TimerId, i64),
    Status,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let command = match s.trim().to_lowercase().as_str() {
            "" | "t" | "toggle" => Command::Toggle,
            "s" | "session" => Command::Start(TimerId::Session),
            "b" | "break" => Command::Start(TimerId::Break),
            "p" | "pause" => Command::Pause,
            "c" | "continue" | "resume" => Command::Resume,
            "r" | "reset" => Command::Reset,
            "+s" => Command::Adjust(TimerId::Session, ADJUST_STEP_SECS),
            "-s" => Command::Adjust(TimerId::Session, -ADJUST_STEP_SECS),
            "+b" => Command::Adjust(TimerId::Break, ADJUST_STEP_SECS),
            "-b" => Command::Adjust(TimerId::Break, -ADJUST_STEP_SECS),
            "st" | "status" => Command::Status,
            "h" | "?" | "help" => Command::Help,
            "q" | "quit" | "exit" => Command::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(command)
    }
}

/// Help text for the interactive loop
pub const HELP: &str = "\
  <enter>, t     start / pause / resume the active timer
  s, b           start session / break from the top
  p, c           pause / continue
  r              reset both timers
  +s -s +b -b    adjust session / break length by one minute
  st             show status
  q              quit";
