//! Configuration management for pomo
//!
//! Durations are stored in minutes, the unit people think in. The timer
//! engine works in seconds; `session_secs` and `break_secs` do the
//! conversion and enforce the 1..=60 minute window the front-end allows.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Shortest timer the front-end accepts, in seconds
pub const MIN_DURATION_SECS: u32 = 60;

/// Longest timer the front-end accepts, in seconds
pub const MAX_DURATION_SECS: u32 = 60 * 60;

/// Configuration validation errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{field} must be between 1 and 60 minutes (got {value})")]
    OutOfRange { field: &'static str, value: u32 },
}

/// User configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Length of a work session (minutes)
    #[serde(default = "default_session_minutes")]
    pub session_minutes: u32,

    /// Length of a break (minutes)
    #[serde(default = "default_break_minutes")]
    pub break_minutes: u32,

    /// Send a desktop notification when a timer runs out
    #[serde(default = "default_true")]
    pub alert: bool,

    /// Ring the terminal bell and ask the notifier for a sound
    #[serde(default = "default_true")]
    pub sound: bool,

    /// Exit after this many completed sessions (0 = run until quit)
    #[serde(default)]
    pub cycles: u32,
}

fn default_session_minutes() -> u32 {
    25
}

fn default_break_minutes() -> u32 {
    5
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            session_minutes: default_session_minutes(),
            break_minutes: default_break_minutes(),
            alert: true,
            sound: true,
            cycles: 0,
        }
    }
}

/// Clamp a duration in seconds to the accepted window
pub fn clamp_duration(secs: i64) -> u32 {
    secs.clamp(MIN_DURATION_SECS as i64, MAX_DURATION_SECS as i64) as u32
}

impl Config {
    /// Load config from file
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config: {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to file
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }
        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))
    }

    /// Check that both durations fall inside the accepted window
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("session_minutes", self.session_minutes),
            ("break_minutes", self.break_minutes),
        ] {
            let secs = value.saturating_mul(60);
            if !(MIN_DURATION_SECS..=MAX_DURATION_SECS).contains(&secs) {
                return Err(ConfigError::OutOfRange { field, value });
            }
        }
        Ok(())
    }

    /// Session length in seconds, clamped
    pub fn session_secs(&self) -> u32 {
        clamp_duration(self.session_minutes as i64 * 60)
    }

    /// Break length in seconds, clamped
    pub fn break_secs(&self) -> u32 {
        clamp_duration(self.break_minutes as i64 * 60)
    }
}
