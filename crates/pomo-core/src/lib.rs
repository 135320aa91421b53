//! Pomo Core - Shared functionality for the pomo timer
//!
//! Paths, user configuration and display formatting. The timer engine
//! itself lives in the `pomo` crate and depends on nothing in here.

pub mod config;
pub mod format;
pub mod paths;

pub use config::{Config, ConfigError};
pub use paths::Paths;
