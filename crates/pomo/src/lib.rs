//! pomo - session/break countdown timers
//!
//! The engine is small and single-threaded:
//! - `Notifier`: ordered, duplicate-free multicast callbacks
//! - `Countdown`: a one-second-per-tick clock with pause, restart and stop
//! - `PomoManager`: two countdowns ("Session" and "Break") that hand over to
//!   each other whenever one reaches zero
//!
//! Time comes from a `Scheduler`. `ManualScheduler` is stepped by hand and
//! `LocalScheduler` runs on tokio's current-thread `LocalSet`. Everything
//! else (`controls`, `alert`, `preset`) sits on top for the `pomo` binary.

pub mod alert;
pub mod controls;
pub mod countdown;
pub mod manager;
pub mod notifier;
pub mod preset;
pub mod scheduler;

pub use countdown::{Countdown, TimerId};
pub use manager::PomoManager;
pub use notifier::{BoundHandler, Handler, Notifier};
pub use preset::Preset;
pub use scheduler::{DriverHandle, LocalScheduler, ManualScheduler, Scheduler};
