//! Countdown timers
//!
//! A `Countdown` counts whole seconds down from `max_time` to zero. It is
//! Idle until `restart()` arms a one-second driver, Running while the driver
//! fires, and Paused while the driver fires but ticks are suppressed.
//!
//! Idle always means `time == max_time`. When a tick brings `time` to zero
//! the countdown emits its tick, then its zero notification, then stops
//! itself, which puts `time` back at `max_time`.

use std::cell::Cell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, trace};

use crate::notifier::Notifier;
use crate::scheduler::{DriverHandle, Scheduler};

/// Driver interval
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Which of the two managed timers a countdown is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerId {
    Break,
    Session,
}

impl TimerId {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerId::Break => "break",
            TimerId::Session => "session",
        }
    }

    /// Human-facing label
    pub fn label(&self) -> &'static str {
        match self {
            TimerId::Break => "Break",
            TimerId::Session => "Session",
        }
    }

    /// The timer that takes over when this one reaches zero
    pub fn other(&self) -> TimerId {
        match self {
            TimerId::Break => TimerId::Session,
            TimerId::Session => TimerId::Break,
        }
    }
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("Unknown timer: {0} (expected 'session' or 'break')")]
pub struct ParseTimerIdError(String);

impl FromStr for TimerId {
    type Err = ParseTimerIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "session" | "work" => Ok(TimerId::Session),
            "break" | "rest" => Ok(TimerId::Break),
            other => Err(ParseTimerIdError(other.to_string())),
        }
    }
}

fn clamp_secs(secs: i64) -> u32 {
    secs.clamp(0, u32::MAX as i64) as u32
}

struct Inner {
    id: TimerId,
    max_time: Cell<u32>,
    time: Cell<u32>,
    paused: Cell<bool>,
    driver: Cell<Option<DriverHandle>>,
    scheduler: Rc<dyn Scheduler>,
    on_tick: Notifier<(Countdown, u32)>,
    on_zero: Notifier<Countdown>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        if let Some(handle) = self.driver.take() {
            self.scheduler.disarm(handle);
        }
    }
}

/// Shared handle to a single countdown clock
///
/// Cloning is cheap and every clone refers to the same countdown. The
/// scheduler only holds a weak reference, so dropping the last handle also
/// disarms the driver.
#[derive(Clone)]
pub struct Countdown {
    inner: Rc<Inner>,
}

impl Countdown {
    /// Create an Idle countdown. A negative `max_time` becomes 0.
    pub fn new(id: TimerId, max_time: i64, scheduler: Rc<dyn Scheduler>) -> Self {
        let max_time = clamp_secs(max_time);
        Self {
            inner: Rc::new(Inner {
                id,
                max_time: Cell::new(max_time),
                time: Cell::new(max_time),
                paused: Cell::new(false),
                driver: Cell::new(None),
                scheduler,
                on_tick: Notifier::new(),
                on_zero: Notifier::new(),
            }),
        }
    }

    pub fn id(&self) -> TimerId {
        self.inner.id
    }

    /// Remaining seconds
    pub fn time(&self) -> u32 {
        self.inner.time.get()
    }

    pub fn max_time(&self) -> u32 {
        self.inner.max_time.get()
    }

    /// Change the ceiling. A negative value becomes 0.
    ///
    /// While Idle the remaining time follows the new ceiling; while Running
    /// or Paused only the ceiling changes.
    pub fn set_max_time(&self, max_time: i64) {
        let max_time = clamp_secs(max_time);
        self.inner.max_time.set(max_time);
        if !self.is_active() {
            self.inner.time.set(max_time);
        }
    }

    pub fn paused(&self) -> bool {
        self.inner.paused.get()
    }

    /// Suppress or resume ticking. The driver keeps running either way.
    pub fn set_paused(&self, paused: bool) {
        self.inner.paused.set(paused);
    }

    /// Whether a driver is armed (Running or Paused)
    pub fn is_active(&self) -> bool {
        self.inner.driver.get().is_some()
    }

    /// Fired after every effective tick with the remaining seconds
    pub fn on_tick(&self) -> &Notifier<(Countdown, u32)> {
        &self.inner.on_tick
    }

    /// Fired when a tick brings the countdown to zero, just before it stops
    pub fn on_zero(&self) -> &Notifier<Countdown> {
        &self.inner.on_zero
    }

    /// Whether both handles refer to the same countdown
    pub fn ptr_eq(&self, other: &Countdown) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Start over from `max_time`, whatever the current state
    pub fn restart(&self) {
        self.disarm();
        self.inner.paused.set(false);
        self.reset_time();
        self.arm();
        debug!(timer = %self.id(), time = self.time(), "restarted");
    }

    /// Disarm and return to Idle
    pub fn stop(&self) {
        let was_active = self.is_active();
        self.disarm();
        self.inner.paused.set(false);
        self.reset_time();
        if was_active {
            debug!(timer = %self.id(), "stopped");
        }
    }

    /// Set `time` back to `max_time` without touching the driver or pause
    pub fn reset_time(&self) {
        self.inner.time.set(self.inner.max_time.get());
    }

    fn arm(&self) {
        let weak: Weak<Inner> = Rc::downgrade(&self.inner);
        let handle = self.inner.scheduler.arm(
            TICK_INTERVAL,
            Rc::new(move || {
                if let Some(inner) = weak.upgrade() {
                    Countdown { inner }.tick();
                }
            }),
        );
        self.inner.driver.set(Some(handle));
    }

    fn disarm(&self) {
        if let Some(handle) = self.inner.driver.take() {
            self.inner.scheduler.disarm(handle);
        }
    }

    fn tick(&self) {
        if self.paused() {
            return;
        }

        let driver = self.inner.driver.get();
        let time = self.time().saturating_sub(1);
        self.inner.time.set(time);
        trace!(timer = %self.id(), time, "tick");

        self.inner.on_tick.invoke(&(self.clone(), time));

        // A tick subscriber may already have stopped or restarted us
        if time == 0 && driver.is_some() && self.inner.driver.get() == driver {
            debug!(timer = %self.id(), "reached zero");
            self.inner.on_zero.invoke(self);
            // Same for zero subscribers that re-armed us
            if self.inner.driver.get() == driver {
                self.stop();
            }
        }
    }
}

impl fmt::Debug for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Countdown")
            .field("id", &self.id())
            .field("time", &self.time())
            .field("max_time", &self.max_time())
            .field("paused", &self.paused())
            .field("active", &self.is_active())
            .finish()
    }
}
