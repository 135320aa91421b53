//! Periodic drivers
//!
//! A countdown does not keep time itself. It asks a `Scheduler` to call it
//! back at a fixed interval and hands the returned `DriverHandle` back when
//! it wants the calls to stop.
//!
//! - `ManualScheduler` only fires when told to advance; tests and embedders
//!   that own their own clock step it explicitly.
//! - `LocalScheduler` fires from tokio tasks spawned on the current
//!   `LocalSet`.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

/// Callback fired once per interval
pub type Tick = Rc<dyn Fn()>;

/// Opaque registration returned by `Scheduler::arm`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DriverHandle(u64);

/// Capability to fire a callback periodically until disarmed
pub trait Scheduler {
    /// Start calling `callback` every `interval`, first call one interval from now
    fn arm(&self, interval: Duration, callback: Tick) -> DriverHandle;

    /// Stop a driver. Unknown or already disarmed handles are ignored.
    fn disarm(&self, handle: DriverHandle);
}

// Zero would fire without bound
fn effective_interval(interval: Duration) -> Duration {
    interval.max(Duration::from_millis(1))
}

#[derive(Debug, Default)]
struct HandleSource {
    next: Cell<u64>,
}

impl HandleSource {
    fn next(&self) -> DriverHandle {
        let id = self.next.get();
        self.next.set(id + 1);
        DriverHandle(id)
    }
}

struct ManualDriver {
    handle: DriverHandle,
    interval: Duration,
    elapsed: Duration,
    callback: Tick,
}

/// Scheduler driven by explicit calls to `advance`
///
/// Each driver keeps its own phase: a driver armed half way through a second
/// fires half a second after one armed at the top of it.
#[derive(Default)]
pub struct ManualScheduler {
    handles: HandleSource,
    drivers: RefCell<Vec<ManualDriver>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live drivers
    pub fn armed(&self) -> usize {
        self.drivers.borrow().len()
    }

    pub fn is_armed(&self, handle: DriverHandle) -> bool {
        self.drivers.borrow().iter().any(|d| d.handle == handle)
    }

    /// Advance whole seconds
    pub fn advance_secs(&self, secs: u64) {
        self.advance(Duration::from_secs(secs));
    }

    /// Let `by` pass, firing every driver that comes due in order of time,
    /// and in arming order for drivers due at the same instant.
    ///
    /// Callbacks run with no internal borrow held, so they may arm and
    /// disarm freely. A driver armed during the advance starts its phase at
    /// the moment it was armed; a driver disarmed during the advance does
    /// not fire again, even if it was already due.
    pub fn advance(&self, by: Duration) {
        let mut left = by;

        loop {
            let due: Vec<(DriverHandle, Tick)> = {
                let mut drivers = self.drivers.borrow_mut();

                let next = drivers
                    .iter()
                    .map(|d| d.interval.saturating_sub(d.elapsed))
                    .min();

                let step = match next {
                    Some(step) if step <= left => step,
                    _ => {
                        for driver in drivers.iter_mut() {
                            driver.elapsed += left;
                        }
                        return;
                    }
                };

                left -= step;
                drivers
                    .iter_mut()
                    .filter_map(|driver| {
                        driver.elapsed += step;
                        if driver.elapsed >= driver.interval {
                            driver.elapsed -= driver.interval;
                            Some((driver.handle, Rc::clone(&driver.callback)))
                        } else {
                            None
                        }
                    })
                    .collect()
            };

            for (handle, callback) in due {
                if self.is_armed(handle) {
                    callback();
                }
            }
        }
    }
}

impl Scheduler for ManualScheduler {
    fn arm(&self, interval: Duration, callback: Tick) -> DriverHandle {
        let handle = self.handles.next();
        self.drivers.borrow_mut().push(ManualDriver {
            handle,
            interval: effective_interval(interval),
            elapsed: Duration::ZERO,
            callback,
        });
        handle
    }

    fn disarm(&self, handle: DriverHandle) {
        self.drivers.borrow_mut().retain(|d| d.handle != handle);
    }
}

/// Scheduler backed by tokio timers on the current thread
///
/// Every driver is a task spawned with `tokio::task::spawn_local`, so arming
/// must happen inside a `LocalSet` (for example `LocalSet::block_on`).
/// Disarming aborts the task; a driver that disarms itself from its own
/// callback is not called again.
#[derive(Default)]
pub struct LocalScheduler {
    handles: HandleSource,
    tasks: RefCell<HashMap<DriverHandle, JoinHandle<()>>>,
}

impl LocalScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live drivers
    pub fn armed(&self) -> usize {
        self.tasks.borrow().len()
    }
}

impl Scheduler for LocalScheduler {
    fn arm(&self, interval: Duration, callback: Tick) -> DriverHandle {
        let handle = self.handles.next();
        let interval = effective_interval(interval);

        let task = tokio::task::spawn_local(async move {
            let mut ticker = time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                callback();
            }
        });

        self.tasks.borrow_mut().insert(handle, task);
        handle
    }

    fn disarm(&self, handle: DriverHandle) {
        if let Some(task) = self.tasks.borrow_mut().remove(&handle) {
            task.abort();
        }
    }
}

impl Drop for LocalScheduler {
    fn drop(&mut self) {
        for (_, task) in self.tasks.get_mut().drain() {
            task.abort();
        }
    }
}
