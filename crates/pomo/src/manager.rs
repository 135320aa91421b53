//! Session/break alternation
//!
//! `PomoManager` owns two countdowns and keeps exactly one of them "active":
//! the one the user is looking at and, when anything is running, the one
//! whose driver is armed. When the active countdown reaches zero the manager
//! hands over to the other one and restarts it before telling anyone.

use std::cell::Cell;
use std::rc::Rc;

use tracing::{debug, info};

use crate::countdown::{Countdown, TimerId};
use crate::notifier::{BoundHandler, Notifier};
use crate::scheduler::Scheduler;

/// Default work session length in seconds
pub const DEFAULT_SESSION_SECS: i64 = 25 * 60;

/// Default break length in seconds
pub const DEFAULT_BREAK_SECS: i64 = 5 * 60;

struct Shared {
    session: Countdown,
    brk: Countdown,
    active: Cell<TimerId>,
    on_zero: Notifier<TimerId>,
    on_tick: Notifier<(TimerId, u32)>,
}

impl Shared {
    fn countdown(&self, id: TimerId) -> &Countdown {
        match id {
            TimerId::Session => &self.session,
            TimerId::Break => &self.brk,
        }
    }

    fn handle_zero(&self, timer: &Countdown) {
        let finished = timer.id();
        let next = finished.other();

        self.active.set(next);
        self.countdown(next).restart();
        info!(finished = %finished, next = %next, "timer finished, switching");

        self.on_zero.invoke(&finished);
    }

    fn handle_tick(&self, timer: &Countdown, time: u32) {
        self.on_tick.invoke(&(timer.id(), time));
    }
}

/// Two countdowns, "Session" and "Break", taking turns
pub struct PomoManager {
    shared: Rc<Shared>,
}

impl PomoManager {
    /// 25 minute sessions, 5 minute breaks
    pub fn new(scheduler: Rc<dyn Scheduler>) -> Self {
        Self::with_durations(scheduler, DEFAULT_SESSION_SECS, DEFAULT_BREAK_SECS)
    }

    pub fn with_durations(scheduler: Rc<dyn Scheduler>, session_secs: i64, break_secs: i64) -> Self {
        let shared = Rc::new(Shared {
            session: Countdown::new(TimerId::Session, session_secs, Rc::clone(&scheduler)),
            brk: Countdown::new(TimerId::Break, break_secs, scheduler),
            active: Cell::new(TimerId::Session),
            on_zero: Notifier::new(),
            on_tick: Notifier::new(),
        });

        let on_zero: BoundHandler<Shared, Countdown> =
            Rc::new(|shared: &Shared, timer: &Countdown| shared.handle_zero(timer));
        let on_tick: BoundHandler<Shared, (Countdown, u32)> =
            Rc::new(|shared: &Shared, (timer, time): &(Countdown, u32)| {
                shared.handle_tick(timer, *time)
            });

        for countdown in [&shared.session, &shared.brk] {
            countdown.on_zero().subscribe_with(&on_zero, &shared);
            countdown.on_tick().subscribe_with(&on_tick, &shared);
        }

        Self { shared }
    }

    pub fn session(&self) -> &Countdown {
        &self.shared.session
    }

    pub fn break_timer(&self) -> &Countdown {
        &self.shared.brk
    }

    pub fn countdown(&self, id: TimerId) -> &Countdown {
        self.shared.countdown(id)
    }

    /// The countdown the user is currently working with
    pub fn active(&self) -> &Countdown {
        self.shared.countdown(self.active_id())
    }

    pub fn active_id(&self) -> TimerId {
        self.shared.active.get()
    }

    pub fn is_session(&self) -> bool {
        self.active_id() == TimerId::Session
    }

    pub fn is_break(&self) -> bool {
        self.active_id() == TimerId::Break
    }

    /// Fired with the id of the timer that just finished, after the other
    /// one has become active and been restarted
    pub fn on_zero(&self) -> &Notifier<TimerId> {
        &self.shared.on_zero
    }

    /// Fired with the remaining seconds of whichever timer ticked
    pub fn on_tick(&self) -> &Notifier<(TimerId, u32)> {
        &self.shared.on_tick
    }

    /// Make the session active and run it from the top
    pub fn start_session(&self) {
        self.start(TimerId::Session);
    }

    /// Make the break active and run it from the top
    pub fn start_break(&self) {
        self.start(TimerId::Break);
    }

    /// Starting the timer that is already active restarts it.
    pub fn start(&self, id: TimerId) {
        if id != self.active_id() {
            self.active().stop();
            self.shared.active.set(id);
        }
        debug!(timer = %id, "starting");
        self.countdown(id).restart();
    }

    pub fn set_paused(&self, paused: bool) {
        self.active().set_paused(paused);
    }

    pub fn is_paused(&self) -> bool {
        self.active().paused()
    }

    /// Stop everything, make the session active and install new ceilings
    pub fn reset(&self, session_secs: i64, break_secs: i64) {
        self.active().stop();
        // Normally already Idle; stopping also drops a pause flag left on it
        self.countdown(self.active_id().other()).stop();
        self.shared.active.set(TimerId::Session);

        let session = self.session();
        session.set_max_time(session_secs);
        session.reset_time();

        let brk = self.break_timer();
        brk.set_max_time(break_secs);
        brk.reset_time();

        debug!(session = session.max_time(), brk = brk.max_time(), "reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifier::Handler;
    use crate::scheduler::ManualScheduler;
    use std::cell::RefCell;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Event {
        Tick(TimerId, u32),
        Zero(TimerId),
    }

    struct Fixture {
        scheduler: Rc<ManualScheduler>,
        manager: Rc<PomoManager>,
        events: Rc<RefCell<Vec<Event>>>,
        _handlers: (Handler<(TimerId, u32)>, Handler<TimerId>),
    }

    fn fixture(session_secs: i64, break_secs: i64) -> Fixture {
        let scheduler = Rc::new(ManualScheduler::new());
        let manager = Rc::new(PomoManager::with_durations(
            scheduler.clone(),
            session_secs,
            break_secs,
        ));
        let events = Rc::new(RefCell::new(Vec::new()));

        let on_tick: Handler<(TimerId, u32)> = {
            let events = Rc::clone(&events);
            Rc::new(move |(id, time): &(TimerId, u32)| {
                events.borrow_mut().push(Event::Tick(*id, *time))
            })
        };
        let on_zero: Handler<TimerId> = {
            let events = Rc::clone(&events);
            Rc::new(move |id: &TimerId| events.borrow_mut().push(Event::Zero(*id)))
        };
        manager.on_tick().subscribe(&on_tick);
        manager.on_zero().subscribe(&on_zero);

        Fixture {
            scheduler,
            manager,
            events,
            _handlers: (on_tick, on_zero),
        }
    }

    #[test]
    fn test_defaults() {
        let scheduler = Rc::new(ManualScheduler::new());
        let manager = PomoManager::new(scheduler);
        assert_eq!(manager.session().time(), 1500);
        assert_eq!(manager.break_timer().time(), 300);
        assert_eq!(manager.active_id(), TimerId::Session);
        assert!(manager.is_session());
        assert!(!manager.is_break());
        assert!(!manager.is_paused());
        assert!(manager.active().ptr_eq(manager.session()));
    }

    #[test]
    fn test_start_session_then_break() {
        let f = fixture(1500, 300);
        f.manager.start_session();
        f.scheduler.advance_secs(10);
        f.manager.start_break();

        let session = f.manager.session();
        let brk = f.manager.break_timer();
        assert!(!session.is_active());
        assert_eq!(session.time(), 1500);
        assert!(brk.is_active());
        assert_eq!(brk.time(), 300);
        assert_eq!(f.manager.active_id(), TimerId::Break);
        assert_eq!(f.scheduler.armed(), 1);
    }

    #[test]
    fn test_starting_active_timer_restarts_it() {
        let f = fixture(1500, 300);
        f.manager.start_session();
        f.scheduler.advance_secs(100);
        f.manager.set_paused(true);

        f.manager.start_session();
        assert_eq!(f.manager.session().time(), 1500);
        assert!(f.manager.session().is_active());
        assert!(!f.manager.is_paused());
        assert_eq!(f.scheduler.armed(), 1);
    }

    #[test]
    fn test_ticks_are_reexposed_with_id() {
        let f = fixture(1500, 300);
        f.manager.start_break();
        f.scheduler.advance_secs(2);

        assert_eq!(
            *f.events.borrow(),
            vec![Event::Tick(TimerId::Break, 299), Event::Tick(TimerId::Break, 298)]
        );
    }

    #[test]
    fn test_zero_swaps_to_other_timer() {
        let f = fixture(2, 300);
        f.manager.start_session();

        f.scheduler.advance_secs(1);
        assert_eq!(*f.events.borrow(), vec![Event::Tick(TimerId::Session, 1)]);
        assert_eq!(f.manager.session().time(), 1);

        f.scheduler.advance_secs(1);
        assert_eq!(
            f.events.borrow()[1..],
            [Event::Tick(TimerId::Session, 0), Event::Zero(TimerId::Session)]
        );
        assert_eq!(f.manager.active_id(), TimerId::Break);

        let brk = f.manager.break_timer();
        assert!(brk.is_active());
        assert_eq!(brk.time(), brk.max_time());

        let session = f.manager.session();
        assert!(!session.is_active());
        assert_eq!(session.time(), 2);
        assert_eq!(f.scheduler.armed(), 1);
    }

    #[test]
    fn test_zero_observers_see_swapped_state() {
        let f = fixture(1, 300);
        let seen = Rc::new(Cell::new(None));

        let on_zero: BoundHandler<PomoManager, TimerId> = {
            let seen = Rc::clone(&seen);
            Rc::new(move |manager: &PomoManager, finished: &TimerId| {
                seen.set(Some((*finished, manager.active_id(), manager.active().is_active())))
            })
        };
        f.manager.on_zero().subscribe_with(&on_zero, &f.manager);

        f.manager.start_session();
        f.scheduler.advance_secs(1);

        assert_eq!(seen.get(), Some((TimerId::Session, TimerId::Break, true)));
    }

    #[test]
    fn test_start_from_zero_observer_wins() {
        let f = fixture(1, 300);
        let on_zero: BoundHandler<PomoManager, TimerId> =
            Rc::new(|manager: &PomoManager, _finished: &TimerId| manager.start_session());
        f.manager.on_zero().subscribe_with(&on_zero, &f.manager);

        f.manager.start_session();
        f.scheduler.advance_secs(1);

        assert_eq!(f.manager.active_id(), TimerId::Session);
        assert!(f.manager.session().is_active());
        assert!(!f.manager.break_timer().is_active());
        assert_eq!(f.manager.session().time(), 1);
        assert_eq!(f.scheduler.armed(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_local_scheduler_hands_over() {
        use crate::scheduler::LocalScheduler;
        use std::time::Duration;
        use tokio::task::LocalSet;
        use tokio::time;

        let local = LocalSet::new();
        local
            .run_until(async {
                let scheduler = Rc::new(LocalScheduler::new());
                let manager = PomoManager::with_durations(scheduler.clone(), 2, 3);
                manager.start_session();

                time::sleep(Duration::from_millis(2500)).await;
                assert_eq!(manager.active_id(), TimerId::Break);
                assert_eq!(manager.break_timer().time(), 3);
                assert!(!manager.session().is_active());
                assert_eq!(scheduler.armed(), 1);

                time::sleep(Duration::from_secs(3)).await;
                assert_eq!(manager.active_id(), TimerId::Session);
                assert_eq!(manager.session().time(), 2);
                assert_eq!(scheduler.armed(), 1);
            })
            .await;
    }

    #[test]
    fn test_alternates_indefinitely() {
        let f = fixture(3, 2);
        f.manager.start_session();
        f.scheduler.advance_secs(3 + 2 + 3 + 2);

        let zeros: Vec<TimerId> = f
            .events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                Event::Zero(id) => Some(*id),
                Event::Tick(..) => None,
            })
            .collect();
        assert_eq!(
            zeros,
            vec![TimerId::Session, TimerId::Break, TimerId::Session, TimerId::Break]
        );
        assert_eq!(f.manager.active_id(), TimerId::Session);
        assert_eq!(f.manager.session().time(), 3);
    }

    #[test]
    fn test_pause_applies_to_active_timer() {
        let f = fixture(1500, 300);
        f.manager.start_break();
        f.scheduler.advance_secs(5);

        f.manager.set_paused(true);
        assert!(f.manager.is_paused());
        assert!(f.manager.break_timer().paused());
        assert!(!f.manager.session().paused());

        f.scheduler.advance_secs(60);
        assert_eq!(f.manager.break_timer().time(), 295);

        f.manager.set_paused(false);
        f.scheduler.advance_secs(5);
        assert_eq!(f.manager.break_timer().time(), 290);
    }

    #[test]
    fn test_reset_returns_to_baseline() {
        let f = fixture(1500, 300);
        f.manager.start_break();
        f.scheduler.advance_secs(42);
        f.manager.set_paused(true);

        f.manager.reset(1500, 300);

        assert_eq!(f.manager.active_id(), TimerId::Session);
        assert!(!f.manager.is_paused());
        for countdown in [f.manager.session(), f.manager.break_timer()] {
            assert!(!countdown.is_active());
            assert!(!countdown.paused());
            assert_eq!(countdown.time(), countdown.max_time());
        }
        assert_eq!(f.manager.session().max_time(), 1500);
        assert_eq!(f.manager.break_timer().max_time(), 300);
        assert_eq!(f.scheduler.armed(), 0);
    }

    #[test]
    fn test_reset_installs_new_ceilings() {
        let f = fixture(1500, 300);
        f.manager.start_session();
        f.scheduler.advance_secs(10);

        f.manager.reset(3000, 600);
        assert_eq!(f.manager.session().time(), 3000);
        assert_eq!(f.manager.break_timer().time(), 600);

        f.manager.reset(-5, 60);
        assert_eq!(f.manager.session().max_time(), 0);
    }

    #[test]
    fn test_dropping_manager_disarms_drivers() {
        let f = fixture(1500, 300);
        f.manager.start_session();
        assert_eq!(f.scheduler.armed(), 1);

        let Fixture {
            scheduler, manager, ..
        } = f;
        drop(manager);
        assert_eq!(scheduler.armed(), 0);
    }
}
