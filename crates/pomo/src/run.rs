//! Interactive terminal front-end
//!
//! Drives a `PomoManager` on tokio's current-thread runtime: a
//! `LocalScheduler` supplies the one-second ticks, stdin supplies commands,
//! and the manager's notifications redraw the clock and fire alerts.

use std::cell::Cell;
use std::io::Write;
use std::rc::Rc;

use anyhow::{Context, Result};
use chrono::Local;
use pomo::alert::Alerter;
use pomo::controls::{self, Command, Toggle, HELP};
use pomo::{BoundHandler, LocalScheduler, PomoManager, Scheduler, TimerId};
use pomo_core::format;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Notify;
use tokio::task::LocalSet;
use tracing::debug;

use crate::{color, use_colors, BOLD, CYAN, GREEN, MAGENTA, YELLOW};

/// Everything the front-end needs to know to run
pub struct Settings {
    pub session_secs: u32,
    pub break_secs: u32,
    /// Completed sessions before exiting, 0 for no limit
    pub cycles: u32,
    pub alerter: Alerter,
    /// Wait for input before starting the first session
    pub hold: bool,
}

/// Run until the user quits, Ctrl-C, or the cycle limit
pub fn run(settings: Settings) -> Result<()> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start runtime")?;

    let local = LocalSet::new();
    let result = local.block_on(&rt, run_loop(settings));
    drop(local);

    // The stdin reader may still be parked in a blocking read
    rt.shutdown_background();
    result
}

struct Terminal {
    manager: PomoManager,
    settings: Settings,
    completed: Cell<u32>,
    done: Notify,
    tty: bool,
}

impl Terminal {
    fn new(settings: Settings) -> Rc<Self> {
        let scheduler: Rc<dyn Scheduler> = Rc::new(LocalScheduler::new());
        let manager = PomoManager::with_durations(
            scheduler,
            settings.session_secs as i64,
            settings.break_secs as i64,
        );

        let terminal = Rc::new(Self {
            manager,
            settings,
            completed: Cell::new(0),
            done: Notify::new(),
            tty: use_colors(),
        });

        let on_tick: BoundHandler<Terminal, (TimerId, u32)> =
            Rc::new(|terminal: &Terminal, (id, time): &(TimerId, u32)| terminal.draw(*id, *time));
        let on_zero: BoundHandler<Terminal, TimerId> =
            Rc::new(|terminal: &Terminal, finished: &TimerId| terminal.finished(*finished));

        terminal.manager.on_tick().subscribe_with(&on_tick, &terminal);
        terminal.manager.on_zero().subscribe_with(&on_zero, &terminal);

        terminal
    }

    /// Redraw the clock after a tick
    fn draw(&self, id: TimerId, time: u32) {
        let face = format!("{:<8} {}", id.label(), format::clock(time));
        if self.tty {
            print!("\r\x1b[2K{}", color(MAGENTA, &face));
            let _ = std::io::stdout().flush();
        } else if time % 60 == 0 {
            println!("{}", face);
        }
    }

    /// Finish the current clock line so regular output starts clean
    fn end_line(&self) {
        if self.tty {
            print!("\r\x1b[2K");
        }
    }

    fn finished(&self, finished: TimerId) {
        self.end_line();
        println!("{} {} finished", color(GREEN, "[ok]"), finished.label());
        self.settings.alerter.timer_finished(finished);

        if finished == TimerId::Session {
            let completed = self.completed.get() + 1;
            self.completed.set(completed);
            debug!(completed, "session completed");

            if self.settings.cycles > 0 && completed >= self.settings.cycles {
                self.done.notify_one();
                return;
            }
        }

        // The manager has already started the other timer
        self.announce_start(self.manager.active_id());
    }

    fn announce_start(&self, id: TimerId) {
        let countdown = self.manager.countdown(id);
        println!(
            "{} {} started: {}, ends at {}",
            color(CYAN, "[..]"),
            id.label(),
            format::duration(countdown.time()),
            format::ends_at(Local::now(), countdown.time())
        );
    }

    /// Apply one command; `false` means quit
    fn apply(&self, command: Command) -> bool {
        self.end_line();
        match command {
            Command::Toggle => match controls::toggle(&self.manager) {
                Toggle::Started(id) => self.announce_start(id),
                Toggle::Paused => println!("{} Paused", color(YELLOW, "[||]")),
                Toggle::Resumed => println!("{} Resumed", color(GREEN, "[>>]")),
            },
            Command::Start(id) => {
                self.manager.start(id);
                self.announce_start(id);
            }
            Command::Pause | Command::Resume => {
                let pause = command == Command::Pause;
                if !self.manager.active().is_active() {
                    println!("Nothing is running. Press <enter> to start.");
                } else if self.manager.is_paused() == pause {
                    println!("Already {}", if pause { "paused" } else { "running" });
                } else {
                    self.manager.set_paused(pause);
                    if pause {
                        println!("{} Paused", color(YELLOW, "[||]"));
                    } else {
                        println!("{} Resumed", color(GREEN, "[>>]"));
                    }
                }
            }
            Command::Reset => {
                self.manager
                    .reset(self.settings.session_secs as i64, self.settings.break_secs as i64);
                println!(
                    "{} Reset to {} / {}",
                    color(GREEN, "[ok]"),
                    format::duration(self.settings.session_secs),
                    format::duration(self.settings.break_secs)
                );
            }
            Command::Adjust(id, delta) => {
                let countdown = self.manager.countdown(id);
                let max_time = controls::adjust_max(countdown, delta);
                let note = if countdown.is_active() {
                    " (applies from the next start)"
                } else {
                    ""
                };
                println!(
                    "{} {} length: {}{}",
                    color(GREEN, "[ok]"),
                    id.label(),
                    format::duration(max_time),
                    note
                );
            }
            Command::Status => self.status(),
            Command::Help => println!("{}", HELP),
            Command::Quit => return false,
        }
        true
    }

    fn status(&self) {
        println!("{}", color(BOLD, "Timers"));
        for id in [TimerId::Session, TimerId::Break] {
            let countdown = self.manager.countdown(id);
            let state = if !countdown.is_active() {
                "idle"
            } else if countdown.paused() {
                "paused"
            } else {
                "running"
            };
            let marker = if id == self.manager.active_id() { "*" } else { " " };
            println!(
                "  {} {:<8} {} / {}  {}",
                marker,
                id.label(),
                format::clock(countdown.time()),
                format::clock(countdown.max_time()),
                state
            );
        }
        println!("  Completed sessions: {}", self.completed.get());
    }
}

async fn run_loop(settings: Settings) -> Result<()> {
    let hold = settings.hold;
    let terminal = Terminal::new(settings);

    println!("{}", color(BOLD, "POMO"));
    println!("Type 'help' for commands, 'q' to quit.");
    println!();

    if hold {
        println!("Press <enter> to start the session.");
    } else {
        terminal.manager.start_session();
        terminal.announce_start(TimerId::Session);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut input_open = true;

    loop {
        tokio::select! {
            line = lines.next_line(), if input_open => {
                match line.context("Failed to read input")? {
                    Some(line) => match line.parse::<Command>() {
                        Ok(command) => {
                            if !terminal.apply(command) {
                                break;
                            }
                        }
                        Err(e) => println!("{}", e),
                    },
                    // Keep timing without input; Ctrl-C still quits
                    None => input_open = false,
                }
            }
            _ = terminal.done.notified() => {
                println!("{} {} sessions done", color(GREEN, "[ok]"), terminal.completed.get());
                break;
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    terminal.end_line();
    println!("Completed sessions: {}", terminal.completed.get());
    Ok(())
}
