//! Demo workload
//!
//! A blinking LED, a heartbeat that stops after a fixed count, a link wait
//! that gives up at a deadline and a watchdog that silences the LED.

use std::cell::Cell;

use log::{debug, info, warn};
use tickloop::{Flow, Millis, Scheduler, SchedulerConfig, TaskId, TimeSource, Timestamp, TraceHook};
use tickloop_posix::{LoopRunner, RunReport, SystemClock};

use crate::error::SettingsError;

/// Validated demo timings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub blink: Millis,
    pub heartbeat: Millis,
    pub heartbeats: u32,
    pub link_poll: Millis,
    /// Simulated link-up time; `None` keeps the link down.
    pub link_up_after: Option<Millis>,
    pub deadline: Millis,
    pub watchdog: Millis,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            blink: Millis::from_millis(250),
            heartbeat: Millis::from_secs(1),
            heartbeats: 3,
            link_poll: Millis::from_millis(100),
            link_up_after: None,
            deadline: Millis::from_millis(1500),
            watchdog: Millis::from_millis(2500),
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        for (option, period) in [
            ("blink-ms", self.blink),
            ("heartbeat-ms", self.heartbeat),
            ("link-poll-ms", self.link_poll),
        ] {
            if period.is_zero() {
                return Err(SettingsError::ZeroPeriod { option });
            }
        }
        if self.heartbeats == 0 {
            return Err(SettingsError::NoHeartbeats);
        }
        if self.deadline < self.link_poll {
            return Err(SettingsError::DeadlineBeforeFirstPoll {
                deadline: self.deadline.as_millis(),
                poll: self.link_poll.as_millis(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkState {
    #[default]
    Waiting,
    Up(Timestamp),
    Abandoned(Timestamp),
}

/// State shared by the demo callbacks.
#[derive(Debug, Default)]
pub struct DemoState {
    led: Cell<bool>,
    blinks: Cell<u32>,
    heartbeats: Cell<u32>,
    link: Cell<LinkState>,
    watchdog: Cell<Option<Timestamp>>,
    blink_task: Cell<Option<TaskId>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub led_on: bool,
    pub blinks: u32,
    pub heartbeats: u32,
    pub link: LinkState,
    pub watchdog_fired_at: Option<Timestamp>,
}

impl DemoState {
    pub fn summary(&self) -> Summary {
        Summary {
            led_on: self.led.get(),
            blinks: self.blinks.get(),
            heartbeats: self.heartbeats.get(),
            link: self.link.get(),
            watchdog_fired_at: self.watchdog.get(),
        }
    }
}

/// Register the demo tasks on `scheduler`.
pub fn register<'a, C: TimeSource>(
    scheduler: &Scheduler<'a, C>,
    settings: &Settings,
    state: &'a DemoState,
) {
    let started = scheduler.now();
    scheduler.set_immediate(|s| info!("demo running, clock at {}", s.now()));

    let blink = scheduler.set_interval(
        move |s| {
            let on = !state.led.get();
            state.led.set(on);
            state.blinks.set(state.blinks.get() + 1);
            debug!("LED {} at {}", if on { "on" } else { "off" }, s.now());
        },
        settings.blink,
    );
    state.blink_task.set(Some(blink));

    let limit = settings.heartbeats;
    scheduler.set_interval(
        move |s| {
            let beat = state.heartbeats.get() + 1;
            state.heartbeats.set(beat);
            info!("heartbeat {beat}/{limit} at {}", s.now());
            beat >= limit
        },
        settings.heartbeat,
    );

    let link_up_at = settings.link_up_after.map(|after| started + after);
    scheduler.set_interval_until(
        move |s| {
            let now = s.now();
            match link_up_at {
                Some(up) if now.has_reached(up) => {
                    info!("link up at {now}");
                    state.link.set(LinkState::Up(now));
                    Flow::Stop
                }
                _ => Flow::Continue,
            }
        },
        settings.link_poll,
        move |s| {
            let now = s.now();
            warn!("link still down at {now}, giving up");
            state.link.set(LinkState::Abandoned(now));
        },
        settings.deadline,
    );

    scheduler.set_timeout(
        move |s| {
            let now = s.now();
            warn!("watchdog expired at {now}, LED stops");
            state.watchdog.set(Some(now));
            if let Some(blink) = state.blink_task.get() {
                s.clear_interval(blink);
            }
        },
        settings.watchdog,
    );
}

/// Run the demo on the system clock until `runner` stops.
pub fn run(settings: &Settings, runner: &LoopRunner, trace: Option<TraceHook>) -> (RunReport, Summary) {
    let state = DemoState::default();
    let mut builder = Scheduler::builder(SystemClock::new())
        .config(SchedulerConfig::builder().attached(true).build());
    if let Some(hook) = trace {
        builder = builder.with_trace_hook(hook);
    }
    let scheduler = builder.build();

    register(&scheduler, settings, &state);
    let report = runner.run(&scheduler);
    info!("stopped after {} polls: {}", report.polls, report.reason);

    (report, state.summary())
}
